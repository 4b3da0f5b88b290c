//! The single plane mesh and its shader-parameter block.

use glam::{Mat4, Vec3};
use parallax_engine::coords::Vec2;
use parallax_engine::render::{PlaneMaterial, TextureHandle};

use crate::viewport::ViewportDescriptor;

/// Per-frame inputs of the plane program.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShaderParameters {
    pub texture: TextureHandle,
    /// Output opacity, kept in [0, 1] by the render loop.
    pub alpha: f32,
    /// Drag-lag vector; displaces vertices most strongly at the mesh centre.
    pub offset: Vec2,
}

impl ShaderParameters {
    /// Fully transparent, undeformed, showing `texture`.
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            alpha: 0.0,
            offset: Vec2::zero(),
        }
    }
}

/// Compiled program that accepts the three named parameters.
pub trait ShaderProgram {
    fn set_parameters(&mut self, alpha: f32, offset: Vec2, texture: TextureHandle);
}

impl ShaderProgram for PlaneMaterial {
    fn set_parameters(&mut self, alpha: f32, offset: Vec2, texture: TextureHandle) {
        self.alpha = alpha;
        self.offset = offset;
        self.texture = texture;
    }
}

/// Fixed-size rectangle placed in centre-origin render space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mesh {
    pub size: Vec2,
    /// Centre of the mesh in render space (+Y up).
    pub position: Vec2,
}

impl Mesh {
    /// Translation to `position` on the z = 0 plane, then scale of the unit
    /// plane up to `size`.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.position.x, self.position.y, 0.0))
            * Mat4::from_scale(Vec3::new(self.size.x, self.size.y, 1.0))
    }
}

/// Owns the mesh, its parameter block, and the program the block feeds.
#[derive(Debug, Clone)]
pub struct Scene<P> {
    mesh: Mesh,
    parameters: ShaderParameters,
    program: P,
}

impl<P: ShaderProgram> Scene<P> {
    /// Builds the mesh at the origin and pushes `initial` into `program`.
    pub fn create_mesh(size: Vec2, initial: ShaderParameters, mut program: P) -> Self {
        program.set_parameters(initial.alpha, initial.offset, initial.texture);
        Self {
            mesh: Mesh {
                size,
                position: Vec2::zero(),
            },
            parameters: initial,
            program,
        }
    }

    /// Overwrites the parameter block and forwards it to the program.
    ///
    /// Values are stored as given.
    pub fn update_parameters(&mut self, alpha: f32, offset: Vec2, texture: TextureHandle) {
        self.parameters = ShaderParameters {
            texture,
            alpha,
            offset,
        };
        self.program.set_parameters(alpha, offset, texture);
    }

    /// Moves the mesh to pointer-space `(x, y)` (top-left origin, +Y down).
    pub fn set_position(&mut self, x: f32, y: f32, viewport: &ViewportDescriptor) {
        self.mesh.position = to_render_space(x, y, viewport);
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.mesh.model_matrix()
    }

    pub fn parameters(&self) -> &ShaderParameters {
        &self.parameters
    }

    pub fn program(&self) -> &P {
        &self.program
    }
}

/// Converts top-left-origin pointer coordinates into centre-origin render
/// coordinates with +Y up.
#[inline]
pub fn to_render_space(x: f32, y: f32, viewport: &ViewportDescriptor) -> Vec2 {
    Vec2::new(x - viewport.width / 2.0, -y + viewport.height / 2.0)
}
