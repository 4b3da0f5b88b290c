//! Effect tuning.

use parallax_engine::coords::Vec2;

/// Tunables of the reveal effect.
///
/// Defaults reproduce the reference look: a 250x350 plane, damping of 0.1 per
/// frame, and a camera 1000 units from the plane.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectConfig {
    /// Per-frame smoothing factor for position and alpha, in (0, 1].
    pub damping: f32,

    /// Scale from drag lag (pixels) to shader offset.
    pub drag_scale: f32,

    /// Camera distance from the plane, in logical pixels.
    pub perspective: f32,

    /// Plane size in logical pixels.
    pub mesh_size: Vec2,

    /// Opacity applied to every link while the list is hovered.
    pub dimmed_link_opacity: f32,

    /// Grid subdivisions of the plane along each axis.
    pub plane_segments: u32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            damping: crate::smoothing::DAMPING,
            drag_scale: 0.0005,
            perspective: 1000.0,
            mesh_size: Vec2::new(250.0, 350.0),
            dimmed_link_opacity: 0.2,
            plane_segments: 20,
        }
    }
}
