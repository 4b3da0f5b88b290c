//! Viewport dimensions, field of view, and the perspective camera.
//!
//! The camera sits `perspective` units in front of the plane with a vertical
//! field of view chosen so one world unit at z = 0 is one logical pixel. Mesh
//! sizes given in pixels therefore render true to size at any window size.

use glam::{Mat4, Vec3};
use parallax_engine::coords::Viewport;

use crate::error::{EffectError, EffectResult};

/// Near clip plane distance.
const NEAR: f32 = 0.1;

/// Vertical field of view, in degrees, that maps `viewport_height` logical
/// pixels onto the plane `perspective` units away.
#[inline]
pub fn field_of_view(viewport_height: f32, perspective: f32) -> f32 {
    (2.0 * (viewport_height / 2.0 / perspective).atan()).to_degrees()
}

/// Viewport size and everything derived from it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportDescriptor {
    pub width: f32,
    pub height: f32,
    pub aspect_ratio: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Device pixel ratio (physical / logical).
    pub pixel_ratio: f32,
}

impl ViewportDescriptor {
    pub fn new(width: f32, height: f32, pixel_ratio: f32, perspective: f32) -> Self {
        Self {
            width,
            height,
            aspect_ratio: width / height,
            fov: field_of_view(height, perspective),
            pixel_ratio,
        }
    }

    /// Logical size as an engine viewport.
    pub fn logical(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Drawable size in physical pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        self.logical().physical_size(self.pixel_ratio)
    }
}

/// Host that knows the live window dimensions.
pub trait ViewportHost {
    /// Inner size in logical pixels.
    fn logical_size(&self) -> (f32, f32);

    fn pixel_ratio(&self) -> f32;
}

/// Rendering surface that can be resized to match the camera.
pub trait RenderSurface {
    /// Resizes the drawable to `width` x `height` physical pixels.
    fn resize_surface(&mut self, width: u32, height: u32);

    /// Current drawable size in physical pixels.
    fn surface_size(&self) -> (u32, u32);
}

/// Perspective camera on the +Z axis looking at the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the plane at z = 0.
    pub distance: f32,
    /// Surface size (physical pixels) the projection was built for.
    pub surface_size: (u32, u32),
}

impl Camera {
    pub fn for_viewport(viewport: &ViewportDescriptor, perspective: f32) -> Self {
        Self {
            fov: viewport.fov,
            aspect: viewport.aspect_ratio,
            near: NEAR,
            // Twice the distance so the plane never sits on the far plane.
            far: perspective * 2.0,
            distance: perspective,
            surface_size: viewport.surface_size(),
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.distance), Vec3::ZERO, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Owns the current viewport descriptor and the camera built from it.
///
/// The two are only ever replaced together, and the rendering surface is
/// resized inside the same call, so a frame can never see a camera and a
/// surface that disagree.
#[derive(Debug, Clone)]
pub struct ViewportManager {
    perspective: f32,
    descriptor: ViewportDescriptor,
    camera: Camera,
}

impl ViewportManager {
    /// Builds the initial viewport.
    ///
    /// Fails with `InitializationFailure` when the size, pixel ratio, or
    /// perspective cannot produce a camera.
    pub fn new(width: f32, height: f32, pixel_ratio: f32, perspective: f32) -> EffectResult<Self> {
        if !(perspective > 0.0 && perspective.is_finite()) {
            return Err(EffectError::InitializationFailure(format!(
                "camera perspective must be positive, got {perspective}"
            )));
        }
        if !(pixel_ratio > 0.0 && pixel_ratio.is_finite()) {
            return Err(EffectError::InitializationFailure(format!(
                "invalid device pixel ratio {pixel_ratio}"
            )));
        }
        if !Viewport::new(width, height).is_valid() {
            return Err(EffectError::InitializationFailure(format!(
                "cannot build a camera for a {width}x{height} viewport"
            )));
        }

        let descriptor = ViewportDescriptor::new(width, height, pixel_ratio, perspective);
        let camera = Camera::for_viewport(&descriptor, perspective);
        Ok(Self {
            perspective,
            descriptor,
            camera,
        })
    }

    /// Builds the initial viewport from the host's live dimensions.
    pub fn from_host(host: &impl ViewportHost, perspective: f32) -> EffectResult<Self> {
        let (w, h) = host.logical_size();
        Self::new(w, h, host.pixel_ratio(), perspective)
    }

    /// Reads the host's dimensions now. Never cached.
    pub fn current_viewport(&self, host: &impl ViewportHost) -> ViewportDescriptor {
        let (w, h) = host.logical_size();
        ViewportDescriptor::new(w, h, host.pixel_ratio(), self.perspective)
    }

    /// Applies a new logical size: recomputes aspect and fov, rebuilds the
    /// camera, and resizes `surface`.
    ///
    /// A zero or non-finite size (minimised window) is ignored and keeps the
    /// previous state. Returns whether anything changed.
    pub fn on_resize(
        &mut self,
        width: f32,
        height: f32,
        surface: &mut impl RenderSurface,
    ) -> bool {
        self.apply(width, height, self.descriptor.pixel_ratio, surface)
    }

    /// Re-reads the host's size and pixel ratio and applies them.
    pub fn sync(&mut self, host: &impl ViewportHost, surface: &mut impl RenderSurface) -> bool {
        let (w, h) = host.logical_size();
        let ratio = host.pixel_ratio();
        let ratio = if ratio > 0.0 && ratio.is_finite() { ratio } else { self.descriptor.pixel_ratio };
        self.apply(w, h, ratio, surface)
    }

    fn apply(
        &mut self,
        width: f32,
        height: f32,
        pixel_ratio: f32,
        surface: &mut impl RenderSurface,
    ) -> bool {
        if !Viewport::new(width, height).is_valid() {
            log::debug!("ignoring resize to {width}x{height}");
            return false;
        }

        let descriptor = ViewportDescriptor::new(width, height, pixel_ratio, self.perspective);
        let camera = Camera::for_viewport(&descriptor, self.perspective);
        let (sw, sh) = descriptor.surface_size();

        surface.resize_surface(sw, sh);
        self.descriptor = descriptor;
        self.camera = camera;

        log::debug!(
            "viewport {width}x{height} @{pixel_ratio}, aspect {:.3}, fov {:.2} deg, surface {sw}x{sh}",
            descriptor.aspect_ratio,
            descriptor.fov,
        );
        true
    }

    pub fn descriptor(&self) -> &ViewportDescriptor {
        &self.descriptor
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[derive(Default)]
    struct RecordingSurface {
        resizes: Vec<(u32, u32)>,
    }

    impl RenderSurface for RecordingSurface {
        fn resize_surface(&mut self, width: u32, height: u32) {
            self.resizes.push((width, height));
        }

        fn surface_size(&self) -> (u32, u32) {
            self.resizes.last().copied().unwrap_or((0, 0))
        }
    }

    struct FixedHost(f32, f32, f32);

    impl ViewportHost for FixedHost {
        fn logical_size(&self) -> (f32, f32) {
            (self.0, self.1)
        }

        fn pixel_ratio(&self) -> f32 {
            self.2
        }
    }

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    // ── field_of_view ─────────────────────────────────────────────────────

    #[test]
    fn fov_is_ninety_degrees_when_height_is_twice_perspective() {
        assert!(approx(field_of_view(2000.0, 1000.0), 90.0, 1e-4));
    }

    #[test]
    fn fov_grows_with_height() {
        let heights = [300.0, 720.0, 1080.0, 2160.0];
        let fovs: Vec<f32> = heights.iter().map(|&h| field_of_view(h, 1000.0)).collect();
        assert!(fovs.windows(2).all(|w| w[0] < w[1]), "{fovs:?}");
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn zero_sized_host_fails_initialization() {
        let err = ViewportManager::from_host(&FixedHost(0.0, 600.0, 1.0), 1000.0).unwrap_err();
        assert!(matches!(err, EffectError::InitializationFailure(_)));
    }

    #[test]
    fn non_positive_perspective_fails_initialization() {
        assert!(ViewportManager::new(800.0, 600.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn current_viewport_reads_live_host() {
        let m = ViewportManager::new(800.0, 600.0, 1.0, 1000.0).unwrap();
        let d = m.current_viewport(&FixedHost(1920.0, 1080.0, 2.0));
        assert_eq!((d.width, d.height, d.pixel_ratio), (1920.0, 1080.0, 2.0));
        assert!(approx(d.aspect_ratio, 1920.0 / 1080.0, 1e-6));
        // The stored descriptor is untouched by a read.
        assert_eq!(m.descriptor().width, 800.0);
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_recomputes_aspect_fov_camera_and_surface() {
        let mut m = ViewportManager::new(800.0, 600.0, 1.0, 1000.0).unwrap();
        let mut surface = RecordingSurface::default();

        let mut last_fov = m.descriptor().fov;
        for (w, h) in [(1024.0, 768.0), (1280.0, 1024.0), (1920.0, 1440.0)] {
            assert!(m.on_resize(w, h, &mut surface));
            let d = *m.descriptor();
            assert_eq!(d.aspect_ratio, w / h);
            assert_eq!(d.fov, field_of_view(h, 1000.0));
            assert!(d.fov > last_fov);
            assert_eq!(m.camera().aspect, d.aspect_ratio);
            assert_eq!(m.camera().fov, d.fov);
            assert_eq!(m.camera().surface_size, (w as u32, h as u32));
            last_fov = d.fov;
        }

        assert_eq!(surface.resizes, vec![(1024, 768), (1280, 1024), (1920, 1440)]);
    }

    #[test]
    fn zero_resize_keeps_previous_state() {
        let mut m = ViewportManager::new(800.0, 600.0, 1.0, 1000.0).unwrap();
        let before = *m.descriptor();
        let mut surface = RecordingSurface::default();

        assert!(!m.on_resize(0.0, 0.0, &mut surface));
        assert_eq!(*m.descriptor(), before);
        assert!(surface.resizes.is_empty());
    }

    #[test]
    fn sync_applies_pixel_ratio_to_surface() {
        let mut m = ViewportManager::new(800.0, 600.0, 1.0, 1000.0).unwrap();
        let mut surface = RecordingSurface::default();

        m.sync(&FixedHost(800.0, 600.0, 2.0), &mut surface);
        assert_eq!(surface.resizes, vec![(1600, 1200)]);
        assert_eq!(m.camera().surface_size, (1600, 1200));
    }

    // ── camera ────────────────────────────────────────────────────────────

    #[test]
    fn viewport_corner_projects_to_ndc_corner() {
        let m = ViewportManager::new(1280.0, 720.0, 1.0, 1000.0).unwrap();
        let clip = m.camera().view_projection() * Vec4::new(640.0, 360.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(approx(ndc.x, 1.0, 1e-4), "{ndc:?}");
        assert!(approx(ndc.y, 1.0, 1e-4), "{ndc:?}");
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "{ndc:?}");
    }
}
