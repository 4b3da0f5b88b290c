/// Viewport size in logical pixels.
///
/// The quad renderer uploads this as its NDC basis; the plane renderer ignores
/// it and relies on the camera instead.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height. Returns `1.0` for an invalid viewport.
    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        if self.is_valid() { self.width / self.height } else { 1.0 }
    }

    /// Size in physical pixels for the given device pixel ratio.
    #[inline]
    pub fn physical_size(self, pixel_ratio: f32) -> (u32, u32) {
        let w = (self.width * pixel_ratio).round().max(0.0) as u32;
        let h = (self.height * pixel_ratio).round().max(0.0) as u32;
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_is_width_over_height() {
        assert_eq!(Viewport::new(1600.0, 800.0).aspect_ratio(), 2.0);
    }

    #[test]
    fn aspect_ratio_of_zero_height_falls_back() {
        assert_eq!(Viewport::new(100.0, 0.0).aspect_ratio(), 1.0);
    }

    #[test]
    fn physical_size_rounds_scaled_dimensions() {
        assert_eq!(Viewport::new(800.0, 600.0).physical_size(1.25), (1000, 750));
        assert_eq!(Viewport::new(333.3, 200.0).physical_size(1.0), (333, 200));
    }
}
