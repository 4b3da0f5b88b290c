//! Scalar smoothing.

/// Damping factor used for every smoothed quantity.
///
/// Applied once per frame, this is a one-pole filter with a time constant of
/// roughly ten frames.
pub const DAMPING: f32 = 0.1;

/// Linear interpolation `start * (1 - t) + end * t`.
///
/// `t` is not validated: values outside [0, 1] extrapolate. Callers pass
/// `t` in [0, 1].
#[inline]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start * (1.0 - t) + end * t
}
