//! Math utilities and types
//!
//! Provides the 2D vector type used for node sizes and scales, plus the
//! easing curves understood by the tween runner.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Overshoot amount of the back-out curve
const BACK_OVERSHOOT: f32 = 1.701_58;

/// Easing curve applied to a normalized animation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed
    Linear,
    /// Overshoots the target, then settles back onto it
    BackOut,
}

impl Easing {
    /// Map normalized time `t` in [0, 1] to eased progress
    ///
    /// Input outside the unit range is clamped. Both curves start at 0.0 and
    /// end exactly at 1.0; `BackOut` exceeds 1.0 in between.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::BackOut => {
                let t = t - 1.0;
                t * t * ((BACK_OVERSHOOT + 1.0) * t + BACK_OVERSHOOT) + 1.0
            }
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::BackOut
    }
}

/// Linear interpolation between two scales
pub fn lerp(from: Vec2, to: Vec2, progress: f32) -> Vec2 {
    from + (to - from) * progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::BackOut] {
            assert_relative_eq!(easing.apply(0.0), 0.0, epsilon = 1e-6);
            assert_relative_eq!(easing.apply(1.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::BackOut.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_easing_clamps_input() {
        assert_relative_eq!(Easing::Linear.apply(2.0), 1.0);
        assert_relative_eq!(Easing::BackOut.apply(-1.0), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_lerp() {
        let mid = lerp(Vec2::zeros(), Vec2::new(2.0, 4.0), 0.5);
        assert_relative_eq!(mid.x, 1.0);
        assert_relative_eq!(mid.y, 2.0);
    }
}
