//! Screen adaptation

use std::cell::Cell;

use crate::foundation::math::Vec2;
use crate::ui::services::ScreenAdapter;

/// Screen adapter with an explicitly set visible size
///
/// The application pushes the new size on every window resize.
#[derive(Debug)]
pub struct FixedScreen {
    size: Cell<Vec2>,
}

impl FixedScreen {
    /// Create with the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Cell::new(Vec2::new(width, height)),
        }
    }

    /// Set screen size
    pub fn set_visible_size(&self, width: f32, height: f32) {
        self.size.set(Vec2::new(width, height));
    }
}

impl Default for FixedScreen {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl ScreenAdapter for FixedScreen {
    fn visible_size(&self) -> Vec2 {
        self.size.get()
    }
}
