//! # Frame Configuration
//!
//! Settings consumed by the form lifecycle: where form prefabs live, how the
//! pop-up show animation runs, and where overlay nodes sit in draw order.
//!
//! Both TOML and RON files are supported through the [`Config`] trait.

use serde::{Serialize, Deserialize};

use crate::foundation::math::Easing;

// Re-export from the config module for compatibility
pub use crate::config::{Config, ConfigError};

/// Z-order given to input blockers so they sit above every sibling
pub const MAX_Z_ORDER: i32 = i32::MAX;

/// # Animation Configuration
///
/// Duration and easing of the pop-up scale-in transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Duration in seconds
    pub duration: f32,
    /// Easing curve
    pub easing: Easing,
}

impl AnimationConfig {
    /// Create a new animation configuration
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self { duration, easing }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(format!("Animation duration must be positive, got {}", self.duration));
        }
        Ok(())
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::new(0.3, Easing::BackOut)
    }
}

/// # Frame Configuration
///
/// Top-level configuration for the UI frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Log level used when the frame initializes logging
    pub log_level: String,
    /// Root joined with a form's type name when it declares no explicit path
    pub ui_path_root: String,
    /// Pop-up show animation
    pub show_animation: AnimationConfig,
    /// Z-order of input blocker nodes within their form
    pub blocker_z_order: i32,
    /// How far below its form a pop-up backdrop mask is placed
    pub mask_z_offset: i32,
}

impl FrameConfig {
    /// Create a new frame configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            ui_path_root: "ui/".to_string(),
            show_animation: AnimationConfig::default(),
            blocker_z_order: MAX_Z_ORDER,
            mask_z_offset: 1,
        }
    }

    /// Set the path root
    pub fn with_ui_path_root(mut self, root: impl Into<String>) -> Self {
        self.ui_path_root = root.into();
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the pop-up show animation
    pub fn with_show_animation(mut self, animation: AnimationConfig) -> Self {
        self.show_animation = animation;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ui_path_root.is_empty() {
            return Err(ConfigError::Invalid("ui_path_root cannot be empty".to_string()));
        }
        if self.mask_z_offset <= 0 {
            return Err(ConfigError::Invalid("mask_z_offset must be at least 1".to_string()));
        }
        self.show_animation.validate().map_err(ConfigError::Invalid)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for FrameConfig {}
