//! # Core Module
//!
//! Shared configuration for every UI frame subsystem.
//!
//! ## Organization
//!
//! - **Config**: Frame-wide settings (path root, animation, draw order, logging)
//! - **Foundation**: Low-level utilities (math, collections, logging)

pub mod config;

// Re-export foundation module for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    AnimationConfig,
    FrameConfig,
    Config,
    ConfigError,
};
