//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the UI frame:
//! - Math types and easing curves
//! - Handle-based collections
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
