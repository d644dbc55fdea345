//! Asset management system
//!
//! Forms never own shared assets directly. They retain them through the
//! [`ResourceCache`], which frees an asset once its last owner lets go.

pub mod resource_manager;

pub use resource_manager::{ResourceCache, ResourceError, ResourceHandle};
