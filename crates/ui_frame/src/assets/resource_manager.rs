//! Resource Cache - Reference-Counted Asset Tracking
//!
//! Tracks which assets are resident and how many owners reference each one.
//! An owner is a live form instance; every `retain` is recorded against the
//! owner so tearing the form down can release exactly what it took.
//!
//! The cache does not read asset bytes. Loading mechanics belong to the
//! application's asset pipeline; this module only decides lifetime.

use std::collections::HashMap;
use thiserror::Error;

use crate::ui::FormId;

/// Resource cache errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    /// No owner holds the asset
    #[error("Resource not loaded: {0}")]
    NotLoaded(String),

    /// The asset is loaded, but not on behalf of this owner
    #[error("Owner {owner} holds no reference to {path}")]
    NotRetained {
        /// Asset path
        path: String,
        /// Form that tried to release it
        owner: FormId,
    },
}

/// Opaque handle to a resident asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(u64);

#[derive(Debug)]
struct ResourceEntry {
    handle: ResourceHandle,
    ref_count: usize,
}

/// Reference-counted asset cache shared by all forms
#[derive(Debug, Default)]
pub struct ResourceCache {
    /// Resident assets by path
    entries: HashMap<String, ResourceEntry>,

    /// Paths retained per owner (one entry per retain call)
    owners: HashMap<FormId, Vec<String>>,

    /// Next handle value
    next_handle: u64,
}

impl ResourceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a reference to `path` on behalf of `owner`, making it resident if needed
    pub fn retain(&mut self, path: &str, owner: FormId) -> ResourceHandle {
        let next_handle = &mut self.next_handle;
        let entry = self.entries.entry(path.to_string()).or_insert_with(|| {
            *next_handle += 1;
            log::debug!("Resource '{}' loaded", path);
            ResourceEntry {
                handle: ResourceHandle(*next_handle),
                ref_count: 0,
            }
        });
        entry.ref_count += 1;
        self.owners.entry(owner).or_default().push(path.to_string());

        log::trace!("Resource '{}' retained by {} (refs: {})", path, owner, entry.ref_count);
        entry.handle
    }

    /// Drop one reference `owner` holds on `path`
    pub fn release(&mut self, path: &str, owner: FormId) -> Result<(), ResourceError> {
        let held = self.owners.get_mut(&owner).and_then(|paths| {
            let index = paths.iter().position(|p| p == path)?;
            Some(paths.swap_remove(index))
        });
        if held.is_none() {
            return Err(ResourceError::NotRetained {
                path: path.to_string(),
                owner,
            });
        }
        if self.owners.get(&owner).is_some_and(Vec::is_empty) {
            self.owners.remove(&owner);
        }
        self.decrement(path)
    }

    /// Drop every reference `owner` holds, returning how many assets were freed
    pub fn release_owner(&mut self, owner: FormId) -> usize {
        let Some(paths) = self.owners.remove(&owner) else {
            return 0;
        };
        let before = self.entries.len();
        for path in &paths {
            if let Err(e) = self.decrement(path) {
                log::warn!("Releasing resources of {}: {}", owner, e);
            }
        }
        let freed = before - self.entries.len();
        log::debug!("Released {} reference(s) held by {}, freed {} asset(s)", paths.len(), owner, freed);
        freed
    }

    fn decrement(&mut self, path: &str) -> Result<(), ResourceError> {
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| ResourceError::NotLoaded(path.to_string()))?;
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count == 0 {
            self.entries.remove(path);
            log::debug!("Resource '{}' freed", path);
        }
        Ok(())
    }

    /// Current reference count of `path` (0 when not resident)
    pub fn ref_count(&self, path: &str) -> usize {
        self.entries.get(path).map_or(0, |entry| entry.ref_count)
    }

    /// Whether `path` is resident
    pub fn is_loaded(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of resident assets
    pub fn loaded_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of references `owner` currently holds
    pub fn held_by(&self, owner: FormId) -> usize {
        self.owners.get(&owner).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_asset_survives_first_owner() {
        let mut cache = ResourceCache::new();
        let (a, b) = (FormId(1), FormId(2));

        let first = cache.retain("textures/atlas", a);
        let second = cache.retain("textures/atlas", b);
        assert_eq!(first, second);
        assert_eq!(cache.ref_count("textures/atlas"), 2);

        assert_eq!(cache.release_owner(a), 0);
        assert!(cache.is_loaded("textures/atlas"));
        assert_eq!(cache.release_owner(b), 1);
        assert!(!cache.is_loaded("textures/atlas"));
    }

    #[test]
    fn test_release_owner_drops_every_retain() {
        let mut cache = ResourceCache::new();
        let owner = FormId(7);
        cache.retain("ui/Dialog", owner);
        cache.retain("fonts/main", owner);
        cache.retain("fonts/main", owner);
        assert_eq!(cache.held_by(owner), 3);

        assert_eq!(cache.release_owner(owner), 2);
        assert_eq!(cache.loaded_count(), 0);
        assert_eq!(cache.release_owner(owner), 0);
    }

    #[test]
    fn test_release_single_reference() {
        let mut cache = ResourceCache::new();
        let owner = FormId(3);
        cache.retain("sfx/click", owner);
        assert_eq!(cache.release("sfx/click", owner), Ok(()));
        assert_eq!(
            cache.release("sfx/click", owner),
            Err(ResourceError::NotRetained {
                path: "sfx/click".to_string(),
                owner,
            })
        );
    }

    #[test]
    fn test_reloaded_asset_gets_new_handle() {
        let mut cache = ResourceCache::new();
        let owner = FormId(1);
        let first = cache.retain("ui/Dialog", owner);
        cache.release_owner(owner);
        let second = cache.retain("ui/Dialog", owner);
        assert_ne!(first, second);
    }
}
