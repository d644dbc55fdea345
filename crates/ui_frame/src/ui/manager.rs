//! Form Manager
//!
//! Reference [`FormRegistry`]: keeps one instance per prefab path, stacks
//! open forms in draw order, caches closed instances that opt out of
//! `destroy_on_close`, and puts a backdrop mask beneath pop-ups.
//!
//! No `RefCell` borrow of the manager state is held across an await, so a
//! form's hooks may call back into the manager (for example to open a
//! nested form) while an operation is in flight.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::scene::{NodeFlags, NodeId};
use crate::ui::form::{
    lifecycle, simple_type_name, DisplayKind, FormError, FormId, FormKey, FormParams, FormRef,
    FormType, MaskOpacity,
};
use crate::ui::services::{FormRegistry, UiContext};

type CreateFn = fn(&UiContext) -> FormRef;
type ResolveFn = fn(&UiContext) -> &'static str;
type CandidateFn = fn(&UiContext) -> String;

fn create_form<T: FormType>(ctx: &UiContext) -> FormRef {
    FormRef::new(T::create(ctx))
}

/// Path `T` has or would get, without memoizing it
fn candidate_path<T: FormType>(ctx: &UiContext) -> String {
    let config = ctx.config();
    T::descriptor().peek::<T>(&config.ui_path_root).into_owned()
}

/// Form type known to the manager
struct Registration {
    /// Simple type name, accepted as an alias of the path
    name: &'static str,
    candidate: CandidateFn,
    resolve: ResolveFn,
    create: CreateFn,
}

/// Instance attached to the scene
struct FormEntry {
    form: FormRef,
    path: String,
    id: FormId,
    node: NodeId,
    mask: Option<NodeId>,
}

impl FormEntry {
    fn matches(&self, key: &FormKey<'_>) -> bool {
        match key {
            FormKey::Path(path) => self.path == *path,
            FormKey::Id(id) => self.id == *id,
        }
    }
}

#[derive(Default)]
struct ManagerState {
    registrations: Vec<Registration>,
    /// Open forms, topmost last
    open: Vec<FormEntry>,
    /// Closed instances kept for reuse, by path
    cached: HashMap<String, FormEntry>,
    /// Paths with an open or close in progress
    in_flight: HashSet<String>,
    next_id: u64,
    next_z: i32,
}

/// Marks a path as being opened or closed until dropped
struct InFlight<'a> {
    state: &'a RefCell<ManagerState>,
    path: String,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a RefCell<ManagerState>, path: &str) -> Result<Self, FormError> {
        if !state.borrow_mut().in_flight.insert(path.to_string()) {
            return Err(FormError::Busy(path.to_string()));
        }
        Ok(Self {
            state,
            path: path.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.in_flight.remove(&self.path);
        }
    }
}

/// Central form management system
#[derive(Default)]
pub struct FormManager {
    state: RefCell<ManagerState>,
}

impl FormManager {
    /// Create a manager with no registered forms
    pub fn new() -> Self {
        Self::default()
    }

    /// Make form type `T` openable by its prefab path or simple type name
    pub fn register<T: FormType>(&self) {
        let name = simple_type_name::<T>();
        let mut state = self.state.borrow_mut();
        if state.registrations.iter().any(|r| r.name == name) {
            log::warn!("Form type {} registered twice", name);
            return;
        }
        state.registrations.push(Registration {
            name,
            candidate: candidate_path::<T>,
            resolve: T::prefab_path,
            create: create_form::<T>,
        });
        log::debug!("Registered form type {}", name);
    }

    /// Whether a form is open under `path`
    pub fn is_open(&self, path: &str) -> bool {
        self.get(FormKey::Path(path)).is_some()
    }

    /// Open form identified by `key`
    pub fn get(&self, key: FormKey<'_>) -> Option<FormRef> {
        self.state
            .borrow()
            .open
            .iter()
            .find(|entry| entry.matches(&key))
            .map(|entry| entry.form.clone())
    }

    /// Number of open forms
    pub fn open_count(&self) -> usize {
        self.state.borrow().open.len()
    }

    /// Paths of open forms, bottom of the stack first
    pub fn open_paths(&self) -> Vec<String> {
        self.state.borrow().open.iter().map(|entry| entry.path.clone()).collect()
    }

    /// Number of closed instances kept for reuse
    pub fn cached_count(&self) -> usize {
        self.state.borrow().cached.len()
    }

    /// Close every open form, topmost first, returning how many closed
    pub async fn close_all(&self, ctx: &UiContext) -> Result<usize, FormError> {
        let mut closed = 0;
        loop {
            let top = self.state.borrow().open.last().map(|entry| entry.id);
            let Some(id) = top else {
                break;
            };
            if self.close(ctx, FormKey::Id(id)).await? {
                closed += 1;
            }
        }
        Ok(closed)
    }

    /// Destroy every cached instance, returning how many were destroyed
    pub fn clear_cache(&self, ctx: &UiContext) -> usize {
        let cached: Vec<FormEntry> = self.state.borrow_mut().cached.drain().map(|(_, e)| e).collect();
        for entry in &cached {
            Self::teardown(ctx, entry);
        }
        cached.len()
    }

    /// Resolve a path or type name to the registered path and constructor
    ///
    /// Only the matching type has its path memoized.
    fn lookup(&self, ctx: &UiContext, key: &str) -> Option<(String, CreateFn)> {
        let (resolve, create) = {
            let state = self.state.borrow();
            let registration = state
                .registrations
                .iter()
                .find(|registration| registration.name == key || (registration.candidate)(ctx) == key)?;
            (registration.resolve, registration.create)
        };
        Some((resolve(ctx).to_string(), create))
    }

    /// Put a closed instance in the cache, destroying any it displaces
    fn cache(&self, ctx: &UiContext, entry: FormEntry) {
        log::debug!("Caching {} for reuse", entry.path);
        let displaced = self.state.borrow_mut().cached.insert(entry.path.clone(), entry);
        if let Some(displaced) = displaced {
            log::warn!("Cached {} displaced {}", displaced.path, displaced.id);
            Self::teardown(ctx, &displaced);
        }
    }

    async fn create_instance(
        &self,
        ctx: &UiContext,
        path: &str,
        create: CreateFn,
        params: &dyn Any,
    ) -> Result<FormEntry, FormError> {
        let form = create(ctx);
        form.borrow().check_params(params)?;

        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            FormId(state.next_id)
        };
        let node = {
            let mut scene = ctx.scene_mut();
            let root = scene.root();
            let node = scene.create_node(path, root)?;
            scene.set_active(node, false)?;
            node
        };
        form.try_borrow_mut()?.core_mut().attach(id, path, node);
        ctx.resources_mut().retain(path, id);

        let entry = FormEntry {
            form,
            path: path.to_string(),
            id,
            node,
            mask: None,
        };

        let instantiated = {
            let form = entry.form.borrow();
            let mut scene = ctx.scene_mut();
            form.instantiate(&mut scene, node)
        };
        let prepared = match instantiated {
            Ok(()) => lifecycle::pre_init(&entry.form, ctx).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = prepared {
            log::warn!("Opening {} failed: {}", path, e);
            Self::teardown(ctx, &entry);
            return Err(e);
        }

        log::debug!("Created {} as {}", path, id);
        Ok(entry)
    }

    /// Assign draw order, add the backdrop, then run the show lifecycle
    async fn present(&self, ctx: &UiContext, entry: &mut FormEntry, params: &dyn Any) -> Result<(), FormError> {
        let mask_offset = ctx.config().mask_z_offset;
        let z_order = {
            let mut state = self.state.borrow_mut();
            state.next_z += mask_offset + 1;
            state.next_z
        };
        ctx.scene_mut().set_z_order(entry.node, z_order)?;

        let (display, mask) = {
            let form = entry.form.borrow();
            (form.core().display, form.core().mask)
        };
        if display == DisplayKind::PopUp && mask.opacity != MaskOpacity::None {
            let size = ctx.screen().visible_size();
            let mut scene = ctx.scene_mut();
            let root = scene.root();
            let node = scene.create_node(format!("{}/mask", entry.path), root)?;
            entry.mask = Some(node);
            scene.set_z_order(node, z_order - mask_offset)?;
            scene.set_size(node, size)?;
            scene.set_opacity(node, mask.opacity.alpha())?;
            scene.insert_flags(node, NodeFlags::MASK | NodeFlags::SWALLOW_INPUT)?;
        }

        lifecycle::show(&entry.form, ctx, params).await
    }

    fn remove_mask(ctx: &UiContext, entry: &mut FormEntry) {
        if let Some(mask) = entry.mask.take() {
            if let Err(e) = ctx.scene_mut().remove_node(mask) {
                log::warn!("Failed to remove mask of {}: {}", entry.path, e);
            }
        }
    }

    /// Destroy the instance, its subtree and its resource references
    fn teardown(ctx: &UiContext, entry: &FormEntry) {
        // Drops the input blocker, which needs the scene unborrowed.
        if let Err(e) = lifecycle::destroy(&entry.form) {
            log::warn!("Destroying {} failed: {}", entry.path, e);
        }
        if let Err(e) = ctx.scene_mut().remove_node(entry.node) {
            log::warn!("Failed to remove node of {}: {}", entry.path, e);
        }
        let freed = ctx.resources_mut().release_owner(entry.id);
        log::debug!("Destroyed {} ({}), freed {} asset(s)", entry.path, entry.id, freed);
    }
}

#[async_trait(?Send)]
impl FormRegistry for FormManager {
    async fn open(&self, ctx: &UiContext, path: &str, params: FormParams) -> Result<FormRef, FormError> {
        let (path, create) = self
            .lookup(ctx, path)
            .ok_or_else(|| FormError::NotRegistered(path.to_string()))?;

        if let Some(form) = self.get(FormKey::Path(&path)) {
            log::debug!("{} is already open", path);
            return Ok(form);
        }
        let _in_flight = InFlight::enter(&self.state, &path)?;

        let cached = self.state.borrow_mut().cached.remove(&path);
        let mut entry = match cached {
            Some(entry) => {
                let checked = entry.form.borrow().check_params(&*params);
                if let Err(e) = checked {
                    self.cache(ctx, entry);
                    return Err(e);
                }
                log::debug!("Reusing cached {}", path);
                entry
            }
            None => self.create_instance(ctx, &path, create, &*params).await?,
        };

        if let Err(e) = self.present(ctx, &mut entry, &*params).await {
            log::warn!("Showing {} failed: {}", path, e);
            Self::remove_mask(ctx, &mut entry);
            Self::teardown(ctx, &entry);
            return Err(e);
        }

        log::info!("Opened {} ({})", entry.path, entry.id);
        let form = entry.form.clone();
        self.state.borrow_mut().open.push(entry);
        Ok(form)
    }

    async fn close(&self, ctx: &UiContext, key: FormKey<'_>) -> Result<bool, FormError> {
        let canonical;
        let key = match key {
            FormKey::Path(name) => {
                canonical = self.lookup(ctx, name).map_or_else(|| name.to_string(), |(path, _)| path);
                FormKey::Path(&canonical)
            }
            FormKey::Id(id) => FormKey::Id(id),
        };

        let path = {
            let state = self.state.borrow();
            let Some(entry) = state.open.iter().find(|entry| entry.matches(&key)) else {
                return Ok(false);
            };
            entry.path.clone()
        };
        // Opens of this path fail with `Busy` until the hide has finished.
        let _in_flight = InFlight::enter(&self.state, &path)?;

        let (index, entry) = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.open.iter().position(|entry| entry.path == path) else {
                return Ok(false);
            };
            (index, state.open.remove(index))
        };

        if let Err(e) = lifecycle::hide(&entry.form, ctx).await {
            log::warn!("Hiding {} failed: {}", entry.path, e);
            let mut state = self.state.borrow_mut();
            let index = index.min(state.open.len());
            state.open.insert(index, entry);
            return Err(e);
        }

        let mut entry = entry;
        Self::remove_mask(ctx, &mut entry);
        log::info!("Closed {} ({})", entry.path, entry.id);

        let destroy = entry.form.borrow().core().destroy_on_close;
        if destroy {
            Self::teardown(ctx, &entry);
        } else {
            self.cache(ctx, entry);
        }
        Ok(true)
    }
}
