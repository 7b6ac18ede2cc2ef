//! # Native Handle Registry
//!
//! Associates script objects with the native resources they own.
//!
//! ## Responsibilities
//! - **Binding**: one native handle per object, attached exactly once.
//! - **Retrieval**: tag-checked access, so a Font slot never yields an Image.
//! - **Release**: the native destructor runs exactly once, whether the object
//!   is disposed explicitly, collected, or torn down with the runtime.
//!
//! Slots are keyed by generational [`ObjectId`]s. Releasing a slot removes it,
//! so a stale id resolves to nothing and reports `UseAfterFree` instead of
//! reaching freed memory.

use crate::errors::{BindingError, Result};
use crate::resource::{NativeResource, ResourceKind, Wrapped};
use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;
use tracing::debug;

new_key_type! {
    /// Identity of a script object inside one registry.
    pub struct ObjectId;
}

#[derive(Debug)]
enum SlotState {
    Unbound,
    Bound(NativeResource),
}

#[derive(Debug)]
struct Slot {
    kind: ResourceKind,
    state: SlotState,
}

/// Observable state of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unbound,
    Bound(ResourceKind),
    Released,
}

/// Lifetime counters, mostly useful for leak checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Slots handed out by `allocate`.
    pub allocated: u64,
    /// Successful `bind` calls.
    pub bound: u64,
    /// Native resources destroyed through `release`.
    pub released: u64,
}

#[derive(Default)]
struct RegistryInner {
    slots: SlotMap<ObjectId, Slot>,
    stats: RegistryStats,
}

/// Per-runtime table of live bindings.
///
/// Cloning is cheap and shares the same table. All slot access is serialized
/// through a single mutex.
#[derive(Clone, Default)]
pub struct HandleRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves an unbound slot for a freshly created script object.
    pub fn allocate(&self, kind: ResourceKind) -> ObjectId {
        let mut inner = self.inner.lock();
        inner.stats.allocated += 1;
        inner.slots.insert(Slot {
            kind,
            state: SlotState::Unbound,
        })
    }

    /// Attaches `resource` to the object. On failure the resource is dropped
    /// right away, so nothing leaks.
    pub fn bind<T: Wrapped>(&self, id: ObjectId, resource: T) -> Result<()> {
        let mut inner = self.inner.lock();
        let slot = inner
            .slots
            .get_mut(id)
            .ok_or(BindingError::UseAfterFree {
                kind: T::KIND.name(),
            })?;

        if slot.kind != T::KIND {
            return Err(BindingError::TypeMismatch {
                expected: slot.kind.name(),
                found: T::KIND.name().to_string(),
            });
        }
        if let SlotState::Bound(_) = slot.state {
            return Err(BindingError::AlreadyBound {
                kind: slot.kind.name(),
            });
        }

        slot.state = SlotState::Bound(resource.into_resource());
        inner.stats.bound += 1;
        debug!(?id, kind = %T::KIND, "bound native resource");
        Ok(())
    }

    /// Returns a clone of the bound handle. Native handles are ref-counted,
    /// so the clone refers to the same native object.
    pub fn retrieve<T: Wrapped>(&self, id: ObjectId) -> Result<T> {
        self.with(id, T::clone)
    }

    /// Runs `f` against the bound resource while the registry is locked.
    /// `f` must not call back into this registry.
    pub fn with<T: Wrapped, R>(&self, id: ObjectId, f: impl FnOnce(&T) -> R) -> Result<R> {
        let inner = self.inner.lock();
        let slot = inner.slots.get(id).ok_or(BindingError::UseAfterFree {
            kind: T::KIND.name(),
        })?;
        let resource = match &slot.state {
            SlotState::Bound(resource) => resource,
            SlotState::Unbound => {
                return Err(BindingError::TypeMismatch {
                    expected: T::KIND.name(),
                    found: format!("unbound {}", slot.kind),
                })
            }
        };
        let value = T::from_resource(resource).ok_or_else(|| BindingError::TypeMismatch {
            expected: T::KIND.name(),
            found: resource.kind().name().to_string(),
        })?;
        Ok(f(value))
    }

    /// Mutable counterpart of [`HandleRegistry::with`], used by operations
    /// that replace the native handle in place.
    pub fn with_mut<T: Wrapped, R>(
        &self,
        id: ObjectId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R> {
        let mut inner = self.inner.lock();
        let slot = inner.slots.get_mut(id).ok_or(BindingError::UseAfterFree {
            kind: T::KIND.name(),
        })?;
        let kind = slot.kind;
        let resource = match &mut slot.state {
            SlotState::Bound(resource) => resource,
            SlotState::Unbound => {
                return Err(BindingError::TypeMismatch {
                    expected: T::KIND.name(),
                    found: format!("unbound {kind}"),
                })
            }
        };
        let found = resource.kind();
        let value = T::from_resource_mut(resource).ok_or_else(|| BindingError::TypeMismatch {
            expected: T::KIND.name(),
            found: found.name().to_string(),
        })?;
        Ok(f(value))
    }

    /// Frees the object's native resource. Returns `false` when there was
    /// nothing left to release.
    pub fn release(&self, id: ObjectId) -> bool {
        let removed = {
            let mut inner = self.inner.lock();
            let removed = inner.slots.remove(id);
            if let Some(Slot {
                state: SlotState::Bound(_),
                ..
            }) = &removed
            {
                inner.stats.released += 1;
            }
            removed
        };

        // The native destructor runs here, outside the lock.
        match removed {
            Some(slot) => {
                debug!(?id, kind = %slot.kind, "released native resource");
                drop(slot);
                true
            }
            None => false,
        }
    }

    /// Releases every live slot. Returns how many slots were removed.
    pub fn release_all(&self) -> usize {
        let drained: Vec<(ObjectId, Slot)> = {
            let mut inner = self.inner.lock();
            let drained: Vec<_> = inner.slots.drain().collect();
            let bound = drained
                .iter()
                .filter(|(_, slot)| matches!(slot.state, SlotState::Bound(_)))
                .count();
            inner.stats.released += bound as u64;
            drained
        };

        let count = drained.len();
        if count > 0 {
            debug!(count, "released all native resources");
        }
        count
    }

    pub fn state(&self, id: ObjectId) -> BindingState {
        let inner = self.inner.lock();
        match inner.slots.get(id) {
            None => BindingState::Released,
            Some(Slot {
                state: SlotState::Unbound,
                ..
            }) => BindingState::Unbound,
            Some(Slot { kind, .. }) => BindingState::Bound(*kind),
        }
    }

    /// Number of slots that have not been released yet.
    pub fn live_count(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn stats(&self) -> RegistryStats {
        self.inner.lock().stats
    }

    /// True when both handles share the same table.
    pub fn same_registry(&self, other: &HandleRegistry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
