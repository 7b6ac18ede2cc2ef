//! Script-side handles to bound native resources.
//!
//! A [`ScriptObject`] is what the scripting runtime stores in its variables.
//! The runtime clones values freely, so every clone shares one [`Finalizer`];
//! when the last clone is dropped the finalizer releases the binding. That
//! drop is the collection hook.

use crate::errors::{BindingError, Result};
use crate::native::{NativeFont, NativeImage};
use crate::registry::{BindingState, HandleRegistry, ObjectId};
use crate::resource::Wrapped;
use rhai::Dynamic;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

struct Finalizer {
    id: ObjectId,
    registry: HandleRegistry,
}

impl Drop for Finalizer {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

/// A script object exclusively owning one native resource of type `T`.
pub struct ScriptObject<T: Wrapped> {
    id: ObjectId,
    registry: HandleRegistry,
    finalizer: Arc<Finalizer>,
    _marker: PhantomData<fn() -> T>,
}

pub type ImageObject = ScriptObject<NativeImage>;
pub type FontObject = ScriptObject<NativeFont>;

impl<T: Wrapped> Clone for ScriptObject<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            registry: self.registry.clone(),
            finalizer: self.finalizer.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Wrapped> fmt::Debug for ScriptObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptObject")
            .field("kind", &T::KIND)
            .field("id", &self.id)
            .field("state", &self.registry.state(self.id))
            .finish()
    }
}

impl<T: Wrapped> ScriptObject<T> {
    /// Allocates a fresh object and binds `resource` to it.
    pub fn new_bound(registry: &HandleRegistry, resource: T) -> Result<Self> {
        let id = registry.allocate(T::KIND);
        // The finalizer exists before `bind` so a failed bind still frees the slot.
        let object = Self {
            id,
            registry: registry.clone(),
            finalizer: Arc::new(Finalizer {
                id,
                registry: registry.clone(),
            }),
            _marker: PhantomData,
        };
        registry.bind(id, resource)?;
        Ok(object)
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// The bound native handle.
    pub fn get(&self) -> Result<T> {
        self.registry.retrieve(self.id)
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.registry.with(self.id, f)
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        self.registry.with_mut(self.id, f)
    }

    /// Releases the native resource ahead of collection. The later
    /// collection-time release becomes a no-op.
    pub fn dispose(&self) -> bool {
        let released = self.registry.release(self.id);
        if !released {
            warn!(kind = %T::KIND, id = ?self.id, "dispose called on an already released object");
        }
        released
    }

    pub fn is_disposed(&self) -> bool {
        self.registry.state(self.id) == BindingState::Released
    }

    /// Number of live script values sharing this binding.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.finalizer)
    }

    /// Extracts the native handle from an arbitrary script value.
    ///
    /// Anything that is not a `ScriptObject<T>` is a type mismatch, even if it
    /// is another wrapped type.
    pub fn from_dynamic(value: &Dynamic) -> Result<T> {
        match value.read_lock::<Self>() {
            Some(object) => object.get(),
            None => Err(BindingError::TypeMismatch {
                expected: T::KIND.name(),
                found: script_type_name(value),
            }),
        }
    }
}

/// Human-readable type of a script value, using the wrapped names where known.
pub(crate) fn script_type_name(value: &Dynamic) -> String {
    if value.is::<ImageObject>() {
        "Image".to_string()
    } else if value.is::<FontObject>() {
        "Font".to_string()
    } else {
        value.type_name().rsplit("::").next().unwrap_or("?").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;

    fn image() -> NativeImage {
        NativeImage::from_rgba(1, 1, &[0, 0, 0, 255]).unwrap()
    }

    #[test]
    fn last_clone_drop_releases_once() {
        let registry = HandleRegistry::new();
        let object = ImageObject::new_bound(&registry, image()).unwrap();
        let copy = object.clone();
        assert_eq!(object.ref_count(), 2);

        drop(object);
        assert_eq!(registry.live_count(), 1);
        assert!(copy.get().is_ok());

        drop(copy);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.stats().released, 1);
    }

    #[test]
    fn release_drops_the_skia_reference() {
        use skia_safe::ConditionallySend;

        let registry = HandleRegistry::new();
        let native = image();
        // An outside reference to the same Skia object; unique again once the
        // registry lets go of its own.
        let observer = native.skia_image().clone();
        let object = ImageObject::new_bound(&registry, native).unwrap();
        assert!(!observer.can_send());

        let copy = object.clone();
        drop(object);
        assert!(!observer.can_send());

        drop(copy);
        assert!(observer.can_send());
        assert_eq!(registry.stats().released, 1);
    }

    #[test]
    fn dispose_drops_the_skia_reference() {
        use skia_safe::ConditionallySend;

        let registry = HandleRegistry::new();
        let native = image();
        let observer = native.skia_image().clone();
        let object = ImageObject::new_bound(&registry, native).unwrap();

        assert!(object.dispose());
        assert!(observer.can_send());
        drop(object);
        assert!(observer.can_send());
        assert_eq!(registry.stats().released, 1);
    }

    #[test]
    fn dispose_then_collect_releases_once() {
        let registry = HandleRegistry::new();
        let object = ImageObject::new_bound(&registry, image()).unwrap();

        assert!(object.dispose());
        assert!(!object.dispose());
        assert!(object.is_disposed());
        assert!(matches!(
            object.get(),
            Err(BindingError::UseAfterFree { kind: "Image" })
        ));

        drop(object);
        assert_eq!(registry.stats().released, 1);
    }

    #[test]
    fn from_dynamic_checks_type() {
        let registry = HandleRegistry::new();
        let object = ImageObject::new_bound(&registry, image()).unwrap();

        let as_dynamic = Dynamic::from(object.clone());
        assert!(ImageObject::from_dynamic(&as_dynamic).is_ok());

        let err = FontObject::from_dynamic(&as_dynamic).unwrap_err();
        match err {
            BindingError::TypeMismatch { expected, found } => {
                assert_eq!(expected, "Font");
                assert_eq!(found, "Image");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = ImageObject::from_dynamic(&Dynamic::from(42_i64)).unwrap_err();
        assert!(matches!(err, BindingError::TypeMismatch { .. }));
    }

    #[test]
    fn debug_reports_state() {
        let registry = HandleRegistry::new();
        let object = ImageObject::new_bound(&registry, image()).unwrap();
        let text = format!("{object:?}");
        assert!(text.contains("Image"));
        assert_eq!(
            registry.state(object.id()),
            BindingState::Bound(ResourceKind::Image)
        );
    }
}
