//! # Scripting Types
//!
//! Shared state handed to every registered function, and the `Canvas` handle.
//!
//! `Image` and `Font` values are [`crate::object::ScriptObject`]s and live in
//! the registry. A canvas is plain Rust-owned state with no manual lifetime.

use crate::config::RuntimeConfig;
use crate::native::NativeCanvas;
use crate::registry::HandleRegistry;
use crate::AssetLoader;
use parking_lot::Mutex;
use std::sync::Arc;

/// Everything a binding function needs from its runtime.
#[derive(Clone)]
pub struct BindingContext {
    pub registry: HandleRegistry,
    pub loader: Arc<dyn AssetLoader>,
    pub config: Arc<RuntimeConfig>,
}

impl BindingContext {
    pub fn new(loader: Arc<dyn AssetLoader>, config: RuntimeConfig) -> Self {
        Self {
            registry: HandleRegistry::new(),
            loader,
            config: Arc::new(config),
        }
    }
}

/// Handle to a drawing target.
#[derive(Clone)]
pub struct CanvasHandle {
    pub canvas: Arc<Mutex<NativeCanvas>>,
}

impl CanvasHandle {
    pub fn new(canvas: NativeCanvas) -> Self {
        Self {
            canvas: Arc::new(Mutex::new(canvas)),
        }
    }
}
