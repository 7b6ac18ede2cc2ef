//! # Bindery
//!
//! `bindery-core` exposes Skia images and fonts to [Rhai](https://rhai.rs/) scripts.
//!
//! Every script-visible `Image` or `Font` owns exactly one native resource. The
//! [`registry::HandleRegistry`] tracks those bindings: retrieval is checked
//! against the wrapped type, and the native destructor runs exactly once, when
//! the script drops its last reference, calls `dispose()`, or the runtime is
//! torn down.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bindery_core::{config::RuntimeConfig, scripting::ScriptRuntime, DefaultAssetLoader};
//! use std::sync::Arc;
//!
//! let config = RuntimeConfig::default();
//! let loader = Arc::new(DefaultAssetLoader::new(config.asset_roots.clone()));
//! let runtime = ScriptRuntime::new(loader, config);
//! runtime.run(r#"
//!     let font = Font(24);
//!     print(font.text_width("hello"));
//! "#).unwrap();
//! ```

/// Runtime configuration.
pub mod config;

pub mod errors;

/// Skia adapters for images, fonts and canvases.
pub mod native;

/// Script objects and their finalizers.
pub mod object;

/// The per-runtime table of native bindings.
pub mod registry;

/// The closed set of bindable native resources.
pub mod resource;

/// Rhai scripting API bindings.
pub mod scripting;

pub use errors::{script_error_kind, BindingError};
pub use object::{FontObject, ImageObject, ScriptObject};
pub use registry::{BindingState, HandleRegistry, ObjectId};
pub use resource::{NativeResource, ResourceKind};

use anyhow::Result;
use std::path::PathBuf;
use tracing::instrument;

/// A trait for abstracting file system access.
///
/// This allows the bindings to be embedded where direct file access is
/// restricted or virtualized (assets packed in an archive, fetched remotely).
pub trait AssetLoader: Send + Sync {
    /// Loads the raw bytes of an asset from the given path.
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>>;
}

/// Filesystem loader that tries the path as given, then each search root.
#[derive(Debug, Clone)]
pub struct DefaultAssetLoader {
    roots: Vec<PathBuf>,
}

impl DefaultAssetLoader {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl Default for DefaultAssetLoader {
    fn default() -> Self {
        Self::new(vec![PathBuf::from("assets")])
    }
}

impl AssetLoader for DefaultAssetLoader {
    #[instrument(level = "debug", skip(self), fields(path = path))]
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>> {
        if let Ok(bytes) = std::fs::read(path) {
            return Ok(bytes);
        }
        let mut checked = vec![format!("'{}'", path)];
        for root in &self.roots {
            let alt = root.join(path);
            if let Ok(bytes) = std::fs::read(&alt) {
                return Ok(bytes);
            }
            checked.push(format!("'{}'", alt.display()));
        }
        Err(anyhow::anyhow!(
            "Asset not found: {} (checked {})",
            path,
            checked.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_falls_back_to_roots() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sprite.bin"), [1u8, 2, 3]).unwrap();

        let loader = DefaultAssetLoader::new(vec![dir.path().to_path_buf()]);
        assert_eq!(loader.load_bytes("sprite.bin").unwrap(), vec![1, 2, 3]);

        let err = loader.load_bytes("missing.bin").unwrap_err();
        assert!(err.to_string().contains("Asset not found: missing.bin"));
    }
}
