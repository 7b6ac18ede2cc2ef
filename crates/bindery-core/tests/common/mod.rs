//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use bindery_core::{config::RuntimeConfig, scripting::ScriptRuntime, DefaultAssetLoader};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A runtime whose only asset root is a fresh temp directory.
pub struct Fixture {
    pub dir: TempDir,
    pub runtime: ScriptRuntime,
}

/// Routes library events to the test harness output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let config = RuntimeConfig {
            asset_roots: vec![dir.path().to_path_buf()],
            ..Default::default()
        };
        let loader = Arc::new(DefaultAssetLoader::new(config.asset_roots.clone()));
        let runtime = ScriptRuntime::new(loader, config);
        Self { dir, runtime }
    }

    /// Writes a solid-colour PNG into the asset root.
    pub fn png(&self, name: &str, width: u32, height: u32, rgba: [u8; 4]) {
        write_png(&self.dir.path().join(name), width, height, rgba);
    }

    pub fn file(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.dir.path().join(name), bytes).unwrap();
    }

    /// Runs `script` and returns the `kind` of the error it caught, or "" if none.
    pub fn caught_kind(&self, script: &str) -> String {
        let wrapped = format!(
            r#"let kind = ""; try {{ {script} }} catch (err) {{ kind = err.kind; }} kind"#
        );
        self.runtime.eval::<String>(&wrapped).unwrap()
    }
}

pub fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .save(path)
        .unwrap();
}
