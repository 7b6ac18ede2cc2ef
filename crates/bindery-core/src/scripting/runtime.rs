use super::types::BindingContext;
use super::{register_rhai_api, RhaiResult};
use crate::config::RuntimeConfig;
use crate::registry::HandleRegistry;
use crate::AssetLoader;
use rhai::{Dynamic, Engine, Scope, Variant};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A Rhai engine with the binding API installed, plus the registry that
/// owns every native resource its scripts create.
///
/// Dropping the runtime tears it down, so nothing outlives it.
pub struct ScriptRuntime {
    engine: Engine,
    ctx: BindingContext,
    installed: bool,
}

impl ScriptRuntime {
    /// Creates a runtime with the API installed.
    pub fn new(loader: Arc<dyn AssetLoader>, config: RuntimeConfig) -> Self {
        let mut runtime = Self::uninstalled(loader, config);
        runtime.install();
        runtime
    }

    /// Creates a runtime whose engine has no bindings yet.
    pub fn uninstalled(loader: Arc<dyn AssetLoader>, config: RuntimeConfig) -> Self {
        let mut engine = Engine::new();
        engine.on_print(|text| info!(target: "script", "{text}"));
        engine.on_debug(|text, source, pos| {
            debug!(target: "script", source = source.unwrap_or(""), %pos, "{text}")
        });
        Self {
            engine,
            ctx: BindingContext::new(loader, config),
            installed: false,
        }
    }

    /// Registers the `Image`, `Font` and `Canvas` classes.
    ///
    /// Returns `false` if they were already installed.
    pub fn install(&mut self) -> bool {
        if self.installed {
            debug!("binding API already installed");
            return false;
        }
        register_rhai_api(&mut self.engine, &self.ctx);
        self.installed = true;
        info!("binding API installed");
        true
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.ctx.registry
    }

    pub fn context(&self) -> &BindingContext {
        &self.ctx
    }

    /// Runs a script for its side effects.
    pub fn run(&self, script: &str) -> RhaiResult<()> {
        self.engine.run(script)
    }

    /// Evaluates a script and returns its final value.
    pub fn eval<T: Variant + Clone>(&self, script: &str) -> RhaiResult<T> {
        self.engine.eval::<T>(script)
    }

    /// Evaluates a script against a caller-owned scope, so globals persist
    /// between calls.
    pub fn eval_with_scope(&self, scope: &mut Scope, script: &str) -> RhaiResult<Dynamic> {
        self.engine.eval_with_scope::<Dynamic>(scope, script)
    }

    /// Evaluates a script file.
    pub fn run_file(&self, path: impl AsRef<Path>) -> RhaiResult<Dynamic> {
        self.engine
            .eval_file::<Dynamic>(path.as_ref().to_path_buf())
    }

    /// Releases every native resource still bound.
    ///
    /// Script values that outlive this see `UseAfterFreeError`.
    pub fn teardown(&self) -> usize {
        let released = self.ctx.registry.release_all();
        let stats = self.ctx.registry.stats();
        info!(
            released,
            allocated = stats.allocated,
            total_released = stats.released,
            "runtime torn down"
        );
        released
    }
}

impl Drop for ScriptRuntime {
    fn drop(&mut self) {
        self.teardown();
    }
}
