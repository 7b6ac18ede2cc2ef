use anyhow::{Context, Result};
use bindery_core::config::RuntimeConfig;
use bindery_core::scripting::{CanvasHandle, ScriptRuntime};
use bindery_core::{script_error_kind, DefaultAssetLoader, ImageObject};
use clap::{Parser, ValueEnum};
use rhai::Dynamic;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the Rhai script
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Save the script's result (a Canvas or Image) as PNG
    #[arg(short, long, value_name = "PNG")]
    output: Option<PathBuf>,

    /// JSON runtime config
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extra asset search root, tried first
    #[arg(long, value_name = "DIR")]
    asset_root: Vec<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(level: LogLevel, format: LogFormat) -> Result<()> {
    let directive = level
        .to_string()
        .parse()
        .context("invalid log level directive")?;
    let filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.with_target(false).pretty().init(),
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    }
    .with_env_overrides();

    for root in cli.asset_root.iter().rev() {
        config.asset_roots.insert(0, root.clone());
    }
    // Assets next to the script resolve without extra flags.
    if let Some(dir) = cli.script.parent().filter(|d| !d.as_os_str().is_empty()) {
        config.asset_roots.push(dir.to_path_buf());
    }
    Ok(config)
}

fn save_result(value: Dynamic, path: &Path) -> Result<()> {
    let target = path.to_string_lossy();
    if let Some(canvas) = value.clone().try_cast::<CanvasHandle>() {
        canvas.canvas.lock().save(&target)?;
    } else if let Some(image) = value.clone().try_cast::<ImageObject>() {
        image.get()?.save(&target)?;
    } else {
        anyhow::bail!(
            "script returned {}, expected a Canvas or Image to save",
            value.type_name()
        );
    }
    info!(path = %path.display(), "saved output");
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    info!(script = %cli.script.display(), roots = ?config.asset_roots, "starting");

    let source = fs::read_to_string(&cli.script)
        .with_context(|| format!("failed to read script {}", cli.script.display()))?;

    let loader = Arc::new(DefaultAssetLoader::new(config.asset_roots.clone()));
    let runtime = ScriptRuntime::new(loader, config);

    let result = runtime.eval::<Dynamic>(&source).map_err(|e| {
        match script_error_kind(&e) {
            Some(kind) => error!(kind = %kind, "script failed: {e}"),
            None => error!("script failed: {e}"),
        }
        anyhow::anyhow!("script error: {e}")
    })?;

    match &cli.output {
        Some(path) => save_result(result, path)?,
        None if !result.is_unit() => info!(result = %result, "script finished"),
        None => info!("script finished"),
    }

    let stats = runtime.registry().stats();
    let leaked = runtime.registry().live_count();
    if leaked > 0 {
        warn!(live = leaked, "bindings still alive at exit, tearing down");
    }
    info!(
        allocated = stats.allocated,
        bound = stats.bound,
        released = stats.released,
        "registry stats"
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_level, cli.log_format) {
        eprintln!("failed to initialize logging: {e:#}");
        std::process::exit(2);
    }

    if let Err(e) = run(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}
