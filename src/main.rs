#![forbid(unsafe_code)]

//! `mcp-cli-bridge`: MCP stdio server fronting the `codex` or `gemini` CLI.
//!
//! Loads configuration (falling back to defaults), initializes logging on
//! stderr and the per-mode log file, then serves JSON-RPC on stdin/stdout
//! until EOF or a shutdown signal.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use mcp_cli_bridge::config::{ConfigSource, GlobalConfig};
use mcp_cli_bridge::mcp::handler::{AppState, BridgeServer};
use mcp_cli_bridge::mcp::transport;
use mcp_cli_bridge::mode::ServerMode;
use mcp_cli_bridge::{AppError, Result};

/// Log file written inside the mode's context directory.
const LOG_FILE_NAME: &str = "mcp-server.log";

/// Grace period for blocking stdin reads once serving has stopped.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "mcp-cli-bridge", about = "MCP bridge for code-assistant CLIs", version, long_about = None)]
struct Cli {
    /// Backing CLI to expose.
    #[arg(long, value_enum, default_value_t = ServerMode::Codex)]
    mode: ServerMode,

    /// Path to the TOML configuration file. Missing or invalid files fall
    /// back to built-in defaults.
    #[arg(long, default_value = "mcp-config.toml")]
    config: PathBuf,

    /// Override the context root directory.
    #[arg(long)]
    context_root: Option<PathBuf>,

    /// Log output format on stderr (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let (mut config, source) = GlobalConfig::load_or_default(&args.config);
    if let Some(root) = args.context_root.clone() {
        config.context_root = Some(root);
    }
    let config = Arc::new(config);

    init_tracing(args.log_format, &config, args.mode)?;
    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "configuration loaded"),
        ConfigSource::Defaults(reason) => warn!(reason, "using default configuration"),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?;

    let result = runtime.block_on(run(config, args.mode));
    // stdin is read on a blocking thread that cannot be interrupted.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn run(config: Arc<GlobalConfig>, mode: ServerMode) -> Result<()> {
    let state = Arc::new(AppState::new(config, mode));
    info!(
        mode = mode.tool_name(),
        context_dir = %state.store.dir().display(),
        "{} ready",
        mode.server_name()
    );

    let ct = CancellationToken::new();
    let server = BridgeServer::new(state);
    let serving = transport::serve_stdio(server, ct.clone());

    let result = tokio::select! {
        result = serving => result,
        () = shutdown_signal() => {
            info!("shutdown signal received");
            ct.cancel();
            Ok(())
        }
    };

    if let Err(err) = &result {
        error!(%err, "transport failed");
    }
    info!("{} shut down", mode.server_name());
    result
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                if let Err(err) = ctrl_c.await {
                    error!(%err, "ctrl-c signal handler failed");
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!(%err, "ctrl-c signal handler failed");
        }
    }
}

/// Install the stderr layer plus, when enabled, a plain-text file layer.
///
/// `RUST_LOG` wins over `logging.level`. The file layer is skipped with a
/// notice on stderr if the log file cannot be opened.
fn init_tracing(log_format: LogFormat, config: &GlobalConfig, mode: ServerMode) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut file_error = None;
    let file_layer = if config.logging.enabled {
        match open_log_file(&config.context_dir(mode)) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            ),
            Err(err) => {
                file_error = Some(err);
                None
            }
        }
    } else {
        None
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    let init = match log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    init.map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?;

    if let Some(err) = file_error {
        warn!(%err, "file logging disabled");
    }
    Ok(())
}

fn open_log_file(dir: &Path) -> Result<std::fs::File> {
    std::fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))?;
    Ok(file)
}
