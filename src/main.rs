//! Alist download proxy.
//!
//! Serves `GET /<path>?sign=<signature>` by checking the signature, asking the
//! Alist server for a direct link to `<path>` and streaming the file back.
//!
//! ```text
//!     Client ──▶ signature check ──▶ /api/fs/link ──▶ file host ──┐
//!       ▲                                                         │
//!       └───────────── sanitized headers + streamed body ◀────────┘
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use alist_proxy::lifecycle::{self, signals, Shutdown, Startup};
use alist_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "alist-proxy")]
#[command(version, about = "Signed download proxy for Alist", long_about = None)]
struct Cli {
    /// Path to the config file (.yaml or .toml)
    #[arg(short = 'c', long = "config", default_value = "config.yaml")]
    config: PathBuf,
}

/// Accept the single-dash `-help` spelling alongside `-h`/`--help`.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| if arg == "-help" { OsString::from("--help") } else { arg })
        .collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let config = match lifecycle::bootstrap(&cli.config) {
        Ok(Startup::Ready(config)) => config,
        Ok(Startup::DefaultWritten(path)) => {
            println!(
                "Created default config at {}, please edit it and restart the proxy!",
                path.display()
            );
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("load config error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log_level);
    tracing::info!("alist-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    match lifecycle::startup::run(config, shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start");
            ExitCode::FAILURE
        }
    }
}
