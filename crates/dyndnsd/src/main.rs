// # dyndnsd - dyndns2 Update Daemon
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing the runtime
// 3. Building the record directory and update service
// 4. Serving `/nic/update` until SIGTERM/SIGINT
//
// ## Configuration
//
// ### Server
// - `DDNS_LISTEN_ADDR`: Listen address (default 0.0.0.0)
// - `DDNS_PORT` (or `PORT`): Listen port (default 3000)
// - `DDNS_USERNAME`, `DDNS_PASSWORD`: Basic auth credentials (required)
//
// ### DNS Provider
// - `DDNS_PROVIDER_TYPE`: Provider type (cloudflare, memory)
// - `DDNS_PROVIDER_API_TOKEN` (or `CLOUDFLARE_API_KEY`): API token
// - `DDNS_ZONE` (or `CLOUDFLARE_ZONE`): Zone name (required)
// - `DDNS_ZONE_ID`: Zone ID (optional, skips the zone lookup)
// - `DDNS_MODE`: `dry-run` to log mutations without sending them
//
// ### Update Policy
// - `DDNS_ALLOWED_HOSTNAMES` (or `ALLOWED_HOSTNAMES`): Comma-separated allow-list
// - `DDNS_ALLOW_LIST_ORDER`: `after-validation` (default) or `before-validation`
// - `DDNS_CREATE_MISSING`: Create absent A/AAAA records (default true)
//
// ## Example
//
// ```bash
// export DDNS_USERNAME=router
// export DDNS_PASSWORD=a-long-random-secret
// export DDNS_PROVIDER_API_TOKEN=your_token
// export DDNS_ZONE=example.com
// export DDNS_ALLOWED_HOSTNAMES=home.example.com
//
// dyndnsd
// ```

use anyhow::Result;
use dyndnsd::{Config, build_state, create_router};
use std::net::SocketAddr;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DyndnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DyndnsExitCode> for ExitCode {
    fn from(code: DyndnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DyndnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DyndnsExitCode::ConfigError.into();
    }

    let log_level = match config.tracing_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DyndnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DyndnsExitCode::ConfigError.into();
    }

    info!("Starting dyndnsd");
    if config.allowed_hostnames.is_empty() {
        info!("No hostname allow-list configured; all hostnames in {} accepted", config.zone);
    } else {
        info!("Allow-list: {} hostname(s)", config.allowed_hostnames.len());
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DyndnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        let state = match build_state(&config) {
            Ok(state) => state,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DyndnsExitCode::ConfigError;
            }
        };

        let addr = match config.socket_addr() {
            Ok(addr) => addr,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DyndnsExitCode::ConfigError;
            }
        };

        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind {}: {}", addr, e);
                return DyndnsExitCode::ConfigError;
            }
        };

        if let Err(e) = serve(listener, state).await {
            error!("Server error: {:#}", e);
            DyndnsExitCode::RuntimeError
        } else {
            DyndnsExitCode::CleanShutdown
        }
    })
    .into()
}

/// Serve until a shutdown signal arrives; in-flight requests finish
async fn serve(listener: tokio::net::TcpListener, state: dyndnsd::AppState) -> Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    let app = create_router(state).into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down dyndnsd");
    Ok(())
}

/// Resolve once SIGTERM or SIGINT is received
#[cfg(unix)]
async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGTERM handler: {}", e);
            return std::future::pending().await;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGINT handler: {}", e);
            return std::future::pending().await;
        }
    };

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", received);
}

/// Resolve once CTRL-C is received
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => error!("Failed to wait for CTRL-C: {}", e),
    }
}
