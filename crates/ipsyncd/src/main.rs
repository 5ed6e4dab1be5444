// # ipsyncd - scheduled DNS sync daemon
//
// Thin integration layer: everything that decides what to patch lives in
// ipsync-core. The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the Cloudflare provider, HTTP IP source and notification sink
// 4. Running the scheduler until SIGTERM/SIGINT
//
// ## Configuration
//
// ### Required
// - `IPSYNC_CLOUDFLARE_API_TOKEN`: API token (Zone:Read, DNS:Edit)
// - `IPSYNC_RECORDS`: Comma-separated list of DNS records to keep in sync
//
// ### Optional
// - `IPSYNC_CLOUDFLARE_API_BASE`: API base override
// - `IPSYNC_IP_SOURCE_URL`: Plain-text IP echo service (default: https://api.ipify.org)
// - `IPSYNC_WEBHOOK_URL`: Discord-compatible webhook for summaries
// - `IPSYNC_SERVER_NAME`: Prefix for webhook messages
// - `IPSYNC_RECONCILE_INTERVAL_SECS`: Seconds between passes (default: 600)
// - `IPSYNC_IP_REPORT_INTERVAL_SECS`: Seconds between IP reports, 0 disables (default: 600)
// - `IPSYNC_HTTP_TIMEOUT_SECS`: Per-request timeout (default: 30)
// - `IPSYNC_MODE`: `live` or `dry-run` (default: live)
// - `IPSYNC_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export IPSYNC_CLOUDFLARE_API_TOKEN=your_token
// export IPSYNC_RECORDS=home.example.com,vpn.example.com
// export IPSYNC_WEBHOOK_URL=https://discord.com/api/webhooks/...
//
// ipsyncd
// ```

mod config;

use anyhow::{Context, Result};
use ipsync_core::config::DEFAULT_CLOUDFLARE_API_BASE;
use ipsync_core::traits::NotificationSink;
use ipsync_core::{NoopSink, NotificationConfig, ProviderConfig, Reconciler, Scheduler, SyncConfig};
use ipsync_ip_http::HttpIpSource;
use ipsync_notify_webhook::WebhookSink;
use ipsync_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use crate::config::{Config, Mode};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum IpsyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<IpsyncExitCode> for ExitCode {
    fn from(code: IpsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load and validate configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return IpsyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return IpsyncExitCode::ConfigError.into();
    }

    info!("Starting ipsyncd daemon");
    info!(
        "Configuration loaded: {} record(s), mode {:?}",
        config.records.len(),
        config.mode
    );
    if config.mode == Mode::DryRun {
        info!("Dry-run mode: no DNS record will be modified");
    }

    let sync_config = config.to_sync_config();
    let reconciler = match build_reconciler(&sync_config, config.http_timeout_secs) {
        Ok(reconciler) => Arc::new(reconciler),
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return IpsyncExitCode::ConfigError.into();
        }
    };

    let scheduler = match Scheduler::new(reconciler, sync_config.schedule.clone()) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!("Invalid schedule: {}", e);
            return IpsyncExitCode::ConfigError.into();
        }
    };

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return IpsyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(scheduler).await {
            error!("Daemon error: {:#}", e);
            IpsyncExitCode::RuntimeError
        } else {
            IpsyncExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Create the reconciler and its collaborators from configuration
///
/// One HTTP client is shared by the provider, the IP source and the webhook,
/// so the timeout applies to every outbound call.
fn build_reconciler(config: &SyncConfig, http_timeout_secs: u64) -> Result<Reconciler> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(http_timeout_secs))
        .user_agent(concat!("ipsyncd/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let provider = match &config.provider {
        ProviderConfig::Cloudflare { api_token, api_base } => CloudflareProvider::with_client(
            client.clone(),
            api_token.clone(),
            api_base.as_deref().unwrap_or(DEFAULT_CLOUDFLARE_API_BASE),
        )?,
    };
    info!("Provider: {}", config.provider.type_name());

    let ip_source = HttpIpSource::with_client(client.clone(), config.ip_source.url.clone());
    info!("IP source: {}", config.ip_source.url);

    let sink: Box<dyn NotificationSink> = match &config.notification {
        NotificationConfig::Webhook { url, server_name } => {
            info!("Notifications: webhook");
            Box::new(WebhookSink::new(client, url.clone(), server_name.clone()))
        }
        NotificationConfig::None => {
            info!("Notifications: disabled");
            Box::new(NoopSink)
        }
    };

    for record in &config.records {
        info!("Managing record: {}", record);
    }

    Ok(Reconciler::new(
        Box::new(ip_source),
        Box::new(provider),
        sink,
        config,
    )?)
}

/// Run the scheduler until a shutdown signal arrives
async fn run_daemon(scheduler: Scheduler) -> Result<()> {
    let shutdown = shutdown_signal()?;

    info!("Daemon initialized successfully");
    scheduler.run_until(shutdown).await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Future resolving on SIGTERM or SIGINT
///
/// Handlers are installed before returning so a signal arriving during
/// startup is not lost.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Future resolving on Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: Ctrl-C"),
            Err(e) => {
                error!("Failed to wait for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    })
}
