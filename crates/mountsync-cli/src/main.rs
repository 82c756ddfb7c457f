//! # Mountsync CLI Entry Point
//!
//! Front end for the mount table refresh service. Targets are supplied as
//! admin addresses on the command line; the service fans a refresh out to
//! all of them on a fixed period or once.
//!
//! ## Usage
//!
//! ```bash
//! # Run the service, refreshing every 30s
//! mountsync run -t 10.0.0.1:9001 -t 10.0.0.2:9001 --local 10.0.0.3:9001
//!
//! # One cycle, exit code 0 iff every target refreshed
//! mountsync refresh -t 10.0.0.1:9001 -t 10.0.0.2:9001
//! ```

mod admin;

use admin::{HttpAdminFactory, LocalMountTableAdmin};
use anyhow::Result;
use argh::FromArgs;
use mountsync_common::Target;
use mountsync_refresher::{MountTableRefresherService, RefresherConfig, StaticTargetResolver};
use std::sync::Arc;
use std::time::Duration;

/// mountsync - mount table refresh coordinator for a federated router fleet
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Run(RunArgs),
    Refresh(RefreshArgs),
}

/// Run the refresh service, triggering a cycle on a fixed period
#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
struct RunArgs {
    /// admin address of a remote router (repeatable)
    #[argh(option, short = 't', long = "target")]
    targets: Vec<String>,

    /// admin address of this router, refreshed in-process
    #[argh(option)]
    local: Option<String>,

    /// period between refresh cycles in milliseconds
    #[argh(option, default = "30000")]
    period_ms: u64,

    /// per-cycle timeout in milliseconds
    #[argh(option, default = "1000")]
    timeout_ms: u64,

    /// max idle lifetime of a cached admin client in milliseconds
    #[argh(option, default = "60000")]
    max_live_ms: u64,

    /// period between client cache cleanup sweeps in milliseconds
    #[argh(option, default = "15000")]
    cleanup_period_ms: u64,

    /// maximum concurrent in-flight refresh calls
    #[argh(option, default = "32")]
    max_concurrency: usize,
}

/// Perform a single refresh cycle and exit
#[derive(FromArgs)]
#[argh(subcommand, name = "refresh")]
struct RefreshArgs {
    /// admin address of a remote router (repeatable)
    #[argh(option, short = 't', long = "target")]
    targets: Vec<String>,

    /// admin address of this router, refreshed in-process
    #[argh(option)]
    local: Option<String>,

    /// per-cycle timeout in milliseconds
    #[argh(option, default = "1000")]
    timeout_ms: u64,

    /// maximum concurrent in-flight refresh calls
    #[argh(option, default = "32")]
    max_concurrency: usize,
}

/// 30s cap on a single HTTP admin call, independent of the cycle deadline.
const HTTP_CALL_TIMEOUT: Duration = Duration::from_secs(30);

fn build_service(
    remote: &[String],
    local: Option<&String>,
    config: RefresherConfig,
) -> Arc<MountTableRefresherService> {
    let mut targets: Vec<Target> = remote
        .iter()
        .map(|address| Target::remote(address.as_str()))
        .collect();
    if let Some(address) = local {
        targets.push(Target::local(address.as_str()));
    }
    Arc::new(MountTableRefresherService::new(
        Arc::new(StaticTargetResolver::new(targets)),
        HttpAdminFactory::new(HTTP_CALL_TIMEOUT),
        Arc::new(LocalMountTableAdmin),
        config,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Default log level INFO, RUST_LOG overrides
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    match cli.command {
        Commands::Run(args) => {
            let config = RefresherConfig {
                update_timeout: Duration::from_millis(args.timeout_ms),
                client_max_live: Duration::from_millis(args.max_live_ms),
                cleanup_period: Duration::from_millis(args.cleanup_period_ms),
                max_concurrency: args.max_concurrency,
            };
            let service = build_service(&args.targets, args.local.as_ref(), config);

            service.service_init().await?;
            tracing::info!(
                "Refreshing {} target(s) every {}ms",
                args.targets.len() + usize::from(args.local.is_some()),
                args.period_ms
            );

            let mut ticker = tokio::time::interval(Duration::from_millis(args.period_ms));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        service.refresh().await;
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutting down");
                        service.interrupt();
                        break;
                    }
                }
            }
            service.service_stop().await;
            Ok(())
        }
        Commands::Refresh(args) => {
            let config = RefresherConfig {
                update_timeout: Duration::from_millis(args.timeout_ms),
                max_concurrency: args.max_concurrency,
                ..Default::default()
            };
            let service = build_service(&args.targets, args.local.as_ref(), config);

            let summary = service.refresh().await;
            service.service_stop().await;
            if summary.all_succeeded() {
                Ok(())
            } else {
                std::process::exit(1);
            }
        }
    }
}
