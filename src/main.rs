//! Dip-hedge bot entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dip_hedge::api::{create_router, AppState};
use dip_hedge::config::Config;
use dip_hedge::execution::clob::ClobOrderAdapter;
use dip_hedge::execution::sim::SimOrderAdapter;
use dip_hedge::execution::{ClientIdSource, ExecutionEngine, OrderAdapter, UuidIdSource};
use dip_hedge::journal::{FileJournal, Journal};
use dip_hedge::metrics;
use dip_hedge::risk::RiskGate;
use dip_hedge::service::BotService;
use dip_hedge::strategy::DipHedgeStrategy;

/// Dip-hedge bot for binary-outcome prediction markets.
#[derive(Parser, Debug)]
#[command(name = "dip-hedge")]
#[command(about = "Automated two-leg hedge bot for binary outcome markets")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Run in dry-run mode (no real orders).
    #[arg(long)]
    dry_run: Option<bool>,

    /// HTTP server port for health/metrics.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the main bot loop (default).
    Run {
        /// Run in dry-run mode (no real orders).
        #[arg(long)]
        dry_run: Option<bool>,

        /// HTTP server port for health/metrics.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("dip_hedge=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Run { dry_run, port }) => cmd_run(dry_run, port).await,
        None => cmd_run(args.dry_run, args.port).await,
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("DIP-HEDGE BOT - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Market: {}", config.market_slug);
    println!("  Dry Run: {}", config.dry_run);
    println!("  Feed Mode: {}", config.feed_mode);
    println!("  Trigger: {} {}% over {}s", config.trigger_mode, config.move_pct_threshold, config.move_window_seconds);
    println!("  Sum Target: {} (defensive ceiling {})", config.sum_target, config.sum_target_max);
    println!("  Leg-2 Timeout: {}s -> {}", config.leg2_timeout_seconds, config.leg2_timeout_action);
    println!("  Per-Leg Budget: ${} (bankroll ${})", config.max_usd_per_leg, config.bankroll_usd);
    println!("  Hourly Order Limit: {}", config.max_orders_per_hour);
    println!("  Daily Loss Limit: ${}", config.daily_loss_limit_usd);
    println!("  Circuit Breaker: {} failures -> {}s pause", config.circuit_breaker_failures, config.circuit_breaker_cooldown_seconds);
    println!("  Order TTL: {}s, Max Requotes: {}", config.order_ttl_seconds, config.max_requotes);
    println!("  API Key: {}", if config.api_key.is_some() { "present" } else { "absent" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the main bot loop.
async fn cmd_run(dry_run_override: Option<bool>, port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Some(dry_run) = dry_run_override {
        config.dry_run = dry_run;
    }
    if let Some(port) = port_override {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    let config = Arc::new(config);

    info!("Configuration loaded successfully");
    info!(
        "Mode: {}",
        if config.dry_run { "SIMULATION" } else { "LIVE TRADING" }
    );
    info!("Market: {}", config.market_slug);
    info!("Sum target: {}", config.sum_target);
    info!("Per-leg budget: ${}", config.max_usd_per_leg);

    // Metrics exporter feeds the /metrics endpoint.
    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {e}"))?;
    metrics::init_metrics();

    let app_state = AppState::new().with_prometheus(prometheus);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state.clone());
    let _server_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    let adapter: Arc<dyn OrderAdapter> = if config.dry_run {
        Arc::new(SimOrderAdapter::new())
    } else {
        Arc::new(ClobOrderAdapter::new(&config).map_err(|e| anyhow::anyhow!(e))?)
    };
    let engine = ExecutionEngine::new(adapter, Duration::from_secs(config.order_ttl_seconds));
    let risk = RiskGate::new(&config);
    let journal: Arc<dyn Journal> = Arc::new(FileJournal::new(&config.journal_dir)?);
    let ids: Arc<dyn ClientIdSource> = Arc::new(UuidIdSource);

    let strategy = DipHedgeStrategy::new(config.clone(), engine, risk, journal, ids);
    let service = BotService::new(config, strategy, app_state);

    service.run().await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
