use anyhow::Result;
use dotenv::dotenv;
use fantasy_rust_core::clients::EspnFantasyClient;
use fantasy_rust_core::clock::{Clock, SystemClock};
use fantasy_rust_core::metadata_cache::MetadataCache;
use fantasy_rust_core::providers::{EspnLeagueProvider, LeagueDataProvider};
use report_service_rust::commands::CommandHandler;
use report_service_rust::config::Config;
use report_service_rust::health;
use report_service_rust::jobs::build_jobs;
use report_service_rust::listener::run_command_listener;
use report_service_rust::reporting::ReportingFacade;
use report_service_rust::scheduler::JobScheduler;
use report_service_rust::telegram_client::{MessageSink, TelegramClient};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Fantasy Report Service...");

    let cfg = Config::from_env()?;
    info!(
        "Config: league={} season={} tz={} teams={}",
        cfg.espn.league_id,
        cfg.espn.year,
        cfg.schedule_timezone,
        cfg.league.teams.len()
    );

    let espn = EspnFantasyClient::new(cfg.espn.clone(), cfg.request_timeout);
    let provider: Arc<dyn LeagueDataProvider> = Arc::new(EspnLeagueProvider::new(espn));
    info!("League data source: {}", provider.provider_name());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let facade = Arc::new(ReportingFacade::new(
        provider,
        Arc::new(MetadataCache::new(cfg.metadata_ttl)),
        Arc::clone(&clock),
        Arc::new(cfg.league.clone()),
    ));

    let telegram = TelegramClient::new(cfg.telegram_token.clone(), cfg.chat_id, cfg.request_timeout);
    match telegram.get_me().await {
        Ok(me) => info!(
            "Telegram bot authorized as @{}",
            me.username.as_deref().unwrap_or("unknown")
        ),
        Err(e) => warn!("Telegram getMe failed: {:#}", e),
    }
    let sink: Arc<dyn MessageSink> = Arc::new(telegram.clone());

    let mut scheduler = JobScheduler::new(cfg.schedule_timezone, clock);
    for job in build_jobs(Arc::clone(&facade), sink) {
        scheduler.add_job(job);
    }
    scheduler.start()?;
    info!("Job scheduler started with {} jobs", scheduler.jobs().count());

    let health_listener = health::bind(cfg.health_port).await?;
    health::spawn_health_server(health_listener);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener = tokio::spawn(run_command_listener(
        telegram,
        Arc::new(CommandHandler::new(Arc::clone(&facade))),
        shutdown_rx,
    ));

    wait_for_shutdown().await;

    if let Err(e) = scheduler.stop() {
        error!("Error stopping scheduler: {}", e);
    }
    let _ = shutdown_tx.send(true);
    if let Err(e) = listener.await {
        error!("Command listener task failed: {}", e);
    }

    info!("Fantasy Report Service stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(err) => {
            error!("Unable to listen for SIGTERM: {}", err);
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = wait_for_ctrl_c() => {}
        _ = term.recv() => info!("Received SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }
}
