use anyhow::{Context, Result};
use brawlr_trainer::save::spawn_match_end_listener;
use brawlr_trainer::{
    create_router, AppState, Config, MatchTimer, NatsScoreStore, NatsTransport, SaveWorkflow,
    SessionConfig, SessionController, StatsAggregator,
};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Parser)]
#[command(name = "brawlr-trainer", about = "Real-time boxing training session controller")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/brawlr-trainer")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);
    info!(
        "HTTP server will bind to {}:{}",
        cfg.service.http.bind, cfg.service.http.port
    );
    info!("Inference service: {}", cfg.inference.nats_url);

    // Timer and statistics live for the whole process; the reset generation
    // keeps them decoupled
    let timer = Arc::new(MatchTimer::new(cfg.match_timer.default_duration_secs));
    timer.start_ticker();

    let stats = Arc::new(StatsAggregator::new());
    stats.observe_resets(timer.subscribe_resets());

    let transport = Arc::new(NatsTransport::new(
        cfg.inference.nats_url.clone(),
        cfg.inference.subject_prefix.clone(),
    ));

    let session_config = SessionConfig::from_config(&cfg);
    info!("Session context: {}", session_config.session_id);

    let (controller, session_ends) = SessionController::new(
        session_config,
        Arc::clone(&timer),
        Arc::clone(&stats),
        transport,
    );

    let store = Arc::new(NatsScoreStore::new(
        cfg.inference.nats_url.clone(),
        cfg.leaderboard.subject_prefix.clone(),
    ));

    let workflow = Arc::new(Mutex::new(SaveWorkflow::new(store.clone())));
    spawn_match_end_listener(session_ends, Arc::clone(&workflow));

    let state = AppState {
        controller: Arc::clone(&controller),
        timer,
        stats,
        workflow,
        store,
        top_limit: cfg.leaderboard.top_limit,
    };

    let router = create_router(state);
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);

    let shutdown_controller = Arc::clone(&controller);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
            // Teardown converges on the same path as a user stop
            shutdown_controller.stop_session().await.ok();
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}
