use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use candor_core::media::LocalMediaStore;
use candor_inference::api::EmotionApi;
use candor_inference::scoring::FrameScorer;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use candor_api::background::cascade_reconciler;
use candor_api::config::ServerConfig;
use candor_api::router::build_app_router;
use candor_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "candor_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = candor_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    candor_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    candor_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Media stores ---
    let videos = LocalMediaStore::open(&config.media_dir)
        .await
        .expect("Failed to open media directory");
    let scratch = LocalMediaStore::open(&config.scratch_dir)
        .await
        .expect("Failed to open scratch directory");
    tracing::info!(
        media_dir = %config.media_dir.display(),
        scratch_dir = %config.scratch_dir.display(),
        "Media stores ready"
    );

    // --- Emotion scorer ---
    let emotion_api = EmotionApi::new(config.emotion_api_url.clone(), config.emotion_api_timeout())
        .expect("Failed to build emotion API client");
    tracing::info!(
        url = %emotion_api.predict_url(),
        timeout_secs = config.emotion_api_timeout_secs,
        "Emotion API client configured"
    );
    let frame_scorer = FrameScorer::new(Arc::new(scratch), emotion_api);

    // --- Cascade reconciler ---
    let reconciler_cancel = CancellationToken::new();
    let reconciler_handle = tokio::spawn(cascade_reconciler::run(
        pool.clone(),
        config.cascade_sweep_interval(),
        reconciler_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        videos: Arc::new(videos),
        frame_scorer: Arc::new(frame_scorer),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reconciler_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reconciler_handle).await;
    tracing::info!("Cascade reconciler stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
