use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tryon_server::config::Config;
use tryon_server::session::SessionConfig as SessionStateConfig;
use tryon_server::{
    AppState, HttpOverlayGenerator, OverlayOrchestrator, SessionManager, overlay_routes,
    session_routes,
};

/// Application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Prometheus metrics handle for exposing metrics in Prometheus format
static PROMETHEUS_HANDLE: std::sync::OnceLock<PrometheusHandle> = std::sync::OnceLock::new();

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    active_sessions: usize,
    processing_sessions: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);
    let (sessions, processing) = state.get_stats().await;

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime,
        active_sessions: sessions,
        processing_sessions: processing,
    })
}

/// Endpoint to expose metrics in Prometheus format
async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Update gauge metrics for sessions (called periodically)
async fn update_gauge_metrics(state: &AppState) {
    let (sessions, processing) = state.get_stats().await;

    metrics::gauge!("tryon_sessions_active").set(sessions as f64);
    metrics::gauge!("tryon_sessions_processing").set(processing as f64);

    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);
    metrics::gauge!("tryon_uptime_seconds").set(uptime as f64);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    START_TIME.set(Instant::now()).ok();

    // Metrics recorder must be installed before anything is recorded
    let prometheus_handle = PrometheusBuilder::new().install_recorder()?;
    PROMETHEUS_HANDLE.set(prometheus_handle).ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tryon=debug,tryon_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Loaded configuration: host={}, port={}",
        config.host, config.port
    );
    info!("Overlay service: {}", config.overlay_service.url);
    if config.overlay_service.api_key.is_none() {
        warn!("OVERLAY_SERVICE_API_KEY not set - requests are sent unauthenticated");
    }

    let generator = HttpOverlayGenerator::new(&config.overlay_service)?;
    let retry = config.overlay_service.retry_policy();
    if retry.max_attempts > 1 {
        info!(
            "Overlay retries enabled: {} attempts, {:?} initial backoff",
            retry.max_attempts, retry.backoff
        );
    }
    let orchestrator = OverlayOrchestrator::new(Arc::new(generator)).with_retry_policy(retry);

    let session_manager = Arc::new(SessionManager::with_config(SessionStateConfig {
        idle_ttl: config.session.idle_ttl,
    }));

    let app_state = AppState::new(orchestrator).with_session_manager(session_manager);

    // Periodic cleanup for idle sessions
    let cleanup_state = app_state.clone();
    let cleanup_interval = config.session.cleanup_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            cleanup_state.session_manager.cleanup_expired().await;
        }
    });

    // Periodic update of gauge metrics (every 5 seconds)
    let metrics_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(5));
        loop {
            interval.tick().await;
            update_gauge_metrics(&metrics_state).await;
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/metrics/prometheus", get(prometheus_metrics))
        .nest("/api", overlay_routes().merge(session_routes()))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Serve the kiosk front-end if configured
    let app = if let Some(ref static_dir) = config.static_files.dir {
        if static_dir.exists() {
            info!("Serving static files from: {:?}", static_dir);

            // SPA fallback: serve index.html for any unmatched routes
            let index_path = static_dir.join("index.html");
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_path));

            let static_service = ServiceBuilder::new()
                .layer(CompressionLayer::new())
                .service(serve_dir);

            app.fallback_service(static_service)
        } else {
            warn!(
                "Static files directory not found: {:?} - static file serving disabled",
                static_dir
            );
            app
        }
    } else {
        info!("Static file serving disabled (STATIC_FILES_DIR not set)");
        app
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Try-on server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
