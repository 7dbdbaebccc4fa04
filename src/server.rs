use crate::browser::HttpBrowser;
use crate::config::Config;
use crate::ledger::{LedgerStore, SheetsLedger};
use crate::pipeline::{self, sink::IngestionSink, RunHandle};
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub handle: RunHandle,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "hrb-scraper",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Run-state handle: current (or most recent) run's phase and counts.
async fn status(Extension(state): Extension<AppState>) -> impl IntoResponse {
    Json(state.handle.snapshot())
}

/// Starts one pipeline run in the background. The caller gets the run id
/// immediately; progress is available via `/status`. A trigger while a run
/// is in flight is rejected.
async fn trigger(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.handle.is_active() {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": "a run is already in progress" })),
        )
            .into_response();
    }
    let run_id = Uuid::new_v4();
    spawn_run(state, run_id);
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "accepted", "run_id": run_id })),
    )
        .into_response()
}

fn spawn_run(state: AppState, run_id: Uuid) {
    tokio::spawn(async move {
        let mut browser = HttpBrowser::new();
        let ledger: Arc<dyn LedgerStore> =
            Arc::new(SheetsLedger::from_config(&state.config.ledger));
        let sink = IngestionSink::Ledger {
            store: ledger.clone(),
            table: state.config.ledger.table.clone(),
        };
        match pipeline::run_with_id(
            &state.config,
            &mut browser,
            ledger,
            &sink,
            &state.handle,
            run_id,
        )
        .await
        {
            Ok(report) => info!(
                "run {run_id} finished: {} rows appended, {} tasks failed",
                report.rows_appended,
                report.tasks_failed.len()
            ),
            Err(e) => error!("run {run_id} failed: {e}"),
        }
    });
}

/// Create the HTTP server with all routes
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/run", post(trigger))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Seconds until the next wall-clock occurrence of the given minute of hour.
fn secs_until_minute(minute_of_hour: u32, now: DateTime<Utc>) -> u64 {
    let this_hour = now
        .with_minute(minute_of_hour)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    let target = if this_hour > now {
        this_hour
    } else {
        this_hour + ChronoDuration::hours(1)
    };
    (target - now).num_seconds().max(1) as u64
}

/// Recurring trigger at a fixed minute of every hour, disabled by default.
/// A tick that lands while a run is in flight is skipped.
fn start_scheduler(state: AppState) {
    let minute = state.config.scheduler.minute_of_hour;
    info!("scheduler enabled: triggering at minute {minute} of every hour");
    tokio::spawn(async move {
        loop {
            let wait = secs_until_minute(minute, Utc::now());
            tokio::time::sleep(std::time::Duration::from_secs(wait)).await;
            if state.handle.is_active() {
                info!("scheduler tick skipped: a run is already in progress");
                continue;
            }
            let run_id = Uuid::new_v4();
            info!("scheduler tick: starting run {run_id}");
            spawn_run(state.clone(), run_id);
        }
    });
}

/// Start the HTTP trigger server on the configured port
pub async fn start_server(config: Arc<Config>) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.server.port;
    let state = AppState { config: config.clone(), handle: RunHandle::new() };

    if config.scheduler.enabled {
        start_scheduler(state.clone());
    }

    let app = create_server(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("📊 Run status:   http://localhost:{port}/status");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
