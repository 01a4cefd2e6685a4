use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::Router;
use neuralstride::config::Config;
use neuralstride::logging::init_tracing;
use neuralstride::monitor::MonitorContext;
use neuralstride::routes::build_router;
use neuralstride::state::AppState;
use neuralstride::store::Store;
use neuralstride::workers::WorkerManager;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&config.log_config());
    tracing::info!("Starting neuralstride monitor service");

    let store = Arc::new(Store::open(&config.sled_path).expect("Failed to open sled database"));
    store.run_migrations().expect("Failed to run migrations");

    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let monitor = Arc::new(MonitorContext::new(store.clone(), config.drift));

    let state = AppState::new(
        store.clone(),
        monitor.clone(),
        &config,
        shutdown_tx.clone(),
    );

    let worker_handle = spawn_workers(&config, store.clone(), monitor, &shutdown_tx);
    let app = build_app(state, &config);

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    let server_future = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()));

    if let Err(e) = server_future.await {
        tracing::error!(error = %e, "HTTP server crashed");
    }
    if let Some(handle) = worker_handle {
        let _ = shutdown_tx.send(());
        let _ = handle.await;
    }

    tracing::info!("Flushing store before exit");
    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush store before exit");
    }
    tracing::info!("Shutdown complete");
}

/// Drift ticks and store flushes run only on the leader instance. A panicking
/// worker is logged and the HTTP server keeps going.
fn spawn_workers(
    config: &Config,
    store: Arc<Store>,
    monitor: Arc<MonitorContext>,
    shutdown_tx: &broadcast::Sender<()>,
) -> Option<JoinHandle<()>> {
    if !config.worker.is_leader {
        tracing::info!("Not the worker leader; drift ticks disabled");
        return None;
    }

    let manager = WorkerManager::new(store, monitor, shutdown_tx.subscribe(), &config.worker);
    let handle = tokio::spawn(async move {
        if let Err(e) = manager.start().await {
            tracing::error!(error = %e, "Worker manager failed");
        }
    });

    Some(tokio::spawn(async move {
        match handle.await {
            Err(e) => tracing::error!(error = %e, "Worker task panicked, HTTP server continues"),
            Ok(()) => tracing::info!("Worker manager exited normally"),
        }
    }))
}

fn build_app(state: AppState, config: &Config) -> Router {
    build_router(state)
        .layer(build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origin.trim() == "*" {
        // Local session clients connect from arbitrary origins.
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_credentials(false)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_methods(Any);
    }

    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_methods(Any),
        Err(e) => {
            panic!(
                "FATAL: Invalid CORS_ORIGIN '{}': {}. \
                 Fix the CORS_ORIGIN environment variable.",
                config.cors_origin, e
            );
        }
    }
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
