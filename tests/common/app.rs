use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use neuralstride::clock::ManualClock;
use neuralstride::config::{Config, DriftConfig, SessionConfig, WorkerConfig};
use neuralstride::monitor::MonitorContext;
use neuralstride::routes::build_router;
use neuralstride::state::AppState;
use neuralstride::store::Store;

/// Fixed start time for the manual clock (2024-03-02T00:00:00Z).
pub const START_MS: u64 = 1_709_337_600_000;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    pub clock: Arc<ManualClock>,
    pub shutdown_tx: broadcast::Sender<()>,
    _temp_dir: TempDir,
}

pub async fn spawn_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("neuralstride-test.sled");

    // Built directly so tests never race on process environment variables.
    let config = Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string_lossy().to_string(),
        cors_origin: "*".to_string(),
        worker: WorkerConfig {
            is_leader: false,
            drift_cron: "*/5 * * * * *".to_string(),
        },
        drift: DriftConfig::default(),
        session: SessionConfig::default(),
    };

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let clock = Arc::new(ManualClock::new(START_MS));
    let monitor = Arc::new(
        MonitorContext::new(store.clone(), config.drift)
            .with_clock(clock.clone())
            .with_rng_seed(7),
    );
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(store, monitor, &config, shutdown_tx.clone());

    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        clock,
        shutdown_tx,
        _temp_dir: temp_dir,
    }
}
