pub mod bridge;
pub mod clock;
pub mod coach;
pub mod config;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod monitor;
pub mod plant;
pub mod posture;
pub mod response;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod workers;
