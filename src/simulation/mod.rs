pub mod config;
pub mod logging;
pub mod messaging;
pub mod route;
pub mod session;
pub mod telemetry;
pub mod vehicle;
