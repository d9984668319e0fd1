//! pulsetop: live host telemetry dashboard fed by a WebSocket push stream.

pub mod app;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod incidents;
pub mod kill;
pub mod profiles;
pub mod table;
pub mod types;
pub mod ui;
pub mod ws;
