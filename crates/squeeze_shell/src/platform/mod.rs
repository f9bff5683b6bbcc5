mod app;
mod bootstrap;
mod bridge;
mod config;
mod convert;
mod effects;
mod logging;
mod persistence;
mod ui;

pub use app::run_app;
