mod app;
mod commands;
mod effects;
mod logging;
pub mod settings;
mod ui;

pub use app::run_app;
