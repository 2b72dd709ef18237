use wasm_bindgen::prelude::*;

use crate::domain::logging::LogComponent;
use crate::infrastructure::ConsoleLogger;

pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

/// Install the panic hook, console logger and browser clock.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let logger =
        if cfg!(debug_assertions) { ConsoleLogger::new_development() } else { ConsoleLogger::new_production() };
    domain::logging::init_logger(Box::new(logger));
    domain::logging::init_time_provider(Box::new(infrastructure::BrowserTimeProvider::new()));

    crate::log_info!(LogComponent::Presentation("Initialize"), "🚀 Explorer charts initialized");
}
