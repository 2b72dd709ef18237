//! Entry points for page scripts.

pub mod wasm_api;

pub use wasm_api::{ChartSession, ChartWidget, TablePager};
