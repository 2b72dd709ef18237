//! Browser adapters for the application ports.

pub mod http;
pub mod query;
pub mod rendering;
pub mod services;

pub use http::ExplorerApiClient;
pub use query::BrowserQueryStore;
pub use rendering::{DygraphRenderer, ZoomListener, ZoomListenerSlot};
pub use services::{BrowserTimeProvider, ConsoleLogger};
