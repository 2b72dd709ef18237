//! Application layer: the view controller and the pieces it coordinates.

pub mod cache;
pub mod config;
pub mod controller;
pub mod ports;
pub mod session;

pub use cache::SeriesCache;
pub use config::ChartConfig;
pub use controller::{LoadOutcome, ViewController, ViewPhase};
pub use ports::*;
pub use session::{RememberedView, SessionContext};
