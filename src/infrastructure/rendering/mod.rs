pub mod dygraph;

pub use dygraph::{DygraphRenderer, ZoomListener, ZoomListenerSlot};
