pub mod chart_view;
pub mod errors;
pub mod logging;
pub mod pagination;
pub mod tooltip;
