//! Chart view aggregate: bins, zoom windows, URL-mirrored settings and
//! the series shape the chart consumes.

pub mod repositories;
pub mod series;
pub mod settings;
pub mod value_objects;
pub mod zoom;

pub use repositories::*;
pub use series::*;
pub use settings::*;
pub use value_objects::*;
pub use zoom::ZoomRequest;
