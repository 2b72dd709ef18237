use derive_more::Display;

use crate::domain::chart_view::CacheKey;

/// Everything that can go wrong between the URL, the API and the chart.
///
/// None of these escape a controller: they end up as an ignored input, a
/// full-range zoom or the "no data" state, and get logged on the way.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ChartError {
    #[display(fmt = "Invalid bin: {}", _0)]
    InvalidBin(String),
    #[display(fmt = "Invalid chart: {}", _0)]
    InvalidChart(String),
    #[display(fmt = "Invalid zoom encoding: {}", _0)]
    InvalidZoomEncoding(String),
    #[display(fmt = "Fetch failed: {}", _0)]
    FetchFailure(String),
    #[display(fmt = "Empty response for {}", _0)]
    EmptyResponse(CacheKey),
    #[display(fmt = "Configuration error: {}", _0)]
    Configuration(String),
    #[display(fmt = "Browser API error: {}", _0)]
    Browser(String),
}

impl std::error::Error for ChartError {}

impl ChartError {
    /// Whether the failure should show up as "no data available".
    pub fn is_no_data(&self) -> bool {
        matches!(self, ChartError::FetchFailure(_) | ChartError::EmptyResponse(_))
    }
}

impl From<ChartError> for wasm_bindgen::JsValue {
    fn from(error: ChartError) -> Self {
        wasm_bindgen::JsValue::from_str(&error.to_string())
    }
}

pub type ChartResult<T> = Result<T, ChartError>;
