use std::collections::HashMap;

use gloo::utils::format::JsValueSerdeExt;
use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::domain::{
    chart_view::{Bin, ChartKind, TimeUnit, ViewSettings},
    errors::ChartError,
    logging::LogLevel,
};

/// Per-widget configuration, handed over by the page as a JS object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    /// Element the control surface and chart are mounted into.
    pub container_id: String,
    /// Prefix for API requests; empty means same origin.
    pub api_base: String,
    /// `/api/<domain>/<chart>/<bin>`
    pub domain: String,
    pub charts: Vec<ChartKind>,
    pub bins: Vec<Bin>,
    pub default_chart: ChartKind,
    pub default_bin: Bin,
    /// Session slot shared with other widgets of the same report, if any.
    pub session_slot: Option<String>,
    /// Minimum time the loading state stays up on a cache hit.
    pub loading_delay_ms: u32,
    pub time_unit: TimeUnit,
    pub log_level: LogLevel,
    /// Raw `title` payloads for the series toggles, by API series name.
    pub series_titles: HashMap<String, String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            container_id: "chart-view".to_string(),
            api_base: String::new(),
            domain: "atomicswaps".to_string(),
            charts: vec![ChartKind::Amount, ChartKind::Count],
            bins: vec![Bin::Day, Bin::Week, Bin::Month, Bin::Year, Bin::All],
            default_chart: ChartKind::Amount,
            default_bin: Bin::Week,
            session_slot: None,
            loading_delay_ms: 40,
            time_unit: TimeUnit::Seconds,
            log_level: LogLevel::Info,
            series_titles: HashMap::new(),
        }
    }
}

impl ChartConfig {
    /// Read from a JS object; `undefined`/`null` gives the defaults.
    pub fn from_js(value: &JsValue) -> Result<Self, ChartError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let config: Self = value
            .into_serde()
            .map_err(|e| ChartError::Configuration(format!("unreadable chart config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if self.charts.is_empty() {
            return Err(ChartError::Configuration("no charts enabled".to_string()));
        }
        if self.bins.is_empty() {
            return Err(ChartError::Configuration("no bins enabled".to_string()));
        }
        if !self.charts.contains(&self.default_chart) {
            return Err(ChartError::Configuration(format!("default chart {} is not enabled", self.default_chart)));
        }
        if !self.bins.contains(&self.default_bin) {
            return Err(ChartError::Configuration(format!("default bin {} is not enabled", self.default_bin)));
        }
        if self.domain.trim().is_empty() || self.domain.contains('/') {
            return Err(ChartError::Configuration(format!("bad API domain {:?}", self.domain)));
        }
        Ok(())
    }

    /// Settings used when neither the URL nor the session says otherwise.
    pub fn default_settings(&self) -> ViewSettings {
        ViewSettings::new(self.default_chart, self.default_bin)
    }
}
