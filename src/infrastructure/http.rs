use std::collections::HashMap;

use futures::future::{FutureExt, LocalBoxFuture};
use gloo_net::http::Request;
use serde_json::Value;

use crate::domain::{
    chart_view::{CacheKey, RawSeries, SeriesSource, TimeUnit},
    errors::ChartError,
    logging::{get_logger, LogComponent, LogLevel},
};

/// Chart API client on top of gloo-net:
/// `GET {base}/api/{domain}/{chart}/{bin}`.
#[derive(Debug, Clone)]
pub struct ExplorerApiClient {
    base_url: String,
    domain: String,
    time_unit: TimeUnit,
    default_headers: HashMap<String, String>,
}

impl ExplorerApiClient {
    pub fn new(base_url: impl Into<String>, domain: impl Into<String>) -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        Self { base_url: base_url.into(), domain: domain.into(), time_unit: TimeUnit::default(), default_headers }
    }

    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.time_unit = time_unit;
        self
    }

    pub fn add_header(mut self, key: String, value: String) -> Self {
        self.default_headers.insert(key, value);
        self
    }

    pub fn chart_url(&self, key: CacheKey) -> String {
        format!("{}/api/{}/{}/{}", self.base_url.trim_end_matches('/'), self.domain, key.chart, key.bin)
    }

    /// GET with JSON body, without shaping.
    pub async fn get_json(&self, url: &str) -> Result<Value, ChartError> {
        get_logger().debug(LogComponent::Infrastructure("HTTP"), &format!("🌐 GET JSON: {}", url));

        let mut request = Request::get(url);
        for (key, value) in &self.default_headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChartError::FetchFailure(format!("Request failed: {:?}", e)))?;

        if !response.ok() {
            let error_msg = format!("HTTP error: {} - {}", response.status(), response.status_text());
            get_logger().log_with_metadata(LogLevel::Error, LogComponent::Infrastructure("HTTP"), &error_msg, url);
            return Err(ChartError::FetchFailure(error_msg));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ChartError::FetchFailure(format!("Failed to parse JSON: {:?}", e)))
    }

    pub async fn fetch_series(&self, key: CacheKey) -> Result<RawSeries, ChartError> {
        let url = self.chart_url(key);
        let body = self.get_json(&url).await?;
        let raw = RawSeries::from_json(&body, self.time_unit);

        crate::log_info!(LogComponent::Infrastructure("HTTP"), "📈 {} buckets for {}", raw.time.len(), key);
        Ok(raw)
    }
}

impl SeriesSource for ExplorerApiClient {
    fn fetch(&self, key: CacheKey) -> LocalBoxFuture<'static, Result<RawSeries, ChartError>> {
        let client = self.clone();
        async move { client.fetch_series(key).await }.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart_view::{Bin, ChartKind};

    #[test]
    fn chart_url_layout() {
        let client = ExplorerApiClient::new("https://explorer.example.org/", "atomicswaps");
        assert_eq!(
            client.chart_url(CacheKey::new(ChartKind::Amount, Bin::Day)),
            "https://explorer.example.org/api/atomicswaps/amount/day"
        );
        let relative = ExplorerApiClient::new("", "treasury");
        assert_eq!(relative.chart_url(CacheKey::new(ChartKind::Balance, Bin::All)), "/api/treasury/balance/all");
    }
}
