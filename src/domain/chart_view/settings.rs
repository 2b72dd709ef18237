use super::value_objects::{Bin, CacheKey, ChartKind, FlowMask};
use super::zoom::ZoomRequest;
use crate::domain::logging::LogComponent;

/// Flat, ordered key/value view of the page query string.
///
/// Encoding and decoding of the actual URL text is left to the browser
/// (`UrlSearchParams`); this type only knows about pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pairs: Vec<(String, String)>,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut state = Self::new();
        for (key, value) in pairs {
            state.set(key, value);
        }
        state
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Later values for a key replace earlier ones in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs joined as `k=v&k=v`, unescaped. For logs and tests.
    pub fn to_display_string(&self) -> String {
        self.pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
    }
}

/// State of one chart widget, mirrored in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSettings {
    pub chart: ChartKind,
    pub bin: Bin,
    pub zoom: Option<ZoomRequest>,
    pub flow: FlowMask,
    pub search: Option<String>,
    pub pair: Option<String>,
    pub status: Option<String>,
}

impl ViewSettings {
    pub const CHART: &'static str = "chart";
    pub const BIN: &'static str = "bin";
    pub const ZOOM: &'static str = "zoom";
    pub const FLOW: &'static str = "flow";
    pub const SEARCH: &'static str = "search";
    pub const PAIR: &'static str = "pair";
    pub const STATUS: &'static str = "status";

    /// Query keys owned by a chart controller.
    pub const KEYS: [&'static str; 7] =
        [Self::CHART, Self::BIN, Self::ZOOM, Self::FLOW, Self::SEARCH, Self::PAIR, Self::STATUS];

    pub fn new(chart: ChartKind, bin: Bin) -> Self {
        Self {
            chart,
            bin,
            zoom: None,
            flow: FlowMask::all(chart.series_count()),
            search: None,
            pair: None,
            status: None,
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.chart, self.bin)
    }

    /// Read settings from the query, taking anything absent or unreadable
    /// from `fallback`.
    pub fn from_query(query: &QueryState, fallback: &ViewSettings) -> Self {
        let chart = query
            .get(Self::CHART)
            .and_then(|raw| parse_or_warn(raw, ChartKind::parse))
            .unwrap_or(fallback.chart);
        let bin = query
            .get(Self::BIN)
            .and_then(|raw| parse_or_warn(raw, Bin::parse))
            .unwrap_or(fallback.bin);
        let zoom = match query.get(Self::ZOOM) {
            Some(raw) => ZoomRequest::parse(raw),
            None => fallback.zoom.clone(),
        };
        // "Everything visible" follows the chart; a narrower fallback is kept as is.
        let fallback_series = fallback.chart.series_count();
        let fallback_flow = if fallback.flow.effective(fallback_series) == FlowMask::all(fallback_series) {
            FlowMask::all(chart.series_count())
        } else {
            fallback.flow
        };
        let flow = query
            .get(Self::FLOW)
            .and_then(|raw| raw.trim().parse::<u8>().ok())
            .filter(|bits| *bits != 0)
            .map(FlowMask::from)
            .unwrap_or(fallback_flow);

        Self {
            chart,
            bin,
            zoom,
            flow,
            search: text_param(query, Self::SEARCH).or_else(|| fallback.search.clone()),
            pair: text_param(query, Self::PAIR).or_else(|| fallback.pair.clone()),
            status: text_param(query, Self::STATUS).or_else(|| fallback.status.clone()),
        }
    }

    /// Serialize, leaving out whatever equals `defaults`.
    pub fn to_query(&self, defaults: &ViewSettings) -> QueryState {
        let mut query = QueryState::new();
        if self.chart != defaults.chart {
            query.set(Self::CHART, self.chart.to_string());
        }
        if self.bin != defaults.bin {
            query.set(Self::BIN, self.bin.to_string());
        }
        if let Some(zoom) = &self.zoom {
            query.set(Self::ZOOM, zoom.to_string());
        }
        let series = self.chart.series_count();
        if self.flow.effective(series) != FlowMask::all(series) {
            query.set(Self::FLOW, self.flow.bits().to_string());
        }
        for (key, value) in [(Self::SEARCH, &self.search), (Self::PAIR, &self.pair), (Self::STATUS, &self.status)] {
            if let Some(value) = value {
                query.set(key, value.clone());
            }
        }
        query
    }
}

fn text_param(query: &QueryState, key: &str) -> Option<String> {
    query.get(key).filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_or_warn<T, E: std::fmt::Display>(raw: &str, parse: impl Fn(&str) -> Result<T, E>) -> Option<T> {
    match parse(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            crate::log_warn!(LogComponent::Domain("ViewSettings"), "ignoring query value: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ViewSettings {
        ViewSettings::new(ChartKind::Amount, Bin::Week)
    }

    #[test]
    fn empty_query_yields_defaults() {
        let settings = ViewSettings::from_query(&QueryState::new(), &defaults());
        assert_eq!(settings, defaults());
        assert!(settings.to_query(&defaults()).is_empty());
    }

    #[test]
    fn reads_known_keys_and_ignores_unknown() {
        let query = QueryState::from_pairs([
            ("chart", "count"),
            ("bin", "month"),
            ("zoom", "year"),
            ("flow", "2"),
            ("pair", "btc"),
            ("utm_source", "feed"),
        ]);
        let settings = ViewSettings::from_query(&query, &defaults());
        assert_eq!(settings.chart, ChartKind::Count);
        assert_eq!(settings.bin, Bin::Month);
        assert_eq!(settings.zoom, Some(ZoomRequest::Preset(Bin::Year)));
        assert_eq!(settings.flow, FlowMask::from(2));
        assert_eq!(settings.pair.as_deref(), Some("btc"));
        assert_eq!(settings.search, None);
    }

    #[test]
    fn bad_values_fall_back() {
        let query = QueryState::from_pairs([("chart", "pie"), ("bin", "decade"), ("flow", "0"), ("search", "")]);
        let settings = ViewSettings::from_query(&query, &defaults());
        assert_eq!(settings, defaults());
    }

    #[test]
    fn query_round_trips_without_defaults() {
        let mut settings = ViewSettings::new(ChartKind::Count, Bin::Day);
        settings.zoom = Some(ZoomRequest::Window("ab-cd".to_string()));
        settings.flow = FlowMask::from(1);
        settings.status = Some("refunded".to_string());
        let query = settings.to_query(&defaults());
        assert_eq!(ViewSettings::from_query(&query, &defaults()), settings);
    }

    #[test]
    fn omitted_flow_shows_every_series_of_the_chart() {
        let query = QueryState::from_pairs([("chart", "balance")]);
        let settings = ViewSettings::from_query(&query, &defaults());
        assert_eq!(settings.flow, FlowMask::all(4));

        let mut narrowed = defaults();
        narrowed.flow = FlowMask::from(2);
        assert_eq!(ViewSettings::from_query(&query, &narrowed).flow, FlowMask::from(2));
    }

    #[test]
    fn set_replaces_in_place() {
        let mut query = QueryState::from_pairs([("a", "1"), ("b", "2")]);
        query.set("a", "3");
        query.remove("b");
        assert_eq!(query.to_display_string(), "a=3");
    }
}
