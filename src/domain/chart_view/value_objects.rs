use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

use crate::domain::errors::ChartError;

pub const DAY_MS: u64 = 86_400_000;

/// Value Object - aggregation granularity, also used for the zoom presets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString, AsRefStr,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Bin {
    #[display(fmt = "day")]
    Day,
    #[display(fmt = "week")]
    Week,
    #[display(fmt = "month")]
    Month,
    #[display(fmt = "year")]
    Year,
    #[display(fmt = "all")]
    All,
}

impl Bin {
    /// Duration of one bin in milliseconds. `All` is unbounded and maps to 0.
    pub fn duration_ms(self) -> u64 {
        match self {
            Bin::Day => DAY_MS,
            Bin::Week => 7 * DAY_MS,
            Bin::Month => 30 * DAY_MS,
            Bin::Year => 365 * DAY_MS,
            Bin::All => 0,
        }
    }

    pub fn parse(name: &str) -> Result<Self, ChartError> {
        name.trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| ChartError::InvalidBin(name.to_string()))
    }

    /// Presets that have a fixed duration, shortest first.
    pub fn bounded() -> impl Iterator<Item = Bin> {
        Bin::iter().filter(|bin| bin.duration_ms() > 0)
    }
}

/// Value Object - which series set a chart shows
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, AsRefStr, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[display(fmt = "amount")]
    Amount,
    #[display(fmt = "count")]
    Count,
    #[display(fmt = "balance")]
    Balance,
}

impl ChartKind {
    pub fn parse(name: &str) -> Result<Self, ChartError> {
        name.trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| ChartError::InvalidChart(name.to_string()))
    }

    /// API field names of the sub-series, in flow-bit order.
    pub fn series_names(self) -> &'static [&'static str] {
        match self {
            ChartKind::Amount => &["redeemAmount", "refundAmount"],
            ChartKind::Count => &["redeemCount", "refundCount"],
            ChartKind::Balance => &["received", "sent", "net", "balance"],
        }
    }

    pub fn series_labels(self) -> &'static [&'static str] {
        match self {
            ChartKind::Amount => &["Redeemed", "Refunded"],
            ChartKind::Count => &["Redemptions", "Refunds"],
            ChartKind::Balance => &["Received", "Sent", "Net", "Balance"],
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            ChartKind::Amount | ChartKind::Balance => "DCR",
            ChartKind::Count => "Count",
        }
    }

    /// Flow sub-series are stacked, the balance line is not.
    pub fn stacked(self) -> bool {
        !matches!(self, ChartKind::Balance)
    }

    pub fn series_count(self) -> usize {
        self.series_names().len()
    }
}

/// Value Object - bit-per-series visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Into)]
pub struct FlowMask(u8);

impl FlowMask {
    pub const MAX_SERIES: usize = 4;

    /// Every one of `series` sub-series visible.
    pub fn all(series: usize) -> Self {
        let n = series.min(Self::MAX_SERIES);
        Self(((1u16 << n) - 1) as u8)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// The bits that address an existing series.
    pub fn effective(self, series: usize) -> Self {
        Self(self.0 & Self::all(series).0)
    }

    pub fn is_empty_for(self, series: usize) -> bool {
        self.effective(series).0 == 0
    }

    pub fn is_visible(self, index: usize) -> bool {
        index < Self::MAX_SERIES && self.0 & (1 << index) != 0
    }

    /// Per-series visibility. A mask that shows nothing shows everything.
    pub fn visibility(self, series: usize) -> Vec<bool> {
        let mask = if self.is_empty_for(series) { Self::all(series) } else { self };
        (0..series).map(|i| mask.is_visible(i)).collect()
    }
}

/// Value Object - visible time window in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoomWindow {
    pub start: u64,
    pub end: u64,
}

impl ZoomWindow {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn span(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// Value Object - time bounds of a loaded series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub min: u64,
    pub max: u64,
}

impl TimeRange {
    pub fn new(a: u64, b: u64) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    pub fn span(&self) -> u64 {
        self.max.saturating_sub(self.min)
    }

    pub fn full_window(&self) -> ZoomWindow {
        ZoomWindow::new(self.min, self.max)
    }

    pub fn contains(&self, window: &ZoomWindow) -> bool {
        self.min <= window.start && window.end <= self.max
    }

    /// Clamp both ends into the range; anything inverted or collapsed
    /// afterwards becomes the full range.
    pub fn clamp(&self, window: ZoomWindow) -> ZoomWindow {
        let start = window.start.clamp(self.min, self.max);
        let end = window.end.clamp(self.min, self.max);
        if start < end { ZoomWindow::new(start, end) } else { self.full_window() }
    }
}

/// Value Object - identity of one fetched dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{}:{}", chart, bin)]
pub struct CacheKey {
    pub chart: ChartKind,
    pub bin: Bin,
}

impl CacheKey {
    pub fn new(chart: ChartKind, bin: Bin) -> Self {
        Self { chart, bin }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_durations_increase_and_all_is_unbounded() {
        let durations: Vec<u64> = Bin::bounded().map(Bin::duration_ms).collect();
        assert_eq!(durations.len(), 4);
        assert!(durations.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Bin::All.duration_ms(), 0);
        assert_eq!(Bin::Week.duration_ms(), 604_800_000);
    }

    #[test]
    fn bin_parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(Bin::parse("Month").unwrap(), Bin::Month);
        assert_eq!(Bin::parse("fortnight"), Err(ChartError::InvalidBin("fortnight".to_string())));
        assert_eq!(Bin::Year.to_string(), "year");
        assert_eq!(Bin::Year.as_ref(), "year");
    }

    #[test]
    fn chart_kind_names() {
        assert_eq!(ChartKind::parse("count").unwrap(), ChartKind::Count);
        assert!(ChartKind::parse("volume").is_err());
        assert_eq!(ChartKind::Balance.series_count(), 4);
        assert_eq!(ChartKind::Amount.series_names().len(), ChartKind::Amount.series_labels().len());
    }

    #[test]
    fn flow_mask_never_hides_everything() {
        assert_eq!(FlowMask::all(2).bits(), 0b11);
        assert_eq!(FlowMask::all(4).bits(), 0b1111);
        assert_eq!(FlowMask::from(0b10).visibility(2), vec![false, true]);
        assert_eq!(FlowMask::from(0).visibility(2), vec![true, true]);
        // bit 3 does not exist on a two-series chart
        assert!(FlowMask::from(0b1000).is_empty_for(2));
        assert_eq!(FlowMask::from(0b1000).visibility(2), vec![true, true]);
    }

    #[test]
    fn range_clamp_falls_back_to_full() {
        let range = TimeRange::new(100, 1_000);
        assert_eq!(range.clamp(ZoomWindow::new(50, 500)), ZoomWindow::new(100, 500));
        assert_eq!(range.clamp(ZoomWindow::new(2_000, 3_000)), range.full_window());
        assert_eq!(range.clamp(ZoomWindow::new(800, 200)), range.full_window());
    }

    #[test]
    fn cache_key_display() {
        assert_eq!(CacheKey::new(ChartKind::Amount, Bin::Day).to_string(), "amount:day");
    }
}
