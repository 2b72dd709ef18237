use serde::Serialize;
use serde_json::Value;

use super::value_objects::{CacheKey, TimeRange};
use crate::domain::errors::ChartError;

/// Time unit of the API's `time` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Seconds,
    Milliseconds,
}

/// Largest millisecond timestamp a JS `Date` can hold.
pub const MAX_TIME_MS: u64 = 8_640_000_000_000_000;

impl TimeUnit {
    /// Negative or non-finite values read as zero, anything past the
    /// `Date` range is clamped to [`MAX_TIME_MS`].
    fn to_millis(self, value: f64) -> u64 {
        let millis = match self {
            TimeUnit::Seconds => value * 1000.0,
            TimeUnit::Milliseconds => value,
        };
        if millis.is_finite() && millis > 0.0 {
            (millis.round() as u64).min(MAX_TIME_MS)
        } else {
            0
        }
    }
}

/// API response as parallel arrays, before any shaping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeries {
    /// Bucket timestamps in milliseconds.
    pub time: Vec<u64>,
    pub columns: Vec<(String, Vec<f64>)>,
}

impl RawSeries {
    /// Lenient read of `{time: [...], <name>: [...], ...}`. Non-array
    /// fields are skipped, non-numeric entries read as zero.
    pub fn from_json(value: &Value, unit: TimeUnit) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let time = object
            .get("time")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(|v| unit.to_millis(v.as_f64().unwrap_or(0.0))).collect())
            .unwrap_or_default();
        let columns = object
            .iter()
            .filter(|(name, _)| name.as_str() != "time")
            .filter_map(|(name, v)| {
                let items = v.as_array()?;
                Some((name.clone(), items.iter().map(|x| x.as_f64().unwrap_or(0.0)).collect()))
            })
            .collect();
        Self { time, columns }
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// One `[timestamp, ...values]` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time: u64,
    pub values: Vec<f64>,
}

/// Chart-ready data for one cache key.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub key: CacheKey,
    pub points: Vec<SeriesPoint>,
    range: TimeRange,
}

impl SeriesData {
    /// Shape a raw response for the chart: one value per series of the
    /// key's chart, sorted by time, with zero points bracketing every
    /// stretch longer than a bin so idle periods drop to zero.
    pub fn normalize(key: CacheKey, raw: &RawSeries) -> Result<Self, ChartError> {
        if raw.is_empty() {
            return Err(ChartError::EmptyResponse(key));
        }
        let names = key.chart.series_names();
        let columns: Vec<Option<&[f64]>> = names.iter().map(|name| raw.column(name)).collect();

        let mut rows: Vec<SeriesPoint> = raw
            .time
            .iter()
            .enumerate()
            .map(|(i, &time)| SeriesPoint {
                time,
                values: columns.iter().map(|c| c.and_then(|c| c.get(i)).copied().unwrap_or(0.0)).collect(),
            })
            .collect();
        rows.sort_by_key(|p| p.time);

        let bin = key.bin.duration_ms();
        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            let prev = points.last().map(|p: &SeriesPoint| p.time);
            if let Some(after) = prev.filter(|_| bin > 0).and_then(|prev| prev.checked_add(bin)) {
                if row.time > after {
                    points.push(SeriesPoint::zero(after, names.len()));
                    let before = row.time - bin;
                    if before > after {
                        points.push(SeriesPoint::zero(before, names.len()));
                    }
                }
            }
            points.push(row);
        }

        let range = match (points.first(), points.last()) {
            (Some(first), Some(last)) => TimeRange::new(first.time, last.time),
            _ => return Err(ChartError::EmptyResponse(key)),
        };
        Ok(Self { key, points, range })
    }

    pub fn time_range(&self) -> TimeRange {
        self.range
    }

    pub fn series_count(&self) -> usize {
        self.key.chart.series_count()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl SeriesPoint {
    fn zero(time: u64, series: usize) -> Self {
        Self { time, values: vec![0.0; series] }
    }
}
