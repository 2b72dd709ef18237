use futures::future::LocalBoxFuture;

use super::series::RawSeries;
use super::value_objects::CacheKey;
use crate::domain::errors::ChartError;

/// Where series data comes from. One request per call; caching and
/// deduplication happen above this.
pub trait SeriesSource {
    fn fetch(&self, key: CacheKey) -> LocalBoxFuture<'static, Result<RawSeries, ChartError>>;
}
