use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::domain::{
    chart_view::{CacheKey, RawSeries, SeriesData},
    errors::ChartError,
    logging::LogComponent,
};

type SeriesResult = Result<Rc<SeriesData>, ChartError>;
type PendingFetch = Shared<LocalBoxFuture<'static, SeriesResult>>;

#[derive(Default)]
struct CacheInner {
    entries: HashMap<CacheKey, Rc<SeriesData>>,
    in_flight: HashMap<CacheKey, PendingFetch>,
    fetches: usize,
}

/// Session-lived store of normalized series, one per `chart:bin`.
///
/// Cloning gives another handle to the same store. At most one fetch per
/// key is outstanding; later callers share its result.
#[derive(Clone, Default)]
pub struct SeriesCache {
    inner: Rc<RefCell<CacheInner>>,
    loading_delay_ms: u32,
}

impl SeriesCache {
    pub fn new(loading_delay_ms: u32) -> Self {
        Self { inner: Rc::default(), loading_delay_ms }
    }

    pub fn get(&self, key: CacheKey) -> Option<Rc<SeriesData>> {
        self.inner.borrow().entries.get(&key).cloned()
    }

    pub fn contains(&self, key: CacheKey) -> bool {
        self.inner.borrow().entries.contains_key(&key)
    }

    pub fn is_in_flight(&self, key: CacheKey) -> bool {
        self.inner.borrow().in_flight.contains_key(&key)
    }

    /// How many times `fetch_or_serve` actually called out.
    pub fn fetch_count(&self) -> usize {
        self.inner.borrow().fetches
    }

    pub fn fetch_or_serve<F, Fut>(&self, key: CacheKey, fetch: F) -> LocalBoxFuture<'static, SeriesResult>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<RawSeries, ChartError>> + 'static,
    {
        if let Some(hit) = self.get(key) {
            crate::log_trace!(LogComponent::Application("SeriesCache"), "hit {}", key);
            let delay = self.loading_delay_ms;
            return async move {
                loading_tick(delay).await;
                Ok(hit)
            }
            .boxed_local();
        }

        if let Some(pending) = self.inner.borrow().in_flight.get(&key).cloned() {
            crate::log_debug!(LogComponent::Application("SeriesCache"), "joining in-flight fetch {}", key);
            return pending.boxed_local();
        }

        crate::log_debug!(LogComponent::Application("SeriesCache"), "fetching {}", key);
        let request = fetch(key);
        let inner = Rc::clone(&self.inner);
        let pending: PendingFetch = async move {
            let outcome = request.await.and_then(|raw| SeriesData::normalize(key, &raw));
            let mut inner = inner.borrow_mut();
            inner.in_flight.remove(&key);
            outcome.map(|data| {
                let data = Rc::new(data);
                inner.entries.insert(key, Rc::clone(&data));
                data
            })
        }
        .boxed_local()
        .shared();

        {
            let mut inner = self.inner.borrow_mut();
            inner.fetches += 1;
            inner.in_flight.insert(key, pending.clone());
        }
        pending.boxed_local()
    }
}

/// Lets a loading indicator paint before cached data replaces it.
async fn loading_tick(delay_ms: u32) {
    #[cfg(target_arch = "wasm32")]
    if delay_ms > 0 {
        gloo_timers::future::TimeoutFuture::new(delay_ms).await;
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = delay_ms;
}
