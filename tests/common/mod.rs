#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use explorer_chart_wasm::application::{
    ChartConfig, ChartOptions, ChartRenderer, ChartUpdate, QueryStore, SessionContext, ViewController, ViewModel,
    ViewSurface,
};
use explorer_chart_wasm::domain::chart_view::{
    Bin, CacheKey, ChartKind, QueryState, RawSeries, SeriesData, SeriesSource, ZoomWindow, DAY_MS,
};
use explorer_chart_wasm::domain::errors::{ChartError, ChartResult};
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};

pub const JAN_1_2023: u64 = 1_672_531_200_000;

/// What the widget double was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Create { key: CacheKey, options: ChartOptions },
    Update { data: Option<CacheKey>, window: Option<ZoomWindow> },
    Visibility(usize, bool),
    Resize,
    Destroy,
}

#[derive(Clone, Default)]
pub struct RecordingRenderer {
    pub calls: Rc<RefCell<Vec<RenderCall>>>,
    created: bool,
}

impl ChartRenderer for RecordingRenderer {
    fn create(&mut self, data: Rc<SeriesData>, options: &ChartOptions) -> ChartResult<()> {
        self.created = true;
        self.calls.borrow_mut().push(RenderCall::Create { key: data.key, options: options.clone() });
        Ok(())
    }

    fn update(&mut self, update: ChartUpdate) -> ChartResult<()> {
        self.calls
            .borrow_mut()
            .push(RenderCall::Update { data: update.data.map(|d| d.key), window: update.window });
        Ok(())
    }

    fn set_visibility(&mut self, series: usize, visible: bool) {
        self.calls.borrow_mut().push(RenderCall::Visibility(series, visible));
    }

    fn resize(&mut self) {
        self.calls.borrow_mut().push(RenderCall::Resize);
    }

    fn destroy(&mut self) {
        self.created = false;
        self.calls.borrow_mut().push(RenderCall::Destroy);
    }

    fn is_created(&self) -> bool {
        self.created
    }
}

#[derive(Clone, Default)]
pub struct RecordingSurface {
    pub models: Rc<RefCell<Vec<ViewModel>>>,
}

impl RecordingSurface {
    pub fn last(&self) -> ViewModel {
        self.models.borrow().last().cloned().unwrap_or_default()
    }
}

impl ViewSurface for RecordingSurface {
    fn render(&self, model: &ViewModel) {
        self.models.borrow_mut().push(model.clone());
    }
}

/// In-memory URL with the browser store's replace semantics.
#[derive(Clone, Default)]
pub struct MemoryQuery {
    pub state: Rc<RefCell<QueryState>>,
}

impl MemoryQuery {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        let query = Self::default();
        *query.state.borrow_mut() = QueryState::from_pairs(pairs.iter().copied());
        query
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.state.borrow().get(key).map(str::to_string)
    }

    pub fn display(&self) -> String {
        self.state.borrow().to_display_string()
    }
}

impl QueryStore for MemoryQuery {
    fn load(&self) -> QueryState {
        self.state.borrow().clone()
    }

    fn replace(&self, state: &QueryState, managed: &[&str]) {
        let mut current = self.state.borrow_mut();
        for key in managed {
            current.remove(key);
        }
        for (key, value) in state.pairs() {
            current.set(key.as_str(), value.as_str());
        }
    }
}

enum Reply {
    Ready(Result<RawSeries, ChartError>),
    Pending(oneshot::Receiver<RawSeries>),
}

/// Series source answering from per-key queues of ready or pending replies.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    replies: Rc<RefCell<HashMap<CacheKey, VecDeque<Reply>>>>,
    pub requests: Rc<RefCell<Vec<CacheKey>>>,
}

impl ScriptedSource {
    pub fn ready(&self, key: CacheKey, raw: RawSeries) {
        self.push(key, Reply::Ready(Ok(raw)));
    }

    pub fn failing(&self, key: CacheKey, error: ChartError) {
        self.push(key, Reply::Ready(Err(error)));
    }

    /// Reply resolved later through the returned sender.
    pub fn pending(&self, key: CacheKey) -> oneshot::Sender<RawSeries> {
        let (tx, rx) = oneshot::channel();
        self.push(key, Reply::Pending(rx));
        tx
    }

    pub fn requests_for(&self, key: CacheKey) -> usize {
        self.requests.borrow().iter().filter(|k| **k == key).count()
    }

    fn push(&self, key: CacheKey, reply: Reply) {
        self.replies.borrow_mut().entry(key).or_default().push_back(reply);
    }
}

impl SeriesSource for ScriptedSource {
    fn fetch(&self, key: CacheKey) -> LocalBoxFuture<'static, Result<RawSeries, ChartError>> {
        self.requests.borrow_mut().push(key);
        let reply = self.replies.borrow_mut().get_mut(&key).and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Ready(result)) => futures::future::ready(result).boxed_local(),
            Some(Reply::Pending(rx)) => {
                async move { rx.await.map_err(|_| ChartError::FetchFailure("reply dropped".into())) }.boxed_local()
            }
            None => futures::future::ready(Err(ChartError::FetchFailure(format!("no reply scripted for {key}"))))
                .boxed_local(),
        }
    }
}

/// A controller wired to doubles, with handles on each of them.
pub struct Harness {
    pub controller: Rc<ViewController>,
    pub source: ScriptedSource,
    pub renderer: Rc<RefCell<Vec<RenderCall>>>,
    pub surface: RecordingSurface,
    pub query: MemoryQuery,
}

impl Harness {
    pub fn new(config: ChartConfig, query: MemoryQuery, session: SessionContext) -> Self {
        let source = ScriptedSource::default();
        let renderer = RecordingRenderer::default();
        let calls = Rc::clone(&renderer.calls);
        let surface = RecordingSurface::default();
        let controller = ViewController::new(
            config,
            Rc::new(source.clone()),
            Box::new(renderer),
            Box::new(surface.clone()),
            Box::new(query.clone()),
            session,
        );
        Self { controller, source, renderer: calls, surface, query }
    }

    pub fn with_defaults() -> Self {
        Self::new(ChartConfig::default(), MemoryQuery::default(), SessionContext::new())
    }

    pub fn render_calls(&self) -> Vec<RenderCall> {
        self.renderer.borrow().clone()
    }
}

pub fn key(chart: ChartKind, bin: Bin) -> CacheKey {
    CacheKey::new(chart, bin)
}

/// `count` rows starting at `start`, `step` ms apart, for every series of
/// `chart`.
pub fn evenly_spaced(chart: ChartKind, start: u64, step: u64, count: usize) -> RawSeries {
    let time: Vec<u64> = (0..count as u64).map(|i| start + i * step).collect();
    let columns = chart
        .series_names()
        .iter()
        .enumerate()
        .map(|(s, name)| (name.to_string(), (0..count).map(|i| (i * (s + 1)) as f64 + 1.0).collect()))
        .collect();
    RawSeries { time, columns }
}

/// Daily rows over `days` days from 2023-01-01.
pub fn daily(chart: ChartKind, days: usize) -> RawSeries {
    evenly_spaced(chart, JAN_1_2023, DAY_MS, days)
}
