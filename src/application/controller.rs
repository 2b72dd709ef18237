use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};

use super::{
    cache::SeriesCache,
    config::ChartConfig,
    ports::{ChartOptions, ChartRenderer, ChartUpdate, QueryStore, ViewModel, ViewStatus, ViewSurface},
    session::{RememberedView, SessionContext},
};
use crate::domain::{
    chart_view::{
        zoom, Bin, CacheKey, ChartKind, FlowMask, SeriesData, SeriesSource, ViewSettings, ZoomRequest,
        ZoomWindow,
    },
    errors::ChartError,
    logging::{get_logger, LogComponent},
};

/// Where a controller is between user actions and fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Loading { key: CacheKey, token: u64 },
    Rendered { key: CacheKey, window: ZoomWindow },
    NoData { key: CacheKey },
}

/// How a load ended, as seen by whoever awaited it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered(ZoomWindow),
    NoData,
    /// Superseded by a later load before it resolved; nothing was drawn.
    Stale,
}

struct ControllerState {
    settings: ViewSettings,
    phase: ViewPhase,
    next_token: u64,
    data: Option<Rc<SeriesData>>,
    active_preset: Option<Bin>,
}

/// Chart view state machine shared by every bin/zoom/flow chart widget.
///
/// User actions mutate [`ViewSettings`]; changing chart or bin goes through
/// the [`SeriesCache`], zoom and flow only touch the existing chart. Every
/// change ends in the URL and in one [`ViewSurface::render`] call.
pub struct ViewController {
    config: ChartConfig,
    defaults: ViewSettings,
    cache: SeriesCache,
    source: Rc<dyn SeriesSource>,
    renderer: RefCell<Box<dyn ChartRenderer>>,
    surface: Box<dyn ViewSurface>,
    query: Box<dyn QueryStore>,
    session: SessionContext,
    state: RefCell<ControllerState>,
}

impl ViewController {
    pub fn new(
        config: ChartConfig,
        source: Rc<dyn SeriesSource>,
        renderer: Box<dyn ChartRenderer>,
        surface: Box<dyn ViewSurface>,
        query: Box<dyn QueryStore>,
        session: SessionContext,
    ) -> Rc<Self> {
        let defaults = config.default_settings();
        Rc::new(Self {
            cache: SeriesCache::new(config.loading_delay_ms),
            state: RefCell::new(ControllerState {
                settings: defaults.clone(),
                phase: ViewPhase::Idle,
                next_token: 0,
                data: None,
                active_preset: None,
            }),
            defaults,
            config,
            source,
            renderer: RefCell::new(renderer),
            surface,
            query,
            session,
        })
    }

    /// Restore settings (URL, then session, then defaults) and load.
    pub fn connect(self: &Rc<Self>) -> LocalBoxFuture<'static, LoadOutcome> {
        let fallback = self.session.overlay(
            self.config.session_slot.as_deref(),
            self.defaults.clone(),
            &self.config.charts,
            &self.config.bins,
        );
        let mut settings = ViewSettings::from_query(&self.query.load(), &fallback);
        if !self.config.charts.contains(&settings.chart) {
            settings.chart = self.defaults.chart;
        }
        if !self.config.bins.contains(&settings.bin) {
            settings.bin = self.defaults.bin;
        }

        crate::log_info!(
            LogComponent::Application("ViewController"),
            "🔌 Connecting {} chart at {}",
            self.config.domain,
            settings.cache_key()
        );

        {
            let mut state = self.state.borrow_mut();
            state.active_preset = match &settings.zoom {
                Some(ZoomRequest::Preset(bin)) => Some(*bin),
                _ => None,
            };
            state.settings = settings;
        }
        self.persist();
        self.load()
    }

    /// Destroy the widget, keeping the current view in the session.
    pub fn disconnect(&self) {
        self.remember();
        self.renderer.borrow_mut().destroy();
        let mut state = self.state.borrow_mut();
        state.phase = ViewPhase::Idle;
        state.data = None;
    }

    /// Switch aggregation. `None` when the name is unknown or not enabled.
    pub fn on_bin_change(self: &Rc<Self>, name: &str) -> Option<LocalBoxFuture<'static, LoadOutcome>> {
        let bin = match Bin::parse(name) {
            Ok(bin) if self.config.bins.contains(&bin) => bin,
            Ok(bin) => {
                crate::log_warn!(LogComponent::Application("ViewController"), "bin {} is not enabled", bin);
                return None;
            }
            Err(e) => {
                crate::log_warn!(LogComponent::Application("ViewController"), "{}", e);
                return None;
            }
        };
        self.state.borrow_mut().settings.bin = bin;
        self.persist();
        Some(self.load())
    }

    /// Switch series set. `None` when the name is unknown or not enabled.
    pub fn on_chart_type_change(self: &Rc<Self>, name: &str) -> Option<LocalBoxFuture<'static, LoadOutcome>> {
        let chart = match ChartKind::parse(name) {
            Ok(chart) if self.config.charts.contains(&chart) => chart,
            Ok(chart) => {
                crate::log_warn!(LogComponent::Application("ViewController"), "chart {} is not enabled", chart);
                return None;
            }
            Err(e) => {
                crate::log_warn!(LogComponent::Application("ViewController"), "{}", e);
                return None;
            }
        };
        {
            let mut state = self.state.borrow_mut();
            let series = state.settings.chart.series_count();
            if state.settings.flow.effective(series) == FlowMask::all(series) {
                state.settings.flow = FlowMask::all(chart.series_count());
            }
            state.settings.chart = chart;
        }
        self.persist();
        Some(self.load())
    }

    /// Zoom button. Moves the chart window without refetching; before any
    /// data is loaded the preset is kept for the next render.
    pub fn on_zoom_preset(&self, name: &str) -> Option<ZoomWindow> {
        let preset = match Bin::parse(name) {
            Ok(bin) => bin,
            Err(e) => {
                crate::log_warn!(LogComponent::Application("ViewController"), "{}", e);
                return None;
            }
        };

        let moved = {
            let mut state = self.state.borrow_mut();
            state.active_preset = Some(preset);
            match (state.phase, state.data.clone()) {
                (ViewPhase::Rendered { key, .. }, Some(data)) => {
                    let window =
                        zoom::validate(Some(&ZoomRequest::Preset(preset)), data.time_range(), key.bin.duration_ms());
                    state.settings.zoom = Some(ZoomRequest::window(window));
                    state.phase = ViewPhase::Rendered { key, window };
                    Some(window)
                }
                _ => {
                    state.settings.zoom = Some(ZoomRequest::Preset(preset));
                    None
                }
            }
        };

        if let Some(window) = moved {
            let update = ChartUpdate { window: Some(window), ..ChartUpdate::default() };
            if let Err(e) = self.renderer.borrow_mut().update(update) {
                crate::log_error!(LogComponent::Application("ViewController"), "zoom update failed: {}", e);
            }
        }
        self.persist();
        self.publish();
        moved
    }

    /// Pan/zoom reported by the widget itself. Only persisted; the widget
    /// already shows the window. While a load is pending the window is kept
    /// as a request and clamped once the new data arrives.
    pub fn on_drag_zoom(&self, start: u64, end: u64) -> Option<ZoomWindow> {
        let requested = ZoomRequest::window(ZoomWindow::new(start.min(end), start.max(end)));
        let window = {
            let mut state = self.state.borrow_mut();
            let (key, data) = match (state.phase, state.data.clone()) {
                (ViewPhase::Rendered { key, .. }, Some(data)) => (key, data),
                (ViewPhase::Loading { .. }, Some(_)) => {
                    state.active_preset = None;
                    state.settings.zoom = Some(requested);
                    drop(state);
                    self.persist();
                    self.publish();
                    return None;
                }
                _ => {
                    crate::log_debug!(LogComponent::Application("ViewController"), "drag zoom without data ignored");
                    return None;
                }
            };
            let range = data.time_range();
            let window = zoom::validate(Some(&requested), range, key.bin.duration_ms());
            let code = zoom::encode(window.start, window.end);
            if let Some(preset) = zoom::map_key(&code, range) {
                state.active_preset = Some(preset);
            }
            state.settings.zoom = Some(ZoomRequest::Window(code));
            state.phase = ViewPhase::Rendered { key, window };
            window
        };
        self.persist();
        self.publish();
        Some(window)
    }

    /// Series visibility. A mask that would hide every series is ignored.
    pub fn on_flow_toggle(&self, bits: u8) -> bool {
        let mask = FlowMask::from(bits);
        let (before, after) = {
            let mut state = self.state.borrow_mut();
            let series = state.settings.chart.series_count();
            if mask.is_empty_for(series) {
                crate::log_debug!(LogComponent::Application("ViewController"), "empty flow {:#b} ignored", bits);
                return false;
            }
            let before = state.settings.flow.visibility(series);
            state.settings.flow = mask;
            (before, mask.visibility(series))
        };

        {
            let mut renderer = self.renderer.borrow_mut();
            if renderer.is_created() {
                for (index, (was, is)) in before.iter().zip(&after).enumerate() {
                    if was != is {
                        renderer.set_visibility(index, *is);
                    }
                }
            }
        }
        self.persist();
        self.publish();
        true
    }

    /// Flip one series checkbox.
    pub fn toggle_series(&self, index: usize) -> bool {
        if index >= FlowMask::MAX_SERIES {
            return false;
        }
        let bits = {
            let state = self.state.borrow();
            let series = state.settings.chart.series_count();
            state.settings.flow.effective(series).bits() ^ (1 << index)
        };
        self.on_flow_toggle(bits)
    }

    pub fn resize(&self) {
        self.renderer.borrow_mut().resize();
    }

    pub fn settings(&self) -> ViewSettings {
        self.state.borrow().settings.clone()
    }

    pub fn phase(&self) -> ViewPhase {
        self.state.borrow().phase
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    pub fn view_model(&self) -> ViewModel {
        let state = self.state.borrow();
        let series = state.settings.chart.series_count();
        ViewModel {
            chart: state.settings.chart,
            bin: state.settings.bin,
            charts: self.config.charts.clone(),
            bins: self.config.bins.clone(),
            active_preset: state.active_preset,
            visibility: state.settings.flow.visibility(series),
            status: match state.phase {
                ViewPhase::Idle => ViewStatus::Idle,
                ViewPhase::Loading { .. } => ViewStatus::Loading,
                ViewPhase::Rendered { .. } => ViewStatus::Ready,
                ViewPhase::NoData { .. } => ViewStatus::NoData,
            },
            window: match state.phase {
                ViewPhase::Rendered { window, .. } => Some(window),
                _ => None,
            },
        }
    }

    fn load(self: &Rc<Self>) -> LocalBoxFuture<'static, LoadOutcome> {
        let (key, token) = {
            let mut state = self.state.borrow_mut();
            state.next_token += 1;
            let key = state.settings.cache_key();
            let token = state.next_token;
            state.phase = ViewPhase::Loading { key, token };
            (key, token)
        };
        self.publish();

        let source = Rc::clone(&self.source);
        let request = self.cache.fetch_or_serve(key, move |key| source.fetch(key));
        let this = Rc::clone(self);
        async move {
            let result = request.await;
            this.finish_load(key, token, result)
        }
        .boxed_local()
    }

    fn finish_load(&self, key: CacheKey, token: u64, result: Result<Rc<SeriesData>, ChartError>) -> LoadOutcome {
        if self.phase() != (ViewPhase::Loading { key, token }) {
            crate::log_debug!(LogComponent::Application("ViewController"), "discarding stale response for {}", key);
            return LoadOutcome::Stale;
        }
        match result {
            Ok(data) => self.render_data(key, data),
            Err(e) => {
                if e.is_no_data() {
                    get_logger().warn(LogComponent::Application("ViewController"), &format!("📭 No data: {e}"));
                } else {
                    get_logger().error(LogComponent::Application("ViewController"), &format!("❌ Load failed: {e}"));
                }
                self.show_no_data(key);
                LoadOutcome::NoData
            }
        }
    }

    fn render_data(&self, key: CacheKey, data: Rc<SeriesData>) -> LoadOutcome {
        let (window, options) = {
            let mut state = self.state.borrow_mut();
            let range = data.time_range();
            let window = zoom::validate(state.settings.zoom.as_ref(), range, key.bin.duration_ms());
            let code = zoom::encode(window.start, window.end);
            state.active_preset = zoom::map_key(&code, range);
            state.settings.zoom = Some(ZoomRequest::Window(code));
            state.phase = ViewPhase::Rendered { key, window };
            state.data = Some(Rc::clone(&data));
            (window, ChartOptions::for_chart(key.chart, state.settings.flow, Some(window)))
        };

        let drawn = {
            let mut renderer = self.renderer.borrow_mut();
            if renderer.is_created() {
                renderer.update(ChartUpdate {
                    data: Some(Rc::clone(&data)),
                    options: Some(options),
                    window: Some(window),
                })
            } else {
                renderer.create(Rc::clone(&data), &options)
            }
        };
        if let Err(e) = drawn {
            get_logger().error(LogComponent::Application("ViewController"), &format!("❌ Render failed: {e}"));
            self.show_no_data(key);
            return LoadOutcome::NoData;
        }

        crate::log_info!(LogComponent::Application("ViewController"), "✅ Rendered {} points for {}", data.len(), key);
        self.persist();
        self.publish();
        LoadOutcome::Rendered(window)
    }

    fn show_no_data(&self, key: CacheKey) {
        {
            let mut state = self.state.borrow_mut();
            state.phase = ViewPhase::NoData { key };
            state.data = None;
        }
        self.publish();
    }

    fn persist(&self) {
        let query = self.state.borrow().settings.to_query(&self.defaults);
        self.query.replace(&query, &ViewSettings::KEYS);
        self.remember();
    }

    fn remember(&self) {
        if let Some(slot) = &self.config.session_slot {
            self.session.remember(slot, RememberedView::from(&self.state.borrow().settings));
        }
    }

    fn publish(&self) {
        let model = self.view_model();
        self.surface.render(&model);
    }
}
