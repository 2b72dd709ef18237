use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use gloo::utils::format::JsValueSerdeExt;
use leptos::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::{
    app::{ChartView, SignalSurface},
    application::{ChartConfig, QueryStore, SessionContext, ViewController, ViewModel},
    domain::{
        chart_view::QueryState,
        errors::ChartError,
        logging::LogComponent,
        pagination::Pagination,
    },
    infrastructure::{BrowserQueryStore, ConsoleLogger, DygraphRenderer, ExplorerApiClient},
};

/// Page-wide session shared by the charts mounted through it.
#[wasm_bindgen]
#[derive(Clone, Default)]
pub struct ChartSession {
    context: SessionContext,
}

#[wasm_bindgen]
impl ChartSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a chart widget into `config.containerId` and start loading.
    pub fn mount(&self, config: JsValue) -> Result<ChartWidget, JsValue> {
        let config = ChartConfig::from_js(&config)?;
        ConsoleLogger::set_min_level(config.log_level);
        ChartWidget::mount(config, self.context.clone()).map_err(JsValue::from)
    }

    /// Drop whatever the charts of `slot` remembered.
    pub fn forget(&self, slot: &str) {
        self.context.forget(slot);
    }
}

/// Handle to a mounted chart, for page scripts.
#[wasm_bindgen]
pub struct ChartWidget {
    controller: Rc<ViewController>,
    _resize: EventListener,
}

impl ChartWidget {
    fn mount(config: ChartConfig, session: SessionContext) -> Result<Self, ChartError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| ChartError::Browser("no document".into()))?;
        let container = document
            .get_element_by_id(&config.container_id)
            .ok_or_else(|| ChartError::Browser(format!("container #{} not found", config.container_id)))?
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| ChartError::Browser(format!("#{} is not an HTML element", config.container_id)))?;

        let graph_id = format!("{}-graph", config.container_id);
        let renderer = DygraphRenderer::new(graph_id.clone());
        let zoom_listener = renderer.zoom_listener();
        let source = ExplorerApiClient::new(config.api_base.clone(), config.domain.clone())
            .with_time_unit(config.time_unit);
        let titles = Rc::new(config.series_titles.clone());

        let model = create_rw_signal(ViewModel::default());
        let controller = ViewController::new(
            config,
            Rc::new(source),
            Box::new(renderer),
            Box::new(SignalSurface::new(model)),
            Box::new(BrowserQueryStore::new()),
            session,
        );

        let weak = Rc::downgrade(&controller);
        zoom_listener.borrow_mut().replace(Rc::new(move |start: u64, end: u64| {
            // The widget calls back from inside its own event handling.
            let weak = Weak::clone(&weak);
            spawn_local(async move {
                if let Some(controller) = weak.upgrade() {
                    controller.on_drag_zoom(start, end);
                }
            });
        }));

        {
            let controller = Rc::clone(&controller);
            mount_to(container, move || {
                view! { <ChartView controller=controller model=model graph_id=graph_id titles=titles /> }
            });
        }

        let weak = Rc::downgrade(&controller);
        let resize = EventListener::new(&gloo::utils::window(), "resize", move |_| {
            if let Some(controller) = weak.upgrade() {
                controller.resize();
            }
        });

        crate::log_info!(
            LogComponent::Presentation("ChartWidget"),
            "🚀 Chart mounted into #{}",
            controller.config().container_id
        );
        let load = controller.connect();
        spawn_local(async move {
            let _ = load.await;
        });

        Ok(Self { controller, _resize: resize })
    }
}

#[wasm_bindgen]
impl ChartWidget {
    #[wasm_bindgen(js_name = setBin)]
    pub fn set_bin(&self, name: &str) -> bool {
        self.dispatch(self.controller.on_bin_change(name))
    }

    #[wasm_bindgen(js_name = setChartType)]
    pub fn set_chart_type(&self, name: &str) -> bool {
        self.dispatch(self.controller.on_chart_type_change(name))
    }

    #[wasm_bindgen(js_name = zoomPreset)]
    pub fn zoom_preset(&self, name: &str) {
        self.controller.on_zoom_preset(name);
    }

    #[wasm_bindgen(js_name = setFlow)]
    pub fn set_flow(&self, bits: u8) -> bool {
        self.controller.on_flow_toggle(bits)
    }

    #[wasm_bindgen(js_name = toggleSeries)]
    pub fn toggle_series(&self, index: usize) -> bool {
        self.controller.toggle_series(index)
    }

    pub fn resize(&self) {
        self.controller.resize();
    }

    /// Current settings as the URL would carry them.
    #[wasm_bindgen(js_name = queryString)]
    pub fn query_string(&self) -> String {
        let defaults = self.controller.config().default_settings();
        self.controller.settings().to_query(&defaults).to_display_string()
    }

    pub fn disconnect(&self) {
        self.controller.disconnect();
    }

    fn dispatch(
        &self,
        load: Option<futures::future::LocalBoxFuture<'static, crate::application::LoadOutcome>>,
    ) -> bool {
        match load {
            Some(load) => {
                spawn_local(async move {
                    let _ = load.await;
                });
                true
            }
            None => false,
        }
    }
}

/// Offset/rows pager for server-rendered tables, kept in the URL.
#[wasm_bindgen]
pub struct TablePager {
    pagination: Pagination,
    default_rows: u64,
    store: BrowserQueryStore,
}

#[wasm_bindgen]
impl TablePager {
    #[wasm_bindgen(constructor)]
    pub fn new(default_rows: u32, total: u32) -> Self {
        let store = BrowserQueryStore::new();
        let default_rows = u64::from(default_rows);
        let pagination = Pagination::from_query(&store.load(), default_rows, u64::from(total));
        Self { pagination, default_rows, store }
    }

    pub fn offset(&self) -> u32 {
        clamp_u32(self.pagination.offset())
    }

    pub fn rows(&self) -> u32 {
        clamp_u32(self.pagination.rows())
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        clamp_u32(self.pagination.page_count())
    }

    #[wasm_bindgen(js_name = pageIndex)]
    pub fn page_index(&self) -> u32 {
        clamp_u32(self.pagination.page_index())
    }

    #[wasm_bindgen(js_name = hasPrev)]
    pub fn has_prev(&self) -> bool {
        self.pagination.has_prev()
    }

    #[wasm_bindgen(js_name = hasNext)]
    pub fn has_next(&self) -> bool {
        self.pagination.has_next()
    }

    #[wasm_bindgen(js_name = rangeLabel)]
    pub fn range_label(&self) -> String {
        self.pagination.range_label()
    }

    pub fn first(&mut self) {
        self.pagination.first();
        self.persist();
    }

    pub fn prev(&mut self) {
        self.pagination.prev();
        self.persist();
    }

    pub fn next(&mut self) {
        self.pagination.next();
        self.persist();
    }

    pub fn last(&mut self) {
        self.pagination.last();
        self.persist();
    }

    #[wasm_bindgen(js_name = goTo)]
    pub fn go_to(&mut self, page: u32) {
        self.pagination.go_to(u64::from(page));
        self.persist();
    }

    #[wasm_bindgen(js_name = setRows)]
    pub fn set_rows(&mut self, rows: u32) {
        self.pagination.set_rows(u64::from(rows));
        self.persist();
    }

    #[wasm_bindgen(js_name = setTotal)]
    pub fn set_total(&mut self, total: u32) {
        self.pagination.set_total(u64::from(total));
        self.persist();
    }

    /// `{offset, rows, total}` for page scripts.
    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        let state = serde_json::json!({
            "offset": self.pagination.offset(),
            "rows": self.pagination.rows(),
            "total": self.pagination.total(),
        });
        JsValue::from_serde(&state).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    fn persist(&self) {
        let mut query = QueryState::new();
        self.pagination.write_query(&mut query, self.default_rows);
        self.store.replace(&query, &[Pagination::OFFSET, Pagination::ROWS]);
        crate::log_debug!(
            LogComponent::Presentation("TablePager"),
            "page {} of {}",
            self.pagination.page_index() + 1,
            self.pagination.page_count()
        );
    }
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
