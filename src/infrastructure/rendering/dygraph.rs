use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Date, Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::{
    application::{ChartOptions, ChartRenderer, ChartUpdate},
    domain::{
        chart_view::{SeriesData, ZoomWindow},
        errors::{ChartError, ChartResult},
        logging::LogComponent,
    },
};

#[wasm_bindgen]
extern "C" {
    /// The page-provided `Dygraph` charting library.
    type Dygraph;

    #[wasm_bindgen(constructor, catch)]
    fn new(container: &web_sys::Element, data: &JsValue, options: &JsValue) -> Result<Dygraph, JsValue>;

    #[wasm_bindgen(method, catch, js_name = updateOptions)]
    fn update_options(this: &Dygraph, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = setVisibility)]
    fn set_visibility(this: &Dygraph, series: u32, visible: bool);

    #[wasm_bindgen(method)]
    fn resize(this: &Dygraph);

    #[wasm_bindgen(method)]
    fn destroy(this: &Dygraph);
}

/// Receives `(start, end)` in ms whenever the user pans or drag-zooms.
pub type ZoomListener = Rc<dyn Fn(u64, u64)>;

/// Shared slot for the zoom listener, fillable after the renderer has been
/// handed to its controller.
pub type ZoomListenerSlot = Rc<RefCell<Option<ZoomListener>>>;

/// [`ChartRenderer`] on a Dygraph instance inside the element `container_id`.
pub struct DygraphRenderer {
    container_id: String,
    graph: Option<Dygraph>,
    listener: ZoomListenerSlot,
    zoom_callback: Option<Closure<dyn FnMut(f64, f64)>>,
}

impl DygraphRenderer {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self { container_id: container_id.into(), graph: None, listener: Rc::default(), zoom_callback: None }
    }

    pub fn zoom_listener(&self) -> ZoomListenerSlot {
        Rc::clone(&self.listener)
    }

    fn container(&self) -> ChartResult<web_sys::Element> {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&self.container_id))
            .ok_or_else(|| ChartError::Browser(format!("chart container #{} not found", self.container_id)))
    }

    fn zoom_callback(&mut self) -> &Closure<dyn FnMut(f64, f64)> {
        let listener = Rc::clone(&self.listener);
        self.zoom_callback.get_or_insert_with(|| {
            Closure::wrap(Box::new(move |min: f64, max: f64| {
                let current = listener.borrow().clone();
                if let Some(callback) = current {
                    callback(min.max(0.0) as u64, max.max(0.0) as u64);
                }
            }) as Box<dyn FnMut(f64, f64)>)
        })
    }

    fn graph(&self) -> ChartResult<&Dygraph> {
        self.graph.as_ref().ok_or_else(|| ChartError::Browser("chart not created".into()))
    }
}

impl ChartRenderer for DygraphRenderer {
    fn create(&mut self, data: Rc<SeriesData>, options: &ChartOptions) -> ChartResult<()> {
        let container = self.container()?;
        let js_options = options_object(options)?;
        set(&js_options, "zoomCallback", self.zoom_callback().as_ref())?;

        let graph = Dygraph::new(&container, &rows(&data), &js_options).map_err(js_error)?;
        self.graph = Some(graph);
        crate::log_info!(
            LogComponent::Infrastructure("Dygraph"),
            "📊 Chart created in #{} with {} rows",
            self.container_id,
            data.len()
        );
        Ok(())
    }

    fn update(&mut self, update: ChartUpdate) -> ChartResult<()> {
        let js_options = match &update.options {
            Some(options) => options_object(options)?,
            None => Object::new(),
        };
        if let Some(data) = &update.data {
            set(&js_options, "file", &rows(data))?;
        }
        // Without `dateWindow`, Dygraph keeps the current zoom.
        if let Some(window) = update.window {
            set(&js_options, "dateWindow", &date_window(window))?;
        }
        self.graph()?.update_options(&js_options).map_err(js_error)
    }

    fn set_visibility(&mut self, series: usize, visible: bool) {
        if let Some(graph) = &self.graph {
            graph.set_visibility(series as u32, visible);
        }
    }

    fn resize(&mut self) {
        if let Some(graph) = &self.graph {
            graph.resize();
        }
    }

    fn destroy(&mut self) {
        if let Some(graph) = self.graph.take() {
            graph.destroy();
            crate::log_debug!(LogComponent::Infrastructure("Dygraph"), "chart in #{} destroyed", self.container_id);
        }
    }

    fn is_created(&self) -> bool {
        self.graph.is_some()
    }
}

impl Drop for DygraphRenderer {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn rows(data: &SeriesData) -> JsValue {
    data.points
        .iter()
        .map(|point| {
            let row = Array::new();
            row.push(&Date::new(&JsValue::from_f64(point.time as f64)));
            for value in &point.values {
                row.push(&JsValue::from_f64(*value));
            }
            row
        })
        .collect::<Array>()
        .into()
}

fn options_object(options: &ChartOptions) -> ChartResult<Object> {
    let object = Object::new();

    let labels: Array = std::iter::once(JsValue::from_str("Date"))
        .chain(options.labels.iter().map(|l| JsValue::from_str(l)))
        .collect();
    set(&object, "labels", &labels)?;
    set(&object, "ylabel", &JsValue::from_str(&options.y_label))?;
    set(&object, "stackedGraph", &JsValue::from_bool(options.stacked))?;
    set(&object, "fillGraph", &JsValue::from_bool(options.stacked))?;
    set(&object, "connectSeparatedPoints", &JsValue::TRUE)?;
    set(&object, "legend", &JsValue::from_str("follow"))?;

    let visibility: Array = options.visibility.iter().map(|v| JsValue::from_bool(*v)).collect();
    set(&object, "visibility", &visibility)?;

    if let Some(window) = options.window {
        set(&object, "dateWindow", &date_window(window))?;
    }
    Ok(object)
}

fn date_window(window: ZoomWindow) -> JsValue {
    let pair = Array::new();
    pair.push(&JsValue::from_f64(window.start as f64));
    pair.push(&JsValue::from_f64(window.end as f64));
    pair.into()
}

fn set(target: &Object, key: &str, value: &JsValue) -> ChartResult<()> {
    Reflect::set(target, &JsValue::from_str(key), value).map(|_| ()).map_err(js_error)
}

fn js_error(value: JsValue) -> ChartError {
    ChartError::Browser(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}
