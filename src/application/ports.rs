//! Seams between the controller and the browser: the charting widget, the
//! markup that shows controls and status, and the URL.

use std::rc::Rc;

use crate::domain::chart_view::{Bin, ChartKind, FlowMask, QueryState, SeriesData, ZoomWindow};
use crate::domain::errors::ChartResult;

/// Visual options handed to the widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub labels: Vec<String>,
    pub y_label: String,
    pub stacked: bool,
    pub visibility: Vec<bool>,
    /// `None` keeps whatever window the widget shows.
    pub window: Option<ZoomWindow>,
}

impl ChartOptions {
    pub fn for_chart(chart: ChartKind, flow: FlowMask, window: Option<ZoomWindow>) -> Self {
        Self {
            labels: chart.series_labels().iter().map(|l| l.to_string()).collect(),
            y_label: chart.y_label().to_string(),
            stacked: chart.stacked(),
            visibility: flow.visibility(chart.series_count()),
            window,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartUpdate {
    pub data: Option<Rc<SeriesData>>,
    pub options: Option<ChartOptions>,
    pub window: Option<ZoomWindow>,
}

/// Adapter around an external charting widget. Implementations own the
/// widget handle.
pub trait ChartRenderer {
    fn create(&mut self, data: Rc<SeriesData>, options: &ChartOptions) -> ChartResult<()>;

    /// Replace data and/or options. Must keep the current zoom unless
    /// `update.window` is set.
    fn update(&mut self, update: ChartUpdate) -> ChartResult<()>;

    fn set_visibility(&mut self, series: usize, visible: bool);

    fn resize(&mut self);

    fn destroy(&mut self);

    fn is_created(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    NoData,
}

/// Everything the markup needs to draw controls and status.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub chart: ChartKind,
    pub bin: Bin,
    pub charts: Vec<ChartKind>,
    pub bins: Vec<Bin>,
    /// Highlighted zoom button; `None` for a custom zoom.
    pub active_preset: Option<Bin>,
    pub visibility: Vec<bool>,
    pub status: ViewStatus,
    pub window: Option<ZoomWindow>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            chart: ChartKind::Amount,
            bin: Bin::Week,
            charts: Vec::new(),
            bins: Vec::new(),
            active_preset: None,
            visibility: Vec::new(),
            status: ViewStatus::Idle,
            window: None,
        }
    }
}

/// DOM side of a controller: a single render call per state change.
pub trait ViewSurface {
    fn render(&self, model: &ViewModel);
}

/// URL persistence of settings.
pub trait QueryStore {
    fn load(&self) -> QueryState;

    /// Replace the values of `managed` keys with those in `state`, leaving
    /// every other key of the URL alone.
    fn replace(&self, state: &QueryState, managed: &[&str]);
}
