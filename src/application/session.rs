use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::domain::chart_view::{Bin, ChartKind, ViewSettings, ZoomRequest};

/// What a report remembers about its chart between widget instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberedView {
    pub chart: ChartKind,
    pub bin: Bin,
    pub zoom: Option<ZoomRequest>,
}

impl From<&ViewSettings> for RememberedView {
    fn from(settings: &ViewSettings) -> Self {
        Self { chart: settings.chart, bin: settings.bin, zoom: settings.zoom.clone() }
    }
}

/// Per-page memory shared by the controllers it is handed to, with one
/// named slot per report variant. Cloning shares the slots.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    slots: Rc<RefCell<HashMap<String, RememberedView>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&self, slot: &str, view: RememberedView) {
        self.slots.borrow_mut().insert(slot.to_string(), view);
    }

    pub fn recall(&self, slot: &str) -> Option<RememberedView> {
        self.slots.borrow().get(slot).cloned()
    }

    pub fn forget(&self, slot: &str) {
        self.slots.borrow_mut().remove(slot);
    }

    /// `base` with the remembered chart/bin/zoom of `slot` applied, as
    /// long as they are still enabled.
    pub fn overlay(&self, slot: Option<&str>, base: ViewSettings, charts: &[ChartKind], bins: &[Bin]) -> ViewSettings {
        let Some(view) = slot.and_then(|slot| self.recall(slot)) else {
            return base;
        };
        let mut settings = base;
        if charts.contains(&view.chart) {
            settings.chart = view.chart;
        }
        if bins.contains(&view.bin) {
            settings.bin = view.bin;
        }
        if view.zoom.is_some() {
            settings.zoom = view.zoom;
        }
        settings
    }
}
