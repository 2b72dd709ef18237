use std::collections::HashMap;
use std::rc::Rc;

use leptos::*;
use strum::IntoEnumIterator;

use crate::{
    application::{ViewController, ViewModel, ViewStatus, ViewSurface},
    domain::{
        chart_view::{Bin, ChartKind},
        logging::{get_logger, LogComponent},
        tooltip::TooltipContent,
    },
};

/// [`ViewSurface`] that publishes each model into a Leptos signal.
#[derive(Clone, Copy)]
pub struct SignalSurface {
    model: RwSignal<ViewModel>,
}

impl SignalSurface {
    pub fn new(model: RwSignal<ViewModel>) -> Self {
        Self { model }
    }
}

impl ViewSurface for SignalSurface {
    fn render(&self, model: &ViewModel) {
        self.model.set(model.clone());
    }
}

/// Run a load started from an event handler; the outcome only matters to tests.
fn dispatch(load: Option<futures::future::LocalBoxFuture<'static, crate::application::LoadOutcome>>) {
    if let Some(load) = load {
        spawn_local(async move {
            let _ = load.await;
        });
    }
}

/// Controls, status line and chart area for one [`ViewController`].
#[component]
pub fn ChartView(
    controller: Rc<ViewController>,
    model: RwSignal<ViewModel>,
    /// Id of the element the chart widget draws into.
    graph_id: String,
    /// Raw `title` payloads by API series name.
    titles: Rc<HashMap<String, String>>,
) -> impl IntoView {
    let charts = controller.config().charts.clone();
    let bins = controller.config().bins.clone();

    let chart_buttons = {
        let controller = Rc::clone(&controller);
        charts
            .into_iter()
            .map(|chart: ChartKind| {
                let controller = Rc::clone(&controller);
                view! {
                    <button
                        class="chart-btn"
                        class:active=move || model.with(|m| m.chart == chart)
                        on:click=move |_| dispatch(controller.on_chart_type_change(chart.as_ref()))
                    >
                        {chart.to_string()}
                    </button>
                }
            })
            .collect_view()
    };

    let bin_buttons = {
        let controller = Rc::clone(&controller);
        bins.into_iter()
            .map(|bin: Bin| {
                let controller = Rc::clone(&controller);
                view! {
                    <button
                        class="bin-btn"
                        class:active=move || model.with(|m| m.bin == bin)
                        on:click=move |_| dispatch(controller.on_bin_change(bin.as_ref()))
                    >
                        {bin.to_string()}
                    </button>
                }
            })
            .collect_view()
    };

    let zoom_buttons = {
        let controller = Rc::clone(&controller);
        Bin::iter()
            .map(|preset| {
                let controller = Rc::clone(&controller);
                view! {
                    <button
                        class="zoom-btn"
                        class:active=move || model.with(|m| m.active_preset == Some(preset))
                        on:click=move |_| {
                            controller.on_zoom_preset(preset.as_ref());
                        }
                    >
                        {preset.to_string()}
                    </button>
                }
            })
            .collect_view()
    };

    let flow_toggles = {
        let controller = Rc::clone(&controller);
        move || {
            let (chart, visibility) = model.with(|m| (m.chart, m.visibility.clone()));
            chart
                .series_labels()
                .iter()
                .zip(chart.series_names())
                .enumerate()
                .map(|(index, (label, name))| {
                    let controller = Rc::clone(&controller);
                    let title = titles.get(*name).map(|raw| TooltipContent::parse(raw).to_text()).unwrap_or_default();
                    let checked = visibility.get(index).copied().unwrap_or(true);
                    view! {
                        <label class="flow-toggle" title=title>
                            <input
                                type="checkbox"
                                prop:checked=checked
                                on:change=move |_| {
                                    if !controller.toggle_series(index) {
                                        get_logger().debug(
                                            LogComponent::Presentation("ChartView"),
                                            "🙈 Keeping the last visible series",
                                        );
                                    }
                                }
                            />
                            {*label}
                        </label>
                    }
                })
                .collect_view()
        }
    };

    let status = move || match model.with(|m| m.status) {
        ViewStatus::Loading => "Loading…",
        ViewStatus::NoData => "no data available",
        ViewStatus::Idle | ViewStatus::Ready => "",
    };
    let no_data = move || model.with(|m| m.status == ViewStatus::NoData);

    view! {
        <style>
            {r#"
            .chart-view .controls { display: flex; flex-wrap: wrap; gap: 6px; margin-bottom: 8px; }
            .chart-view button.active { font-weight: bold; text-decoration: underline; }
            .chart-view .status { min-height: 1.2em; color: #777; }
            .chart-view .chart-graph { width: 100%; height: 320px; }
            .chart-view .chart-graph.hidden { visibility: hidden; }
            "#}
        </style>
        <div class="chart-view">
            <div class="controls">
                <div class="chart-types">{chart_buttons}</div>
                <div class="bins">{bin_buttons}</div>
                <div class="zoom">{zoom_buttons}</div>
                <div class="flow">{flow_toggles}</div>
            </div>
            <div class="status">{status}</div>
            <div id=graph_id class="chart-graph" class:hidden=no_data></div>
        </div>
    }
}
