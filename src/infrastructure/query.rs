use wasm_bindgen::{JsCast, JsValue};
use web_sys::UrlSearchParams;

use crate::{
    application::QueryStore,
    domain::{
        chart_view::QueryState,
        errors::{ChartError, ChartResult},
        logging::{get_logger, LogComponent},
    },
};

/// The page URL's query string. Writes go through `history.replaceState`
/// so settings changes never add navigation entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserQueryStore;

impl BrowserQueryStore {
    pub fn new() -> Self {
        Self
    }

    fn window() -> ChartResult<web_sys::Window> {
        web_sys::window().ok_or_else(|| ChartError::Browser("no window".into()))
    }

    fn read_params() -> ChartResult<UrlSearchParams> {
        let search = Self::window()?.location().search().map_err(js_error)?;
        UrlSearchParams::new_with_str(&search).map_err(js_error)
    }

    fn read() -> ChartResult<QueryState> {
        let params = Self::read_params()?;
        let mut pairs = Vec::new();
        if let Some(entries) = js_sys::try_iter(&params).map_err(js_error)? {
            for entry in entries {
                let entry: js_sys::Array = entry.map_err(js_error)?.unchecked_into();
                let key = entry.get(0).as_string().unwrap_or_default();
                let value = entry.get(1).as_string().unwrap_or_default();
                pairs.push((key, value));
            }
        }
        Ok(QueryState::from_pairs(pairs))
    }

    fn write(state: &QueryState, managed: &[&str]) -> ChartResult<()> {
        let window = Self::window()?;
        let params = Self::read_params()?;
        for key in managed {
            params.delete(key);
        }
        for (key, value) in state.pairs() {
            params.append(key, value);
        }

        let location = window.location();
        let path = location.pathname().map_err(js_error)?;
        let hash = location.hash().map_err(js_error)?;
        let query = String::from(params.to_string());
        let url = if query.is_empty() { format!("{path}{hash}") } else { format!("{path}?{query}{hash}") };

        window.history().map_err(js_error)?.replace_state_with_url(&JsValue::NULL, "", Some(&url)).map_err(js_error)
    }
}

impl QueryStore for BrowserQueryStore {
    fn load(&self) -> QueryState {
        Self::read().unwrap_or_else(|e| {
            get_logger().warn(LogComponent::Infrastructure("QueryStore"), &format!("⚠️ Cannot read URL: {e}"));
            QueryState::new()
        })
    }

    fn replace(&self, state: &QueryState, managed: &[&str]) {
        if let Err(e) = Self::write(state, managed) {
            get_logger().error(LogComponent::Infrastructure("QueryStore"), &format!("❌ Cannot update URL: {e}"));
        }
    }
}

fn js_error(value: JsValue) -> ChartError {
    ChartError::Browser(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}
