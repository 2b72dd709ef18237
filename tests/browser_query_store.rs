#![cfg(target_arch = "wasm32")]

use explorer_chart_wasm::application::QueryStore;
use explorer_chart_wasm::domain::chart_view::{QueryState, ViewSettings};
use explorer_chart_wasm::infrastructure::BrowserQueryStore;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn navigate(search: &str) {
    let window = web_sys::window().unwrap();
    let path = window.location().pathname().unwrap();
    window
        .history()
        .unwrap()
        .replace_state_with_url(&JsValue::NULL, "", Some(&format!("{path}{search}")))
        .unwrap();
}

#[wasm_bindgen_test]
fn replace_keeps_foreign_keys() {
    navigate("?utm_source=feed&zoom=old&bin=day");
    let store = BrowserQueryStore::new();

    let state = QueryState::from_pairs([("bin", "month"), ("flow", "1")]);
    store.replace(&state, &ViewSettings::KEYS);

    let loaded = store.load();
    assert_eq!(loaded.get("utm_source"), Some("feed"));
    assert_eq!(loaded.get("bin"), Some("month"));
    assert_eq!(loaded.get("flow"), Some("1"));
    assert_eq!(loaded.get("zoom"), None);
    assert_eq!(web_sys::window().unwrap().location().search().unwrap(), "?utm_source=feed&bin=month&flow=1");
}

#[wasm_bindgen_test]
fn empty_state_drops_the_question_mark() {
    navigate("?chart=count");
    BrowserQueryStore::new().replace(&QueryState::new(), &ViewSettings::KEYS);
    assert_eq!(web_sys::window().unwrap().location().search().unwrap(), "");
    assert!(BrowserQueryStore::new().load().is_empty());
}

#[wasm_bindgen_test]
fn values_are_url_encoded() {
    navigate("");
    let state = QueryState::from_pairs([("search", "a b&c")]);
    BrowserQueryStore::new().replace(&state, &ViewSettings::KEYS);
    assert_eq!(BrowserQueryStore::new().load().get("search"), Some("a b&c"));
}
