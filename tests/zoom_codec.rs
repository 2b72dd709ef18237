use explorer_chart_wasm::domain::chart_view::{
    zoom, Bin, ChartKind, FlowMask, QueryState, TimeRange, ViewSettings, ZoomRequest, ZoomWindow,
};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use strum::IntoEnumIterator;

#[quickcheck]
fn decode_inverts_encode(a: u64, b: u64) -> TestResult {
    if a == b {
        return TestResult::discard();
    }
    let (start, end) = (a.min(b), a.max(b));
    TestResult::from_bool(zoom::decode(&zoom::encode(start, end)) == Some(ZoomWindow::new(start, end)))
}

#[quickcheck]
fn validated_window_lies_in_range(code: String, a: u64, b: u64, bin: u8) -> bool {
    let range = TimeRange::new(a, b);
    let bin_size = Bin::iter().nth(bin as usize % 5).map(Bin::duration_ms).unwrap_or(0);
    let window = zoom::validate(Some(&ZoomRequest::Window(code)), range, bin_size);
    range.contains(&window)
}

#[quickcheck]
fn validated_window_of_any_request_lies_in_range(start: u64, end: u64, a: u64, b: u64, preset: u8) -> bool {
    let range = TimeRange::new(a, b);
    let preset = Bin::iter().nth(preset as usize % 5).unwrap_or(Bin::All);
    let requests = [
        None,
        Some(ZoomRequest::Preset(preset)),
        Some(ZoomRequest::Window(zoom::encode(start, end))),
    ];
    requests
        .iter()
        .all(|request| range.contains(&zoom::validate(request.as_ref(), range, preset.duration_ms())))
}

#[quickcheck]
fn settings_survive_the_query_string(chart: u8, bin: u8, flow: u8, start: u32, len: u32) -> bool {
    let chart = ChartKind::iter().nth(chart as usize % 3).unwrap_or(ChartKind::Amount);
    let bin = Bin::iter().nth(bin as usize % 5).unwrap_or(Bin::All);
    let mut settings = ViewSettings::new(chart, bin);
    settings.flow = FlowMask::from(flow % 16).effective(chart.series_count());
    if settings.flow.bits() == 0 {
        settings.flow = FlowMask::all(chart.series_count());
    }
    settings.zoom = Some(ZoomRequest::window(ZoomWindow::new(u64::from(start), u64::from(start) + u64::from(len) + 1)));

    let defaults = ViewSettings::new(ChartKind::Amount, Bin::Week);
    ViewSettings::from_query(&settings.to_query(&defaults), &defaults) == settings
}

#[test]
fn bin_durations_grow_with_the_bin() {
    let durations: Vec<u64> = ["day", "week", "month", "year"].iter().map(|b| zoom::map_value(b).unwrap()).collect();
    assert!(durations.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(zoom::map_value("all"), Ok(0));
    assert!(zoom::map_value("fortnight").is_err());
}

#[test]
fn malformed_codes_fall_back_to_the_full_range() {
    let range = TimeRange::new(1_000, 9_000_000);
    for code in ["", "-", "abc", "zz-", "-zz", "+1-2", "5-1", "1-1", "1-2-3", "ä-ö"] {
        assert_eq!(
            zoom::validate(Some(&ZoomRequest::Window(code.to_string())), range, 0),
            range.full_window(),
            "code {code:?}"
        );
    }
}

#[test]
fn query_string_layout() {
    let mut settings = ViewSettings::new(ChartKind::Count, Bin::Month);
    settings.zoom = Some(ZoomRequest::Preset(Bin::Year));
    settings.flow = FlowMask::from(1);
    settings.pair = Some("btc".into());
    let query = settings.to_query(&ViewSettings::new(ChartKind::Amount, Bin::Week));
    insta::assert_snapshot!(query.to_display_string(), @"chart=count&bin=month&zoom=year&flow=1&pair=btc");

    let window = ViewSettings { zoom: Some(ZoomRequest::window(ZoomWindow::new(0, 36 * 36))), ..settings };
    let defaults = window.clone();
    insta::assert_snapshot!(window.to_query(&defaults).to_display_string(), @"zoom=0-100&flow=1&pair=btc");
    assert_eq!(ViewSettings::from_query(&QueryState::new(), &defaults), defaults);
}
