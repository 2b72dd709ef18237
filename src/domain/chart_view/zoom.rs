//! Zoom/bin codec.
//!
//! A visible window travels through the URL as `"<start>-<end>"` with both
//! millisecond timestamps in base 36. A zoom request in the URL may also be
//! a preset name (`week`, `all`, ...) which is resolved against the data
//! bounds once they are known.

use derive_more::Display;

use super::value_objects::{Bin, TimeRange, ZoomWindow};
use crate::domain::errors::ChartError;
use crate::domain::logging::LogComponent;

const RADIX: u32 = 36;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// How close (as a fraction of the preset) a window must be to count as
/// that preset.
const PRESET_TOLERANCE: f64 = 0.01;

/// A zoom as it appears in settings: a named preset or an encoded window.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ZoomRequest {
    #[display(fmt = "{}", _0)]
    Preset(Bin),
    #[display(fmt = "{}", _0)]
    Window(String),
}

impl ZoomRequest {
    /// Preset names win; anything else is kept verbatim and only decoded
    /// when validated against data.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match Bin::parse(raw) {
            Ok(bin) => Some(ZoomRequest::Preset(bin)),
            Err(_) => Some(ZoomRequest::Window(raw.to_string())),
        }
    }

    pub fn window(window: ZoomWindow) -> Self {
        ZoomRequest::Window(encode(window.start, window.end))
    }
}

/// Bin name to duration in milliseconds; `all` is 0.
pub fn map_value(name: &str) -> Result<u64, ChartError> {
    Bin::parse(name).map(Bin::duration_ms)
}

pub fn encode(start: u64, end: u64) -> String {
    format!("{}-{}", to_base36(start), to_base36(end))
}

pub fn decode(code: &str) -> Option<ZoomWindow> {
    try_decode(code).ok()
}

/// `decode` with the reason for rejecting the input.
pub fn try_decode(code: &str) -> Result<ZoomWindow, ChartError> {
    let invalid = || ChartError::InvalidZoomEncoding(code.to_string());
    let (start, end) = code.trim().split_once('-').ok_or_else(invalid)?;
    let start = parse_base36(start).ok_or_else(invalid)?;
    let end = parse_base36(end).ok_or_else(invalid)?;
    if start >= end {
        return Err(invalid());
    }
    Ok(ZoomWindow::new(start, end))
}

/// Resolve a zoom request against the loaded data. The result always lies
/// inside `range`.
pub fn validate(request: Option<&ZoomRequest>, range: TimeRange, bin_size: u64) -> ZoomWindow {
    let full = range.full_window();
    let window = match request {
        None => full,
        Some(ZoomRequest::Preset(bin)) => {
            let duration = bin.duration_ms();
            if duration == 0 || duration >= range.span() {
                full
            } else {
                ZoomWindow::new(range.max - duration, range.max)
            }
        }
        Some(ZoomRequest::Window(code)) => match try_decode(code) {
            Ok(window) => range.clamp(window),
            Err(e) => {
                crate::log_debug!(LogComponent::Domain("Zoom"), "{}, using full range", e);
                full
            }
        },
    };
    at_least_one_bin(window, range, bin_size)
}

/// Preset matching an encoded window, `None` for a custom zoom.
pub fn map_key(code: &str, range: TimeRange) -> Option<Bin> {
    let window = range.clamp(decode(code)?);
    if window == range.full_window() {
        return Some(Bin::All);
    }
    let span = window.span() as f64;
    Bin::bounded().find(|bin| {
        let duration = bin.duration_ms();
        duration < range.span() && (span - duration as f64).abs() <= duration as f64 * PRESET_TOLERANCE
    })
}

fn at_least_one_bin(window: ZoomWindow, range: TimeRange, bin_size: u64) -> ZoomWindow {
    if bin_size == 0 || window.span() >= bin_size || range.span() <= bin_size {
        return window;
    }
    let end = window.start.saturating_add(bin_size).min(range.max);
    ZoomWindow::new(end - bin_size, end)
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % RADIX as u64) as usize]);
        value /= RADIX as u64;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

fn parse_base36(digits: &str) -> Option<u64> {
    if digits.is_empty() || digits.starts_with('+') {
        return None;
    }
    u64::from_str_radix(digits, RADIX).ok()
}
