use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Intensity assigned to records that omit the field, applied once at load.
pub const DEFAULT_INTENSITY: f64 = 3.0;

/// Signals grouped by calendar date (`YYYY-MM-DD` key). ISO date strings sort
/// lexicographically in chronological order, so the map iterates oldest first.
pub type SignalsByDate = BTreeMap<String, Vec<Signal>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub ts: String,
    #[serde(rename = "type")]
    pub signal_type: String,
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub context: String,
}

fn default_intensity() -> f64 {
    DEFAULT_INTENSITY
}

impl Signal {
    /// Calendar date key: the first 10 characters of `ts`, or the whole
    /// string when it is shorter.
    pub fn date_key(&self) -> &str {
        self.ts.get(..10).unwrap_or(&self.ts)
    }
}

#[derive(Debug, Clone)]
pub struct ParseWarning {
    pub source: String,
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct LoadedSignals {
    pub by_date: SignalsByDate,
    pub warnings: Vec<ParseWarning>,
}

impl LoadedSignals {
    pub fn total_signals(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    /// -1, 0 or +1: the sign of the mean weighted intensity in the window.
    pub direction: i32,
    /// Absolute mean weighted intensity over the window, always >= 0.
    pub strength: f64,
    /// Distinct signal-bearing dates across the full history, not clipped
    /// to the scoring window.
    pub days: usize,
    /// Signal occurrences inside the scoring window.
    pub total_signals: usize,
}
