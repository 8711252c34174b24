use std::collections::BTreeMap;

use crate::classify;
use crate::models::{Signal, SignalsByDate, Trend};

/// Distinct signal-bearing dates a dimension needs before a trend is scored,
/// and the span of the scoring window itself.
pub const TREND_WINDOW_DAYS: usize = 3;
/// Flat adjustment proposed per run for any non-flat trend.
pub const MAX_DRIFT_PER_DAY: i32 = 1;

// Drift policy limits carried for compatibility; nothing in the analysis
// pass consults them yet.
#[allow(dead_code)]
pub const REBOUND_WINDOW_DAYS: usize = 14;
#[allow(dead_code)]
pub const MAX_SELF_DISCOVERED: usize = 4;

/// Detect multi-day trends per dimension.
///
/// A dimension qualifies once it has signals on at least `window` distinct
/// dates. Scoring then looks at the most recent `window` signal-bearing dates
/// only; `days` still reports the full historical count, which is how long
/// the trend has been building rather than how much recent signal it has.
pub fn detect_trends(by_date: &SignalsByDate, window: usize) -> BTreeMap<String, Trend> {
    let mut dim_signals: BTreeMap<&'static str, BTreeMap<&str, Vec<&Signal>>> = BTreeMap::new();

    for (date, signals) in by_date {
        for signal in signals {
            for dim in classify::classify(signal) {
                dim_signals
                    .entry(dim)
                    .or_default()
                    .entry(date.as_str())
                    .or_default()
                    .push(signal);
            }
        }
    }

    let mut trends = BTreeMap::new();
    for (dim, by_dim_date) in dim_signals {
        let dates: Vec<&str> = by_dim_date.keys().copied().collect();
        if dates.len() < window {
            continue;
        }

        let mut total_intensity = 0.0;
        let mut signal_count = 0usize;
        for date in &dates[dates.len() - window..] {
            for signal in &by_dim_date[date] {
                total_intensity += signal_weight(signal);
                signal_count += 1;
            }
        }

        let avg = if signal_count > 0 {
            total_intensity / signal_count as f64
        } else {
            0.0
        };
        let direction = if avg > 0.0 {
            1
        } else if avg < 0.0 {
            -1
        } else {
            0
        };

        trends.insert(
            dim.to_string(),
            Trend {
                direction,
                strength: avg.abs(),
                days: dates.len(),
                total_signals: signal_count,
            },
        );
    }

    trends
}

/// Per-type weighting policy: approvals, emotions and preferences push a
/// dimension in their direction at full intensity, corrections push against
/// it, and anything else (style notes included) counts at half weight.
fn signal_weight(signal: &Signal) -> f64 {
    match signal.signal_type.as_str() {
        "approval" | "emotion" | "preference" => signal.intensity,
        "correction" => -signal.intensity,
        _ => signal.intensity * 0.5,
    }
}
