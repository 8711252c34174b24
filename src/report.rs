use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{SignalsByDate, Trend};
use crate::trend::MAX_DRIFT_PER_DAY;

pub fn summarize_by_type(by_date: &SignalsByDate) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for signals in by_date.values() {
        for signal in signals {
            *counts.entry(signal.signal_type.clone()).or_insert(0) += 1;
        }
    }
    counts
}

pub fn direction_glyph(direction: i32) -> &'static str {
    if direction > 0 {
        "↑"
    } else if direction < 0 {
        "↓"
    } else {
        "—"
    }
}

fn proposed_change(direction: i32) -> String {
    if direction > 0 {
        format!("+{MAX_DRIFT_PER_DAY}")
    } else if direction < 0 {
        format!("-{MAX_DRIFT_PER_DAY}")
    } else {
        "0".to_string()
    }
}

/// Render the daily reflection report. Pure formatting: every value comes
/// from the aggregates and trends unchanged, and the header date is injected
/// by the caller so identical inputs render identical bytes.
pub fn build_report(
    report_date: NaiveDate,
    by_date: &SignalsByDate,
    trends: &BTreeMap<String, Trend>,
) -> String {
    let total: usize = by_date.values().map(Vec::len).sum();
    let breakdown = summarize_by_type(by_date)
        .iter()
        .map(|(signal_type, count)| format!("{signal_type} ({count})"))
        .collect::<Vec<_>>()
        .join(", ");
    let first_date = by_date.keys().next().map(String::as_str).unwrap_or("n/a");
    let last_date = by_date.keys().next_back().map(String::as_str).unwrap_or("n/a");

    let mut output = String::new();

    let _ = writeln!(output, "# {report_date} Daily Reflection");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Signal Summary");
    let _ = writeln!(output, "- Total signals analyzed: {total}");
    let _ = writeln!(output, "- Date range: {first_date} to {last_date}");
    let _ = writeln!(output, "- Breakdown: {breakdown}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Dimension Evaluation");
    let _ = writeln!(
        output,
        "| Dimension | Direction | Strength | Days | Signals | Proposed Change |"
    );
    let _ = writeln!(
        output,
        "|-----------|-----------|----------|------|---------|----------------|"
    );

    for (dim, trend) in trends {
        let _ = writeln!(
            output,
            "| {} | {} | {:.1} | {} | {} | {} |",
            dim,
            direction_glyph(trend.direction),
            trend.strength,
            trend.days,
            trend.total_signals,
            proposed_change(trend.direction)
        );
    }

    if trends.is_empty() {
        let _ = writeln!(output, "| — | — | — | — | — | No trends detected |");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Proposed Actions");

    if trends.is_empty() {
        let _ = writeln!(output, "- No changes proposed (insufficient trend data)");
    } else {
        for (dim, trend) in trends {
            if trend.direction == 0 {
                continue;
            }
            let action = if trend.direction > 0 { "increase" } else { "decrease" };
            let _ = writeln!(
                output,
                "- **{dim}**: {action} by {MAX_DRIFT_PER_DAY} (trend strength: {:.1})",
                trend.strength
            );
        }
    }

    output
}
