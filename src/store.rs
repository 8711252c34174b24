use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::models::{LoadedSignals, ParseWarning, Signal, DEFAULT_INTENSITY};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no signals found under {}", dir.display())]
    EmptyInput { dir: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Load every `*.jsonl` log under `dir` (non-recursive, lexicographic file
/// order) and group the records by calendar date. Malformed lines are skipped
/// and surfaced as warnings; they never abort the run.
pub fn load_signals(dir: &Path) -> Result<LoadedSignals, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::EmptyInput {
            dir: dir.to_path_buf(),
        });
    }

    let mut loaded = LoadedSignals::default();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "jsonl") {
            continue;
        }
        read_log_file(path, &mut loaded)?;
    }

    if loaded.by_date.is_empty() {
        return Err(StoreError::EmptyInput {
            dir: dir.to_path_buf(),
        });
    }

    Ok(loaded)
}

fn read_log_file(path: &Path, loaded: &mut LoadedSignals) -> Result<(), StoreError> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file = fs::File::open(path)?;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Signal>(line) {
            Ok(signal) => {
                let date = signal.date_key().to_string();
                loaded.by_date.entry(date).or_default().push(signal);
            }
            Err(err) => {
                warn!(
                    source = %source,
                    line = index + 1,
                    error = %err,
                    "skipping malformed signal"
                );
                loaded.warnings.push(ParseWarning {
                    source: source.clone(),
                    line: index + 1,
                    message: err.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Write a fixed sample log so the pipeline can be exercised end to end.
pub fn seed_signals(dir: &Path) -> anyhow::Result<usize> {
    let samples = sample_seed_signals();

    fs::create_dir_all(dir)?;
    let mut contents = String::new();
    for signal in &samples {
        contents.push_str(&serde_json::to_string(signal)?);
        contents.push('\n');
    }
    fs::write(dir.join("seed-signals.jsonl"), contents)?;

    Ok(samples.len())
}

fn sample_seed_signals() -> Vec<Signal> {
    let entries = [
        ("2026-02-01T09:12:00Z", "approval", 4.0, "Said the warm tone felt right", "morning check-in"),
        ("2026-02-01T17:40:00Z", "style", 3.0, "Asked for shorter, more concise updates", "status report"),
        ("2026-02-02T10:05:00Z", "approval", 3.0, "Liked the friendly greeting", "daily standup"),
        ("2026-02-02T15:30:00Z", "correction", 4.0, "Reply came across harsh, soften it", "code review thread"),
        ("2026-02-03T08:55:00Z", "preference", 3.0, "Prefers brief bullet summaries", "planning notes"),
        ("2026-02-03T13:20:00Z", "emotion", 5.0, "Laughed at the joke in the recap", "retro"),
        ("2026-02-04T09:45:00Z", "approval", 2.0, "Appreciated the gentle reminder", "follow-up"),
        ("2026-02-04T19:10:00Z", "correction", 3.0, "Too much detail, keep it short", "weekly digest"),
        ("2026-02-05T11:00:00Z", "preference", 4.0, "Just do it without asking next time", "deploy request"),
    ];

    entries
        .iter()
        .map(|&(ts, signal_type, intensity, summary, context)| Signal {
            ts: ts.to_string(),
            signal_type: signal_type.to_string(),
            intensity,
            summary: summary.to_string(),
            context: context.to_string(),
        })
        .collect()
}

/// Append rows of a CSV file to the log directory as JSONL signals.
/// Returns the number of appended records.
pub fn import_csv(dir: &Path, csv_path: &Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        ts: String,
        #[serde(rename = "type")]
        signal_type: String,
        intensity: Option<f64>,
        summary: Option<String>,
        context: Option<String>,
    }

    fs::create_dir_all(dir)?;
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut out = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("imported.jsonl"))?;

    let mut appended = 0usize;
    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let signal = Signal {
            ts: row.ts,
            signal_type: row.signal_type,
            intensity: row.intensity.unwrap_or(DEFAULT_INTENSITY),
            summary: row.summary.unwrap_or_default(),
            context: row.context.unwrap_or_default(),
        };
        writeln!(out, "{}", serde_json::to_string(&signal)?)?;
        appended += 1;
    }

    Ok(appended)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_log(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn groups_records_by_date_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "signals.jsonl",
            concat!(
                r#"{"ts":"2026-02-01T09:00:00Z","type":"approval","summary":"warm"}"#,
                "\n",
                r#"{"ts":"2026-02-01T18:00:00Z","type":"style","summary":"short"}"#,
                "\n",
                r#"{"ts":"2026-02-02T08:00:00Z","type":"correction","summary":"harsh"}"#,
                "\n",
            ),
        );

        let loaded = load_signals(dir.path()).unwrap();
        assert_eq!(loaded.by_date.len(), 2);
        assert_eq!(loaded.by_date["2026-02-01"].len(), 2);
        assert_eq!(loaded.by_date["2026-02-02"].len(), 1);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped_with_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "signals.jsonl",
            concat!(
                r#"{"ts":"2026-02-01T09:00:00Z","type":"approval"}"#,
                "\n",
                "not json at all\n",
                r#"{"type":"approval","summary":"missing ts"}"#,
                "\n",
            ),
        );

        let loaded = load_signals(dir.path()).unwrap();
        assert_eq!(loaded.total_signals(), 1);
        assert_eq!(loaded.warnings.len(), 2);
        assert_eq!(loaded.warnings[0].source, "signals.jsonl");
        assert_eq!(loaded.warnings[0].line, 2);
        assert_eq!(loaded.warnings[1].line, 3);
    }

    #[test]
    fn blank_lines_are_ignored_silently() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "signals.jsonl",
            concat!(
                "\n",
                r#"{"ts":"2026-02-01T09:00:00Z","type":"approval"}"#,
                "\n\n",
            ),
        );

        let loaded = load_signals(dir.path()).unwrap();
        assert_eq!(loaded.total_signals(), 1);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn files_combine_in_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "b-later.jsonl",
            concat!(r#"{"ts":"2026-02-01T09:00:00Z","type":"approval","summary":"second"}"#, "\n"),
        );
        write_log(
            dir.path(),
            "a-earlier.jsonl",
            concat!(r#"{"ts":"2026-02-01T12:00:00Z","type":"approval","summary":"first"}"#, "\n"),
        );

        let loaded = load_signals(dir.path()).unwrap();
        let day = &loaded.by_date["2026-02-01"];
        assert_eq!(day[0].summary, "first");
        assert_eq!(day[1].summary, "second");
    }

    #[test]
    fn non_jsonl_files_are_not_read() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "notes.txt", "this is not a signal log\n");
        write_log(
            dir.path(),
            "signals.jsonl",
            concat!(r#"{"ts":"2026-02-01T09:00:00Z","type":"approval"}"#, "\n"),
        );

        let loaded = load_signals(dir.path()).unwrap();
        assert_eq!(loaded.total_signals(), 1);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn empty_directory_is_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_signals(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::EmptyInput { .. }));
    }

    #[test]
    fn missing_directory_is_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_signals(&dir.path().join("does-not-exist")).unwrap_err();
        assert!(matches!(err, StoreError::EmptyInput { .. }));
    }

    #[test]
    fn all_lines_malformed_is_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "signals.jsonl", "garbage\nmore garbage\n");
        let err = load_signals(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::EmptyInput { .. }));
    }

    #[test]
    fn seeded_log_round_trips_through_the_loader() {
        let dir = tempfile::tempdir().unwrap();
        let written = seed_signals(dir.path()).unwrap();

        let loaded = load_signals(dir.path()).unwrap();
        assert_eq!(loaded.total_signals(), written);
        assert_eq!(loaded.by_date.len(), 5);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn csv_import_appends_to_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("batch.csv");
        fs::write(
            &csv_path,
            concat!(
                "ts,type,intensity,summary,context\n",
                "2026-02-01T09:00:00Z,approval,4,Liked the warm reply,check-in\n",
                "2026-02-02T09:00:00Z,style,,Keep it brief,digest\n",
            ),
        )
        .unwrap();

        let signals_dir = dir.path().join("signals");
        let appended = import_csv(&signals_dir, &csv_path).unwrap();
        assert_eq!(appended, 2);

        let loaded = load_signals(&signals_dir).unwrap();
        assert_eq!(loaded.total_signals(), 2);
        let second = &loaded.by_date["2026-02-02"][0];
        assert_eq!(second.intensity, DEFAULT_INTENSITY);
        assert_eq!(second.summary, "Keep it brief");
    }
}
