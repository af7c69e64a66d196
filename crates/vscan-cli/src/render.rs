//! Terminal rendering of session events and the final report.

use std::fmt::Write as _;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use vscan_models::{format_file_size, format_seconds, EntryState, SelectionEntry};
use vscan_session::{AggregatedResults, OrchestrationSummary, SessionEvent};

const BAR_TEMPLATE: &str = "{prefix:>3} [{bar:40.cyan/blue}] {pos:>3}% {wide_msg}";

/// One progress bar per entry, driven by [`SessionEvent`]s.
pub struct ProgressBoard {
    _multi: MultiProgress,
    bars: Vec<ProgressBar>,
}

impl ProgressBoard {
    pub fn new(entries: &[SelectionEntry], hidden: bool) -> Self {
        let multi = if hidden {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");

        let bars = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let bar = multi.add(ProgressBar::new(100));
                bar.set_style(style.clone());
                bar.set_prefix(format!("{}", index + 1));
                bar.set_message(entry_label(entry, EntryState::Pending, None));
                bar
            })
            .collect();

        Self {
            _multi: multi,
            bars,
        }
    }

    /// Apply one event; returns true once the run has finished.
    pub fn apply(&self, event: &SessionEvent, entries: &[SelectionEntry]) -> bool {
        match event {
            SessionEvent::EntryUpdated {
                index,
                state,
                progress,
                error,
            } => {
                if let (Some(bar), Some(entry)) = (self.bars.get(*index), entries.get(*index)) {
                    bar.set_position(u64::from(*progress));
                    bar.set_message(entry_label(entry, *state, error.as_deref()));
                    if state.is_terminal() {
                        bar.finish();
                    }
                }
                false
            }
            SessionEvent::RunFinished { .. } => true,
            _ => false,
        }
    }

    pub fn finish(&self) {
        for bar in &self.bars {
            if !bar.is_finished() {
                bar.abandon();
            }
        }
    }
}

fn entry_label(entry: &SelectionEntry, state: EntryState, error: Option<&str>) -> String {
    let mut label = format!("{} ({}) {}", entry.file.name, format_file_size(entry.file.size), state);
    if entry.has_subtitle() {
        label.push_str(" +srt");
    }
    if let Some(reason) = error {
        let _ = write!(label, ": {}", reason);
    }
    label
}

/// Machine-readable report printed with `--json`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub summary: &'a OrchestrationSummary,
    pub entries: &'a [SelectionEntry],
    pub results: Option<&'a AggregatedResults>,
}

/// Human-readable report of a finished run.
pub fn render_report(
    summary: &OrchestrationSummary,
    uploaded: usize,
    results: Option<&AggregatedResults>,
) -> String {
    let mut out = format!(
        "{} uploaded, {} failed, {} skipped\n",
        uploaded, summary.failed, summary.skipped
    );
    if let Some(results) = results {
        out.push_str(&render_events(results));
    }
    out
}

/// Alert list, or the all-clear line.
pub fn render_events(results: &AggregatedResults) -> String {
    if results.all_clear {
        return "all clear: nothing suspicious found\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} suspicious event(s):", results.events.len());
    for event in &results.events {
        let seek = match event.seek_seconds() {
            Ok(seconds) => format!("seek {}", format_seconds(seconds)),
            Err(e) => format!("unseekable ({})", e),
        };
        let _ = writeln!(
            out,
            "  [{}] {}, {}: {}",
            event.timestamp, event.object_in_question, seek, event.why_suspicious
        );
        for image in &event.images {
            let _ = writeln!(out, "      {}", image);
        }
    }
    out
}
