//! `chatlens metrics`: compute and print engagement metrics

use crate::config::Config;
use crate::error::{ChatlensError, Result};
use crate::metrics::Metrics;
use crate::session::Snapshot;
use crate::storage;
use colored::Colorize;
use prettytable::{format, Table};
use std::path::PathBuf;

/// Widest activity bar, in characters
const BAR_WIDTH: usize = 30;

/// Compute metrics for the stored history (or a JSON export) and print them
///
/// The computation goes through the same debounced binding a UI would use,
/// so a failed computation surfaces as an error here rather than a partial
/// record.
pub async fn run_metrics(
    config: &Config,
    input: Option<PathBuf>,
    json: bool,
    days: Option<usize>,
) -> Result<()> {
    let snapshot = match &input {
        Some(path) => {
            tracing::info!("Reading sessions from {}", path.display());
            Snapshot::new(storage::read_export(path)?)
        }
        None => config.open_storage()?.snapshot()?,
    };
    tracing::debug!(sessions = snapshot.len(), "Loaded snapshot");

    let binding = config.binding()?;
    binding.update(snapshot);
    let metrics = binding
        .wait_ready()
        .await
        .ok_or_else(|| {
            ChatlensError::Metrics("computation failed, see the log for details".to_string())
        })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    if metrics.total_sessions == 0 {
        println!("{}", "No chat history found.".yellow());
        return Ok(());
    }

    println!("\nEngagement Metrics:");
    summary_table(&metrics).printstd();

    if !metrics.messages_over_time.is_empty() {
        println!("\nMessages per Day:");
        activity_table(&metrics, days.unwrap_or(config.display.max_days)).printstd();
    }
    println!();

    Ok(())
}

/// Table of the scalar metrics
pub fn summary_table(metrics: &Metrics) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row!["Metric".bold(), "Value".bold()]);
    table.add_row(prettytable::row!["Total messages", metrics.total_messages]);
    table.add_row(prettytable::row!["Total sessions", metrics.total_sessions]);
    table.add_row(prettytable::row![
        "Avg messages / session",
        format!("{:.1}", metrics.avg_messages_per_session)
    ]);
    table.add_row(prettytable::row![
        "Avg session duration",
        format!("{:.1} min", metrics.avg_session_duration)
    ]);
    table.add_row(prettytable::row![
        "Avg words / message",
        metrics.avg_word_count
    ]);
    table.add_row(prettytable::row![
        "Avg words / response",
        metrics.avg_response_length
    ]);
    table.add_row(prettytable::row![
        "Most active hour",
        format!("{:02}:00", metrics.most_active_hour).cyan()
    ]);
    table.add_row(prettytable::row![
        "Most active day",
        metrics.most_active_day.cyan()
    ]);

    table
}

/// Table of the most recent `days` entries of the per-day counts, oldest first
pub fn activity_table(metrics: &Metrics, days: usize) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row!["Date".bold(), "Messages".bold(), ""]);

    let series = &metrics.messages_over_time;
    let recent = &series[series.len().saturating_sub(days)..];
    let peak = recent.iter().map(|d| d.count).max().unwrap_or(0);

    for day in recent {
        table.add_row(prettytable::row![
            day.date,
            day.count,
            activity_bar(day.count, peak).green()
        ]);
    }

    table
}

/// Bar proportional to `count / peak`; any non-zero count gets at least one block
pub fn activity_bar(count: usize, peak: usize) -> String {
    if peak == 0 || count == 0 {
        return String::new();
    }
    let width = (count * BAR_WIDTH / peak).max(1);
    "█".repeat(width)
}
