use anyhow::Result;
use colored::Colorize;
use gamesim_engine::{RunStatus, Trial, TrialRow, TrialStats};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Completed => "completed",
        RunStatus::TimeLimitExceeded => "time limit",
        RunStatus::Cancelled => "cancelled",
        RunStatus::Running => "running",
        RunStatus::Idle => "idle",
    }
}

fn side_sequence(trial: &Trial) -> String {
    trial
        .scoring_events()
        .map(|event| event.side_number.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    trials: &[Trial],
    stats: &TrialStats,
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Simulation Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "=============================".cyan())?;

    writeln!(writer, "Trials: {}", stats.trials)?;
    writeln!(writer, "Mean score: {:.2}", stats.mean_score)?;
    writeln!(writer, "Best score: {}", stats.best_score.to_string().green())?;
    writeln!(writer, "Mean duration: {:.0}ms", stats.mean_duration_ms)?;
    writeln!(writer, "Mean errors: {:.2}", stats.mean_errors)?;
    writeln!(
        writer,
        "Completion rate: {:.1}%",
        stats.completion_rate * 100.0
    )?;
    writeln!(writer, "Wall time: {total_duration:?}")?;
    writeln!(writer)?;

    for trial in trials {
        let status = if trial.completed() {
            "✅ DONE".green()
        } else {
            "⏱ CUT".yellow()
        };
        writeln!(
            writer,
            "{} Trial {} (seed {})",
            status,
            trial.trial_number.to_string().bold(),
            trial.seed
        )?;
        writeln!(
            writer,
            "   Score: {}  Unique sides: {}  Errors: {}  Duration: {}ms",
            trial.score, trial.unique_hits, trial.error_count, trial.total_duration_ms
        )?;
        writeln!(
            writer,
            "   Events: {} ({})",
            trial.scoring_events().count(),
            status_label(trial.termination)
        )?;
        writeln!(writer, "   Sides: {}", side_sequence(trial))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    stats: &'a TrialStats,
    trials: &'a [Trial],
}

pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    trials: &[Trial],
    stats: &TrialStats,
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(&JsonReport { stats, trials })?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    trials: &[Trial],
    stats: &TrialStats,
) -> Result<()> {
    writeln!(writer, "# Strategy Simulator Results\n")?;

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Trials**: {}", stats.trials)?;
    writeln!(writer, "- **Mean score**: {:.2}", stats.mean_score)?;
    writeln!(writer, "- **Best score**: {}", stats.best_score)?;
    writeln!(writer, "- **Mean duration**: {:.0}ms", stats.mean_duration_ms)?;
    writeln!(writer, "- **Mean errors**: {:.2}", stats.mean_errors)?;
    writeln!(
        writer,
        "- **Completion rate**: {:.1}%\n",
        stats.completion_rate * 100.0
    )?;

    writeln!(writer, "## Trials\n")?;
    writeln!(
        writer,
        "| Trial | Seed | Score | Unique | Errors | Duration (ms) | Outcome |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|---|")?;
    for trial in trials {
        writeln!(
            writer,
            "| {} | {} | {} | {} | {} | {} | {} |",
            trial.trial_number,
            trial.seed,
            trial.score,
            trial.unique_hits,
            trial.error_count,
            trial.total_duration_ms,
            status_label(trial.termination)
        )?;
    }
    Ok(())
}

/// Write export rows as CSV; headers come from the row's field names.
pub fn generate_csv_report<W: Write>(writer: &mut W, rows: &[TrialRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
