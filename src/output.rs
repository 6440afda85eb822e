use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::Writer;
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::monte_carlo::{EnsembleReport, EnsembleSummary};
use crate::params::ParameterRealization;
use crate::state::{Channel, ResponseHistory};

pub const ENSEMBLE_CSV: &str = "ensemble.csv";
pub const SKIPPED_CSV: &str = "skipped.csv";
pub const HISTORY_CSV: &str = "representative_history.csv";
pub const PARAMETERS_CSV: &str = "parameters.csv";
pub const SUMMARY_JSON: &str = "summary.json";

/// Create `<root>/<UTC timestamp>`, suffixing a counter if it already exists.
pub fn create_timestamped_output_dir(root: &Path) -> Result<PathBuf> {
    fs::create_dir_all(root)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = root.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        output_dir = root.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn fmt_f64(value: f64) -> String {
    format!("{value:.10e}")
}

/// One row per completed realization, in index order.
pub fn write_ensemble_csv(path: &Path, report: &EnsembleReport) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "index",
        "stiffness",
        "mass",
        "damping_ratio",
        "max_abs_displacement",
        "max_abs_velocity",
        "max_abs_acceleration",
        "max_abs_base_reaction",
        "steps",
        "end_time",
        "convergence_failed",
    ])?;

    for (index, entry) in &report.entries {
        writer.write_record([
            index.to_string(),
            fmt_f64(entry.stiffness),
            fmt_f64(entry.mass),
            fmt_f64(entry.damping_ratio),
            fmt_f64(entry.max_abs_displacement),
            fmt_f64(entry.max_abs_velocity),
            fmt_f64(entry.max_abs_acceleration),
            fmt_f64(entry.max_abs_base_reaction),
            entry.steps.to_string(),
            fmt_f64(entry.end_time),
            entry.convergence_failed.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Index and error message of every skipped realization.
pub fn write_skipped_csv(path: &Path, report: &EnsembleReport) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["index", "error"])?;
    for (index, message) in &report.skipped {
        writer.write_record([index.to_string(), message.clone()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Time history with the running maxima of every channel.
pub fn write_history_csv(path: &Path, history: &ResponseHistory) -> Result<()> {
    let channels = [
        Channel::Displacement,
        Channel::Velocity,
        Channel::Acceleration,
        Channel::BaseReaction,
    ];
    let running: Vec<Vec<f64>> = channels
        .iter()
        .map(|&channel| history.running_max_abs(channel))
        .collect();

    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "time",
        "displacement",
        "velocity",
        "acceleration",
        "base_reaction",
        "max_abs_displacement",
        "max_abs_velocity",
        "max_abs_acceleration",
        "max_abs_base_reaction",
    ])?;

    for n in 0..history.len() {
        let mut row = vec![fmt_f64(history.time[n])];
        row.extend(channels.iter().map(|&c| fmt_f64(history.channel(c)[n])));
        row.extend(running.iter().map(|series| fmt_f64(series[n])));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Valid parameter draws, one row per realization index.
pub fn write_parameters_csv(
    path: &Path,
    parameters: &BTreeMap<usize, ParameterRealization>,
) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "index",
        "stiffness",
        "mass",
        "damping_ratio",
        "natural_period",
    ])?;
    for (index, p) in parameters {
        writer.write_record([
            index.to_string(),
            fmt_f64(p.stiffness()),
            fmt_f64(p.mass()),
            fmt_f64(p.damping_ratio()),
            fmt_f64(p.natural_period()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct RunSummary<'a> {
    config: &'a AnalysisConfig,
    summary: &'a EnsembleSummary,
    representative_index: Option<usize>,
    generated_at: String,
}

/// Configuration echo, ensemble summary and representative index as
/// pretty-printed JSON.
pub fn write_summary_json(
    path: &Path,
    config: &AnalysisConfig,
    report: &EnsembleReport,
    summary: &EnsembleSummary,
) -> Result<()> {
    let document = RunSummary {
        config,
        summary,
        representative_index: report.representative.as_ref().map(|(index, _)| *index),
        generated_at: Utc::now().to_rfc3339(),
    };
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

/// Write every artifact of a finished run into `dir`.
pub fn write_run(
    dir: &Path,
    config: &AnalysisConfig,
    report: &EnsembleReport,
    summary: &EnsembleSummary,
) -> Result<()> {
    write_ensemble_csv(&dir.join(ENSEMBLE_CSV), report)?;
    write_parameters_csv(&dir.join(PARAMETERS_CSV), &report.parameters)?;
    if !report.skipped.is_empty() {
        write_skipped_csv(&dir.join(SKIPPED_CSV), report)?;
    }
    if let Some((_, history)) = &report.representative {
        write_history_csv(&dir.join(HISTORY_CSV), history)?;
    }
    write_summary_json(&dir.join(SUMMARY_JSON), config, report, summary)?;
    tracing::info!(dir = %dir.display(), "outputs written");
    Ok(())
}
