use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sdof_mc::monte_carlo::{run_ensemble, summarize, CancellationToken};
use sdof_mc::{logging, output, AnalysisConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Monte Carlo dynamic response of a stochastic SDOF structure")]
struct Cli {
    /// TOML analysis configuration; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output base directory; a timestamped run directory is created inside
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of realizations
    #[arg(long)]
    num_sim: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Integration step in seconds
    #[arg(long)]
    dt: Option<f64>,

    /// Analysis duration in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Worker threads (0 = all cores)
    #[arg(long)]
    workers: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut cfg = match &cli.config {
        Some(path) => AnalysisConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(v) = cli.num_sim {
        cfg.num_sim = v;
    }
    if let Some(v) = cli.seed {
        cfg.seed = v;
    }
    if let Some(v) = cli.dt {
        cfg.dt = v;
    }
    if let Some(v) = cli.duration {
        cfg.duration = v;
    }
    if let Some(v) = cli.workers {
        cfg.workers = v;
    }
    if let Some(v) = cli.output {
        cfg.output_dir = v;
    }
    cfg.validate().context("invalid configuration")?;

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("interrupt received, finishing running realizations");
        handler_token.cancel();
    })
    .context("failed to install Ctrl-C handler")?;

    let excitation = cfg.excitation_source()?;
    let report = run_ensemble(&cfg.ensemble_config(), &excitation, &token)
        .context("ensemble run failed")?;
    let summary = summarize(&report);

    let run_dir = output::create_timestamped_output_dir(&cfg.output_dir)
        .context("failed to create output directory")?;
    output::write_run(&run_dir, &cfg, &report, &summary)?;

    println!(
        "Ensemble complete. Realizations: {} | converged: {} | convergence failures: {} | skipped: {} | not run: {}",
        summary.requested,
        summary.converged,
        summary.convergence_failures,
        summary.skipped,
        summary.not_run
    );
    if let Some(d) = summary.max_abs_displacement {
        println!(
            "max|d| mean/std/min/max: {:.4e} | {:.4e} | {:.4e} | {:.4e} m",
            d.mean, d.std_dev, d.min, d.max
        );
    }
    if let Some(r) = summary.max_abs_base_reaction {
        println!("max|R| mean: {:.4e} N", r.mean);
    }
    println!("Run directory: {}", run_dir.display());

    Ok(())
}
