//! Monte Carlo ensemble over sampled structural parameters.
//!
//! All parameter realizations are drawn up front, then each index is
//! integrated independently on a dedicated rayon pool. Results are keyed by
//! index, so the ensemble does not depend on worker count or scheduling.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SdofError};
use crate::excitation::ExcitationSource;
use crate::integrator::{run_with_settings, IntegratorSettings, RunOutcome};
use crate::params::ParameterRealization;
use crate::sampler::{derive_seed, BetaBounds};
use crate::state::{Channel, ResponseHistory};

pub const DEFAULT_NUM_SIM: usize = 6000;
pub const DEFAULT_SEED: u64 = 2026;

const STIFFNESS_SALT: u64 = 0;
const MASS_SALT: u64 = 1;
const DAMPING_SALT: u64 = 2;
const MODULUS_SALT: u64 = 3;
const AREA_SALT: u64 = 4;
const LENGTH_SALT: u64 = 5;

/// How the stiffness of each realization is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StiffnessModel {
    /// Axial spring, k = E A / L with each factor sampled.
    Spring {
        modulus: BetaBounds,
        area: BetaBounds,
        length: BetaBounds,
    },
    /// Stiffness sampled directly [N/m].
    Direct(BetaBounds),
}

impl Default for StiffnessModel {
    fn default() -> Self {
        StiffnessModel::Spring {
            modulus: BetaBounds::new(2.0e3, 2.1e3, 1.0, 2.0),
            area: BetaBounds::new(0.01, 0.012, 1.0, 2.0),
            length: BetaBounds::new(9.9, 10.1, 2.0, 1.0),
        }
    }
}

impl StiffnessModel {
    pub fn validate(&self) -> Result<()> {
        match self {
            StiffnessModel::Direct(bounds) => bounds.validate(),
            StiffnessModel::Spring {
                modulus,
                area,
                length,
            } => {
                modulus.validate()?;
                area.validate()?;
                length.validate()
            }
        }
    }

    fn sample(&self, count: usize, seed: u64) -> Result<Vec<f64>> {
        match self {
            StiffnessModel::Direct(bounds) => {
                bounds.sample(count, derive_seed(seed, STIFFNESS_SALT))
            }
            StiffnessModel::Spring {
                modulus,
                area,
                length,
            } => {
                let e = modulus.sample(count, derive_seed(seed, MODULUS_SALT))?;
                let a = area.sample(count, derive_seed(seed, AREA_SALT))?;
                let l = length.sample(count, derive_seed(seed, LENGTH_SALT))?;
                Ok(e.iter()
                    .zip(&a)
                    .zip(&l)
                    .map(|((e, a), l)| e * a / l)
                    .collect())
            }
        }
    }
}

/// Distributions of the three structural parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterDistributions {
    pub stiffness: StiffnessModel,
    pub mass: BetaBounds,
    pub damping_ratio: BetaBounds,
}

impl Default for ParameterDistributions {
    fn default() -> Self {
        Self {
            stiffness: StiffnessModel::default(),
            mass: BetaBounds::new(1500.0, 1700.0, 2.0, 1.0),
            damping_ratio: BetaBounds::new(0.01, 0.03, 1.0, 1.0),
        }
    }
}

impl ParameterDistributions {
    pub fn validate(&self) -> Result<()> {
        self.stiffness.validate()?;
        self.mass.validate()?;
        self.damping_ratio.validate()
    }

    /// Draw `count` index-aligned realizations. Every parameter uses its own
    /// stream derived from `seed`.
    ///
    /// The outer error rejects the distributions themselves; an inner error
    /// marks a single draw that is not a valid structure (e.g. k <= 0).
    pub fn draw(
        &self,
        count: usize,
        seed: u64,
    ) -> Result<Vec<Result<ParameterRealization>>> {
        let stiffness = self.stiffness.sample(count, seed)?;
        let mass = self.mass.sample(count, derive_seed(seed, MASS_SALT))?;
        let damping = self
            .damping_ratio
            .sample(count, derive_seed(seed, DAMPING_SALT))?;

        Ok(stiffness
            .into_iter()
            .zip(mass)
            .zip(damping)
            .map(|((k, m), zeta)| ParameterRealization::new(k, m, zeta))
            .collect())
    }
}

/// What the ensemble does with a realization that fails with a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the ensemble and return the error.
    #[default]
    Abort,
    /// Record the realization as skipped and keep going.
    SkipAndContinue,
}

/// Cooperative stop signal shared between the caller and the workers.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleConfig {
    pub num_realizations: usize,
    pub seed: u64,
    pub distributions: ParameterDistributions,
    pub settings: IntegratorSettings,
    /// Worker threads; 0 uses every available core.
    pub workers: usize,
    pub error_policy: ErrorPolicy,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            num_realizations: DEFAULT_NUM_SIM,
            seed: DEFAULT_SEED,
            distributions: ParameterDistributions::default(),
            settings: IntegratorSettings::default(),
            workers: 0,
            error_policy: ErrorPolicy::Abort,
        }
    }
}

impl EnsembleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_realizations == 0 {
            return Err(SdofError::parameter("ensemble needs at least one realization"));
        }
        self.distributions.validate()?;
        self.settings.validate()
    }
}

/// Peak response of one realization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtremeStatistics {
    pub max_abs_displacement: f64,
    pub max_abs_velocity: f64,
    pub max_abs_acceleration: f64,
    pub max_abs_base_reaction: f64,
    /// Maxima cover only the converged prefix when set.
    pub convergence_failed: bool,
    pub stiffness: f64,
    pub mass: f64,
    pub damping_ratio: f64,
    pub steps: usize,
    pub end_time: f64,
}

impl ExtremeStatistics {
    pub fn from_outcome(params: &ParameterRealization, outcome: &RunOutcome) -> Self {
        let history = &outcome.history;
        Self {
            max_abs_displacement: history.peak_abs(Channel::Displacement),
            max_abs_velocity: history.peak_abs(Channel::Velocity),
            max_abs_acceleration: history.peak_abs(Channel::Acceleration),
            max_abs_base_reaction: history.peak_abs(Channel::BaseReaction),
            convergence_failed: outcome.convergence_failed,
            stiffness: params.stiffness(),
            mass: params.mass(),
            damping_ratio: params.damping_ratio(),
            steps: history.len(),
            end_time: history.end_time(),
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Displacement => self.max_abs_displacement,
            Metric::Velocity => self.max_abs_velocity,
            Metric::Acceleration => self.max_abs_acceleration,
            Metric::BaseReaction => self.max_abs_base_reaction,
        }
    }
}

/// Selects one of the peak quantities of [`ExtremeStatistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Displacement,
    Velocity,
    Acceleration,
    BaseReaction,
}

#[derive(Debug, Clone, Default)]
pub struct EnsembleReport {
    pub entries: BTreeMap<usize, ExtremeStatistics>,
    pub convergence_failures: usize,
    /// Realizations never started because the run was cancelled.
    pub not_run: usize,
    /// Realizations dropped under [`ErrorPolicy::SkipAndContinue`], with the
    /// error message.
    pub skipped: BTreeMap<usize, String>,
    /// Full history of the last realization index, when it ran.
    pub representative: Option<(usize, ResponseHistory)>,
    pub requested: usize,
    /// Valid parameter draws by index; invalid draws appear in `skipped`.
    pub parameters: BTreeMap<usize, ParameterRealization>,
}

impl EnsembleReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every realization ran and none was skipped.
    pub fn is_complete(&self) -> bool {
        self.not_run == 0 && self.skipped.is_empty()
    }

    /// Values of `metric` over converged realizations, in index order.
    pub fn converged_values(&self, metric: Metric) -> Vec<f64> {
        self.entries
            .values()
            .filter(|entry| !entry.convergence_failed)
            .map(|entry| entry.metric(metric))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricSummary {
    /// Population statistics; `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleSummary {
    pub requested: usize,
    pub completed: usize,
    pub converged: usize,
    pub convergence_failures: usize,
    pub not_run: usize,
    pub skipped: usize,
    pub max_abs_displacement: Option<MetricSummary>,
    pub max_abs_velocity: Option<MetricSummary>,
    pub max_abs_acceleration: Option<MetricSummary>,
    pub max_abs_base_reaction: Option<MetricSummary>,
}

/// Statistics over converged entries only.
pub fn summarize(report: &EnsembleReport) -> EnsembleSummary {
    let stats = |metric| MetricSummary::from_values(&report.converged_values(metric));
    EnsembleSummary {
        requested: report.requested,
        completed: report.entries.len(),
        converged: report.entries.len() - report.convergence_failures,
        convergence_failures: report.convergence_failures,
        not_run: report.not_run,
        skipped: report.skipped.len(),
        max_abs_displacement: stats(Metric::Displacement),
        max_abs_velocity: stats(Metric::Velocity),
        max_abs_acceleration: stats(Metric::Acceleration),
        max_abs_base_reaction: stats(Metric::BaseReaction),
    }
}

enum Slot {
    Done(ExtremeStatistics, Option<ResponseHistory>),
    Failed(SdofError),
    NotRun,
}

/// Run one realization: fetch its excitation and integrate a fresh model.
pub fn run_realization(
    index: usize,
    params: &ParameterRealization,
    excitation: &ExcitationSource,
    settings: &IntegratorSettings,
) -> Result<RunOutcome> {
    let record = excitation.record_for(index, settings.dt)?;
    run_with_settings(params, &record, settings)
}

/// Run the whole ensemble.
///
/// With [`ErrorPolicy::Abort`] a fatal error, including an invalid parameter
/// draw, stops the remaining workers and the error of the lowest failing
/// index is returned. Convergence failures
/// never abort; they are recorded and counted. Cancelling `cancel` leaves
/// collected entries intact and counts the rest as not run.
pub fn run_ensemble(
    config: &EnsembleConfig,
    excitation: &ExcitationSource,
    cancel: &CancellationToken,
) -> Result<EnsembleReport> {
    config.validate()?;
    let draws = config
        .distributions
        .draw(config.num_realizations, config.seed)?;
    let parameters: BTreeMap<usize, ParameterRealization> = draws
        .iter()
        .enumerate()
        .filter_map(|(index, draw)| draw.as_ref().ok().map(|p| (index, *p)))
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("sdof-worker-{i}"))
        .build()
        .map_err(|e| SdofError::InvalidConfig(format!("cannot build worker pool: {e}")))?;

    tracing::info!(
        realizations = config.num_realizations,
        workers = pool.current_num_threads(),
        seed = config.seed,
        "starting ensemble"
    );
    let started = Instant::now();

    let last = draws.len() - 1;
    let abort = AtomicBool::new(false);
    let settings = &config.settings;
    let policy = config.error_policy;

    let slots: Vec<Slot> = pool.install(|| {
        draws
            .into_par_iter()
            .enumerate()
            .map(|(index, draw)| {
                if cancel.is_cancelled() || abort.load(Ordering::Relaxed) {
                    return Slot::NotRun;
                }
                let run = draw.and_then(|params| {
                    run_realization(index, &params, excitation, settings).map(|o| (params, o))
                });
                match run {
                    Ok((params, outcome)) => {
                        let stats = ExtremeStatistics::from_outcome(&params, &outcome);
                        tracing::debug!(
                            index,
                            stiffness = params.stiffness(),
                            mass = params.mass(),
                            damping_ratio = params.damping_ratio(),
                            steps = stats.steps,
                            convergence_failed = stats.convergence_failed,
                            "realization finished"
                        );
                        let history = (index == last).then_some(outcome.history);
                        Slot::Done(stats, history)
                    }
                    Err(err) => {
                        if err.is_fatal() && policy == ErrorPolicy::Abort {
                            abort.store(true, Ordering::Relaxed);
                        }
                        Slot::Failed(err)
                    }
                }
            })
            .collect()
    });

    let mut report = EnsembleReport {
        requested: config.num_realizations,
        ..EnsembleReport::default()
    };
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Slot::Done(stats, history) => {
                if stats.convergence_failed {
                    report.convergence_failures += 1;
                    tracing::warn!(
                        index,
                        end_time = stats.end_time,
                        "realization stopped early on convergence failure"
                    );
                }
                if let Some(history) = history {
                    report.representative = Some((index, history));
                }
                report.entries.insert(index, stats);
            }
            Slot::Failed(err) => match policy {
                ErrorPolicy::Abort => {
                    tracing::error!(index, error = %err, "ensemble aborted");
                    return Err(err);
                }
                ErrorPolicy::SkipAndContinue => {
                    tracing::warn!(index, error = %err, "realization skipped");
                    report.skipped.insert(index, err.to_string());
                }
            },
            Slot::NotRun => report.not_run += 1,
        }
    }
    report.parameters = parameters;

    tracing::info!(
        completed = report.entries.len(),
        convergence_failures = report.convergence_failures,
        skipped = report.skipped.len(),
        not_run = report.not_run,
        elapsed_s = started.elapsed().as_secs_f64(),
        "ensemble finished"
    );
    Ok(report)
}
