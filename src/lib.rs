//! SDOF-MC - probabilistic dynamic response of a single-degree-of-freedom
//! structure.
//!
//! Stiffness, mass and damping ratio are drawn from bounded Beta
//! distributions, each realization is integrated in time with implicit
//! Newmark and Newton equilibrium iterations under ground motion or a
//! synthetic impact load, and the peak responses of the ensemble are
//! collected for statistics.

pub mod config;
pub mod error;
pub mod excitation;
pub mod integrator;
pub mod logging;
pub mod material;
pub mod monte_carlo;
pub mod output;
pub mod params;
pub mod sampler;
pub mod state;

// Re-export main types
pub use config::{AnalysisConfig, ExcitationConfig};
pub use error::{Result, SdofError};
pub use excitation::{
    synthetic, ExcitationKind, ExcitationRecord, ExcitationSource, GroundMotionSource,
    SyntheticWave, WaveType,
};
pub use integrator::{
    run, run_model, run_with_settings, ConvergenceTest, IntegratorSettings, NewmarkConfig,
    RunOutcome, SdofModel,
};
pub use material::{ForceLaw, LinearElastic, ResistingForce};
pub use monte_carlo::{
    run_ensemble, summarize, CancellationToken, EnsembleConfig, EnsembleReport, EnsembleSummary,
    ErrorPolicy, ExtremeStatistics, ParameterDistributions, StiffnessModel,
};
pub use params::ParameterRealization;
pub use sampler::{sample, BetaBounds};
pub use state::{Channel, ResponseHistory, ResponseState};
