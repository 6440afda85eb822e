//! TOML analysis configuration.
//!
//! Every key is optional; missing keys take the defaults of the seismic
//! reference case (6000 realizations, 15 s at dt = 0.01, spring stiffness
//! k = E A / L).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SdofError};
use crate::excitation::{ExcitationRecord, ExcitationSource, GroundMotionSource, SyntheticWave};
use crate::integrator::{ConvergenceTest, IntegratorSettings, NewmarkConfig};
use crate::monte_carlo::{
    EnsembleConfig, ErrorPolicy, ParameterDistributions, StiffnessModel, DEFAULT_NUM_SIM,
    DEFAULT_SEED,
};
use crate::sampler::BetaBounds;

/// Excitation section, selected by `mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExcitationConfig {
    None,
    /// Single force pulse at t = 0.
    Impulse { magnitude: f64 },
    GroundMotion(GroundMotionSource),
    Synthetic(SyntheticWave),
}

impl Default for ExcitationConfig {
    fn default() -> Self {
        ExcitationConfig::Synthetic(SyntheticWave::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub num_sim: usize,
    pub seed: u64,
    pub duration: f64,
    pub dt: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub convergence_test: ConvergenceTest,
    pub workers: usize,
    pub error_policy: ErrorPolicy,
    pub initial_displacement: f64,
    pub initial_velocity: f64,
    pub output_dir: PathBuf,
    pub stiffness: StiffnessModel,
    pub mass: BetaBounds,
    pub damping_ratio: BetaBounds,
    pub excitation: ExcitationConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let settings = IntegratorSettings::default();
        let distributions = ParameterDistributions::default();
        Self {
            num_sim: DEFAULT_NUM_SIM,
            seed: DEFAULT_SEED,
            duration: settings.duration,
            dt: settings.dt,
            tolerance: settings.tolerance,
            max_iterations: settings.max_iterations,
            convergence_test: settings.test,
            workers: 0,
            error_policy: ErrorPolicy::default(),
            initial_displacement: settings.initial_displacement,
            initial_velocity: settings.initial_velocity,
            output_dir: PathBuf::from("output"),
            stiffness: distributions.stiffness,
            mass: distributions.mass,
            damping_ratio: distributions.damping_ratio,
            excitation: ExcitationConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: AnalysisConfig = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| SdofError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_sim == 0 {
            return invalid("num_sim must be > 0");
        }
        self.ensemble_config()
            .validate()
            .map_err(|e| SdofError::InvalidConfig(e.to_string()))?;

        match &self.excitation {
            ExcitationConfig::None => {}
            ExcitationConfig::Impulse { magnitude } => {
                if !magnitude.is_finite() {
                    return invalid("impulse magnitude must be finite");
                }
            }
            ExcitationConfig::GroundMotion(source) => {
                if !(source.record_dt.is_finite() && source.record_dt > 0.0) {
                    return invalid("excitation.record_dt must be > 0");
                }
                if !source.scale_factor.is_finite() {
                    return invalid("excitation.scale_factor must be finite");
                }
                if !source.file_pattern.contains("{index}") {
                    return invalid("excitation.file_pattern must contain {index}");
                }
            }
            ExcitationConfig::Synthetic(wave) => {
                wave.generate(self.dt)
                    .map_err(|e| SdofError::InvalidConfig(e.to_string()))?;
            }
        }
        Ok(())
    }

    pub fn integrator_settings(&self) -> IntegratorSettings {
        IntegratorSettings {
            dt: self.dt,
            duration: self.duration,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            test: self.convergence_test,
            newmark: NewmarkConfig::average_acceleration(),
            initial_displacement: self.initial_displacement,
            initial_velocity: self.initial_velocity,
        }
    }

    pub fn ensemble_config(&self) -> EnsembleConfig {
        EnsembleConfig {
            num_realizations: self.num_sim,
            seed: self.seed,
            distributions: ParameterDistributions {
                stiffness: self.stiffness,
                mass: self.mass,
                damping_ratio: self.damping_ratio,
            },
            settings: self.integrator_settings(),
            workers: self.workers,
            error_policy: self.error_policy,
        }
    }

    pub fn excitation_source(&self) -> Result<ExcitationSource> {
        Ok(match &self.excitation {
            ExcitationConfig::None => ExcitationSource::None,
            ExcitationConfig::Impulse { magnitude } => ExcitationSource::Explicit(Arc::new(
                ExcitationRecord::impulse(self.dt, *magnitude)?,
            )),
            ExcitationConfig::GroundMotion(source) => ExcitationSource::GroundMotion(source.clone()),
            ExcitationConfig::Synthetic(wave) => ExcitationSource::Synthetic(*wave),
        })
    }
}

fn invalid(message: &str) -> Result<()> {
    Err(SdofError::InvalidConfig(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excitation::WaveType;

    #[test]
    fn empty_document_yields_reference_defaults() {
        let cfg = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
        assert_eq!(cfg.num_sim, 6000);
        assert_eq!(cfg.dt, 0.01);
        assert_eq!(cfg.duration, 15.0);
        assert_eq!(cfg.tolerance, 1.0e-10);
    }

    #[test]
    fn parses_direct_stiffness_and_ground_motion() {
        let cfg = AnalysisConfig::from_toml_str(
            r#"
            num_sim = 10
            seed = 5
            error_policy = "skip_and_continue"
            convergence_test = "force_residual"

            [stiffness]
            min = 2.0
            max = 2.6
            alpha = 1.0
            beta = 2.0

            [excitation]
            mode = "ground_motion"
            directory = "records"
            record_dt = 0.01
            "#,
        )
        .unwrap();

        assert_eq!(cfg.stiffness, StiffnessModel::Direct(BetaBounds::new(2.0, 2.6, 1.0, 2.0)));
        assert_eq!(cfg.error_policy, ErrorPolicy::SkipAndContinue);
        assert_eq!(cfg.convergence_test, ConvergenceTest::ForceResidual);
        match cfg.excitation {
            ExcitationConfig::GroundMotion(source) => {
                assert_eq!(source.directory, PathBuf::from("records"));
                assert_eq!(source.file_pattern, "Ground_Acceleration_{index}.txt");
                assert_eq!(source.scale_factor, 9.81);
            }
            other => panic!("unexpected excitation {other:?}"),
        }
    }

    #[test]
    fn synthetic_section_accepts_partial_keys_and_aliases() {
        let cfg = AnalysisConfig::from_toml_str(
            r#"
            [excitation]
            mode = "synthetic"
            wave_type = "sin"
            amplitude = 500.0
            "#,
        )
        .unwrap();
        let ExcitationConfig::Synthetic(wave) = cfg.excitation else {
            panic!("expected synthetic excitation");
        };
        assert_eq!(wave.wave_type, WaveType::Sine);
        assert_eq!(wave.amplitude, 500.0);
        assert_eq!(wave.impact_duration, 2.0);
    }

    #[test]
    fn toml_round_trip_preserves_config() {
        let mut cfg = AnalysisConfig::default();
        cfg.excitation = ExcitationConfig::Impulse { magnitude: 1.0 };
        cfg.num_sim = 10;
        let raw = cfg.to_toml_string().unwrap();
        assert_eq!(AnalysisConfig::from_toml_str(&raw).unwrap(), cfg);
    }

    #[test]
    fn validation_errors_are_invalid_config() {
        for raw in [
            "num_sim = 0",
            "dt = -0.01",
            "tolerance = 0.0",
            "[mass]\nmin = 10.0\nmax = 1.0\nalpha = 1.0\nbeta = 1.0",
            "[excitation]\nmode = \"ground_motion\"\ndirectory = \"x\"\nrecord_dt = 0.0",
            "[excitation]\nmode = \"synthetic\"\nimpact_duration = -1.0",
        ] {
            let err = AnalysisConfig::from_toml_str(raw).unwrap_err();
            assert!(matches!(err, SdofError::InvalidConfig(_)), "{raw}: {err}");
        }
    }

    #[test]
    fn unknown_waveform_and_keys_fail_to_parse() {
        let err = AnalysisConfig::from_toml_str(
            "[excitation]\nmode = \"synthetic\"\nwave_type = \"sawtooth\"",
        )
        .unwrap_err();
        assert!(matches!(err, SdofError::Toml(_)));
        assert!(AnalysisConfig::from_toml_str("nsim = 3").is_err());
    }
}
