//! Error taxonomy for sampling, excitation, integration and configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdofError {
    /// Invalid distribution bounds/shape or invalid structural parameters.
    #[error("invalid parameter: {0}")]
    Parameter(String),
    #[error("no excitation record for realization {index}: {}", path.display())]
    ExcitationNotFound { index: usize, path: PathBuf },
    #[error("excitation step mismatch: integrator uses dt = {expected}, record has dt = {found}")]
    StepMismatch { expected: f64, found: f64 },
    #[error("unsupported waveform '{0}' (expected sine, cosine, sine+cosine, triangle or square)")]
    UnsupportedWaveform(String),
    #[error("malformed excitation record {} at line {line}: {message}", path.display())]
    ExcitationParse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error(
        "equilibrium not reached at step {step} (t = {time}) after {iterations} iterations, residual {residual:e}"
    )]
    ConvergenceFailure {
        step: usize,
        time: f64,
        iterations: usize,
        residual: f64,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SdofError {
    /// Whether the error indicates misconfiguration rather than stochastic
    /// variability. Fatal errors abort an ensemble unless it is configured to
    /// skip failing realizations.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SdofError::ConvergenceFailure { .. })
    }

    pub(crate) fn parameter(message: impl Into<String>) -> Self {
        SdofError::Parameter(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SdofError>;

#[cfg(test)]
mod tests {
    use super::SdofError;

    #[test]
    fn convergence_failure_is_not_fatal() {
        let err = SdofError::ConvergenceFailure {
            step: 3,
            time: 0.03,
            iterations: 10,
            residual: 1.0,
        };
        assert!(!err.is_fatal());
        assert!(SdofError::UnsupportedWaveform("saw".into()).is_fatal());
        assert!(SdofError::StepMismatch {
            expected: 0.01,
            found: 0.02
        }
        .is_fatal());
    }

    #[test]
    fn messages_name_the_offending_value() {
        let msg = SdofError::UnsupportedWaveform("sawtooth".into()).to_string();
        assert!(msg.contains("sawtooth"));
    }
}
