//! Excitation records and the sources that produce them.
//!
//! A record is a fixed-step series starting at t = 0. Ground-motion records
//! are read from one text file per realization; synthetic records are
//! closed-form impact pressure waveforms. Time past the end of a record is
//! treated as zero excitation.

use std::f64::consts::PI;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SdofError};

/// Standard gravity, used to convert records given in g to m/s^2.
pub const GRAVITY: f64 = 9.81;

/// Default record file name; `{index}` is the 1-based realization index.
pub const DEFAULT_FILE_PATTERN: &str = "Ground_Acceleration_{index}.txt";

/// Largest number of steps a record or a run may span.
pub const MAX_STEPS: usize = 10_000_000;

const STEP_RELATIVE_TOLERANCE: f64 = 1.0e-9;

/// How record samples enter the equation of motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcitationKind {
    /// Base acceleration [m/s^2]; applied as the effective force -m * a_g.
    GroundAcceleration,
    /// Force on the mass [N].
    AppliedForce,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcitationRecord {
    dt: f64,
    values: Vec<f64>,
    kind: ExcitationKind,
}

impl ExcitationRecord {
    pub fn from_samples(dt: f64, values: Vec<f64>, kind: ExcitationKind) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SdofError::parameter(format!(
                "record step must be finite and > 0, got {dt}"
            )));
        }
        if values.is_empty() {
            return Err(SdofError::parameter("excitation record must hold at least one sample"));
        }
        Ok(Self { dt, values, kind })
    }

    /// Single force pulse of `magnitude` at t = 0, zero afterwards.
    pub fn impulse(dt: f64, magnitude: f64) -> Result<Self> {
        Self::from_samples(dt, vec![magnitude], ExcitationKind::AppliedForce)
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn kind(&self) -> ExcitationKind {
        self.kind
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Duration covered by the samples.
    pub fn duration(&self) -> f64 {
        self.values.len() as f64 * self.dt
    }

    /// Value at step `n` (time `n * dt`); zero past the end of the record.
    pub fn value_at_step(&self, n: usize) -> f64 {
        self.values.get(n).copied().unwrap_or(0.0)
    }

    /// Fails with [`SdofError::StepMismatch`] unless the record step equals
    /// the integrator step. Records are never resampled.
    pub fn ensure_step(&self, dt: f64) -> Result<()> {
        check_step(dt, self.dt)
    }
}

fn check_step(expected: f64, found: f64) -> Result<()> {
    let scale = expected.abs().max(found.abs());
    if (expected - found).abs() > STEP_RELATIVE_TOLERANCE * scale {
        return Err(SdofError::StepMismatch { expected, found });
    }
    Ok(())
}

/// Number of samples covering `[0, span)` at step `dt`.
///
/// Fails with a parameter error above [`MAX_STEPS`].
pub(crate) fn step_count(span: f64, dt: f64) -> Result<usize> {
    // Guard against 2.0 / 0.01 landing just above 200.
    let ratio = span / dt;
    let rounded = ratio.round();
    let count = if (ratio - rounded).abs() <= 1.0e-9 * rounded.max(1.0) {
        rounded
    } else {
        ratio.ceil()
    };
    if !(count.is_finite() && count <= MAX_STEPS as f64) {
        return Err(SdofError::parameter(format!(
            "{span} s at dt = {dt} needs {ratio:e} steps, limit is {MAX_STEPS}"
        )));
    }
    Ok(count as usize)
}

/// Closed-form impact waveforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WaveType {
    Sine,
    Cosine,
    SineCosine,
    Triangle,
    Square,
}

impl WaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaveType::Sine => "sine",
            WaveType::Cosine => "cosine",
            WaveType::SineCosine => "sine+cosine",
            WaveType::Triangle => "triangle",
            WaveType::Square => "square",
        }
    }

    /// Waveform value at time `t` for frequency `f` [Hz].
    pub fn evaluate(&self, amplitude: f64, frequency: f64, t: f64) -> f64 {
        match self {
            WaveType::Sine => amplitude * (2.0 * PI * frequency * t).sin(),
            WaveType::Cosine => amplitude * (2.0 * PI * frequency * t).cos(),
            WaveType::SineCosine => {
                amplitude * ((5.0 * PI * frequency * t).sin() + (2.0 * PI * frequency * t).cos())
            }
            WaveType::Triangle => {
                2.0 * amplitude * (2.0 * (t * frequency).rem_euclid(1.0) - 1.0).abs() - amplitude
            }
            // signum maps +0.0 to +1, so the wave never takes the value 0
            WaveType::Square => amplitude * (2.0 * PI * frequency * t).sin().signum(),
        }
    }
}

impl FromStr for WaveType {
    type Err = SdofError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(WaveType::Sine),
            "cosine" | "cos" => Ok(WaveType::Cosine),
            "sine+cosine" | "sin+cos" => Ok(WaveType::SineCosine),
            "triangle" => Ok(WaveType::Triangle),
            "square" => Ok(WaveType::Square),
            _ => Err(SdofError::UnsupportedWaveform(s.to_string())),
        }
    }
}

impl TryFrom<String> for WaveType {
    type Error = SdofError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<WaveType> for String {
    fn from(value: WaveType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for WaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a synthetic impact pressure waveform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticWave {
    pub wave_type: WaveType,
    pub amplitude: f64,
    pub frequency_factor: f64,
    pub impact_duration: f64,
}

impl Default for SyntheticWave {
    fn default() -> Self {
        Self {
            wave_type: WaveType::SineCosine,
            amplitude: 1.0e4,
            frequency_factor: 1.0,
            impact_duration: 2.0,
        }
    }
}

impl SyntheticWave {
    /// Sample the waveform on `[0, impact_duration)` at step `dt`.
    pub fn generate(&self, dt: f64) -> Result<ExcitationRecord> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SdofError::parameter(format!("dt must be finite and > 0, got {dt}")));
        }
        if !(self.impact_duration.is_finite() && self.impact_duration > 0.0) {
            return Err(SdofError::parameter(format!(
                "impact duration must be finite and > 0, got {}",
                self.impact_duration
            )));
        }
        if !self.amplitude.is_finite() || !self.frequency_factor.is_finite() {
            return Err(SdofError::parameter(
                "waveform amplitude and frequency factor must be finite",
            ));
        }

        let frequency = self.frequency_factor / self.impact_duration;
        let n = step_count(self.impact_duration, dt)?.max(1);
        let values = (0..n)
            .map(|i| {
                self.wave_type
                    .evaluate(self.amplitude, frequency, i as f64 * dt)
            })
            .collect();
        ExcitationRecord::from_samples(dt, values, ExcitationKind::AppliedForce)
    }
}

/// Convenience wrapper parsing the waveform tag first.
pub fn synthetic(
    wave_type: &str,
    amplitude: f64,
    frequency_factor: f64,
    impact_duration: f64,
    dt: f64,
) -> Result<ExcitationRecord> {
    SyntheticWave {
        wave_type: wave_type.parse()?,
        amplitude,
        frequency_factor,
        impact_duration,
    }
    .generate(dt)
}

/// Directory of per-realization ground acceleration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundMotionSource {
    pub directory: PathBuf,
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    /// Native step of the records unless a file declares `# dt = ...`.
    pub record_dt: f64,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
}

fn default_file_pattern() -> String {
    DEFAULT_FILE_PATTERN.to_string()
}

fn default_scale_factor() -> f64 {
    GRAVITY
}

impl GroundMotionSource {
    pub fn new(directory: impl Into<PathBuf>, record_dt: f64) -> Self {
        Self {
            directory: directory.into(),
            file_pattern: default_file_pattern(),
            record_dt,
            scale_factor: GRAVITY,
        }
    }

    /// Path of the record for 0-based realization `index`.
    pub fn record_path(&self, index: usize) -> PathBuf {
        self.directory
            .join(self.file_pattern.replace("{index}", &(index + 1).to_string()))
    }

    pub fn load(&self, index: usize, dt: f64) -> Result<ExcitationRecord> {
        let path = self.record_path(index);
        if !path.is_file() {
            return Err(SdofError::ExcitationNotFound { index, path });
        }
        let raw = fs::read_to_string(&path)?;
        let (declared_dt, samples) = parse_record(&path, &raw)?;

        let native_dt = declared_dt.unwrap_or(self.record_dt);
        check_step(dt, native_dt)?;

        let values = samples.into_iter().map(|v| v * self.scale_factor).collect();
        ExcitationRecord::from_samples(native_dt, values, ExcitationKind::GroundAcceleration)
    }
}

fn parse_record(path: &Path, raw: &str) -> Result<(Option<f64>, Vec<f64>)> {
    let mut declared_dt = None;
    let mut samples = Vec::new();

    for (line_no, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if let Some((key, value)) = comment.split_once('=') {
                if key.trim().eq_ignore_ascii_case("dt") {
                    let dt = value.trim().parse::<f64>().map_err(|e| {
                        SdofError::ExcitationParse {
                            path: path.to_path_buf(),
                            line: line_no + 1,
                            message: format!("bad dt header: {e}"),
                        }
                    })?;
                    declared_dt = Some(dt);
                }
            }
            continue;
        }
        for token in line.split_whitespace() {
            let value = token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SdofError::ExcitationParse {
                    path: path.to_path_buf(),
                    line: line_no + 1,
                    message: format!("'{token}' is not a finite number"),
                })?;
            samples.push(value);
        }
    }

    if samples.is_empty() {
        return Err(SdofError::ExcitationParse {
            path: path.to_path_buf(),
            line: 0,
            message: "record holds no samples".to_string(),
        });
    }
    Ok((declared_dt, samples))
}

/// Where each realization gets its excitation from.
#[derive(Debug, Clone)]
pub enum ExcitationSource {
    /// No external excitation; response driven by initial conditions only.
    None,
    /// Same in-memory record for every realization.
    Explicit(Arc<ExcitationRecord>),
    Synthetic(SyntheticWave),
    GroundMotion(GroundMotionSource),
}

impl ExcitationSource {
    /// Record for realization `index`, aligned to integrator step `dt`.
    pub fn record_for(&self, index: usize, dt: f64) -> Result<Arc<ExcitationRecord>> {
        match self {
            ExcitationSource::None => Ok(Arc::new(ExcitationRecord::from_samples(
                dt,
                vec![0.0],
                ExcitationKind::AppliedForce,
            )?)),
            ExcitationSource::Explicit(record) => {
                record.ensure_step(dt)?;
                Ok(Arc::clone(record))
            }
            ExcitationSource::Synthetic(wave) => Ok(Arc::new(wave.generate(dt)?)),
            ExcitationSource::GroundMotion(source) => Ok(Arc::new(source.load(index, dt)?)),
        }
    }
}
