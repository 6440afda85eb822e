//! Implicit Newmark integration of one SDOF model
//!
//! Solves `m a + c v + F_int(d) = F_ext(t)` step by step. Each step starts
//! from the last converged state, predicts `d = d_n`, and corrects the
//! displacement with Newton iterations on the dynamic residual until the
//! convergence test passes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SdofError};
use crate::excitation::{step_count, ExcitationKind, ExcitationRecord};
use crate::material::{LinearElastic, ResistingForce};
use crate::params::ParameterRealization;
use crate::state::{ResponseHistory, ResponseState};

/// Newmark integration constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewmarkConfig {
    pub gamma: f64,
    pub beta: f64,
}

impl NewmarkConfig {
    /// Average acceleration, gamma = 1/2, beta = 1/4. Unconditionally stable
    /// for linear systems.
    pub fn average_acceleration() -> Self {
        Self {
            gamma: 0.5,
            beta: 0.25,
        }
    }

    /// Linear acceleration, gamma = 1/2, beta = 1/6. Conditionally stable.
    pub fn linear_acceleration() -> Self {
        Self {
            gamma: 0.5,
            beta: 1.0 / 6.0,
        }
    }

    /// Both constants must be finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(SdofError::parameter("newmark gamma must be > 0"));
        }
        if !(self.beta.is_finite() && self.beta > 0.0) {
            return Err(SdofError::parameter("newmark beta must be > 0"));
        }
        Ok(())
    }
}

impl Default for NewmarkConfig {
    fn default() -> Self {
        Self::average_acceleration()
    }
}

/// Norm checked against the tolerance after each Newton update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceTest {
    /// |delta d| of the last Newton update [m]
    #[default]
    DisplacementIncrement,
    /// |R| of the dynamic residual relative to the summed magnitude of the
    /// forces entering it
    ForceResidual,
}

/// Step size, duration, convergence control and initial conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorSettings {
    pub dt: f64,
    pub duration: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub test: ConvergenceTest,
    pub newmark: NewmarkConfig,
    pub initial_displacement: f64,
    pub initial_velocity: f64,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            dt: 0.01,
            duration: 15.0,
            tolerance: 1.0e-10,
            max_iterations: 1000,
            test: ConvergenceTest::default(),
            newmark: NewmarkConfig::default(),
            initial_displacement: 0.0,
            initial_velocity: 0.0,
        }
    }
}

impl IntegratorSettings {
    /// Rejects non-positive step, duration or tolerance, a zero iteration
    /// cap, non-finite initial conditions and runs longer than
    /// [`MAX_STEPS`](crate::excitation::MAX_STEPS).
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SdofError::parameter(format!("dt must be finite and > 0, got {}", self.dt)));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(SdofError::parameter(format!(
                "duration must be finite and > 0, got {}",
                self.duration
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SdofError::parameter(format!(
                "tolerance must be finite and > 0, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(SdofError::parameter("max_iterations must be >= 1"));
        }
        if !self.initial_displacement.is_finite() || !self.initial_velocity.is_finite() {
            return Err(SdofError::parameter("initial conditions must be finite"));
        }
        self.newmark.validate()?;
        self.steps().map(|_| ())
    }

    /// Number of steps needed to reach `duration`.
    pub fn steps(&self) -> Result<usize> {
        step_count(self.duration, self.dt)
    }
}

/// Where and why a step failed to reach equilibrium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceFailure {
    /// 1-based index of the failed step
    pub step: usize,
    /// Target time of the failed step
    pub time: f64,
    pub iterations: usize,
    /// Last measured convergence norm (NaN when the state blew up)
    pub residual: f64,
}

impl From<ConvergenceFailure> for SdofError {
    fn from(f: ConvergenceFailure) -> Self {
        SdofError::ConvergenceFailure {
            step: f.step,
            time: f.time,
            iterations: f.iterations,
            residual: f.residual,
        }
    }
}

/// Result of one integrator run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub history: ResponseHistory,
    pub convergence_failed: bool,
    pub failure: Option<ConvergenceFailure>,
}

/// Single-degree-of-freedom model: lumped mass, viscous damper and a
/// resisting force element between the mass and a fixed base.
///
/// A model is built for one run and dropped afterwards.
#[derive(Debug, Clone)]
pub struct SdofModel<M> {
    mass: f64,
    damping: f64,
    material: M,
    newmark: NewmarkConfig,
    state: ResponseState,
    step: usize,
}

impl SdofModel<LinearElastic> {
    /// Linear elastic model for one parameter realization.
    pub fn linear(params: &ParameterRealization, newmark: NewmarkConfig) -> Self {
        Self {
            mass: params.mass(),
            damping: params.damping_coefficient(),
            material: LinearElastic::new(params.stiffness()),
            newmark,
            state: ResponseState::zero(),
            step: 0,
        }
    }
}

impl<M: ResistingForce> SdofModel<M> {
    /// Model at rest with an arbitrary resisting force law. `damping` is the
    /// viscous coefficient c [N s/m].
    pub fn new(mass: f64, damping: f64, material: M, newmark: NewmarkConfig) -> Result<Self> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SdofError::parameter(format!("mass must be finite and > 0, got {mass}")));
        }
        if !(damping.is_finite() && damping >= 0.0) {
            return Err(SdofError::parameter(format!(
                "damping coefficient must be finite and >= 0, got {damping}"
            )));
        }
        newmark.validate()?;
        Ok(Self {
            mass,
            damping,
            material,
            newmark,
            state: ResponseState::zero(),
            step: 0,
        })
    }

    /// Lumped mass [kg]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Last committed state
    pub fn state(&self) -> ResponseState {
        self.state
    }

    /// Force on the fixed support, -F_int(d).
    pub fn base_reaction(&self) -> f64 {
        -self.material.evaluate(self.state.displacement)
    }

    /// Set initial displacement and velocity and the acceleration that
    /// balances `external_force` at t = 0.
    pub fn initialize(
        &mut self,
        displacement: f64,
        velocity: f64,
        external_force: f64,
    ) -> std::result::Result<(), ConvergenceFailure> {
        let acceleration = (external_force
            - self.damping * velocity
            - self.material.evaluate(displacement))
            / self.mass;
        let state = ResponseState::new(displacement, velocity, acceleration);
        if !state.is_finite() {
            return Err(ConvergenceFailure {
                step: 0,
                time: 0.0,
                iterations: 0,
                residual: f64::NAN,
            });
        }
        self.state = state;
        self.step = 0;
        Ok(())
    }

    /// Advance one step of size `dt` under `external_force` at the end of the
    /// step. Returns the number of Newton iterations used.
    ///
    /// On failure the model keeps its last converged state.
    pub fn advance(
        &mut self,
        external_force: f64,
        dt: f64,
        test: ConvergenceTest,
        tolerance: f64,
        max_iterations: usize,
    ) -> std::result::Result<usize, ConvergenceFailure> {
        let target_step = self.step + 1;
        let fail = |iterations: usize, residual: f64| ConvergenceFailure {
            step: target_step,
            time: target_step as f64 * dt,
            iterations,
            residual,
        };

        let NewmarkConfig { gamma, beta } = self.newmark;
        let k_dynamic = gamma / (beta * dt) * self.damping + self.mass / (beta * dt * dt);

        let mut d = self.state.displacement;
        let (mut residual, mut scale) = self.residual(d, external_force, dt);

        if test == ConvergenceTest::ForceResidual && relative(residual, scale) < tolerance {
            return if self.commit(d, dt) {
                Ok(0)
            } else {
                Err(fail(0, f64::NAN))
            };
        }

        let mut norm = f64::NAN;
        for iteration in 1..=max_iterations {
            if !residual.is_finite() {
                return Err(fail(iteration - 1, f64::NAN));
            }
            let k_eff = self.material.tangent(d) + k_dynamic;
            if !(k_eff.is_finite() && k_eff > 0.0) {
                return Err(fail(iteration - 1, residual.abs()));
            }

            let increment = residual / k_eff;
            d += increment;
            (residual, scale) = self.residual(d, external_force, dt);

            norm = match test {
                ConvergenceTest::DisplacementIncrement => increment.abs(),
                ConvergenceTest::ForceResidual => relative(residual, scale),
            };
            if !d.is_finite() || !norm.is_finite() || !residual.is_finite() {
                return Err(fail(iteration, f64::NAN));
            }
            if norm < tolerance {
                return if self.commit(d, dt) {
                    Ok(iteration)
                } else {
                    Err(fail(iteration, f64::NAN))
                };
            }
        }

        Err(fail(max_iterations, norm))
    }

    /// Velocity and acceleration consistent with trial displacement `d`.
    fn kinematics(&self, d: f64, dt: f64) -> (f64, f64) {
        let NewmarkConfig { gamma, beta } = self.newmark;
        let prev = self.state;
        let acceleration = (d - prev.displacement) / (beta * dt * dt)
            - prev.velocity / (beta * dt)
            - (0.5 / beta - 1.0) * prev.acceleration;
        let velocity = prev.velocity + dt * ((1.0 - gamma) * prev.acceleration + gamma * acceleration);
        (velocity, acceleration)
    }

    /// Dynamic residual at `d` and the summed magnitude of the terms it is
    /// assembled from. Rounding in R is bounded by machine epsilon times the
    /// latter.
    fn residual(&self, d: f64, external_force: f64, dt: f64) -> (f64, f64) {
        let beta = self.newmark.beta;
        let prev = self.state;
        let (v, a) = self.kinematics(d, dt);
        let internal = self.material.evaluate(d);

        let residual = external_force - internal - self.damping * v - self.mass * a;
        let inertia = self.mass
            * ((d.abs() + prev.displacement.abs()) / (beta * dt * dt)
                + prev.velocity.abs() / (beta * dt)
                + ((0.5 / beta - 1.0) * prev.acceleration).abs());
        let scale = external_force.abs() + internal.abs() + (self.damping * v).abs() + inertia;
        (residual, scale)
    }

    /// Accept trial displacement `d`; false if the resulting state is not
    /// finite, in which case nothing changes.
    fn commit(&mut self, d: f64, dt: f64) -> bool {
        let (v, a) = self.kinematics(d, dt);
        let next = ResponseState::new(d, v, a);
        if !next.is_finite() {
            return false;
        }
        self.state = next;
        self.step += 1;
        true
    }
}

fn relative(residual: f64, scale: f64) -> f64 {
    if scale > 0.0 {
        residual.abs() / scale
    } else {
        residual.abs()
    }
}

/// Effective force on the mass at step `n`.
fn external_force(record: &ExcitationRecord, n: usize, mass: f64) -> f64 {
    let value = record.value_at_step(n);
    match record.kind() {
        ExcitationKind::AppliedForce => value,
        ExcitationKind::GroundAcceleration => -mass * value,
    }
}

/// Integrate a linear elastic realization with average-acceleration Newmark
/// and the displacement-increment test, starting from rest.
pub fn run(
    params: &ParameterRealization,
    excitation: &ExcitationRecord,
    dt: f64,
    duration: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<RunOutcome> {
    let settings = IntegratorSettings {
        dt,
        duration,
        tolerance,
        max_iterations,
        ..IntegratorSettings::default()
    };
    run_with_settings(params, excitation, &settings)
}

/// Integrate a linear elastic realization with explicit settings.
pub fn run_with_settings(
    params: &ParameterRealization,
    excitation: &ExcitationRecord,
    settings: &IntegratorSettings,
) -> Result<RunOutcome> {
    run_model(SdofModel::linear(params, settings.newmark), excitation, settings)
}

/// Run `model` from t = 0 to `settings.duration`.
///
/// Invalid settings and a record whose step differs from `settings.dt` are
/// errors. A step that does not converge is not: the run stops at the last
/// converged time and the outcome is flagged.
pub fn run_model<M: ResistingForce>(
    mut model: SdofModel<M>,
    excitation: &ExcitationRecord,
    settings: &IntegratorSettings,
) -> Result<RunOutcome> {
    settings.validate()?;
    excitation.ensure_step(settings.dt)?;

    let steps = settings.steps()?;
    let mut history = ResponseHistory::with_capacity(steps + 1);

    let f0 = external_force(excitation, 0, model.mass());
    if let Err(failure) =
        model.initialize(settings.initial_displacement, settings.initial_velocity, f0)
    {
        return Ok(RunOutcome {
            history,
            convergence_failed: true,
            failure: Some(failure),
        });
    }
    history.push(0.0, model.state(), model.base_reaction());

    for n in 1..=steps {
        let force = external_force(excitation, n, model.mass());
        match model.advance(
            force,
            settings.dt,
            settings.test,
            settings.tolerance,
            settings.max_iterations,
        ) {
            Ok(_) => history.push(n as f64 * settings.dt, model.state(), model.base_reaction()),
            Err(failure) => {
                tracing::debug!(
                    step = failure.step,
                    time = failure.time,
                    iterations = failure.iterations,
                    "newton iteration did not converge"
                );
                return Ok(RunOutcome {
                    history,
                    convergence_failed: true,
                    failure: Some(failure),
                });
            }
        }
    }

    Ok(RunOutcome {
        history,
        convergence_failed: false,
        failure: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excitation::synthetic;
    use crate::material::ForceLaw;
    use crate::state::Channel;
    use std::f64::consts::TAU;

    fn free_vibration_settings(d0: f64, duration: f64, dt: f64) -> IntegratorSettings {
        IntegratorSettings {
            dt,
            duration,
            initial_displacement: d0,
            ..IntegratorSettings::default()
        }
    }

    #[test]
    fn undamped_free_vibration_follows_cosine() {
        // wn = 2 pi, period 1 s
        let params = ParameterRealization::new(TAU * TAU, 1.0, 0.0).unwrap();
        let d0 = 0.01;
        let settings = free_vibration_settings(d0, 3.0, 0.001);
        let none = ExcitationRecord::from_samples(0.001, vec![0.0], ExcitationKind::AppliedForce)
            .unwrap();

        let outcome = run_with_settings(&params, &none, &settings).unwrap();
        assert!(!outcome.convergence_failed);
        assert_eq!(outcome.history.len(), 3001);

        let wn = params.natural_frequency();
        for (t, d) in outcome.history.time.iter().zip(&outcome.history.displacement) {
            let exact = d0 * (wn * t).cos();
            assert!((d - exact).abs() < 1.0e-3 * d0, "t = {t}: {d} vs {exact}");
        }
    }

    #[test]
    fn history_starts_at_zero_and_reaches_duration() {
        let params = ParameterRealization::new(1.0e6, 1000.0, 0.05).unwrap();
        let record = ExcitationRecord::impulse(0.01, 1.0).unwrap();
        let outcome = run(&params, &record, 0.01, 1.0, 1.0e-10, 10).unwrap();

        let time = &outcome.history.time;
        assert_eq!(time[0], 0.0);
        assert!(time.windows(2).all(|w| w[1] > w[0]));
        assert!(outcome.history.end_time() >= 1.0 - 1e-12);
        assert_eq!(time.len(), outcome.history.base_reaction.len());
    }

    #[test]
    fn undamped_step_load_oscillates_about_static_deflection() {
        let (k, m, f0) = (4.0e4, 100.0, 200.0);
        let params = ParameterRealization::new(k, m, 0.0).unwrap();
        let dt = 0.001;
        let record =
            ExcitationRecord::from_samples(dt, vec![f0; 2001], ExcitationKind::AppliedForce)
                .unwrap();
        let outcome = run(&params, &record, dt, 2.0, 1.0e-12, 10).unwrap();

        let wn = params.natural_frequency();
        for (t, d) in outcome.history.time.iter().zip(&outcome.history.displacement) {
            let exact = f0 / k * (1.0 - (wn * t).cos());
            assert!((d - exact).abs() < 1.0e-3 * f0 / k * 2.0);
        }
    }

    #[test]
    fn damped_response_to_bounded_load_stays_bounded() {
        let params = ParameterRealization::new(1.0e6, 1000.0, 0.05).unwrap();
        let pulse = synthetic("sine+cosine", 1.0e4, 1.0, 2.0, 0.01).unwrap();
        let outcome = run(&params, &pulse, 0.01, 10.0, 1.0e-10, 10).unwrap();
        assert!(!outcome.convergence_failed);

        let h = &outcome.history;
        // peak force 2e4 over k with a resonant amplification of at most 1/(2 zeta)
        let bound = 2.0e4 / 1.0e6 * 10.0;
        assert!(h.peak_abs(Channel::Displacement) < bound);
        assert!(h.displacement.iter().all(|d| d.is_finite()));
        assert!(h.acceleration.iter().all(|a| a.is_finite()));

        // free decay after the pulse
        let tail = h.displacement[900..].iter().fold(0.0_f64, |m, d| m.max(d.abs()));
        let early = h.displacement[200..300].iter().fold(0.0_f64, |m, d| m.max(d.abs()));
        assert!(tail < early);
    }

    #[test]
    fn base_reaction_opposes_spring_force() {
        let params = ParameterRealization::new(5.0e3, 10.0, 0.02).unwrap();
        let record = ExcitationRecord::impulse(0.01, 50.0).unwrap();
        let outcome = run(&params, &record, 0.01, 1.0, 1.0e-10, 10).unwrap();
        let h = &outcome.history;
        for (d, r) in h.displacement.iter().zip(&h.base_reaction) {
            assert_eq!(*r, -5.0e3 * d);
        }
    }

    #[test]
    fn ground_acceleration_acts_as_inertial_force() {
        let params = ParameterRealization::new(1.0e4, 10.0, 0.02).unwrap();
        let dt = 0.01;
        let ag = vec![0.0, 1.0, 0.5, -0.3, 0.0];
        let ground =
            ExcitationRecord::from_samples(dt, ag.clone(), ExcitationKind::GroundAcceleration)
                .unwrap();
        let force = ExcitationRecord::from_samples(
            dt,
            ag.iter().map(|a| -10.0 * a).collect(),
            ExcitationKind::AppliedForce,
        )
        .unwrap();

        let a = run(&params, &ground, dt, 0.5, 1.0e-12, 10).unwrap();
        let b = run(&params, &force, dt, 0.5, 1.0e-12, 10).unwrap();
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn iteration_cap_flags_the_run_and_keeps_the_converged_prefix() {
        let stiffening = ForceLaw::new(|d: f64| 1.0e3 * d + 1.0e9 * d.powi(3), |d: f64| {
            1.0e3 + 3.0e9 * d * d
        });
        let model = SdofModel::new(1.0, 0.5, stiffening, NewmarkConfig::default()).unwrap();
        let record = ExcitationRecord::from_samples(0.01, vec![100.0; 50], ExcitationKind::AppliedForce)
            .unwrap();
        let settings = IntegratorSettings {
            dt: 0.01,
            duration: 0.5,
            tolerance: 1.0e-300,
            max_iterations: 1,
            ..IntegratorSettings::default()
        };

        let outcome = run_model(model, &record, &settings).unwrap();
        assert!(outcome.convergence_failed);
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.step, 1);
        assert_eq!(failure.iterations, 1);
        // only the initial state was committed
        assert_eq!(outcome.history.len(), 1);
    }

    #[test]
    fn blow_up_is_flagged_instead_of_returning_nan() {
        let brittle = ForceLaw::new(
            |d: f64| if d.abs() > 1.0e-3 { f64::NAN } else { 1.0e4 * d },
            |_d: f64| 1.0e4,
        );
        let model = SdofModel::new(1.0, 0.0, brittle, NewmarkConfig::default()).unwrap();
        let record = ExcitationRecord::from_samples(0.01, vec![100.0; 100], ExcitationKind::AppliedForce)
            .unwrap();
        let settings = IntegratorSettings {
            duration: 1.0,
            ..IntegratorSettings::default()
        };

        let outcome = run_model(model, &record, &settings).unwrap();
        assert!(outcome.convergence_failed);
        assert!(outcome.history.end_time() < 1.0);
        assert!(outcome.history.displacement.iter().all(|d| d.is_finite()));
        let err: SdofError = outcome.failure.unwrap().into();
        assert!(!err.is_fatal());
    }

    #[test]
    fn softening_tangent_that_kills_effective_stiffness_is_flagged() {
        let collapsing = ForceLaw::new(|d: f64| -1.0e9 * d, |_d: f64| -1.0e9);
        let model = SdofModel::new(1.0, 0.0, collapsing, NewmarkConfig::default()).unwrap();
        let record = ExcitationRecord::impulse(0.01, 1.0).unwrap();
        let outcome = run_model(model, &record, &IntegratorSettings::default()).unwrap();
        assert!(outcome.convergence_failed);
        assert_eq!(outcome.failure.unwrap().step, 1);
    }

    #[test]
    fn zero_stiffness_never_reaches_the_integrator() {
        let err = ParameterRealization::new(0.0, 1600.0, 0.02).unwrap_err();
        assert!(matches!(err, SdofError::Parameter(_)));
    }

    #[test]
    fn invalid_settings_and_step_mismatch_are_errors() {
        let params = ParameterRealization::new(1.0, 1.0, 0.0).unwrap();
        let record = ExcitationRecord::impulse(0.01, 1.0).unwrap();
        assert!(matches!(
            run(&params, &record, 0.01, 1.0, 0.0, 10),
            Err(SdofError::Parameter(_))
        ));
        assert!(matches!(
            run(&params, &record, 0.01, 1.0, 1e-10, 0),
            Err(SdofError::Parameter(_))
        ));
        assert!(matches!(
            run(&params, &record, 0.02, 1.0, 1e-10, 10),
            Err(SdofError::StepMismatch { .. })
        ));
    }

    #[test]
    fn force_residual_test_converges_for_linear_spring() {
        let params = ParameterRealization::new(1.0e4, 10.0, 0.05).unwrap();
        let record = ExcitationRecord::impulse(0.01, 10.0).unwrap();
        let settings = IntegratorSettings {
            duration: 1.0,
            tolerance: 1.0e-6,
            test: ConvergenceTest::ForceResidual,
            ..IntegratorSettings::default()
        };
        let outcome = run_with_settings(&params, &record, &settings).unwrap();
        assert!(!outcome.convergence_failed);
        assert_eq!(outcome.history.len(), 101);
    }

    #[test]
    fn force_residual_test_meets_default_tolerance_at_reference_scale() {
        let params = ParameterRealization::new(2.2, 1600.0, 0.02).unwrap();
        let none = ExcitationRecord::from_samples(0.01, vec![0.0], ExcitationKind::AppliedForce)
            .unwrap();
        let mut settings = IntegratorSettings {
            duration: 15.0,
            initial_displacement: 1.0,
            test: ConvergenceTest::ForceResidual,
            ..IntegratorSettings::default()
        };

        let by_force = run_with_settings(&params, &none, &settings).unwrap();
        assert!(!by_force.convergence_failed, "{:?}", by_force.failure);
        assert_eq!(by_force.history.len(), 1501);

        settings.test = ConvergenceTest::DisplacementIncrement;
        let by_increment = run_with_settings(&params, &none, &settings).unwrap();
        for (a, b) in by_force
            .history
            .displacement
            .iter()
            .zip(&by_increment.history.displacement)
        {
            assert!((a - b).abs() < 1.0e-9);
        }
    }

    #[test]
    fn oversized_run_is_rejected_before_allocating() {
        let params = ParameterRealization::new(1.0, 1.0, 0.0).unwrap();
        let record = ExcitationRecord::impulse(1.0e-300, 1.0).unwrap();
        let err = run(&params, &record, 1.0e-300, 1.0e300, 1.0e-10, 10).unwrap_err();
        assert!(matches!(err, SdofError::Parameter(_)));

        let settings = IntegratorSettings {
            duration: 1.0e6,
            dt: 1.0e-3,
            ..IntegratorSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
