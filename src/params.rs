//! Structural parameters
//!
//! One sampled set of stiffness, mass and damping ratio for a single
//! Monte Carlo realization.

use std::f64::consts::TAU;

use serde::Serialize;

use crate::error::{Result, SdofError};

/// Stiffness, mass and damping ratio of one SDOF realization
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterRealization {
    /// Lateral stiffness k [N/m]
    stiffness: f64,
    /// Mass m [kg]
    mass: f64,
    /// Damping ratio zeta [-]
    damping_ratio: f64,
}

impl ParameterRealization {
    /// Create a validated realization.
    ///
    /// Fails with [`SdofError::Parameter`] unless all values are finite,
    /// `stiffness > 0`, `mass > 0` and `damping_ratio >= 0`.
    pub fn new(stiffness: f64, mass: f64, damping_ratio: f64) -> Result<Self> {
        if !(stiffness.is_finite() && stiffness > 0.0) {
            return Err(SdofError::parameter(format!(
                "stiffness must be finite and > 0, got {stiffness}"
            )));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SdofError::parameter(format!(
                "mass must be finite and > 0, got {mass}"
            )));
        }
        if !(damping_ratio.is_finite() && damping_ratio >= 0.0) {
            return Err(SdofError::parameter(format!(
                "damping ratio must be finite and >= 0, got {damping_ratio}"
            )));
        }
        Ok(Self {
            stiffness,
            mass,
            damping_ratio,
        })
    }

    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    /// Natural circular frequency wn = sqrt(k/m) [rad/s]
    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    /// Viscous damping coefficient c = 2 zeta m wn [N s/m]
    pub fn damping_coefficient(&self) -> f64 {
        2.0 * self.damping_ratio * self.mass * self.natural_frequency()
    }

    /// Natural period T = 2 pi / wn [s]
    pub fn natural_period(&self) -> f64 {
        TAU / self.natural_frequency()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derived_quantities_follow_stiffness_and_mass() {
        let p = ParameterRealization::new(1.0e6, 1000.0, 0.05).unwrap();
        assert_relative_eq!(p.natural_frequency(), 1000.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(
            p.damping_coefficient(),
            2.0 * 0.05 * 1000.0 * 1000.0_f64.sqrt(),
            epsilon = 1e-9
        );
        assert_relative_eq!(p.natural_period() * p.natural_frequency(), TAU, epsilon = 1e-12);
    }

    #[test]
    fn zero_stiffness_is_rejected() {
        let err = ParameterRealization::new(0.0, 1000.0, 0.02).unwrap_err();
        assert!(matches!(err, SdofError::Parameter(_)));
    }

    #[test]
    fn negative_damping_and_nan_mass_are_rejected() {
        assert!(ParameterRealization::new(1.0, 1.0, -0.01).is_err());
        assert!(ParameterRealization::new(1.0, f64::NAN, 0.0).is_err());
    }
}
