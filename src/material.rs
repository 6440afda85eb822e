//! Resisting force laws
//!
//! The integrator only needs the force a spring exerts at a displacement and
//! its tangent stiffness there.

/// Resisting force of the structural element.
pub trait ResistingForce {
    /// Internal force F_int(d) [N]
    fn evaluate(&self, displacement: f64) -> f64;

    /// Tangent stiffness dF_int/dd at `displacement` [N/m]
    fn tangent(&self, displacement: f64) -> f64;
}

/// Linear elastic spring, F_int = k d
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearElastic {
    pub stiffness: f64,
}

impl LinearElastic {
    pub fn new(stiffness: f64) -> Self {
        Self { stiffness }
    }
}

impl ResistingForce for LinearElastic {
    fn evaluate(&self, displacement: f64) -> f64 {
        self.stiffness * displacement
    }

    fn tangent(&self, _displacement: f64) -> f64 {
        self.stiffness
    }
}

/// Force law built from a pair of closures.
pub struct ForceLaw<F, T> {
    force: F,
    tangent: T,
}

impl<F, T> ForceLaw<F, T>
where
    F: Fn(f64) -> f64,
    T: Fn(f64) -> f64,
{
    pub fn new(force: F, tangent: T) -> Self {
        Self { force, tangent }
    }
}

impl<F, T> ResistingForce for ForceLaw<F, T>
where
    F: Fn(f64) -> f64,
    T: Fn(f64) -> f64,
{
    fn evaluate(&self, displacement: f64) -> f64 {
        (self.force)(displacement)
    }

    fn tangent(&self, displacement: f64) -> f64 {
        (self.tangent)(displacement)
    }
}

impl<R: ResistingForce + ?Sized> ResistingForce for &R {
    fn evaluate(&self, displacement: f64) -> f64 {
        (**self).evaluate(displacement)
    }

    fn tangent(&self, displacement: f64) -> f64 {
        (**self).tangent(displacement)
    }
}

impl<R: ResistingForce + ?Sized> ResistingForce for Box<R> {
    fn evaluate(&self, displacement: f64) -> f64 {
        (**self).evaluate(displacement)
    }

    fn tangent(&self, displacement: f64) -> f64 {
        (**self).tangent(displacement)
    }
}
