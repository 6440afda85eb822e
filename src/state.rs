//! Kinematic state of the SDOF mass
//!
//! The state consists of three components:
//! - displacement relative to the base
//! - velocity
//! - acceleration

/// Displacement, velocity and acceleration at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseState {
    /// Displacement [m]
    pub displacement: f64,
    /// Velocity [m/s]
    pub velocity: f64,
    /// Acceleration [m/s^2]
    pub acceleration: f64,
}

impl ResponseState {
    pub fn new(displacement: f64, velocity: f64, acceleration: f64) -> Self {
        Self {
            displacement,
            velocity,
            acceleration,
        }
    }

    /// Structure at rest
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.displacement.is_finite() && self.velocity.is_finite() && self.acceleration.is_finite()
    }
}

impl Default for ResponseState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Time histories of one run, one entry per committed step.
///
/// Entry 0 is the initial state at t = 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseHistory {
    pub time: Vec<f64>,
    pub displacement: Vec<f64>,
    pub velocity: Vec<f64>,
    pub acceleration: Vec<f64>,
    pub base_reaction: Vec<f64>,
}

/// Selects one channel of a [`ResponseHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Displacement,
    Velocity,
    Acceleration,
    BaseReaction,
}

impl ResponseHistory {
    /// Empty history with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            displacement: Vec::with_capacity(capacity),
            velocity: Vec::with_capacity(capacity),
            acceleration: Vec::with_capacity(capacity),
            base_reaction: Vec::with_capacity(capacity),
        }
    }

    /// Append one committed entry.
    pub fn push(&mut self, time: f64, state: ResponseState, base_reaction: f64) {
        self.time.push(time);
        self.displacement.push(state.displacement);
        self.velocity.push(state.velocity);
        self.acceleration.push(state.acceleration);
        self.base_reaction.push(base_reaction);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Time of the last committed entry.
    pub fn end_time(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }

    /// Samples of one channel, aligned with `time`.
    pub fn channel(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::Displacement => &self.displacement,
            Channel::Velocity => &self.velocity,
            Channel::Acceleration => &self.acceleration,
            Channel::BaseReaction => &self.base_reaction,
        }
    }

    /// Largest absolute value of a channel, 0 for an empty history.
    pub fn peak_abs(&self, channel: Channel) -> f64 {
        self.channel(channel)
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    /// Cumulative maximum of |x| up to each entry.
    pub fn running_max_abs(&self, channel: Channel) -> Vec<f64> {
        self.channel(channel)
            .iter()
            .scan(0.0_f64, |peak, v| {
                *peak = peak.max(v.abs());
                Some(*peak)
            })
            .collect()
    }
}
