//! Witness type for confidence values bounded to [0.0, 1.0].
//!
//! Pattern match scores, classifier probabilities, and merge probabilities
//! all flow through the same engine, but they are computed on different
//! scales: a pattern-evaluation ratio is a success rate, a classifier output
//! is (ideally) a calibrated probability, and the built-in coreference model
//! produces a heuristic blend. What they share is the unit interval, and the
//! engine only ever compares scores of the same provenance against each
//! other or against a fixed threshold.
//!
//! `Confidence` exists so that bound is checked once, at construction, and
//! never again downstream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A confidence score guaranteed to be in the range [0.0, 1.0].
///
/// `#[repr(transparent)]` over `f64`: no runtime overhead.
///
/// # Construction
///
/// - [`Confidence::new`]: returns `None` if out of range (strict)
/// - [`Confidence::saturating`]: clamps to [0, 1], NaN becomes 0.0 (lenient)
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// The minimum valid confidence value.
    pub const MIN: Self = Self(0.0);

    /// The maximum valid confidence value.
    pub const MAX: Self = Self(1.0);

    /// Create a confidence score, returning `None` if out of range.
    #[must_use]
    #[inline]
    pub fn new(value: f64) -> Option<Self> {
        if (0.0..=1.0).contains(&value) && !value.is_nan() {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create a confidence score, clamping to [0.0, 1.0].
    ///
    /// NaN is treated as 0.0.
    #[must_use]
    #[inline]
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Get the inner value (guaranteed to be in [0.0, 1.0]).
    #[must_use]
    #[inline]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Product of two confidences (joint probability of independent events).
    #[must_use]
    #[inline]
    pub fn product(self, other: Self) -> Self {
        Self(self.0 * other.0)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Debug for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Confidence({:.4})", self.0)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<Confidence> for f64 {
    #[inline]
    fn from(conf: Confidence) -> Self {
        conf.0
    }
}
