//! Opaque classifier handles injected into the tagger and coreferencer.
//!
//! The engine is agnostic to how the underlying probability models were
//! trained or stored; it only needs `evaluate(features) -> probability by
//! outcome`. Models are supplied at orchestration construction and swapped
//! for table-driven doubles in tests.

use std::collections::HashMap;
use std::fmt;

use crate::confidence::Confidence;

/// A single feature: name plus string value.
///
/// Feature values are strings because the underlying maximum-entropy style
/// models consume discrete feature instantiations; numeric signals are
/// bucketed before they get here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Feature {
    /// Feature name, e.g. `anchor`, `path`, `distance`.
    pub name: String,
    /// Feature value, e.g. `attacked`, `nsubj`, `2-3`.
    pub value: String,
}

impl Feature {
    /// Create a feature.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Probabilities by outcome label, as returned by a classifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcomes {
    probabilities: HashMap<String, Confidence>,
}

impl Outcomes {
    /// Create an empty outcome distribution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the probability of one outcome.
    #[must_use]
    pub fn with(mut self, outcome: impl Into<String>, probability: f64) -> Self {
        self.probabilities
            .insert(outcome.into(), Confidence::saturating(probability));
        self
    }

    /// Probability of `outcome`, zero if absent.
    #[must_use]
    pub fn probability_of(&self, outcome: &str) -> Confidence {
        self.probabilities
            .get(outcome)
            .copied()
            .unwrap_or(Confidence::MIN)
    }

    /// The most probable outcome, if any.
    #[must_use]
    pub fn best(&self) -> Option<(&str, Confidence)> {
        self.probabilities
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(k, v)| (k.as_str(), *v))
    }
}

/// Capability interface for injected probability models.
pub trait Classifier: Send + Sync {
    /// Evaluate a feature set, returning probabilities by outcome.
    fn evaluate(&self, features: &[Feature]) -> Outcomes;
}

/// A table-driven classifier keyed on exact feature sets.
///
/// Intended for tests and for replaying decisions of an external model;
/// feature sets not in the table get the fallback distribution.
#[derive(Debug, Clone, Default)]
pub struct TableClassifier {
    table: Vec<(Vec<Feature>, Outcomes)>,
    fallback: Outcomes,
}

impl TableClassifier {
    /// Create an empty table classifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a feature set to an outcome distribution.
    ///
    /// Matching requires every listed feature to be present in the evaluated
    /// set (subset match), so entries can key on the discriminating features
    /// only.
    #[must_use]
    pub fn with_entry(mut self, features: Vec<Feature>, outcomes: Outcomes) -> Self {
        self.table.push((features, outcomes));
        self
    }

    /// Set the distribution returned when no entry matches.
    #[must_use]
    pub fn with_fallback(mut self, outcomes: Outcomes) -> Self {
        self.fallback = outcomes;
        self
    }
}

impl Classifier for TableClassifier {
    fn evaluate(&self, features: &[Feature]) -> Outcomes {
        for (key, outcomes) in &self.table {
            if key.iter().all(|k| features.contains(k)) {
                return outcomes.clone();
            }
        }
        self.fallback.clone()
    }
}
