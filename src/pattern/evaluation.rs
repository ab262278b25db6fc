//! Success/failure statistics for a pattern, accumulated over a held-out
//! validation pass and used to rank and gate matches at tagging time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::confidence::Confidence;

/// Success/failure counters, overall and per role.
///
/// Success means the pattern fired and produced the annotated event; failure
/// means it fired but was wrong. [`PatternEvaluation::test`] converts the
/// counters into a bounded confidence, or `None` for an untrusted pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternEvaluation {
    successes: u32,
    failures: u32,
    by_role: BTreeMap<String, (u32, u32)>,
}

fn ratio(successes: u32, failures: u32) -> Option<f64> {
    let total = successes + failures;
    if total == 0 {
        None
    } else {
        Some(f64::from(successes) / f64::from(total))
    }
}

impl PatternEvaluation {
    /// Fresh, untested evaluation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one firing over the roles it bound.
    pub fn record<S: AsRef<str>>(&mut self, roles: &[S], success: bool) {
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        for role in roles {
            let entry = self.by_role.entry(role.as_ref().to_string()).or_default();
            if success {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
    }

    /// Overall success count.
    #[must_use]
    pub fn successes(&self) -> u32 {
        self.successes
    }

    /// Overall failure count.
    #[must_use]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Per-role counters, in role order.
    pub fn role_counts(&self) -> impl Iterator<Item = (&str, u32, u32)> {
        self.by_role.iter().map(|(r, (s, f))| (r.as_str(), *s, *f))
    }

    /// Restore counters from persisted values.
    pub fn restore(&mut self, successes: u32, failures: u32) {
        self.successes = successes;
        self.failures = failures;
    }

    /// Restore one role's counters from persisted values.
    pub fn restore_role(&mut self, role: impl Into<String>, successes: u32, failures: u32) {
        self.by_role.insert(role.into(), (successes, failures));
    }

    /// Trust gate: a bounded confidence if the overall ratio, or any per-role
    /// ratio for a role in `roles_present`, meets `min_ratio`; `None`
    /// otherwise (including the never-tested case).
    ///
    /// The returned value is the best qualifying ratio, so it ranks trusted
    /// patterns against each other as well as gating them.
    #[must_use]
    pub fn test<S: AsRef<str>>(&self, roles_present: &[S], min_ratio: f64) -> Option<Confidence> {
        let mut best: Option<f64> = None;
        if let Some(r) = ratio(self.successes, self.failures) {
            if r >= min_ratio {
                best = Some(r);
            }
        }
        for role in roles_present {
            if let Some((s, f)) = self.by_role.get(role.as_ref()) {
                if let Some(r) = ratio(*s, *f) {
                    if r >= min_ratio && best.map_or(true, |b| r > b) {
                        best = Some(r);
                    }
                }
            }
        }
        best.map(Confidence::saturating)
    }
}
