//! Event coreference: folds a document's single-mention detections into
//! multi-mention events.
//!
//! Detections are processed in document order. Each is compared against the
//! already-accepted events of the same type and subtype through a merge
//! probability computed from anchor-text equality, anchor form, bucketed
//! distance, and overlapping vs conflicting `(role, parent)` pairs. The
//! highest-probability predecessor above the merge threshold absorbs the
//! detection; merging is a strict argument union, never a removal.

use crate::classifier::{Classifier, Feature};
use crate::confidence::Confidence;
use crate::event::Event;

/// Thresholds and floors for the merge decision.
#[derive(Debug, Clone, Copy)]
pub struct CorefParams {
    /// Minimum merge probability to fold a detection into a predecessor.
    pub merge_threshold: f64,
    /// Arguments below this confidence are ignored when counting overlaps
    /// and conflicts.
    pub confidence_floor: f64,
}

impl Default for CorefParams {
    fn default() -> Self {
        Self {
            merge_threshold: 0.5,
            confidence_floor: 0.1,
        }
    }
}

/// Merge-decision features for one (predecessor, detection) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeFeatures {
    /// Candidate anchor text equals some predecessor mention's anchor text.
    pub anchor_match: bool,
    /// The candidate anchor is nominal (all lowercase) rather than named.
    pub anchor_nominal: bool,
    /// Bucketed character distance to the predecessor's last mention.
    pub distance_bucket: u8,
    /// `(role, parent)` pairs present on both sides, both above the floor.
    pub overlaps: usize,
    /// Roles bound to different parents on the two sides, both above the floor.
    pub conflicts: usize,
}

impl MergeFeatures {
    /// Discrete feature instantiation for an injected classifier.
    #[must_use]
    pub fn to_features(&self) -> Vec<Feature> {
        vec![
            Feature::new("anchor_match", if self.anchor_match { "true" } else { "false" }),
            Feature::new("anchor_nominal", if self.anchor_nominal { "true" } else { "false" }),
            Feature::new("distance", self.distance_bucket.to_string()),
            Feature::new("overlaps", self.overlaps.to_string()),
            Feature::new("conflicts", self.conflicts.to_string()),
        ]
    }
}

fn distance_bucket(distance: usize) -> u8 {
    match distance {
        0..=50 => 0,
        51..=200 => 1,
        201..=800 => 2,
        _ => 3,
    }
}

/// Deterministic fallback merge model, used when no classifier is injected.
///
/// Any role conflict pushes the probability below every sensible threshold;
/// anchor equality and proximity push it up.
#[must_use]
pub fn heuristic_merge_probability(features: &MergeFeatures) -> Confidence {
    let mut score = 0.25;
    if features.anchor_match {
        score += 0.3;
    }
    if features.anchor_nominal && !features.anchor_match {
        score -= 0.05;
    }
    score += match features.distance_bucket {
        0 => 0.15,
        1 => 0.1,
        2 => 0.0,
        _ => -0.1,
    };
    score += 0.1 * features.overlaps.min(3) as f64;
    score -= 0.6 * features.conflicts as f64;
    Confidence::saturating(score)
}

/// Folds single-mention detections into multi-mention events.
pub struct Coreferencer {
    params: CorefParams,
    model: Option<Box<dyn Classifier>>,
}

impl Coreferencer {
    /// Create a coreferencer with the built-in merge model.
    #[must_use]
    pub fn new(params: CorefParams) -> Self {
        Self {
            params,
            model: None,
        }
    }

    /// Inject a learned merge classifier (outcome label `merge`).
    #[must_use]
    pub fn with_model(mut self, model: Box<dyn Classifier>) -> Self {
        self.model = Some(model);
        self
    }

    /// Compute the merge features between a predecessor and a detection.
    #[must_use]
    pub fn merge_features(&self, prior: &Event, candidate: &Event) -> MergeFeatures {
        let floor = self.params.confidence_floor;
        let cand_mention = &candidate.mentions[0];
        let cand_anchor = cand_mention.anchor_text.to_lowercase();

        let anchor_match = prior
            .mentions
            .iter()
            .any(|m| m.anchor_text.to_lowercase() == cand_anchor);
        let anchor_nominal = cand_mention
            .anchor_text
            .chars()
            .all(|c| !c.is_alphabetic() || c.is_lowercase());
        let distance = prior
            .mentions
            .last()
            .map_or(usize::MAX, |m| m.anchor.start.abs_diff(cand_mention.anchor.start));

        let mut overlaps = 0;
        let mut conflicts = 0;
        for ca in candidate
            .arguments
            .iter()
            .filter(|a| a.confidence.get() >= floor)
        {
            for pa in prior
                .arguments
                .iter()
                .filter(|a| a.confidence.get() >= floor && a.role == ca.role)
            {
                if pa.parent == ca.parent {
                    overlaps += 1;
                } else {
                    conflicts += 1;
                }
            }
        }

        MergeFeatures {
            anchor_match,
            anchor_nominal,
            distance_bucket: distance_bucket(distance),
            overlaps,
            conflicts,
        }
    }

    /// Merge probability for one (predecessor, detection) pair.
    #[must_use]
    pub fn merge_probability(&self, prior: &Event, candidate: &Event) -> Confidence {
        let features = self.merge_features(prior, candidate);
        match &self.model {
            Some(model) => model
                .evaluate(&features.to_features())
                .probability_of("merge"),
            None => heuristic_merge_probability(&features),
        }
    }

    /// Fold `detections` (document order, one mention each) into final
    /// events, assigning document-unique ids.
    #[must_use]
    pub fn resolve(&self, detections: Vec<Event>) -> Vec<Event> {
        let mut accepted: Vec<Event> = Vec::new();
        for event in detections {
            if event.mentions.len() != 1 {
                // Already multi-mention (pre-merged input): accept as is.
                accepted.push(event);
                continue;
            }
            let mut best: Option<(usize, Confidence)> = None;
            for (i, prior) in accepted.iter().enumerate() {
                if !prior.same_kind(&event) {
                    continue;
                }
                let p = self.merge_probability(prior, &event);
                if p.get() > self.params.merge_threshold
                    && best.map_or(true, |(_, bp)| p > bp)
                {
                    best = Some((i, p));
                }
            }
            match best {
                Some((i, p)) => {
                    log::debug!(
                        "merging detection at {:?} into event {} (p={p})",
                        event.mentions[0].anchor,
                        i
                    );
                    if let Some(mention) = event.mentions.into_iter().next() {
                        accepted[i].add_mention(mention);
                    }
                }
                None => accepted.push(event),
            }
        }
        for (i, event) in accepted.iter_mut().enumerate() {
            event.id = format!("EV{}", i + 1);
        }
        accepted
    }
}

impl Default for Coreferencer {
    fn default() -> Self {
        Self::new(CorefParams::default())
    }
}
