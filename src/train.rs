//! Pattern acquisition and the held-out validation pass.
//!
//! [`learn_patterns`] turns annotated examples into stored templates, one per
//! requested representation; malformed examples are logged and skipped.
//! [`evaluate_patterns`] replays every stored pattern over a validation
//! corpus and records a success when the firing reproduces a gold annotation
//! at the same anchor, a failure otherwise. The resulting counters are what
//! the tagger's trust gate consumes.

use crate::doc::Document;
use crate::event::EventMention;
use crate::pattern::{normalize_word, EventExample, EventPattern, PatternKind, PatternStore};
use crate::span::Span;
use crate::tagger::is_trigger_category;

/// One document with its gold event annotations.
pub type AnnotatedDocument = (Document, Vec<EventExample>);

/// Learn patterns from an annotated corpus, one pattern per example and
/// requested representation.
///
/// Patterns that come out unable to fire (a graph representation with no
/// reachable arguments) are dropped, as are examples referencing unknown
/// mentions; both are logged, neither aborts acquisition.
#[must_use]
pub fn learn_patterns(
    corpus: &[AnnotatedDocument],
    kinds: &[PatternKind],
    radius: u32,
) -> PatternStore {
    let mut store = PatternStore::new();
    let mut skipped = 0usize;
    for (doc, examples) in corpus {
        for example in examples {
            for &kind in kinds {
                match EventPattern::from_example(example, kind, doc, radius) {
                    Ok(pattern) => {
                        if pattern.is_empty() {
                            skipped += 1;
                        } else {
                            store.add(pattern);
                        }
                    }
                    Err(err) => {
                        skipped += 1;
                        log::warn!(
                            "skipping example at {}..{}: {err}",
                            example.anchor.start,
                            example.anchor.end
                        );
                    }
                }
            }
        }
    }
    log::info!("learned {} pattern(s), skipped {skipped}", store.len());
    store
}

/// Replay every pattern over a validation corpus, accumulating success and
/// failure counters on the patterns themselves.
pub fn evaluate_patterns(store: &mut PatternStore, corpus: &[AnnotatedDocument]) {
    for pattern in store.patterns_mut() {
        for (doc, examples) in corpus {
            for token in &doc.tokens {
                if !is_trigger_category(&token.category)
                    || normalize_word(&token.text) != pattern.anchor_text
                {
                    continue;
                }
                let Some(m) = pattern.matches(token.span, doc) else {
                    continue;
                };
                let success = m
                    .event
                    .mentions
                    .first()
                    .map_or(false, |em| confirmed(pattern, em, token.span, examples));
                pattern.evaluation.record(&m.roles, success);
            }
        }
    }
}

/// Learn from `training`, validate over `validation`, and return the store
/// ready for tagging.
#[must_use]
pub fn train_patterns(
    training: &[AnnotatedDocument],
    validation: &[AnnotatedDocument],
    kinds: &[PatternKind],
    radius: u32,
) -> PatternStore {
    let mut store = learn_patterns(training, kinds, radius);
    evaluate_patterns(&mut store, validation);
    store
}

/// A firing is confirmed when a gold example of the same type and subtype
/// sits at the same anchor and every bound `(role, mention)` pair appears in
/// its argument list.
fn confirmed(
    pattern: &EventPattern,
    mention: &EventMention,
    anchor: Span,
    examples: &[EventExample],
) -> bool {
    let Some(gold) = examples.iter().find(|e| {
        e.anchor == anchor
            && e.event_type == pattern.event_type
            && e.event_subtype == pattern.event_subtype
    }) else {
        return false;
    };
    mention.arguments.iter().all(|a| {
        gold.arguments
            .iter()
            .any(|(role, id)| role == &a.role && *id == a.mention)
    })
}
