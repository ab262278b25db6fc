//! The tagging orchestration: pattern matching over candidate triggers,
//! evaluation-gated selection, and statistical augmentation.
//!
//! For each candidate trigger token the tagger consults the store under the
//! normalized word, matches every pattern there, gates each match through its
//! evaluation statistics, and keeps the best-scoring survivor. The resulting
//! single-mention event is then augmented: an argument-existence model and a
//! role model may attach further sentence mentions, and an event model may
//! rescale confidence, strip weak arguments, or veto the event outright.
//! Detections come back in document order, ready for the coreferencer.

use std::collections::HashSet;

use crate::classifier::{Classifier, Feature};
use crate::doc::Document;
use crate::error::Result;
use crate::event::{Event, EventArgument, EventMentionArgument};
use crate::mention::Mention;
use crate::pattern::dependency::build_syntactic_path;
use crate::pattern::{normalize_word, PatternKind, PatternMatch, PatternStore};
use crate::roles::valid_filler;
use crate::span::Span;

/// Thresholds and floors driving tagging decisions.
#[derive(Debug, Clone, Copy)]
pub struct TaggerParams {
    /// Minimum success ratio for a pattern's evaluation gate.
    pub pattern_ratio: f64,
    /// Minimum probability for the argument model to attach a mention.
    pub argument_probability_floor: f64,
    /// Arguments with `p_event * p_arg` below this are stripped.
    pub argument_floor: f64,
    /// Events scored below this by the event model are dropped.
    pub event_floor: f64,
}

impl Default for TaggerParams {
    fn default() -> Self {
        Self {
            pattern_ratio: 0.5,
            argument_probability_floor: 0.35,
            argument_floor: 0.2,
            event_floor: 0.3,
        }
    }
}

/// Whether a token's category can anchor an event (verbal, nominal, or
/// adjectival triggers).
#[must_use]
pub fn is_trigger_category(category: &str) -> bool {
    category.starts_with("VB") || category.starts_with("NN") || category == "JJ"
}

/// Tie-break rank among representations at equal combined score.
fn kind_rank(kind: PatternKind) -> u8 {
    match kind {
        PatternKind::Chunk => 0,
        PatternKind::ArgStructure => 1,
        PatternKind::Syntax => 2,
    }
}

fn distance_bucket(distance: usize) -> &'static str {
    match distance {
        0..=10 => "0",
        11..=40 => "1",
        41..=120 => "2",
        _ => "3",
    }
}

/// Pattern-driven event tagger with optional statistical models.
pub struct Tagger {
    store: PatternStore,
    argument_model: Option<Box<dyn Classifier>>,
    role_model: Option<Box<dyn Classifier>>,
    event_model: Option<Box<dyn Classifier>>,
    params: TaggerParams,
}

impl Tagger {
    /// Create a tagger over a pattern store, with no statistical models.
    #[must_use]
    pub fn new(store: PatternStore) -> Self {
        Self {
            store,
            argument_model: None,
            role_model: None,
            event_model: None,
            params: TaggerParams::default(),
        }
    }

    /// Override the default parameters.
    #[must_use]
    pub fn with_params(mut self, params: TaggerParams) -> Self {
        self.params = params;
        self
    }

    /// Inject the argument-existence model (outcome label `argument`) and
    /// the role model (outcome labels are role names). Augmentation runs
    /// only when both are present.
    #[must_use]
    pub fn with_argument_models(
        mut self,
        existence: Box<dyn Classifier>,
        role: Box<dyn Classifier>,
    ) -> Self {
        self.argument_model = Some(existence);
        self.role_model = Some(role);
        self
    }

    /// Inject the event model (outcome label `event`). It rescales event
    /// confidence, strips weak arguments, and can veto a pattern-derived
    /// event entirely.
    #[must_use]
    pub fn with_event_model(mut self, model: Box<dyn Classifier>) -> Self {
        self.event_model = Some(model);
        self
    }

    /// Shared access to the pattern store.
    #[must_use]
    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    /// Tag one document, returning single-mention detections in document
    /// order. Each trigger span fires at most once.
    pub fn tag_document(&self, doc: &Document) -> Result<Vec<Event>> {
        let mut detections = Vec::new();
        let mut fired: HashSet<Span> = HashSet::new();

        for token in &doc.tokens {
            if !is_trigger_category(&token.category) || fired.contains(&token.span) {
                continue;
            }
            let word = normalize_word(&token.text);
            let mut best: Option<(f64, u8, PatternMatch)> = None;
            for pattern in self.store.patterns_for(&word) {
                let Some(m) = pattern.matches(token.span, doc) else {
                    continue;
                };
                let Some(trust) = pattern.evaluation.test(&m.roles, self.params.pattern_ratio)
                else {
                    continue;
                };
                let combined = f64::from(m.score) + trust.get();
                let rank = kind_rank(pattern.kind);
                let better = match &best {
                    None => true,
                    Some((bc, br, _)) => combined > *bc || (combined == *bc && rank > *br),
                };
                if better {
                    best = Some((combined, rank, m));
                }
            }
            let Some((_, _, m)) = best else { continue };
            fired.insert(token.span);
            let mut event = m.event;
            if self.augment(&mut event, doc) {
                log::debug!(
                    "{}:{} fired {}.{} with {} argument(s)",
                    token.span.start,
                    token.text,
                    event.event_type,
                    event.event_subtype,
                    event.arguments.len()
                );
                detections.push(event);
            }
        }
        Ok(detections)
    }

    /// Tag a corpus with a per-document failure boundary: a document that
    /// fails is logged and yields no events, and tagging continues.
    #[must_use]
    pub fn tag_corpus(&self, docs: &[Document]) -> Vec<Vec<Event>> {
        docs.iter()
            .enumerate()
            .map(|(i, doc)| match self.tag_document(doc) {
                Ok(events) => events,
                Err(err) => {
                    log::warn!("document {i}: tagging failed: {err}");
                    Vec::new()
                }
            })
            .collect()
    }

    /// Statistical augmentation over a freshly matched single-mention event.
    /// Returns whether the event survives.
    fn augment(&self, event: &mut Event, doc: &Document) -> bool {
        let Some(first) = event.mentions.first() else {
            return false;
        };
        let anchor = first.anchor;
        let anchor_word = normalize_word(&first.anchor_text);

        if let (Some(arg_model), Some(role_model)) = (&self.argument_model, &self.role_model) {
            if let Some(sentence) = doc.sentence_containing(anchor.start) {
                for mention in doc.mentions_in(sentence) {
                    if mention.head.overlaps(&anchor) {
                        continue;
                    }
                    // Pattern bindings are never overridden or duplicated.
                    if event.mentions[0]
                        .arguments
                        .iter()
                        .any(|a| a.mention == mention.id)
                        || event.mentions[0].uses_parent(&mention.parent)
                    {
                        continue;
                    }
                    let features = argument_features(&anchor_word, anchor.start, mention, doc);
                    let p_arg = arg_model.evaluate(&features).probability_of("argument");
                    if p_arg.get() < self.params.argument_probability_floor {
                        continue;
                    }
                    let outcomes = role_model.evaluate(&features);
                    let Some((role, p_role)) = outcomes.best() else {
                        continue;
                    };
                    let role = role.to_string();
                    if event.mentions[0].has_role(&role)
                        || !valid_filler(&event.event_subtype, &role, mention)
                    {
                        continue;
                    }
                    event.mentions[0].add_argument(EventMentionArgument {
                        role: role.clone(),
                        mention: mention.id.clone(),
                        span: mention.head,
                        parent: mention.parent.clone(),
                        confidence: p_arg,
                        role_confidence: p_role,
                    });
                    event.add_argument(EventArgument {
                        role,
                        parent: mention.parent.clone(),
                        confidence: p_arg,
                    });
                }
            }
        }

        if let Some(event_model) = &self.event_model {
            let features = event_features(&anchor_word, event);
            let p_event = event_model.evaluate(&features).probability_of("event");
            if p_event.get() < self.params.event_floor {
                log::debug!(
                    "event model vetoed {}.{} at {anchor:?} (p={p_event})",
                    event.event_type,
                    event.event_subtype
                );
                return false;
            }
            event.confidence = p_event;
            let floor = self.params.argument_floor;
            for m in &mut event.mentions {
                m.confidence = p_event;
                m.arguments
                    .retain(|a| p_event.get() * a.confidence.get() >= floor);
            }
            event
                .arguments
                .retain(|a| p_event.get() * a.confidence.get() >= floor);
        }
        true
    }
}

/// Features for the argument-existence and role models: anchor word, mention
/// type, dependency path from anchor to mention head, bucketed distance.
fn argument_features(
    anchor_word: &str,
    anchor_pos: usize,
    mention: &Mention,
    doc: &Document,
) -> Vec<Feature> {
    let path = build_syntactic_path(anchor_pos, mention.head.start, &doc.graph)
        .unwrap_or_else(|| "none".to_string());
    let distance = anchor_pos.abs_diff(mention.head.start);
    vec![
        Feature::new("anchor", anchor_word),
        Feature::new("type", &mention.mention_type),
        Feature::new("path", path),
        Feature::new("distance", distance_bucket(distance)),
    ]
}

/// Features for the event model: anchor word, subtype, argument count, and
/// one feature per bound role.
fn event_features(anchor_word: &str, event: &Event) -> Vec<Feature> {
    let mut features = vec![
        Feature::new("anchor", anchor_word),
        Feature::new("subtype", &event.event_subtype),
        Feature::new("args", event.arguments.len().to_string()),
    ];
    for arg in &event.arguments {
        features.push(Feature::new("role", &arg.role));
    }
    features
}
