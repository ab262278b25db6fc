//! # evex
//!
//! Pattern-based event extraction: template learning, dual matching, and
//! event-mention coreference.
//!
//! - **Acquisition**: event templates learned from annotated examples, as
//!   linear chunk sequences and bounded dependency-graph fragments
//! - **Tagging**: evaluation-gated pattern matching over candidate triggers,
//!   with optional statistical argument and event models
//! - **Coreference**: folding a document's detections into multi-mention
//!   events through a learned or heuristic merge decision
//!
//! The engine consumes pre-analyzed [`doc::Document`]s (tokens, constituents,
//! mentions, dependency relations) and produces [`event::Event`]s; it never
//! runs its own linguistic analysis.
//!
//! ```
//! use evex::prelude::*;
//!
//! # fn run(training: Vec<(Document, Vec<EventExample>)>, doc: Document) {
//! let store = evex::train::train_patterns(
//!     &training,
//!     &training,
//!     &[PatternKind::Syntax, PatternKind::ArgStructure],
//!     5,
//! );
//! let tagger = Tagger::new(store);
//! let coref = Coreferencer::default();
//! for events in tagger.tag_corpus(&[doc]) {
//!     let resolved = coref.resolve(events);
//!     for event in resolved {
//!         println!("{} {}.{}", event.id, event.event_type, event.event_subtype);
//!     }
//! }
//! # }
//! ```

#![warn(missing_docs)]

pub mod classifier;
pub mod confidence;
pub mod coref;
pub mod doc;
pub mod error;
pub mod event;
pub mod mention;
pub mod pattern;
pub mod roles;
pub mod span;
pub mod syntax;
pub mod tagger;
pub mod train;

pub use error::{Error, Result};

pub use classifier::{Classifier, Feature, Outcomes, TableClassifier};
pub use confidence::Confidence;
pub use coref::{CorefParams, Coreferencer, MergeFeatures};
pub use doc::{Constituent, Document, DocumentBuilder, Token};
pub use event::{Event, EventArgument, EventMention, EventMentionArgument};
pub use mention::{Mention, MentionId, MentionKind, ParentId};
pub use pattern::{
    ChunkPath, EventExample, EventPattern, MatchTier, PatternEvaluation, PatternGraph,
    PatternKind, PatternMatch, PatternNode, PatternStore,
};
pub use span::Span;
pub use syntax::{RelationGraph, SyntacticRelation};
pub use tagger::{Tagger, TaggerParams};

/// Convenience re-exports for the common tagging pipeline.
pub mod prelude {
    pub use crate::classifier::{Classifier, Feature, Outcomes};
    pub use crate::confidence::Confidence;
    pub use crate::coref::{CorefParams, Coreferencer};
    pub use crate::doc::{Document, DocumentBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::event::{Event, EventMention};
    pub use crate::mention::{Mention, MentionId, ParentId};
    pub use crate::pattern::{EventExample, EventPattern, PatternKind, PatternStore};
    pub use crate::span::Span;
    pub use crate::tagger::{Tagger, TaggerParams};
}
