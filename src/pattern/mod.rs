//! Event templates: nodes, chunk paths, dependency fragments, evaluation,
//! and the pattern store.

pub mod chunk;
pub mod dependency;
pub mod evaluation;
pub mod event_pattern;
pub mod node;
pub mod store;

use serde::{Deserialize, Serialize};

pub use chunk::ChunkPath;
pub use dependency::{PatternEdge, PatternGraph};
pub use evaluation::PatternEvaluation;
pub use event_pattern::{EventExample, EventPattern, PatternMatch};
pub use node::{MatchTier, PatternNode};
pub use store::PatternStore;

/// Representation a pattern was acquired under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    /// Linear chunk sequence between consecutive nodes.
    Chunk,
    /// Bounded dependency-graph fragment.
    Syntax,
    /// Bounded graph fragment preferring predicate-argument edges.
    ArgStructure,
}

impl PatternKind {
    /// Stable label used in the persisted format.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PatternKind::Chunk => "chunk",
            PatternKind::Syntax => "syntax",
            PatternKind::ArgStructure => "argstructure",
        }
    }

    /// Parse the persisted label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "chunk" => Some(PatternKind::Chunk),
            "syntax" => Some(PatternKind::Syntax),
            "argstructure" => Some(PatternKind::ArgStructure),
            _ => None,
        }
    }
}

/// Normalized form of an anchor word, used as the store index key.
#[must_use]
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_roundtrip() {
        for kind in [PatternKind::Chunk, PatternKind::Syntax, PatternKind::ArgStructure] {
            assert_eq!(PatternKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(PatternKind::from_label("other"), None);
    }

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_word(" Attacked "), "attacked");
    }
}
