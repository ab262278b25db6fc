//! Labeled dependency relations between token positions.
//!
//! Produced by an external dependency parser or predicate-argument deriver;
//! the engine only reads them. Positions are byte offsets of token starts,
//! so relations line up with [`crate::doc::Document`] tokens and mention
//! head spans without an extra index.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A directed labeled edge between two token positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntacticRelation {
    /// Source token start offset.
    pub source: usize,
    /// Target token start offset.
    pub target: usize,
    /// Relation label (e.g. `nsubj`, `dobj`, `arg0`; inverses prefixed `r:`).
    pub label: String,
    /// Surface word at the target position.
    pub target_word: String,
}

impl SyntacticRelation {
    /// Create a relation.
    #[must_use]
    pub fn new(
        source: usize,
        target: usize,
        label: impl Into<String>,
        target_word: impl Into<String>,
    ) -> Self {
        Self {
            source,
            target,
            label: label.into(),
            target_word: target_word.into(),
        }
    }

    /// Whether the label is an argument-structure (predicate-argument) label.
    ///
    /// These are the `arg0`..`arg5` / `argm` / `pred` labels emitted by the
    /// predicate-argument deriver, counted when breaking path-length ties for
    /// ArgStructure patterns. An `r:` inverse counts the same as its forward
    /// edge.
    #[must_use]
    pub fn is_arg_structure(&self) -> bool {
        let label = self.label.strip_prefix("r:").unwrap_or(&self.label);
        matches!(
            label,
            "arg0" | "arg1" | "arg2" | "arg3" | "arg4" | "arg5" | "argm" | "pred"
        )
    }
}

/// Adjacency of [`SyntacticRelation`]s indexed by source position.
///
/// May include inverse edges (`r:`-prefixed labels) so that undirected
/// breadth-first search is just forward traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationGraph {
    by_source: HashMap<usize, Vec<SyntacticRelation>>,
    len: usize,
}

impl RelationGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a list of relations.
    #[must_use]
    pub fn from_relations(relations: impl IntoIterator<Item = SyntacticRelation>) -> Self {
        let mut graph = Self::new();
        for r in relations {
            graph.add(r);
        }
        graph
    }

    /// Add one relation.
    pub fn add(&mut self, relation: SyntacticRelation) {
        self.by_source.entry(relation.source).or_default().push(relation);
        self.len += 1;
    }

    /// Relations whose source is `pos`.
    #[must_use]
    pub fn relations_from(&self, pos: usize) -> &[SyntacticRelation] {
        self.by_source.get(&pos).map_or(&[], Vec::as_slice)
    }

    /// Total number of relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the graph has no relations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
