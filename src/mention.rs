//! Typed mentions consumed from the external entity/value/time providers.
//!
//! Mentions are inputs: the engine reads them, binds them to pattern slots,
//! and records their identities on event arguments, but never mutates them.
//! Polymorphism over the mention kinds is a tagged variant plus capability
//! accessors, not per-kind branching at call sites.

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// Opaque identity of a single mention, assigned by the mention provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MentionId(pub String);

impl MentionId {
    /// Create a mention id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Opaque identity of the parent entity, value, or time expression.
///
/// Two mentions of the same entity share a `ParentId`; the engine uses it for
/// argument-uniqueness checks and coreference conflict counting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParentId(pub String);

impl ParentId {
    /// Create a parent id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// The kind of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MentionKind {
    /// A mention of an entity (person, organization, location, ...).
    Entity,
    /// A mention of a value (money, percentage, crime, sentence, ...).
    Value,
    /// A mention of a time expression.
    Time,
    /// An event anchor treated as a mention (trigger word occurrence).
    Anchor,
}

/// A single textual occurrence of an entity, value, or time expression.
///
/// Owned by the external mention provider; read-only to this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// Provider-assigned identity of this occurrence.
    pub id: MentionId,
    /// Which kind of mention this is.
    pub kind: MentionKind,
    /// Type label (e.g. `PER`, `GPE`, `Numeric`, `Time`).
    pub mention_type: String,
    /// Optional subtype label (e.g. `Group`, `Nation`).
    pub subtype: Option<String>,
    /// Head span.
    pub head: Span,
    /// Full extent span.
    pub extent: Span,
    /// Extent surface text.
    pub text: String,
    /// Head surface text.
    pub head_text: String,
    /// Identity of the parent entity / value / timex.
    pub parent: ParentId,
}

impl Mention {
    /// Create an entity mention.
    #[must_use]
    pub fn entity(
        id: impl Into<String>,
        mention_type: impl Into<String>,
        head: Span,
        head_text: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        let head_text = head_text.into();
        Self {
            id: MentionId::new(id),
            kind: MentionKind::Entity,
            mention_type: mention_type.into(),
            subtype: None,
            head,
            extent: head,
            text: head_text.clone(),
            head_text,
            parent: ParentId::new(parent),
        }
    }

    /// Create a value mention.
    #[must_use]
    pub fn value(
        id: impl Into<String>,
        mention_type: impl Into<String>,
        head: Span,
        head_text: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            kind: MentionKind::Value,
            ..Self::entity(id, mention_type, head, head_text, parent)
        }
    }

    /// Create a time mention.
    #[must_use]
    pub fn time(
        id: impl Into<String>,
        head: Span,
        head_text: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            kind: MentionKind::Time,
            ..Self::entity(id, "Time", head, head_text, parent)
        }
    }

    /// Set the subtype label.
    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Set an extent wider than the head.
    #[must_use]
    pub fn with_extent(mut self, extent: Span, text: impl Into<String>) -> Self {
        self.extent = extent;
        self.text = text.into();
        self
    }

    /// Head span capability accessor.
    #[must_use]
    pub fn head(&self) -> Span {
        self.head
    }

    /// Extent span capability accessor.
    #[must_use]
    pub fn extent(&self) -> Span {
        self.extent
    }

    /// Whether this is an entity mention (as opposed to value/time/anchor).
    #[must_use]
    pub fn is_entity(&self) -> bool {
        self.kind == MentionKind::Entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_defaults_extent_to_head() {
        let m = Mention::entity("m1", "PER", Span::new(0, 6), "rebels", "e1");
        assert_eq!(m.extent(), m.head());
        assert_eq!(m.text, "rebels");
        assert!(m.is_entity());
    }

    #[test]
    fn with_extent_widens() {
        let m = Mention::entity("m1", "PER", Span::new(4, 10), "rebels", "e1")
            .with_extent(Span::new(0, 10), "the rebels");
        assert_eq!(m.extent(), Span::new(0, 10));
        assert_eq!(m.head(), Span::new(4, 10));
        assert_eq!(m.text, "the rebels");
    }

    #[test]
    fn value_and_time_are_not_entities() {
        let v = Mention::value("m2", "Money", Span::new(0, 4), "$100", "v1");
        let t = Mention::time("m3", Span::new(5, 10), "today", "t1");
        assert!(!v.is_entity());
        assert!(!t.is_entity());
        assert_eq!(t.mention_type, "Time");
    }
}
