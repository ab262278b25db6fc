//! Generalized argument descriptors with tiered fuzzy matching.

use serde::{Deserialize, Serialize};

use crate::mention::Mention;

/// How well a [`PatternNode`] matched a candidate mention.
///
/// Tiers are strictly ordered: `Generic < Type < Subtype < HeadText`. Every
/// mention reaches at least `Generic`; the tier is used both to accept or
/// reject a single binding and to rank competing full-pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchTier {
    /// Any mention matches anything.
    Generic,
    /// Mention type agrees.
    Type,
    /// Type and subtype agree.
    Subtype,
    /// Type, subtype, and exact head text agree.
    HeadText,
}

impl MatchTier {
    /// Numeric score of the tier, 1..=4.
    #[must_use]
    pub fn score(self) -> u32 {
        match self {
            MatchTier::Generic => 1,
            MatchTier::Type => 2,
            MatchTier::Subtype => 3,
            MatchTier::HeadText => 4,
        }
    }
}

/// A generalized argument descriptor: type, subtype, head text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternNode {
    /// Mention type the slot was acquired from (e.g. `PER`).
    pub mention_type: String,
    /// Subtype, when the example carried one.
    pub subtype: Option<String>,
    /// Head text of the example's argument.
    pub head_text: Option<String>,
}

impl PatternNode {
    /// Create a node.
    #[must_use]
    pub fn new(
        mention_type: impl Into<String>,
        subtype: Option<String>,
        head_text: Option<String>,
    ) -> Self {
        Self {
            mention_type: mention_type.into(),
            subtype,
            head_text,
        }
    }

    /// Generalize a mention into a node.
    #[must_use]
    pub fn from_mention(mention: &Mention) -> Self {
        Self {
            mention_type: mention.mention_type.clone(),
            subtype: mention.subtype.clone(),
            head_text: Some(mention.head_text.to_lowercase()),
        }
    }

    /// Match a candidate mention, returning the best tier it reaches.
    ///
    /// Non-entity mentions (value/time/anchor kinds) never exceed
    /// [`MatchTier::Type`].
    #[must_use]
    pub fn matches(&self, mention: &Mention) -> MatchTier {
        if !self.mention_type.eq_ignore_ascii_case(&mention.mention_type) {
            return MatchTier::Generic;
        }
        if !mention.is_entity() {
            return MatchTier::Type;
        }
        let subtype_agrees = match (&self.subtype, &mention.subtype) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        if !subtype_agrees {
            return MatchTier::Type;
        }
        let head_agrees = self
            .head_text
            .as_deref()
            .is_some_and(|h| h.eq_ignore_ascii_case(&mention.head_text));
        if head_agrees {
            MatchTier::HeadText
        } else {
            MatchTier::Subtype
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn node() -> PatternNode {
        PatternNode::new(
            "PER",
            Some("Group".to_string()),
            Some("rebels".to_string()),
        )
    }

    fn per(subtype: Option<&str>, head: &str) -> Mention {
        let mut m = Mention::entity("m1", "PER", Span::new(0, head.len()), head, "e1");
        if let Some(s) = subtype {
            m = m.with_subtype(s);
        }
        m
    }

    #[test]
    fn tiers_strictly_increase() {
        let n = node();
        let generic = n.matches(&Mention::entity("m", "GPE", Span::new(0, 4), "town", "e9"));
        let type_only = n.matches(&per(None, "soldiers"));
        let subtype = n.matches(&per(Some("Group"), "militants"));
        let head = n.matches(&per(Some("Group"), "Rebels"));
        assert!(generic < type_only);
        assert!(type_only < subtype);
        assert!(subtype < head);
        assert_eq!(head, MatchTier::HeadText);
    }

    #[test]
    fn scores_match_tier_order() {
        assert_eq!(MatchTier::Generic.score(), 1);
        assert_eq!(MatchTier::HeadText.score(), 4);
    }

    #[test]
    fn non_entity_capped_at_type() {
        let n = PatternNode::new("Money", Some("Cash".to_string()), Some("$100".to_string()));
        let v = Mention::value("m1", "Money", Span::new(0, 4), "$100", "v1")
            .with_subtype("Cash");
        assert_eq!(n.matches(&v), MatchTier::Type);
    }

    #[test]
    fn from_mention_lowercases_head() {
        let m = per(Some("Group"), "Rebels");
        let n = PatternNode::from_mention(&m);
        assert_eq!(n.head_text.as_deref(), Some("rebels"));
        assert_eq!(n.matches(&m), MatchTier::HeadText);
    }
}
