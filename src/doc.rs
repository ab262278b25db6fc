//! Per-document annotations consumed from the external analyzer.
//!
//! A [`Document`] bundles everything tagging reads: text, tokens with their
//! syntactic categories, constituents with head labels, sentence spans, typed
//! mentions, and the dependency relation graph. The engine never adds to or
//! mutates a document; [`DocumentBuilder`] exists for callers (and tests)
//! assembling one from analyzer output.

use serde::{Deserialize, Serialize};

use crate::mention::Mention;
use crate::span::Span;
use crate::syntax::{RelationGraph, SyntacticRelation};

/// A token with its span and syntactic category (part-of-speech tag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token span.
    pub span: Span,
    /// Surface text.
    pub text: String,
    /// Syntactic category, e.g. `VBD`, `NNS`.
    pub category: String,
}

/// A constituent with its span, category, and head word label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constituent {
    /// Constituent span.
    pub span: Span,
    /// Category, e.g. `NP`, `VP`, `S`.
    pub category: String,
    /// Head word of the constituent (the chunk label recorded in paths).
    pub head: String,
}

/// Read-only annotations for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Raw text.
    pub text: String,
    /// Tokens in offset order.
    pub tokens: Vec<Token>,
    /// Constituents (any order; looked up by boundary offsets).
    pub constituents: Vec<Constituent>,
    /// Sentence spans in offset order.
    pub sentences: Vec<Span>,
    /// Typed mentions from entity/value/time extraction.
    pub mentions: Vec<Mention>,
    /// Dependency / predicate-argument relation graph.
    pub graph: RelationGraph,
}

impl Document {
    /// The token starting at `pos`, if any.
    #[must_use]
    pub fn token_starting_at(&self, pos: usize) -> Option<&Token> {
        self.tokens.iter().find(|t| t.span.start == pos)
    }

    /// The token ending at `pos`, if any.
    #[must_use]
    pub fn token_ending_at(&self, pos: usize) -> Option<&Token> {
        self.tokens.iter().find(|t| t.span.end == pos)
    }

    /// All constituents starting at `pos`.
    pub fn constituents_starting_at(&self, pos: usize) -> impl Iterator<Item = &Constituent> {
        self.constituents.iter().filter(move |c| c.span.start == pos)
    }

    /// All constituents ending at `pos`.
    pub fn constituents_ending_at(&self, pos: usize) -> impl Iterator<Item = &Constituent> {
        self.constituents.iter().filter(move |c| c.span.end == pos)
    }

    /// The mention whose head starts at `pos`, preferring entity mentions.
    #[must_use]
    pub fn mention_with_head_at(&self, pos: usize) -> Option<&Mention> {
        let mut found: Option<&Mention> = None;
        for m in self.mentions.iter().filter(|m| m.head.start == pos) {
            if m.is_entity() {
                return Some(m);
            }
            found = found.or(Some(m));
        }
        found
    }

    /// The mention whose head ends at `pos`, preferring entity mentions.
    #[must_use]
    pub fn mention_with_head_ending_at(&self, pos: usize) -> Option<&Mention> {
        let mut found: Option<&Mention> = None;
        for m in self.mentions.iter().filter(|m| m.head.end == pos) {
            if m.is_entity() {
                return Some(m);
            }
            found = found.or(Some(m));
        }
        found
    }

    /// Mentions whose head lies inside `span`, in offset order.
    #[must_use]
    pub fn mentions_in(&self, span: Span) -> Vec<&Mention> {
        let mut out: Vec<&Mention> = self
            .mentions
            .iter()
            .filter(|m| span.contains(m.head.start))
            .collect();
        out.sort_by_key(|m| m.head.start);
        out
    }

    /// The sentence span containing `offset`, if any.
    #[must_use]
    pub fn sentence_containing(&self, offset: usize) -> Option<Span> {
        self.sentences.iter().copied().find(|s| s.contains(offset))
    }

    /// First non-whitespace position at or after `pos`.
    #[must_use]
    pub fn skip_whitespace(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.text.len());
        while pos < self.text.len() && !self.text.is_char_boundary(pos) {
            pos += 1;
        }
        let rest = &self.text[pos..];
        pos + rest.len() - rest.trim_start().len()
    }
}

/// Builder assembling a [`Document`] from analyzer output.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    doc: Document,
}

impl DocumentBuilder {
    /// Start a document from its raw text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            doc: Document {
                text: text.into(),
                ..Document::default()
            },
        }
    }

    /// Add a token starting at `start`; the end is `start + text.len()`.
    #[must_use]
    pub fn token(mut self, start: usize, text: &str, category: &str) -> Self {
        self.doc.tokens.push(Token {
            span: Span::new(start, start + text.len()),
            text: text.to_string(),
            category: category.to_string(),
        });
        self
    }

    /// Add a constituent.
    #[must_use]
    pub fn constituent(mut self, start: usize, end: usize, category: &str, head: &str) -> Self {
        self.doc.constituents.push(Constituent {
            span: Span::new(start, end),
            category: category.to_string(),
            head: head.to_string(),
        });
        self
    }

    /// Add a sentence span.
    #[must_use]
    pub fn sentence(mut self, start: usize, end: usize) -> Self {
        self.doc.sentences.push(Span::new(start, end));
        self
    }

    /// Add a mention.
    #[must_use]
    pub fn mention(mut self, mention: Mention) -> Self {
        self.doc.mentions.push(mention);
        self
    }

    /// Add a dependency relation and its inverse.
    ///
    /// The inverse gets an `r:`-prefixed label and carries the source word,
    /// so the graph can be walked in either direction.
    #[must_use]
    pub fn relation(
        mut self,
        source: usize,
        target: usize,
        label: &str,
        source_word: &str,
        target_word: &str,
    ) -> Self {
        self.doc
            .graph
            .add(SyntacticRelation::new(source, target, label, target_word));
        self.doc.graph.add(SyntacticRelation::new(
            target,
            source,
            format!("r:{label}"),
            source_word,
        ));
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(mut self) -> Document {
        self.doc.tokens.sort_by_key(|t| t.span.start);
        self.doc.sentences.sort();
        if self.doc.sentences.is_empty() && !self.doc.text.is_empty() {
            self.doc.sentences.push(Span::new(0, self.doc.text.len()));
        }
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        DocumentBuilder::new("rebels attacked a village")
            .token(0, "rebels", "NNS")
            .token(7, "attacked", "VBD")
            .token(16, "a", "DT")
            .token(18, "village", "NN")
            .constituent(0, 6, "NP", "rebels")
            .constituent(7, 15, "VP", "attacked")
            .constituent(16, 25, "NP", "village")
            .build()
    }

    #[test]
    fn token_lookup_by_boundary() {
        let doc = sample();
        assert_eq!(doc.token_starting_at(7).unwrap().text, "attacked");
        assert_eq!(doc.token_ending_at(6).unwrap().text, "rebels");
        assert!(doc.token_starting_at(3).is_none());
    }

    #[test]
    fn default_sentence_covers_text() {
        let doc = sample();
        assert_eq!(doc.sentence_containing(20), Some(Span::new(0, 25)));
    }

    #[test]
    fn skip_whitespace_stops_at_word() {
        let doc = sample();
        assert_eq!(doc.skip_whitespace(6), 7);
        assert_eq!(doc.skip_whitespace(0), 0);
        assert_eq!(doc.skip_whitespace(999), 25);
    }

    #[test]
    fn mention_with_head_prefers_entity() {
        let doc = DocumentBuilder::new("x")
            .mention(crate::mention::Mention::time("t1", Span::new(0, 1), "x", "p1"))
            .mention(crate::mention::Mention::entity(
                "m1",
                "PER",
                Span::new(0, 1),
                "x",
                "e1",
            ))
            .build();
        assert!(doc.mention_with_head_at(0).unwrap().is_entity());
    }
}
