//! Chunk paths: the sequence of constituent-head labels between two text
//! positions, and their replay against new annotations.
//!
//! Building walks left to right from `from` to `to`, greedily taking the
//! longest constituent starting at the current position (ties broken by a
//! fixed category rank, clause-level constructs highest) and recording its
//! head label, or the literal token text where no constituent starts. Noise
//! elements advance the position without being recorded. Replay consumes a
//! stored path against real annotations with no backtracking.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::doc::{Constituent, Document};

/// Ordered sequence of chunk-head labels between two positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPath(pub Vec<String>);

impl ChunkPath {
    /// Number of recorded labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no labels were recorded (adjacent positions).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the colon-joined form produced by `Display`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            Self(Vec::new())
        } else {
            Self(s.split(':').map(str::to_string).collect())
        }
    }
}

impl fmt::Display for ChunkPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}

/// Rank of a constituent category: atomic categories lowest, clause-level
/// constructs highest. Used to break ties between constituents with the
/// same end position.
static CATEGORY_RANK: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for c in ["NP", "ADJP", "WHNP", "QP"] {
        m.insert(c, 1);
    }
    for c in ["VP", "PP"] {
        m.insert(c, 2);
    }
    for c in ["S", "SBAR"] {
        m.insert(c, 3);
    }
    m
});

/// Categories treated as noise: advance the position, record nothing.
static NOISE_CATEGORIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["ADVP", "RB", "RBR", "RBS", "QP", "TIMEX"].into_iter().collect()
});

fn category_rank(category: &str) -> u32 {
    CATEGORY_RANK.get(category).copied().unwrap_or(0)
}

fn is_noise_category(category: &str) -> bool {
    NOISE_CATEGORIES.contains(category)
}

fn is_noise_token(text: &str) -> bool {
    matches!(text, "\"" | "'" | "`" | "``" | "''" | "\u{201c}" | "\u{201d}")
}

/// The longest constituent starting at `pos` whose end does not exceed
/// `limit`; ties broken by category rank.
fn best_constituent_at(doc: &Document, pos: usize, limit: usize) -> Option<&Constituent> {
    doc.constituents_starting_at(pos)
        .filter(|c| c.span.end <= limit)
        .max_by_key(|c| (c.span.end, category_rank(&c.category)))
}

/// Compute the chunk path between positions `from` and `to`.
///
/// Returns `None` when the walk dead-ends: a position inside the range where
/// neither a constituent nor a token starts. This is a hard stop, not a skip;
/// the caller discards the candidate pattern.
#[must_use]
pub fn build(doc: &Document, from: usize, to: usize) -> Option<ChunkPath> {
    let mut labels = Vec::new();
    let mut pos = doc.skip_whitespace(from);
    while pos < to {
        if let Some(c) = best_constituent_at(doc, pos, to) {
            if !is_noise_category(&c.category) {
                labels.push(c.head.clone());
            }
            pos = doc.skip_whitespace(c.span.end);
        } else if let Some(t) = doc.token_starting_at(pos) {
            if !is_noise_category(&t.category) && !is_noise_token(&t.text) {
                labels.push(t.text.clone());
            }
            pos = doc.skip_whitespace(t.span.end);
        } else {
            return None;
        }
    }
    Some(ChunkPath(labels))
}

/// Advance past noise elements starting at `pos`, moving rightward.
fn skip_noise_right(doc: &Document, pos: usize) -> usize {
    let mut pos = doc.skip_whitespace(pos);
    loop {
        if let Some(c) = doc
            .constituents_starting_at(pos)
            .filter(|c| is_noise_category(&c.category))
            .max_by_key(|c| c.span.end)
        {
            pos = doc.skip_whitespace(c.span.end);
            continue;
        }
        if let Some(t) = doc.token_starting_at(pos) {
            if is_noise_category(&t.category) || is_noise_token(&t.text) {
                pos = doc.skip_whitespace(t.span.end);
                continue;
            }
        }
        return pos;
    }
}

/// Move `pos` left past whitespace and noise elements ending at it.
fn skip_noise_left(doc: &Document, pos: usize) -> usize {
    let mut pos = pos;
    loop {
        while pos > 0 && doc.text[..pos].ends_with(char::is_whitespace) {
            pos -= 1;
        }
        if let Some(c) = doc
            .constituents_ending_at(pos)
            .filter(|c| is_noise_category(&c.category))
            .min_by_key(|c| c.span.start)
        {
            pos = c.span.start;
            continue;
        }
        if let Some(t) = doc.token_ending_at(pos) {
            if is_noise_category(&t.category) || is_noise_token(&t.text) {
                pos = t.span.start;
                continue;
            }
        }
        return pos;
    }
}

/// Replay a path rightward from `pos`, returning the position just past the
/// last matched element, or `None` if any step fails to match.
#[must_use]
pub fn replay_right(doc: &Document, path: &ChunkPath, pos: usize) -> Option<usize> {
    let mut pos = pos;
    for label in &path.0 {
        pos = skip_noise_right(doc, pos);
        let matched = doc
            .constituents_starting_at(pos)
            .filter(|c| c.head == *label)
            .max_by_key(|c| (c.span.end, category_rank(&c.category)))
            .map(|c| c.span.end)
            .or_else(|| {
                doc.token_starting_at(pos)
                    .filter(|t| t.text == *label)
                    .map(|t| t.span.end)
            })?;
        pos = matched;
    }
    Some(skip_noise_right(doc, pos))
}

/// Replay a path leftward ending at `pos`, returning the start of the
/// leftmost matched element, or `None` if any step fails to match.
///
/// The path is consumed in reverse, matching constituents and tokens that
/// end at the current position.
#[must_use]
pub fn replay_left(doc: &Document, path: &ChunkPath, pos: usize) -> Option<usize> {
    let mut pos = pos;
    for label in path.0.iter().rev() {
        pos = skip_noise_left(doc, pos);
        let matched = doc
            .constituents_ending_at(pos)
            .filter(|c| c.head == *label)
            .min_by_key(|c| c.span.start)
            .map(|c| c.span.start)
            .or_else(|| {
                doc.token_ending_at(pos)
                    .filter(|t| t.text == *label)
                    .map(|t| t.span.start)
            })?;
        pos = matched;
    }
    Some(skip_noise_left(doc, pos))
}
