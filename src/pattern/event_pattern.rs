//! The template entity: built from one annotated example, matched against
//! new text through the chunk walker or the dependency fragment, carrying
//! the evaluation statistics used to rank it.

use serde::{Deserialize, Serialize};

use crate::doc::Document;
use crate::error::{Error, Result};
use crate::event::{Event, EventMention, EventMentionArgument};
use crate::mention::{Mention, MentionId};
use crate::pattern::chunk::{self, ChunkPath};
use crate::pattern::dependency::{self, PatternGraph};
use crate::pattern::evaluation::PatternEvaluation;
use crate::pattern::node::{MatchTier, PatternNode};
use crate::pattern::{normalize_word, PatternKind};
use crate::roles::valid_filler;
use crate::span::Span;

/// One annotated training instance: an anchor plus role-labeled arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventExample {
    /// Anchor (trigger) span.
    pub anchor: Span,
    /// Event type, e.g. `Conflict`.
    pub event_type: String,
    /// Event subtype, e.g. `Attack`.
    pub event_subtype: String,
    /// `(role, mention)` pairs; a mention may appear under several roles.
    pub arguments: Vec<(String, MentionId)>,
}

/// A learned event template.
///
/// Invariant: exactly one `None` entry in `nodes`, at `anchor_index`. A
/// pattern may carry both representations when both were constructible from
/// its example; `kind` records the one it was acquired under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPattern {
    /// Representation the pattern was acquired under.
    pub kind: PatternKind,
    /// Ordered node list; `None` marks the anchor slot.
    pub nodes: Vec<Option<PatternNode>>,
    /// Role set per node (empty for the anchor).
    pub roles: Vec<Vec<String>>,
    /// Chunk paths between consecutive nodes, when constructible.
    pub paths: Option<Vec<Option<ChunkPath>>>,
    /// Dependency fragment, for Syntax/ArgStructure kinds.
    pub graph: Option<PatternGraph>,
    /// Index of the anchor slot in `nodes`.
    pub anchor_index: usize,
    /// Normalized anchor word.
    pub anchor_text: String,
    /// Target event type.
    pub event_type: String,
    /// Target event subtype.
    pub event_subtype: String,
    /// Success/failure statistics from the validation pass.
    pub evaluation: PatternEvaluation,
}

/// A scored, bound match of a pattern at one anchor.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    /// The single-mention event the bindings convert to.
    pub event: Event,
    /// Raw match score: sum of node tier scores over bound slots.
    pub score: u32,
    /// Whether the winning representation was the dependency fragment.
    pub via_graph: bool,
    /// Roles bound in this match (input to the evaluation gate).
    pub roles: Vec<String>,
}

/// An argument binding shared by both matchers.
struct Binding<'a> {
    node_index: usize,
    mention: &'a Mention,
    tier: MatchTier,
}

impl EventPattern {
    /// Build a pattern from one annotated example.
    ///
    /// Distinct argument mentions are sorted by head start offset, the anchor
    /// inserted at its sorted slot; duplicate argument mentions collapse to
    /// one node with a unioned role set. Chunk paths between consecutive
    /// nodes are always attempted; the dependency fragment is built for the
    /// Syntax and ArgStructure kinds within `radius` hops.
    pub fn from_example(
        example: &EventExample,
        kind: PatternKind,
        doc: &Document,
        radius: u32,
    ) -> Result<Self> {
        // Collapse duplicate argument mentions, preserving first-seen order.
        let mut distinct: Vec<(&Mention, Vec<String>)> = Vec::new();
        for (role, id) in &example.arguments {
            let mention = doc
                .mentions
                .iter()
                .find(|m| &m.id == id)
                .ok_or_else(|| Error::invalid_input(format!("unknown mention {}", id.0)))?;
            match distinct.iter_mut().find(|(m, _)| m.id == *id) {
                Some((_, roles)) => {
                    if !roles.contains(role) {
                        roles.push(role.clone());
                    }
                }
                None => distinct.push((mention, vec![role.clone()])),
            }
        }
        distinct.sort_by_key(|(m, _)| m.head.start);

        let anchor_index = distinct
            .iter()
            .position(|(m, _)| m.head.start >= example.anchor.start)
            .unwrap_or(distinct.len());

        let mut nodes: Vec<Option<PatternNode>> = Vec::with_capacity(distinct.len() + 1);
        let mut roles: Vec<Vec<String>> = Vec::with_capacity(distinct.len() + 1);
        let mut spans: Vec<Span> = Vec::with_capacity(distinct.len() + 1);
        for (i, (mention, mention_roles)) in distinct.iter().enumerate() {
            if i == anchor_index {
                nodes.push(None);
                roles.push(Vec::new());
                spans.push(example.anchor);
            }
            nodes.push(Some(PatternNode::from_mention(mention)));
            roles.push(mention_roles.clone());
            spans.push(mention.head);
        }
        if anchor_index == distinct.len() {
            nodes.push(None);
            roles.push(Vec::new());
            spans.push(example.anchor);
        }
        debug_assert_eq!(nodes.iter().filter(|n| n.is_none()).count(), 1);

        let anchor_text = doc
            .token_starting_at(example.anchor.start)
            .map(|t| normalize_word(&t.text))
            .unwrap_or_else(|| {
                normalize_word(
                    doc.text
                        .get(example.anchor.start..example.anchor.end)
                        .unwrap_or(""),
                )
            });
        if anchor_text.is_empty() {
            return Err(Error::invalid_input("anchor span has no text"));
        }

        let path_list: Vec<Option<ChunkPath>> = spans
            .windows(2)
            .map(|w| chunk::build(doc, w[0].end, w[1].start))
            .collect();
        let paths = if path_list.iter().any(Option::is_some) || spans.len() == 1 {
            Some(path_list)
        } else {
            None
        };

        let graph = match kind {
            PatternKind::Chunk => None,
            PatternKind::Syntax | PatternKind::ArgStructure => {
                let targets: Vec<(usize, usize)> = spans
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != anchor_index)
                    .map(|(i, s)| (s.start, i))
                    .collect();
                Some(dependency::build_pattern(
                    example.anchor.start,
                    anchor_index,
                    &targets,
                    &doc.graph,
                    kind,
                    radius,
                ))
            }
        };

        Ok(Self {
            kind,
            nodes,
            roles,
            paths,
            graph,
            anchor_index,
            anchor_text,
            event_type: example.event_type.clone(),
            event_subtype: example.event_subtype.clone(),
            evaluation: PatternEvaluation::new(),
        })
    }

    /// Whether the pattern can never fire: a Syntax/ArgStructure pattern
    /// whose built fragment has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind != PatternKind::Chunk && self.graph.as_ref().map_or(true, PatternGraph::is_empty)
    }

    /// Match this pattern at an anchor span.
    ///
    /// The chunk walker and the graph matcher run independently; the higher
    /// raw score wins, with an exact tie going to the graph result (its
    /// bindings carry constraints the chunk walk does not check).
    #[must_use]
    pub fn matches(&self, anchor: Span, doc: &Document) -> Option<PatternMatch> {
        if self.is_empty() {
            return None;
        }
        let chunk_result = self.match_chunks(anchor, doc);
        let graph_result = self.match_graph(anchor, doc);

        let (bindings, score, via_graph) = match (chunk_result, graph_result) {
            (None, None) => return None,
            (Some((b, s)), None) => (b, s, false),
            (None, Some((b, s))) => (b, s, true),
            (Some((cb, cs)), Some((gb, gs))) => {
                if cs > gs {
                    (cb, cs, false)
                } else {
                    (gb, gs, true)
                }
            }
        };

        let anchor_text = doc
            .text
            .get(anchor.start..anchor.end)
            .unwrap_or(&self.anchor_text)
            .to_string();
        let mut mention = EventMention::new(anchor, anchor_text);
        let mut roles_bound = Vec::new();
        for b in &bindings {
            for role in &self.roles[b.node_index] {
                let added = mention.add_argument(EventMentionArgument {
                    role: role.clone(),
                    mention: b.mention.id.clone(),
                    span: b.mention.head,
                    parent: b.mention.parent.clone(),
                    confidence: crate::confidence::Confidence::MAX,
                    role_confidence: crate::confidence::Confidence::MAX,
                });
                if added && !roles_bound.contains(role) {
                    roles_bound.push(role.clone());
                }
            }
        }
        if mention.arguments.is_empty() {
            return None;
        }
        let mut event = Event::new(self.event_type.clone(), self.event_subtype.clone());
        event.add_mention(mention);
        Some(PatternMatch {
            event,
            score,
            via_graph,
            roles: roles_bound,
        })
    }

    /// Linear chunk replay: walk rightward from the anchor over the stored
    /// paths, then leftward, binding one mention per node. No backtracking;
    /// any failed step fails the whole walk.
    fn match_chunks<'a>(
        &self,
        anchor: Span,
        doc: &'a Document,
    ) -> Option<(Vec<Binding<'a>>, u32)> {
        let paths = self.paths.as_ref()?;
        if self.nodes.len() == 1 {
            return None;
        }
        let mut bindings: Vec<Binding<'a>> = Vec::new();
        let mut used: Vec<&crate::mention::ParentId> = Vec::new();

        let mut pos = anchor.end;
        for i in self.anchor_index + 1..self.nodes.len() {
            let path = paths[i - 1].as_ref()?;
            let at = chunk::replay_right(doc, path, pos)?;
            let mention = doc.mention_with_head_at(at)?;
            let binding = self.bind(i, mention, &mut used)?;
            pos = mention.head.end;
            bindings.push(binding);
        }

        let mut pos = anchor.start;
        for i in (0..self.anchor_index).rev() {
            let path = paths[i].as_ref()?;
            let at = chunk::replay_left(doc, path, pos)?;
            let mention = doc.mention_with_head_ending_at(at)?;
            let binding = self.bind(i, mention, &mut used)?;
            pos = mention.head.start;
            bindings.push(binding);
        }

        if bindings.is_empty() {
            return None;
        }
        let score = bindings.iter().map(|b| b.tier.score()).sum();
        Some((bindings, score))
    }

    /// One slot binding with the shared constraints: tier at least Type,
    /// role-valid for the subtype, parent not already consumed.
    fn bind<'a>(
        &self,
        node_index: usize,
        mention: &'a Mention,
        used: &mut Vec<&'a crate::mention::ParentId>,
    ) -> Option<Binding<'a>> {
        let node = self.nodes[node_index].as_ref()?;
        let tier = node.matches(mention);
        if tier < MatchTier::Type {
            return None;
        }
        if !self.roles[node_index]
            .iter()
            .all(|r| valid_filler(&self.event_subtype, r, mention))
        {
            return None;
        }
        if used.contains(&&mention.parent) {
            return None;
        }
        used.push(&mention.parent);
        Some(Binding {
            node_index,
            mention,
            tier,
        })
    }

    fn match_graph<'a>(
        &self,
        anchor: Span,
        doc: &'a Document,
    ) -> Option<(Vec<Binding<'a>>, u32)> {
        let graph = self.graph.as_ref()?;
        let result = dependency::match_graph(
            graph,
            self.anchor_index,
            &self.nodes,
            &self.roles,
            &self.event_subtype,
            anchor.start,
            doc,
        )?;
        let bindings = result
            .bindings
            .into_iter()
            .map(|b| Binding {
                node_index: b.node_index,
                mention: b.mention,
                tier: b.tier,
            })
            .collect();
        Some((bindings, result.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::DocumentBuilder;

    // "rebels attacked a village"
    //  0      7        16 18
    fn attack_doc() -> Document {
        DocumentBuilder::new("rebels attacked a village")
            .token(0, "rebels", "NNS")
            .token(7, "attacked", "VBD")
            .token(16, "a", "DT")
            .token(18, "village", "NN")
            .constituent(0, 6, "NP", "rebels")
            .constituent(16, 25, "NP", "village")
            .mention(
                Mention::entity("m1", "PER", Span::new(0, 6), "rebels", "e1")
                    .with_subtype("Group"),
            )
            .mention(
                Mention::entity("m2", "GPE", Span::new(18, 25), "village", "e2")
                    .with_subtype("Population-Center"),
            )
            .relation(7, 0, "nsubj", "attacked", "rebels")
            .relation(7, 18, "dobj", "attacked", "village")
            .build()
    }

    fn attack_example() -> EventExample {
        EventExample {
            anchor: Span::new(7, 15),
            event_type: "Conflict".into(),
            event_subtype: "Attack".into(),
            arguments: vec![
                ("Attacker".into(), MentionId::new("m1")),
                ("Target".into(), MentionId::new("m2")),
            ],
        }
    }

    #[test]
    fn from_example_sorts_nodes_and_inserts_anchor() {
        let doc = attack_doc();
        let p =
            EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 3).unwrap();
        assert_eq!(p.nodes.len(), 3);
        assert_eq!(p.anchor_index, 1);
        assert!(p.nodes[1].is_none());
        assert_eq!(p.nodes[0].as_ref().unwrap().mention_type, "PER");
        assert_eq!(p.nodes[2].as_ref().unwrap().mention_type, "GPE");
        assert_eq!(p.roles[0], vec!["Attacker".to_string()]);
        assert_eq!(p.anchor_text, "attacked");
        assert_eq!(p.nodes.iter().filter(|n| n.is_none()).count(), 1);
    }

    #[test]
    fn duplicate_argument_mentions_collapse() {
        let doc = attack_doc();
        let mut ex = attack_example();
        ex.arguments.push(("Victim".into(), MentionId::new("m1")));
        let p = EventPattern::from_example(&ex, PatternKind::Syntax, &doc, 3).unwrap();
        assert_eq!(p.nodes.len(), 3);
        assert_eq!(p.roles[0], vec!["Attacker".to_string(), "Victim".into()]);
    }

    #[test]
    fn unknown_argument_mention_is_an_error() {
        let doc = attack_doc();
        let mut ex = attack_example();
        ex.arguments.push(("Target".into(), MentionId::new("m99")));
        assert!(EventPattern::from_example(&ex, PatternKind::Chunk, &doc, 3).is_err());
    }

    #[test]
    fn edgeless_graph_pattern_is_empty() {
        let mut doc = attack_doc();
        doc.graph = crate::syntax::RelationGraph::new();
        let p =
            EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 3).unwrap();
        assert!(p.is_empty());
        assert!(p.matches(Span::new(7, 15), &doc).is_none());
    }

    #[test]
    fn chunk_pattern_is_never_empty() {
        let doc = attack_doc();
        let p =
            EventPattern::from_example(&attack_example(), PatternKind::Chunk, &doc, 3).unwrap();
        assert!(!p.is_empty());
    }

    #[test]
    fn matches_binds_both_roles() {
        let doc = attack_doc();
        let p =
            EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 3).unwrap();
        let m = p.matches(Span::new(7, 15), &doc).unwrap();
        assert!(m.score > 0);
        let em = &m.event.mentions[0];
        let attacker = em.arguments.iter().find(|a| a.role == "Attacker").unwrap();
        let target = em.arguments.iter().find(|a| a.role == "Target").unwrap();
        assert_eq!(attacker.mention, MentionId::new("m1"));
        assert_eq!(target.mention, MentionId::new("m2"));
        // Extent covers anchor and both arguments.
        assert_eq!(em.extent, Span::new(0, 25));
    }

    #[test]
    fn matches_transfers_to_new_sentence() {
        let doc = attack_doc();
        let p =
            EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 3).unwrap();

        // "soldiers attacked a town" with the same dependency shape.
        let other = DocumentBuilder::new("soldiers attacked a town")
            .token(0, "soldiers", "NNS")
            .token(9, "attacked", "VBD")
            .token(18, "a", "DT")
            .token(20, "town", "NN")
            .mention(
                Mention::entity("n1", "PER", Span::new(0, 8), "soldiers", "f1")
                    .with_subtype("Group"),
            )
            .mention(
                Mention::entity("n2", "GPE", Span::new(20, 24), "town", "f2")
                    .with_subtype("Population-Center"),
            )
            .relation(9, 0, "nsubj", "attacked", "soldiers")
            .relation(9, 20, "dobj", "attacked", "town")
            .build();
        let m = p.matches(Span::new(9, 17), &other).unwrap();
        let em = &m.event.mentions[0];
        assert!(em.arguments.iter().any(|a| a.role == "Attacker"));
        assert!(em.arguments.iter().any(|a| a.role == "Target"));
    }

    #[test]
    fn no_mention_bound_to_two_roles() {
        let doc = attack_doc();
        let p =
            EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 3).unwrap();
        let m = p.matches(Span::new(7, 15), &doc).unwrap();
        let em = &m.event.mentions[0];
        for a in &em.arguments {
            let twice = em
                .arguments
                .iter()
                .filter(|b| b.mention == a.mention && b.role != a.role)
                .count();
            assert_eq!(twice, 0, "mention {:?} bound to two roles", a.mention);
        }
    }

    #[test]
    fn graph_wins_score_tie() {
        let doc = attack_doc();
        let p =
            EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 3).unwrap();
        // Both representations exist and score identically on the source
        // sentence; the decided rule picks the graph result.
        let m = p.matches(Span::new(7, 15), &doc).unwrap();
        assert!(m.via_graph);
    }

    #[test]
    fn chunk_only_pattern_matches_without_graph() {
        let doc = attack_doc();
        let p =
            EventPattern::from_example(&attack_example(), PatternKind::Chunk, &doc, 3).unwrap();
        let m = p.matches(Span::new(7, 15), &doc).unwrap();
        assert!(!m.via_graph);
        assert!(m.event.mentions[0]
            .arguments
            .iter()
            .any(|a| a.role == "Target"));
    }
}
