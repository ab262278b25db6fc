//! Bounded dependency-graph fragments: construction from an instance graph
//! and breadth-first co-traversal matching.
//!
//! Construction expands breadth-first from the anchor, keeping the best path
//! to each discovered position (shortest; for ArgStructure patterns a
//! same-length tie prefers the path touching more predicate-argument edges),
//! capped at a hop radius. Positions are relabeled to pattern-local indices:
//! argument positions get their node-list index, the anchor its own index,
//! every other position a fresh negative free-variable id.
//!
//! Matching walks the pattern fragment and the instance graph together,
//! holding a one-to-many map from pattern node to instance positions so that
//! coordination ("rebels and militants attacked...") binds every conjunct.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::doc::Document;
use crate::mention::Mention;
use crate::pattern::node::{MatchTier, PatternNode};
use crate::pattern::PatternKind;
use crate::roles::valid_filler;
use crate::syntax::{RelationGraph, SyntacticRelation};

/// One edge of a pattern fragment, over pattern-local node ids.
///
/// Non-negative ids are node-list indices (arguments and the anchor);
/// negative ids are free variables whose `word` must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternEdge {
    /// Source pattern-local id.
    pub from: i32,
    /// Target pattern-local id.
    pub to: i32,
    /// Relation label.
    pub label: String,
    /// Word observed at the target position when the pattern was built.
    pub word: String,
}

/// A relabeled dependency-graph fragment rooted at the anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternGraph {
    /// Edges in construction order.
    pub edges: Vec<PatternEdge>,
}

impl PatternGraph {
    /// Whether the fragment links the anchor to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Best-path bookkeeping for one discovered position.
struct Discovered {
    hops: u32,
    arg_edges: u32,
    parent: Option<(usize, SyntacticRelation)>,
}

/// Build a pattern fragment connecting `anchor_pos` to the `targets`.
///
/// `targets` maps instance positions to their node-list indices. Targets not
/// reached within `radius` hops simply contribute nothing to the fragment.
#[must_use]
pub fn build_pattern(
    anchor_pos: usize,
    anchor_index: usize,
    targets: &[(usize, usize)],
    graph: &RelationGraph,
    kind: PatternKind,
    radius: u32,
) -> PatternGraph {
    let mut best: HashMap<usize, Discovered> = HashMap::new();
    best.insert(
        anchor_pos,
        Discovered {
            hops: 0,
            arg_edges: 0,
            parent: None,
        },
    );
    let mut frontier = vec![anchor_pos];
    let target_positions: HashSet<usize> = targets.iter().map(|(p, _)| *p).collect();

    for depth in 1..=radius {
        if target_positions.iter().all(|p| best.contains_key(p)) {
            break;
        }
        let mut next = Vec::new();
        for &pos in &frontier {
            let base_args = best[&pos].arg_edges;
            for rel in graph.relations_from(pos) {
                let arg_edges = base_args + u32::from(rel.is_arg_structure());
                match best.get_mut(&rel.target) {
                    None => {
                        best.insert(
                            rel.target,
                            Discovered {
                                hops: depth,
                                arg_edges,
                                parent: Some((pos, rel.clone())),
                            },
                        );
                        next.push(rel.target);
                    }
                    Some(existing) => {
                        // Same-length tie: ArgStructure patterns prefer the
                        // path with more predicate-argument edges.
                        if kind == PatternKind::ArgStructure
                            && existing.hops == depth
                            && arg_edges > existing.arg_edges
                        {
                            existing.arg_edges = arg_edges;
                            existing.parent = Some((pos, rel.clone()));
                        }
                    }
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    // Relabel positions and collect the edges of each kept path.
    let mut ids: HashMap<usize, i32> = HashMap::new();
    ids.insert(anchor_pos, anchor_index as i32);
    for &(pos, node_index) in targets {
        ids.insert(pos, node_index as i32);
    }
    let mut next_free = -1;
    let mut id_of = |pos: usize, ids: &mut HashMap<usize, i32>| -> i32 {
        *ids.entry(pos).or_insert_with(|| {
            let id = next_free;
            next_free -= 1;
            id
        })
    };

    let mut pattern = PatternGraph::default();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    for &(target_pos, _) in targets {
        if !best.contains_key(&target_pos) {
            continue;
        }
        let mut pos = target_pos;
        while let Some((parent_pos, rel)) = best[&pos].parent.as_ref().cloned() {
            if seen.insert((parent_pos, pos)) {
                let from = id_of(parent_pos, &mut ids);
                let to = id_of(pos, &mut ids);
                pattern.edges.push(PatternEdge {
                    from,
                    to,
                    label: rel.label.clone(),
                    word: rel.target_word.clone(),
                });
            }
            pos = parent_pos;
        }
    }
    pattern.edges.reverse();
    pattern
}

/// Unbounded first-arrival shortest path from `anchor_pos` to `target_pos`,
/// as a colon-joined label string.
///
/// Used for classifier feature extraction, not for pattern construction.
#[must_use]
pub fn build_syntactic_path(
    anchor_pos: usize,
    target_pos: usize,
    graph: &RelationGraph,
) -> Option<String> {
    if anchor_pos == target_pos {
        return Some(String::new());
    }
    let mut parent: HashMap<usize, (usize, String)> = HashMap::new();
    let mut queue = VecDeque::from([anchor_pos]);
    let mut visited = HashSet::from([anchor_pos]);
    while let Some(pos) = queue.pop_front() {
        for rel in graph.relations_from(pos) {
            if !visited.insert(rel.target) {
                continue;
            }
            parent.insert(rel.target, (pos, rel.label.clone()));
            if rel.target == target_pos {
                let mut labels = Vec::new();
                let mut at = target_pos;
                while let Some((prev, label)) = parent.get(&at) {
                    labels.push(label.clone());
                    at = *prev;
                }
                labels.reverse();
                return Some(labels.join(":"));
            }
            queue.push_back(rel.target);
        }
    }
    None
}

/// One argument binding produced by the graph matcher.
#[derive(Debug, Clone)]
pub struct GraphBinding<'a> {
    /// Node-list index of the bound slot.
    pub node_index: usize,
    /// The bound mention.
    pub mention: &'a Mention,
    /// Tier the slot's node reached on the mention.
    pub tier: MatchTier,
}

/// Result of matching a pattern fragment at an anchor.
#[derive(Debug, Clone)]
pub struct GraphMatch<'a> {
    /// Argument bindings, possibly several per slot (coordination).
    pub bindings: Vec<GraphBinding<'a>>,
    /// Sum of the best tier score per bound slot.
    pub score: u32,
}

/// Match `pattern` against the instance graph, anchors aligned.
///
/// Returns `None` when no argument slot could be bound. A failed edge pair
/// only discards that alternative; traversal continues over the rest.
#[must_use]
pub fn match_graph<'a>(
    pattern: &PatternGraph,
    anchor_index: usize,
    nodes: &[Option<PatternNode>],
    roles: &[Vec<String>],
    event_subtype: &str,
    anchor_pos: usize,
    doc: &'a Document,
) -> Option<GraphMatch<'a>> {
    let anchor_id = anchor_index as i32;
    let mut queue: VecDeque<(i32, usize)> = VecDeque::from([(anchor_id, anchor_pos)]);
    let mut visited: HashSet<(i32, usize)> = HashSet::from([(anchor_id, anchor_pos)]);
    // Which slot consumed each parent identity; one parent never fills two slots.
    let mut used_parents: HashMap<crate::mention::ParentId, usize> = HashMap::new();
    let mut bound: HashMap<usize, Vec<(&'a Mention, MatchTier)>> = HashMap::new();

    while let Some((pnode, pos)) = queue.pop_front() {
        for edge in pattern.edges.iter().filter(|e| e.from == pnode) {
            for rel in doc.graph.relations_from(pos) {
                if rel.label != edge.label {
                    continue;
                }
                let key = (edge.to, rel.target);
                if visited.contains(&key) {
                    continue;
                }
                if edge.to < 0 {
                    // Free variable: the bound word must match exactly.
                    if rel.target_word != edge.word {
                        continue;
                    }
                } else if edge.to != anchor_id {
                    let node_index = edge.to as usize;
                    let Some(node) = nodes.get(node_index).and_then(Option::as_ref) else {
                        continue;
                    };
                    let Some(mention) = doc.mention_with_head_at(rel.target) else {
                        continue;
                    };
                    let tier = node.matches(mention);
                    if tier < MatchTier::Type {
                        continue;
                    }
                    let node_roles = roles.get(node_index).map_or(&[][..], Vec::as_slice);
                    if !node_roles
                        .iter()
                        .all(|r| valid_filler(event_subtype, r, mention))
                    {
                        continue;
                    }
                    match used_parents.get(&mention.parent) {
                        Some(&slot) if slot != node_index => continue,
                        _ => {}
                    }
                    used_parents.insert(mention.parent.clone(), node_index);
                    let slot = bound.entry(node_index).or_default();
                    if let Some(existing) = slot.iter_mut().find(|(m, _)| m.id == mention.id) {
                        existing.1 = existing.1.max(tier);
                    } else {
                        slot.push((mention, tier));
                    }
                }
                visited.insert(key);
                queue.push_back(key);
            }
        }
    }

    if bound.is_empty() {
        return None;
    }
    let score = bound
        .values()
        .map(|ms| ms.iter().map(|(_, t)| t.score()).max().unwrap_or(0))
        .sum();
    let mut bindings: Vec<GraphBinding<'a>> = bound
        .into_iter()
        .flat_map(|(node_index, ms)| {
            ms.into_iter().map(move |(mention, tier)| GraphBinding {
                node_index,
                mention,
                tier,
            })
        })
        .collect();
    bindings.sort_by_key(|b| (b.node_index, b.mention.head.start));
    Some(GraphMatch { bindings, score })
}
