//! Pattern store: anchor-word index over learned patterns, with a
//! line-oriented, human-readable persistence format.
//!
//! The format round-trips losslessly. Loading is lenient: a malformed line
//! or entry is logged and skipped, and the rest of the store still loads.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::error::{Error, Result};
use crate::pattern::chunk::ChunkPath;
use crate::pattern::dependency::{PatternEdge, PatternGraph};
use crate::pattern::evaluation::PatternEvaluation;
use crate::pattern::event_pattern::EventPattern;
use crate::pattern::node::PatternNode;
use crate::pattern::PatternKind;

/// Learned patterns indexed by normalized anchor word.
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    by_anchor: HashMap<String, Vec<EventPattern>>,
    len: usize,
}

impl PatternStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern; identical templates (everything but the evaluation
    /// counters) are not duplicated.
    pub fn add(&mut self, pattern: EventPattern) {
        let bucket = self.by_anchor.entry(pattern.anchor_text.clone()).or_default();
        if bucket.iter().any(|p| same_template(p, &pattern)) {
            return;
        }
        bucket.push(pattern);
        self.len += 1;
    }

    /// Patterns whose anchor word is `word` (already normalized).
    #[must_use]
    pub fn patterns_for(&self, word: &str) -> &[EventPattern] {
        self.by_anchor.get(word).map_or(&[], Vec::as_slice)
    }

    /// Mutable view of every pattern (used by the validation pass).
    pub fn patterns_mut(&mut self) -> impl Iterator<Item = &mut EventPattern> {
        self.by_anchor.values_mut().flatten()
    }

    /// Every pattern, in anchor-word order.
    pub fn patterns(&self) -> impl Iterator<Item = &EventPattern> {
        let mut keys: Vec<&String> = self.by_anchor.keys().collect();
        keys.sort();
        keys.into_iter().flat_map(|k| self.by_anchor[k].iter())
    }

    /// Number of stored patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the store holds no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Write every pattern in the line-oriented format.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        for pattern in self.patterns() {
            write_pattern(writer, pattern)?;
        }
        log::info!("saved {} event patterns", self.len);
        Ok(())
    }

    /// Load a store from the line-oriented format.
    ///
    /// Malformed lines and entries are logged and skipped.
    pub fn load<R: BufRead>(reader: R) -> Result<Self> {
        let mut store = Self::new();
        let mut entry: Option<Vec<String>> = None;
        let mut skipped = 0usize;
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line {
                "<pattern>" => entry = Some(Vec::new()),
                "</pattern>" => {
                    if let Some(lines) = entry.take() {
                        match parse_pattern(&lines) {
                            Ok(pattern) => store.add(pattern),
                            Err(e) => {
                                log::warn!("skipping pattern ending at line {}: {e}", lineno + 1);
                                skipped += 1;
                            }
                        }
                    }
                }
                other => match entry.as_mut() {
                    Some(lines) => lines.push(other.to_string()),
                    None => {
                        log::warn!("skipping stray line {}: {other:?}", lineno + 1);
                        skipped += 1;
                    }
                },
            }
        }
        log::info!(
            "loaded {} event patterns ({} entries skipped)",
            store.len,
            skipped
        );
        Ok(store)
    }
}

/// Template equality, ignoring evaluation counters.
fn same_template(a: &EventPattern, b: &EventPattern) -> bool {
    a.kind == b.kind
        && a.nodes == b.nodes
        && a.roles == b.roles
        && a.paths == b.paths
        && a.graph == b.graph
        && a.anchor_index == b.anchor_index
        && a.anchor_text == b.anchor_text
        && a.event_type == b.event_type
        && a.event_subtype == b.event_subtype
}

fn field(opt: &Option<String>) -> &str {
    opt.as_deref().unwrap_or("*")
}

fn write_pattern<W: Write>(w: &mut W, p: &EventPattern) -> Result<()> {
    writeln!(w, "<pattern>")?;
    writeln!(w, "kind: {}", p.kind.label())?;
    for (i, node) in p.nodes.iter().enumerate() {
        match node {
            None => writeln!(w, "node: anchor={}", p.anchor_text)?,
            Some(n) => writeln!(
                w,
                "node: {} | {} | {}",
                n.mention_type,
                field(&n.subtype),
                field(&n.head_text)
            )?,
        }
        for role in &p.roles[i] {
            writeln!(w, "role: {i} {role}")?;
        }
    }
    writeln!(w, "event: {} {}", p.event_type, p.event_subtype)?;
    if let Some(paths) = &p.paths {
        for (i, path) in paths.iter().enumerate() {
            match path {
                // An empty path (adjacent nodes) is just the index; `-`
                // marks an unconstructible gap.
                Some(path) if path.is_empty() => writeln!(w, "path: {i}")?,
                Some(path) => writeln!(w, "path: {i} {path}")?,
                None => writeln!(w, "path: {i} -")?,
            }
        }
    }
    if let Some(graph) = &p.graph {
        for e in &graph.edges {
            writeln!(w, "edge: {} {} {} {}", e.from, e.to, e.label, e.word)?;
        }
    }
    writeln!(w, "eval: {} {}", p.evaluation.successes(), p.evaluation.failures())?;
    for (role, s, f) in p.evaluation.role_counts() {
        writeln!(w, "evalrole: {role} {s} {f}")?;
    }
    writeln!(w, "</pattern>")?;
    Ok(())
}

fn split_kv(line: &str) -> Result<(&str, &str)> {
    line.split_once(':')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| Error::parse(format!("expected `key: value`, got {line:?}")))
}

fn parse_node(value: &str) -> Result<PatternNode> {
    let mut parts = value.split('|').map(str::trim);
    let mention_type = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::parse(format!("bad node line {value:?}")))?;
    let subtype = parts.next().filter(|s| *s != "*").map(str::to_string);
    let head = parts.next().filter(|s| *s != "*").map(str::to_string);
    Ok(PatternNode::new(mention_type, subtype, head))
}

fn parse_pattern(lines: &[String]) -> Result<EventPattern> {
    let mut kind = None;
    let mut nodes: Vec<Option<PatternNode>> = Vec::new();
    let mut roles: Vec<(usize, String)> = Vec::new();
    let mut anchor_text = None;
    let mut event = None;
    let mut paths: Vec<(usize, Option<ChunkPath>)> = Vec::new();
    let mut edges: Vec<PatternEdge> = Vec::new();
    let mut evaluation = PatternEvaluation::new();
    let mut saw_paths = false;
    let mut saw_edges = false;

    for line in lines {
        let (key, value) = match split_kv(line) {
            Ok(kv) => kv,
            Err(e) => {
                log::warn!("skipping malformed pattern line {line:?}: {e}");
                continue;
            }
        };
        let parsed: Result<()> = (|| {
            match key {
                "kind" => {
                    kind = Some(
                        PatternKind::from_label(value)
                            .ok_or_else(|| Error::parse(format!("unknown kind {value:?}")))?,
                    );
                }
                "node" => {
                    if let Some(anchor) = value.strip_prefix("anchor=") {
                        anchor_text = Some((nodes.len(), anchor.to_string()));
                        nodes.push(None);
                    } else {
                        nodes.push(Some(parse_node(value)?));
                    }
                }
                "role" => {
                    let (index, role) = value
                        .split_once(' ')
                        .ok_or_else(|| Error::parse(format!("bad role line {value:?}")))?;
                    let index: usize = index
                        .parse()
                        .map_err(|_| Error::parse(format!("bad role index {index:?}")))?;
                    roles.push((index, role.trim().to_string()));
                }
                "event" => {
                    let (ty, subtype) = value
                        .split_once(' ')
                        .ok_or_else(|| Error::parse(format!("bad event line {value:?}")))?;
                    event = Some((ty.to_string(), subtype.trim().to_string()));
                }
                "path" => {
                    saw_paths = true;
                    let (index, path) = match value.split_once(' ') {
                        Some((i, p)) => (i, p.trim()),
                        // Bare index: an empty path between adjacent nodes.
                        None => (value, ""),
                    };
                    let index: usize = index
                        .parse()
                        .map_err(|_| Error::parse(format!("bad path index {index:?}")))?;
                    let path = match path {
                        "-" => None,
                        "" => Some(ChunkPath(Vec::new())),
                        p => Some(ChunkPath::parse(p)),
                    };
                    paths.push((index, path));
                }
                "edge" => {
                    saw_edges = true;
                    let mut parts = value.split_whitespace();
                    let (from, to, label, word) = (
                        parts.next(),
                        parts.next(),
                        parts.next(),
                        parts.next(),
                    );
                    let (Some(from), Some(to), Some(label), Some(word)) = (from, to, label, word)
                    else {
                        return Err(Error::parse(format!("bad edge line {value:?}")));
                    };
                    edges.push(PatternEdge {
                        from: from
                            .parse()
                            .map_err(|_| Error::parse(format!("bad edge id {from:?}")))?,
                        to: to
                            .parse()
                            .map_err(|_| Error::parse(format!("bad edge id {to:?}")))?,
                        label: label.to_string(),
                        word: word.to_string(),
                    });
                }
                "eval" => {
                    let (s, f) = value
                        .split_once(' ')
                        .ok_or_else(|| Error::parse(format!("bad eval line {value:?}")))?;
                    evaluation.restore(
                        s.parse()
                            .map_err(|_| Error::parse(format!("bad eval count {s:?}")))?,
                        f.trim()
                            .parse()
                            .map_err(|_| Error::parse(format!("bad eval count {f:?}")))?,
                    );
                }
                "evalrole" => {
                    let mut parts = value.split_whitespace();
                    let (Some(role), Some(s), Some(f)) =
                        (parts.next(), parts.next(), parts.next())
                    else {
                        return Err(Error::parse(format!("bad evalrole line {value:?}")));
                    };
                    evaluation.restore_role(
                        role,
                        s.parse()
                            .map_err(|_| Error::parse(format!("bad evalrole count {s:?}")))?,
                        f.parse()
                            .map_err(|_| Error::parse(format!("bad evalrole count {f:?}")))?,
                    );
                }
                other => {
                    return Err(Error::parse(format!("unknown key {other:?}")));
                }
            }
            Ok(())
        })();
        if let Err(e) = parsed {
            log::warn!("skipping malformed pattern line {line:?}: {e}");
        }
    }

    let kind = kind.ok_or_else(|| Error::parse("pattern entry missing kind"))?;
    let (anchor_index, anchor_text) =
        anchor_text.ok_or_else(|| Error::parse("pattern entry missing anchor node"))?;
    let (event_type, event_subtype) =
        event.ok_or_else(|| Error::parse("pattern entry missing event line"))?;
    if nodes.iter().filter(|n| n.is_none()).count() != 1 {
        return Err(Error::parse("pattern entry must have exactly one anchor"));
    }

    let mut role_sets = vec![Vec::new(); nodes.len()];
    for (index, role) in roles {
        let slot = role_sets
            .get_mut(index)
            .ok_or_else(|| Error::parse(format!("role index {index} out of range")))?;
        slot.push(role);
    }

    let paths = if saw_paths {
        let mut list = vec![None; nodes.len().saturating_sub(1)];
        for (index, path) in paths {
            let slot = list
                .get_mut(index)
                .ok_or_else(|| Error::parse(format!("path index {index} out of range")))?;
            *slot = path;
        }
        Some(list)
    } else {
        None
    };

    Ok(EventPattern {
        kind,
        nodes,
        roles: role_sets,
        paths,
        graph: saw_edges.then(|| PatternGraph { edges }).or(match kind {
            PatternKind::Chunk => None,
            _ => Some(PatternGraph::default()),
        }),
        anchor_index,
        anchor_text,
        event_type,
        event_subtype,
        evaluation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::DocumentBuilder;
    use crate::mention::{Mention, MentionId};
    use crate::pattern::event_pattern::EventExample;
    use crate::span::Span;

    fn sample_pattern(kind: PatternKind) -> EventPattern {
        let doc = DocumentBuilder::new("rebels attacked a village")
            .token(0, "rebels", "NNS")
            .token(7, "attacked", "VBD")
            .token(16, "a", "DT")
            .token(18, "village", "NN")
            .mention(
                Mention::entity("m1", "PER", Span::new(0, 6), "rebels", "e1")
                    .with_subtype("Group"),
            )
            .mention(Mention::entity("m2", "GPE", Span::new(18, 25), "village", "e2"))
            .relation(7, 0, "nsubj", "attacked", "rebels")
            .relation(7, 18, "dobj", "attacked", "village")
            .build();
        let example = EventExample {
            anchor: Span::new(7, 15),
            event_type: "Conflict".into(),
            event_subtype: "Attack".into(),
            arguments: vec![
                ("Attacker".into(), MentionId::new("m1")),
                ("Target".into(), MentionId::new("m2")),
            ],
        };
        let mut p = EventPattern::from_example(&example, kind, &doc, 3).unwrap();
        p.evaluation.record(&["Attacker", "Target"], true);
        p.evaluation.record(&["Attacker"], false);
        p
    }

    fn roundtrip(store: &PatternStore) -> PatternStore {
        let mut buf = Vec::new();
        store.save(&mut buf).unwrap();
        PatternStore::load(buf.as_slice()).unwrap()
    }

    #[test]
    fn roundtrip_preserves_patterns() {
        let mut store = PatternStore::new();
        store.add(sample_pattern(PatternKind::Syntax));
        store.add(sample_pattern(PatternKind::Chunk));
        let restored = roundtrip(&store);
        assert_eq!(restored.len(), 2);
        let originals: Vec<&EventPattern> = store.patterns().collect();
        let restored_patterns: Vec<&EventPattern> = restored.patterns().collect();
        assert_eq!(originals.len(), restored_patterns.len());
        for (a, b) in originals.iter().zip(&restored_patterns) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn roundtrip_preserves_index() {
        let mut store = PatternStore::new();
        store.add(sample_pattern(PatternKind::Syntax));
        let restored = roundtrip(&store);
        assert_eq!(restored.patterns_for("attacked").len(), 1);
        assert!(restored.patterns_for("bombed").is_empty());
    }

    #[test]
    fn add_dedupes_identical_templates() {
        let mut store = PatternStore::new();
        store.add(sample_pattern(PatternKind::Syntax));
        store.add(sample_pattern(PatternKind::Syntax));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn malformed_entry_is_skipped() {
        let mut buf = Vec::new();
        let mut store = PatternStore::new();
        store.add(sample_pattern(PatternKind::Syntax));
        store.save(&mut buf).unwrap();
        let mut text = String::from_utf8(buf).unwrap();
        text.push_str("<pattern>\nkind: bogus\n</pattern>\n");
        let restored = PatternStore::load(text.as_bytes()).unwrap();
        assert_eq!(restored.len(), 1);
    }

    #[test]
    fn malformed_line_does_not_kill_entry() {
        let text = "\
<pattern>
kind: chunk
node: PER | * | rebels
role: 0 Attacker
node: anchor=attacked
this line has no colon-separated key
event: Conflict Attack
path: 0 NP
eval: 3 1
</pattern>
";
        let store = PatternStore::load(text.as_bytes()).unwrap();
        assert_eq!(store.len(), 1);
        let p = store.patterns_for("attacked").first().unwrap().clone();
        assert_eq!(p.roles[0], vec!["Attacker".to_string()]);
        assert_eq!(p.evaluation.successes(), 3);
    }

    #[test]
    fn entry_without_anchor_is_rejected() {
        let text = "\
<pattern>
kind: chunk
node: PER | * | rebels
event: Conflict Attack
</pattern>
";
        let store = PatternStore::load(text.as_bytes()).unwrap();
        assert!(store.is_empty());
    }
}
