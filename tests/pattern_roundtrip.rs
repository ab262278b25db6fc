//! Persistence round trips over the line-oriented pattern format.

use std::io::BufReader;

use evex::prelude::*;

fn attack_doc() -> Document {
    DocumentBuilder::new("rebels attacked a village")
        .token(0, "rebels", "NNS")
        .token(7, "attacked", "VBD")
        .token(16, "a", "DT")
        .token(18, "village", "NN")
        .constituent(0, 6, "NP", "rebels")
        .constituent(16, 25, "NP", "village")
        .mention(Mention::entity("m1", "PER", Span::new(0, 6), "rebels", "e1").with_subtype("Group"))
        .mention(
            Mention::entity("m2", "GPE", Span::new(18, 25), "village", "e2")
                .with_subtype("Population-Center"),
        )
        .relation(7, 0, "nsubj", "attacked", "rebels")
        .relation(7, 18, "dobj", "attacked", "village")
        .build()
}

fn example(subtype: &str) -> EventExample {
    EventExample {
        anchor: Span::new(7, 15),
        event_type: "Conflict".into(),
        event_subtype: subtype.into(),
        arguments: vec![
            ("Attacker".into(), MentionId::new("m1")),
            ("Target".into(), MentionId::new("m2")),
        ],
    }
}

fn learned_store(doc: &Document) -> PatternStore {
    let mut store = PatternStore::new();
    for kind in [PatternKind::Chunk, PatternKind::Syntax, PatternKind::ArgStructure] {
        let mut p = EventPattern::from_example(&example("Attack"), kind, doc, 5).unwrap();
        p.evaluation.record(&["Attacker", "Target"], true);
        p.evaluation.record(&["Attacker"], false);
        store.add(p);
    }
    store
}

#[test]
fn save_load_preserves_every_pattern() {
    let doc = attack_doc();
    let store = learned_store(&doc);

    let mut buf = Vec::new();
    store.save(&mut buf).unwrap();
    let loaded = PatternStore::load(&mut BufReader::new(buf.as_slice())).unwrap();

    assert_eq!(loaded.len(), store.len());
    let before: Vec<&EventPattern> = store.patterns().collect();
    let after: Vec<&EventPattern> = loaded.patterns().collect();
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.roles, b.roles);
        assert_eq!(a.paths, b.paths);
        assert_eq!(a.graph, b.graph);
        assert_eq!(a.anchor_index, b.anchor_index);
        assert_eq!(a.anchor_text, b.anchor_text);
        assert_eq!(a.event_type, b.event_type);
        assert_eq!(a.event_subtype, b.event_subtype);
        assert_eq!(a.evaluation, b.evaluation);
    }
}

#[test]
fn reloaded_patterns_still_match() {
    let doc = attack_doc();
    let store = learned_store(&doc);

    let mut buf = Vec::new();
    store.save(&mut buf).unwrap();
    let loaded = PatternStore::load(&mut BufReader::new(buf.as_slice())).unwrap();

    let tagger = Tagger::new(loaded);
    let events = tagger.tag_document(&doc).unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].arguments.iter().any(|a| a.role == "Attacker"));
}

#[test]
fn anchor_index_survives_a_round_trip() {
    let doc = attack_doc();
    let mut store = learned_store(&doc);
    let mut other = EventPattern::from_example(&example("Attack"), PatternKind::Syntax, &doc, 5)
        .unwrap();
    other.anchor_text = "bombed".into();
    other.evaluation.record(&["Attacker"], true);
    store.add(other);

    let mut buf = Vec::new();
    store.save(&mut buf).unwrap();
    let loaded = PatternStore::load(&mut BufReader::new(buf.as_slice())).unwrap();

    assert_eq!(loaded.patterns_for("attacked").len(), 3);
    assert_eq!(loaded.patterns_for("bombed").len(), 1);
    assert!(loaded.patterns_for("exploded").is_empty());
}

#[test]
fn malformed_entries_are_skipped_not_fatal() {
    let doc = attack_doc();
    let store = learned_store(&doc);

    let mut buf = Vec::new();
    store.save(&mut buf).unwrap();
    let mut text = String::from_utf8(buf).unwrap();
    text.push_str("stray line outside any pattern\n");
    text.push_str("<pattern>\nkind: syntax\n</pattern>\n");
    text.push_str("<pattern>\nnot even close\n</pattern>\n");

    let loaded = PatternStore::load(&mut BufReader::new(text.as_bytes())).unwrap();
    assert_eq!(loaded.len(), store.len());
}

#[test]
fn distinct_subtypes_stay_distinct() {
    let doc = attack_doc();
    let mut store = PatternStore::new();
    for subtype in ["Attack", "Demonstrate"] {
        let p = EventPattern::from_example(&example(subtype), PatternKind::Syntax, &doc, 5)
            .unwrap();
        store.add(p);
    }
    let mut buf = Vec::new();
    store.save(&mut buf).unwrap();
    let loaded = PatternStore::load(&mut BufReader::new(buf.as_slice())).unwrap();
    let subtypes: Vec<&str> = loaded
        .patterns()
        .map(|p| p.event_subtype.as_str())
        .collect();
    assert!(subtypes.contains(&"Attack"));
    assert!(subtypes.contains(&"Demonstrate"));
}
