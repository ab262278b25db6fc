//! End-to-end matching scenarios over small hand-built documents.

use evex::coref::heuristic_merge_probability;
use evex::prelude::*;
use evex::MentionKind;

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
        .mention(Mention::entity("m1", "PER", Span::new(0, 6), "rebels", "e1").with_subtype("Group"))
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
fn subject_and_object_bind_to_their_roles() {
    let doc = attack_doc();
    let pattern =
        EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 5).unwrap();
    let m = pattern.matches(Span::new(7, 15), &doc).unwrap();
    assert!(m.score > 0);
    let em = &m.event.mentions[0];
    let attacker = em.arguments.iter().find(|a| a.role == "Attacker").unwrap();
    let target = em.arguments.iter().find(|a| a.role == "Target").unwrap();
    assert_eq!(attacker.mention, MentionId::new("m1"));
    assert_eq!(target.mention, MentionId::new("m2"));
}

#[test]
fn bound_entity_is_not_reused_for_another_role() {
    let doc = attack_doc();
    let pattern =
        EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 5).unwrap();

    // "rebels attacked rebels": subject and object are mentions of the same
    // entity, so only one of the two slots may bind.
    let same_entity = DocumentBuilder::new("rebels attacked rebels")
        .token(0, "rebels", "NNS")
        .token(7, "attacked", "VBD")
        .token(16, "rebels", "NNS")
        .mention(Mention::entity("n1", "PER", Span::new(0, 6), "rebels", "f1").with_subtype("Group"))
        .mention(
            Mention::entity("n2", "GPE", Span::new(16, 22), "rebels", "f1")
                .with_subtype("Population-Center"),
        )
        .relation(7, 0, "nsubj", "attacked", "rebels")
        .relation(7, 16, "dobj", "attacked", "rebels")
        .build();

    match pattern.matches(Span::new(7, 15), &same_entity) {
        Some(m) => {
            let em = &m.event.mentions[0];
            let mut parents: Vec<&ParentId> = em.arguments.iter().map(|a| &a.parent).collect();
            parents.sort();
            parents.dedup();
            assert_eq!(
                parents.len(),
                em.arguments.len(),
                "one entity bound under two roles"
            );
        }
        None => {} // rejecting the whole match is equally valid
    }
}

#[test]
fn edgeless_graph_pattern_is_never_selected() {
    let mut doc = attack_doc();
    doc.graph = evex::RelationGraph::new();
    let mut pattern =
        EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 5).unwrap();
    assert!(pattern.is_empty());
    pattern.evaluation.record(&["Attacker", "Target"], true);

    let mut store = PatternStore::new();
    store.add(pattern);
    let tagger = Tagger::new(store);
    // The anchor word matches the trigger token exactly, yet nothing fires.
    let doc = attack_doc();
    assert!(tagger.tag_document(&doc).unwrap().is_empty());
}

#[test]
fn conflicting_role_bindings_block_a_merge() {
    let coref = Coreferencer::default();
    let mut a = Event::new("Conflict", "Attack");
    let mut am = EventMention::new(Span::new(7, 15), "attacked");
    am.add_argument(evex::EventMentionArgument {
        role: "Attacker".into(),
        mention: MentionId::new("m1"),
        span: Span::new(0, 6),
        parent: ParentId::new("e1"),
        confidence: Confidence::MAX,
        role_confidence: Confidence::MAX,
    });
    a.add_mention(am);

    let mut b = Event::new("Conflict", "Attack");
    let mut bm = EventMention::new(Span::new(40, 48), "attacked");
    bm.add_argument(evex::EventMentionArgument {
        role: "Attacker".into(),
        mention: MentionId::new("m9"),
        span: Span::new(30, 38),
        parent: ParentId::new("e9"),
        confidence: Confidence::MAX,
        role_confidence: Confidence::MAX,
    });
    b.add_mention(bm);

    let features = coref.merge_features(&a, &b);
    assert!(features.conflicts > 0);
    let p = heuristic_merge_probability(&features);
    assert!(p.get() < CorefParams::default().merge_threshold);
    assert_eq!(coref.resolve(vec![a, b]).len(), 2);
}

#[test]
fn pipeline_tags_and_resolves() {
    let doc = attack_doc();
    let mut pattern =
        EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 5).unwrap();
    pattern.evaluation.record(&["Attacker", "Target"], true);
    let mut store = PatternStore::new();
    store.add(pattern);

    let tagger = Tagger::new(store);
    let coref = Coreferencer::default();
    let events = coref.resolve(tagger.tag_document(&doc).unwrap());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "EV1");
    assert_eq!(events[0].event_type, "Conflict");
    assert_eq!(events[0].mentions[0].anchor_text, "attacked");
    assert!(events[0]
        .mentions[0]
        .arguments
        .iter()
        .all(|a| a.mention != MentionId::new("") && a.role != ""));
}

#[test]
fn anchor_mentions_never_fill_argument_slots() {
    // A time mention over the anchor span must not satisfy an entity node.
    let doc = attack_doc();
    let pattern =
        EventPattern::from_example(&attack_example(), PatternKind::Syntax, &doc, 5).unwrap();

    let decoy = DocumentBuilder::new("today attacked a village")
        .token(0, "today", "NN")
        .token(6, "attacked", "VBD")
        .token(15, "a", "DT")
        .token(17, "village", "NN")
        .mention(Mention::time("t1", Span::new(0, 5), "today", "time1"))
        .mention(
            Mention::entity("n2", "GPE", Span::new(17, 24), "village", "f2")
                .with_subtype("Population-Center"),
        )
        .relation(6, 0, "nsubj", "attacked", "today")
        .relation(6, 17, "dobj", "attacked", "village")
        .build();

    if let Some(m) = pattern.matches(Span::new(6, 14), &decoy) {
        let em = &m.event.mentions[0];
        for a in &em.arguments {
            assert_ne!(a.mention, MentionId::new("t1"), "time mention bound to {}", a.role);
        }
        assert_eq!(
            decoy
                .mentions
                .iter()
                .find(|x| x.id == MentionId::new("t1"))
                .map(|x| x.kind),
            Some(MentionKind::Time)
        );
    }
}
