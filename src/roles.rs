//! Role-validity checks: is a mention a legal filler for a role, given the
//! event subtype?
//!
//! The table below covers the common subtypes of the evaluation ontology.
//! Pairs not in the table fall back to kind-level checks only, so custom
//! ontologies work without extending the table; the table exists to reject
//! the bindings that are wrong for any ontology variant (a weapon as an
//! Attacker, an organization as a Victim).

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::mention::{Mention, MentionKind};

/// Allowed mention types per (event subtype, role).
static FILLERS: Lazy<HashMap<(&'static str, &'static str), &'static [&'static str]>> =
    Lazy::new(|| {
        let mut m: HashMap<(&str, &str), &[&str]> = HashMap::new();
        m.insert(("Attack", "Attacker"), &["PER", "ORG", "GPE"]);
        m.insert(
            ("Attack", "Target"),
            &["PER", "ORG", "GPE", "LOC", "FAC", "VEH", "WEA"],
        );
        m.insert(("Attack", "Instrument"), &["WEA", "VEH"]);
        m.insert(("Die", "Agent"), &["PER", "ORG", "GPE"]);
        m.insert(("Die", "Victim"), &["PER"]);
        m.insert(("Die", "Instrument"), &["WEA", "VEH"]);
        m.insert(("Injure", "Agent"), &["PER", "ORG", "GPE"]);
        m.insert(("Injure", "Victim"), &["PER"]);
        m.insert(("Meet", "Entity"), &["PER", "ORG", "GPE"]);
        m.insert(("Transport", "Agent"), &["PER", "ORG", "GPE"]);
        m.insert(("Transport", "Artifact"), &["PER", "WEA", "VEH"]);
        m.insert(("Transport", "Vehicle"), &["VEH"]);
        m.insert(("Arrest-Jail", "Person"), &["PER"]);
        m.insert(("Arrest-Jail", "Agent"), &["PER", "ORG", "GPE"]);
        m.insert(("Start-Position", "Person"), &["PER"]);
        m.insert(("Start-Position", "Entity"), &["ORG", "GPE"]);
        m
    });

/// Mention types acceptable for the `Place` role.
const PLACE_TYPES: &[&str] = &["GPE", "LOC", "FAC"];

/// Whether `mention` is a semantically valid filler for `role` in an event
/// of `event_subtype`.
#[must_use]
pub fn valid_filler(event_subtype: &str, role: &str, mention: &Mention) -> bool {
    // Temporal roles take time mentions and nothing else.
    if role.starts_with("Time") {
        return mention.kind == MentionKind::Time;
    }
    if mention.kind == MentionKind::Time {
        return false;
    }
    if role == "Place" {
        return PLACE_TYPES.contains(&mention.mention_type.as_str());
    }
    if let Some(allowed) = FILLERS.get(&(event_subtype, role)) {
        return allowed.contains(&mention.mention_type.as_str());
    }
    true
}
