//! Detected events and their arguments.
//!
//! An [`Event`] aggregates one or more [`EventMention`]s (textual
//! detections) plus document-level [`EventArgument`]s keyed by parent
//! identity. Both argument lists enforce their uniqueness invariant in
//! `add_argument`: a `(role, mention)` pair appears at most once per mention,
//! a `(role, parent)` pair at most once per event. Events are created
//! transiently per document, mutated once by the coreferencer (argument
//! union), then finalized.

use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;
use crate::mention::{MentionId, ParentId};
use crate::span::Span;

/// A role-labeled argument of an event, keyed by parent identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventArgument {
    /// Role label (e.g. `Attacker`, `Target`).
    pub role: String,
    /// Identity of the argument's parent entity / value / timex.
    pub parent: ParentId,
    /// Confidence of the binding.
    pub confidence: Confidence,
}

/// A role-labeled argument of a single event mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMentionArgument {
    /// Role label.
    pub role: String,
    /// The bound mention.
    pub mention: MentionId,
    /// Head span of the bound mention.
    pub span: Span,
    /// Parent identity of the bound mention.
    pub parent: ParentId,
    /// Confidence that the mention belongs to the event.
    pub confidence: Confidence,
    /// Confidence in the role label specifically.
    pub role_confidence: Confidence,
}

/// A single textual detection of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMention {
    /// Extent: hull over the anchor and all bound arguments.
    pub extent: Span,
    /// Anchor (trigger) span.
    pub anchor: Span,
    /// Anchor surface text.
    pub anchor_text: String,
    /// Bound arguments.
    pub arguments: Vec<EventMentionArgument>,
    /// Overall mention confidence.
    pub confidence: Confidence,
}

impl EventMention {
    /// Create a mention with no arguments yet.
    #[must_use]
    pub fn new(anchor: Span, anchor_text: impl Into<String>) -> Self {
        Self {
            extent: anchor,
            anchor,
            anchor_text: anchor_text.into(),
            arguments: Vec::new(),
            confidence: Confidence::MAX,
        }
    }

    /// Add an argument, de-duplicating identical `(role, mention)` pairs.
    ///
    /// Returns whether the argument was added. The extent grows to cover the
    /// new argument.
    pub fn add_argument(&mut self, arg: EventMentionArgument) -> bool {
        if self
            .arguments
            .iter()
            .any(|a| a.role == arg.role && a.mention == arg.mention)
        {
            return false;
        }
        self.extent = self.extent.hull(&arg.span);
        self.arguments.push(arg);
        true
    }

    /// Whether some argument already fills `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.arguments.iter().any(|a| a.role == role)
    }

    /// Whether `parent` is already bound to any role.
    #[must_use]
    pub fn uses_parent(&self, parent: &ParentId) -> bool {
        self.arguments.iter().any(|a| &a.parent == parent)
    }
}

/// A detected event: type, subtype, arguments, and its mentions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type (e.g. `Conflict`).
    pub event_type: String,
    /// Event subtype (e.g. `Attack`).
    pub event_subtype: String,
    /// Document-unique identifier, assigned at finalization.
    pub id: String,
    /// Document-level arguments keyed by parent identity.
    pub arguments: Vec<EventArgument>,
    /// The textual detections folded into this event.
    pub mentions: Vec<EventMention>,
    /// Overall event confidence.
    pub confidence: Confidence,
}

impl Event {
    /// Create an event with no mentions yet.
    #[must_use]
    pub fn new(event_type: impl Into<String>, event_subtype: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            event_subtype: event_subtype.into(),
            id: String::new(),
            arguments: Vec::new(),
            mentions: Vec::new(),
            confidence: Confidence::MAX,
        }
    }

    /// Add a document-level argument, de-duplicating `(role, parent)` pairs.
    ///
    /// Returns whether the argument was added.
    pub fn add_argument(&mut self, arg: EventArgument) -> bool {
        if self
            .arguments
            .iter()
            .any(|a| a.role == arg.role && a.parent == arg.parent)
        {
            return false;
        }
        self.arguments.push(arg);
        true
    }

    /// Append a mention and lift its arguments to the event level.
    pub fn add_mention(&mut self, mention: EventMention) {
        for a in &mention.arguments {
            self.add_argument(EventArgument {
                role: a.role.clone(),
                parent: a.parent.clone(),
                confidence: a.confidence,
            });
        }
        self.mentions.push(mention);
    }

    /// Whether this event and `other` share type and subtype.
    #[must_use]
    pub fn same_kind(&self, other: &Event) -> bool {
        self.event_type == other.event_type && self.event_subtype == other.event_subtype
    }
}
