//! Event types and the event object handed to listeners.

use std::fmt;

use crate::dom::document::Document;
use crate::dom::node::NodeId;

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

/// The kind of a surface event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    MouseEnter,
    MouseLeave,
    MouseDown,
    MouseUp,
    KeyDown,
    Input,
    Submit,
    Focus,
    Blur,
    /// Fired by the scheduler when a transition on a node completes.
    TransitionEnd,
    /// Application-defined event name.
    Custom(String),
}

impl EventType {
    /// Parse a lowercase DOM event name. Unknown names become [`EventType::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "click" => Self::Click,
            "mouseenter" => Self::MouseEnter,
            "mouseleave" => Self::MouseLeave,
            "mousedown" => Self::MouseDown,
            "mouseup" => Self::MouseUp,
            "keydown" => Self::KeyDown,
            "input" => Self::Input,
            "submit" => Self::Submit,
            "focus" => Self::Focus,
            "blur" => Self::Blur,
            "transitionend" => Self::TransitionEnd,
            other => Self::Custom(other.to_owned()),
        }
    }

    /// The lowercase DOM event name.
    pub fn name(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::KeyDown => "keydown",
            Self::Input => "input",
            Self::Submit => "submit",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::TransitionEnd => "transitionend",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// An event travelling from its target up through the target's ancestors.
pub struct Event {
    pub kind: EventType,
    /// The node the event was dispatched on.
    pub target: NodeId,
    /// The node whose listener is currently running.
    pub current_target: NodeId,
    /// Payload: the key name for `KeyDown`, the field value for `Input` and
    /// `Submit`, free-form for custom events.
    pub detail: Option<String>,
    document: Document,
    stopped: bool,
}

impl Event {
    pub(crate) fn new(
        document: Document,
        kind: EventType,
        target: NodeId,
        detail: Option<String>,
    ) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            detail,
            document,
            stopped: false,
        }
    }

    /// The document the event is travelling through.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Stop the event from reaching further ancestors. Listeners on the
    /// current node still run.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }

    /// Key name of a `KeyDown` event.
    pub fn key(&self) -> Option<&str> {
        match self.kind {
            EventType::KeyDown => self.detail.as_deref(),
            _ => None,
        }
    }

    /// Field value carried by `Input` and `Submit` events.
    pub fn value(&self) -> Option<&str> {
        match self.kind {
            EventType::Input | EventType::Submit => self.detail.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("current_target", &self.current_target)
            .field("detail", &self.detail)
            .field("stopped", &self.stopped)
            .finish()
    }
}
