//! Event dispatch: bubble path computation and listener invocation.
//!
//! [`EventDispatcher::dispatch`] walks the path from the target up to `body`,
//! running every matching listener on each node. Handlers are cloned out of
//! the registry before they run, so a handler may freely mutate the surface,
//! add or remove listeners, or dispatch further events.

use super::kind::{Event, EventType};
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;

// ---------------------------------------------------------------------------
// EventDispatcher
// ---------------------------------------------------------------------------

/// Stateless event router.
pub struct EventDispatcher;

impl EventDispatcher {
    /// Compute the bubble path from `start` up to the root (inclusive).
    ///
    /// Returns `[start, parent, grandparent, ..., root]`.
    /// If `start` does not exist in the surface, returns an empty vec.
    pub fn bubble_path(dom: &Dom, start: NodeId) -> Vec<NodeId> {
        if !dom.contains(start) {
            return Vec::new();
        }
        let mut path = vec![start];
        path.extend(dom.ancestors(start));
        path
    }

    /// Deliver an event to `target` and its ancestors.
    ///
    /// Returns `true` if at least one listener ran.
    pub fn dispatch(
        document: &Document,
        target: NodeId,
        kind: EventType,
        detail: Option<String>,
    ) -> bool {
        let path = Self::bubble_path(&document.dom(), target);
        if path.is_empty() {
            tracing::debug!(?target, %kind, "dispatch to a missing node dropped");
            return false;
        }

        let mut event = Event::new(document.clone(), kind, target, detail);
        let mut handled = false;
        for node in path {
            let handlers = document
                .dom_mut()
                .listeners
                .take_matching(node, &event.kind);
            event.current_target = node;
            for handler in handlers {
                handler(&mut event);
                handled = true;
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        handled
    }
}

// ===========================================================================
// Tests
// ===========================================================================
