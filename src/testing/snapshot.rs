//! Snapshot rendering helpers.
//!
//! Functions for converting a surface subtree into an indented plain-text
//! outline suitable for snapshot testing and assertions.

use std::fmt::Write as _;

use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render the subtree at `node` as an outline, one node per line.
///
/// Elements print as their tag followed by attributes in name order
/// (`div [data-route="/"]`); text leaves print quoted. Children are indented
/// two spaces. The final line has no trailing newline.
///
/// # Examples
///
/// ```ignore
/// use sapling::testing::render_to_string;
///
/// let outline = render_to_string(&doc, doc.body());
/// assert!(outline.contains("\"Rooms\""));
/// ```
pub fn render_to_string(document: &Document, node: NodeId) -> String {
    render_with_styles(document, node, &[])
}

/// Like [`render_to_string`], also listing the given style properties of
/// each element that sets them (`{color: red}`).
pub fn render_with_styles(document: &Document, node: NodeId, properties: &[&str]) -> String {
    let dom = document.dom();
    let mut lines = Vec::new();
    outline(&dom, node, 0, properties, &mut lines);
    lines.join("\n")
}

/// Outline of everything under `body`, excluding `body` itself.
pub fn body_to_string(document: &Document) -> String {
    let dom = document.dom();
    let mut lines = Vec::new();
    for &child in dom.children(dom.body()) {
        outline(&dom, child, 0, &[], &mut lines);
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn outline(dom: &Dom, node: NodeId, depth: usize, properties: &[&str], lines: &mut Vec<String>) {
    let Some(data) = dom.get(node) else {
        return;
    };
    let mut line = "  ".repeat(depth);
    if data.is_text() {
        let _ = write!(line, "{:?}", data.text.as_deref().unwrap_or_default());
        lines.push(line);
        return;
    }

    line.push_str(&data.tag);
    if !data.attributes.is_empty() {
        let attrs: Vec<String> = data
            .attributes
            .iter()
            .map(|(name, value)| format!("{name}={value:?}"))
            .collect();
        let _ = write!(line, " [{}]", attrs.join(" "));
    }
    let styles: Vec<String> = properties
        .iter()
        .filter_map(|p| data.style.get(p).map(|v| format!("{p}: {v}")))
        .collect();
    if !styles.is_empty() {
        let _ = write!(line, " {{{}}}", styles.join("; "));
    }
    if let Some(text) = &data.text {
        let _ = write!(line, " {text:?}");
    }
    lines.push(line);

    for &child in dom.children(node) {
        outline(dom, child, depth + 1, properties, lines);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
