use std::fmt::Write as _;

use super::{Document, Marker, NodeId, NodeKind};

/// Character used to mask redacted text in exported content.
pub const MASK_CHAR: char = '█';

/// Returns the mask for `text`: a run of [`MASK_CHAR`] half as long as the
/// text (in characters), never shorter than one.
#[must_use]
pub fn mask(text: &str) -> String {
    let len = (text.chars().count() / 2).max(1);
    std::iter::repeat_n(MASK_CHAR, len).collect()
}

/// Escapes text for inclusion in markup content or a quoted attribute.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl Document {
    /// Renders the subtree at `node` as markup. Every text leaf is escaped and
    /// markers become the element's `class` attribute.
    #[must_use]
    pub fn render_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => out.push_str(&escape(text)),
            Some(NodeKind::Element { tag }) => {
                let markers = self.markers(node);
                if markers.is_empty() {
                    let _ = write!(out, "<{tag}>");
                } else {
                    let _ = write!(out, "<{tag} class=\"{}\">", escape(&markers.class_list()));
                }
                for &child in self.children(node) {
                    self.write_markup(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
            None => {}
        }
    }

    /// Returns the visible text of the subtree at `node` with every redacted
    /// element replaced by its [`mask`].
    #[must_use]
    pub fn export_masked(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_masked(node, &mut out);
        out
    }

    fn write_masked(&self, node: NodeId, out: &mut String) {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Element { .. }) if self.markers(node).contains(Marker::Redacted) => {
                out.push_str(&mask(&self.text_content(node)));
            }
            Some(NodeKind::Element { .. }) => {
                for &child in self.children(node) {
                    self.write_masked(child, out);
                }
            }
            None => {}
        }
    }
}
