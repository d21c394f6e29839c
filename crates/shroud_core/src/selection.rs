//! Manual redaction of a user text selection.

use crate::document::{MarkerSet, NodeId, Piece, TextTree};
use crate::error::SelectionError;
use crate::span::{DisplayMode, SpanId, SpanRegistry, SpanSource};

/// A caret position: a text leaf and a byte offset into its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextPosition {
    /// The text leaf.
    pub node: NodeId,
    /// Byte offset into the leaf's text.
    pub offset: usize,
}

impl TextPosition {
    /// Creates a position.
    #[must_use]
    pub const fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A user selection between two positions. The anchor may come after the
/// focus when the user selected backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextSelection {
    /// Where the selection started.
    pub anchor: TextPosition,
    /// Where the selection ended.
    pub focus: TextPosition,
}

impl TextSelection {
    /// Creates a selection between two positions.
    #[must_use]
    pub const fn new(anchor: TextPosition, focus: TextPosition) -> Self {
        Self { anchor, focus }
    }

    /// Selects the byte range `start..end` of a single leaf.
    #[must_use]
    pub const fn within(node: NodeId, start: usize, end: usize) -> Self {
        Self::new(TextPosition::new(node, start), TextPosition::new(node, end))
    }

    /// Returns `true` if the selection covers no text.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Wraps the selected text in a new redacted span.
///
/// Only selections inside one text leaf can be wrapped; anything else would
/// partially overlap an element boundary. On error the tree and registry are
/// unchanged.
pub fn redact_selection<T: TextTree + ?Sized>(
    tree: &mut T,
    spans: &mut SpanRegistry,
    selection: &TextSelection,
    display_mode: DisplayMode,
) -> Result<SpanId, SelectionError> {
    let TextSelection { anchor, focus } = *selection;
    for node in [anchor.node, focus.node] {
        if !tree.contains(node) {
            return Err(SelectionError::UnknownNode(node));
        }
        if tree.leaf_text(node).is_none() {
            return Err(SelectionError::NotText(node));
        }
    }
    if anchor.node != focus.node {
        return Err(SelectionError::CrossesBoundary {
            start: anchor.node,
            end: focus.node,
        });
    }

    let leaf = anchor.node;
    if tree.parent(leaf).is_none() {
        return Err(SelectionError::Detached(leaf));
    }
    let text = tree.leaf_text(leaf).map(str::to_owned).unwrap_or_default();
    for offset in [anchor.offset, focus.offset] {
        if !text.is_char_boundary(offset) {
            return Err(SelectionError::InvalidOffset { node: leaf, offset });
        }
    }

    let (start, end) = if anchor.offset <= focus.offset {
        (anchor.offset, focus.offset)
    } else {
        (focus.offset, anchor.offset)
    };
    if start == end {
        return Err(SelectionError::Empty);
    }
    if tree.within_marked(leaf, MarkerSet::SCAN_BARRIER) {
        return Err(SelectionError::AlreadyRedacted);
    }

    let selected = &text[start..end];
    let mut pieces = Vec::with_capacity(3);
    if start > 0 {
        pieces.push(Piece::Text(&text[..start]));
    }
    let span_index = pieces.len();
    pieces.push(Piece::Redacted {
        text: selected,
        markers: display_mode.markers(),
    });
    if end < text.len() {
        pieces.push(Piece::Text(&text[end..]));
    }

    let created = tree.replace_leaf(leaf, &pieces);
    let Some(&node) = created.get(span_index) else {
        return Err(SelectionError::Detached(leaf));
    };

    Ok(spans.register(node, selected, display_mode, SpanSource::Selection))
}
