//! Redacted spans and the registry that owns them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::render::mask;
use crate::document::{Marker, MarkerSet, NodeId};

/// Stable handle to a [`RedactedSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId(u64);

impl SpanId {
    /// Returns the raw numeric identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "span-{}", self.0)
    }
}

/// Display state of a span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealState {
    /// The text is masked.
    #[default]
    Hidden,
    /// The original text is visible.
    Revealed,
}

/// How a span is laid out by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Flows with the surrounding text.
    #[default]
    Inline,
    /// Drawn as a solid block.
    Block,
}

impl DisplayMode {
    /// Markers a freshly created span carries for this mode.
    #[must_use]
    pub const fn markers(self) -> MarkerSet {
        match self {
            Self::Inline => MarkerSet::only(Marker::Redacted),
            Self::Block => MarkerSet::only(Marker::Redacted).with(Marker::BlockDisplay),
        }
    }
}

/// What created a span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum SpanSource {
    /// A pattern match found by the scanner.
    Pattern {
        /// ID of the pattern that matched.
        pattern_id: Arc<str>,
    },
    /// A user selection wrapped by hand.
    Selection,
    /// Text wrapped through the host API.
    Api,
}

/// A region of text flagged as sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactedSpan {
    /// Handle of this span.
    pub id: SpanId,
    /// Element node wrapping the text.
    pub node: NodeId,
    /// The text being hidden.
    pub original_text: Box<str>,
    /// Layout mode.
    pub display_mode: DisplayMode,
    /// Current display state.
    pub reveal_state: RevealState,
    /// Set while the span is revealed through a touch toggle.
    pub touch_locked: bool,
    /// What created the span.
    pub source: SpanSource,
}

impl RedactedSpan {
    /// Returns `true` if the span is currently revealed.
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        matches!(self.reveal_state, RevealState::Revealed)
    }

    /// Returns the export mask for this span's text.
    #[must_use]
    pub fn masked(&self) -> String {
        mask(&self.original_text)
    }

    /// Returns the markers the span's node should carry in its current state.
    #[must_use]
    pub fn markers(&self) -> MarkerSet {
        let mut markers = self.display_mode.markers();
        markers.set(Marker::Revealed, self.is_revealed());
        markers.set(Marker::TouchLocked, self.touch_locked);
        markers
    }
}

/// Live set of redacted spans, indexed by ID and by node.
#[derive(Debug, Default)]
pub struct SpanRegistry {
    spans: BTreeMap<SpanId, RedactedSpan>,
    by_node: HashMap<NodeId, SpanId>,
    next_id: u64,
}

impl SpanRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new hidden span wrapping `node`.
    pub fn register(&mut self, node: NodeId, original_text: &str, display_mode: DisplayMode, source: SpanSource) -> SpanId {
        let id = SpanId(self.next_id);
        self.next_id += 1;

        self.spans.insert(
            id,
            RedactedSpan {
                id,
                node,
                original_text: original_text.into(),
                display_mode,
                reveal_state: RevealState::Hidden,
                touch_locked: false,
                source,
            },
        );
        self.by_node.insert(node, id);
        id
    }

    /// Returns the span with this ID.
    #[must_use]
    pub fn get(&self, id: SpanId) -> Option<&RedactedSpan> {
        self.spans.get(&id)
    }

    /// Returns the span with this ID for mutation.
    pub fn get_mut(&mut self, id: SpanId) -> Option<&mut RedactedSpan> {
        self.spans.get_mut(&id)
    }

    /// Returns the span whose wrapping element is `node`.
    #[must_use]
    pub fn by_node(&self, node: NodeId) -> Option<SpanId> {
        self.by_node.get(&node).copied()
    }

    /// Returns `true` if the registry holds a span with this ID.
    #[must_use]
    pub fn contains(&self, id: SpanId) -> bool {
        self.spans.contains_key(&id)
    }

    /// Iterates over spans in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &RedactedSpan> {
        self.spans.values()
    }

    /// Returns the IDs of all revealed spans.
    #[must_use]
    pub fn revealed(&self) -> Vec<SpanId> {
        self.spans.values().filter(|s| s.is_revealed()).map(|s| s.id).collect()
    }

    /// Returns the number of spans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if no spans are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Removes and returns every span in creation order. IDs are never reused.
    pub fn drain(&mut self) -> Vec<RedactedSpan> {
        self.by_node.clear();
        std::mem::take(&mut self.spans).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(count: usize) -> (SpanRegistry, Vec<SpanId>) {
        let mut registry = SpanRegistry::new();
        let ids = (0..count)
            .map(|i| registry.register(NodeId::new(i + 10), "secret", DisplayMode::Inline, SpanSource::Api))
            .collect();
        (registry, ids)
    }

    #[test]
    fn register_creates_hidden_unlocked_span() {
        let (registry, ids) = registry_with(1);
        let span = registry.get(ids[0]).unwrap();
        assert_eq!(span.reveal_state, RevealState::Hidden);
        assert!(!span.touch_locked);
        assert_eq!(span.original_text.as_ref(), "secret");
    }

    #[test]
    fn by_node_finds_registered_span() {
        let (registry, ids) = registry_with(2);
        assert_eq!(registry.by_node(NodeId::new(11)), Some(ids[1]));
        assert_eq!(registry.by_node(NodeId::new(99)), None);
    }

    #[test]
    fn drain_empties_registry_without_reusing_ids() {
        let (mut registry, ids) = registry_with(3);
        let drained = registry.drain();
        assert_eq!(drained.len(), 3);
        assert!(registry.is_empty());
        assert!(registry.by_node(NodeId::new(10)).is_none());

        let next = registry.register(NodeId::new(50), "x", DisplayMode::Inline, SpanSource::Api);
        assert!(!ids.contains(&next));
    }

    #[test]
    fn markers_reflect_state_and_display_mode() {
        let mut registry = SpanRegistry::new();
        let id = registry.register(NodeId::new(1), "secret", DisplayMode::Block, SpanSource::Selection);
        let span = registry.get_mut(id).unwrap();
        assert_eq!(span.markers().class_list(), "redacted redacted-block");

        span.reveal_state = RevealState::Revealed;
        span.touch_locked = true;
        assert_eq!(span.markers().class_list(), "redacted revealed touch-locked redacted-block");
    }

    #[test]
    fn masked_uses_half_length_block_run() {
        let mut registry = SpanRegistry::new();
        let id = registry.register(NodeId::new(1), "sensitive data", DisplayMode::Inline, SpanSource::Api);
        assert_eq!(registry.get(id).unwrap().masked(), "███████");
    }

    #[test]
    fn span_id_displays_with_prefix() {
        let (_, ids) = registry_with(1);
        assert_eq!(ids[0].to_string(), "span-0");
    }
}
