//! Tree-shaped text documents and the capability trait the engine runs against.
//!
//! The scanner, reveal machinery and selection redactor never touch a
//! concrete document type directly. They go through [`TextTree`], which
//! exposes the handful of operations they need: enumerate text leaves, read
//! markers, and replace a leaf with new nodes. [`Document`] is the arena
//! backed implementation used by the CLI and the tests; hosts embedding the
//! engine over another tree (a real DOM, a virtual DOM) implement the trait
//! for their own type.

/// Marker vocabulary shared with the presentation layer.
pub mod markers;
/// Markup rendering, visible text extraction and export masking.
pub mod render;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use markers::{Marker, MarkerSet, ParseMarkerError};

/// Tag used for the elements that wrap redacted text.
pub const SPAN_TAG: &str = "span";

const ROOT_TAG: &str = "body";
const PARAGRAPH_TAG: &str = "p";
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Opaque handle to a node in a [`TextTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Wraps a raw index. Tree implementations allocate these; callers
    /// should treat them as opaque.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A replacement fragment handed to [`TextTree::replace_leaf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    /// Plain text that stays visible.
    Text(&'a str),
    /// Text wrapped in a redacted element carrying `markers`.
    Redacted {
        /// The text being hidden.
        text: &'a str,
        /// Markers for the wrapping element (always includes [`Marker::Redacted`]).
        markers: MarkerSet,
    },
}

/// Minimal capability interface over a tree of text-bearing nodes.
pub trait TextTree {
    /// Returns `true` if `node` exists in the tree, attached or not.
    fn contains(&self, node: NodeId) -> bool;

    /// Lists every text leaf under `root` in document order. If `root` is
    /// itself a text leaf it is the only entry.
    fn text_leaves(&self, root: NodeId) -> Vec<NodeId>;

    /// Returns the text of a leaf, or `None` if `node` is not a text leaf.
    fn leaf_text(&self, node: NodeId) -> Option<&str>;

    /// Returns the markers carried by `node` (empty for unknown nodes).
    fn marker_set(&self, node: NodeId) -> MarkerSet;

    /// Returns the parent of `node`, if it has one.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Replaces `leaf` with the given pieces, in order.
    ///
    /// Returns the handle of the node created for each piece, or an empty
    /// vector if the leaf could not be replaced.
    fn replace_leaf(&mut self, leaf: NodeId, pieces: &[Piece<'_>]) -> Vec<NodeId>;

    /// Adds or removes a single marker on `node`.
    fn set_marker(&mut self, node: NodeId, marker: Marker, on: bool);

    /// Returns `true` if `node` or any of its ancestors carries one of the
    /// markers in `barrier`.
    fn within_marked(&self, node: NodeId, barrier: MarkerSet) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.marker_set(id).intersects(barrier) {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}

/// The payload of a document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A structural element such as `p` or `span`.
    Element {
        /// Element tag name.
        tag: Box<str>,
    },
    /// A text leaf.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    markers: MarkerSet,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    const fn new(kind: NodeKind, markers: MarkerSet) -> Self {
        Self {
            kind,
            markers,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Serialisable description of a document subtree.
///
/// Text leaves are plain JSON strings; elements are objects with a `tag`,
/// optional `markers` and optional `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    /// A text leaf.
    Text(String),
    /// An element and its children.
    Element {
        /// Element tag name.
        tag: String,
        /// Markers carried by the element.
        #[serde(default, skip_serializing_if = "markers_are_empty")]
        markers: MarkerSet,
        /// Child nodes in document order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<NodeSpec>,
    },
}

#[expect(clippy::trivially_copy_pass_by_ref, reason = "signature required by serde")]
fn markers_are_empty(markers: &MarkerSet) -> bool {
    markers.is_empty()
}

/// Arena-backed document tree.
///
/// Nodes are never freed: replaced or unwrapped nodes stay in the arena,
/// detached from the tree, so stale handles resolve to detached nodes rather
/// than to unrelated ones.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document with a `body` root element.
    #[must_use]
    pub fn new() -> Self {
        let root = Node::new(NodeKind::Element { tag: ROOT_TAG.into() }, MarkerSet::EMPTY);
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Builds a document from plain text.
    ///
    /// Each blank-line separated paragraph becomes a `p` element; the
    /// separators are kept as text leaves so the document's text content is
    /// exactly `text`.
    #[must_use]
    pub fn from_plain_text(text: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root;

        for (idx, paragraph) in text.split(PARAGRAPH_SEPARATOR).enumerate() {
            if idx > 0 {
                let _ = doc.append_text(root, PARAGRAPH_SEPARATOR);
            }
            if paragraph.is_empty() {
                continue;
            }
            if let Some(p) = doc.append_element(root, PARAGRAPH_TAG, MarkerSet::EMPTY) {
                let _ = doc.append_text(p, paragraph);
            }
        }

        doc
    }

    /// Builds a document from a [`NodeSpec`]. A text spec is wrapped in a
    /// `body` element.
    #[must_use]
    pub fn from_spec(spec: &NodeSpec) -> Self {
        match spec {
            NodeSpec::Text(text) => {
                let mut doc = Self::new();
                let root = doc.root;
                let _ = doc.append_text(root, text);
                doc
            }
            NodeSpec::Element { tag, markers, children } => {
                let mut doc = Self {
                    nodes: vec![Node::new(NodeKind::Element { tag: tag.as_str().into() }, *markers)],
                    root: NodeId(0),
                };
                let root = doc.root;
                for child in children {
                    doc.append_spec(root, child);
                }
                doc
            }
        }
    }

    /// Parses a JSON document tree (see [`NodeSpec`]).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let spec: NodeSpec = serde_json::from_str(json)?;
        Ok(Self::from_spec(&spec))
    }

    /// Describes the subtree rooted at `node`.
    #[must_use]
    pub fn to_spec(&self, node: NodeId) -> Option<NodeSpec> {
        let data = self.node(node)?;
        Some(match &data.kind {
            NodeKind::Text(text) => NodeSpec::Text(text.clone()),
            NodeKind::Element { tag } => NodeSpec::Element {
                tag: tag.to_string(),
                markers: data.markers,
                children: data.children.iter().filter_map(|&c| self.to_spec(c)).collect(),
            },
        })
    }

    fn append_spec(&mut self, parent: NodeId, spec: &NodeSpec) {
        match spec {
            NodeSpec::Text(text) => {
                let _ = self.append_text(parent, text);
            }
            NodeSpec::Element { tag, markers, children } => {
                if let Some(id) = self.append_element(parent, tag, *markers) {
                    for child in children {
                        self.append_spec(id, child);
                    }
                }
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Returns the root element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Returns `true` if `id` refers to a node in this document's arena.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Returns the payload of `id`.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    /// Returns the tag of an element node.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Returns the text of a text leaf.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Returns the markers on `id` (empty for unknown nodes).
    #[must_use]
    pub fn markers(&self, id: NodeId) -> MarkerSet {
        self.node(id).map_or(MarkerSet::EMPTY, |n| n.markers)
    }

    /// Replaces the whole marker set on `id`.
    pub fn set_markers(&mut self, id: NodeId, markers: MarkerSet) {
        if let Some(node) = self.node_mut(id) {
            node.markers = markers;
        }
    }

    /// Returns the parent of `id`, if attached to one.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Returns the children of `id` in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Iterates over `id` and then each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.contains(id).then_some(id), |&n| self.parent(n))
    }

    /// Returns `true` if `id` is the root or has the root as an ancestor.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors(id).any(|n| n == self.root)
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str, markers: MarkerSet) -> NodeId {
        self.push(Node::new(NodeKind::Element { tag: tag.into() }, markers))
    }

    /// Creates a detached text leaf.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::new(NodeKind::Text(text.to_owned()), MarkerSet::EMPTY))
    }

    /// Appends a detached node as the last child of `parent`.
    ///
    /// Returns `false` (and changes nothing) if `parent` is not an element,
    /// `child` is already attached somewhere, or `child` is an ancestor of
    /// `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.tag(parent).is_none()
            || !self.contains(child)
            || child == self.root
            || self.parent(child).is_some()
            || self.ancestors(parent).any(|n| n == child)
        {
            return false;
        }

        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        true
    }

    /// Creates an element and appends it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, markers: MarkerSet) -> Option<NodeId> {
        let id = self.create_element(tag, markers);
        self.append_child(parent, id).then_some(id)
    }

    /// Creates a text leaf and appends it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Option<NodeId> {
        let id = self.create_text(text);
        self.append_child(parent, id).then_some(id)
    }

    /// Replaces `old` in its parent's child list with `replacements`.
    ///
    /// Replacement nodes must be detached. Returns `false` if `old` has no
    /// parent or a replacement is unusable.
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) -> bool {
        let Some(parent) = self.parent(old) else {
            return false;
        };
        if replacements
            .iter()
            .any(|&r| !self.contains(r) || r == self.root || self.parent(r).is_some())
        {
            return false;
        }
        let Some(position) = self.children(parent).iter().position(|&c| c == old) else {
            return false;
        };

        for &r in replacements {
            if let Some(node) = self.node_mut(r) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.node_mut(old) {
            node.parent = None;
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.splice(position..=position, replacements.iter().copied());
        }
        true
    }

    /// Replaces an element with its own children and merges the text leaves
    /// that end up adjacent. Returns `false` if `id` is not an attached
    /// element.
    pub fn unwrap_element(&mut self, id: NodeId) -> bool {
        if self.tag(id).is_none() {
            return false;
        }
        let Some(parent) = self.parent(id) else {
            return false;
        };

        let children = self.node_mut(id).map(|n| std::mem::take(&mut n.children)).unwrap_or_default();
        for &child in &children {
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
            }
        }

        if !self.replace_with(id, &children) {
            for &child in &children {
                if let Some(node) = self.node_mut(child) {
                    node.parent = Some(id);
                }
            }
            if let Some(node) = self.node_mut(id) {
                node.children = children;
            }
            return false;
        }
        self.merge_text_children(parent);
        true
    }

    /// Merges runs of adjacent text children of `parent` into one leaf and
    /// drops empty text leaves.
    pub fn merge_text_children(&mut self, parent: NodeId) {
        let children = self.children(parent).to_vec();
        let mut merged: Vec<NodeId> = Vec::with_capacity(children.len());

        for child in children {
            let Some(text) = self.text(child).map(str::to_owned) else {
                merged.push(child);
                continue;
            };

            let previous_text = merged.last().and_then(|&prev| self.text(prev).map(|_| prev));
            if let Some(prev) = previous_text {
                if let Some(Node {
                    kind: NodeKind::Text(existing),
                    ..
                }) = self.node_mut(prev)
                {
                    existing.push_str(&text);
                }
                if let Some(node) = self.node_mut(child) {
                    node.parent = None;
                }
            } else if text.is_empty() {
                if let Some(node) = self.node_mut(child) {
                    node.parent = None;
                }
            } else {
                merged.push(child);
            }
        }

        if let Some(node) = self.node_mut(parent) {
            node.children = merged;
        }
    }

    /// Lists `root` and all of its descendants in document order.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Concatenates all text under `id`.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id).into_iter().filter_map(|n| self.text(n)).collect()
    }
}

impl TextTree for Document {
    fn contains(&self, node: NodeId) -> bool {
        Self::contains(self, node)
    }

    fn text_leaves(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| self.text(n).is_some())
            .collect()
    }

    fn leaf_text(&self, node: NodeId) -> Option<&str> {
        self.text(node)
    }

    fn marker_set(&self, node: NodeId) -> MarkerSet {
        self.markers(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn replace_leaf(&mut self, leaf: NodeId, pieces: &[Piece<'_>]) -> Vec<NodeId> {
        if self.text(leaf).is_none() || Self::parent(self, leaf).is_none() {
            return Vec::new();
        }

        let created: Vec<NodeId> = pieces
            .iter()
            .map(|piece| match *piece {
                Piece::Text(text) => self.create_text(text),
                Piece::Redacted { text, markers } => {
                    let span = self.create_element(SPAN_TAG, markers.with(Marker::Redacted));
                    let inner = self.create_text(text);
                    let _ = self.append_child(span, inner);
                    span
                }
            })
            .collect();

        if self.replace_with(leaf, &created) {
            created
        } else {
            Vec::new()
        }
    }

    fn set_marker(&mut self, node: NodeId, marker: Marker, on: bool) {
        if let Some(data) = self.node_mut(node) {
            data.markers.set(marker, on);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_plain_text_preserves_text_content_exactly() {
        let text = "first paragraph\n\nsecond one\nwith a break\n\n\n\nafter gap";
        let doc = Document::from_plain_text(text);
        assert_eq!(doc.text_content(doc.root()), text);
    }

    #[test]
    fn from_plain_text_wraps_paragraphs_in_p_elements() {
        let doc = Document::from_plain_text("one\n\ntwo");
        let tags: Vec<_> = doc.children(doc.root()).iter().filter_map(|&c| doc.tag(c)).collect();
        assert_eq!(tags, vec!["p", "p"]);
    }

    #[test]
    fn from_json_builds_nested_elements_with_markers() {
        let json = r#"{"tag":"body","children":[
            {"tag":"p","children":["hello ", {"tag":"aside","markers":["redaction-settings"],"children":["cfg"]}]}
        ]}"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.text_content(doc.root()), "hello cfg");

        let aside = doc
            .descendants(doc.root())
            .into_iter()
            .find(|&n| doc.tag(n) == Some("aside"))
            .unwrap();
        assert!(doc.markers(aside).contains(Marker::SettingsPanel));
    }

    #[test]
    fn to_spec_round_trips_through_from_spec() {
        let doc = Document::from_plain_text("a\n\nb");
        let spec = doc.to_spec(doc.root()).unwrap();
        let rebuilt = Document::from_spec(&spec);
        assert_eq!(rebuilt.to_spec(rebuilt.root()), Some(spec));
    }

    #[test]
    fn text_leaves_are_listed_in_document_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.append_element(root, "p", MarkerSet::EMPTY).unwrap();
        let a = doc.append_text(p, "a").unwrap();
        let b = doc.append_text(root, "b").unwrap();

        assert_eq!(doc.text_leaves(root), vec![a, b]);
        assert_eq!(doc.text_leaves(a), vec![a]);
    }

    #[test]
    fn append_child_rejects_attached_nodes_and_cycles() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.append_element(root, "p", MarkerSet::EMPTY).unwrap();
        let text = doc.append_text(p, "x").unwrap();

        assert!(!doc.append_child(root, p));
        assert!(!doc.append_child(text, p));
        assert!(!doc.append_child(p, root));
    }

    #[test]
    fn replace_leaf_splits_text_and_wraps_redacted_piece() {
        let mut doc = Document::new();
        let root = doc.root();
        let leaf = doc.append_text(root, "call 555-123-4567 now").unwrap();

        let created = doc.replace_leaf(
            leaf,
            &[
                Piece::Text("call "),
                Piece::Redacted {
                    text: "555-123-4567",
                    markers: MarkerSet::EMPTY,
                },
                Piece::Text(" now"),
            ],
        );

        assert_eq!(created.len(), 3);
        assert_eq!(doc.tag(created[1]), Some(SPAN_TAG));
        assert!(doc.markers(created[1]).contains(Marker::Redacted));
        assert_eq!(doc.text_content(created[1]), "555-123-4567");
        assert_eq!(doc.text_content(root), "call 555-123-4567 now");
        assert!(!doc.is_attached(leaf));
    }

    #[test]
    fn replace_leaf_on_detached_leaf_does_nothing() {
        let mut doc = Document::new();
        let leaf = doc.create_text("orphan");
        assert!(doc.replace_leaf(leaf, &[Piece::Text("x")]).is_empty());
    }

    #[test]
    fn unwrap_element_restores_and_merges_text() {
        let mut doc = Document::new();
        let root = doc.root();
        let leaf = doc.append_text(root, "a secret b").unwrap();
        let created = doc.replace_leaf(
            leaf,
            &[
                Piece::Text("a "),
                Piece::Redacted {
                    text: "secret",
                    markers: MarkerSet::EMPTY,
                },
                Piece::Text(" b"),
            ],
        );

        assert!(doc.unwrap_element(created[1]));
        assert_eq!(doc.children(root).len(), 1);
        assert_eq!(doc.text(doc.children(root)[0]), Some("a secret b"));
    }

    #[test]
    fn within_marked_checks_ancestors() {
        let mut doc = Document::new();
        let root = doc.root();
        let panel = doc
            .append_element(root, "div", MarkerSet::only(Marker::SettingsPanel))
            .unwrap();
        let inner = doc.append_text(panel, "555-123-4567").unwrap();
        let outer = doc.append_text(root, "555-123-4567").unwrap();

        assert!(doc.within_marked(inner, MarkerSet::SCAN_BARRIER));
        assert!(!doc.within_marked(outer, MarkerSet::SCAN_BARRIER));
    }

    #[test]
    fn node_id_displays_with_hash_prefix() {
        assert_eq!(NodeId::new(7).to_string(), "#7");
    }
}
