//! The [`Redactor`]: one document, its settings, and the interaction state
//! that ties them together.

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::document::{Document, Marker, NodeId, SPAN_TAG};
use crate::error::SelectionError;
use crate::exclusion::ExclusionFilter;
use crate::input::{KeyAction, KeyEvent, Shortcut, dispatch_key};
use crate::pattern::PatternSet;
use crate::reveal::{InputModality, RevealCursor, RevealMachine, Transition};
use crate::scanner::{ScanReport, TreeScanner};
use crate::selection::{TextSelection, redact_selection};
use crate::settings::{RedactionSettings, RevealBehavior};
use crate::span::{RevealState, SpanId, SpanRegistry, SpanSource};

/// Redaction engine bound to a single document.
///
/// All operations run synchronously on the caller's thread. Reveal changes
/// are mirrored onto the document as [`Marker::Revealed`] and
/// [`Marker::TouchLocked`] so the rendered markup always reflects span state.
#[derive(Debug)]
pub struct Redactor {
    document: Document,
    settings: RedactionSettings,
    spans: SpanRegistry,
    cursor: RevealCursor,
    modality: InputModality,
    selection: Option<TextSelection>,
    settings_open: bool,
    shortcut: Shortcut,
}

impl Redactor {
    /// Binds an engine to `document` with the given settings. No scan is run.
    #[must_use]
    pub fn new(document: Document, settings: RedactionSettings) -> Self {
        Self {
            document,
            settings,
            spans: SpanRegistry::new(),
            cursor: RevealCursor::new(),
            modality: InputModality::Pointer,
            selection: None,
            settings_open: false,
            shortcut: Shortcut::default(),
        }
    }

    /// Replaces the settings-editor shortcut.
    #[must_use]
    pub fn with_shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcut = shortcut;
        self
    }

    /// Returns the document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the document for host-side edits such as inserting content.
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Consumes the engine and returns the document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Returns the live spans.
    #[must_use]
    pub const fn spans(&self) -> &SpanRegistry {
        &self.spans
    }

    /// Returns the currently revealed span, if any.
    #[must_use]
    pub const fn current_revealed(&self) -> Option<SpanId> {
        self.cursor.current()
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn settings(&self) -> &RedactionSettings {
        &self.settings
    }

    /// Replaces the settings. Existing spans are kept; call
    /// [`start_auto_redaction`](Self::start_auto_redaction) to apply new patterns.
    pub fn set_settings(&mut self, settings: RedactionSettings) {
        self.settings = settings;
    }

    /// Mutable access to the settings. Same re-scan rule as [`set_settings`](Self::set_settings).
    pub const fn settings_mut(&mut self) -> &mut RedactionSettings {
        &mut self.settings
    }

    /// Returns the input modality events are currently attributed to.
    #[must_use]
    pub const fn modality(&self) -> InputModality {
        self.modality
    }

    /// Sets the input modality.
    pub const fn set_modality(&mut self, modality: InputModality) {
        self.modality = modality;
    }

    /// Returns `true` while the settings editor is open.
    #[must_use]
    pub const fn is_settings_open(&self) -> bool {
        self.settings_open
    }

    /// Scans the whole document with the current settings.
    pub fn start_auto_redaction(&mut self) -> ScanReport {
        let root = self.document.root();
        self.scan_subtree(root)
    }

    /// Scans the subtree at `root` with the current settings. Does nothing
    /// when redaction is disabled.
    pub fn scan_subtree(&mut self, root: NodeId) -> ScanReport {
        if !self.settings.enabled {
            #[cfg(feature = "tracing")]
            debug!("redaction disabled, skipping scan");
            return ScanReport::default();
        }

        let (patterns, skipped) = PatternSet::compile(&self.settings);
        let exclusions = ExclusionFilter::new(&self.settings.exclude_terms);
        let scanner = TreeScanner::new(&patterns, &exclusions, self.settings.display_mode());

        let mut report = scanner.scan(&mut self.document, root, &mut self.spans);
        report.patterns_skipped = skipped.iter().map(|e| e.pattern_id().to_owned()).collect();
        report
    }

    /// Wraps `text` in a new detached span and returns its handle. The host
    /// places it with [`Document::append_child`] using [`span_node`](Self::span_node).
    pub fn redact_text(&mut self, text: &str) -> SpanId {
        let mode = self.settings.display_mode();
        let node = self.document.create_element(SPAN_TAG, mode.markers());
        let inner = self.document.create_text(text);
        let _ = self.document.append_child(node, inner);
        self.spans.register(node, text, mode, SpanSource::Api)
    }

    /// Returns the element wrapping span `id`.
    #[must_use]
    pub fn span_node(&self, id: SpanId) -> Option<NodeId> {
        self.spans.get(id).map(|s| s.node)
    }

    /// Returns the span whose element is `node` or one of its ancestors.
    #[must_use]
    pub fn span_at(&self, node: NodeId) -> Option<SpanId> {
        self.document.ancestors(node).find_map(|n| self.spans.by_node(n))
    }

    /// Unwraps every span back into plain text and empties the registry.
    pub fn clear_all_redactions(&mut self) {
        self.cursor.reset();
        let removed = self.spans.drain();

        #[cfg(feature = "tracing")]
        debug!(count = removed.len(), "clearing all redactions");

        for span in removed {
            let _ = self.document.unwrap_element(span.node);
        }
    }

    /// Returns the document's visible text with every span masked.
    #[must_use]
    pub fn export_redacted_content(&self) -> String {
        self.document.export_masked(self.document.root())
    }

    /// Renders the document as markup.
    #[must_use]
    pub fn render_markup(&self) -> String {
        self.document.render_markup(self.document.root())
    }

    /// Reveals span `id`, hiding any other revealed span first.
    pub fn reveal_element(&mut self, id: SpanId) -> Vec<Transition> {
        let transitions = self.machine().reveal(id, InputModality::Pointer);
        self.apply(&transitions);
        transitions
    }

    /// Hides span `id`.
    pub fn hide_element(&mut self, id: SpanId) -> Vec<Transition> {
        let transitions = self.machine().hide(id);
        self.apply(&transitions);
        transitions
    }

    /// Touch toggle on span `id`. Ignored when touch support is off.
    pub fn toggle_reveal_touch(&mut self, id: SpanId) -> Vec<Transition> {
        if !self.settings.touch_support {
            return Vec::new();
        }
        let transitions = self.machine().toggle(id, InputModality::Touch);
        self.apply(&transitions);
        transitions
    }

    /// Hides whichever span is revealed.
    pub fn hide_all(&mut self) -> Vec<Transition> {
        let transitions = self.machine().hide_all();
        self.apply(&transitions);
        transitions
    }

    /// Pointer entered `target`. Reveals the enclosing span when the reveal
    /// behaviour is hover-driven and the modality is not touch.
    pub fn pointer_enter(&mut self, target: NodeId) -> Vec<Transition> {
        match self.hover_target(target) {
            Some(id) => {
                let transitions = self.machine().pointer_enter(id);
                self.apply(&transitions);
                transitions
            }
            None => Vec::new(),
        }
    }

    /// Pointer left `target`. Hides the enclosing span if it is the revealed one.
    pub fn pointer_leave(&mut self, target: NodeId) -> Vec<Transition> {
        match self.hover_target(target) {
            Some(id) => {
                let transitions = self.machine().pointer_leave(id);
                self.apply(&transitions);
                transitions
            }
            None => Vec::new(),
        }
    }

    /// Pointer clicked `target`. Toggles the enclosing span under the click
    /// reveal behaviour.
    pub fn pointer_click(&mut self, target: NodeId) -> Vec<Transition> {
        if self.modality == InputModality::Touch || self.settings.reveal_behavior != RevealBehavior::Click {
            return Vec::new();
        }
        let Some(id) = self.span_at(target) else {
            return Vec::new();
        };
        let transitions = self.machine().toggle(id, InputModality::Pointer);
        self.apply(&transitions);
        transitions
    }

    /// Touch started on `target`. Switches to the touch modality and toggles
    /// the enclosing span.
    pub fn touch_start(&mut self, target: NodeId) -> Vec<Transition> {
        if !self.settings.touch_support {
            return Vec::new();
        }
        self.modality = InputModality::Touch;
        match self.span_at(target) {
            Some(id) => self.toggle_reveal_touch(id),
            None => Vec::new(),
        }
    }

    /// Returns the active selection.
    #[must_use]
    pub const fn selection(&self) -> Option<&TextSelection> {
        self.selection.as_ref()
    }

    /// Sets or clears the active selection.
    pub const fn set_selection(&mut self, selection: Option<TextSelection>) {
        self.selection = selection;
    }

    /// Wraps the active selection in a span and clears the selection.
    ///
    /// On failure the document and the selection are left as they were.
    pub fn redact_selection(&mut self) -> Result<SpanId, SelectionError> {
        let Some(selection) = self.selection else {
            return Err(SelectionError::Empty);
        };

        match redact_selection(
            &mut self.document,
            &mut self.spans,
            &selection,
            self.settings.display_mode(),
        ) {
            Ok(id) => {
                self.selection = None;
                Ok(id)
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                warn!(error = %e, "cannot redact selection");
                Err(e)
            }
        }
    }

    /// Handles a key press. Opening the settings editor hides any revealed span.
    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyAction {
        let action = dispatch_key(event, self.settings_open, &self.shortcut);
        match action {
            KeyAction::OpenSettings => {
                self.settings_open = true;
                let _ = self.hide_all();
            }
            KeyAction::CloseSettings => self.settings_open = false,
            KeyAction::None => {}
        }
        action
    }

    fn machine(&mut self) -> RevealMachine<'_> {
        RevealMachine::new(&mut self.spans, &mut self.cursor)
    }

    fn hover_target(&self, target: NodeId) -> Option<SpanId> {
        if self.modality == InputModality::Touch || !self.settings.reveal_behavior.reveals_on_hover() {
            return None;
        }
        self.span_at(target)
    }

    fn apply(&mut self, transitions: &[Transition]) {
        for transition in transitions {
            let Some(node) = self.span_node(transition.span) else {
                continue;
            };
            let mut markers = self.document.markers(node);
            markers.set(Marker::Revealed, transition.state == RevealState::Revealed);
            markers.set(Marker::TouchLocked, transition.touch_locked);
            self.document.set_markers(node, markers);
        }
    }
}
