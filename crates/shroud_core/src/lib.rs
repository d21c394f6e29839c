//! Core redaction engine for shroud.
//!
//! This crate finds sensitive text in a tree-shaped document and wraps each
//! match in a redacted span that can be revealed on demand. It is designed to
//! be embedded in hosts that own the document (a browser extension, an
//! editor, the `shroud` CLI) and drive it with input events.
//!
//! # Main Types
//!
//! - [`Redactor`] - Engine bound to one document; the public operation surface
//! - [`PatternSet`] - Ordered built-in and custom patterns
//! - [`TreeScanner`] - Walks text leaves and wraps surviving matches
//! - [`RevealMachine`] - Single-reveal state machine over a [`SpanRegistry`]
//! - [`RedactionSettings`] - Persisted configuration, loaded via [`SettingsStore`]
//!
//! # Error Handling
//!
//! This crate uses [`thiserror`] for structured, typed errors that library
//! consumers can match on:
//!
//! - [`PatternError`] - Custom pattern compilation failures
//! - [`SelectionError`] - Selections that cannot be wrapped
//! - [`SettingsError`] - Settings blob read/parse/write failures
//! - [`ShroudError`] - Top-level error enum combining the above
//!
//! None of these is fatal to the document: the engine skips invalid patterns,
//! leaves bad selections untouched and falls back to default settings.
//!
//! The CLI crate (`shroud_cli`) uses `anyhow` for error propagation.

/// Document tree, markers and the [`TextTree`] capability trait.
pub mod document;
/// The [`Redactor`] facade.
pub mod engine;
/// Error types for patterns, selections and settings.
pub mod error;
/// Case-insensitive exclusion terms.
pub mod exclusion;
/// Filesystem helpers for atomic writes.
pub mod fs_util;
/// Keyboard shortcut dispatch for the settings editor.
pub mod input;
/// Pattern definitions and ordered matching.
pub mod pattern;
/// Common re-exports.
pub mod prelude;
/// Single-reveal state machine.
pub mod reveal;
/// Tree scanning and span creation.
pub mod scanner;
/// Manual redaction of user selections.
pub mod selection;
/// Redaction settings, schema versioning and merge.
pub mod settings;
/// Redacted spans and their registry.
pub mod span;
/// Key-value persistence for the settings blob.
pub mod store;

pub use document::{Document, Marker, MarkerSet, NodeId, NodeSpec, Piece, TextTree};
pub use engine::Redactor;
pub use error::{PatternError, SelectionError, SettingsError, ShroudError};
pub use exclusion::ExclusionFilter;
pub use input::{Key, KeyAction, KeyEvent, Modifiers, Shortcut};
pub use pattern::{MatchSpan, Pattern, PatternSet, PatternSource, find_matches};
pub use reveal::{InputModality, RevealCursor, RevealMachine, Transition};
pub use scanner::{ScanReport, TreeScanner};
pub use selection::{TextPosition, TextSelection, redact_selection};
pub use settings::{CompiledPattern, PatternEntry, RedactionSettings, RevealBehavior, SETTINGS_VERSION};
pub use span::{DisplayMode, RedactedSpan, RevealState, SpanId, SpanRegistry, SpanSource};
pub use store::{FileStore, KeyValueStore, MemoryStore, SETTINGS_KEY, SettingsStore};
