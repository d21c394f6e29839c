//! Convenience re-exports of the most commonly used types.

pub use crate::document::{Document, Marker, MarkerSet, NodeId, TextTree};
pub use crate::engine::Redactor;
pub use crate::error::{PatternError, SelectionError, SettingsError, ShroudError};
pub use crate::pattern::{Pattern, PatternSet};
pub use crate::reveal::{InputModality, Transition};
pub use crate::scanner::ScanReport;
pub use crate::settings::{RedactionSettings, RevealBehavior};
pub use crate::span::{RevealState, SpanId};
pub use crate::store::{FileStore, SettingsStore};
