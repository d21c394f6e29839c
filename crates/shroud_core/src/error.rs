use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::document::NodeId;

/// Errors that can occur when compiling a redaction pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern's regular expression failed to compile.
    #[error("invalid regex in pattern '{id}': {source}")]
    InvalidRegex {
        /// Identifier of the pattern that failed (e.g. `"custom/2"`).
        id: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },
}

impl PatternError {
    /// Returns the identifier of the pattern that failed to compile.
    #[must_use]
    pub fn pattern_id(&self) -> &str {
        match self {
            Self::InvalidRegex { id, .. } => id,
        }
    }
}

/// Reasons a user selection cannot be wrapped into a redacted span.
///
/// Selection failures are recovered locally: the document and the active
/// selection are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The selection is collapsed and covers no text.
    #[error("selection is empty")]
    Empty,

    /// The selection refers to a node that does not exist in the document.
    #[error("selection refers to unknown node {0}")]
    UnknownNode(NodeId),

    /// The selection refers to a text leaf that has been removed from the tree,
    /// typically a stale handle to a leaf an earlier redaction replaced.
    #[error("selection node {0} is no longer attached to the document")]
    Detached(NodeId),

    /// The selection endpoint is an element rather than a text leaf.
    #[error("selection endpoint {0} is not a text node")]
    NotText(NodeId),

    /// The selection starts and ends in different text leaves, so wrapping it
    /// would partially overlap existing element boundaries.
    #[error("selection crosses an element boundary ({start} to {end})")]
    CrossesBoundary {
        /// Node holding the start of the selection.
        start: NodeId,
        /// Node holding the end of the selection.
        end: NodeId,
    },

    /// The selected text already sits inside a redacted or protected region.
    #[error("selection is inside an already redacted region")]
    AlreadyRedacted,

    /// An offset lies past the end of the text or inside a multi-byte character.
    #[error("offset {offset} is not a valid position in node {node}")]
    InvalidOffset {
        /// Node the offset refers to.
        node: NodeId,
        /// The offending byte offset.
        offset: usize,
    },
}

/// Errors that can occur when reading, parsing, serialising, or writing the
/// persisted settings blob.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The blob is not valid JSON or a known key holds a value of the wrong type.
    #[error("failed to parse settings: {source}")]
    Parse {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The blob is valid JSON but not an object.
    #[error("settings blob must be a JSON object")]
    NotAnObject,

    /// The blob's `version` field is not a non-negative integer.
    #[error("settings version must be a non-negative integer")]
    InvalidVersion,

    /// The blob was written by a newer schema than this build understands.
    #[error("unsupported settings version {found} (newest supported is {supported})")]
    UnsupportedVersion {
        /// Version recorded in the blob.
        found: u64,
        /// Newest version this build can migrate to.
        supported: u32,
    },

    /// The in-memory settings could not be serialised.
    #[error("failed to serialise settings: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A stored value could not be read from disk.
    #[error("failed to read settings '{path}': {source}")]
    Read {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be written to disk.
    #[error("failed to write settings '{path}': {source}")]
    Write {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SettingsError {
    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => Some(path),
            Self::Parse { .. }
            | Self::NotAnObject
            | Self::InvalidVersion
            | Self::UnsupportedVersion { .. }
            | Self::Serialize { .. } => None,
        }
    }
}

/// Top-level error type for the shroud redaction pipeline.
///
/// Unifies pattern, selection, and settings errors for callers that
/// orchestrate the full workflow.
#[derive(Debug, Error)]
pub enum ShroudError {
    /// A pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A selection could not be redacted.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Settings could not be read, parsed, or written.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
