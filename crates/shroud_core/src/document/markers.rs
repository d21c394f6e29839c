//! Marker vocabulary shared between the engine and the presentation layer.
//!
//! Markers are the wire format between redaction state and styling: a
//! renderer only needs to know which markers a node carries to decide how to
//! draw it. The names returned by [`Marker::as_str`] are stable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single presentation marker attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Marker {
    /// The node is a redacted span.
    #[serde(rename = "redacted")]
    Redacted,
    /// The redacted span is currently revealed.
    #[serde(rename = "revealed")]
    Revealed,
    /// The span was revealed through a touch toggle and shows a lock decoration.
    #[serde(rename = "touch-locked")]
    TouchLocked,
    /// The span is drawn as a solid block rather than inline.
    #[serde(rename = "redacted-block")]
    BlockDisplay,
    /// The node hosts the settings editor and must never be scanned.
    #[serde(rename = "redaction-settings")]
    SettingsPanel,
}

impl Marker {
    /// Every marker, in bit order.
    pub const ALL: [Self; 5] = [
        Self::Redacted,
        Self::Revealed,
        Self::TouchLocked,
        Self::BlockDisplay,
        Self::SettingsPanel,
    ];

    /// Returns the stable marker name used in rendered markup.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Redacted => "redacted",
            Self::Revealed => "revealed",
            Self::TouchLocked => "touch-locked",
            Self::BlockDisplay => "redacted-block",
            Self::SettingsPanel => "redaction-settings",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Redacted => 1,
            Self::Revealed => 1 << 1,
            Self::TouchLocked => 1 << 2,
            Self::BlockDisplay => 1 << 3,
            Self::SettingsPanel => 1 << 4,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown marker name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMarkerError {
    invalid_value: Box<str>,
}

impl ParseMarkerError {
    /// Returns the name that failed to parse.
    #[must_use]
    pub fn invalid_value(&self) -> &str {
        &self.invalid_value
    }
}

impl fmt::Display for ParseMarkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown marker '{}'", self.invalid_value)
    }
}

impl std::error::Error for ParseMarkerError {}

impl FromStr for Marker {
    type Err = ParseMarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseMarkerError { invalid_value: s.into() })
    }
}

/// A compact set of [`Marker`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Marker>", into = "Vec<Marker>")]
pub struct MarkerSet(u8);

impl MarkerSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Markers that stop the scanner from descending into a subtree.
    pub const SCAN_BARRIER: Self = Self(Marker::Redacted.bit() | Marker::SettingsPanel.bit());

    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a set holding a single marker.
    #[must_use]
    pub const fn only(marker: Marker) -> Self {
        Self(marker.bit())
    }

    /// Returns a copy of this set with `marker` added.
    #[must_use]
    pub const fn with(self, marker: Marker) -> Self {
        Self(self.0 | marker.bit())
    }

    /// Returns `true` if `marker` is in the set.
    #[must_use]
    pub const fn contains(self, marker: Marker) -> bool {
        self.0 & marker.bit() != 0
    }

    /// Returns `true` if the two sets share at least one marker.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Adds or removes `marker` depending on `on`.
    pub fn set(&mut self, marker: Marker, on: bool) {
        if on {
            self.0 |= marker.bit();
        } else {
            self.0 &= !marker.bit();
        }
    }

    /// Returns `true` if no markers are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the markers in the set in bit order.
    pub fn iter(self) -> impl Iterator<Item = Marker> {
        Marker::ALL.into_iter().filter(move |m| self.contains(*m))
    }

    /// Joins marker names with a single space, as used in a `class` attribute.
    #[must_use]
    pub fn class_list(self) -> String {
        self.iter().map(Marker::as_str).collect::<Vec<_>>().join(" ")
    }
}

impl FromIterator<Marker> for MarkerSet {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl From<Vec<Marker>> for MarkerSet {
    fn from(markers: Vec<Marker>) -> Self {
        markers.into_iter().collect()
    }
}

impl From<MarkerSet> for Vec<Marker> {
    fn from(set: MarkerSet) -> Self {
        set.iter().collect()
    }
}
