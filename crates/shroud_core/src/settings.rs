use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "tracing")]
use tracing::warn;

use crate::error::SettingsError;
use crate::span::DisplayMode;

/// Schema version written by this build.
pub const SETTINGS_VERSION: u32 = 1;

const VERSION_KEY: &str = "version";

/// How a hidden span is revealed with a pointing device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealBehavior {
    /// Reveal while the cursor rests on the span.
    Cursor,
    /// Toggle on click; hovering does nothing.
    Click,
    /// Reveal while the pointer hovers the span.
    #[default]
    Hover,
}

impl RevealBehavior {
    /// Returns `true` if pointer enter/leave drives the reveal.
    #[must_use]
    pub const fn reveals_on_hover(self) -> bool {
        matches!(self, Self::Cursor | Self::Hover)
    }
}

/// A user-supplied regular expression with JavaScript-style flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompiledPattern {
    /// Regular expression source.
    pub regex: String,
    /// Flag letters. `i`, `m` and `s` are honoured; others (such as `g`) are
    /// accepted and ignored.
    #[serde(default)]
    pub flags: String,
}

impl CompiledPattern {
    /// Creates a pattern from its source and flags.
    #[must_use]
    pub fn new(regex: &str, flags: &str) -> Self {
        Self {
            regex: regex.to_owned(),
            flags: flags.to_owned(),
        }
    }

    /// Returns the regex source with supported flags applied as an inline group.
    #[must_use]
    pub fn to_expression(&self) -> String {
        let mut inline = String::new();
        for flag in ['i', 'm', 's'] {
            if self.flags.contains(flag) {
                inline.push(flag);
            }
        }

        if inline.is_empty() {
            self.regex.clone()
        } else {
            format!("(?{inline}){}", self.regex)
        }
    }
}

/// One `customPatterns` entry: a literal term or a compiled expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternEntry {
    /// A literal term, matched case-insensitively.
    Literal(String),
    /// A regular expression.
    Compiled(CompiledPattern),
}

impl PatternEntry {
    /// Returns `true` if the entry has nothing to match.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Literal(term) => term.trim().is_empty(),
            Self::Compiled(compiled) => compiled.regex.is_empty(),
        }
    }
}

impl From<&str> for PatternEntry {
    fn from(term: &str) -> Self {
        Self::Literal(term.to_owned())
    }
}

/// The persisted redaction configuration.
///
/// Field names in the serialised blob keep their camelCase spelling. The
/// `version` field tags the schema so older blobs can be migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionSettings {
    /// Schema version of this record.
    pub version: u32,
    /// Master switch. When off, auto-redaction performs no scan.
    pub enabled: bool,
    /// Whether the built-in PII rules run.
    #[serde(rename = "autoRedactPII")]
    pub auto_redact_pii: bool,
    /// User-supplied patterns, evaluated after the PII rules.
    pub custom_patterns: Vec<PatternEntry>,
    /// Terms that veto any match containing them.
    pub exclude_terms: Vec<String>,
    /// How pointer input reveals spans.
    pub reveal_behavior: RevealBehavior,
    /// Draw spans as solid blocks instead of inline.
    pub block_style: bool,
    /// Whether touch toggles are honoured.
    pub touch_support: bool,
}

impl Default for RedactionSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            enabled: true,
            auto_redact_pii: true,
            custom_patterns: Vec::new(),
            exclude_terms: Vec::new(),
            reveal_behavior: RevealBehavior::default(),
            block_style: false,
            touch_support: true,
        }
    }
}

impl RedactionSettings {
    /// Creates the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a persisted blob and merges it over the defaults.
    ///
    /// Keys present in the blob replace the default value entirely, arrays
    /// included. Unknown keys are ignored. Older schema versions are migrated
    /// first; newer ones are rejected.
    pub fn from_json(blob: &str) -> Result<Self, SettingsError> {
        let value: Value = serde_json::from_str(blob).map_err(|source| SettingsError::Parse { source })?;
        let Value::Object(map) = value else {
            return Err(SettingsError::NotAnObject);
        };
        Self::merged_with(migrate(map)?)
    }

    /// Serialises the complete settings record.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string_pretty(self).map_err(|source| SettingsError::Serialize { source })
    }

    /// Overlays `overrides` on the defaults, one top-level key at a time.
    pub fn merged_with(overrides: Map<String, Value>) -> Result<Self, SettingsError> {
        let Value::Object(mut merged) =
            serde_json::to_value(Self::default()).map_err(|source| SettingsError::Serialize { source })?
        else {
            return Err(SettingsError::NotAnObject);
        };

        for (key, value) in overrides {
            if merged.contains_key(&key) {
                merged.insert(key, value);
            }
        }

        serde_json::from_value(Value::Object(merged)).map_err(|source| SettingsError::Parse { source })
    }

    /// Appends a literal custom pattern.
    ///
    /// The term is trimmed; blank terms and duplicates are ignored. Returns
    /// `true` if the term was added.
    pub fn add_custom_pattern(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        self.add_custom_entry(PatternEntry::Literal(term.to_owned()))
    }

    /// Appends a custom pattern entry unless it is blank or already present.
    pub fn add_custom_entry(&mut self, entry: PatternEntry) -> bool {
        if entry.is_blank() || self.custom_patterns.contains(&entry) {
            return false;
        }
        self.custom_patterns.push(entry);
        true
    }

    /// Appends an exclusion term. Blank terms and duplicates are ignored.
    pub fn add_exclude_term(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() || self.exclude_terms.iter().any(|t| t == term) {
            return false;
        }
        self.exclude_terms.push(term.to_owned());
        true
    }

    /// Removes the custom pattern at `index`, if present.
    pub fn remove_custom_pattern(&mut self, index: usize) -> Option<PatternEntry> {
        (index < self.custom_patterns.len()).then(|| self.custom_patterns.remove(index))
    }

    /// Removes the exclusion term at `index`, if present.
    pub fn remove_exclude_term(&mut self, index: usize) -> Option<String> {
        (index < self.exclude_terms.len()).then(|| self.exclude_terms.remove(index))
    }

    /// Returns how new spans should be displayed.
    #[must_use]
    pub const fn display_mode(&self) -> DisplayMode {
        if self.block_style {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        }
    }
}

/// Brings a raw blob up to [`SETTINGS_VERSION`].
///
/// A blob without a `version` key predates versioning and is treated as
/// version 0.
pub fn migrate(mut map: Map<String, Value>) -> Result<Map<String, Value>, SettingsError> {
    let found = match map.get(VERSION_KEY) {
        None => 0,
        Some(value) => value.as_u64().ok_or(SettingsError::InvalidVersion)?,
    };

    if found > u64::from(SETTINGS_VERSION) {
        return Err(SettingsError::UnsupportedVersion {
            found,
            supported: SETTINGS_VERSION,
        });
    }

    for from in found..u64::from(SETTINGS_VERSION) {
        if from == 0 {
            migrate_v0_to_v1(&mut map);
        }
    }

    map.insert(VERSION_KEY.to_owned(), Value::from(SETTINGS_VERSION));
    Ok(map)
}

/// Pre-versioning blobs may hold `null` term lists, mixed-case reveal
/// behaviour names and custom patterns that lost their source when they were
/// stored (a serialised regex object comes out as `{}`).
fn migrate_v0_to_v1(map: &mut Map<String, Value>) {
    if let Some(Value::String(behavior)) = map.get_mut("revealBehavior") {
        *behavior = behavior.to_lowercase();
    }
    for key in ["customPatterns", "excludeTerms"] {
        if map.get(key).is_some_and(Value::is_null) {
            map.remove(key);
        }
    }
    if let Some(Value::Array(entries)) = map.get_mut("customPatterns") {
        drop_unreadable_patterns(entries);
    }
}

fn drop_unreadable_patterns(entries: &mut Vec<Value>) {
    let before = entries.len();
    entries.retain(|entry| PatternEntry::deserialize(entry).is_ok());

    let dropped = before - entries.len();
    if dropped > 0 {
        #[cfg(feature = "tracing")]
        warn!(dropped, "discarding unreadable custom patterns from legacy settings");
    }
}
