//! Redaction patterns and the ordered pattern set.

/// Ordered, non-overlapping match accumulation.
pub mod matcher;

use std::fmt;
use std::sync::Arc;

use regex::Regex;

#[cfg(feature = "tracing")]
use tracing::warn;

use crate::error::PatternError;
use crate::settings::{PatternEntry, RedactionSettings};

pub use matcher::{MatchSpan, Matches, find_matches};

/// Where a pattern came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternSource {
    /// One of the fixed PII rules.
    Builtin,
    /// A user-supplied entry from `customPatterns`.
    Custom,
}

/// A compiled redaction rule.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Unique identifier (e.g. `"pii/email"`, `"custom/0"`).
    pub id: Arc<str>,
    /// Short human-readable name.
    pub name: Box<str>,
    /// Whether the rule is built in or user supplied.
    pub source: PatternSource,
    /// Compiled regular expression.
    pub regex: Regex,
}

impl Pattern {
    /// Compiles a pattern from a regular expression.
    pub fn from_regex(id: &str, name: &str, source: PatternSource, expr: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(expr).map_err(|source| PatternError::InvalidRegex {
            id: id.to_owned(),
            source,
        })?;

        Ok(Self {
            id: Arc::from(id),
            name: name.into(),
            source,
            regex,
        })
    }

    /// Compiles a literal term into a case-insensitive pattern matching the
    /// whole term.
    pub fn literal(id: &str, term: &str) -> Result<Self, PatternError> {
        let expr = format!("(?i){}", regex::escape(term));
        Self::from_regex(id, term, PatternSource::Custom, &expr)
    }

    /// Compiles the `index`-th `customPatterns` entry.
    pub fn from_entry(index: usize, entry: &PatternEntry) -> Result<Self, PatternError> {
        let id = format!("custom/{index}");
        match entry {
            PatternEntry::Literal(term) => Self::literal(&id, term),
            PatternEntry::Compiled(compiled) => {
                Self::from_regex(&id, &compiled.regex, PatternSource::Custom, &compiled.to_expression())
            }
        }
    }
}

struct BuiltinRule {
    id: &'static str,
    name: &'static str,
    regex: &'static str,
}

/// The fixed PII rules, in evaluation order. Digits are ASCII only.
const BUILTIN_PII: [BuiltinRule; 4] = [
    BuiltinRule {
        id: "pii/ssn",
        name: "Social Security Number",
        regex: r"\b[0-9]{3}-[0-9]{2}-[0-9]{4}\b",
    },
    BuiltinRule {
        id: "pii/credit-card",
        name: "Credit Card Number",
        regex: r"\b[0-9]{4}[- ]?[0-9]{4}[- ]?[0-9]{4}[- ]?[0-9]{4}\b",
    },
    BuiltinRule {
        id: "pii/email",
        name: "Email Address",
        regex: r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
    },
    BuiltinRule {
        id: "pii/phone",
        name: "Phone Number",
        regex: r"(?:\([0-9]{3}\)\s?|\b[0-9]{3}[-.\s]?)[0-9]{3}[-.\s]?[0-9]{4}\b",
    },
];

/// Ordered collection of [`Pattern`]s.
///
/// Order is significant: a region claimed by an earlier pattern is never
/// considered by a later one.
#[derive(Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl fmt::Debug for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternSet")
            .field("patterns", &self.patterns.iter().map(|p| p.id.as_ref()).collect::<Vec<_>>())
            .finish()
    }
}

impl PatternSet {
    /// Creates a set from patterns in evaluation order.
    #[must_use]
    pub const fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    /// Creates a set holding only the built-in PII rules.
    pub fn builtin_pii() -> Result<Self, PatternError> {
        let patterns = BUILTIN_PII
            .iter()
            .map(|rule| Pattern::from_regex(rule.id, rule.name, PatternSource::Builtin, rule.regex))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns))
    }

    /// Builds the active set for `settings`: the PII rules (when
    /// `autoRedactPII` is on) followed by every custom pattern.
    ///
    /// Patterns that fail to compile are skipped and returned alongside the
    /// set so the caller can report them; they never abort the build.
    #[must_use]
    pub fn compile(settings: &RedactionSettings) -> (Self, Vec<PatternError>) {
        let mut patterns = Vec::new();
        let mut skipped = Vec::new();

        if settings.auto_redact_pii {
            for rule in &BUILTIN_PII {
                match Pattern::from_regex(rule.id, rule.name, PatternSource::Builtin, rule.regex) {
                    Ok(pattern) => patterns.push(pattern),
                    Err(e) => skipped.push(e),
                }
            }
        }

        for (index, entry) in settings.custom_patterns.iter().enumerate() {
            if entry.is_blank() {
                continue;
            }
            match Pattern::from_entry(index, entry) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    warn!(pattern_id = e.pattern_id(), error = %e, "skipping invalid custom pattern");
                    skipped.push(e);
                }
            }
        }

        (Self::new(patterns), skipped)
    }

    /// Returns all patterns in evaluation order.
    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Looks up a pattern by its ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id.as_ref() == id)
    }

    /// Returns the number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if the set contains no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CompiledPattern;

    fn builtin(id: &str) -> Pattern {
        PatternSet::builtin_pii().unwrap().get(id).unwrap().clone()
    }

    #[test]
    fn builtin_pii_has_four_rules_in_fixed_order() {
        let set = PatternSet::builtin_pii().unwrap();
        let ids: Vec<_> = set.patterns().iter().map(|p| p.id.as_ref()).collect();
        assert_eq!(ids, vec!["pii/ssn", "pii/credit-card", "pii/email", "pii/phone"]);
        assert!(set.patterns().iter().all(|p| p.source == PatternSource::Builtin));
    }

    #[test]
    fn ssn_rule_matches_dashed_ssn() {
        let ssn = builtin("pii/ssn");
        assert!(ssn.regex.is_match("SSN 123-45-6789."));
        assert!(!ssn.regex.is_match("555-123-4567"));
    }

    #[test]
    fn credit_card_rule_accepts_spaces_dashes_and_runs() {
        let card = builtin("pii/credit-card");
        assert!(card.regex.is_match("4111 1111 1111 1111"));
        assert!(card.regex.is_match("4111-1111-1111-1111"));
        assert!(card.regex.is_match("4111111111111111"));
        assert!(!card.regex.is_match("4111 1111"));
    }

    #[test]
    fn email_rule_matches_whole_address() {
        let email = builtin("pii/email");
        let found = email.regex.find("Contact john.doe@email.com now").unwrap();
        assert_eq!(found.as_str(), "john.doe@email.com");
    }

    #[test]
    fn phone_rule_matches_common_formats() {
        let phone = builtin("pii/phone");
        for text in ["555-123-4567", "555.123.4567", "(555) 123-4567", "5551234567"] {
            assert!(phone.regex.is_match(text), "expected phone match for {text}");
        }
    }

    #[test]
    fn literal_pattern_is_case_insensitive_and_escaped() {
        let pattern = Pattern::literal("custom/0", "a.b (c)").unwrap();
        assert!(pattern.regex.is_match("see A.B (C) here"));
        assert!(!pattern.regex.is_match("axb (c)"));
        assert_eq!(pattern.name.as_ref(), "a.b (c)");
    }

    #[test]
    fn compile_puts_pii_rules_before_custom_patterns() {
        let mut settings = RedactionSettings::default();
        settings.add_custom_pattern("confidential");

        let (set, skipped) = PatternSet::compile(&settings);
        assert!(skipped.is_empty());
        assert_eq!(set.len(), 5);
        assert_eq!(set.patterns()[4].id.as_ref(), "custom/0");
    }

    #[test]
    fn compile_omits_pii_rules_when_auto_redact_is_off() {
        let mut settings = RedactionSettings {
            auto_redact_pii: false,
            ..RedactionSettings::default()
        };
        settings.add_custom_pattern("confidential");

        let (set, _) = PatternSet::compile(&settings);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn compile_skips_invalid_custom_regex_and_keeps_the_rest() {
        let mut settings = RedactionSettings::default();
        settings.custom_patterns = vec![
            PatternEntry::Compiled(CompiledPattern::new("[broken", "")),
            PatternEntry::Literal("secret".into()),
        ];

        let (set, skipped) = PatternSet::compile(&settings);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].pattern_id(), "custom/0");
        assert!(set.get("custom/1").is_some());
    }

    #[test]
    fn compiled_entry_applies_flags() {
        let entry = PatternEntry::Compiled(CompiledPattern::new(r"project-\d+", "gi"));
        let pattern = Pattern::from_entry(3, &entry).unwrap();
        assert_eq!(pattern.id.as_ref(), "custom/3");
        assert!(pattern.regex.is_match("PROJECT-42"));
    }

    #[test]
    fn builtin_rules_ignore_non_ascii_digits() {
        assert!(!builtin("pii/ssn").regex.is_match("１２３-４５-６７８９"));
        assert!(!builtin("pii/phone").regex.is_match("５５５-１２３-４５６７"));
        assert!(!builtin("pii/credit-card").regex.is_match("٤١١١ ١١١١ ١١١١ ١١١١"));
        assert!(builtin("pii/ssn").regex.is_match("123-45-6789"));
    }

    #[test]
    fn debug_lists_pattern_ids() {
        let set = PatternSet::builtin_pii().unwrap();
        assert!(format!("{set:?}").contains("pii/email"));
    }
}
