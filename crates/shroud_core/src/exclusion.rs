//! Exclusion filter: vetoes candidate matches containing a configured term.

use aho_corasick::AhoCorasick;

/// Case-insensitive substring veto applied to every candidate match.
///
/// Terms are lowercased once and indexed in an Aho-Corasick automaton, so
/// checking a candidate costs one pass over its text regardless of how many
/// terms are configured. Terms are used as written, surrounding whitespace
/// included. Empty terms are dropped: they would veto every match.
pub struct ExclusionFilter {
    terms: Box<[Box<str>]>,
    automaton: Option<AhoCorasick>,
}

impl std::fmt::Debug for ExclusionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExclusionFilter")
            .field("terms", &self.terms.len())
            .finish_non_exhaustive()
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::empty()
    }
}

impl ExclusionFilter {
    /// A filter that never excludes anything.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            terms: Box::default(),
            automaton: None,
        }
    }

    /// Builds a filter from exclusion terms.
    #[must_use]
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Self {
        let terms: Box<[Box<str>]> = terms
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase().into_boxed_str())
            .collect();

        let automaton = if terms.is_empty() {
            None
        } else {
            AhoCorasick::new(terms.iter().map(AsRef::<str>::as_ref)).ok()
        };

        Self { terms, automaton }
    }

    /// Returns the number of active terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if the filter has no active terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns `true` if any term is a case-insensitive substring of `matched`.
    #[must_use]
    pub fn is_excluded(&self, matched: &str) -> bool {
        if self.terms.is_empty() {
            return false;
        }

        let lowered = matched.to_lowercase();
        match &self.automaton {
            Some(automaton) => automaton.is_match(&lowered),
            None => self.terms.iter().any(|t| lowered.contains(t.as_ref())),
        }
    }
}

/// Returns `true` if any of `terms` is a case-insensitive substring of
/// `matched`.
///
/// Convenience wrapper for one-off checks; build an [`ExclusionFilter`] once
/// when checking many candidates.
#[must_use]
pub fn is_excluded<S: AsRef<str>>(matched: &str, terms: &[S]) -> bool {
    ExclusionFilter::new(terms).is_excluded(matched)
}
