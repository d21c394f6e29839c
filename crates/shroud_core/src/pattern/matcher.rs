use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::trace;

use super::Pattern;
use crate::exclusion::ExclusionFilter;

/// A byte range of the scanned text claimed by one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    /// Byte offset of the first matched character.
    pub start: usize,
    /// Byte offset one past the last matched character.
    pub end: usize,
    /// Pattern that claimed the range.
    pub pattern_id: Arc<str>,
}

impl MatchSpan {
    /// Returns the byte length of the match.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the match covers zero bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if the two ranges share at least one byte.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Result of matching a pattern set against one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    /// Surviving matches, sorted by start offset and never overlapping.
    pub spans: Vec<MatchSpan>,
    /// Number of candidates vetoed by the exclusion filter.
    pub excluded: usize,
}

/// Matches every pattern against the original `text` and returns the
/// surviving, non-overlapping spans.
///
/// Patterns run in order. A candidate is dropped if it is empty, overlaps a
/// range already claimed by an earlier candidate, or contains an exclusion
/// term. Excluded candidates claim nothing, so later patterns may still match
/// inside them.
#[must_use]
pub fn find_matches(text: &str, patterns: &[Pattern], exclusions: &ExclusionFilter) -> Matches {
    let mut matches = Matches::default();

    for pattern in patterns {
        for mat in pattern.regex.find_iter(text) {
            if mat.start() == mat.end() {
                continue;
            }

            if matches.spans.iter().any(|s| s.overlaps(mat.start(), mat.end())) {
                continue;
            }

            if exclusions.is_excluded(mat.as_str()) {
                #[cfg(feature = "tracing")]
                trace!(pattern_id = %pattern.id, "match excluded");
                matches.excluded += 1;
                continue;
            }

            #[cfg(feature = "tracing")]
            trace!(pattern_id = %pattern.id, start = mat.start(), end = mat.end(), "match");

            matches.spans.push(MatchSpan {
                start: mat.start(),
                end: mat.end(),
                pattern_id: Arc::clone(&pattern.id),
            });
        }
    }

    matches.spans.sort_by_key(|s| s.start);
    matches
}
