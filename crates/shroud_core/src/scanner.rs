//! Tree scanning: find pattern matches in text leaves and wrap them.

use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::document::{MarkerSet, NodeId, Piece, TextTree};
use crate::exclusion::ExclusionFilter;
use crate::pattern::{PatternSet, find_matches};
use crate::span::{DisplayMode, SpanId, SpanRegistry, SpanSource};

/// Summary of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Text leaves examined.
    pub leaves_visited: usize,
    /// Text leaves skipped because they sit inside a redacted or protected region.
    pub leaves_skipped: usize,
    /// Spans created, in document order.
    pub spans_created: Vec<SpanId>,
    /// Candidate matches vetoed by the exclusion filter.
    pub matches_excluded: usize,
    /// IDs of custom patterns dropped because they failed to compile.
    pub patterns_skipped: Vec<String>,
}

/// Walks the text leaves of a subtree and wraps every surviving match in a
/// redacted span.
///
/// Leaves inside an element carrying [`MarkerSet::SCAN_BARRIER`] are never
/// examined, so scanning the same subtree twice creates no new spans.
#[derive(Debug, Clone, Copy)]
pub struct TreeScanner<'a> {
    patterns: &'a PatternSet,
    exclusions: &'a ExclusionFilter,
    display_mode: DisplayMode,
}

impl<'a> TreeScanner<'a> {
    /// Creates a scanner over the given pattern set and exclusions.
    #[must_use]
    pub const fn new(patterns: &'a PatternSet, exclusions: &'a ExclusionFilter, display_mode: DisplayMode) -> Self {
        Self {
            patterns,
            exclusions,
            display_mode,
        }
    }

    /// Scans every text leaf under `root`, registering created spans in `spans`.
    pub fn scan<T: TextTree + ?Sized>(&self, tree: &mut T, root: NodeId, spans: &mut SpanRegistry) -> ScanReport {
        let mut report = ScanReport::default();
        if self.patterns.is_empty() {
            return report;
        }

        for leaf in tree.text_leaves(root) {
            if tree.within_marked(leaf, MarkerSet::SCAN_BARRIER) {
                report.leaves_skipped += 1;
                continue;
            }
            report.leaves_visited += 1;
            self.rewrite_leaf(tree, leaf, spans, &mut report);
        }

        #[cfg(feature = "tracing")]
        debug!(
            visited = report.leaves_visited,
            skipped = report.leaves_skipped,
            created = report.spans_created.len(),
            excluded = report.matches_excluded,
            "scan complete"
        );

        report
    }

    fn rewrite_leaf<T: TextTree + ?Sized>(
        &self,
        tree: &mut T,
        leaf: NodeId,
        spans: &mut SpanRegistry,
        report: &mut ScanReport,
    ) {
        let Some(text) = tree.leaf_text(leaf).map(str::to_owned) else {
            return;
        };

        let matches = find_matches(&text, self.patterns.patterns(), self.exclusions);
        report.matches_excluded += matches.excluded;
        if matches.spans.is_empty() {
            return;
        }

        let markers = self.display_mode.markers();
        let mut pieces = Vec::with_capacity(matches.spans.len() * 2 + 1);
        let mut cursor = 0;
        for span in &matches.spans {
            if span.start > cursor {
                pieces.push(Piece::Text(&text[cursor..span.start]));
            }
            pieces.push(Piece::Redacted {
                text: &text[span.start..span.end],
                markers,
            });
            cursor = span.end;
        }
        if cursor < text.len() {
            pieces.push(Piece::Text(&text[cursor..]));
        }

        let created = tree.replace_leaf(leaf, &pieces);
        if created.len() != pieces.len() {
            #[cfg(feature = "tracing")]
            trace!(%leaf, "leaf could not be replaced");
            return;
        }

        let mut matched = matches.spans.iter();
        for (piece, node) in pieces.iter().zip(created) {
            let Piece::Redacted { text, .. } = piece else {
                continue;
            };
            let Some(found) = matched.next() else {
                break;
            };
            let id = spans.register(
                node,
                text,
                self.display_mode,
                SpanSource::Pattern {
                    pattern_id: found.pattern_id.clone(),
                },
            );
            report.spans_created.push(id);
        }
    }
}
