//! Composition and application of replacement sets.
//!
//! A transformation is a set of replacements over one file that has been
//! proven non-overlapping against a particular text revision. Offset spans
//! are resolved once, at composition time; application splices from the
//! highest start offset down so earlier splices never shift later spans.

use crate::error::{ForgeError, Result};
use crate::location::LineOffsets;
use crate::replacement::{OffsetSpan, Replacement};

/// A validated, non-conflicting set of replacements over a single file.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    filename: String,
    entries: Vec<(Replacement, OffsetSpan)>,
}

impl Transformation {
    /// Validates and orders a set of replacements against the text revision
    /// described by `offsets`.
    ///
    /// The set must be non-empty and single-file. Replacements are ordered by
    /// (start offset, stop offset), stable with respect to input order; the
    /// first overlapping adjacent pair fails the composition.
    pub fn compose(replacements: Vec<Replacement>, offsets: &LineOffsets) -> Result<Transformation> {
        let first = replacements.first().ok_or_else(|| ForgeError::BadFormat {
            reason: "cannot compose an empty set of replacements".to_string(),
        })?;
        let filename = first.filename().to_string();
        if replacements.iter().any(|r| r.filename() != filename) {
            return Err(ForgeError::BadFormat {
                reason: "cannot compose replacements across multiple files".to_string(),
            });
        }

        let mut entries = Vec::with_capacity(replacements.len());
        for replacement in replacements {
            let span = replacement.resolve(offsets)?;
            entries.push((replacement, span));
        }
        entries.sort_by_key(|(_, span)| (span.start, span.stop));

        for pair in entries.windows(2) {
            if pair[0].1.overlaps(&pair[1].1) {
                return Err(ForgeError::ConflictingReplacements {
                    first: pair[0].0.clone(),
                    second: pair[1].0.clone(),
                });
            }
        }
        Ok(Transformation { filename, entries })
    }

    /// The file all replacements apply to.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The composed replacements in span order.
    pub fn replacements(&self) -> impl Iterator<Item = &Replacement> {
        self.entries.iter().map(|(r, _)| r)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies the composed replacements to `text`.
    ///
    /// `text` must be the same revision the transformation was composed
    /// against; a text too short to contain the recorded spans is rejected
    /// with `OutOfBounds`. Pure: repeated application to the same input
    /// yields the same output.
    pub fn apply(&self, text: &str) -> Result<String> {
        let mut chars: Vec<char> = text.chars().collect();
        // Spans are disjoint and sorted, so the last entry has the greatest
        // stop; one bound check covers every splice below.
        if let Some((_, last)) = self.entries.last() {
            if last.stop >= chars.len() {
                return Err(ForgeError::OutOfBounds {
                    detail: format!(
                        "replacement interval [{}, {}] exceeds a text of {} characters",
                        last.start,
                        last.stop,
                        chars.len()
                    ),
                });
            }
        }
        for (replacement, span) in self.entries.iter().rev() {
            let tail = chars.split_off(span.stop + 1);
            chars.truncate(span.start);
            chars.extend(replacement.text().chars());
            chars.extend(tail);
        }
        Ok(chars.into_iter().collect())
    }
}
