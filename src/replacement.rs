//! Replacements: a file-qualified range together with its substitute text.
//!
//! Line/column ranges are resolved to character offset spans once per
//! composition, against the line-offset table of the text revision being
//! rewritten. All overlap questions are answered on the resolved spans.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::location::{FileLocationRange, LineOffsets};

/// An inclusive span of 0-indexed character offsets within a single text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetSpan {
    pub start: usize,
    pub stop: usize,
}

impl OffsetSpan {
    /// Two inclusive spans overlap iff each starts at or before the other's
    /// stop.
    pub fn overlaps(&self, other: &OffsetSpan) -> bool {
        self.start <= other.stop && other.start <= self.stop
    }
}

/// The substitution of a contiguous range of characters in a given file with
/// a new piece of text. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Replacement {
    location: FileLocationRange,
    text: String,
}

impl Replacement {
    pub fn new(location: FileLocationRange, text: impl Into<String>) -> Replacement {
        Replacement {
            location,
            text: text.into(),
        }
    }

    pub fn filename(&self) -> &str {
        self.location.filename()
    }

    pub fn location(&self) -> &FileLocationRange {
        &self.location
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Resolves the line/column range into an inclusive offset span against
    /// `offsets`. The stop must fall inside the text, so splicing on the
    /// resolved span can never run past the end.
    pub fn resolve(&self, offsets: &LineOffsets) -> Result<OffsetSpan> {
        let start = offsets.offset_at(self.location.start())?;
        let stop = offsets.offset_at(self.location.stop())?;
        if stop >= offsets.text_len() {
            return Err(ForgeError::OutOfBounds {
                detail: format!(
                    "replacement stop ({}) exceeds a text of {} characters",
                    self.location.stop(),
                    offsets.text_len()
                ),
            });
        }
        Ok(OffsetSpan { start, stop })
    }

    /// Whether this replacement touches any character another replacement
    /// also touches. Replacements in different files never conflict.
    pub fn conflicts_with(&self, other: &Replacement, offsets: &LineOffsets) -> Result<bool> {
        if self.filename() != other.filename() {
            return Ok(false);
        }
        Ok(self.resolve(offsets)?.overlaps(&other.resolve(offsets)?))
    }
}

impl fmt::Display for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.location, self.text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn replacement(s: &str, text: &str) -> Replacement {
        Replacement::new(s.parse::<FileLocationRange>().unwrap(), text)
    }

    #[test]
    fn test_span_overlap() {
        let a = OffsetSpan { start: 5, stop: 10 };
        let b = OffsetSpan { start: 8, stop: 12 };
        let c = OffsetSpan { start: 11, stop: 12 };
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
        // A one-character span overlaps itself.
        let d = OffsetSpan { start: 3, stop: 3 };
        assert!(d.overlaps(&d));
    }

    #[test]
    fn test_resolve() {
        let offsets = LineOffsets::scan("int x = 1 + 1;");
        let r = replacement("foo.c@1:9::1:13", "1 - 1");
        let span = r.resolve(&offsets).unwrap();
        assert_eq!(span, OffsetSpan { start: 8, stop: 12 });
    }

    #[test]
    fn test_resolve_rejects_overlong_stop() {
        let offsets = LineOffsets::scan("ab");
        let r = replacement("foo.c@1:1::1:3", "x");
        assert!(matches!(
            r.resolve(&offsets),
            Err(ForgeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_conflict_requires_same_file() {
        let offsets = LineOffsets::scan("abcdefghijklmn");
        let a = replacement("foo.c@1:6::1:11", "x");
        let b = replacement("foo.c@1:9::1:13", "y");
        let c = replacement("bar.c@1:9::1:13", "y");
        assert!(a.conflicts_with(&b, &offsets).unwrap());
        assert!(!a.conflicts_with(&c, &offsets).unwrap());
    }

    #[test]
    fn test_wire_form() {
        let r = replacement("foo.c@1:9::1:13", "1 - 1");
        let encoded = serde_json::to_value(&r).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({"location": "foo.c@1:9::1:13", "text": "1 - 1"})
        );
        let decoded: Replacement = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, r);
    }

    #[test]
    fn test_display() {
        let r = replacement("foo.c@1:9::1:13", "1 - 1");
        assert_eq!(r.to_string(), "foo.c@1:9::1:13 -> 1 - 1");
    }
}
