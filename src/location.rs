//! Positions, ranges and the line-offset table.
//!
//! Locations are 1-indexed (line, column) pairs. Ranges are inclusive at both
//! ends. Overlap and containment questions are answered on derived character
//! offsets, never on line/column pairs, so the line-offset table for a text is
//! computed once and reused.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

/// A 1-indexed character position within a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn new(line: usize, col: usize) -> Location {
        Location { line, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl FromStr for Location {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Location> {
        let (line, col) = s.split_once(':').ok_or_else(|| ForgeError::BadFormat {
            reason: format!("expected location of the form 'line:col', got '{}'", s),
        })?;
        let line = line.parse().map_err(|_| ForgeError::BadFormat {
            reason: format!("invalid line number in location: '{}'", s),
        })?;
        let col = col.parse().map_err(|_| ForgeError::BadFormat {
            reason: format!("invalid column number in location: '{}'", s),
        })?;
        Ok(Location { line, col })
    }
}

/// A contiguous range of locations, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationRange {
    start: Location,
    stop: Location,
}

impl LocationRange {
    /// Constructs a range, rejecting a `stop` that precedes `start` under
    /// line-then-column ordering.
    pub fn new(start: Location, stop: Location) -> Result<LocationRange> {
        if stop < start {
            return Err(ForgeError::BadFormat {
                reason: format!("range stop ({}) precedes its start ({})", stop, start),
            });
        }
        Ok(LocationRange { start, stop })
    }

    pub fn start(&self) -> Location {
        self.start
    }

    pub fn stop(&self) -> Location {
        self.stop
    }
}

impl fmt::Display for LocationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.start, self.stop)
    }
}

impl FromStr for LocationRange {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<LocationRange> {
        let (start, stop) = s.split_once("::").ok_or_else(|| ForgeError::BadFormat {
            reason: format!("expected range of the form 'l:c::l:c', got '{}'", s),
        })?;
        LocationRange::new(start.parse()?, stop.parse()?)
    }
}

/// A range of characters within a particular file, given by its path relative
/// to the source root. Ranges in different files are never compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileLocationRange {
    filename: String,
    range: LocationRange,
}

impl FileLocationRange {
    pub fn new(filename: impl Into<String>, range: LocationRange) -> FileLocationRange {
        FileLocationRange {
            filename: filename.into(),
            range,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn range(&self) -> &LocationRange {
        &self.range
    }

    pub fn start(&self) -> Location {
        self.range.start
    }

    pub fn stop(&self) -> Location {
        self.range.stop
    }
}

impl fmt::Display for FileLocationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.filename, self.range)
    }
}

impl FromStr for FileLocationRange {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<FileLocationRange> {
        // The filename may itself contain '@'; the range never does, so split
        // on the last occurrence.
        let at = s.rfind('@').ok_or_else(|| ForgeError::BadFormat {
            reason: format!("expected range of the form 'path@l:c::l:c', got '{}'", s),
        })?;
        let range = s[at + 1..].parse()?;
        Ok(FileLocationRange::new(&s[..at], range))
    }
}

impl Serialize for FileLocationRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileLocationRange {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<FileLocationRange, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The table mapping each line of a text to the character offset of its first
/// character, plus the total character length of the text.
///
/// Building the table is the dominant cost of offset arithmetic, so it is
/// computed once per distinct text and cached by the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOffsets {
    offsets: Vec<usize>,
    text_len: usize,
}

impl LineOffsets {
    /// Scans `text` once, recording offset 0 for line 1 plus the offset
    /// immediately following each newline.
    pub fn scan(text: &str) -> LineOffsets {
        let mut offsets = vec![0];
        let mut text_len = 0;
        for ch in text.chars() {
            text_len += 1;
            if ch == '\n' {
                offsets.push(text_len);
            }
        }
        LineOffsets { offsets, text_len }
    }

    /// The number of lines in the scanned text.
    pub fn num_lines(&self) -> usize {
        self.offsets.len()
    }

    /// The total character length of the scanned text.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Transforms a 1-indexed location into a 0-indexed character offset.
    pub fn offset_at(&self, location: Location) -> Result<usize> {
        let out_of_bounds = || ForgeError::OutOfBounds {
            detail: format!(
                "location {} exceeds a text of {} lines and {} characters",
                location,
                self.offsets.len(),
                self.text_len
            ),
        };
        let line_idx = location.line.checked_sub(1).ok_or_else(out_of_bounds)?;
        let line_start = *self.offsets.get(line_idx).ok_or_else(out_of_bounds)?;
        let col = location.col.checked_sub(1).ok_or_else(out_of_bounds)?;
        let offset = line_start + col;
        if offset > self.text_len {
            return Err(out_of_bounds());
        }
        Ok(offset)
    }

    /// The inverse of [`offset_at`](Self::offset_at).
    pub fn location_at(&self, offset: usize) -> Result<Location> {
        if offset > self.text_len {
            return Err(ForgeError::OutOfBounds {
                detail: format!(
                    "offset {} exceeds a text of {} characters",
                    offset, self.text_len
                ),
            });
        }
        // Index of the last line starting at or before the offset.
        let line_idx = self.offsets.partition_point(|&start| start <= offset) - 1;
        Ok(Location::new(line_idx + 1, offset - self.offsets[line_idx] + 1))
    }
}
