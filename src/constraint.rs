//! Constraints narrowing which matches of an operator become mutations.
//!
//! A hole template often over-matches: `:[1] + :[2]` matches any text around
//! a plus sign, not just a binary arithmetic expression. Operators may carry
//! constraints that each match must satisfy; a match failing any constraint
//! is discarded during discovery. Constraints are evaluated against the
//! match's captured environment and the text surrounding the match, never by
//! re-invoking the matcher.

use serde::{Deserialize, Serialize};

use crate::collab::MatchSpan;
use crate::replacement::OffsetSpan;

/// A predicate over one match of an operator's match template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Constraint {
    /// The named hole must have captured a single non-empty term: its
    /// fragment, after trimming, contains no whitespace. A hole absent from
    /// the environment fails the constraint.
    IsSingleTerm { hole: String },

    /// The text before the match, ignoring trailing whitespace, must end
    /// with one of the given strings.
    PrecededBy {
        #[serde(rename = "any-of")]
        any_of: Vec<String>,
    },
}

impl Constraint {
    /// Whether a match satisfies this constraint. `span_offsets` is the
    /// match's resolved character interval within `text`.
    pub fn is_satisfied_by(&self, span: &MatchSpan, text: &str, span_offsets: OffsetSpan) -> bool {
        match self {
            Constraint::IsSingleTerm { hole } => match span.environment.get(hole) {
                Some(fragment) => {
                    let fragment = fragment.trim();
                    !fragment.is_empty() && !fragment.chars().any(char::is_whitespace)
                }
                None => false,
            },
            Constraint::PrecededBy { any_of } => {
                let preceding: String = text.chars().take(span_offsets.start).collect();
                let preceding = preceding.trim_end();
                any_of.iter().any(|option| preceding.ends_with(option))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::location::{LineOffsets, Location, LocationRange};

    fn span_at(text: &str, start: Location, stop: Location, env: Vec<(&str, &str)>) -> (MatchSpan, OffsetSpan) {
        let offsets = LineOffsets::scan(text);
        let range = LocationRange::new(start, stop).unwrap();
        let span = MatchSpan {
            range,
            environment: env
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        let span_offsets = OffsetSpan {
            start: offsets.offset_at(start).unwrap(),
            stop: offsets.offset_at(stop).unwrap(),
        };
        (span, span_offsets)
    }

    #[test]
    fn test_is_single_term() {
        let text = "int x = 1 + 1;";
        let constraint = Constraint::IsSingleTerm {
            hole: "1".to_string(),
        };
        let (span, offsets) = span_at(
            text,
            Location::new(1, 9),
            Location::new(1, 13),
            vec![("1", "1")],
        );
        assert!(constraint.is_satisfied_by(&span, text, offsets));

        // A multi-term fragment fails.
        let (span, offsets) = span_at(
            text,
            Location::new(1, 9),
            Location::new(1, 13),
            vec![("1", "1 + 1")],
        );
        assert!(!constraint.is_satisfied_by(&span, text, offsets));

        // Leading and trailing whitespace around a single term is tolerated.
        let (span, offsets) = span_at(
            text,
            Location::new(1, 9),
            Location::new(1, 13),
            vec![("1", " x ")],
        );
        assert!(constraint.is_satisfied_by(&span, text, offsets));
    }

    #[test]
    fn test_is_single_term_missing_hole_fails() {
        let text = "int x = 1 + 1;";
        let constraint = Constraint::IsSingleTerm {
            hole: "2".to_string(),
        };
        let (span, offsets) = span_at(
            text,
            Location::new(1, 9),
            Location::new(1, 13),
            vec![("1", "1")],
        );
        assert!(!constraint.is_satisfied_by(&span, text, offsets));
    }

    #[test]
    fn test_preceded_by() {
        let text = "return  (x < 10);";
        let constraint = Constraint::PrecededBy {
            any_of: vec!["if".to_string(), "return".to_string()],
        };
        let (span, offsets) = span_at(
            text,
            Location::new(1, 9),
            Location::new(1, 17),
            vec![("1", "x < 10")],
        );
        assert!(constraint.is_satisfied_by(&span, text, offsets));

        let constraint = Constraint::PrecededBy {
            any_of: vec!["while".to_string()],
        };
        assert!(!constraint.is_satisfied_by(&span, text, offsets));
    }

    #[test]
    fn test_yaml_form() {
        let single: Constraint = serde_yaml::from_str("type: is-single-term\nhole: '1'\n").unwrap();
        assert_eq!(
            single,
            Constraint::IsSingleTerm {
                hole: "1".to_string()
            }
        );
        let preceded: Constraint =
            serde_yaml::from_str("type: preceded-by\nany-of: ['if (', 'while (']\n").unwrap();
        assert_eq!(
            preceded,
            Constraint::PrecededBy {
                any_of: vec!["if (".to_string(), "while (".to_string()]
            }
        );
        assert!(serde_yaml::from_str::<Constraint>("type: nonsense\n").is_err());
    }
}
