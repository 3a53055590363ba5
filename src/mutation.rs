//! Discovery of individual mutations.
//!
//! A mutation is one located edit produced by applying an operator's rewrite
//! template at one of its match sites. Discovery walks the operators
//! registered for a language in registration order and, for each, the match
//! spans the structural matcher reports in discovery order, so its output is
//! deterministic for a given text.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::collab::StructuralMatcher;
use crate::error::Result;
use crate::language::Language;
use crate::location::{FileLocationRange, LineOffsets};
use crate::operator::Operators;
use crate::replacement::{OffsetSpan, Replacement};

/// A single admissible edit: which operator produced it, where it applies,
/// and the replacement that realizes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mutation {
    operator: String,
    location: FileLocationRange,
    replacement: Replacement,
}

impl Mutation {
    pub fn new(
        operator: impl Into<String>,
        location: FileLocationRange,
        replacement: Replacement,
    ) -> Mutation {
        Mutation {
            operator: operator.into(),
            location,
            replacement,
        }
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn location(&self) -> &FileLocationRange {
        &self.location
    }

    pub fn replacement(&self) -> &Replacement {
        &self.replacement
    }
}

/// Finds every mutation of `text` admitted by the operators registered for
/// `language`. Matches failing one of an operator's constraints are
/// discarded; `restrict_to_lines`, when given, keeps only matches starting
/// on one of the listed lines. Read-only with respect to the text and the
/// registries; concurrent discovery over different files is safe.
pub fn discover(
    language: &Language,
    operators: &Operators,
    filepath: &str,
    text: &str,
    matcher: &dyn StructuralMatcher,
    restrict_to_lines: Option<&HashSet<usize>>,
) -> Result<Vec<Mutation>> {
    let offsets = LineOffsets::scan(text);
    let mut mutations = Vec::new();
    for operator in operators.for_language(language.name()) {
        let spans = matcher.match_spans(operator.match_template(), text)?;
        debug!(
            "operator {} matched {} sites in {}",
            operator.name(),
            spans.len(),
            filepath
        );
        for span in spans {
            if let Some(lines) = restrict_to_lines {
                if !lines.contains(&span.range.start().line) {
                    continue;
                }
            }
            let span_offsets = OffsetSpan {
                start: offsets.offset_at(span.range.start())?,
                stop: offsets.offset_at(span.range.stop())?,
            };
            let satisfied = operator
                .constraints()
                .iter()
                .all(|c| c.is_satisfied_by(&span, text, span_offsets));
            if !satisfied {
                debug!(
                    "match at {} fails a constraint of operator {}",
                    span.range,
                    operator.name()
                );
                continue;
            }
            let location = FileLocationRange::new(filepath, span.range);
            let rewritten = operator.substitute(&span.environment);
            let replacement = Replacement::new(location.clone(), rewritten);
            mutations.push(Mutation::new(operator.name(), location, replacement));
        }
    }
    Ok(mutations)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::collab::MatchSpan;
    use crate::constraint::Constraint;
    use crate::error::ForgeError;
    use crate::language::Languages;
    use crate::location::{Location, LocationRange};
    use crate::operator::Operator;

    /// Matcher backed by a fixed template -> spans table.
    struct FakeMatcher {
        spans: HashMap<String, Vec<MatchSpan>>,
        fail: bool,
    }

    impl StructuralMatcher for FakeMatcher {
        fn match_spans(&self, template: &str, _text: &str) -> Result<Vec<MatchSpan>> {
            if self.fail {
                return Err(ForgeError::CollaboratorUnavailable {
                    reason: "matcher refused connection".to_string(),
                });
            }
            Ok(self.spans.get(template).cloned().unwrap_or_default())
        }
    }

    fn fixture() -> (Language, Operators, FakeMatcher) {
        let mut languages = Languages::new();
        let c = Language::new("c", vec![".c".to_string()]);
        languages.add(c.clone()).unwrap();

        let mut operators = Operators::new();
        operators
            .add(
                Operator::new("FLIP_PLUS", vec!["c".to_string()], ":[1] + :[2]", ":[1] - :[2]"),
                &languages,
            )
            .unwrap();
        operators
            .add(
                Operator::new("NEGATE_IF", vec!["c".to_string()], "if (:[1])", "if (!(:[1]))"),
                &languages,
            )
            .unwrap();

        let range = LocationRange::new(Location::new(1, 9), Location::new(1, 13)).unwrap();
        let span = MatchSpan {
            range,
            environment: HashMap::from([
                ("1".to_string(), "1".to_string()),
                ("2".to_string(), "1".to_string()),
            ]),
        };
        let matcher = FakeMatcher {
            spans: HashMap::from([(":[1] + :[2]".to_string(), vec![span])]),
            fail: false,
        };
        (c, operators, matcher)
    }

    #[test]
    fn test_discover_builds_replacements() {
        let (language, operators, matcher) = fixture();
        let mutations = discover(
            &language,
            &operators,
            "src/main.c",
            "int x = 1 + 1;",
            &matcher,
            None,
        )
        .unwrap();
        assert_eq!(mutations.len(), 1);
        let mutation = &mutations[0];
        assert_eq!(mutation.operator(), "FLIP_PLUS");
        assert_eq!(mutation.location().to_string(), "src/main.c@1:9::1:13");
        assert_eq!(mutation.replacement().text(), "1 - 1");
    }

    #[test]
    fn test_discover_is_deterministic() {
        let (language, operators, matcher) = fixture();
        let text = "int x = 1 + 1;";
        let first = discover(&language, &operators, "src/main.c", text, &matcher, None).unwrap();
        let second = discover(&language, &operators, "src/main.c", text, &matcher, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_discover_surfaces_matcher_failure() {
        let (language, operators, mut matcher) = fixture();
        matcher.fail = true;
        let result = discover(&language, &operators, "src/main.c", "int x;", &matcher, None);
        assert!(matches!(
            result,
            Err(ForgeError::CollaboratorUnavailable { .. })
        ));
    }

    #[test]
    fn test_discover_with_no_matches() {
        let (language, operators, _) = fixture();
        let matcher = FakeMatcher {
            spans: HashMap::new(),
            fail: false,
        };
        let mutations =
            discover(&language, &operators, "src/main.c", "int x;", &matcher, None).unwrap();
        assert!(mutations.is_empty());
    }

    #[test]
    fn test_discover_restricted_to_lines() {
        let (language, operators, matcher) = fixture();
        let text = "int x = 1 + 1;";
        let lines: HashSet<usize> = HashSet::from([2, 3]);
        let mutations = discover(
            &language,
            &operators,
            "src/main.c",
            text,
            &matcher,
            Some(&lines),
        )
        .unwrap();
        assert!(mutations.is_empty());

        let lines: HashSet<usize> = HashSet::from([1]);
        let mutations = discover(
            &language,
            &operators,
            "src/main.c",
            text,
            &matcher,
            Some(&lines),
        )
        .unwrap();
        assert_eq!(mutations.len(), 1);
    }

    #[test]
    fn test_discover_applies_constraints() {
        let (language, _, matcher) = fixture();
        // A registry whose only operator carries a constraint the fixture
        // match fails.
        let mut languages = Languages::new();
        languages
            .add(Language::new("c", vec![".c".to_string()]))
            .unwrap();
        let mut operators = Operators::new();
        operators
            .add(
                Operator::new("FLIP_PLUS", vec!["c".to_string()], ":[1] + :[2]", ":[1] - :[2]")
                    .with_constraints(vec![Constraint::PrecededBy {
                        any_of: vec!["while (".to_string()],
                    }]),
                &languages,
            )
            .unwrap();
        let mutations = discover(
            &language,
            &operators,
            "src/main.c",
            "int x = 1 + 1;",
            &matcher,
            None,
        )
        .unwrap();
        assert!(mutations.is_empty());

        // A satisfiable constraint lets the match through.
        operators = Operators::new();
        operators
            .add(
                Operator::new("FLIP_PLUS", vec!["c".to_string()], ":[1] + :[2]", ":[1] - :[2]")
                    .with_constraints(vec![Constraint::IsSingleTerm {
                        hole: "1".to_string(),
                    }]),
                &languages,
            )
            .unwrap();
        let mutations = discover(
            &language,
            &operators,
            "src/main.c",
            "int x = 1 + 1;",
            &matcher,
            None,
        )
        .unwrap();
        assert_eq!(mutations.len(), 1);
    }
}
