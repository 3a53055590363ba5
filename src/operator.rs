//! Mutation operators and their registry.
//!
//! An operator pairs a match template with a rewrite template, both written
//! in the structural matcher's hole syntax (`:[name]`). The engine never
//! interprets the match template itself; it hands it to the matcher and
//! substitutes the captured fragments into the rewrite template.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::{ForgeError, Result};
use crate::language::Languages;

/// A named source-to-source rewrite rule over one or more languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    name: String,
    languages: Vec<String>,
    #[serde(rename = "match")]
    match_template: String,
    #[serde(rename = "rewrite")]
    rewrite_template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    constraints: Vec<Constraint>,
}

impl Operator {
    pub fn new(
        name: impl Into<String>,
        languages: Vec<String>,
        match_template: impl Into<String>,
        rewrite_template: impl Into<String>,
    ) -> Operator {
        Operator {
            name: name.into(),
            languages,
            match_template: match_template.into(),
            rewrite_template: rewrite_template.into(),
            constraints: Vec::new(),
        }
    }

    /// Attaches constraints that every match of this operator must satisfy.
    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Operator {
        self.constraints = constraints;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn match_template(&self) -> &str {
        &self.match_template
    }

    pub fn rewrite_template(&self) -> &str {
        &self.rewrite_template
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn supports_language(&self, name: &str) -> bool {
        self.languages.iter().any(|l| l == name)
    }

    /// Substitutes captured fragments into the rewrite template. Holes are
    /// substituted longest-name first so a hole named `12` is never clobbered
    /// by one named `1`.
    pub fn substitute(&self, environment: &HashMap<String, String>) -> String {
        let mut holes: Vec<(&String, &String)> = environment.iter().collect();
        holes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
        let mut text = self.rewrite_template.clone();
        for (hole, fragment) in holes {
            text = text.replace(&format!(":[{}]", hole), fragment);
        }
        text
    }
}

/// The set of registered operators. Populated once at startup and read-only
/// thereafter.
#[derive(Debug, Clone, Default)]
pub struct Operators {
    operators: Vec<Operator>,
}

impl Operators {
    pub fn new() -> Operators {
        Operators::default()
    }

    /// Registers an operator. Every supported language must already be
    /// registered, and the operator's name must be free in each of them.
    pub fn add(&mut self, operator: Operator, languages: &Languages) -> Result<()> {
        for language in &operator.languages {
            if !languages.supports(language) {
                return Err(ForgeError::LanguageNotFound {
                    name: language.clone(),
                });
            }
        }
        let collision = self.operators.iter().any(|existing| {
            existing.name == operator.name
                && existing
                    .languages
                    .iter()
                    .any(|l| operator.languages.contains(l))
        });
        if collision {
            return Err(ForgeError::OperatorNameAlreadyExists {
                name: operator.name.clone(),
            });
        }
        self.operators.push(operator);
        Ok(())
    }

    /// The unique operator of this name. Registration permits the same name
    /// across disjoint language sets, so a name shared by several operators
    /// is rejected here; use [`find`](Self::find) to qualify by language.
    pub fn get(&self, name: &str) -> Result<&Operator> {
        let mut matches = self.operators.iter().filter(|o| o.name == name);
        let operator = matches.next().ok_or_else(|| ForgeError::OperatorNotFound {
            name: name.to_string(),
        })?;
        if matches.next().is_some() {
            return Err(ForgeError::BadFormat {
                reason: format!(
                    "operator name is registered for several languages: {} (qualify with a language)",
                    name
                ),
            });
        }
        Ok(operator)
    }

    /// The operator of this name registered for the given language.
    pub fn find(&self, language: &str, name: &str) -> Result<&Operator> {
        self.operators
            .iter()
            .find(|o| o.name == name && o.supports_language(language))
            .ok_or_else(|| ForgeError::OperatorNotFound {
                name: name.to_string(),
            })
    }

    /// The operators supporting a language, in registration order.
    pub fn for_language<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a Operator> {
        self.operators
            .iter()
            .filter(move |o| o.supports_language(language))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operator> {
        self.operators.iter()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::language::Language;

    fn languages() -> Languages {
        let mut languages = Languages::new();
        languages
            .add(Language::new("c", vec![".c".to_string(), ".h".to_string()]))
            .unwrap();
        languages
            .add(Language::new("python", vec![".py".to_string()]))
            .unwrap();
        languages
    }

    fn negate_if() -> Operator {
        Operator::new(
            "NEGATE_IF_CONDITION_CSTYLE",
            vec!["c".to_string()],
            "if (:[1])",
            "if (!(:[1]))",
        )
    }

    #[test]
    fn test_substitute() {
        let env = HashMap::from([("1".to_string(), "x < 10".to_string())]);
        assert_eq!(negate_if().substitute(&env), "if (!(x < 10))");
    }

    #[test]
    fn test_substitute_multiple_holes() {
        let op = Operator::new("SWAP", vec!["c".to_string()], ":[1] + :[2]", ":[2] + :[1]");
        let env = HashMap::from([
            ("1".to_string(), "a".to_string()),
            ("2".to_string(), "b".to_string()),
        ]);
        assert_eq!(op.substitute(&env), "b + a");
    }

    #[test]
    fn test_substitute_prefers_longer_hole_names() {
        let op = Operator::new("X", vec!["c".to_string()], "", ":[12]:[1]");
        let env = HashMap::from([
            ("1".to_string(), "one".to_string()),
            ("12".to_string(), "twelve".to_string()),
        ]);
        assert_eq!(op.substitute(&env), "twelveone");
    }

    #[test]
    fn test_add_rejects_unknown_language() {
        let mut operators = Operators::new();
        let op = Operator::new("X", vec!["cobol".to_string()], "a", "b");
        assert!(matches!(
            operators.add(op, &languages()),
            Err(ForgeError::LanguageNotFound { .. })
        ));
    }

    #[test]
    fn test_add_rejects_duplicate_name_per_language() {
        let languages = languages();
        let mut operators = Operators::new();
        operators.add(negate_if(), &languages).unwrap();
        assert!(matches!(
            operators.add(negate_if(), &languages),
            Err(ForgeError::OperatorNameAlreadyExists { .. })
        ));
        // Same name in a disjoint language set is allowed.
        let op = Operator::new(
            "NEGATE_IF_CONDITION_CSTYLE",
            vec!["python".to_string()],
            "if :[1]:",
            "if not (:[1]):",
        );
        operators.add(op, &languages).unwrap();
        assert_eq!(operators.len(), 2);
    }

    #[test]
    fn test_for_language_preserves_registration_order() {
        let languages = languages();
        let mut operators = Operators::new();
        operators.add(negate_if(), &languages).unwrap();
        operators
            .add(
                Operator::new("FLIP_PLUS", vec!["c".to_string()], ":[1] + :[2]", ":[1] - :[2]"),
                &languages,
            )
            .unwrap();
        let names: Vec<&str> = operators.for_language("c").map(Operator::name).collect();
        assert_eq!(names, vec!["NEGATE_IF_CONDITION_CSTYLE", "FLIP_PLUS"]);
        assert_eq!(operators.for_language("python").count(), 0);
    }

    #[test]
    fn test_get_rejects_cross_language_name() {
        let languages = languages();
        let mut operators = Operators::new();
        operators.add(negate_if(), &languages).unwrap();
        operators
            .add(
                Operator::new(
                    "NEGATE_IF_CONDITION_CSTYLE",
                    vec!["python".to_string()],
                    "if :[1]:",
                    "if not (:[1]):",
                ),
                &languages,
            )
            .unwrap();
        assert!(matches!(
            operators.get("NEGATE_IF_CONDITION_CSTYLE"),
            Err(ForgeError::BadFormat { .. })
        ));
        let c_op = operators.find("c", "NEGATE_IF_CONDITION_CSTYLE").unwrap();
        assert_eq!(c_op.rewrite_template(), "if (!(:[1]))");
        let py_op = operators
            .find("python", "NEGATE_IF_CONDITION_CSTYLE")
            .unwrap();
        assert_eq!(py_op.rewrite_template(), "if not (:[1]):");
        assert!(matches!(
            operators.find("c", "NOPE"),
            Err(ForgeError::OperatorNotFound { .. })
        ));
    }

    #[test]
    fn test_yaml_form() {
        let yaml = "name: NEGATE_IF_CONDITION_CSTYLE\nlanguages: [c]\nmatch: 'if (:[1])'\nrewrite: 'if (!(:[1]))'\n";
        let op: Operator = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(op, negate_if());
    }

    #[test]
    fn test_yaml_form_with_constraints() {
        let yaml = r#"
name: FLIP_PLUS
languages: [c]
match: ":[1] + :[2]"
rewrite: ":[1] - :[2]"
constraints:
  - type: is-single-term
    hole: "1"
  - type: preceded-by
    any-of: ["= "]
"#;
        let op: Operator = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            op.constraints(),
            &[
                Constraint::IsSingleTerm {
                    hole: "1".to_string()
                },
                Constraint::PrecededBy {
                    any_of: vec!["= ".to_string()]
                },
            ]
        );
    }
}
