//! YAML configuration describing the language and operator registries.
//!
//! A configuration file carries a version string plus the languages and
//! operators to register. Files may be layered: a user configuration is
//! loaded on top of a base (system) configuration and registers into the
//! same registries.

use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::{ForgeError, Result};
use crate::language::{Language, Languages};
use crate::operator::{Operator, Operators};

/// The only configuration format version understood by this build.
const SUPPORTED_VERSION: &str = "1.0";

/// The raw shape of a configuration file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    version: String,
    #[serde(default)]
    languages: Vec<Language>,
    #[serde(default)]
    operators: Vec<Operator>,
}

/// The validated language and operator registries built from one or more
/// configuration files.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    languages: Languages,
    operators: Operators,
}

impl Configuration {
    /// Loads a configuration file into empty registries.
    pub fn load(path: &Path) -> Result<Configuration> {
        Configuration::default().load_over(path)
    }

    /// Loads a configuration file on top of this configuration. Languages
    /// and operators from the file are registered into the existing
    /// registries, so later files may extend or redefine earlier ones.
    pub fn load_over(self, path: &Path) -> Result<Configuration> {
        let content = std::fs::read_to_string(path).map_err(|e| ForgeError::BadConfigFile {
            reason: format!("failed to read '{}': {}", path.display(), e),
        })?;
        info!("loading configuration from {}", path.display());
        self.from_yaml_over(&content)
    }

    /// Parses a YAML document into empty registries.
    pub fn from_yaml(content: &str) -> Result<Configuration> {
        Configuration::default().from_yaml_over(content)
    }

    /// Parses a YAML document on top of this configuration.
    pub fn from_yaml_over(mut self, content: &str) -> Result<Configuration> {
        let file: ConfigFile =
            serde_yaml::from_str(content).map_err(|e| ForgeError::BadConfigFile {
                reason: format!("failed to parse configuration: {}", e),
            })?;
        if file.version != SUPPORTED_VERSION {
            return Err(ForgeError::BadConfigFile {
                reason: format!(
                    "unsupported configuration version: {} (expected {})",
                    file.version, SUPPORTED_VERSION
                ),
            });
        }
        for language in file.languages {
            self.languages.add(language)?;
        }
        for operator in file.operators {
            self.operators.add(operator, &self.languages)?;
        }
        Ok(self)
    }

    pub fn languages(&self) -> &Languages {
        &self.languages
    }

    pub fn operators(&self) -> &Operators {
        &self.operators
    }

    pub fn into_parts(self) -> (Languages, Operators) {
        (self.languages, self.operators)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const EXAMPLE: &str = r#"
version: "1.0"
languages:
  - name: c
    file-endings: [".c", ".h"]
operators:
  - name: NEGATE_IF_CONDITION_CSTYLE
    languages: [c]
    match: "if (:[1])"
    rewrite: "if (!(:[1]))"
"#;

    #[test]
    fn test_parse_configuration() {
        let config = Configuration::from_yaml(EXAMPLE).unwrap();
        assert_eq!(config.languages().len(), 1);
        assert_eq!(config.operators().len(), 1);
        let op = config.operators().get("NEGATE_IF_CONDITION_CSTYLE").unwrap();
        assert_eq!(op.match_template(), "if (:[1])");
        assert_eq!(op.rewrite_template(), "if (!(:[1]))");
        assert_eq!(config.languages().detect("src/main.c").unwrap().name(), "c");
    }

    #[test]
    fn test_rejects_unsupported_version() {
        let yaml = "version: \"2.0\"\n";
        assert!(matches!(
            Configuration::from_yaml(yaml),
            Err(ForgeError::BadConfigFile { .. })
        ));
    }

    #[test]
    fn test_rejects_unparsable_document() {
        assert!(matches!(
            Configuration::from_yaml(": not yaml : ["),
            Err(ForgeError::BadConfigFile { .. })
        ));
    }

    #[test]
    fn test_operator_with_unknown_language() {
        let yaml = r#"
version: "1.0"
operators:
  - name: X
    languages: [cobol]
    match: "a"
    rewrite: "b"
"#;
        assert!(matches!(
            Configuration::from_yaml(yaml),
            Err(ForgeError::LanguageNotFound { .. })
        ));
    }

    #[test]
    fn test_layered_loading() {
        let overlay = r#"
version: "1.0"
languages:
  - name: python
    file-endings: [".py"]
operators:
  - name: NEGATE_IF_CONDITION_PYTHON
    languages: [python]
    match: "if :[1]:"
    rewrite: "if not (:[1]):"
"#;
        let config = Configuration::from_yaml(EXAMPLE)
            .unwrap()
            .from_yaml_over(overlay)
            .unwrap();
        assert_eq!(config.languages().len(), 2);
        assert_eq!(config.operators().len(), 2);
    }

    #[test]
    fn test_ambiguous_endings_rejected() {
        let overlay = r#"
version: "1.0"
languages:
  - name: cpp
    file-endings: [".h"]
"#;
        let result = Configuration::from_yaml(EXAMPLE)
            .unwrap()
            .from_yaml_over(overlay);
        assert!(matches!(result, Err(ForgeError::IllegalConfig { .. })));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.as_bytes()).unwrap();
        let config = Configuration::load(file.path()).unwrap();
        assert_eq!(config.languages().len(), 1);

        assert!(matches!(
            Configuration::load(Path::new("/nonexistent/mutaforge.yml")),
            Err(ForgeError::BadConfigFile { .. })
        ));
    }
}
