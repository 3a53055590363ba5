//! The registry of languages known to the engine.
//!
//! Languages are purely declarative: a name plus the set of file endings that
//! identify source files written in the language. Detection never inspects
//! file contents.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

/// A language that mutation operators may target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    name: String,
    #[serde(rename = "file-endings")]
    file_endings: Vec<String>,
}

impl Language {
    pub fn new(name: impl Into<String>, file_endings: Vec<String>) -> Language {
        Language {
            name: name.into(),
            file_endings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_endings(&self) -> &[String] {
        &self.file_endings
    }

    /// Whether a file of this name belongs to this language.
    pub fn claims(&self, filename: &str) -> bool {
        self.file_endings.iter().any(|e| filename.ends_with(e))
    }
}

/// The set of registered languages. Populated once at startup and read-only
/// thereafter.
#[derive(Debug, Clone, Default)]
pub struct Languages {
    languages: Vec<Language>,
}

impl Languages {
    pub fn new() -> Languages {
        Languages::default()
    }

    /// Registers a language. Re-registering a name replaces the earlier
    /// definition with a warning; a file ending already claimed by a
    /// different language is rejected as illegal.
    pub fn add(&mut self, language: Language) -> Result<()> {
        for existing in &self.languages {
            if existing.name == language.name {
                continue;
            }
            let shared = existing
                .file_endings
                .iter()
                .any(|e| language.file_endings.contains(e));
            if shared {
                return Err(ForgeError::IllegalConfig {
                    reason: format!(
                        "file ending ambiguity: languages '{}' and '{}' share a common file ending",
                        existing.name, language.name
                    ),
                });
            }
        }
        if let Some(pos) = self.languages.iter().position(|l| l.name == language.name) {
            warn!("redefining language: {}", language.name);
            self.languages.remove(pos);
        }
        self.languages.push(language);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Language> {
        self.languages
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| ForgeError::LanguageNotFound {
                name: name.to_string(),
            })
    }

    pub fn supports(&self, name: &str) -> bool {
        self.languages.iter().any(|l| l.name == name)
    }

    /// Determines the language of a file from its ending.
    pub fn detect(&self, filename: &str) -> Result<&Language> {
        self.languages
            .iter()
            .find(|l| l.claims(filename))
            .ok_or_else(|| ForgeError::LanguageNotDetected {
                filename: filename.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Language> {
        self.languages.iter()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
