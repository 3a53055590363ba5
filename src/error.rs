//! The closed error taxonomy and its wire representation.
//!
//! Every failure the engine can report is a variant of [`ForgeError`] carrying
//! a short human message plus structured data, so a remote caller can rebuild
//! the same value from the JSON envelope. Decoding is an explicit match over
//! the known kinds; adding a kind means adding a variant and a decode arm.

use serde_json::{json, Value};
use thiserror::Error;

use crate::replacement::Replacement;

/// Errors produced while constructing, composing or serving mutants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForgeError {
    /// An operator of this name is already registered for one of its languages.
    #[error("operator name is already in use: {name}")]
    OperatorNameAlreadyExists { name: String },

    /// No language is registered under the given name.
    #[error("no language registered with name: {name}")]
    LanguageNotFound { name: String },

    /// No registered language claims the file's ending.
    #[error("failed to detect language used by file: {filename}")]
    LanguageNotDetected { filename: String },

    /// No operator is registered under the given name.
    #[error("no operator registered with name: {name}")]
    OperatorNotFound { name: String },

    /// The named snapshot could not be resolved by the snapshot service.
    #[error("no snapshot registered with name: {name}")]
    SnapshotNotFound { name: String },

    /// The requested file was not found.
    #[error("file not found: {name}")]
    FileNotFound { name: String },

    /// No mutant is registered under the given UUID.
    #[error("no mutant registered with UUID: {uuid}")]
    MutantNotFound { uuid: String },

    /// A required request argument was not supplied.
    #[error("missing required argument: {name}")]
    MissingArgument { name: String },

    /// The input was syntactically ill-formed.
    #[error("badly formatted input: {reason}")]
    BadFormat { reason: String },

    /// A location or offset falls outside the text it refers to.
    #[error("location out of bounds: {detail}")]
    OutOfBounds { detail: String },

    /// Two replacements cover overlapping character spans of the same file.
    #[error("conflicting replacements: [{first}] and [{second}]")]
    ConflictingReplacements {
        first: Replacement,
        second: Replacement,
    },

    /// The configuration file is unreadable or ill-formed.
    #[error("bad configuration file: {reason}")]
    BadConfigFile { reason: String },

    /// The configuration is well-formed but describes an illegal setup.
    #[error("illegal configuration: {reason}")]
    IllegalConfig { reason: String },

    /// A collaborator (snapshot service or structural matcher) failed.
    #[error("collaborator unavailable: {reason}")]
    CollaboratorUnavailable { reason: String },
}

impl ForgeError {
    /// The wire tag identifying this kind of error.
    pub fn kind(&self) -> &'static str {
        match self {
            ForgeError::OperatorNameAlreadyExists { .. } => "OperatorNameAlreadyExists",
            ForgeError::LanguageNotFound { .. } => "LanguageNotFound",
            ForgeError::LanguageNotDetected { .. } => "LanguageNotDetected",
            ForgeError::OperatorNotFound { .. } => "OperatorNotFound",
            ForgeError::SnapshotNotFound { .. } => "SnapshotNotFound",
            ForgeError::FileNotFound { .. } => "FileNotFound",
            ForgeError::MutantNotFound { .. } => "MutantNotFound",
            ForgeError::MissingArgument { .. } => "MissingArgument",
            ForgeError::BadFormat { .. } => "BadFormat",
            ForgeError::OutOfBounds { .. } => "OutOfBounds",
            ForgeError::ConflictingReplacements { .. } => "ConflictingReplacements",
            ForgeError::BadConfigFile { .. } => "BadConfigFile",
            ForgeError::IllegalConfig { .. } => "IllegalConfig",
            ForgeError::CollaboratorUnavailable { .. } => "CollaboratorUnavailable",
        }
    }

    /// The HTTP status code bound to this kind of error.
    ///
    /// Configuration errors are startup-time only; they carry a 500 so that a
    /// response can still be formed if one ever leaks to a request.
    pub fn status_code(&self) -> u16 {
        match self {
            ForgeError::OperatorNameAlreadyExists { .. } => 409,
            ForgeError::ConflictingReplacements { .. } => 409,
            ForgeError::LanguageNotFound { .. } => 404,
            ForgeError::OperatorNotFound { .. } => 404,
            ForgeError::SnapshotNotFound { .. } => 404,
            ForgeError::FileNotFound { .. } => 404,
            ForgeError::MutantNotFound { .. } => 404,
            ForgeError::LanguageNotDetected { .. } => 400,
            ForgeError::MissingArgument { .. } => 400,
            ForgeError::BadFormat { .. } => 400,
            ForgeError::OutOfBounds { .. } => 400,
            ForgeError::BadConfigFile { .. } => 500,
            ForgeError::IllegalConfig { .. } => 500,
            ForgeError::CollaboratorUnavailable { .. } => 502,
        }
    }

    /// The structured payload attached to the wire envelope.
    pub fn data(&self) -> Value {
        match self {
            ForgeError::OperatorNameAlreadyExists { name }
            | ForgeError::LanguageNotFound { name }
            | ForgeError::OperatorNotFound { name }
            | ForgeError::SnapshotNotFound { name }
            | ForgeError::FileNotFound { name }
            | ForgeError::MissingArgument { name } => json!({ "name": name }),
            ForgeError::LanguageNotDetected { filename } => json!({ "filename": filename }),
            ForgeError::MutantNotFound { uuid } => json!({ "uuid": uuid }),
            ForgeError::BadFormat { reason }
            | ForgeError::BadConfigFile { reason }
            | ForgeError::IllegalConfig { reason }
            | ForgeError::CollaboratorUnavailable { reason } => json!({ "reason": reason }),
            ForgeError::OutOfBounds { detail } => json!({ "detail": detail }),
            ForgeError::ConflictingReplacements { first, second } => {
                json!({ "first": first, "second": second })
            }
        }
    }

    /// Encodes this error as the generic wire envelope together with its
    /// bound status code.
    pub fn to_response(&self) -> (Value, u16) {
        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
                "data": self.data(),
            }
        });
        (body, self.status_code())
    }

    /// Decodes a wire envelope back into the typed error it describes.
    pub fn from_response(body: &Value) -> Result<ForgeError> {
        let bad = |reason: String| ForgeError::BadFormat { reason };
        let error = body
            .get("error")
            .ok_or_else(|| bad("missing 'error' object in envelope".to_string()))?;
        let kind = error
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| bad("missing 'kind' in error envelope".to_string()))?;
        let data = error.get("data").cloned().unwrap_or(Value::Null);

        let err = match kind {
            "OperatorNameAlreadyExists" => ForgeError::OperatorNameAlreadyExists {
                name: str_field(&data, "name")?,
            },
            "LanguageNotFound" => ForgeError::LanguageNotFound {
                name: str_field(&data, "name")?,
            },
            "LanguageNotDetected" => ForgeError::LanguageNotDetected {
                filename: str_field(&data, "filename")?,
            },
            "OperatorNotFound" => ForgeError::OperatorNotFound {
                name: str_field(&data, "name")?,
            },
            "SnapshotNotFound" => ForgeError::SnapshotNotFound {
                name: str_field(&data, "name")?,
            },
            "FileNotFound" => ForgeError::FileNotFound {
                name: str_field(&data, "name")?,
            },
            "MutantNotFound" => ForgeError::MutantNotFound {
                uuid: str_field(&data, "uuid")?,
            },
            "MissingArgument" => ForgeError::MissingArgument {
                name: str_field(&data, "name")?,
            },
            "BadFormat" => ForgeError::BadFormat {
                reason: str_field(&data, "reason")?,
            },
            "OutOfBounds" => ForgeError::OutOfBounds {
                detail: str_field(&data, "detail")?,
            },
            "ConflictingReplacements" => ForgeError::ConflictingReplacements {
                first: replacement_field(&data, "first")?,
                second: replacement_field(&data, "second")?,
            },
            "BadConfigFile" => ForgeError::BadConfigFile {
                reason: str_field(&data, "reason")?,
            },
            "IllegalConfig" => ForgeError::IllegalConfig {
                reason: str_field(&data, "reason")?,
            },
            "CollaboratorUnavailable" => ForgeError::CollaboratorUnavailable {
                reason: str_field(&data, "reason")?,
            },
            other => {
                return Err(bad(format!("unrecognized error kind: {}", other)));
            }
        };
        Ok(err)
    }
}

fn str_field(data: &Value, key: &str) -> Result<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ForgeError::BadFormat {
            reason: format!("missing '{}' in error data", key),
        })
}

fn replacement_field(data: &Value, key: &str) -> Result<Replacement> {
    let value = data
        .get(key)
        .cloned()
        .ok_or_else(|| ForgeError::BadFormat {
            reason: format!("missing '{}' in error data", key),
        })?;
    serde_json::from_value(value).map_err(|e| ForgeError::BadFormat {
        reason: format!("malformed replacement in error data: {}", e),
    })
}

/// Result type used throughout the engine.
pub type Result<T> = std::result::Result<T, ForgeError>;
