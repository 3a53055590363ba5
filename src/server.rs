//! Request handlers over an explicit server state.
//!
//! Routing and transport are a host concern; this module implements the
//! request/response values. Each handler is a method on [`ServerState`]
//! taking plain arguments and returning a [`Response`] carrying a status
//! code and a JSON body. Failures are encoded through the generic error
//! envelope with the status bound to the error's kind.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use log::info;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::collab::{SnapshotService, StructuralMatcher};
use crate::config::Configuration;
use crate::error::{ForgeError, Result};
use crate::language::Languages;
use crate::mutant::MutantManager;
use crate::mutation::{discover, Mutation};
use crate::operator::{Operator, Operators};
use crate::replacement::Replacement;
use crate::sourcefile::SourceFileManager;

/// A computed response: an HTTP status code plus a JSON body. A `Null` body
/// with a 204 stands for an empty response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok(body: Value) -> Response {
        Response { status: 200, body }
    }

    fn no_content() -> Response {
        Response {
            status: 204,
            body: Value::Null,
        }
    }

    fn from_error(error: &ForgeError) -> Response {
        let (body, status) = error.to_response();
        Response { status, body }
    }
}

fn respond(result: Result<Response>) -> Response {
    match result {
        Ok(response) => response,
        Err(error) => Response::from_error(&error),
    }
}

/// Query parameters of a mutation discovery request.
#[derive(Debug, Default, Deserialize)]
pub struct MutationsRequest {
    pub filepath: Option<String>,
    pub language: Option<String>,
    /// When given, only matches starting on one of these lines are reported.
    pub lines: Option<Vec<usize>>,
}

/// Body of a mutant creation request.
#[derive(Debug, Deserialize)]
pub struct CreateMutantRequest {
    pub snapshot: String,
    pub replacements: Vec<Replacement>,
}

/// Everything the handlers need, constructed once at startup. No globals:
/// hosts embed a `ServerState` and call handlers directly.
pub struct ServerState {
    languages: Languages,
    operators: Operators,
    sources: Arc<SourceFileManager>,
    matcher: Arc<dyn StructuralMatcher>,
    mutants: MutantManager,
}

impl ServerState {
    pub fn new(
        configuration: Configuration,
        snapshots: Arc<dyn SnapshotService>,
        matcher: Arc<dyn StructuralMatcher>,
    ) -> ServerState {
        let (languages, operators) = configuration.into_parts();
        let sources = Arc::new(SourceFileManager::new(snapshots));
        let mutants = MutantManager::new(Arc::clone(&sources));
        ServerState {
            languages,
            operators,
            sources,
            matcher,
            mutants,
        }
    }

    pub fn languages(&self) -> &Languages {
        &self.languages
    }

    pub fn operators(&self) -> &Operators {
        &self.operators
    }

    pub fn mutants(&self) -> &MutantManager {
        &self.mutants
    }

    /// Liveness probe.
    pub fn handle_status(&self) -> Response {
        Response::no_content()
    }

    /// Lists the registered languages.
    pub fn handle_languages(&self) -> Response {
        let names: Vec<&str> = self.languages.iter().map(|l| l.name()).collect();
        Response::ok(json!(names))
    }

    /// Describes one registered language.
    pub fn handle_language(&self, name: &str) -> Response {
        respond(self.languages.get(name).map(|language| {
            Response::ok(json!({
                "name": language.name(),
                "file-endings": language.file_endings(),
            }))
        }))
    }

    /// Lists the registered operators, optionally those of one language.
    pub fn handle_operators(&self, language: Option<&str>) -> Response {
        respond(self.operators_index(language))
    }

    fn operators_index(&self, language: Option<&str>) -> Result<Response> {
        let operators: Vec<&Operator> = match language {
            Some(name) => {
                self.languages.get(name)?;
                self.operators.for_language(name).collect()
            }
            None => self.operators.iter().collect(),
        };
        let names: Vec<&str> = operators.iter().map(|o| o.name()).collect();
        Ok(Response::ok(json!(names)))
    }

    /// Describes one registered operator.
    pub fn handle_operator(&self, name: &str) -> Response {
        respond(self.operators.get(name).map(|operator| {
            Response::ok(json!({
                "name": operator.name(),
                "languages": operator.languages(),
                "match": operator.match_template(),
                "rewrite": operator.rewrite_template(),
            }))
        }))
    }

    /// Discovers the mutations of a file on the local filesystem.
    pub fn handle_mutations(&self, request: &MutationsRequest) -> Response {
        respond(self.mutations(request))
    }

    fn mutations(&self, request: &MutationsRequest) -> Result<Response> {
        let filepath = request
            .filepath
            .as_deref()
            .ok_or_else(|| ForgeError::MissingArgument {
                name: "filepath".to_string(),
            })?;
        if !Path::new(filepath).is_file() {
            return Err(ForgeError::FileNotFound {
                name: filepath.to_string(),
            });
        }
        let language = match request.language.as_deref() {
            Some(name) => self.languages.get(name)?,
            None => self.languages.detect(filepath)?,
        };
        let text = std::fs::read_to_string(filepath).map_err(|e| ForgeError::FileNotFound {
            name: format!("{}: {}", filepath, e),
        })?;
        let lines: Option<HashSet<usize>> = request
            .lines
            .as_ref()
            .map(|lines| lines.iter().copied().collect());
        let mutations = discover(
            language,
            &self.operators,
            filepath,
            &text,
            self.matcher.as_ref(),
            lines.as_ref(),
        )?;
        info!("discovered {} mutations in {}", mutations.len(), filepath);
        let descriptors: Vec<Value> = mutations.iter().map(mutation_descriptor).collect();
        Ok(Response::ok(json!(descriptors)))
    }

    /// Lists the UUIDs of all registered mutants.
    pub fn handle_mutants(&self) -> Response {
        let uuids: Vec<String> = self.mutants.uuids().iter().map(Uuid::to_string).collect();
        Response::ok(json!(uuids))
    }

    /// Registers a new mutant from a snapshot name and a replacement set.
    pub fn handle_create_mutant(&self, request: &CreateMutantRequest) -> Response {
        respond(
            self.mutants
                .create(&request.snapshot, request.replacements.clone())
                .map(|mutant| Response::ok(mutant.to_descriptor())),
        )
    }

    /// Describes one registered mutant.
    pub fn handle_mutant(&self, uuid: &Uuid) -> Response {
        respond(
            self.mutants
                .get(uuid)
                .map(|mutant| Response::ok(mutant.to_descriptor())),
        )
    }

    /// The full mutated text of a mutant's file.
    pub fn handle_materialize_mutant(&self, uuid: &Uuid) -> Response {
        respond(
            self.mutants
                .materialize(uuid)
                .map(|text| Response::ok(json!({ "text": text }))),
        )
    }

    /// Deletes one registered mutant.
    pub fn handle_delete_mutant(&self, uuid: &Uuid) -> Response {
        respond(self.mutants.remove(uuid).map(|_| Response::no_content()))
    }

    /// Deletes every registered mutant.
    pub fn handle_clear_mutants(&self) -> Response {
        self.mutants.clear();
        Response::no_content()
    }
}

fn mutation_descriptor(mutation: &Mutation) -> Value {
    let range = mutation.location().range();
    json!({
        "operator": mutation.operator(),
        "file": mutation.location().filename(),
        "range": {
            "start": {"line": range.start().line, "col": range.start().col},
            "stop": {"line": range.stop().line, "col": range.stop().col},
        },
    })
}
