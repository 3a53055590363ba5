//! Registered mutants and their lifecycle.
//!
//! A mutant binds a snapshot name to a composed transformation under a fresh
//! UUID. Mutants are immutable once registered and survive until explicitly
//! deleted; materialization re-reads the base file through the snapshot
//! service and applies the transformation.

use std::sync::Arc;

use dashmap::DashMap;
use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ForgeError, Result};
use crate::replacement::Replacement;
use crate::sourcefile::SourceFileManager;
use crate::transformation::Transformation;

/// An immutable description of one mutant of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutant {
    uuid: Uuid,
    snapshot: String,
    transformation: Transformation,
}

impl Mutant {
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    /// The wire description of this mutant.
    pub fn to_descriptor(&self) -> serde_json::Value {
        #[derive(Serialize)]
        struct Descriptor<'a> {
            uuid: String,
            snapshot: &'a str,
            file: &'a str,
            replacements: Vec<&'a Replacement>,
        }
        let descriptor = Descriptor {
            uuid: self.uuid.to_string(),
            snapshot: &self.snapshot,
            file: self.transformation.filename(),
            replacements: self.transformation.replacements().collect(),
        };
        // Serialization of these plain fields cannot fail.
        serde_json::to_value(descriptor).unwrap_or_default()
    }
}

/// Creates, stores and materializes mutants.
pub struct MutantManager {
    mutants: DashMap<Uuid, Mutant>,
    sources: Arc<SourceFileManager>,
}

impl MutantManager {
    pub fn new(sources: Arc<SourceFileManager>) -> MutantManager {
        MutantManager {
            mutants: DashMap::new(),
            sources,
        }
    }

    /// Composes the given replacements against the snapshot's base file and
    /// registers the resulting mutant under a fresh UUID.
    pub fn create(&self, snapshot: &str, replacements: Vec<Replacement>) -> Result<Mutant> {
        if !self.sources.service().exists(snapshot) {
            return Err(ForgeError::SnapshotNotFound {
                name: snapshot.to_string(),
            });
        }
        let filename = replacements
            .first()
            .ok_or_else(|| ForgeError::BadFormat {
                reason: "cannot compose an empty set of replacements".to_string(),
            })?
            .filename()
            .to_string();
        let offsets = self.sources.line_offsets(snapshot, &filename)?;
        let transformation = Transformation::compose(replacements, &offsets)?;
        let mutant = Mutant {
            uuid: Uuid::new_v4(),
            snapshot: snapshot.to_string(),
            transformation,
        };
        info!("registered mutant {} of snapshot {}", mutant.uuid, snapshot);
        self.mutants.insert(mutant.uuid, mutant.clone());
        Ok(mutant)
    }

    pub fn get(&self, uuid: &Uuid) -> Result<Mutant> {
        self.mutants
            .get(uuid)
            .map(|m| m.clone())
            .ok_or_else(|| ForgeError::MutantNotFound {
                uuid: uuid.to_string(),
            })
    }

    /// The full mutated text of a mutant's file.
    pub fn materialize(&self, uuid: &Uuid) -> Result<String> {
        let mutant = self.get(uuid)?;
        let text = self
            .sources
            .read_file(mutant.snapshot(), mutant.transformation().filename())?;
        mutant.transformation().apply(&text)
    }

    pub fn remove(&self, uuid: &Uuid) -> Result<()> {
        self.mutants
            .remove(uuid)
            .map(|_| ())
            .ok_or_else(|| ForgeError::MutantNotFound {
                uuid: uuid.to_string(),
            })
    }

    pub fn clear(&self) {
        self.mutants.clear();
    }

    /// UUIDs of all registered mutants, in no particular order.
    pub fn uuids(&self) -> Vec<Uuid> {
        self.mutants.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.mutants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutants.is_empty()
    }
}
