//! Language-independent construction of program mutants.
//!
//! This library discovers and builds mutants of source files for mutation
//! testing. Mutation operators are declarative match/rewrite template pairs;
//! structural matching and snapshot provisioning are delegated to external
//! collaborators behind the traits in [`collab`]. The library itself owns the
//! position/range model, replacement composition with conflict detection, the
//! operator and language registries, the mutant store, and the JSON
//! request/response values of the service surface.
//!
//! # Example Configuration
//!
//! ```yaml
//! version: "1.0"
//! languages:
//!   - name: c
//!     file-endings: [".c", ".h"]
//! operators:
//!   - name: NEGATE_IF_CONDITION_CSTYLE
//!     languages: [c]
//!     match: "if (:[1])"
//!     rewrite: "if (!(:[1]))"
//! ```
//!
//! # Applying a replacement
//!
//! ```
//! use mutaforge::{FileLocationRange, LineOffsets, Replacement, Transformation};
//!
//! let text = "int x = 1 + 1;";
//! let offsets = LineOffsets::scan(text);
//! let location: FileLocationRange = "main.c@1:9::1:13".parse().unwrap();
//! let replacement = Replacement::new(location, "1 - 1");
//! let transformation = Transformation::compose(vec![replacement], &offsets).unwrap();
//! assert_eq!(transformation.apply(text).unwrap(), "int x = 1 - 1;");
//! ```

pub mod collab;
pub mod config;
pub mod constraint;
pub mod error;
pub mod language;
pub mod location;
pub mod mutant;
pub mod mutation;
pub mod operator;
pub mod replacement;
pub mod server;
pub mod sourcefile;
pub mod transformation;

// Re-export main types at crate root
pub use collab::{ContainerToken, MatchSpan, SnapshotService, StructuralMatcher};
pub use config::Configuration;
pub use constraint::Constraint;
pub use error::{ForgeError, Result};
pub use language::{Language, Languages};
pub use location::{FileLocationRange, LineOffsets, Location, LocationRange};
pub use mutant::{Mutant, MutantManager};
pub use mutation::{discover, Mutation};
pub use operator::{Operator, Operators};
pub use replacement::{OffsetSpan, Replacement};
pub use server::{CreateMutantRequest, MutationsRequest, Response, ServerState};
pub use sourcefile::SourceFileManager;
pub use transformation::Transformation;
