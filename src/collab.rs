//! Interfaces to the engine's external collaborators.
//!
//! The engine never matches patterns or manages containers itself. It talks
//! to a snapshot service (which provisions readable instances of registered
//! code snapshots) and to a structural matcher (which finds occurrences of a
//! hole template in a text). Both are consumed through these traits; process
//! boundaries, transports and retries are the implementor's concern.

use std::collections::HashMap;

use crate::error::Result;
use crate::location::LocationRange;

/// An opaque handle to a provisioned snapshot instance. Must be passed back
/// to [`SnapshotService::release`] when the caller is done with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerToken(pub String);

/// One occurrence of a match template in a text: the range it covers plus the
/// fragment captured by each hole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub range: LocationRange,
    pub environment: HashMap<String, String>,
}

/// A service that resolves snapshot names and provisions readable instances
/// of them.
pub trait SnapshotService: Send + Sync {
    /// Whether a snapshot of this name is registered with the service.
    fn exists(&self, name: &str) -> bool;

    /// Provisions an instance of the named snapshot. The returned token must
    /// eventually be released.
    fn provision(&self, name: &str) -> Result<ContainerToken>;

    /// Reads a file from a provisioned instance, relative to the snapshot's
    /// source root. Fails with `FileNotFound` if the file is absent.
    fn read_file(&self, token: &ContainerToken, filepath: &str) -> Result<String>;

    /// Releases a provisioned instance and its resources.
    fn release(&self, token: ContainerToken);
}

/// A matcher that finds all occurrences of a hole template in a text.
pub trait StructuralMatcher: Send + Sync {
    /// All occurrences of `template` in `text`, in discovery order. Never
    /// mutates the text; repeated calls with the same arguments yield the
    /// same spans in the same order.
    fn match_spans(&self, template: &str, text: &str) -> Result<Vec<MatchSpan>>;
}
