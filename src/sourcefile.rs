//! Cached access to the source files of registered snapshots.
//!
//! File contents and their line-offset tables are cached per (snapshot,
//! filepath) pair in concurrent maps. A cache miss provisions a container
//! through the snapshot service, reads the file, and releases the container
//! before returning; release is tied to a guard's drop so it happens on the
//! error path too.

use std::sync::Arc;

use dashmap::DashMap;
use log::debug;

use crate::collab::{ContainerToken, SnapshotService};
use crate::error::{ForgeError, Result};
use crate::location::{LineOffsets, Location};

type CacheKey = (String, String);

/// A container provisioned for the duration of one read.
struct Provisioned<'a> {
    service: &'a dyn SnapshotService,
    token: Option<ContainerToken>,
}

impl<'a> Provisioned<'a> {
    fn acquire(service: &'a dyn SnapshotService, snapshot: &str) -> Result<Provisioned<'a>> {
        let token = service.provision(snapshot)?;
        debug!("provisioned container for snapshot: {}", snapshot);
        Ok(Provisioned {
            service,
            token: Some(token),
        })
    }

    fn read(&self, filepath: &str) -> Result<String> {
        match &self.token {
            Some(token) => self.service.read_file(token, filepath),
            None => Err(ForgeError::CollaboratorUnavailable {
                reason: "container was already released".to_string(),
            }),
        }
    }
}

impl Drop for Provisioned<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.service.release(token);
        }
    }
}

/// Reads and caches the contents of files inside registered snapshots.
pub struct SourceFileManager {
    service: Arc<dyn SnapshotService>,
    contents: DashMap<CacheKey, Arc<str>>,
    offsets: DashMap<CacheKey, Arc<LineOffsets>>,
}

impl SourceFileManager {
    pub fn new(service: Arc<dyn SnapshotService>) -> SourceFileManager {
        SourceFileManager {
            service,
            contents: DashMap::new(),
            offsets: DashMap::new(),
        }
    }

    pub fn service(&self) -> &Arc<dyn SnapshotService> {
        &self.service
    }

    /// The contents of a file within a snapshot. The first read of a given
    /// (snapshot, filepath) pair provisions a container; later reads are
    /// served from the cache.
    pub fn read_file(&self, snapshot: &str, filepath: &str) -> Result<Arc<str>> {
        let key = (snapshot.to_string(), filepath.to_string());
        if let Some(cached) = self.contents.get(&key) {
            return Ok(Arc::clone(&cached));
        }
        let container = Provisioned::acquire(self.service.as_ref(), snapshot)?;
        let text: Arc<str> = Arc::from(container.read(filepath)?);
        debug!("read {} characters from {}:{}", text.chars().count(), snapshot, filepath);
        // Racing computes of the same key read identical snapshot contents,
        // so last-write-wins is safe.
        self.contents.insert(key, Arc::clone(&text));
        Ok(text)
    }

    /// The line-offset table for a file within a snapshot, computed at most
    /// once per (snapshot, filepath) pair.
    pub fn line_offsets(&self, snapshot: &str, filepath: &str) -> Result<Arc<LineOffsets>> {
        let key = (snapshot.to_string(), filepath.to_string());
        if let Some(cached) = self.offsets.get(&key) {
            return Ok(Arc::clone(&cached));
        }
        let text = self.read_file(snapshot, filepath)?;
        let table = Arc::new(LineOffsets::scan(&text));
        self.offsets.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Transforms a 1-indexed location in a file into a 0-indexed character
    /// offset.
    pub fn line_col_to_offset(
        &self,
        snapshot: &str,
        filepath: &str,
        location: Location,
    ) -> Result<usize> {
        self.line_offsets(snapshot, filepath)?.offset_at(location)
    }

    pub fn num_lines(&self, snapshot: &str, filepath: &str) -> Result<usize> {
        Ok(self.line_offsets(snapshot, filepath)?.num_lines())
    }

    /// The characters of a file covered by an inclusive offset interval.
    pub fn read_chars(
        &self,
        snapshot: &str,
        filepath: &str,
        start: usize,
        stop: usize,
    ) -> Result<String> {
        let text = self.read_file(snapshot, filepath)?;
        if stop >= text.chars().count() || stop < start {
            return Err(ForgeError::OutOfBounds {
                detail: format!("character interval [{}, {}] exceeds {}", start, stop, filepath),
            });
        }
        Ok(text.chars().skip(start).take(stop - start + 1).collect())
    }

    /// Drops any cached state for a (snapshot, filepath) pair.
    pub fn evict(&self, snapshot: &str, filepath: &str) {
        let key = (snapshot.to_string(), filepath.to_string());
        self.contents.remove(&key);
        self.offsets.remove(&key);
    }
}
