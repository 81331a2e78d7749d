//! Test doubles for the storage seams
//!
//! [`InMemoryWorkspace`] stands in for the project sources and
//! [`InMemoryServiceStore`] for the DI configuration. Both record every write
//! and upsert, so tests can assert exactly what a run committed.
//!
//! ```rust
//! use ps_maker::scaffold::destination::{Destination, Layout};
//! use ps_maker::testing::InMemoryWorkspace;
//! use ps_maker::workspace::SourceStore;
//!
//! let mut workspace = InMemoryWorkspace::new(Layout::new(Destination::Root));
//! workspace.insert_file(
//!     "src/PrestaShopBundle/Controller/Admin/CustomerController.php",
//!     "<?php class CustomerController {}",
//! );
//! assert!(workspace.class_exists("PrestaShopBundle\\Controller\\Admin\\CustomerController"));
//! assert!(workspace.writes().is_empty());
//! ```

use crate::error::{MakerError, Result};
use crate::scaffold::destination::Layout;
use crate::scaffold::services::ServiceDescriptor;
use crate::workspace::{ServiceStore, SourceStore, UpsertOutcome};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

/// Project held in memory
#[derive(Debug, Clone)]
pub struct InMemoryWorkspace {
    layout: Layout,
    files: BTreeMap<PathBuf, String>,
    unreadable: BTreeSet<String>,
    unlocated: BTreeSet<String>,
    writes: Vec<PathBuf>,
}

impl InMemoryWorkspace {
    /// Empty project resolving classes through `layout`
    #[must_use]
    pub const fn new(layout: Layout) -> Self {
        Self {
            layout,
            files: BTreeMap::new(),
            unreadable: BTreeSet::new(),
            unlocated: BTreeSet::new(),
            writes: Vec::new(),
        }
    }

    /// Seed a file without recording a write
    pub fn insert_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Make a class report as existing while failing every read
    pub fn make_unreadable(&mut self, class: &str) {
        self.unreadable.insert(class.trim_start_matches('\\').to_string());
    }

    /// Make a class report as existing while its file cannot be found
    pub fn make_unlocated(&mut self, class: &str) {
        self.unlocated.insert(class.trim_start_matches('\\').to_string());
    }

    /// Current content of a file
    #[must_use]
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    /// Paths written, in order
    #[must_use]
    pub fn writes(&self) -> &[PathBuf] {
        &self.writes
    }

    /// Forget recorded writes, keeping the content
    pub fn clear_history(&mut self) {
        self.writes.clear();
    }
}

impl SourceStore for InMemoryWorkspace {
    fn class_exists(&self, class: &str) -> bool {
        let class_key = class.trim_start_matches('\\');
        self.unreadable.contains(class_key)
            || self.unlocated.contains(class_key)
            || self
                .layout
                .class_path(class)
                .is_some_and(|path| self.files.contains_key(&path))
    }

    fn read_existing_source(&self, class: &str) -> Result<Option<String>> {
        let path = self.layout.class_path(class);

        if self.unreadable.contains(class.trim_start_matches('\\')) {
            return Err(MakerError::io(
                path.unwrap_or_default(),
                io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }

        if self.unlocated.contains(class.trim_start_matches('\\')) {
            return Ok(None);
        }

        Ok(path.and_then(|path| self.files.get(&path).cloned()))
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn write_file(&mut self, path: &Path, content: &str) -> Result<()> {
        self.files.insert(path.to_path_buf(), content.to_string());
        self.writes.push(path.to_path_buf());
        Ok(())
    }
}

/// DI configuration held in memory, upserts are last-write-wins
#[derive(Debug, Clone, Default)]
pub struct InMemoryServiceStore {
    services: BTreeMap<String, ServiceDescriptor>,
    upserts: Vec<String>,
    persists: usize,
}

impl InMemoryServiceStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Service ids upserted, in order
    #[must_use]
    pub fn upserts(&self) -> &[String] {
        &self.upserts
    }

    /// Stored service record
    #[must_use]
    pub fn service(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.services.get(id)
    }

    /// Number of stored service records
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no record is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// How many times the store was persisted
    #[must_use]
    pub const fn persists(&self) -> usize {
        self.persists
    }
}

impl ServiceStore for InMemoryServiceStore {
    fn upsert_service(&mut self, service: &ServiceDescriptor) -> Result<UpsertOutcome> {
        self.upserts.push(service.id.clone());

        let outcome = match self.services.insert(service.id.clone(), service.clone()) {
            None => UpsertOutcome::Inserted,
            Some(previous) if previous == *service => UpsertOutcome::Unchanged,
            Some(_) => UpsertOutcome::Updated,
        };
        Ok(outcome)
    }

    fn persist(&mut self) -> Result<()> {
        self.persists += 1;
        Ok(())
    }
}
