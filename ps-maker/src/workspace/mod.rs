//! Project storage seams
//!
//! The pipeline only talks to the project through these two traits: one for
//! PHP sources and rendered files, one for DI service records. The
//! filesystem and YAML implementations are used by the CLI; tests use
//! [`crate::testing::InMemoryWorkspace`].

use crate::error::Result;
use crate::scaffold::services::ServiceDescriptor;
use std::fmt;
use std::path::Path;

mod fs;
mod services_yaml;

pub use fs::ProjectWorkspace;
pub use services_yaml::{ServiceConflictPolicy, YamlServiceStore};

/// Access to project source files
pub trait SourceStore {
    /// Whether the class resolves to an existing file
    fn class_exists(&self, class: &str) -> bool;

    /// Whether a file exists, relative to the project root
    fn file_exists(&self, path: &Path) -> bool;

    /// Current source of a class, `None` when it has no file
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    fn read_existing_source(&self, class: &str) -> Result<Option<String>>;

    /// Write a file relative to the project root, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_file(&mut self, path: &Path, content: &str) -> Result<()>;
}

/// What an upsert did to the stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record with this id existed
    Inserted,
    /// A different record was replaced
    Updated,
    /// The stored record was already identical
    Unchanged,
    /// A different record exists and was left alone
    Kept,
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Kept => "kept",
        })
    }
}

/// DI configuration store keyed by service id
pub trait ServiceStore {
    /// Insert or replace the record with the descriptor's id
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    fn upsert_service(&mut self, service: &ServiceDescriptor) -> Result<UpsertOutcome>;

    /// Flush pending upserts
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn persist(&mut self) -> Result<()>;
}
