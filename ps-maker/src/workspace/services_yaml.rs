//! Symfony-style `services.yml` store
//!
//! Records live under the top-level `services:` mapping, keyed by id. Every
//! other key of the file (`imports`, `parameters`, `_defaults`, ...) is kept
//! as is.
//!
//! New records are appended as text at the end of the `services:` block, so
//! comments, blank lines and quoting of the existing file survive. Only a
//! replaced record (or a layout the append cannot handle) makes the whole
//! document go through `serde_yaml` again, which drops comments.

use super::{ServiceStore, UpsertOutcome};
use crate::error::{MakerError, Result};
use crate::scaffold::services::ServiceDescriptor;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SERVICES_KEY: &str = "services";

/// What to do when a record with the same id but different content exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceConflictPolicy {
    /// Replace the stored record (last write wins)
    #[default]
    Overwrite,
    /// Leave the stored record untouched
    Keep,
}

/// Services file loaded in memory, written back on [`ServiceStore::persist`]
#[derive(Debug)]
pub struct YamlServiceStore {
    path: PathBuf,
    source: Option<String>,
    document: Mapping,
    policy: ServiceConflictPolicy,
    inserted: Vec<String>,
    rewrite: bool,
}

impl YamlServiceStore {
    /// Load `path`, starting from an empty document if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or its
    /// `services` key is not a mapping.
    pub fn load(path: impl Into<PathBuf>, policy: ServiceConflictPolicy) -> Result<Self> {
        let path = path.into();

        let source = match fs::read_to_string(&path) {
            Ok(source) => Some(source),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(MakerError::io(&path, err)),
        };
        let document = match &source {
            Some(source) => Self::parse(&path, source)?,
            None => Mapping::new(),
        };

        Ok(Self {
            path,
            source,
            document,
            policy,
            inserted: Vec::new(),
            rewrite: false,
        })
    }

    fn parse(path: &Path, source: &str) -> Result<Mapping> {
        let value: Value = serde_yaml::from_str(source)
            .map_err(|err| MakerError::Services(format!("{}: {err}", path.display())))?;

        let document = match value {
            Value::Null => Mapping::new(),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(MakerError::Services(format!(
                    "{}: expected a mapping at the top level",
                    path.display()
                )))
            }
        };

        match document.get(SERVICES_KEY) {
            None | Some(Value::Null | Value::Mapping(_)) => Ok(document),
            Some(_) => Err(MakerError::Services(format!(
                "{}: `{SERVICES_KEY}` is not a mapping",
                path.display()
            ))),
        }
    }

    /// File this store reads and writes
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored record of a service, if any
    #[must_use]
    pub fn service(&self, id: &str) -> Option<&Value> {
        self.document
            .get(SERVICES_KEY)
            .and_then(Value::as_mapping)
            .and_then(|services| services.get(id))
    }

    fn services_mut(&mut self) -> Result<&mut Mapping> {
        if !self.document.get(SERVICES_KEY).is_some_and(Value::is_mapping) {
            self.document
                .insert(Value::from(SERVICES_KEY), Value::Mapping(Mapping::new()));
        }
        self.document
            .get_mut(SERVICES_KEY)
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| MakerError::Services(format!("{}: no services mapping", self.path.display())))
    }
}

impl ServiceStore for YamlServiceStore {
    fn upsert_service(&mut self, service: &ServiceDescriptor) -> Result<UpsertOutcome> {
        let record = serde_yaml::to_value(service)
            .map_err(|err| MakerError::Services(format!("{}: {err}", service.id)))?;
        let policy = self.policy;
        let services = self.services_mut()?;
        let key = Value::from(service.id.as_str());

        let outcome = match services.get(&key) {
            None => UpsertOutcome::Inserted,
            Some(existing) if *existing == record => UpsertOutcome::Unchanged,
            Some(_) if policy == ServiceConflictPolicy::Keep => {
                tracing::warn!(id = %service.id, "Service already defined differently, keeping it");
                UpsertOutcome::Kept
            }
            Some(_) => {
                tracing::warn!(id = %service.id, "Overwriting service definition");
                UpsertOutcome::Updated
            }
        };

        match outcome {
            UpsertOutcome::Inserted => {
                services.insert(key, record);
                self.inserted.push(service.id.clone());
            }
            UpsertOutcome::Updated => {
                services.insert(key, record);
                self.rewrite = true;
            }
            UpsertOutcome::Unchanged | UpsertOutcome::Kept => {}
        }

        tracing::debug!(id = %service.id, %outcome, "Upserted service");
        Ok(outcome)
    }

    fn persist(&mut self) -> Result<()> {
        if self.inserted.is_empty() && !self.rewrite {
            return Ok(());
        }

        let appended = if self.rewrite {
            None
        } else {
            self.appended_source()?
        };
        let yaml = match appended {
            Some(yaml) => yaml,
            None => serde_yaml::to_string(&self.document)
                .map_err(|err| MakerError::Services(format!("{}: {err}", self.path.display())))?,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| MakerError::io(parent, err))?;
        }
        fs::write(&self.path, &yaml).map_err(|err| MakerError::io(&self.path, err))?;

        self.source = Some(yaml);
        self.inserted.clear();
        self.rewrite = false;
        tracing::info!(path = %self.path.display(), "Saved services");
        Ok(())
    }
}

impl YamlServiceStore {
    /// Original text with the inserted records appended to the `services:` block
    ///
    /// Returns `None` when there is no original text, the block is written in
    /// flow style, or the result would not read back as the in-memory document.
    fn appended_source(&self) -> Result<Option<String>> {
        let Some(source) = self.source.as_deref() else {
            return Ok(None);
        };
        let Some(block) = ServicesBlock::find(source) else {
            return Ok(None);
        };

        let mut records = String::new();
        for id in &self.inserted {
            let Some(record) = self.service(id) else {
                continue;
            };
            let mut single = Mapping::new();
            single.insert(Value::from(id.as_str()), record.clone());
            let yaml = serde_yaml::to_string(&single)
                .map_err(|err| MakerError::Services(format!("{id}: {err}")))?;
            for line in yaml.lines() {
                if !line.is_empty() {
                    records.push_str(block.indent);
                }
                records.push_str(line);
                records.push('\n');
            }
        }

        let mut text = String::with_capacity(source.len() + records.len() + 16);
        text.push_str(&source[..block.insert_at]);
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        if !block.exists {
            text.push_str(SERVICES_KEY);
            text.push_str(":\n");
        }
        text.push_str(&records);
        text.push_str(&source[block.insert_at..]);

        let Ok(reread) = serde_yaml::from_str::<Value>(&text) else {
            return Ok(None);
        };
        if reread != Value::Mapping(self.document.clone()) {
            tracing::debug!(path = %self.path.display(), "Append would change the document, rewriting");
            return Ok(None);
        }

        Ok(Some(text))
    }
}

/// Where records go in the text of a services file
#[derive(Debug, PartialEq, Eq)]
struct ServicesBlock<'a> {
    /// Whether a `services:` line exists
    exists: bool,
    /// Byte offset just past the last record line of the block
    insert_at: usize,
    /// Indentation of the block's entries
    indent: &'a str,
}

const DEFAULT_INDENT: &str = "    ";

impl<'a> ServicesBlock<'a> {
    /// Locate the block-style `services:` key and the end of its entries
    ///
    /// `None` means the key holds an inline value (`services: {}`, `~`).
    fn find(source: &'a str) -> Option<Self> {
        let mut offset = 0;
        let mut block: Option<Self> = None;

        for line in source.split_inclusive('\n') {
            let end = offset + line.len();
            offset = end;
            let content = line.trim_end_matches(['\r', '\n']);
            let trimmed = content.trim_start();

            let Some(current) = block.as_mut() else {
                if let Some(rest) = content
                    .strip_prefix(SERVICES_KEY)
                    .and_then(|rest| rest.strip_prefix(':'))
                {
                    let rest = rest.trim();
                    if !(rest.is_empty() || rest.starts_with('#')) {
                        return None;
                    }
                    block = Some(Self {
                        exists: true,
                        insert_at: end,
                        indent: "",
                    });
                }
                continue;
            };

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed.len() == content.len() {
                break;
            }
            if current.indent.is_empty() {
                current.indent = &content[..content.len() - trimmed.len()];
            }
            current.insert_at = end;
        }

        let mut found = block.unwrap_or(Self {
            exists: false,
            insert_at: source.len(),
            indent: "",
        });
        if found.indent.is_empty() {
            found.indent = DEFAULT_INDENT;
        }
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::artifacts::ArtifactKind;
    use crate::scaffold::destination::{Destination, Layout};
    use crate::scaffold::naming::{EntityName, IdentifierSet};
    use crate::scaffold::services::build_service;
    use tempfile::TempDir;

    fn grid_factory() -> ServiceDescriptor {
        let ids = IdentifierSet::derive(&EntityName::parse("Customer").unwrap());
        build_service(ArtifactKind::GridFactory, &ids, &Layout::new(Destination::Root)).unwrap()
    }

    #[test]
    fn test_insert_into_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config/services.yml");
        let mut store = YamlServiceStore::load(&path, ServiceConflictPolicy::Overwrite).unwrap();

        assert_eq!(store.upsert_service(&grid_factory()).unwrap(), UpsertOutcome::Inserted);
        store.persist().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("services:\n  prestashop.core.grid.factory.customer:\n"));
        assert!(written.contains("Grid\\GridFactory"));
        assert!(written.contains("@prestashop.core.grid.definition.factory.customer"));
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("services.yml");
        let mut store = YamlServiceStore::load(&path, ServiceConflictPolicy::Overwrite).unwrap();
        store.upsert_service(&grid_factory()).unwrap();
        store.persist().unwrap();

        let mut reloaded = YamlServiceStore::load(&path, ServiceConflictPolicy::Overwrite).unwrap();
        assert_eq!(reloaded.upsert_service(&grid_factory()).unwrap(), UpsertOutcome::Unchanged);
        assert!(reloaded.service("prestashop.core.grid.factory.customer").is_some());
    }

    #[test]
    fn test_conflict_policies() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("services.yml");
        fs::write(
            &path,
            "imports:\n  - { resource: common.yml }\nservices:\n  prestashop.core.grid.factory.customer:\n    class: Custom\\GridFactory\n",
        )
        .unwrap();

        let mut keep = YamlServiceStore::load(&path, ServiceConflictPolicy::Keep).unwrap();
        assert_eq!(keep.upsert_service(&grid_factory()).unwrap(), UpsertOutcome::Kept);
        assert_eq!(
            keep.service("prestashop.core.grid.factory.customer")
                .and_then(|record| record.get("class"))
                .and_then(Value::as_str),
            Some("Custom\\GridFactory")
        );

        let mut overwrite = YamlServiceStore::load(&path, ServiceConflictPolicy::Overwrite).unwrap();
        assert_eq!(overwrite.upsert_service(&grid_factory()).unwrap(), UpsertOutcome::Updated);
        overwrite.persist().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("resource: common.yml"));
        assert!(!written.contains("Custom\\GridFactory"));
    }

    const COMMENTED: &str = "# Hand-written module services
services:
    _defaults:
        public: true

    # keep this note
    kjgrid.custom_service:
        class: 'Kjgrid\\Custom'
";

    #[test]
    fn test_insert_keeps_comments_and_quoting() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("services.yml");
        fs::write(&path, COMMENTED).unwrap();

        let mut store = YamlServiceStore::load(&path, ServiceConflictPolicy::Overwrite).unwrap();
        assert_eq!(store.upsert_service(&grid_factory()).unwrap(), UpsertOutcome::Inserted);
        store.persist().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(COMMENTED));
        assert!(written[COMMENTED.len()..].starts_with("    prestashop.core.grid.factory.customer:\n"));

        let reloaded = YamlServiceStore::load(&path, ServiceConflictPolicy::Overwrite).unwrap();
        assert!(reloaded.service("kjgrid.custom_service").is_some());
        assert!(reloaded.service("prestashop.core.grid.factory.customer").is_some());
    }

    #[test]
    fn test_insert_lands_before_following_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("services.yml");
        let tail = "\n# parameters below\nparameters:\n  foo: bar\n";
        fs::write(&path, format!("services:\n  a.b:\n    class: A\n{tail}")).unwrap();

        let mut store = YamlServiceStore::load(&path, ServiceConflictPolicy::Overwrite).unwrap();
        store.upsert_service(&grid_factory()).unwrap();
        store.persist().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(
            "services:\n  a.b:\n    class: A\n  prestashop.core.grid.factory.customer:\n"
        ));
        assert!(written.ends_with(tail));
    }

    #[test]
    fn test_services_block_location() {
        assert!(ServicesBlock::find("services: {}\n").is_none());

        let missing = ServicesBlock::find("imports: []\n").unwrap();
        assert!(!missing.exists);
        assert_eq!(missing.insert_at, "imports: []\n".len());

        let empty = ServicesBlock::find("services: # none yet\nparameters: {}\n").unwrap();
        assert!(empty.exists);
        assert_eq!(empty.insert_at, "services: # none yet\n".len());
        assert_eq!(empty.indent, DEFAULT_INDENT);
    }

    #[test]
    fn test_replacing_a_record_rewrites_the_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("services.yml");
        fs::write(
            &path,
            "# dropped on rewrite\nservices:\n  prestashop.core.grid.factory.customer:\n    class: Old\n",
        )
        .unwrap();

        let mut store = YamlServiceStore::load(&path, ServiceConflictPolicy::Overwrite).unwrap();
        assert_eq!(store.upsert_service(&grid_factory()).unwrap(), UpsertOutcome::Updated);
        store.persist().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("# dropped on rewrite"));
        assert!(written.contains("Grid\\GridFactory"));
    }

    #[test]
    fn test_rejects_non_mapping_services() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("services.yml");
        fs::write(&path, "services:\n  - nope\n").unwrap();

        let err = YamlServiceStore::load(&path, ServiceConflictPolicy::Overwrite).unwrap_err();
        assert!(matches!(err, MakerError::Services(_)));
    }

    #[test]
    fn test_policy_from_config_value() {
        let policy: ServiceConflictPolicy = serde_json::from_str("\"keep\"").unwrap();
        assert_eq!(policy, ServiceConflictPolicy::Keep);
    }
}
