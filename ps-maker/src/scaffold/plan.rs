//! Accumulated write set of one run

use super::artifacts::{Artifact, ArtifactSpec};
use super::controller::ControllerOutcome;
use super::services::ServiceDescriptor;
use crate::error::{MakerError, Result};
use crate::workspace::{ServiceStore, SourceStore, UpsertOutcome};
use std::fmt;
use std::path::PathBuf;

/// What happened to one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    /// File rendered from a template
    Generated,
    /// Controller created from scratch
    Created,
    /// Action appended to an existing controller
    Augmented,
    /// Already present, nothing to do
    Unchanged,
    /// Left alone after a recoverable failure
    Skipped,
    /// Service record to upsert
    Registered,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generated => "generated",
            Self::Created => "created",
            Self::Augmented => "augmented",
            Self::Unchanged => "unchanged",
            Self::Skipped => "skipped",
            Self::Registered => "registered",
        })
    }
}

/// One line of the run report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Outcome
    pub status: ReportStatus,
    /// File path or service id
    pub target: String,
    /// Human description
    pub description: String,
}

/// Controller rewrite, kept for dry-run diffs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerChange {
    /// File path
    pub path: PathBuf,
    /// Source before the change, `None` for a new file
    pub original: Option<String>,
    /// Source after the change
    pub content: String,
}

/// Files and services of one run, committed exactly once
#[derive(Debug, Default)]
pub struct GenerationPlan {
    files: Vec<ArtifactSpec>,
    services: Vec<ServiceDescriptor>,
    report: Vec<ReportEntry>,
    warnings: Vec<MakerError>,
    controller: Option<ControllerChange>,
}

/// Result of a commit
#[derive(Debug)]
pub struct CommitReport {
    /// Report entries of the plan
    pub entries: Vec<ReportEntry>,
    /// Recoverable failures
    pub warnings: Vec<MakerError>,
    /// Upsert outcome per service id
    pub services: Vec<(String, UpsertOutcome)>,
    /// Paths written
    pub files: Vec<PathBuf>,
}

impl GenerationPlan {
    /// Empty plan
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generator output
    pub fn add_artifact(&mut self, artifact: Artifact) {
        if let Some(spec) = artifact.file {
            self.push_file(ReportStatus::Generated, spec);
        }
        if let Some(service) = artifact.service {
            self.report.push(ReportEntry {
                status: ReportStatus::Registered,
                target: service.id.clone(),
                description: format!("{} service", artifact.kind),
            });
            self.services.push(service);
        }
    }

    /// Record the controller step
    pub fn add_controller(&mut self, outcome: ControllerOutcome) {
        match outcome {
            ControllerOutcome::Created(spec) => {
                self.controller = Some(ControllerChange {
                    path: spec.path.clone(),
                    original: None,
                    content: spec.content.clone(),
                });
                self.push_file(ReportStatus::Created, spec);
            }
            ControllerOutcome::Augmented { spec, original } => {
                self.controller = Some(ControllerChange {
                    path: spec.path.clone(),
                    original: Some(original),
                    content: spec.content.clone(),
                });
                self.push_file(ReportStatus::Augmented, spec);
            }
            ControllerOutcome::Unchanged { class } => self.report.push(ReportEntry {
                status: ReportStatus::Unchanged,
                description: "controller already has the action".to_string(),
                target: class,
            }),
            ControllerOutcome::Skipped(warning) => {
                let target = match &warning {
                    MakerError::ControllerRead { class, .. } => class.clone(),
                    _ => String::new(),
                };
                self.report.push(ReportEntry {
                    status: ReportStatus::Skipped,
                    target,
                    description: warning.to_string(),
                });
                self.warnings.push(warning);
            }
        }
    }

    /// Record a rendered file whose target already exists; it is not written
    pub fn add_existing(&mut self, spec: &ArtifactSpec) {
        self.report.push(ReportEntry {
            status: ReportStatus::Unchanged,
            target: spec.path.display().to_string(),
            description: format!("{} already present", spec.description),
        });
    }

    fn push_file(&mut self, status: ReportStatus, spec: ArtifactSpec) {
        self.report.push(ReportEntry {
            status,
            target: spec.path.display().to_string(),
            description: spec.description.clone(),
        });
        self.files.push(spec);
    }

    /// Files to write, in generation order
    #[must_use]
    pub fn files(&self) -> &[ArtifactSpec] {
        &self.files
    }

    /// Services to upsert, in generation order
    #[must_use]
    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    /// Report entries, in generation order
    #[must_use]
    pub fn report(&self) -> &[ReportEntry] {
        &self.report
    }

    /// Recoverable failures collected so far
    #[must_use]
    pub fn warnings(&self) -> &[MakerError] {
        &self.warnings
    }

    /// Controller change, if the controller is written
    #[must_use]
    pub const fn controller(&self) -> Option<&ControllerChange> {
        self.controller.as_ref()
    }

    /// Upsert and persist every service, then write every file
    ///
    /// Services go first: a services file that cannot be written stops the
    /// commit before any class lands on disk. A file write failing afterwards
    /// leaves registered services whose files are missing; re-running
    /// completes the commit because present files and identical services are
    /// left alone.
    ///
    /// # Errors
    ///
    /// Returns the first store error.
    pub fn commit(
        self,
        sources: &mut dyn SourceStore,
        services: &mut dyn ServiceStore,
    ) -> Result<CommitReport> {
        let mut outcomes = Vec::with_capacity(self.services.len());
        for service in &self.services {
            let outcome = services.upsert_service(service)?;
            outcomes.push((service.id.clone(), outcome));
        }
        services.persist()?;

        let mut files = Vec::with_capacity(self.files.len());
        for spec in &self.files {
            sources.write_file(&spec.path, &spec.content)?;
            files.push(spec.path.clone());
        }

        tracing::info!(
            files = files.len(),
            services = outcomes.len(),
            warnings = self.warnings.len(),
            "Committed plan"
        );

        Ok(CommitReport {
            entries: self.report,
            warnings: self.warnings,
            services: outcomes,
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::artifacts::{grid_generators, test_support::Fixture, ArtifactKind};
    use crate::templates::TemplateRegistry;
    use crate::testing::{InMemoryServiceStore, InMemoryWorkspace};

    fn customer_plan() -> GenerationPlan {
        let fixture = Fixture::customer();
        let templates = TemplateRegistry::new().unwrap();
        let mut plan = GenerationPlan::new();
        for generator in grid_generators() {
            plan.add_artifact(generator.generate(&fixture.context(), &templates).unwrap());
        }
        plan
    }

    #[test]
    fn test_plan_collects_files_and_services() {
        let plan = customer_plan();
        assert_eq!(plan.files().len(), 3);
        assert_eq!(plan.services().len(), 4);
        assert_eq!(plan.report().len(), 7);
        assert!(plan.controller().is_none());
    }

    #[test]
    fn test_skipped_controller_is_a_warning() {
        let mut plan = customer_plan();
        plan.add_controller(ControllerOutcome::Skipped(MakerError::ControllerRead {
            class: "A\\B".to_string(),
            reason: "denied".to_string(),
        }));

        assert_eq!(plan.warnings().len(), 1);
        let entry = plan.report().last().unwrap();
        assert_eq!(entry.status, ReportStatus::Skipped);
        assert_eq!(entry.target, "A\\B");
    }

    #[test]
    fn test_commit_writes_then_upserts_once() {
        let plan = customer_plan();
        let fixture = Fixture::customer();
        let mut sources = InMemoryWorkspace::new(fixture.layout.clone());
        let mut services = InMemoryServiceStore::new();

        let report = plan.commit(&mut sources, &mut services).unwrap();

        assert_eq!(sources.writes(), report.files.as_slice());
        assert_eq!(services.upserts().len(), 4);
        assert_eq!(services.persists(), 1);
        assert!(report
            .services
            .iter()
            .all(|(_, outcome)| *outcome == UpsertOutcome::Inserted));
        assert!(report.warnings.is_empty());
    }

    struct ReadOnlyServices;

    impl ServiceStore for ReadOnlyServices {
        fn upsert_service(&mut self, _service: &ServiceDescriptor) -> Result<UpsertOutcome> {
            Ok(UpsertOutcome::Inserted)
        }

        fn persist(&mut self) -> Result<()> {
            Err(MakerError::io(
                "config/services.yml",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ))
        }
    }

    #[test]
    fn test_services_failure_writes_no_file() {
        let plan = customer_plan();
        let mut sources = InMemoryWorkspace::new(Fixture::customer().layout);

        let err = plan.commit(&mut sources, &mut ReadOnlyServices).unwrap_err();

        assert!(matches!(err, MakerError::Io { .. }));
        assert!(sources.writes().is_empty());
    }

    #[test]
    fn test_existing_file_is_reported_not_written() {
        let fixture = Fixture::customer();
        let templates = TemplateRegistry::new().unwrap();
        let artifact = grid_generators()[2].generate(&fixture.context(), &templates).unwrap();
        let spec = artifact.file.unwrap();

        let mut plan = GenerationPlan::new();
        plan.add_existing(&spec);

        assert!(plan.files().is_empty());
        let entry = &plan.report()[0];
        assert_eq!(entry.status, ReportStatus::Unchanged);
        assert_eq!(entry.target, spec.path.display().to_string());
        assert!(entry.description.ends_with("already present"));
    }

    #[test]
    fn test_report_labels() {
        assert_eq!(ReportStatus::Augmented.to_string(), "augmented");
        let plan = customer_plan();
        assert_eq!(
            plan.report()[4].description,
            format!("{} service", ArtifactKind::QueryBuilder)
        );
    }
}
