//! Grid scaffold orchestrator
//!
//! Runs the pipeline in a fixed order:
//! 1. Identifiers derived once from the entity name
//! 2. Definition factory, filters, query builder, data factory, grid factory
//! 3. Controller (created or augmented)
//! 4. Index view
//! 5. One commit of every file write and service upsert
//!
//! Any fatal error before step 5 drops the plan, so nothing is written.
//! Files that already exist are reported as unchanged and never rewritten.

use super::artifacts::{
    grid_generators, Artifact, ArtifactGenerator, GridContext, ViewTemplateGenerator,
};
use super::controller::ControllerAugmenter;
use super::destination::Layout;
use super::naming::{EntityName, IdentifierSet};
use super::plan::{CommitReport, GenerationPlan};
use super::property::PropertyDescriptor;
use crate::error::Result;
use crate::templates::TemplateRenderer;
use crate::workspace::{ServiceStore, SourceStore};

/// Translation domain used when neither the request nor the destination sets one
pub const DEFAULT_TRANSLATION_DOMAIN: &str = "Admin.Translation.Domain";

/// Input of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRequest {
    /// Entity name as typed by the user
    pub entity: String,
    /// Properties in column order
    pub properties: Vec<PropertyDescriptor>,
    /// Translation domain, defaults to the destination's
    pub translation_domain: Option<String>,
}

impl GridRequest {
    /// Request for an entity with no properties
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    /// Set the properties
    #[must_use]
    pub fn with_properties(mut self, properties: Vec<PropertyDescriptor>) -> Self {
        self.properties = properties;
        self
    }

    /// Set the translation domain
    #[must_use]
    pub fn with_translation_domain(mut self, domain: impl Into<String>) -> Self {
        self.translation_domain = Some(domain.into());
        self
    }
}

/// Plans and commits a grid scaffold
pub struct GridGenerator<'t> {
    layout: Layout,
    templates: &'t dyn TemplateRenderer,
}

impl<'t> GridGenerator<'t> {
    /// Generator for a destination layout
    #[must_use]
    pub fn new(layout: Layout, templates: &'t dyn TemplateRenderer) -> Self {
        Self { layout, templates }
    }

    /// Destination layout
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Translation domain a request resolves to
    #[must_use]
    pub fn translation_domain(&self, request: &GridRequest) -> String {
        request
            .translation_domain
            .clone()
            .or_else(|| self.layout.default_translation_domain())
            .unwrap_or_else(|| DEFAULT_TRANSLATION_DOMAIN.to_string())
    }

    /// Build the plan without writing anything
    ///
    /// # Errors
    ///
    /// Returns [`crate::MakerError::InvalidIdentifier`] for a bad entity name
    /// and [`crate::MakerError::MissingTemplate`] for an unknown template. An
    /// unreadable controller is not an error; it shows up in
    /// [`GenerationPlan::warnings`].
    pub fn plan(&self, request: &GridRequest, sources: &dyn SourceStore) -> Result<GenerationPlan> {
        let entity = EntityName::parse(&request.entity)?;
        let ids = IdentifierSet::derive(&entity);
        ids.validate()?;

        let translation_domain = self.translation_domain(request);
        let ctx = GridContext {
            ids: &ids,
            properties: &request.properties,
            layout: &self.layout,
            translation_domain: &translation_domain,
        };

        tracing::debug!(
            entity = %ids.class_name,
            grid = %ids.plural_snake_case,
            alias = %ids.table_alias,
            "Planning grid"
        );

        let mut plan = GenerationPlan::new();
        for generator in grid_generators() {
            Self::add(&mut plan, generator.generate(&ctx, self.templates)?, sources);
        }

        let controller = ControllerAugmenter.augment(&ctx, self.templates, sources)?;
        plan.add_controller(controller);

        Self::add(&mut plan, ViewTemplateGenerator.generate(&ctx, self.templates)?, sources);

        Ok(plan)
    }

    /// Generated files are never overwritten; an existing one is reported instead
    fn add(plan: &mut GenerationPlan, mut artifact: Artifact, sources: &dyn SourceStore) {
        if let Some(existing) = artifact.file.take_if(|spec| sources.file_exists(&spec.path)) {
            tracing::debug!(path = %existing.path.display(), "File already present");
            plan.add_existing(&existing);
        }
        plan.add_artifact(artifact);
    }

    /// Plan and commit in one go
    ///
    /// # Errors
    ///
    /// Returns planning errors before anything is written, or the first
    /// store error during the commit.
    pub fn run(
        &self,
        request: &GridRequest,
        sources: &mut dyn SourceStore,
        services: &mut dyn ServiceStore,
    ) -> Result<CommitReport> {
        let plan = self.plan(request, &*sources)?;
        plan.commit(sources, services)
    }
}
