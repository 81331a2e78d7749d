//! Search filters generator

use super::{render_class, split_class, Artifact, ArtifactGenerator, ArtifactKind, GridContext};
use crate::error::{MakerError, Result};
use crate::scaffold::services::grid_class;
use crate::templates::{TemplateRenderer, FILTERS};
use serde_json::json;

/// Generates the filters class; it has no service
pub struct FiltersGenerator;

impl ArtifactGenerator for FiltersGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Filters
    }

    fn generate(&self, ctx: &GridContext<'_>, templates: &dyn TemplateRenderer) -> Result<Artifact> {
        let definition_factory = grid_class(ctx.layout, ctx.ids, ArtifactKind::DefinitionFactory)
            .ok_or_else(|| MakerError::Config("Definition factory has no class".to_string()))?;
        let (_, definition_factory_name) = split_class(&definition_factory);

        let variables = json!({
            "definition_factory_class": definition_factory,
            "definition_factory_name": definition_factory_name,
            "primary_key": ctx.ids.primary_key(),
        });

        let file = render_class(ctx, templates, self.kind(), FILTERS, variables)?;

        Ok(Artifact {
            kind: self.kind(),
            file: Some(file),
            service: None,
        })
    }
}
