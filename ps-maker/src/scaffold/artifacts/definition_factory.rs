//! Grid definition factory generator

use super::{render_class, Artifact, ArtifactGenerator, ArtifactKind, GridContext};
use crate::error::Result;
use crate::scaffold::services::build_service;
use crate::templates::{TemplateRenderer, DEFINITION_FACTORY};
use serde_json::{json, Value};

/// Generates the grid definition factory class and its service
pub struct DefinitionFactoryGenerator;

impl DefinitionFactoryGenerator {
    /// Grid columns in property order
    fn columns(ctx: &GridContext<'_>) -> Vec<Value> {
        ctx.properties
            .iter()
            .map(|property| {
                json!({
                    "field": property.field(),
                    "title": property.title(),
                })
            })
            .collect()
    }
}

impl ArtifactGenerator for DefinitionFactoryGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::DefinitionFactory
    }

    fn generate(&self, ctx: &GridContext<'_>, templates: &dyn TemplateRenderer) -> Result<Artifact> {
        let variables = json!({
            "grid_id": ctx.ids.plural_snake_case,
            "grid_name": ctx.ids.human_title,
            "columns": Self::columns(ctx),
            "translation_domain": ctx.translation_domain,
        });

        let file = render_class(ctx, templates, self.kind(), DEFINITION_FACTORY, variables)?;

        Ok(Artifact {
            kind: self.kind(),
            file: Some(file),
            service: build_service(self.kind(), ctx.ids, ctx.layout),
        })
    }
}
