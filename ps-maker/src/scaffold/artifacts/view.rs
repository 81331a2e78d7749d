//! Grid index view generator

use super::{Artifact, ArtifactGenerator, ArtifactKind, ArtifactSpec, GridContext};
use crate::error::Result;
use crate::templates::{TemplateRenderer, INDEX_VIEW};
use serde_json::json;

/// Generates the index view; it has no service
pub struct ViewTemplateGenerator;

impl ArtifactGenerator for ViewTemplateGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Template
    }

    fn generate(&self, ctx: &GridContext<'_>, templates: &dyn TemplateRenderer) -> Result<Artifact> {
        ctx.ids.validate()?;

        let variables = json!({
            "class_name": ctx.ids.class_name,
            "grid_id": ctx.ids.plural_snake_case,
            "grid_name": ctx.ids.human_title,
        });
        let content = templates.render(INDEX_VIEW, &variables)?;

        Ok(Artifact {
            kind: self.kind(),
            file: Some(ArtifactSpec {
                path: ctx.layout.view_path(ctx.ids),
                template: INDEX_VIEW.to_string(),
                variables,
                content,
                description: format!("{} for {}", self.kind(), ctx.ids.class_name),
            }),
            service: None,
        })
    }
}
