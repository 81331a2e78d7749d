//! Grid data factory and grid factory generators
//!
//! Both only wire existing classes together, so they produce a service
//! record and no file.

use super::{Artifact, ArtifactGenerator, ArtifactKind, GridContext};
use crate::error::Result;
use crate::scaffold::services::build_service;
use crate::templates::TemplateRenderer;

/// Generates the data factory service
pub struct DataFactoryGenerator;

/// Generates the grid factory service
pub struct GridFactoryGenerator;

fn service_only(kind: ArtifactKind, ctx: &GridContext<'_>) -> Result<Artifact> {
    ctx.ids.validate()?;

    let service = build_service(kind, ctx.ids, ctx.layout);
    if let Some(service) = &service {
        tracing::debug!(%kind, id = %service.id, "Built service");
    }

    Ok(Artifact {
        kind,
        file: None,
        service,
    })
}

impl ArtifactGenerator for DataFactoryGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::DataFactory
    }

    fn generate(&self, ctx: &GridContext<'_>, _templates: &dyn TemplateRenderer) -> Result<Artifact> {
        service_only(self.kind(), ctx)
    }
}

impl ArtifactGenerator for GridFactoryGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::GridFactory
    }

    fn generate(&self, ctx: &GridContext<'_>, _templates: &dyn TemplateRenderer) -> Result<Artifact> {
        service_only(self.kind(), ctx)
    }
}
