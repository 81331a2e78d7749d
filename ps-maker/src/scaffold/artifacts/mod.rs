//! Artifact generators
//!
//! One generator per artifact kind. Each consumes the entity identifiers and
//! a template and yields a file-write instruction, a service descriptor, or
//! both. Rendering happens here, before anything is committed, so a missing
//! template or an invalid identifier aborts the whole plan.

use super::destination::Layout;
use super::naming::IdentifierSet;
use super::property::PropertyDescriptor;
use super::services::{grid_class, ServiceDescriptor, ServiceIds};
use crate::error::{MakerError, Result};
use crate::templates::TemplateRenderer;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

mod definition_factory;
mod factories;
mod filters;
mod query_builder;
mod view;

pub use definition_factory::DefinitionFactoryGenerator;
pub use factories::{DataFactoryGenerator, GridFactoryGenerator};
pub use filters::FiltersGenerator;
pub use query_builder::{select_statement, QueryBuilderGenerator};
pub use view::ViewTemplateGenerator;

/// Kind of generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Grid definition factory class and service
    DefinitionFactory,
    /// Search filters class
    Filters,
    /// Query builder class and service
    QueryBuilder,
    /// Grid data factory service
    DataFactory,
    /// Grid factory service
    GridFactory,
    /// Grid index view
    Template,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DefinitionFactory => "grid definition factory",
            Self::Filters => "filters",
            Self::QueryBuilder => "query builder",
            Self::DataFactory => "grid data factory",
            Self::GridFactory => "grid factory",
            Self::Template => "view template",
        };
        f.write_str(label)
    }
}

/// Everything a generator needs to know about the run
#[derive(Debug, Clone, Copy)]
pub struct GridContext<'a> {
    /// Entity identifiers
    pub ids: &'a IdentifierSet,
    /// Entity properties, in column order
    pub properties: &'a [PropertyDescriptor],
    /// Destination layout
    pub layout: &'a Layout,
    /// Translation domain for grid and column titles
    pub translation_domain: &'a str,
}

impl GridContext<'_> {
    /// Service ids of this entity
    #[must_use]
    pub fn service_ids(&self) -> ServiceIds {
        ServiceIds::new(self.layout, self.ids)
    }
}

/// A rendered file, ready to be written
#[derive(Debug, Clone)]
pub struct ArtifactSpec {
    /// Path relative to the project root
    pub path: PathBuf,
    /// Template the content was rendered from
    pub template: String,
    /// Variables the template was rendered with
    pub variables: Value,
    /// Rendered content
    pub content: String,
    /// Short description for user feedback
    pub description: String,
}

/// Output of one generator
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Kind of artifact
    pub kind: ArtifactKind,
    /// File to write, if any
    pub file: Option<ArtifactSpec>,
    /// Service to upsert, if any
    pub service: Option<ServiceDescriptor>,
}

/// Common contract of the artifact generators
pub trait ArtifactGenerator {
    /// Kind of artifact produced
    fn kind(&self) -> ArtifactKind;

    /// Produce the artifact for one entity
    ///
    /// # Errors
    ///
    /// Returns [`MakerError::InvalidIdentifier`] if an identifier is empty and
    /// [`MakerError::MissingTemplate`] if the template cannot be found.
    fn generate(&self, ctx: &GridContext<'_>, templates: &dyn TemplateRenderer) -> Result<Artifact>;
}

/// The file and service generators, in generation order
///
/// The view template generator is not included: it runs after the
/// controller.
#[must_use]
pub fn grid_generators() -> Vec<Box<dyn ArtifactGenerator>> {
    vec![
        Box::new(DefinitionFactoryGenerator),
        Box::new(FiltersGenerator),
        Box::new(QueryBuilderGenerator),
        Box::new(DataFactoryGenerator),
        Box::new(GridFactoryGenerator),
    ]
}

/// Split a fully qualified class into namespace and short name
#[must_use]
pub fn split_class(class: &str) -> (&str, &str) {
    let class = class.trim_start_matches('\\');
    class.rsplit_once('\\').unwrap_or(("", class))
}

/// Render a generated class of `kind` into a file spec
///
/// `variables` must be a JSON object; `namespace` and `class_name` are added.
pub(crate) fn render_class(
    ctx: &GridContext<'_>,
    templates: &dyn TemplateRenderer,
    kind: ArtifactKind,
    template: &str,
    mut variables: Value,
) -> Result<ArtifactSpec> {
    ctx.ids.validate()?;

    let class = grid_class(ctx.layout, ctx.ids, kind)
        .ok_or_else(|| MakerError::Config(format!("{kind} is not a class artifact")))?;
    let path = ctx.layout.class_path(&class).ok_or_else(|| {
        MakerError::Config(format!("No autoload prefix matches class {class}"))
    })?;

    let (namespace, class_name) = split_class(&class);
    if let Value::Object(map) = &mut variables {
        map.insert("namespace".to_string(), Value::from(namespace));
        map.insert("class_name".to_string(), Value::from(class_name));
    }

    let content = templates.render(template, &variables)?;
    tracing::debug!(%kind, path = %path.display(), "Rendered class");

    Ok(ArtifactSpec {
        path,
        template: template.to_string(),
        variables,
        content,
        description: format!("{kind} for {}", ctx.ids.class_name),
    })
}
