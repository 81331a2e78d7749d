//! Template registry for grid generation
//!
//! Templates are handlebars sources keyed by a template id. The embedded
//! defaults live in [`grid`]; a directory of `<TemplateId>.hbs` files can
//! override any of them.

use crate::error::{MakerError, Result};
use handlebars::Handlebars;
use std::fs;
use std::path::Path;

pub mod grid;
pub use grid::*;

/// Grid definition factory class
pub const DEFINITION_FACTORY: &str = "DefinitionFactory";
/// Search filters class
pub const FILTERS: &str = "Filters";
/// Query builder class
pub const QUERY_BUILDER: &str = "QueryBuilder";
/// Controller skeleton
pub const CONTROLLER: &str = "Controller";
/// Index action member
pub const INDEX_ACTION: &str = "IndexAction";
/// Grid index view
pub const INDEX_VIEW: &str = "index";

/// File extension of template overrides
pub const TEMPLATE_EXTENSION: &str = "hbs";

/// Embedded templates by id
pub const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    (DEFINITION_FACTORY, DEFINITION_FACTORY_TEMPLATE),
    (FILTERS, FILTERS_TEMPLATE),
    (QUERY_BUILDER, QUERY_BUILDER_TEMPLATE),
    (CONTROLLER, CONTROLLER_TEMPLATE),
    (INDEX_ACTION, INDEX_ACTION_TEMPLATE),
    (INDEX_VIEW, INDEX_VIEW_TEMPLATE),
];

/// Renders a named template with a flat set of variables
pub trait TemplateRenderer {
    /// Render `template` with `variables`
    ///
    /// # Errors
    ///
    /// Returns [`MakerError::MissingTemplate`] if the template is unknown and
    /// [`MakerError::Render`] if rendering fails.
    fn render(&self, template: &str, variables: &serde_json::Value) -> Result<String>;
}

/// Handlebars backed template registry
pub struct TemplateRegistry {
    handlebars: Handlebars<'static>,
}

impl TemplateRegistry {
    /// Registry with the embedded templates
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded template fails to compile.
    pub fn new() -> Result<Self> {
        let mut registry = Self::empty();
        for (name, source) in EMBEDDED_TEMPLATES {
            registry.register(name, source)?;
        }
        Ok(registry)
    }

    /// Registry with no templates at all
    #[must_use]
    pub fn empty() -> Self {
        let mut handlebars = Handlebars::new();

        // Disable HTML escaping since we're generating code
        handlebars.register_escape_fn(handlebars::no_escape);

        Self { handlebars }
    }

    /// Embedded templates, overridden by `<TemplateId>.hbs` files in `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or an override fails
    /// to compile.
    pub fn with_overrides(dir: &Path) -> Result<Self> {
        let mut registry = Self::new()?;

        let entries = fs::read_dir(dir).map_err(|e| MakerError::io(dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| MakerError::io(dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let source = fs::read_to_string(&path).map_err(|e| MakerError::io(&path, e))?;
            registry.register(name, &source)?;
            tracing::debug!(template = name, path = %path.display(), "Template override loaded");
        }

        Ok(registry)
    }

    /// Register or replace a template
    ///
    /// # Errors
    ///
    /// Returns [`MakerError::Render`] if the source does not compile.
    pub fn register(&mut self, name: &str, source: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| MakerError::Render {
                template: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Whether a template is registered
    #[must_use]
    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }
}

impl TemplateRenderer for TemplateRegistry {
    fn render(&self, template: &str, variables: &serde_json::Value) -> Result<String> {
        if !self.has_template(template) {
            return Err(MakerError::MissingTemplate(template.to_string()));
        }

        self.handlebars
            .render(template, variables)
            .map_err(|e| MakerError::Render {
                template: template.to_string(),
                message: e.to_string(),
            })
    }
}

/// Write every embedded template to `dir` as `<TemplateId>.hbs`
///
/// Existing files are left alone unless `force` is set. Returns the paths
/// that were written.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn export_templates(dir: &Path, force: bool) -> Result<Vec<std::path::PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| MakerError::io(dir, e))?;

    let mut written = Vec::new();
    for (name, source) in EMBEDDED_TEMPLATES {
        let path = dir.join(format!("{name}.{TEMPLATE_EXTENSION}"));
        if path.exists() && !force {
            tracing::debug!(path = %path.display(), "Template already exported, skipping");
            continue;
        }
        fs::write(&path, source).map_err(|e| MakerError::io(&path, e))?;
        written.push(path);
    }

    Ok(written)
}
