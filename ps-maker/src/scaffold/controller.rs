//! Controller augmentation
//!
//! The admin controller is the only generated artifact that may already
//! exist and hold hand-written code. It goes through a small state machine:
//!
//! ```text
//! Absent ──render skeleton + action──────────────▶ Created
//! Present ─┬─ action already declared ───────────▶ Unchanged
//!          ├─ parse + append action ─────────────▶ Augmented
//!          └─ unreadable or unparseable ─────────▶ Skipped (warning)
//! ```

use super::artifacts::{split_class, ArtifactKind, ArtifactSpec, GridContext};
use super::services::grid_class;
use super::source::SourceDocument;
use crate::error::{MakerError, Result};
use crate::templates::{TemplateRenderer, CONTROLLER, INDEX_ACTION};
use crate::workspace::SourceStore;
use serde_json::json;

/// Action added to the controller
pub const INDEX_ACTION_NAME: &str = "indexAction";

/// Return type of the action, fully qualified so no import is needed
pub const RESPONSE_TYPE: &str = "\\Symfony\\Component\\HttpFoundation\\Response";

/// Terminal state of the controller step
#[derive(Debug)]
pub enum ControllerOutcome {
    /// New controller file
    Created(ArtifactSpec),
    /// Existing controller with the action appended
    Augmented {
        /// Rewritten file
        spec: ArtifactSpec,
        /// Source before augmentation
        original: String,
    },
    /// The action is already there
    Unchanged {
        /// Controller class
        class: String,
    },
    /// The controller could not be read; nothing is written for it
    Skipped(MakerError),
}

/// Creates or augments the entity's admin controller
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerAugmenter;

impl ControllerAugmenter {
    /// Fully qualified controller class of the entity
    #[must_use]
    pub fn controller_class(ctx: &GridContext<'_>) -> String {
        format!(
            "{}{}Controller",
            ctx.layout.controller_namespace(),
            ctx.ids.class_name
        )
    }

    /// Render the action member
    ///
    /// # Errors
    ///
    /// Fails if the action template is missing or does not render.
    pub fn render_action(ctx: &GridContext<'_>, templates: &dyn TemplateRenderer) -> Result<String> {
        let filters = grid_class(ctx.layout, ctx.ids, ArtifactKind::Filters)
            .ok_or_else(|| MakerError::Config("Filters have no class".to_string()))?;

        let variables = json!({
            "action_name": INDEX_ACTION_NAME,
            "filters_type": format!("\\{filters}"),
            "response_type": RESPONSE_TYPE,
            "grid_factory_service": ctx.service_ids().grid_factory(),
            "view_reference": ctx.layout.view_reference(ctx.ids),
            "grid_name": ctx.ids.human_title,
            "grid_name_lower": ctx.ids.human_title.to_lowercase(),
            "translation_domain": ctx.translation_domain,
        });

        templates.render(INDEX_ACTION, &variables)
    }

    /// Decide what happens to the controller
    ///
    /// Only template failures and invalid identifiers are returned as
    /// errors. Problems with an existing file end in
    /// [`ControllerOutcome::Skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`MakerError::InvalidIdentifier`] or
    /// [`MakerError::MissingTemplate`].
    pub fn augment(
        &self,
        ctx: &GridContext<'_>,
        templates: &dyn TemplateRenderer,
        sources: &dyn SourceStore,
    ) -> Result<ControllerOutcome> {
        ctx.ids.validate()?;

        let class = Self::controller_class(ctx);
        let path = ctx.layout.class_path(&class).ok_or_else(|| {
            MakerError::Config(format!("No autoload prefix matches class {class}"))
        })?;
        let action = Self::render_action(ctx, templates)?;

        if !sources.class_exists(&class) {
            let (namespace, class_name) = split_class(&class);
            let variables = json!({
                "namespace": namespace,
                "class_name": class_name,
            });
            let skeleton = templates.render(CONTROLLER, &variables)?;
            let mut document = SourceDocument::parse(&skeleton).map_err(|err| MakerError::Render {
                template: CONTROLLER.to_string(),
                message: err.to_string(),
            })?;
            document.append_member(&action);

            tracing::debug!(%class, "Creating controller");
            return Ok(ControllerOutcome::Created(ArtifactSpec {
                path,
                template: CONTROLLER.to_string(),
                variables,
                content: document.to_source(),
                description: format!("controller for {}", ctx.ids.class_name),
            }));
        }

        let original = match sources.read_existing_source(&class) {
            Ok(Some(source)) => source,
            Ok(None) => {
                return Ok(Self::skip(&class, "the class exists but its file could not be located"))
            }
            Err(err) => return Ok(Self::skip(&class, &err.to_string())),
        };

        let mut document = match SourceDocument::parse(&original) {
            Ok(document) => document,
            Err(err) => return Ok(Self::skip(&class, &err.to_string())),
        };

        if document.has_method(INDEX_ACTION_NAME) {
            tracing::debug!(%class, action = INDEX_ACTION_NAME, "Action already present");
            return Ok(ControllerOutcome::Unchanged { class });
        }

        document.append_member(&action);
        tracing::debug!(%class, action = INDEX_ACTION_NAME, "Appending action");

        Ok(ControllerOutcome::Augmented {
            spec: ArtifactSpec {
                path,
                template: INDEX_ACTION.to_string(),
                variables: json!({ "action_name": INDEX_ACTION_NAME }),
                content: document.to_source(),
                description: format!("{INDEX_ACTION_NAME} added to {}", document.class_name()),
            },
            original,
        })
    }

    fn skip(class: &str, reason: &str) -> ControllerOutcome {
        let warning = MakerError::ControllerRead {
            class: class.to_string(),
            reason: reason.to_string(),
        };
        tracing::warn!(%class, %reason, "Skipping controller");
        ControllerOutcome::Skipped(warning)
    }
}
