//! Configuration for ps-maker
//!
//! Loaded from three layers, later ones winning:
//!
//! 1. Hardcoded defaults
//! 2. `ps-maker.toml` in the project root, or the file given with `--config`
//! 3. Environment variables (`PS_MAKER_` prefix, `__` for nesting)
//!
//! # Example Configuration
//!
//! ```toml
//! # ps-maker.toml
//! [project]
//! module_namespace = "Kaudaj\\Module\\{module}\\"
//!
//! [templates]
//! override_dir = "./maker-templates"
//! view_extension = "html.twig"
//!
//! [services]
//! on_conflict = "keep"
//!
//! [translation]
//! default_domain = "Admin.Catalog.Feature"
//! ```
//!
//! `PS_MAKER_SERVICES__ON_CONFLICT=overwrite` overrides `services.on_conflict`.

use crate::error::{MakerError, Result};
use crate::scaffold::destination::{
    Destination, Layout, DEFAULT_MODULE_NAMESPACE, DEFAULT_MODULE_SERVICES_FILE,
    DEFAULT_ROOT_SERVICES_FILE, DEFAULT_VIEW_EXTENSION,
};
use crate::scaffold::generator::DEFAULT_TRANSLATION_DOMAIN;
use crate::workspace::ServiceConflictPolicy;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project-level configuration file
pub const CONFIG_FILE: &str = "ps-maker.toml";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "PS_MAKER_";

/// Project settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Root of the PrestaShop checkout
    pub root: PathBuf,
    /// Module namespace pattern, `{module}` is the `PascalCase` module name
    pub module_namespace: String,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            module_namespace: DEFAULT_MODULE_NAMESPACE.to_string(),
        }
    }
}

/// Template settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directory of `<TemplateId>.hbs` overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_dir: Option<PathBuf>,
    /// Extension of generated views
    pub view_extension: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            override_dir: None,
            view_extension: DEFAULT_VIEW_EXTENSION.to_string(),
        }
    }
}

/// Services file settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Services file of the core project, relative to the root
    pub root_file: PathBuf,
    /// Services file of a module, relative to the module directory
    pub module_file: PathBuf,
    /// What to do with an existing, different record
    pub on_conflict: ServiceConflictPolicy,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            root_file: PathBuf::from(DEFAULT_ROOT_SERVICES_FILE),
            module_file: PathBuf::from(DEFAULT_MODULE_SERVICES_FILE),
            on_conflict: ServiceConflictPolicy::default(),
        }
    }
}

/// Translation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Domain offered when generating into the core project
    pub default_domain: String,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            default_domain: DEFAULT_TRANSLATION_DOMAIN.to_string(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakerConfig {
    /// Project settings
    #[serde(default)]
    pub project: ProjectSettings,
    /// Template settings
    #[serde(default)]
    pub templates: TemplateSettings,
    /// Services file settings
    #[serde(default)]
    pub services: ServiceSettings,
    /// Translation settings
    #[serde(default)]
    pub translation: TranslationSettings,
}

impl MakerConfig {
    /// Load configuration for a project
    ///
    /// `explicit` replaces the project's `ps-maker.toml` and must exist.
    ///
    /// # Errors
    ///
    /// Returns [`MakerError::Config`] if the explicit file is missing, a file
    /// does not parse, or a value has the wrong type.
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Self::defaults()?;

        match explicit {
            Some(path) if !path.is_file() => {
                return Err(MakerError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )))
            }
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                let local = project_root.join(CONFIG_FILE);
                if local.is_file() {
                    figment = figment.merge(Toml::file(local));
                }
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let mut config: Self = Self::extract(&figment)?;
        if config.project.root == Path::new(".") {
            config.project.root = project_root.to_path_buf();
        }
        Ok(config)
    }

    /// Figment seeded with the defaults
    ///
    /// # Errors
    ///
    /// Returns [`MakerError::Config`] if the defaults cannot be serialized.
    pub fn defaults() -> Result<Figment> {
        let defaults =
            toml::to_string(&Self::default()).map_err(|e| MakerError::Config(e.to_string()))?;
        Ok(Figment::new().merge(Toml::string(&defaults)))
    }

    /// Extract a configuration from any figment
    ///
    /// # Errors
    ///
    /// Returns [`MakerError::Config`] on missing or mistyped values.
    pub fn extract(figment: &Figment) -> Result<Self> {
        figment
            .extract()
            .map_err(|e| MakerError::Config(e.to_string()))
    }

    /// Layout for a destination, with the configured conventions applied
    #[must_use]
    pub fn layout(&self, destination: Destination) -> Layout {
        let layout = Layout::new(destination)
            .with_module_namespace(&self.project.module_namespace)
            .with_view_extension(&self.templates.view_extension);

        let services_file = if layout.destination().is_root() {
            self.services.root_file.clone()
        } else {
            layout.base_dir().join(&self.services.module_file)
        };
        layout.with_services_file(services_file)
    }

    /// Template override directory, resolved against the project root
    #[must_use]
    pub fn override_dir(&self) -> Option<PathBuf> {
        self.templates
            .override_dir
            .as_ref()
            .map(|dir| self.project.root.join(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = MakerConfig::default();
        assert_eq!(config.project.module_namespace, "PrestaShop\\Module\\{module}\\");
        assert_eq!(config.templates.view_extension, "html.twig");
        assert_eq!(config.services.on_conflict, ServiceConflictPolicy::Overwrite);
        assert_eq!(config.translation.default_domain, "Admin.Translation.Domain");
        assert!(config.templates.override_dir.is_none());
    }

    #[test]
    fn test_defaults_round_trip_through_figment() {
        let figment = MakerConfig::defaults().unwrap();
        assert_eq!(MakerConfig::extract(&figment).unwrap(), MakerConfig::default());
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "[services]\non_conflict = \"keep\"\n\n[templates]\nview_extension = \"twig\"\noverride_dir = \"tpl\"\n",
        )
        .unwrap();

        let config = MakerConfig::load(temp.path(), None).unwrap();
        assert_eq!(config.services.on_conflict, ServiceConflictPolicy::Keep);
        assert_eq!(config.templates.view_extension, "twig");
        assert_eq!(config.project.root, temp.path());
        assert_eq!(config.override_dir(), Some(temp.path().join("tpl")));
        assert_eq!(config.translation.default_domain, DEFAULT_TRANSLATION_DOMAIN);
    }

    #[test]
    fn test_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let err = MakerConfig::load(temp.path(), Some(&temp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, MakerError::Config(_)));
    }

    #[test]
    fn test_invalid_value() {
        let figment = MakerConfig::defaults()
            .unwrap()
            .merge(Toml::string("[services]\non_conflict = \"merge\"\n"));
        assert!(matches!(MakerConfig::extract(&figment), Err(MakerError::Config(_))));
    }

    #[test]
    fn test_layout_uses_settings() {
        let mut config = MakerConfig::default();
        config.project.module_namespace = "Kaudaj\\Module\\{module}\\".to_string();
        config.services.module_file = PathBuf::from("config/admin/services.yml");

        let layout = config.layout(Destination::Module("kjgrid".to_string()));
        assert_eq!(layout.grid_namespace(), "Kaudaj\\Module\\Kjgrid\\Grid\\");
        assert_eq!(
            layout.services_file(),
            &PathBuf::from("modules/kjgrid/config/admin/services.yml")
        );

        let root = config.layout(Destination::Root);
        assert_eq!(
            root.services_file(),
            &PathBuf::from(DEFAULT_ROOT_SERVICES_FILE)
        );
    }
}
