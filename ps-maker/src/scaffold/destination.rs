//! Where generated code lands: the core project or a module
//!
//! The destination decides PHP namespaces, the DI service prefix, the
//! PSR-4 mapping from classes to files and the view and services file paths.

use super::naming::{validate_identifier, IdentifierSet};
use crate::error::Result;
use convert_case::{Case, Casing};
use std::path::PathBuf;

/// Service prefix used for the core project
pub const CORE_SERVICES_PREFIX: &str = "prestashop.core";

/// Default namespace pattern for modules, `{module}` is the `PascalCase` module name
pub const DEFAULT_MODULE_NAMESPACE: &str = "PrestaShop\\Module\\{module}\\";

/// Default services file for the core project
pub const DEFAULT_ROOT_SERVICES_FILE: &str =
    "src/PrestaShopBundle/Resources/config/services/core/grid.yml";

/// Default services file inside a module directory
pub const DEFAULT_MODULE_SERVICES_FILE: &str = "config/services.yml";

/// Default view file extension
pub const DEFAULT_VIEW_EXTENSION: &str = "html.twig";

const CORE_NAMESPACE: &str = "PrestaShop\\PrestaShop\\";
const BUNDLE_NAMESPACE: &str = "PrestaShopBundle\\";

/// Target of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The core project
    Root,
    /// A module, by technical name (e.g. `kjgrid`)
    Module(String),
}

impl Destination {
    /// Destination for an optional module name
    ///
    /// # Errors
    ///
    /// Returns an error if the module name is not a valid identifier.
    pub fn from_module(module: Option<&str>) -> Result<Self> {
        match module.map(str::trim) {
            None => Ok(Self::Root),
            Some(name) => {
                validate_identifier("Module name", name)?;
                Ok(Self::Module(name.to_string()))
            }
        }
    }

    /// Whether this is the core project
    #[must_use]
    pub const fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

/// Project layout for one destination
#[derive(Debug, Clone)]
pub struct Layout {
    destination: Destination,
    namespace_root: String,
    view_extension: String,
    services_file: PathBuf,
}

impl Layout {
    /// Layout with default conventions
    #[must_use]
    pub fn new(destination: Destination) -> Self {
        let mut layout = Self {
            destination,
            namespace_root: CORE_NAMESPACE.to_string(),
            view_extension: DEFAULT_VIEW_EXTENSION.to_string(),
            services_file: PathBuf::new(),
        };
        layout = layout.with_module_namespace(DEFAULT_MODULE_NAMESPACE);
        let services_file = match &layout.destination {
            Destination::Root => PathBuf::from(DEFAULT_ROOT_SERVICES_FILE),
            Destination::Module(_) => layout.base_dir().join(DEFAULT_MODULE_SERVICES_FILE),
        };
        layout.services_file = services_file;
        layout
    }

    /// Override the module namespace pattern (ignored for the core project)
    #[must_use]
    pub fn with_module_namespace(mut self, pattern: &str) -> Self {
        if let Destination::Module(name) = &self.destination {
            let mut namespace = pattern.replace("{module}", &name.to_case(Case::Pascal));
            if !namespace.ends_with('\\') {
                namespace.push('\\');
            }
            self.namespace_root = namespace.trim_start_matches('\\').to_string();
        }
        self
    }

    /// Override the view file extension
    #[must_use]
    pub fn with_view_extension(mut self, extension: &str) -> Self {
        self.view_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Override the services file, relative to the project root
    #[must_use]
    pub fn with_services_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.services_file = path.into();
        self
    }

    /// Destination this layout describes
    #[must_use]
    pub const fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Prefix of every generated service id
    #[must_use]
    pub fn services_prefix(&self) -> String {
        match &self.destination {
            Destination::Root => CORE_SERVICES_PREFIX.to_string(),
            Destination::Module(name) => name.to_lowercase(),
        }
    }

    /// Namespace holding the grid classes
    #[must_use]
    pub fn grid_namespace(&self) -> String {
        match self.destination {
            Destination::Root => format!("{CORE_NAMESPACE}Core\\Grid\\"),
            Destination::Module(_) => format!("{}Grid\\", self.namespace_root),
        }
    }

    /// Namespace holding the filters classes
    #[must_use]
    pub fn filters_namespace(&self) -> String {
        match self.destination {
            Destination::Root => format!("{CORE_NAMESPACE}Core\\Search\\Filters\\"),
            Destination::Module(_) => format!("{}Search\\Filters\\", self.namespace_root),
        }
    }

    /// Namespace holding admin controllers
    #[must_use]
    pub fn controller_namespace(&self) -> String {
        match self.destination {
            Destination::Root => format!("{BUNDLE_NAMESPACE}Controller\\Admin\\"),
            Destination::Module(_) => format!("{}Controller\\Admin\\", self.namespace_root),
        }
    }

    /// Directory of the destination relative to the project root
    #[must_use]
    pub fn base_dir(&self) -> PathBuf {
        match &self.destination {
            Destination::Root => PathBuf::new(),
            Destination::Module(name) => PathBuf::from("modules").join(name),
        }
    }

    /// PSR-4 prefixes, longest first
    #[must_use]
    pub fn autoload(&self) -> Vec<(String, PathBuf)> {
        match self.destination {
            Destination::Root => vec![
                (BUNDLE_NAMESPACE.to_string(), PathBuf::from("src/PrestaShopBundle")),
                (CORE_NAMESPACE.to_string(), PathBuf::from("src")),
            ],
            Destination::Module(_) => vec![(self.namespace_root.clone(), self.base_dir().join("src"))],
        }
    }

    /// File path of a class, relative to the project root
    ///
    /// Returns `None` when no autoload prefix matches.
    #[must_use]
    pub fn class_path(&self, class: &str) -> Option<PathBuf> {
        let class = class.trim_start_matches('\\');
        self.autoload().into_iter().find_map(|(prefix, dir)| {
            let relative = class.strip_prefix(prefix.as_str())?;
            let mut path = dir;
            for segment in relative.split('\\') {
                path.push(segment);
            }
            path.set_extension("php");
            Some(path)
        })
    }

    /// Path of the grid view for an entity
    #[must_use]
    pub fn view_path(&self, ids: &IdentifierSet) -> PathBuf {
        let base = match self.destination {
            Destination::Root => PathBuf::from("src/PrestaShopBundle/Resources"),
            Destination::Module(_) => self.base_dir(),
        };
        base.join("views")
            .join("Admin")
            .join(&ids.class_name)
            .join(format!("index.{}", self.view_extension))
    }

    /// Name the controller passes to the view renderer
    #[must_use]
    pub fn view_reference(&self, ids: &IdentifierSet) -> String {
        let class_name = &ids.class_name;
        let extension = &self.view_extension;
        match &self.destination {
            Destination::Root => format!("@PrestaShop/Admin/{class_name}/index.{extension}"),
            Destination::Module(name) => {
                format!("@Modules/{name}/views/Admin/{class_name}/index.{extension}")
            }
        }
    }

    /// Services file, relative to the project root
    #[must_use]
    pub const fn services_file(&self) -> &PathBuf {
        &self.services_file
    }

    /// Translation domain implied by the destination
    ///
    /// Modules use `Modules.<Name>.Admin`; the core project has no implied
    /// domain and asks the user instead.
    #[must_use]
    pub fn default_translation_domain(&self) -> Option<String> {
        match &self.destination {
            Destination::Root => None,
            Destination::Module(name) => {
                let lower = name.to_lowercase();
                let mut chars = lower.chars();
                let capitalized = chars
                    .next()
                    .map(|first| format!("{}{}", first.to_ascii_uppercase(), chars.as_str()))
                    .unwrap_or_default();
                Some(format!("Modules.{capitalized}.Admin"))
            }
        }
    }
}
