//! Dependency-injection service descriptors
//!
//! Service ids are pure functions of the layout and the entity identifiers,
//! so generators can reference each other's services (the data factory
//! points at the query builder, the controller at the grid factory) before
//! anything is rendered or committed.

use super::artifacts::ArtifactKind;
use super::destination::Layout;
use super::naming::IdentifierSet;
use inflector::Inflector;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Parent of generated grid definition factories
pub const ABSTRACT_GRID_DEFINITION: &str =
    "prestashop.core.grid.definition.factory.abstract_grid_definition";
/// Parent of generated query builders
pub const ABSTRACT_QUERY_BUILDER: &str = "prestashop.core.grid.abstract_query_builder";
/// Hook dispatcher service
pub const HOOK_DISPATCHER: &str = "prestashop.core.hook.dispatcher";
/// Doctrine query parser service
pub const DOCTRINE_QUERY_PARSER: &str = "prestashop.core.grid.query.doctrine_query_parser";
/// Grid filter form factory service
pub const FILTER_FORM_FACTORY: &str = "prestashop.core.grid.filter.form_factory";
/// Data factory implementation
pub const DOCTRINE_GRID_DATA_FACTORY_CLASS: &str =
    "PrestaShop\\PrestaShop\\Core\\Grid\\Data\\Factory\\DoctrineGridDataFactory";
/// Grid factory implementation
pub const GRID_FACTORY_CLASS: &str = "PrestaShop\\PrestaShop\\Core\\Grid\\GridFactory";

const CONTEXT_LANGUAGE_ID: &str =
    "service(\"prestashop.adapter.legacy.context\").getContext().language.id";
const CONTEXT_SHOP_ID: &str =
    "service(\"prestashop.adapter.legacy.context\").getContext().shop.id";

/// One constructor argument of a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceArgument {
    /// Another service, by id (`@id`)
    Reference(String),
    /// Container expression (`@=expr`)
    Expression(String),
    /// Plain string value
    Literal(String),
}

impl ServiceArgument {
    /// Reference to another service
    #[must_use]
    pub fn reference(id: impl Into<String>) -> Self {
        Self::Reference(id.into())
    }

    /// Value as written in the services file
    #[must_use]
    pub fn to_config_value(&self) -> String {
        match self {
            Self::Reference(id) => format!("@{id}"),
            Self::Expression(expression) => format!("@={expression}"),
            Self::Literal(value) => value.clone(),
        }
    }

    /// Parse a value read back from a services file
    #[must_use]
    pub fn from_config_value(value: &str) -> Self {
        value.strip_prefix("@=").map_or_else(
            || {
                value
                    .strip_prefix('@')
                    .map_or_else(|| Self::Literal(value.to_string()), Self::reference)
            },
            |expression| Self::Expression(expression.to_string()),
        )
    }
}

impl Serialize for ServiceArgument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_config_value())
    }
}

/// A named DI record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Unique id within the container
    pub id: String,
    /// Implementation class
    pub class: String,
    /// Parent (template) service
    pub parent: Option<String>,
    /// Constructor arguments, in order
    pub arguments: Vec<ServiceArgument>,
    /// Whether the service can be fetched from the container directly
    pub public: bool,
}

/// Serializes the record body (without its id), as stored under `services:`
impl Serialize for ServiceDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("class", &self.class)?;
        if let Some(parent) = &self.parent {
            map.serialize_entry("parent", parent)?;
        }
        if self.public {
            map.serialize_entry("public", &true)?;
        }
        if !self.arguments.is_empty() {
            map.serialize_entry("arguments", &self.arguments)?;
        }
        map.end()
    }
}

/// Turn a namespace fragment into a service id segment (`Grid\Factory\` to `grid.factory`)
#[must_use]
pub fn namespace_segment(namespace: &str) -> String {
    namespace
        .split('\\')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_snake_case())
        .collect::<Vec<_>>()
        .join(".")
}

/// Deterministic service ids for one entity
#[derive(Debug, Clone)]
pub struct ServiceIds {
    prefix: String,
    entity: String,
}

impl ServiceIds {
    /// Ids for an entity in a layout
    #[must_use]
    pub fn new(layout: &Layout, ids: &IdentifierSet) -> Self {
        Self {
            prefix: layout.services_prefix(),
            entity: ids.snake_case.clone(),
        }
    }

    /// `<prefix>.grid.definition.factory.<entity>`
    #[must_use]
    pub fn definition_factory(&self) -> String {
        format!(
            "{}.{}.{}",
            self.prefix,
            namespace_segment("Grid\\Definition\\Factory\\"),
            self.entity
        )
    }

    /// `<prefix>.grid.query.<entity>_query_builder`
    #[must_use]
    pub fn query_builder(&self) -> String {
        format!("{}.grid.query.{}_query_builder", self.prefix, self.entity)
    }

    /// `<prefix>.grid.data.factory.<entity>_data_factory`
    #[must_use]
    pub fn data_factory(&self) -> String {
        format!("{}.grid.data.factory.{}_data_factory", self.prefix, self.entity)
    }

    /// `<prefix>.grid.factory.<entity>`
    #[must_use]
    pub fn grid_factory(&self) -> String {
        format!(
            "{}.{}.{}",
            self.prefix,
            namespace_segment("Grid\\Factory\\"),
            self.entity
        )
    }
}

/// Fully qualified class of a generated grid class
#[must_use]
pub fn grid_class(layout: &Layout, ids: &IdentifierSet, kind: ArtifactKind) -> Option<String> {
    let class_name = &ids.class_name;
    match kind {
        ArtifactKind::DefinitionFactory => Some(format!(
            "{}Definition\\Factory\\{class_name}GridDefinitionFactory",
            layout.grid_namespace()
        )),
        ArtifactKind::QueryBuilder => Some(format!(
            "{}Query\\{class_name}QueryBuilder",
            layout.grid_namespace()
        )),
        ArtifactKind::Filters => Some(format!("{}{class_name}Filters", layout.filters_namespace())),
        ArtifactKind::DataFactory | ArtifactKind::GridFactory | ArtifactKind::Template => None,
    }
}

/// Build the service record of an artifact kind
///
/// Filters and templates are not services and yield `None`.
#[must_use]
pub fn build_service(
    kind: ArtifactKind,
    ids: &IdentifierSet,
    layout: &Layout,
) -> Option<ServiceDescriptor> {
    let service_ids = ServiceIds::new(layout, ids);

    match kind {
        ArtifactKind::DefinitionFactory => Some(ServiceDescriptor {
            id: service_ids.definition_factory(),
            class: grid_class(layout, ids, kind)?,
            parent: Some(ABSTRACT_GRID_DEFINITION.to_string()),
            arguments: Vec::new(),
            public: true,
        }),
        ArtifactKind::QueryBuilder => Some(ServiceDescriptor {
            id: service_ids.query_builder(),
            class: grid_class(layout, ids, kind)?,
            parent: Some(ABSTRACT_QUERY_BUILDER.to_string()),
            arguments: vec![
                ServiceArgument::Expression(CONTEXT_LANGUAGE_ID.to_string()),
                ServiceArgument::Expression(CONTEXT_SHOP_ID.to_string()),
            ],
            public: true,
        }),
        ArtifactKind::DataFactory => Some(ServiceDescriptor {
            id: service_ids.data_factory(),
            class: DOCTRINE_GRID_DATA_FACTORY_CLASS.to_string(),
            parent: None,
            arguments: vec![
                ServiceArgument::reference(service_ids.query_builder()),
                ServiceArgument::reference(HOOK_DISPATCHER),
                ServiceArgument::reference(DOCTRINE_QUERY_PARSER),
                ServiceArgument::Literal(ids.plural_snake_case.clone()),
            ],
            public: false,
        }),
        ArtifactKind::GridFactory => Some(ServiceDescriptor {
            id: service_ids.grid_factory(),
            class: GRID_FACTORY_CLASS.to_string(),
            parent: None,
            arguments: vec![
                ServiceArgument::reference(service_ids.definition_factory()),
                ServiceArgument::reference(service_ids.data_factory()),
                ServiceArgument::reference(FILTER_FORM_FACTORY),
                ServiceArgument::reference(HOOK_DISPATCHER),
            ],
            public: true,
        }),
        ArtifactKind::Filters | ArtifactKind::Template => None,
    }
}
