//! Entity property descriptors
//!
//! Properties drive the grid columns and the query builder select list. They
//! are supplied on the command line as `name[:type]` tokens, in the order the
//! columns should appear.
//!
//! ```text
//! firstname            → firstname (string)
//! lastname:string      → lastname (string)
//! dateAdd:datetime     → date_add column, "Date Add" title
//! ```

use super::naming::{human_words, snake_case, validate_identifier};
use crate::error::{MakerError, Result};
use serde::Serialize;

/// Type assumed when a property token carries none
pub const DEFAULT_PROPERTY_TYPE: &str = "string";

/// One introspectable field of the entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    /// Property name as declared on the entity
    pub name: String,
    /// Declared type (informational, e.g. `string`, `int`, `datetime`)
    #[serde(rename = "type")]
    pub type_name: String,
}

impl PropertyDescriptor {
    /// Create a descriptor without validation
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Parse a `name[:type]` token
    ///
    /// # Examples
    ///
    /// ```
    /// # use ps_maker::scaffold::property::PropertyDescriptor;
    /// let property = PropertyDescriptor::parse("firstname:string").unwrap();
    /// assert_eq!(property.name, "firstname");
    ///
    /// let property = PropertyDescriptor::parse("active").unwrap();
    /// assert_eq!(property.type_name, "string");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`MakerError::InvalidIdentifier`] if the name is not a valid
    /// identifier, the type is empty, or the token has more than two parts.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.split(':').map(str::trim);
        let name = parts.next().unwrap_or_default();
        validate_identifier("Property name", name)?;

        let type_name = match parts.next() {
            None => DEFAULT_PROPERTY_TYPE.to_string(),
            Some("") => {
                return Err(MakerError::InvalidIdentifier(format!(
                    "Property '{name}' has an empty type. Expected format: name[:type]"
                )))
            }
            Some(type_name) => type_name.to_lowercase(),
        };

        if parts.next().is_some() {
            return Err(MakerError::InvalidIdentifier(format!(
                "Invalid property definition: '{input}'. Expected format: name[:type]"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            type_name,
        })
    }

    /// Parse a list of tokens, keeping their order
    ///
    /// # Errors
    ///
    /// Returns the first parse error encountered.
    pub fn parse_all<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<Self>> {
        inputs.iter().map(|input| Self::parse(input.as_ref())).collect()
    }

    /// Database column name (`snake_case`)
    #[must_use]
    pub fn field(&self) -> String {
        snake_case(&self.name)
    }

    /// Column title shown in the grid header
    #[must_use]
    pub fn title(&self) -> String {
        human_words(&self.name)
    }
}
