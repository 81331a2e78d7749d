//! Identifier derivation for grid scaffolding
//!
//! Every name the generators need (class names, snake case forms, the grid
//! id, the human title, the SQL table alias) is derived here from a single
//! entity name. All functions are pure: deriving twice from the same entity
//! yields the same [`IdentifierSet`], which is what makes re-runs idempotent.

use crate::error::{MakerError, Result};
use inflector::Inflector;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Irregular singular/plural pairs, checked before the general inflection rules
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("address", "addresses"),
    ("alias", "aliases"),
    ("analysis", "analyses"),
    ("axis", "axes"),
    ("category", "categories"),
    ("child", "children"),
    ("country", "countries"),
    ("criterion", "criteria"),
    ("currency", "currencies"),
    ("datum", "data"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("half", "halves"),
    ("index", "indexes"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("man", "men"),
    ("medium", "media"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("quiz", "quizzes"),
    ("status", "statuses"),
    ("tax", "taxes"),
    ("tooth", "teeth"),
    ("wife", "wives"),
    ("woman", "women"),
];

/// Words with no distinct plural form
const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "feedback",
    "information",
    "metadata",
    "news",
    "series",
    "species",
    "stock",
];

/// Validate a user supplied identifier token
///
/// `what` names the token in the error message ("entity name", "property name").
///
/// # Errors
///
/// Returns [`MakerError::InvalidIdentifier`] if the token is empty, does not
/// start with an ASCII letter, or contains anything but ASCII alphanumerics
/// and underscores.
pub fn validate_identifier(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(MakerError::InvalidIdentifier(format!("{what} cannot be empty")));
    }

    let starts_with_letter = value.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(MakerError::InvalidIdentifier(format!(
            "{what} '{value}' must start with a letter and contain only letters, digits and underscores"
        )));
    }

    Ok(())
}

/// Validated entity name (e.g. `Customer`, `OrderDetail`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityName(String);

impl EntityName {
    /// Parse and validate an entity name
    ///
    /// # Errors
    ///
    /// Returns [`MakerError::InvalidIdentifier`] for empty or non-identifier input.
    pub fn parse(input: &str) -> Result<Self> {
        let name = input.trim();
        validate_identifier("Entity name", name)?;
        Ok(Self(name.to_string()))
    }

    /// Name as supplied by the user
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Class name form (`PascalCase`)
    ///
    /// Names that already start with an uppercase letter and contain no
    /// underscores are kept verbatim so acronyms survive (`CMSPage`).
    #[must_use]
    pub fn class_name(&self) -> String {
        let starts_upper = self.0.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        if starts_upper && !self.0.contains('_') {
            self.0.clone()
        } else {
            self.0.to_pascal_case()
        }
    }
}

impl FromStr for EntityName {
    type Err = MakerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Naming variants derived from one entity name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierSet {
    /// Entity class name (`OrderDetail`)
    pub class_name: String,
    /// `order_detail`
    pub snake_case: String,
    /// Upper camel case form used for class names (`OrderDetail`)
    pub camel_case: String,
    /// `OrderDetails`
    pub plural_camel_case: String,
    /// `order_details`, also used as the grid id
    pub plural_snake_case: String,
    /// `Order details`
    pub human_title: String,
    /// `od`
    pub table_alias: String,
}

impl IdentifierSet {
    /// Derive every naming variant from an entity name
    #[must_use]
    pub fn derive(entity: &EntityName) -> Self {
        let class_name = entity.class_name();
        let camel_case = class_name.clone();
        let plural_camel_case = pluralize(&camel_case);
        let plural_snake_case = snake_case(&plural_camel_case);
        let snake_case = snake_case(&class_name);
        let human_title = sentence(&plural_snake_case);
        let table_alias = table_alias(&plural_snake_case);

        Self {
            class_name,
            snake_case,
            camel_case,
            plural_camel_case,
            plural_snake_case,
            human_title,
            table_alias,
        }
    }

    /// Primary key column of the entity table (`id_customer`)
    #[must_use]
    pub fn primary_key(&self) -> String {
        format!("id_{}", self.snake_case)
    }

    /// Check that no derived field is empty
    ///
    /// # Errors
    ///
    /// Returns [`MakerError::InvalidIdentifier`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("class_name", &self.class_name),
            ("snake_case", &self.snake_case),
            ("camel_case", &self.camel_case),
            ("plural_camel_case", &self.plural_camel_case),
            ("plural_snake_case", &self.plural_snake_case),
            ("human_title", &self.human_title),
            ("table_alias", &self.table_alias),
        ];

        match fields.iter().find(|(_, value)| value.is_empty()) {
            Some((name, _)) => Err(MakerError::InvalidIdentifier(format!(
                "derived identifier '{name}' is empty"
            ))),
            None => Ok(()),
        }
    }
}

/// Pluralize the last word of a camel or snake cased identifier
///
/// # Examples
///
/// ```
/// # use ps_maker::scaffold::naming::pluralize;
/// assert_eq!(pluralize("Category"), "Categories");
/// assert_eq!(pluralize("OrderDetail"), "OrderDetails");
/// assert_eq!(pluralize("SalesPerson"), "SalesPeople");
/// ```
#[must_use]
pub fn pluralize(word: &str) -> String {
    let (head, last) = word.split_at(last_word_start(word));
    if last.is_empty() {
        return word.to_string();
    }

    let plural = plural_of(&last.to_lowercase());
    format!("{head}{}", match_case(last, &plural))
}

/// Snake case that only splits at letter case boundaries
///
/// Digits stay attached to the word before them, so `Order2Detail` becomes
/// `order2_detail` and acronyms stay whole (`CMSPage` to `cms_page`).
///
/// ```
/// # use ps_maker::scaffold::naming::snake_case;
/// assert_eq!(snake_case("OrderDetail"), "order_detail");
/// assert_eq!(snake_case("Order2Detail"), "order2_detail");
/// assert_eq!(snake_case("CMSPage"), "cms_page");
/// ```
#[must_use]
pub fn snake_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    for (i, ch) in word.char_indices() {
        if is_word_boundary(word, i) && !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Snake words joined by spaces, first letter capitalized (`order_details` to `Order details`)
fn sentence(snake: &str) -> String {
    let words = snake.split('_').filter(|word| !word.is_empty()).collect::<Vec<_>>().join(" ");
    let mut chars = words.chars();
    chars
        .next()
        .map(|first| format!("{}{}", first.to_ascii_uppercase(), chars.as_str()))
        .unwrap_or_default()
}

/// Human readable words for a property or identifier (`firstName` to `First Name`)
#[must_use]
pub fn human_words(input: &str) -> String {
    input.to_title_case()
}

/// First letter of every underscore separated segment (`order_details` to `od`)
#[must_use]
pub fn table_alias(plural_snake: &str) -> String {
    plural_snake
        .split('_')
        .filter_map(|segment| segment.chars().next())
        .collect()
}

fn plural_of(lower: &str) -> String {
    if UNCOUNTABLE.contains(&lower) {
        return lower.to_string();
    }

    IRREGULAR_PLURALS
        .iter()
        .find(|(singular, _)| *singular == lower)
        .map_or_else(|| lower.to_plural(), |(_, plural)| (*plural).to_string())
}

fn match_case(original: &str, plural: &str) -> String {
    let all_upper = original.len() > 1 && original.chars().all(|c| !c.is_ascii_lowercase());
    if all_upper {
        return plural.to_uppercase();
    }

    let mut chars = plural.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(p)) if first.is_ascii_uppercase() => {
            format!("{}{}", p.to_ascii_uppercase(), chars.as_str())
        }
        _ => plural.to_string(),
    }
}

/// Byte offset where the trailing word of an identifier starts
fn last_word_start(word: &str) -> usize {
    let mut start = 0;
    for (i, ch) in word.char_indices() {
        if ch == '_' {
            start = i + 1;
        } else if is_word_boundary(word, i) {
            start = i;
        }
    }
    start
}

/// Whether an uppercase letter at `i` starts a new word
fn is_word_boundary(word: &str, i: usize) -> bool {
    let bytes = word.as_bytes();
    if i == 0 || !bytes[i].is_ascii_uppercase() {
        return false;
    }

    let prev = bytes[i - 1];
    let next_is_lower = bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase);
    prev.is_ascii_lowercase() || prev.is_ascii_digit() || (prev.is_ascii_uppercase() && next_is_lower)
}
