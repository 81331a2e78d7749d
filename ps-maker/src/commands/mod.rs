//! CLI command implementations

pub mod grid;
pub mod templates;

pub use grid::GridCommand;
pub use templates::TemplatesCommand;
