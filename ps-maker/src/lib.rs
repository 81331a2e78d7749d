//! ps-maker: grid scaffolding for PrestaShop back-office pages
//!
//! Given an entity name and its properties, ps-maker generates everything a
//! PrestaShop admin grid needs:
//! - **Grid definition factory**: columns, titles and translation domain
//! - **Filters**: search criteria bound to the grid
//! - **Query builder**: SQL select over the entity table
//! - **Data factory and grid factory**: DI services wiring the above
//! - **Controller**: created, or an `indexAction` appended to an existing one
//! - **Index view**: the Twig template rendering the grid
//!
//! Generated classes land in the core project or in a module. Every file and
//! every service record of a run is planned first and committed once, so a
//! failed run leaves the project untouched.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ps_maker::config::MakerConfig;
//! use ps_maker::scaffold::destination::Destination;
//! use ps_maker::scaffold::property::PropertyDescriptor;
//! use ps_maker::scaffold::{GridGenerator, GridRequest};
//! use ps_maker::templates::TemplateRegistry;
//! use ps_maker::workspace::{ProjectWorkspace, YamlServiceStore};
//! use std::path::Path;
//!
//! # fn main() -> ps_maker::Result<()> {
//! let root = Path::new("/var/www/prestashop");
//! let config = MakerConfig::load(root, None)?;
//! let layout = config.layout(Destination::from_module(Some("kjgrid"))?);
//!
//! let templates = TemplateRegistry::new()?;
//! let generator = GridGenerator::new(layout.clone(), &templates);
//! let request = GridRequest::new("OrderDetail")
//!     .with_properties(PropertyDescriptor::parse_all(&["product_name", "product_quantity"])?);
//!
//! let mut sources = ProjectWorkspace::new(root, layout.clone());
//! let mut services =
//!     YamlServiceStore::load(root.join(layout.services_file()), config.services.on_conflict)?;
//! let report = generator.run(&request, &mut sources, &mut services)?;
//! println!("{} files written", report.files.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::cognitive_complexity)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod error;
pub mod observability;
pub mod scaffold;
pub mod templates;
pub mod testing;
pub mod workspace;

pub use error::{MakerError, Result};
