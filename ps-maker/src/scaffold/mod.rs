//! Grid scaffolding pipeline
//!
//! - [`naming`]: identifiers derived from the entity name
//! - [`services`]: DI service ids and descriptors
//! - [`artifacts`]: one generator per generated file or service
//! - [`controller`]: creation or augmentation of the admin controller
//! - [`generator`]: orchestration and the single commit
//!
//! # Example
//!
//! ```rust
//! use ps_maker::scaffold::destination::{Destination, Layout};
//! use ps_maker::scaffold::generator::{GridGenerator, GridRequest};
//! use ps_maker::scaffold::property::PropertyDescriptor;
//! use ps_maker::templates::TemplateRegistry;
//! use ps_maker::testing::{InMemoryServiceStore, InMemoryWorkspace};
//!
//! let templates = TemplateRegistry::new().unwrap();
//! let layout = Layout::new(Destination::Root);
//! let generator = GridGenerator::new(layout.clone(), &templates);
//!
//! let request = GridRequest::new("Customer")
//!     .with_properties(PropertyDescriptor::parse_all(&["firstname", "lastname"]).unwrap());
//!
//! let mut sources = InMemoryWorkspace::new(layout);
//! let mut services = InMemoryServiceStore::new();
//! let report = generator.run(&request, &mut sources, &mut services).unwrap();
//! assert_eq!(report.files.len(), 5);
//! ```

pub mod artifacts;
pub mod controller;
pub mod destination;
pub mod generator;
pub mod naming;
pub mod plan;
pub mod property;
pub mod services;
pub mod source;

pub use generator::{GridGenerator, GridRequest};
pub use plan::{CommitReport, GenerationPlan, ReportStatus};
