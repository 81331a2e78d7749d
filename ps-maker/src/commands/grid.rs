//! Grid scaffold command
//!
//! # Example
//!
//! ```bash
//! ps-maker grid Customer firstname lastname email --translation-domain Admin.Customers.Feature
//! ps-maker grid OrderDetail product_name product_quantity:int --module kjgrid
//! ps-maker grid Customer firstname --dry-run
//! ```

use anyhow::{Context, Result};
use clap::Args;
use console::{style, Emoji};
use dialoguer::Input;
use ps_maker::config::MakerConfig;
use ps_maker::scaffold::destination::{Destination, Layout};
use ps_maker::scaffold::plan::{ControllerChange, ReportEntry};
use ps_maker::scaffold::property::PropertyDescriptor;
use ps_maker::scaffold::{CommitReport, GenerationPlan, GridGenerator, GridRequest, ReportStatus};
use ps_maker::templates::TemplateRegistry;
use ps_maker::workspace::{ProjectWorkspace, YamlServiceStore};
use similar::TextDiff;
use std::path::{Path, PathBuf};

static SUCCESS: Emoji = Emoji("✓", "+");
static WARNING: Emoji = Emoji("⚠", "!");

/// Generate a grid for an entity
#[derive(Debug, Args)]
pub struct GridCommand {
    /// Entity name (e.g. `Customer`, `OrderDetail`)
    pub entity: String,

    /// Grid columns in order, as `name[:type]`
    #[arg(value_name = "FIELD[:TYPE]")]
    pub fields: Vec<String>,

    /// Generate into this module instead of the core project
    #[arg(short, long)]
    pub module: Option<String>,

    /// Translation domain for the grid and column titles
    #[arg(short, long)]
    pub translation_domain: Option<String>,

    /// PrestaShop root directory (default: current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Never prompt; use configured defaults instead
    #[arg(short = 'n', long)]
    pub no_interaction: bool,

    /// Show what would be generated without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl GridCommand {
    /// Execute the grid command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The entity, module or a field name is not a valid identifier
    /// - Configuration or templates cannot be loaded
    /// - A template is missing
    /// - Files or the services file cannot be written
    pub fn execute(&self, config_file: Option<&Path>) -> Result<()> {
        let project_root = match &self.project_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };

        let config = MakerConfig::load(&project_root, config_file)
            .context("Failed to load configuration")?;
        let destination = Destination::from_module(self.module.as_deref())?;
        let layout = config.layout(destination);
        let properties = PropertyDescriptor::parse_all(&self.fields)
            .context("Failed to parse field definitions")?;
        let translation_domain = self.translation_domain(&config, &layout)?;

        println!(
            "\n{} {} {}",
            style("Generating grid for").cyan().bold(),
            style(&self.entity).green().bold(),
            style("...").cyan().bold()
        );

        let templates = match config.override_dir() {
            Some(dir) => TemplateRegistry::with_overrides(&dir)
                .with_context(|| format!("Failed to load templates from {}", dir.display()))?,
            None => TemplateRegistry::new().context("Failed to load templates")?,
        };

        let generator = GridGenerator::new(layout.clone(), &templates);
        let request = GridRequest::new(&self.entity)
            .with_properties(properties)
            .with_translation_domain(translation_domain);
        let mut sources = ProjectWorkspace::new(&config.project.root, layout.clone());

        if self.dry_run {
            let plan = generator
                .plan(&request, &sources)
                .context("Failed to plan grid scaffold")?;
            print_plan(&plan);
            return Ok(());
        }

        let services_path = config.project.root.join(layout.services_file());
        let mut services = YamlServiceStore::load(&services_path, config.services.on_conflict)
            .with_context(|| format!("Failed to load {}", services_path.display()))?;

        let report = generator
            .run(&request, &mut sources, &mut services)
            .context("Failed to generate grid scaffold")?;
        print_report(&report, &services_path);

        Ok(())
    }

    fn translation_domain(&self, config: &MakerConfig, layout: &Layout) -> Result<String> {
        if let Some(domain) = &self.translation_domain {
            return Ok(domain.clone());
        }
        if let Some(domain) = layout.default_translation_domain() {
            return Ok(domain);
        }
        if self.no_interaction {
            return Ok(config.translation.default_domain.clone());
        }

        Input::new()
            .with_prompt("Translation domain")
            .default(config.translation.default_domain.clone())
            .interact_text()
            .context("Failed to read translation domain")
    }
}

fn status_label(status: ReportStatus) -> String {
    let label = format!("{status:>10}");
    match status {
        ReportStatus::Generated | ReportStatus::Created => style(label).green().to_string(),
        ReportStatus::Augmented | ReportStatus::Registered => style(label).cyan().to_string(),
        ReportStatus::Unchanged => style(label).dim().to_string(),
        ReportStatus::Skipped => style(label).yellow().to_string(),
    }
}

fn print_entries(entries: &[ReportEntry]) {
    for entry in entries {
        println!(
            "  {} {} ({})",
            status_label(entry.status),
            entry.target,
            style(&entry.description).dim()
        );
    }
}

fn print_plan(plan: &GenerationPlan) {
    println!("\n{}", style("Dry run, nothing written:").yellow().bold());
    print_entries(plan.report());

    if let Some(change) = plan.controller() {
        println!();
        print!("{}", colored_diff(change));
    }
}

fn print_report(report: &CommitReport, services_path: &Path) {
    println!(
        "\n{} {} files, {} services:",
        style("Generated").green().bold(),
        report.files.len(),
        report.services.len()
    );
    print_entries(&report.entries);

    for (id, outcome) in &report.services {
        println!("  {:>10} {id}", style(outcome).dim());
    }
    println!("  {}", style(services_path.display()).dim());

    for warning in &report.warnings {
        println!("\n{} {}", style(WARNING).yellow(), style(warning).yellow());
    }

    println!(
        "\n{} Grid scaffold is ready!",
        style(SUCCESS).green().bold()
    );
}

/// Unified diff of a controller change, `/dev/null` as the old side of a new file
#[must_use]
fn unified_diff(change: &ControllerChange) -> String {
    let original = change.original.as_deref().unwrap_or_default();
    let path = change.path.display().to_string();
    let old_header = if change.original.is_some() {
        format!("a/{path}")
    } else {
        "/dev/null".to_string()
    };

    TextDiff::from_lines(original, change.content.as_str())
        .unified_diff()
        .context_radius(3)
        .header(&old_header, &format!("b/{path}"))
        .to_string()
}

fn colored_diff(change: &ControllerChange) -> String {
    let mut out = String::new();
    for line in unified_diff(change).lines() {
        let text = if line.starts_with("+++") || line.starts_with("---") {
            style(line).bold().to_string()
        } else if line.starts_with("@@") {
            style(line).cyan().to_string()
        } else if line.starts_with('+') {
            style(line).green().to_string()
        } else if line.starts_with('-') {
            style(line).red().to_string()
        } else {
            style(line).dim().to_string()
        };
        out.push_str(&text);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_diff_of_augmentation() {
        let change = ControllerChange {
            path: PathBuf::from("src/A.php"),
            original: Some("<?php\nclass A\n{\n}\n".to_string()),
            content: "<?php\nclass A\n{\n    public function indexAction() {}\n}\n".to_string(),
        };

        let diff = unified_diff(&change);
        assert!(diff.contains("--- a/src/A.php"));
        assert!(diff.contains("+++ b/src/A.php"));
        assert!(diff.contains("+    public function indexAction() {}"));
        assert!(!diff.lines().any(|line| line.starts_with('-') && !line.starts_with("---")));
    }

    #[test]
    fn test_unified_diff_of_new_file() {
        let change = ControllerChange {
            path: PathBuf::from("src/A.php"),
            original: None,
            content: "<?php\n".to_string(),
        };

        let diff = unified_diff(&change);
        assert!(diff.contains("--- /dev/null"));
        assert!(diff.contains("+<?php"));
    }

    #[test]
    fn test_cli_domain_wins() {
        let command = GridCommand {
            entity: "Customer".to_string(),
            fields: Vec::new(),
            module: Some("kjgrid".to_string()),
            translation_domain: Some("Admin.Custom".to_string()),
            project_root: None,
            no_interaction: true,
            dry_run: true,
        };
        let config = MakerConfig::default();
        let layout = config.layout(Destination::Module("kjgrid".to_string()));
        assert_eq!(command.translation_domain(&config, &layout).unwrap(), "Admin.Custom");
    }

    #[test]
    fn test_no_interaction_uses_configured_domain() {
        let command = GridCommand {
            entity: "Customer".to_string(),
            fields: Vec::new(),
            module: None,
            translation_domain: None,
            project_root: None,
            no_interaction: true,
            dry_run: false,
        };
        let mut config = MakerConfig::default();
        config.translation.default_domain = "Admin.Orders.Feature".to_string();
        let layout = config.layout(Destination::Root);
        assert_eq!(
            command.translation_domain(&config, &layout).unwrap(),
            "Admin.Orders.Feature"
        );
    }
}
