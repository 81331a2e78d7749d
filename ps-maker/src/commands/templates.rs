//! Template export and listing

use anyhow::{Context, Result};
use clap::Subcommand;
use console::{style, Emoji};
use ps_maker::templates::{export_templates, EMBEDDED_TEMPLATES, TEMPLATE_EXTENSION};
use std::path::{Path, PathBuf};

static SUCCESS: Emoji = Emoji("✓", "+");

/// Template commands
#[derive(Debug, Subcommand)]
pub enum TemplatesCommand {
    /// Write the embedded templates to a directory for customization
    ///
    /// Point `templates.override_dir` at the directory to use them.
    Export {
        /// Output directory
        dir: PathBuf,

        /// Overwrite templates that were already exported
        #[arg(long)]
        force: bool,
    },
    /// List the template ids
    List,
}

impl TemplatesCommand {
    /// Execute the templates command
    ///
    /// # Errors
    ///
    /// Returns an error if the templates cannot be written.
    pub fn execute(&self) -> Result<()> {
        match self {
            Self::Export { dir, force } => Self::export(dir, *force),
            Self::List => {
                Self::list();
                Ok(())
            }
        }
    }

    fn export(dir: &Path, force: bool) -> Result<()> {
        let written = export_templates(dir, force)
            .with_context(|| format!("Failed to export templates to {}", dir.display()))?;

        for path in &written {
            println!("  {} {}", style(SUCCESS).green(), style(path.display()).dim());
        }

        let skipped = EMBEDDED_TEMPLATES.len() - written.len();
        if skipped > 0 {
            println!(
                "  {} already present (use {} to overwrite)",
                style(skipped).yellow(),
                style("--force").yellow()
            );
        }

        println!(
            "\n{} Set {} to {} to use them.",
            style("Done.").green().bold(),
            style("templates.override_dir").cyan(),
            style(dir.display()).cyan()
        );
        Ok(())
    }

    fn list() {
        println!("{}", style("Templates:").cyan().bold());
        for (name, _) in EMBEDDED_TEMPLATES {
            println!("  {name}.{TEMPLATE_EXTENSION}");
        }
    }
}
