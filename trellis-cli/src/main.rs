//! Trellis CLI - domain model operations from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Validate a vocabulary and show stats
//! trellis validate vocab.json
//!
//! # Show a template's position in the hierarchy
//! trellis hierarchy vocab.json --template Process
//!
//! # List the relations a template's instances may issue
//! trellis applicable vocab.json --template AggregatedProcess
//!
//! # Build a scenario and export it
//! trellis export vocab.json --scenario scenario.json -o out.ttl --format turtle
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use trellis_core::{Scenario, ScenarioFile, TemplateId, Vocabulary};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Typed entity-relation domain models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a vocabulary and show statistics
    Validate {
        /// Vocabulary file (JSON)
        vocab: PathBuf,
    },

    /// Show a template's ancestors and descendants
    Hierarchy {
        /// Vocabulary file (JSON)
        vocab: PathBuf,

        /// Template name
        #[arg(long, short)]
        template: String,
    },

    /// List relations applicable to a template's instances
    Applicable {
        /// Vocabulary file (JSON)
        vocab: PathBuf,

        /// Template name
        #[arg(long, short)]
        template: String,
    },

    /// Build a scenario and export it as a triple document
    Export {
        /// Vocabulary file (JSON)
        vocab: PathBuf,

        /// Scenario instance file (JSON)
        #[arg(long, short)]
        scenario: Option<PathBuf>,

        /// Output file; stdout if omitted
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, short, default_value = "turtle")]
        format: OutputFormat,

        /// Skip the advisory domain/range check on declared edges
        #[arg(long)]
        unchecked: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Turtle (human-readable)
    Turtle,
    /// N-Triples (line-based)
    Ntriples,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { vocab } => cmd_validate(&vocab),
        Commands::Hierarchy { vocab, template } => cmd_hierarchy(&vocab, &template),
        Commands::Applicable { vocab, template } => cmd_applicable(&vocab, &template),
        Commands::Export {
            vocab,
            scenario,
            output,
            format,
            unchecked,
        } => cmd_export(&vocab, scenario.as_deref(), output.as_deref(), format, unchecked),
    }
}

fn load_vocabulary(path: &PathBuf) -> Result<Vocabulary> {
    Vocabulary::from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn template_id(name: &str) -> TemplateId {
    let local = name.split_once(':').map_or(name, |(_, local)| local);
    TemplateId::new(trellis_core::vocabulary::sanitize_name(local))
}

fn cmd_validate(vocab_path: &PathBuf) -> Result<()> {
    let vocabulary = load_vocabulary(vocab_path)?;
    let scenario = Scenario::from_vocabulary(&vocabulary)
        .with_context(|| format!("Invalid vocabulary {}", vocab_path.display()))?;

    println!("Vocabulary");
    println!("==========");
    println!("Sub-models: {}", vocabulary.models.len());
    println!("Templates:  {}", scenario.templates.len());
    println!("Relations:  {}", scenario.relations.len());
    for model in &vocabulary.models {
        println!(
            "  {} <{}>: {} templates, {} relations",
            model.prefix,
            model.namespace,
            model.templates.len(),
            model.relations.len()
        );
    }

    Ok(())
}

fn cmd_hierarchy(vocab_path: &PathBuf, template: &str) -> Result<()> {
    let scenario = Scenario::from_vocabulary(&load_vocabulary(vocab_path)?)?;
    let id = template_id(template);

    let mut ancestors: Vec<_> = scenario
        .templates
        .ancestors(&id)?
        .into_iter()
        .map(|t| t.as_str().to_string())
        .collect();
    ancestors.sort();
    let mut descendants: Vec<_> = scenario
        .templates
        .descendants(&id)?
        .into_iter()
        .map(|t| t.as_str().to_string())
        .collect();
    descendants.sort();

    println!("Template: {}", id);
    println!("Ancestors ({}):", ancestors.len());
    for name in &ancestors {
        println!("  {}", name);
    }
    println!("Descendants ({}):", descendants.len());
    for name in &descendants {
        println!("  {}", name);
    }

    Ok(())
}

fn cmd_applicable(vocab_path: &PathBuf, template: &str) -> Result<()> {
    let scenario = Scenario::from_vocabulary(&load_vocabulary(vocab_path)?)?;
    let id = template_id(template);

    let mut relations: Vec<_> = scenario
        .applicable_relations(&id)?
        .into_iter()
        .map(|r| r.as_str().to_string())
        .collect();
    relations.sort();

    println!("Applicable relations for {} ({}):", id, relations.len());
    for name in &relations {
        println!("  {}", name);
    }

    Ok(())
}

fn cmd_export(
    vocab_path: &PathBuf,
    scenario_path: Option<&std::path::Path>,
    output: Option<&std::path::Path>,
    format: OutputFormat,
    unchecked: bool,
) -> Result<()> {
    let mut scenario = Scenario::from_vocabulary(&load_vocabulary(vocab_path)?)?;

    if let Some(path) = scenario_path {
        let file = ScenarioFile::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        scenario
            .apply(&file, !unchecked)
            .with_context(|| format!("Failed to apply {}", path.display()))?;
    }

    let content = match format {
        OutputFormat::Turtle => scenario.to_turtle()?,
        OutputFormat::Ntriples => scenario.to_ntriples()?,
    };

    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported {} triples -> {}", scenario.flatten().len(), path.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}
