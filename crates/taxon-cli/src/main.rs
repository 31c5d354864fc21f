use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::Level;

use taxon_core::{
    new_exclusive, new_inclusive, AssignmentDefinition, ClassificationPolicy, Classifier,
    Result, TaxonomicItem, Taxonomy, TaxonomyDefinition,
};

mod args;
use args::{Cli, Commands, Mode};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Tree { file } => handle_tree(&file),
        Commands::Children { file, item } => handle_children(&file, item.as_deref()),
        Commands::Descendants { file, item } => handle_descendants(&file, item.as_deref()),
        Commands::Classify { file, mode, json } => handle_classify(&file, mode, json),
        Commands::Export { file } => handle_export(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Read a definition file and build its taxonomy
fn load_taxonomy(path: &Path) -> Result<(String, Taxonomy)> {
    let content = fs::read_to_string(path)?;
    let report = TaxonomyDefinition::from_toml_str(&content)?.build();
    for warning in &report.warnings {
        eprintln!("{} {}", "[WARN]".yellow().bold(), warning);
    }
    Ok((content, report.taxonomy))
}

/// Resolve an optional item name; `Err` carries the missing name
fn resolve_item<'a>(
    taxonomy: &'a Taxonomy,
    name: Option<&str>,
) -> std::result::Result<Option<&'a TaxonomicItem>, String> {
    match name {
        None => Ok(None),
        Some(name) => taxonomy
            .items()
            .iter()
            .find(|i| i.name() == name)
            .map(Some)
            .ok_or_else(|| name.to_string()),
    }
}

fn handle_tree(path: &Path) -> Result<()> {
    let (_, taxonomy) = load_taxonomy(path)?;
    for line in render_tree(&taxonomy) {
        println!("{}", line);
    }
    Ok(())
}

fn render_tree(taxonomy: &Taxonomy) -> Vec<String> {
    // Each subsequent-tier parent resolves to its first position, which always
    // precedes the child, so the table describes a forest over positions.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); taxonomy.len()];
    for (bind, &child) in taxonomy
        .subsequent_tier_binds()
        .iter()
        .zip(taxonomy.subsequent_tiers())
    {
        if let Some(parent) = taxonomy.index_of(&bind.parent) {
            children[parent].push(child);
        }
    }

    let mut lines = vec![taxonomy.name().bold().to_string()];
    let mut stack: Vec<(usize, usize)> = taxonomy
        .first_tier()
        .iter()
        .rev()
        .map(|&position| (position, 1))
        .collect();

    while let Some((position, depth)) = stack.pop() {
        lines.push(format!(
            "{}{}",
            "  ".repeat(depth),
            taxonomy.items()[position].name()
        ));
        stack.extend(
            children[position]
                .iter()
                .rev()
                .map(|&child| (child, depth + 1)),
        );
    }
    lines
}

fn handle_children(path: &Path, item: Option<&str>) -> Result<()> {
    let (_, taxonomy) = load_taxonomy(path)?;
    match resolve_item(&taxonomy, item) {
        Ok(target) => print_items(&taxonomy.children(target)),
        Err(name) => eprintln!("{} Item not found: {}", "[WARN]".yellow().bold(), name),
    }
    Ok(())
}

fn handle_descendants(path: &Path, item: Option<&str>) -> Result<()> {
    let (_, taxonomy) = load_taxonomy(path)?;
    match resolve_item(&taxonomy, item) {
        Ok(target) => print_items(&taxonomy.descendants(target)),
        Err(name) => eprintln!("{} Item not found: {}", "[WARN]".yellow().bold(), name),
    }
    Ok(())
}

fn print_items(items: &[&TaxonomicItem]) {
    if items.is_empty() {
        println!("{}", "(none)".dimmed());
    }
    for item in items {
        println!("{}", item.name());
    }
}

fn handle_classify(path: &Path, mode: Mode, json: bool) -> Result<()> {
    let (content, taxonomy) = load_taxonomy(path)?;
    let assignments = AssignmentDefinition::from_toml_str(&content)?;

    match mode {
        Mode::Exclusive => report_classifier(&assignments, new_exclusive(taxonomy), json),
        Mode::Inclusive => report_classifier(&assignments, new_inclusive(taxonomy), json),
    }
}

fn report_classifier<P: ClassificationPolicy>(
    assignments: &AssignmentDefinition,
    classifier: Classifier<String, P>,
    json: bool,
) -> Result<()>
where
    P::Record: serde::Serialize,
{
    let report = assignments.apply(classifier);
    for warning in &report.warnings {
        eprintln!("{} {}", "[WARN]".yellow().bold(), warning);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report.classifier)?);
        return Ok(());
    }

    println!(
        "{} ({} mode)",
        report.classifier.taxonomy().name().bold(),
        report.classifier.mode()
    );
    for instance in report.classifier.classified_instances() {
        let items: Vec<&str> = report
            .classifier
            .classified_items(instance)
            .iter()
            .map(|i| i.name())
            .collect();
        println!("  {} -> {}", instance.cyan(), items.join(", "));
    }
    Ok(())
}

fn handle_export(path: &Path) -> Result<()> {
    let (_, taxonomy) = load_taxonomy(path)?;
    println!("{}", serde_json::to_string_pretty(&taxonomy)?);
    Ok(())
}
