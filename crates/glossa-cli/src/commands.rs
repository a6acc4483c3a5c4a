//! CLI command implementations.

use crate::csv;
use crate::workspace::Workspace;
use colored::Colorize;
use glossa_core::{GlossaConfig, GlossaryId, GlossaryRecord, RelationType, TermRecord};
use glossa_export::{relations_cell, ImportRow, RelationImporter};
use glossa_graph::{EdgeStore, TermDirectory};
use glossa_server::{Engine, GlossaServer, ServerConfig};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Initialize Glossa in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_path = GlossaConfig::path_in(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    GlossaConfig::default().save(&config_path)?;

    println!("{} Initialized Glossa in {}", "✓".green(), path.display());
    println!("  Edit {} to customize relation types", config_path.display().to_string().cyan());

    Ok(())
}

pub async fn glossary_add(root: &Path, id: &str, name: &str, description: Option<String>) -> Result<()> {
    let ws = Workspace::open(root)?;

    let mut glossary = GlossaryRecord::new(id, name);
    if let Some(description) = description {
        glossary = glossary.with_description(description);
    }
    ws.store.put_glossary(&glossary)?;
    ws.flush().await?;

    println!("{} Added glossary {}", "✓".green(), glossary.label().cyan());
    Ok(())
}

pub struct TermSpec {
    pub id: String,
    pub name: String,
    pub glossary: String,
    pub parent: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub synonyms: Vec<String>,
}

pub async fn term_add(root: &Path, spec: TermSpec) -> Result<()> {
    let ws = Workspace::open(root)?;
    let glossary = ws.glossary(&spec.glossary).await?;

    let mut term = TermRecord::new(spec.id, &glossary, spec.name).with_synonyms(spec.synonyms);
    if let Some(parent) = spec.parent {
        let parent = ws.resolve_term(&parent).await?;
        if parent.glossary != glossary.id {
            return Err(format!("Parent {} belongs to another glossary", parent.fully_qualified_name).into());
        }
        term = term.with_parent(&parent);
    }
    if let Some(display_name) = spec.display_name {
        term = term.with_display_name(display_name);
    }
    if let Some(description) = spec.description {
        term = term.with_description(description);
    }

    ws.store.put_term(&term)?;
    ws.flush().await?;

    println!(
        "{} Added term {} {}",
        "✓".green(),
        term.fully_qualified_name.cyan(),
        format!("({})", term.id).dimmed()
    );
    Ok(())
}

/// Relate two terms.
pub async fn relate(root: &Path, from: &str, to: &str, relation_type: Option<&str>) -> Result<()> {
    let ws = Workspace::open(root)?;
    let from = ws.resolve_term(from).await?;
    let to = ws.resolve_term(to).await?;
    let relation_type = relation_type.unwrap_or(ws.registry.default_type().name.as_str()).to_string();

    let outcome = ws
        .relations()
        .add_relation(&from.id, &to.id, &relation_type)
        .await?;
    ws.flush().await?;

    if outcome.is_noop() {
        println!("{} Already related", "✓".green());
    } else {
        println!(
            "{} {} {} {}",
            "✓".green(),
            from.fully_qualified_name.cyan(),
            relation_type.yellow(),
            to.fully_qualified_name.cyan()
        );
        if outcome.edges.len() > 1 {
            let inverse = &outcome.edges[1];
            println!("  implied: {} {} {}", to.fully_qualified_name, inverse.relation_type, from.fully_qualified_name);
        }
    }
    Ok(())
}

/// Remove a relation between two terms.
pub async fn unrelate(root: &Path, from: &str, to: &str, relation_type: Option<&str>) -> Result<()> {
    let ws = Workspace::open(root)?;
    let from = ws.resolve_term(from).await?;
    let to = ws.resolve_term(to).await?;
    let relation_type = relation_type.unwrap_or(ws.registry.default_type().name.as_str()).to_string();

    let outcome = ws
        .relations()
        .remove_relation(&from.id, &to.id, &relation_type)
        .await?;
    ws.flush().await?;

    if outcome.is_noop() {
        println!("No {} relation between {} and {}", relation_type, from.fully_qualified_name, to.fully_qualified_name);
    } else {
        println!("{} Removed {} edge(s)", "✓".green(), outcome.changed);
    }
    Ok(())
}

/// List the related terms of a term.
pub async fn related(root: &Path, term: &str, json: bool) -> Result<()> {
    let ws = Workspace::open(root)?;
    let term = ws.resolve_term(term).await?;
    let relations = ws.relations().relations_of(&term.id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&relations)?);
        return Ok(());
    }

    if relations.is_empty() {
        println!("{} has no relations", term.fully_qualified_name);
        return Ok(());
    }

    println!("{}", term.fully_qualified_name.cyan().bold());
    for related in relations {
        println!(
            "  {} {}",
            format!("{:<16}", related.relation_type).yellow(),
            related.term.fully_qualified_name
        );
    }
    Ok(())
}

/// Print the neighborhood graph of a term.
pub async fn graph(root: &Path, term: &str, depth: usize, types: &[String], json: bool) -> Result<()> {
    let ws = Workspace::open(root)?;
    let term = ws.resolve_term(term).await?;
    let filter = if types.is_empty() { None } else { Some(types) };

    let graph = ws.traversal().build_graph(&term.id, depth, filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!(
        "{} nodes, {} edges within {} hop(s) of {} {}",
        graph.node_count().to_string().cyan(),
        graph.edge_count().to_string().cyan(),
        depth,
        term.fully_qualified_name.bold(),
        format!("({}ms)", graph.query_time_ms).dimmed()
    );

    for node in &graph.nodes {
        let marker = if node.isolated { " (isolated)".dimmed().to_string() } else { String::new() };
        println!("  {}{}{}", "  ".repeat(node.depth), node.fully_qualified_name, marker);
    }

    if !graph.edges.is_empty() {
        println!();
        for edge in &graph.edges {
            println!("  {} -[{}]-> {}", edge.from, edge.label.yellow(), edge.to);
        }
    }

    if graph.truncated {
        println!("{} Result truncated at {} nodes", "⚠".yellow(), ws.config.max_graph_nodes);
    }
    Ok(())
}

/// Relation type settings document accepted by `types --apply`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationSettings {
    #[serde(default)]
    default_relation_type: Option<String>,
    relation_types: Vec<RelationType>,
}

/// List relation types, or replace them from a settings file.
pub async fn types(root: &Path, apply: Option<&Path>) -> Result<()> {
    let ws = Workspace::open(root)?;

    if let Some(path) = apply {
        let settings: RelationSettings = serde_json::from_str(&fs::read_to_string(path)?)?;
        let default_type = settings
            .default_relation_type
            .unwrap_or_else(|| ws.registry.default_type().name.clone());
        let usage = ws.store.usage_counts().await?;

        let replaced = ws
            .registry
            .replace_checked(settings.relation_types, default_type, &usage)?;

        let mut config = ws.config.clone();
        config.relation_types = replaced.all().to_vec();
        config.default_relation_type = replaced.default_type().name.clone();
        config.save(&GlossaConfig::path_in(&ws.root))?;

        println!("{} Saved {} relation types", "✓".green(), replaced.len());
        return Ok(());
    }

    let default = &ws.registry.default_type().name;
    for ty in ws.registry.all() {
        let pairing = match (&ty.inverse, ty.is_symmetric) {
            (_, true) => "symmetric".to_string(),
            (Some(inverse), false) => format!("inverse {}", inverse),
            (None, false) => "one-way".to_string(),
        };
        let mark = if &ty.name == default { "*" } else { " " };
        println!(
            "{} {} {} {} {}",
            mark,
            format!("{:<16}", ty.name).cyan(),
            format!("{:<14}", ty.category.to_string()),
            format!("{:<22}", pairing).dimmed(),
            if ty.cross_domain_allowed { "" } else { "same glossary" }
        );
    }
    Ok(())
}

/// Print edge counts per relation type.
pub async fn usage(root: &Path) -> Result<()> {
    let ws = Workspace::open(root)?;
    let counts = ws.relations().usage_counts().await?;

    for (name, count) in &counts {
        let count = if *count == 0 { count.to_string().dimmed() } else { count.to_string().cyan() };
        println!("  {:<16} {}", name, count);
    }
    println!("  {:<16} {}", "total", counts.values().sum::<usize>());
    Ok(())
}

fn write_output(output: Option<&Path>, document: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, document)?;
            println!("{} Exported to {}", "✓".green(), path.display());
        }
        None => print!("{}", document),
    }
    Ok(())
}

/// Export a glossary as RDF.
pub async fn export_rdf(
    root: &Path,
    glossary: &str,
    format: &str,
    include_relations: bool,
    output: Option<&Path>,
) -> Result<()> {
    let ws = Workspace::open(root)?;
    let document = ws
        .exporter()
        .export_glossary(&GlossaryId::new(glossary), format, include_relations)
        .await?;
    write_output(output, &document)
}

/// Export a glossary's relations as a CSV sheet.
pub async fn export_csv(root: &Path, glossary: &str, output: Option<&Path>) -> Result<()> {
    let ws = Workspace::open(root)?;
    let glossary = ws.glossary(glossary).await?;
    let relations = ws.relations();

    let mut document = csv::format_record(&csv::HEADER);
    document.push('\n');
    for term in ws.store.terms_in_glossary(&glossary.id).await? {
        let cell = relations_cell(&relations, &term.id).await?;
        document.push_str(&csv::format_record(&[term.fully_qualified_name.as_str(), cell.as_str()]));
        document.push('\n');
    }

    write_output(output, &document)
}

/// Import relations from a CSV sheet.
pub async fn import(root: &Path, file: &Path) -> Result<()> {
    let ws = Workspace::open(root)?;
    let text = fs::read_to_string(file)?;

    let mut records = csv::parse(&text);
    if records.first().map(|r| csv::is_header(r)).unwrap_or(false) {
        records.remove(0);
    }

    let rows: Vec<ImportRow> = records
        .into_iter()
        .enumerate()
        .map(|(i, mut record)| {
            let cell = if record.len() > 1 { record.swap_remove(1) } else { String::new() };
            let fqn = record.into_iter().next().unwrap_or_default();
            ImportRow::new(i + 1, fqn.trim(), cell)
        })
        .collect();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Importing {} rows...", rows.len()));

    let relations = ws.relations();
    let report = RelationImporter::new(&relations).import(rows).await;
    ws.flush().await?;

    spinner.finish_and_clear();

    let status = match report.status() {
        "success" => report.status().green(),
        "partialSuccess" => report.status().yellow(),
        _ => report.status().red(),
    };
    println!(
        "{} {} rows: {} passed, {} failed, {} relations added",
        status,
        report.rows_processed,
        report.rows_passed.to_string().cyan(),
        report.rows_failed,
        report.relations_added
    );

    for failure in report.failures.iter().take(10) {
        println!("  row {} - {}", failure.row.to_string().red(), failure.reason);
    }
    if report.failures.len() > 10 {
        println!("  ... and {} more", report.failures.len() - 10);
    }

    Ok(())
}

/// Start the Glossa server.
pub async fn serve(root: &Path, port: u16, headless: bool) -> Result<()> {
    let bind_addr = if headless { "0.0.0.0" } else { "127.0.0.1" };
    println!("{}", "Starting Glossa server...".cyan());

    let ws = Workspace::open(root)?;
    let store: Arc<dyn EdgeStore> = ws.store.clone();
    let engine = Engine::new(store, ws.registry.clone(), &ws.config);

    let addr = format!("{}:{}", bind_addr, port).parse()?;
    let server = GlossaServer::new(engine, ServerConfig { addr });

    println!("{} Listening on ws://{}:{}", "✓".green(), bind_addr, port);
    if headless {
        println!("  Headless mode: accepting connections from any host");
    }
    println!("  Press {} to stop", "Ctrl+C".cyan());

    server.run().await.map_err(|e| e.to_string())?;

    Ok(())
}
