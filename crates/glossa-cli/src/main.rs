//! Glossa CLI - Command-line interface for Glossa
//!
//! Manages a glossary project on disk: registers glossaries and terms,
//! relates terms with typed relations, and exports or serves the result.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod csv;
mod workspace;

#[derive(Parser)]
#[command(name = "glossa")]
#[command(author = "Glossa Contributors")]
#[command(version)]
#[command(about = "Typed relations between business glossary terms", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project directory (defaults to current directory)
    #[arg(short = 'C', long = "dir", global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Glossa in the project directory
    Init,

    /// Manage glossaries
    Glossary {
        #[command(subcommand)]
        action: GlossaryAction,
    },

    /// Manage terms
    Term {
        #[command(subcommand)]
        action: TermAction,
    },

    /// Relate two terms (by id or fully qualified name)
    Relate {
        from: String,
        to: String,

        /// Relation type (defaults to the configured default)
        #[arg(short = 't', long = "type")]
        relation_type: Option<String>,
    },

    /// Remove a relation between two terms
    Unrelate {
        from: String,
        to: String,

        #[arg(short = 't', long = "type")]
        relation_type: Option<String>,
    },

    /// List the related terms of a term
    Related {
        term: String,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show the relation graph around a term
    Graph {
        term: String,

        /// Maximum hops from the term
        #[arg(short, long, default_value = "2")]
        depth: usize,

        /// Only follow these relation types
        #[arg(short = 't', long = "type")]
        types: Vec<String>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List relation types
    Types {
        /// Replace the relation types from a settings file
        #[arg(long)]
        apply: Option<PathBuf>,
    },

    /// Show how many relations use each type
    Usage,

    /// Export a glossary
    Export {
        #[command(subcommand)]
        target: ExportTarget,
    },

    /// Import relations from a CSV sheet
    Import {
        /// CSV file with fullyQualifiedName,relatedTerms columns
        file: PathBuf,
    },

    /// Start the Glossa server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "7433")]
        port: u16,

        /// Headless mode: bind to 0.0.0.0 for remote access
        #[arg(long)]
        headless: bool,
    },
}

#[derive(Subcommand)]
enum GlossaryAction {
    /// Register a glossary
    Add {
        id: String,
        name: String,

        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum TermAction {
    /// Register a term
    Add {
        id: String,
        name: String,

        /// Glossary id
        #[arg(short, long)]
        glossary: String,

        /// Parent term (id or fully qualified name)
        #[arg(long)]
        parent: Option<String>,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Alternative label (repeatable)
        #[arg(long = "synonym")]
        synonyms: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ExportTarget {
    /// Export as RDF (turtle, rdfxml, ntriples, jsonld)
    Rdf {
        glossary: String,

        #[arg(short, long, default_value = "turtle")]
        format: String,

        /// Leave typed relations and skos:narrower out
        #[arg(long)]
        no_relations: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the relation sheet as CSV
    Csv {
        glossary: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let root = cli.dir;
    let result = match cli.command {
        Commands::Init => commands::init(&root),
        Commands::Glossary {
            action: GlossaryAction::Add { id, name, description },
        } => commands::glossary_add(&root, &id, &name, description).await,
        Commands::Term {
            action:
                TermAction::Add {
                    id,
                    name,
                    glossary,
                    parent,
                    display_name,
                    description,
                    synonyms,
                },
        } => {
            let spec = commands::TermSpec {
                id,
                name,
                glossary,
                parent,
                display_name,
                description,
                synonyms,
            };
            commands::term_add(&root, spec).await
        }
        Commands::Relate {
            from,
            to,
            relation_type,
        } => commands::relate(&root, &from, &to, relation_type.as_deref()).await,
        Commands::Unrelate {
            from,
            to,
            relation_type,
        } => commands::unrelate(&root, &from, &to, relation_type.as_deref()).await,
        Commands::Related { term, json } => commands::related(&root, &term, json).await,
        Commands::Graph {
            term,
            depth,
            types,
            json,
        } => commands::graph(&root, &term, depth, &types, json).await,
        Commands::Types { apply } => commands::types(&root, apply.as_deref()).await,
        Commands::Usage => commands::usage(&root).await,
        Commands::Export { target } => match target {
            ExportTarget::Rdf {
                glossary,
                format,
                no_relations,
                output,
            } => commands::export_rdf(&root, &glossary, &format, !no_relations, output.as_deref()).await,
            ExportTarget::Csv { glossary, output } => {
                commands::export_csv(&root, &glossary, output.as_deref()).await
            }
        },
        Commands::Import { file } => commands::import(&root, &file).await,
        Commands::Serve { port, headless } => commands::serve(&root, port, headless).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
