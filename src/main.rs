use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process;

use abbrev_resolve::config::{load_config, save_config, ResolveOptions, ResolverConfig};
use abbrev_resolve::fragments::PreparsedAbbreviations;
use abbrev_resolve::resolution::TreeResolver;
use abbrev_resolve::resources::ResourceTable;
use abbrev_resolve::types::AbbreviationNode;
use tracing_subscriber::EnvFilter;

/// Resolve parsed abbreviation trees against snippet resources.
#[derive(Parser)]
#[command(name = "abbrev-resolve", about = "Resolve abbreviation trees against snippet resources")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a parsed tree and print the result as JSON
    Resolve {
        /// Parsed abbreviation tree (JSON)
        #[arg(short, long)]
        tree: PathBuf,
        /// Resource table (JSON)
        #[arg(short, long)]
        resources: PathBuf,
        /// Pre-parsed trees for referenced abbreviations (JSON)
        #[arg(short, long)]
        fragments: Option<PathBuf>,
        /// Syntax to resolve under (default: from config)
        #[arg(short, long)]
        syntax: Option<String>,
        /// Directory holding abbrev-resolve.json (default: current directory)
        #[arg(short, long)]
        config_dir: Option<String>,
        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Write a default configuration file
    InitConfig {
        /// Target directory (default: current directory)
        path: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> abbrev_resolve::errors::Result<()> {
    match cli.command {
        Commands::Resolve {
            tree,
            resources,
            fragments,
            syntax,
            config_dir,
            pretty,
        } => {
            let config = load_config(&resolve_path(config_dir))?;
            let table = ResourceTable::load(&resources)?;
            let parser = match fragments {
                Some(path) => PreparsedAbbreviations::load(&path)?,
                None => PreparsedAbbreviations::new(),
            };

            let mut root: AbbreviationNode = serde_json::from_str(&fs::read_to_string(&tree)?)?;
            let options = ResolveOptions { syntax };
            let resolver = TreeResolver::with_config(&table, &parser, &config);
            resolver.postprocess(&mut root, &options, &config)?;

            let output = if pretty {
                serde_json::to_string_pretty(&root)?
            } else {
                serde_json::to_string(&root)?
            };
            println!("{}", output);
        }
        Commands::InitConfig { path } => {
            let dir = resolve_path(path);
            save_config(&dir, &ResolverConfig::default())?;
            println!("Wrote default config to {}", dir.display());
        }
    }
    Ok(())
}

/// Resolves an optional path argument, defaulting to the current directory.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
