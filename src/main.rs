//! girdoc — dump GIR cross-reference data as JSON.
//!
//! - `girdoc symbols Gtk 3.0` — C identifier → dotted name table
//! - `girdoc docs Gtk 3.0 --bucket parameters` — documentation tree
//! - `girdoc private Gtk 3.0` — disguised record types
//! - `girdoc deps Gtk 3.0` — included namespaces
//! - `girdoc list` — every GIR file found in the search path

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use girdoc::locate::DEFAULT_GIR_DIR;
use girdoc::{Bucket, GirDirectory, GirLocator, Namespace, NamespaceCache, Reflection};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "girdoc",
    about = "Extract symbol tables and documentation from GObject-Introspection XML"
)]
struct Cli {
    /// Directory containing *.gir files (repeatable, earlier wins)
    #[arg(
        long = "gir-dir",
        global = true,
        env = "GIRDOC_GIR_PATH",
        value_delimiter = ':',
        default_value = DEFAULT_GIR_DIR
    )]
    gir_dirs: Vec<PathBuf>,

    /// JSON file with attribute names of the GObject/GLib runtime modules
    #[arg(long, global = true)]
    reflection: Option<PathBuf>,

    /// Log debug output to stderr (GIRDOC_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the C identifier → dotted name table
    Symbols(NamespaceArgs),
    /// Print the documentation tree
    Docs {
        #[command(flatten)]
        target: NamespaceArgs,
        /// Only print one bucket: general, parameters, returns, signals, properties, fields
        #[arg(long)]
        bucket: Option<Bucket>,
    },
    /// Print the names of private (disguised, field-less) record types
    Private(NamespaceArgs),
    /// Print the namespaces included by this one
    Deps(NamespaceArgs),
    /// List every namespace found in the GIR directories
    List,
}

#[derive(Args)]
struct NamespaceArgs {
    /// Namespace name, e.g. Gtk
    namespace: String,
    /// Namespace version, e.g. 3.0
    version: String,
    /// Read this GIR file instead of searching the GIR directories
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Serialize)]
struct Dependency<'a> {
    name: &'a str,
    version: &'a str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let reflection = load_reflection(cli.reflection.as_deref())?;

    match &cli.command {
        Command::List => {
            let dirs = GirDirectory::scan(&cli.gir_dirs)?;
            print_json(&dirs.keys().collect::<Vec<_>>())
        }
        Command::Symbols(target) => {
            let (_, ns) = resolve(&cli, target, reflection)?;
            print_json(ns.symbols())
        }
        Command::Docs { target, bucket } => {
            let (cache, ns) = resolve(&cli, target, reflection)?;
            let docs = cache.docs(&ns).with_context(|| {
                format!("failed to extract docs for {}-{}", ns.name(), ns.version())
            })?;
            match bucket {
                Some(bucket) => print_json(docs.bucket(*bucket)),
                None => print_json(docs),
            }
        }
        Command::Private(target) => {
            let (cache, ns) = resolve(&cli, target, reflection)?;
            print_json(cache.private_types(&ns)?)
        }
        Command::Deps(target) => {
            let (_, ns) = resolve(&cli, target, reflection)?;
            let deps = ns.dependencies();
            let deps: Vec<_> = deps
                .iter()
                .map(|(name, version)| Dependency { name, version })
                .collect();
            print_json(&deps)
        }
    }
}

/// Log to stderr so stdout stays valid JSON.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("GIRDOC_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_reflection(path: Option<&std::path::Path>) -> Result<Reflection> {
    let Some(path) = path else {
        return Ok(Reflection::empty());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read reflection table: {}", path.display()))?;
    Reflection::from_json(&content)
        .with_context(|| format!("failed to parse reflection table: {}", path.display()))
}

/// Build the locator (explicit `--file` or directory scan) and resolve the
/// requested namespace through a fresh cache.
fn resolve(
    cli: &Cli,
    target: &NamespaceArgs,
    reflection: Reflection,
) -> Result<(NamespaceCache<Box<dyn GirLocator>>, Arc<Namespace>)> {
    let locator: Box<dyn GirLocator> = match &target.file {
        Some(file) => {
            let key = girdoc::locate::namespace_key(&target.namespace, &target.version);
            Box::new(HashMap::from([(key, file.clone())]))
        }
        None => Box::new(GirDirectory::scan(&cli.gir_dirs)?),
    };
    let cache = NamespaceCache::new(locator, reflection);
    let ns = cache
        .get(&target.namespace, &target.version)
        .with_context(|| format!("failed to load {}-{}", target.namespace, target.version))?;
    Ok((cache, ns))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}
