//! siftql — pagination and filter compiler CLI
//!
//! # Usage
//!
//! ```bash
//! # Compile a search tree for a nested predicate store
//! siftql filter '{"operator":"and","search":[{"field":"age","value":10,"operator":"gt"}]}'
//!
//! # Same tree as a CQL WHERE fragment
//! siftql cql '{"field":"name","value":"Bob","operator":"eq"}' --allow-filtering
//!
//! # Condition for the page after a cursor
//! siftql after --order 'age|DESC,id' --cursor '{"age":30,"id":7}'
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use siftql::prelude::*;

#[derive(Parser)]
#[command(name = "siftql")]
#[command(version)]
#[command(about = "Keyset pagination and filter compiler", long_about = None)]
#[command(after_help = "EXAMPLES:
    siftql filter '{\"field\":\"tags\",\"value\":\"red\",\"operator\":\"in\"}' --attr tags='[String]'
    siftql after --order 'age|DESC,id' --cursor '{\"age\":30,\"id\":7}'
    siftql missing 1,2,3 --existing 2")]
struct Cli {
    /// Path to a siftql.toml (default: ./siftql.toml, then the user config dir)
    #[arg(short, long, env = "SIFTQL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the id attribute
    #[arg(long, global = true)]
    id_attribute: Option<String>,

    /// Attribute type declaration, e.g. tags='[String]' (repeatable)
    #[arg(long = "attr", value_parser = parse_attr, global = true)]
    attributes: Vec<(String, String)>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a search tree (JSON) into a nested predicate
    Filter {
        search: String,
        /// Match array attributes natively instead of through text patterns
        #[arg(long)]
        native_arrays: bool,
    },
    /// Compile a search tree (JSON) into a CQL WHERE fragment
    Cql {
        search: String,
        /// Append ALLOW FILTERING
        #[arg(short, long)]
        allow_filtering: bool,
    },
    /// Condition for records after a cursor
    After(CursorArgs),
    /// Condition for records before a cursor
    Before(CursorArgs),
    /// Sort and truncate a JSON array of records
    Order {
        records: String,
        /// Sort keys as field|dir, direction in any case
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Wrap a JSON array of records as a connection
    Connection {
        records: String,
        /// Encode only these fields into position tokens
        #[arg(long, value_delimiter = ',')]
        keyset: Vec<String>,
        #[arg(long)]
        has_more: bool,
    },
    /// Report which ids are absent from a known set
    Missing {
        #[arg(value_delimiter = ',')]
        ids: Vec<String>,
        /// Ids that exist
        #[arg(short, long, value_delimiter = ',')]
        existing: Vec<String>,
    },
    /// Show the operator reference
    Operators,
}

#[derive(clap::Args)]
struct CursorArgs {
    /// Order string, e.g. 'age|DESC,id|ASC'
    #[arg(short, long)]
    order: String,
    /// Cursor record as JSON
    #[arg(long, conflicts_with = "position", required_unless_present = "position")]
    cursor: Option<String>,
    /// Position token from a previous connection
    #[arg(short, long)]
    position: Option<String>,
    /// Also match the cursor record itself
    #[arg(short, long)]
    include_cursor: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "siftql=debug" } else { "siftql=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SiftConfig::from_path(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => SiftConfig::load()?,
    };
    if let Some(id) = &cli.id_attribute {
        config.id_attribute = id.clone();
    }
    for (field, decl) in &cli.attributes {
        config.attributes.insert(field.clone(), decl.clone());
    }

    match cli.command {
        Commands::Filter {
            search,
            native_arrays,
        } => {
            let node: FilterNode = serde_json::from_str(&search).context("parsing search tree")?;
            let strategy = if native_arrays {
                ArrayStrategy::Native
            } else {
                config.array_strategy
            };
            let predicate = PredicateCompiler::new(&config.attributes)
                .with_array_strategy(strategy)
                .compile(&node)?;
            print_predicate(&predicate)?;
        }
        Commands::Cql {
            search,
            allow_filtering,
        } => {
            let node: FilterNode = serde_json::from_str(&search).context("parsing search tree")?;
            let cql = CqlCompiler::new(&config.attributes)
                .allow_filtering(allow_filtering || config.allow_filtering)
                .compile(&node)?;
            println!("{}", "CQL:".green().bold());
            println!("{}", cql.white());
        }
        Commands::After(args) => cursor_condition(&config, &args, PageDirection::Forward)?,
        Commands::Before(args) => cursor_condition(&config, &args, PageDirection::Backward)?,
        Commands::Order {
            records,
            keys,
            limit,
        } => {
            let records: Vec<Record> =
                serde_json::from_str(&records).context("parsing records")?;
            let keys = keys
                .iter()
                .map(|k| match k.split_once('|') {
                    Some((field, dir)) => SortKey::parse(field.trim(), dir.trim()),
                    None => Ok(SortKey::new(k.trim(), SortDirection::Asc)),
                })
                .collect::<SiftResult<Vec<_>>>()?;
            let mut records = order_records(records, &keys);
            if let Some(limit) = limit {
                records = paginate_records(records, limit);
            }
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Connection {
            records,
            keyset,
            has_more,
        } => {
            let records: Vec<Record> =
                serde_json::from_str(&records).context("parsing records")?;
            let conn = if keyset.is_empty() {
                assemble(records, &RecordEncoder, has_more)?
            } else {
                assemble(records, &KeysetEncoder::new(keyset), has_more)?
            };
            println!("{}", serde_json::to_string_pretty(&conn)?);
        }
        Commands::Missing { ids, existing } => {
            let id_attribute = config.id_attribute.as_str();
            let store: Vec<Record> = existing
                .into_iter()
                .collect::<HashSet<String>>()
                .into_iter()
                .map(|id| record([(id_attribute, id)]))
                .collect();
            let absent = missing(ids, |id| {
                let search = id_filter(id_attribute, id);
                let count = count_matching(&store, &search, &config.attributes);
                async move { count }
            })
            .await?;
            if absent.is_empty() {
                println!("{}", "✓ All ids exist".green());
            } else {
                println!("{} {}", "Missing:".yellow().bold(), absent.join(", "));
            }
        }
        Commands::Operators => show_operators(),
    }

    Ok(())
}

fn cursor_condition(config: &SiftConfig, args: &CursorArgs, direction: PageDirection) -> Result<()> {
    let order = parse_order(&args.order)?;
    let cursor: Cursor = match (&args.cursor, &args.position) {
        (Some(json), _) => serde_json::from_str(json).context("parsing cursor")?,
        (None, Some(token)) => decode_position(token)?,
        (None, None) => anyhow::bail!("either --cursor or --position is required"),
    };

    let predicate = CursorCondition::new(&order, &cursor, &config.id_attribute)
        .include_cursor(args.include_cursor || config.include_cursor)
        .fallback(config.malformed_cursor)
        .build(direction)?;

    if predicate.is_true() {
        println!(
            "{}",
            "⚠ No cursor constraint applied (see warnings)".yellow()
        );
    }
    print_predicate(&predicate)
}

/// Count records in an in-memory store matching a compiled search tree.
fn count_matching(
    store: &[Record],
    search: &FilterNode,
    types: &AttributeTypeMap,
) -> SiftResult<u64> {
    let predicate = compile_predicate(search, types)?;
    let mut count = 0;
    for record in store {
        if predicate.matches(record)? {
            count += 1;
        }
    }
    Ok(count)
}

fn print_predicate(predicate: &Predicate) -> Result<()> {
    println!("{}", "Predicate:".green().bold());
    println!("{}", predicate.to_string().white());
    println!();
    println!("{}", serde_json::to_string_pretty(&predicate.to_json())?);
    Ok(())
}

fn show_operators() {
    println!("{}", "SiftQL Operator Reference".cyan().bold());
    println!();
    println!(
        "{:12} {:14} {:10} {}",
        "Operator".white().bold(),
        "Symbol".white().bold(),
        "Predicate".white().bold(),
        "CQL".white().bold()
    );
    println!("{}", "─".repeat(50).dimmed());

    let types = AttributeTypeMap::new();
    for op in Operator::ALL {
        let sample = if op.is_logical() {
            FilterNode::combine(op, vec![FilterNode::leaf("f", Operator::Eq, 1)])
        } else {
            FilterNode::leaf("f", op, 1)
        };
        let mark = |ok: bool| if ok { "✓".green() } else { "✗".red() };
        let predicate = PredicateCompiler::new(&types).compile(&sample).is_ok();
        let cql = CqlCompiler::new(&types).compile(&sample).is_ok();
        println!(
            "{:12} {:14} {:10} {}",
            op.name().cyan().bold(),
            op.symbol().yellow(),
            mark(predicate),
            mark(cql)
        );
    }
}

fn parse_attr(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected field=Type, got '{}'", s))
}
