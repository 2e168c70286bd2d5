use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result};
use invoicetable::{
    Config, ExportColumn, Field, Filter, InvoiceItem, QueryEngine, QuerySpec, RecordStore, SortSpec, invoice_columns,
    to_delimited_text, write_export,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "invoicetable")]
#[command(about = "InvoiceTable CLI - Search, filter, sort and export invoice line items")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file (default: <config dir>/invoicetable/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the items matching a query
    Query {
        #[command(flatten)]
        query: QueryArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Export the items matching a query as delimited text
    Export {
        #[command(flatten)]
        query: QueryArgs,

        /// Export the whole store, ignoring search, filters and sort
        #[arg(long)]
        all: bool,

        /// Columns as `Field[:Header],...` (default: all fields)
        #[arg(long)]
        columns: Option<String>,

        /// Output file (default: export_file from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// JSON array or JSONL file with invoice items
    #[arg(short, long)]
    data: PathBuf,

    /// Case-insensitive text to look for in the searchable fields
    #[arg(short, long)]
    search: Option<String>,

    /// Filter as <field><op><value>; ops: = != > < >= <= ~ (repeatable)
    #[arg(short, long = "filter")]
    filters: Vec<String>,

    /// Sort as <field>[:asc|:desc]
    #[arg(long)]
    sort: Option<String>,
}

impl QueryArgs {
    fn to_spec(&self) -> Result<QuerySpec> {
        let mut spec = QuerySpec::new();
        spec.search = self.search.clone();
        for expr in &self.filters {
            spec = spec.filter(Filter::parse(expr)?);
        }
        if let Some(sort) = &self.sort {
            spec.sort = Some(SortSpec::parse(sort)?);
        }
        Ok(spec)
    }
}

fn main() -> Result<()> {
    // Setup tracing on stderr so stdout carries only results
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let engine = config.engine();

    match cli.command {
        Commands::Query { query, json } => {
            let store = RecordStore::open(&query.data)?;
            let results = engine.apply(&store, &query.to_spec()?);

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
                eprintln!("{} result(s)", engine.last_count());
            } else {
                print_table(&results);
                println!("{} result(s)", engine.last_count());
            }
        }
        Commands::Export {
            query,
            all,
            columns,
            output,
            stdout,
        } => {
            let store = RecordStore::open(&query.data)?;
            let columns = match columns {
                Some(list) => ExportColumn::parse_list(&list)?,
                None => invoice_columns(),
            };

            let text = if all {
                to_delimited_text(store.snapshot(), &columns, config.delimiter)
            } else {
                let results = export_view(&engine, &store, &query)?;
                to_delimited_text(&results, &columns, config.delimiter)
            };

            if stdout {
                print!("{}", text);
            } else {
                let path = output.unwrap_or_else(|| config.export_file.clone());
                if text.is_empty() {
                    eprintln!("Nothing to export");
                    return Ok(());
                }
                write_export(&path, &text).wrap_err("Export failed")?;
                println!("Exported to {}", path.display());
            }
        }
    }

    Ok(())
}

fn export_view(engine: &QueryEngine, store: &RecordStore, query: &QueryArgs) -> Result<Vec<InvoiceItem>> {
    let results = engine.apply(store, &query.to_spec()?);
    info!(count = results.len(), "Exporting query results");
    Ok(results)
}

/// Print items as an aligned table with a bold header
fn print_table(items: &[InvoiceItem]) {
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| Field::ALL.iter().map(|f| item.value(*f).to_string()).collect())
        .collect();

    let widths: Vec<usize> = Field::ALL
        .iter()
        .enumerate()
        .map(|(i, f)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(f.name().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = Field::ALL
        .iter()
        .zip(&widths)
        .map(|(f, w)| format!("{:<w$}", f.name(), w = *w))
        .collect();
    println!("{}", header.join("  ").bold());

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if Field::ALL[i].is_numeric() {
                    format!("{:>w$}", cell, w = *w)
                } else {
                    format!("{:<w$}", cell, w = *w)
                }
            })
            .collect();
        println!("{}", cells.join("  "));
    }
}
