use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueHint};
use tracing_subscriber::EnvFilter;

use typedsql::bulk::DEFAULT_BATCH_SIZE;
use typedsql::{BulkTable, Database, LoadOptions, Result};

#[derive(Parser)]
#[command(
    name = "typedsql",
    version,
    about = "Typed queries and bulk loads against a SQLite database file",
    arg_required_else_help = true
)]
struct Cli {
    #[arg(help = "Path to the SQLite database file", value_hint = ValueHint::FilePath)]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run `SELECT <body>` and print the typed result as tab-separated text
    Select { body: String },
    /// Run one or more statements
    Exec { sql: String },
    /// Exit with status 0 if the table exists, 1 otherwise
    Exists { table: String },
    /// Create DST with the column definitions of SRC
    CopyStructure { src: String, dst: String },
    /// Insert a whitespace-separated file (header line of field names, then rows)
    Load {
        table: String,
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("typedsql: {err}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let db = Database::new(cli.db);
    match cli.command {
        Command::Select { body } => {
            let rs = db.select(&body)?;
            let names: Vec<&str> = rs.field_names().collect();
            println!("{}", names.join("\t"));
            for row in 0..rs.row_count() {
                let cells: Vec<String> = names
                    .iter()
                    .map(|name| rs.cell_text(row, name).unwrap_or_default())
                    .collect();
                println!("{}", cells.join("\t"));
            }
        }
        Command::Exec { sql } => db.execute(&sql)?,
        Command::Exists { table } => {
            if !db.table_exists(&table)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::CopyStructure { src, dst } => db.copy_table_structure(&src, &dst)?,
        Command::Load {
            table,
            file,
            batch_size,
        } => {
            let content = fs::read_to_string(&file)?;
            let mut lines = content.lines().filter(|l| !l.trim().is_empty());
            let fields: Vec<String> = lines
                .next()
                .map(|l| l.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default();
            let rows: Vec<Vec<String>> = lines
                .map(|l| l.split_whitespace().map(str::to_string).collect())
                .collect();

            let data = BulkTable::from_rows(fields, rows)?;
            let batches = db.load(&table, &data, &LoadOptions { batch_size })?;
            eprintln!("loaded {} rows in {batches} batches", data.row_count());
        }
    }
    Ok(ExitCode::SUCCESS)
}
