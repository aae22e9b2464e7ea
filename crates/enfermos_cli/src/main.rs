//! Admin command-line entry point for the dependents registry.
//!
//! # Usage
//!
//! ```bash
//! enfermos ping
//! enfermos --db /var/lib/enfermos.sqlite3 bootstrap-admin --name "Padre João" --email padre@paroquia.org
//! enfermos sectors
//! enfermos pending --admin padre@paroquia.org --sector <SECTOR_ID>
//! enfermos approve --admin padre@paroquia.org --sector <SECTOR_ID> --dependent <DEPENDENT_ID>
//! ```
//!
//! `--db` falls back to `ENFERMOS_DB_PATH`, then to a file in the temp dir.
//! Logs go to `ENFERMOS_LOG_DIR` when set.

use clap::{Parser, Subcommand};
use enfermos_core::{
    default_log_level, init_logging, open_db, AccessService, AdditionPolicy, AdminRepository,
    Resolution, SectorService, ServiceError, SqliteAdminRepository, SqliteDependentRepository,
    SqliteSectorRepository, WorkflowConfig, WorkflowService,
};
use log::error;
use rusqlite::Connection;
use std::path::PathBuf;
use uuid::Uuid;

const DEFAULT_DB_FILE: &str = "enfermos.sqlite3";

#[derive(Parser)]
#[command(name = "enfermos")]
#[command(author, version, about = "Sector dependents registry tools")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "ENFERMOS_DB_PATH")]
    db: Option<PathBuf>,

    /// Log level (`trace`, `debug`, `info`, `warn`, `error`)
    #[arg(long, global = true, env = "ENFERMOS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute log directory; logging stays off when unset
    #[arg(long, global = true, env = "ENFERMOS_LOG_DIR")]
    log_dir: Option<String>,

    /// How caretaker additions enter the registry (`direct`, `approval`)
    #[arg(long, global = true, env = "ENFERMOS_ADDITION_POLICY", default_value = "direct")]
    addition_policy: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage
    Ping,
    /// Register the first admin of an empty directory
    BootstrapAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// List sectors with dependent counts
    Sectors,
    /// Show dependents awaiting admin resolution
    Pending {
        /// Acting admin email
        #[arg(long)]
        admin: String,
        /// Restrict to one sector
        #[arg(long)]
        sector: Option<Uuid>,
    },
    /// Accept a pending change
    Approve(ResolveArgs),
    /// Refuse a pending change
    Reject(ResolveArgs),
}

#[derive(clap::Args)]
struct ResolveArgs {
    /// Acting admin email
    #[arg(long)]
    admin: String,
    #[arg(long)]
    sector: Uuid,
    #[arg(long)]
    dependent: Uuid,
}

fn main() {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    if let Err(err) = run(cli) {
        error!("event=cli_command module=cli status=error error={err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        db,
        addition_policy,
        command,
        ..
    } = cli;

    match command {
        Commands::Ping => {
            println!("enfermos_core ping={}", enfermos_core::ping());
            println!("enfermos_core version={}", enfermos_core::core_version());
        }
        Commands::BootstrapAdmin { name, email } => {
            let conn = connect(db)?;
            bootstrap_admin(&conn, &name, &email)?;
        }
        Commands::Sectors => {
            let conn = connect(db)?;
            let sectors = SectorService::new(
                SqliteSectorRepository::new(&conn),
                SqliteAdminRepository::new(&conn),
            );
            for summary in sectors.list_sectors()? {
                println!(
                    "{}\t{}\ttotal={}\tpending={}\tcaretakers={}",
                    summary.sector.id,
                    summary.sector.name,
                    summary.total_dependents,
                    summary.pending_count,
                    summary.sector.caretakers.len()
                );
            }
        }
        Commands::Pending { admin, sector } => {
            let config = workflow_config(&addition_policy)?;
            let conn = connect(db)?;
            let session = admin_session(&conn, &admin)?;
            for item in workflow(&conn, config).list_pending(&session, sector)? {
                println!(
                    "{}\t{}\t{}\t{}",
                    item.dependent.id,
                    item.sector_name,
                    item.dependent.status().as_str(),
                    item.dependent.fields.name
                );
            }
        }
        Commands::Approve(args) => {
            let config = workflow_config(&addition_policy)?;
            let conn = connect(db)?;
            let session = admin_session(&conn, &args.admin)?;
            let resolution = workflow(&conn, config).approve(&session, args.sector, args.dependent)?;
            print_resolution(&resolution);
        }
        Commands::Reject(args) => {
            let config = workflow_config(&addition_policy)?;
            let conn = connect(db)?;
            let session = admin_session(&conn, &args.admin)?;
            let resolution = workflow(&conn, config).reject(&session, args.sector, args.dependent)?;
            print_resolution(&resolution);
        }
    }
    Ok(())
}

fn connect(db: Option<PathBuf>) -> Result<Connection, enfermos_core::DbError> {
    let path = db.unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE));
    open_db(path)
}

fn workflow_config(addition_policy: &str) -> Result<WorkflowConfig, String> {
    Ok(WorkflowConfig {
        addition_policy: AdditionPolicy::parse(addition_policy)?,
    })
}

fn workflow(
    conn: &Connection,
    config: WorkflowConfig,
) -> WorkflowService<SqliteDependentRepository<'_>, SqliteAdminRepository<'_>> {
    WorkflowService::with_config(
        SqliteDependentRepository::new(conn),
        SqliteAdminRepository::new(conn),
        config,
    )
}

fn admin_session(conn: &Connection, email: &str) -> Result<enfermos_core::Session, ServiceError> {
    AccessService::new(SqliteSectorRepository::new(conn), SqliteAdminRepository::new(conn))
        .login_admin(email)
}

fn bootstrap_admin(
    conn: &Connection,
    name: &str,
    email: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let admins = SqliteAdminRepository::new(conn);
    if !admins.list_admins()?.is_empty() {
        return Err("admin directory is not empty; use an existing admin to authorize".into());
    }
    let outcome = admins.upsert_admin(name, email)?;
    println!("admin created: {}", outcome.admin().email);
    Ok(())
}

fn print_resolution(resolution: &Resolution) {
    match resolution {
        Resolution::Updated(dependent) => {
            println!("{}\t{}", dependent.id, dependent.status().as_str())
        }
        Resolution::Deleted(id) => println!("{id}\tdeleted"),
    }
}
