use clap::Parser;
use std::path::PathBuf;

/// Seeds the database from the legacy CSV export.
#[derive(Debug, Parser)]
#[command(name = "slms-importer", version, about)]
pub struct Args {
    /// Directory holding user-data.csv, course-data.csv and member-data.csv.
    #[arg(long)]
    pub dir: PathBuf,

    /// `SurrealDB` connection URL.
    #[arg(long, default_value = "mem://")]
    pub database_url: String,

    /// Namespace to import into.
    #[arg(long, default_value = "slms")]
    pub namespace: String,

    /// Database to import into.
    #[arg(long, default_value = "core")]
    pub database: String,

    /// Root username, for authenticated engines.
    #[arg(long)]
    pub username: Option<String>,

    /// Root password, for authenticated engines.
    #[arg(long)]
    pub password: Option<String>,
}
