use anyhow::Context;
use clap::Parser;
use slms_database::Database;
use slms_importer::{Args, import_all};
use slms_logger::Logger;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    let args = Args::parse();
    let runtime = slms_runtime::build_service_runtime()?;
    runtime.block_on(run(args))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut builder =
        Database::builder().url(&args.database_url).session(&args.namespace, &args.database);
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        builder = builder.auth(username, password);
    }
    let db = builder.init().await.context("Failed to establish database connection")?;

    let report = import_all(&db, &args.dir).await?;

    info!(
        users = report.users.imported,
        courses = report.courses.imported,
        members = report.members.imported,
        "Import finished"
    );
    Ok(())
}
