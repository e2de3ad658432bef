use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

/// An embedded migration script. Scripts run in declaration order; the
/// checksum recorded in the ledger is the SHA-256 of the script text.
#[derive(Debug)]
pub(crate) struct Migration {
    pub name: &'static str,
    pub script: &'static str,
}

pub(crate) const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "0001_bootstrap",
        script: include_str!("../migrations/0001_bootstrap.surql"),
    },
    Migration { name: "0002_schema", script: include_str!("../migrations/0002_schema.surql") },
];

#[derive(Debug, Default)]
pub(crate) struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct AppliedMigration {
    pub name: String,
    pub checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner {
    db: Surreal<Any>,
}

impl MigrationRunner {
    #[must_use]
    pub(crate) const fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        let mut report = MigrationReport::default();
        let applied_migrations = self.get_migrations_map().await?;

        for migration in MIGRATIONS {
            let checksum = hex::encode(Sha256::digest(migration.script.as_bytes()));

            if let Some(applied) = applied_migrations.get(migration.name) {
                ensure_checksum_match(migration.name, &checksum, &applied.checksum)?;
                report
                    .skipped
                    .push(AppliedMigration { name: migration.name.to_owned(), checksum });
                continue;
            }

            self.apply_migration(migration, &checksum).await?;
            report.applied.push(AppliedMigration { name: migration.name.to_owned(), checksum });
        }

        Ok(report)
    }

    async fn apply_migration(
        &self,
        migration: &Migration,
        checksum: &str,
    ) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            RETURN fn::confirm_migration($name, $checksum);
            COMMIT TRANSACTION;",
            migration.script,
        );

        // A failing statement rolls the transaction back; surface it instead
        // of recording the ledger row as if the script had run.
        self.db
            .query(&query)
            .bind(("name", migration.name))
            .bind(("checksum", checksum.to_owned()))
            .await
            .context(format!("SQL execution failed at {}", migration.name))?
            .check()
            .map_err(surrealdb::Error::from)
            .context(format!("A statement failed in {}", migration.name))?;

        Ok(())
    }

    async fn is_ledger_ready(&self) -> Result<bool, DatabaseError> {
        let mut response = self
            .db
            .query("!(SELECT VALUE fields FROM ONLY INFO FOR TABLE migration).is_empty()")
            .await
            .context("Checking if migration ledger exists")?;

        let is_ready = response.take::<Option<bool>>(0)?.unwrap_or_default();
        Ok(is_ready)
    }

    async fn get_migrations_map(
        &self,
    ) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        if !self.is_ledger_ready().await? {
            return Ok(FxHashMap::default());
        }

        let entries = self
            .db
            .query("SELECT name, checksum FROM migration")
            .await
            .context("Reading the migration ledger")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Decoding ledger rows")?;

        Ok(entries.into_iter().map(|entry| (entry.name.clone(), entry)).collect())
    }
}

fn ensure_checksum_match(
    name: &str,
    current: &str,
    recorded: &str,
) -> Result<(), DatabaseError> {
    if recorded != current {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {name} (ledger has {recorded}, script hashes to {current})"
            )
            .into(),
            context: Some("Ledger checksum differs from the embedded script".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::any::connect;

    async fn raw_db() -> Surreal<Any> {
        let db = connect("mem://").await.unwrap();
        db.use_ns("migrate").use_db("test").await.unwrap();
        db
    }

    #[tokio::test]
    async fn a_failing_statement_aborts_the_migration() {
        let runner = MigrationRunner::new(raw_db().await);
        let broken = Migration { name: "9999_broken", script: "THROW 'schema rejected';" };

        let err = runner.apply_migration(&broken, "deadbeef").await.unwrap_err();

        assert!(err.to_string().contains("9999_broken"));
    }

    #[tokio::test]
    async fn a_failed_script_leaves_no_ledger_entry() {
        let db = raw_db().await;
        let runner = MigrationRunner::new(db.clone());
        let broken = Migration { name: "9999_broken", script: "THROW 'schema rejected';" };

        runner.apply_migration(&broken, "deadbeef").await.unwrap_err();

        assert!(runner.get_migrations_map().await.unwrap().is_empty());
    }
}
