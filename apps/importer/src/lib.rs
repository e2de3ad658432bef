//! # SimpleLMS Importer
//!
//! Seeds the database from the three CSV files of the legacy export:
//! `user-data.csv`, `course-data.csv` and `member-data.csv`.
//!
//! Imported rows get sequential ids from their file position, so the
//! member file can reference users and courses by row number. Reruns are
//! idempotent: rows that already exist are skipped, malformed or
//! dangling rows are logged and skipped, and the per-table id counters
//! are raised afterwards so API inserts never collide with imported ids.

mod cli;
mod import;
mod records;

pub use cli::Args;
pub use import::{FileReport, ImportReport, import_all};
pub use records::{CourseRecord, MemberRecord, UserRecord};
