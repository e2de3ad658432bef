//! The import pipeline: one pass per file, in dependency order.

use crate::records::{CourseRecord, MemberRecord, UserRecord};
use anyhow::{Context, Result};
use slms_database::Database;
use slms_domain::constants::{COURSE, MEMBER, USER};
use slms_domain::roles::MemberRole;
use slms_kernel::security::hash_password;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

const USER_FILE: &str = "user-data.csv";
const COURSE_FILE: &str = "course-data.csv";
const MEMBER_FILE: &str = "member-data.csv";

/// Imported/skipped counts for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileReport {
    pub imported: u64,
    pub skipped: u64,
}

/// Counts for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub users: FileReport,
    pub courses: FileReport,
    pub members: FileReport,
}

/// Runs the full import in dependency order: users, courses, members.
///
/// All three files are opened up front, so a missing file fails the run
/// before anything is written.
///
/// # Errors
/// Returns an error for missing files, unreadable streams or storage
/// failures. Malformed and dangling rows are skipped, not fatal.
pub async fn import_all(db: &Database, dir: &Path) -> Result<ImportReport> {
    let users_file = open(dir, USER_FILE)?;
    let courses_file = open(dir, COURSE_FILE)?;
    let members_file = open(dir, MEMBER_FILE)?;

    let users = import_users(db, users_file).await?;
    let courses = import_courses(db, courses_file).await?;
    let members = import_members(db, members_file).await?;

    Ok(ImportReport { users, courses, members })
}

fn open(dir: &Path, name: &str) -> Result<csv::Reader<File>> {
    let path = dir.join(name);
    csv::Reader::from_path(&path)
        .with_context(|| format!("Cannot open import file: {}", path.display()))
}

/// Row positions become record ids, 1-based. Skipped rows keep their
/// position so the member file can reference rows by number.
fn forced_id(index: usize) -> i64 {
    i64::try_from(index + 1).unwrap_or(i64::MAX)
}

fn check_row<T>(row: csv::Result<T>, id: i64, file: &str, report: &mut FileReport) -> Option<T> {
    match row {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(row = id, file, error = %err, "Skipping malformed row");
            report.skipped += 1;
            None
        },
    }
}

async fn import_users(db: &Database, mut reader: csv::Reader<File>) -> Result<FileReport> {
    let mut report = FileReport::default();
    let mut last_row = 0_i64;

    for (index, row) in reader.deserialize::<UserRecord>().enumerate() {
        let id = forced_id(index);
        last_row = id;

        let Some(record) = check_row(row, id, USER_FILE, &mut report) else {
            continue;
        };

        if user_id_by_name(db, &record.username).await?.is_some() {
            info!(row = id, username = %record.username, "User already present, skipping");
            report.skipped += 1;
            continue;
        }

        let password = hash_password(&record.password)?;
        create_user(db, id, &record, &password).await?;
        report.imported += 1;
    }

    if last_row > 0 {
        db.sync_counter(USER, last_row).await?;
    }

    info!(imported = report.imported, skipped = report.skipped, "User import complete");
    Ok(report)
}

async fn import_courses(db: &Database, mut reader: csv::Reader<File>) -> Result<FileReport> {
    let mut report = FileReport::default();
    let mut last_row = 0_i64;

    for (index, row) in reader.deserialize::<CourseRecord>().enumerate() {
        let id = forced_id(index);
        last_row = id;

        let Some(record) = check_row(row, id, COURSE_FILE, &mut report) else {
            continue;
        };

        if course_exists_by_name(db, &record.name).await? {
            info!(row = id, course = %record.name, "Course already present, skipping");
            report.skipped += 1;
            continue;
        }

        let Some(teacher_id) = user_id_by_name(db, &record.teacher).await? else {
            warn!(row = id, teacher = %record.teacher, "Unknown teacher, skipping course");
            report.skipped += 1;
            continue;
        };

        // The schema rejects negative prices; catch them here so one bad
        // row does not abort the run.
        if record.price < 0 {
            warn!(row = id, price = record.price, "Negative price, skipping course");
            report.skipped += 1;
            continue;
        }

        create_course(db, id, &record, teacher_id).await?;
        report.imported += 1;
    }

    if last_row > 0 {
        db.sync_counter(COURSE, last_row).await?;
    }

    info!(imported = report.imported, skipped = report.skipped, "Course import complete");
    Ok(report)
}

async fn import_members(db: &Database, mut reader: csv::Reader<File>) -> Result<FileReport> {
    let mut report = FileReport::default();
    let mut last_row = 0_i64;

    for (index, row) in reader.deserialize::<MemberRecord>().enumerate() {
        let id = forced_id(index);
        last_row = id;

        let Some(record) = check_row(row, id, MEMBER_FILE, &mut report) else {
            continue;
        };

        let Ok(role) = record.roles.parse::<MemberRole>() else {
            warn!(row = id, roles = %record.roles, "Unknown role, skipping member");
            report.skipped += 1;
            continue;
        };

        if !course_exists_by_id(db, record.course_id).await? {
            warn!(row = id, course = record.course_id, "Unknown course, skipping member");
            report.skipped += 1;
            continue;
        }
        if !user_exists_by_id(db, record.user_id).await? {
            warn!(row = id, user = record.user_id, "Unknown user, skipping member");
            report.skipped += 1;
            continue;
        }
        if member_exists(db, record.course_id, record.user_id).await? {
            info!(
                row = id,
                course = record.course_id,
                user = record.user_id,
                "Member already present, skipping"
            );
            report.skipped += 1;
            continue;
        }

        create_member(db, id, &record, role).await?;
        report.imported += 1;
    }

    if last_row > 0 {
        db.sync_counter(MEMBER, last_row).await?;
    }

    info!(imported = report.imported, skipped = report.skipped, "Member import complete");
    Ok(report)
}

async fn user_id_by_name(db: &Database, username: &str) -> Result<Option<i64>> {
    let mut response = db
        .query(format!(
            "SELECT VALUE record::id(id) FROM {USER} WHERE username = $username LIMIT 1"
        ))
        .bind(("username", username.to_owned()))
        .await
        .context("Querying user by name")?;

    Ok(response.take::<Option<i64>>(0)?)
}

async fn user_exists_by_id(db: &Database, id: i64) -> Result<bool> {
    let mut response = db
        .query(format!("SELECT VALUE record::id(id) FROM type::thing('{USER}', $id)"))
        .bind(("id", id))
        .await
        .context("Querying user by id")?;

    Ok(response.take::<Option<i64>>(0)?.is_some())
}

async fn course_exists_by_name(db: &Database, name: &str) -> Result<bool> {
    let mut response = db
        .query(format!("SELECT VALUE name FROM {COURSE} WHERE name = $name LIMIT 1"))
        .bind(("name", name.to_owned()))
        .await
        .context("Querying course by name")?;

    Ok(response.take::<Option<String>>(0)?.is_some())
}

async fn course_exists_by_id(db: &Database, id: i64) -> Result<bool> {
    let mut response = db
        .query(format!("SELECT VALUE record::id(id) FROM type::thing('{COURSE}', $id)"))
        .bind(("id", id))
        .await
        .context("Querying course by id")?;

    Ok(response.take::<Option<i64>>(0)?.is_some())
}

async fn member_exists(db: &Database, course_id: i64, user_id: i64) -> Result<bool> {
    let mut response = db
        .query(format!(
            "SELECT VALUE record::id(id) FROM {MEMBER} \
             WHERE course_id = $course_id AND user_id = $user_id LIMIT 1"
        ))
        .bind(("course_id", course_id))
        .bind(("user_id", user_id))
        .await
        .context("Querying membership")?;

    Ok(response.take::<Option<i64>>(0)?.is_some())
}

async fn create_user(db: &Database, id: i64, record: &UserRecord, password: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    db.query(format!(
        "CREATE type::thing('{USER}', $id) SET
            username = $username,
            password = $password,
            email = $email,
            first_name = $first_name,
            last_name = $last_name,
            is_staff = true,
            is_active = true,
            is_superuser = false,
            date_joined = $now
         RETURN NONE"
    ))
    .bind(("id", id))
    .bind(("username", record.username.clone()))
    .bind(("password", password.to_owned()))
    .bind(("email", record.email.clone()))
    .bind(("first_name", record.firstname.clone()))
    .bind(("last_name", record.lastname.clone()))
    .bind(("now", now))
    .await
    .context("Creating user")?
    .check()
    .context("Creating user")?;

    info!(id, username = %record.username, "Imported user");
    Ok(())
}

async fn create_course(
    db: &Database,
    id: i64,
    record: &CourseRecord,
    teacher_id: i64,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    db.query(format!(
        "CREATE type::thing('{COURSE}', $id) SET
            name = $name,
            description = $description,
            price = $price,
            teacher_id = $teacher_id,
            created_at = $now,
            updated_at = $now
         RETURN NONE"
    ))
    .bind(("id", id))
    .bind(("name", record.name.clone()))
    .bind(("description", record.description.clone()))
    .bind(("price", record.price))
    .bind(("teacher_id", teacher_id))
    .bind(("now", now))
    .await
    .context("Creating course")?
    .check()
    .context("Creating course")?;

    info!(id, course = %record.name, "Imported course");
    Ok(())
}

async fn create_member(
    db: &Database,
    id: i64,
    record: &MemberRecord,
    role: MemberRole,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    db.query(format!(
        "CREATE type::thing('{MEMBER}', $id) SET
            course_id = $course_id,
            user_id = $user_id,
            roles = $roles,
            created_at = $now
         RETURN NONE"
    ))
    .bind(("id", id))
    .bind(("course_id", record.course_id))
    .bind(("user_id", record.user_id))
    .bind(("roles", role.as_str().to_owned()))
    .bind(("now", now))
    .await
    .context("Creating member")?
    .check()
    .context("Creating member")?;

    info!(id, course = record.course_id, user = record.user_id, "Imported member");
    Ok(())
}
