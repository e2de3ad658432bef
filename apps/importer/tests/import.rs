use slms_database::Database;
use slms_importer::import_all;
use slms_kernel::security::verify_password;
use std::path::Path;

async fn db() -> Database {
    Database::builder().url("mem://").session("slms_importer", "seed").init().await.unwrap()
}

fn write_seed(dir: &Path) {
    std::fs::write(
        dir.join("user-data.csv"),
        "username,password,email,firstname,lastname\n\
         ada,s3cret,ada@example.com,Ada,Lovelace\n\
         grace,hopper1,grace@example.com,Grace,Hopper\n\
         linus,kernelpw,linus@example.com,Linus,Torvalds\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("course-data.csv"),
        "name,price,description,teacher\n\
         Rust 101,100,Intro to Rust,ada\n\
         Databases,200,Query engines,grace\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("member-data.csv"),
        "course_id,user_id,roles\n\
         1,3,std\n\
         2,3,ast\n\
         1,2,std\n",
    )
    .unwrap();
}

async fn count(db: &Database, table: &str) -> i64 {
    db.query(format!("SELECT VALUE count() FROM {table} GROUP ALL"))
        .await
        .unwrap()
        .take::<Option<i64>>(0)
        .unwrap()
        .unwrap_or(0)
}

async fn str_field(db: &Database, table: &str, id: i64, field: &str) -> Option<String> {
    db.query(format!("SELECT VALUE {field} FROM type::thing('{table}', $id)"))
        .bind(("id", id))
        .await
        .unwrap()
        .take::<Option<String>>(0)
        .unwrap()
}

async fn int_field(db: &Database, table: &str, id: i64, field: &str) -> Option<i64> {
    db.query(format!("SELECT VALUE {field} FROM type::thing('{table}', $id)"))
        .bind(("id", id))
        .await
        .unwrap()
        .take::<Option<i64>>(0)
        .unwrap()
}

async fn bool_field(db: &Database, table: &str, id: i64, field: &str) -> Option<bool> {
    db.query(format!("SELECT VALUE {field} FROM type::thing('{table}', $id)"))
        .bind(("id", id))
        .await
        .unwrap()
        .take::<Option<bool>>(0)
        .unwrap()
}

#[tokio::test]
async fn import_seeds_users_courses_and_members() {
    let db = db().await;
    let dir = tempfile::tempdir().unwrap();
    write_seed(dir.path());

    let report = import_all(&db, dir.path()).await.unwrap();

    assert_eq!((report.users.imported, report.users.skipped), (3, 0));
    assert_eq!((report.courses.imported, report.courses.skipped), (2, 0));
    assert_eq!((report.members.imported, report.members.skipped), (3, 0));

    // Row position becomes the id.
    assert_eq!(str_field(&db, "user", 1, "username").await.as_deref(), Some("ada"));
    assert_eq!(str_field(&db, "user", 3, "username").await.as_deref(), Some("linus"));

    // Passwords land hashed, never verbatim.
    let stored = str_field(&db, "user", 1, "password").await.unwrap();
    assert_ne!(stored, "s3cret");
    assert!(verify_password("s3cret", &stored).unwrap());

    // Imported accounts can manage their courses right away.
    assert_eq!(bool_field(&db, "user", 1, "is_staff").await, Some(true));
    assert_eq!(bool_field(&db, "user", 1, "is_superuser").await, Some(false));

    // Teachers are resolved from usernames to row ids.
    assert_eq!(int_field(&db, "course", 1, "teacher_id").await, Some(1));
    assert_eq!(int_field(&db, "course", 2, "teacher_id").await, Some(2));

    assert_eq!(str_field(&db, "member", 2, "roles").await.as_deref(), Some("ast"));
    assert_eq!(int_field(&db, "member", 3, "user_id").await, Some(2));
}

#[tokio::test]
async fn rerunning_the_import_changes_nothing() {
    let db = db().await;
    let dir = tempfile::tempdir().unwrap();
    write_seed(dir.path());

    import_all(&db, dir.path()).await.unwrap();
    let rerun = import_all(&db, dir.path()).await.unwrap();

    assert_eq!((rerun.users.imported, rerun.users.skipped), (0, 3));
    assert_eq!((rerun.courses.imported, rerun.courses.skipped), (0, 2));
    assert_eq!((rerun.members.imported, rerun.members.skipped), (0, 3));

    assert_eq!(count(&db, "user").await, 3);
    assert_eq!(count(&db, "course").await, 2);
    assert_eq!(count(&db, "member").await, 3);
}

#[tokio::test]
async fn bad_rows_are_skipped_without_aborting() {
    let db = db().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("user-data.csv"),
        "username,password,email,firstname,lastname\n\
         ada,s3cret,ada@example.com,Ada,Lovelace\n\
         grace,hopper1,grace@example.com,Grace\n\
         linus,kernelpw,linus@example.com,Linus,Torvalds\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("course-data.csv"),
        "name,price,description,teacher\n\
         Rust 101,100,Intro to Rust,ada\n\
         Bad Price,abc,unparsable,ada\n\
         Orphaned,50,nobody teaches this,nobody\n\
         Discounted,-5,below zero,ada\n\
         Databases,200,Query engines,linus\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("member-data.csv"),
        "course_id,user_id,roles\n\
         1,3,std\n\
         5,1,xyz\n\
         99,1,std\n\
         1,99,std\n\
         5,1,ast\n",
    )
    .unwrap();

    let report = import_all(&db, dir.path()).await.unwrap();

    assert_eq!((report.users.imported, report.users.skipped), (2, 1));
    assert_eq!((report.courses.imported, report.courses.skipped), (2, 3));
    assert_eq!((report.members.imported, report.members.skipped), (2, 3));

    // Skipped rows still consume their position, later references hold.
    assert_eq!(str_field(&db, "user", 3, "username").await.as_deref(), Some("linus"));
    assert_eq!(int_field(&db, "course", 5, "teacher_id").await, Some(3));
    assert_eq!(str_field(&db, "member", 5, "roles").await.as_deref(), Some("ast"));
    assert_eq!(count(&db, "course").await, 2);
}

#[tokio::test]
async fn counters_are_raised_past_the_imported_rows() {
    let db = db().await;
    let dir = tempfile::tempdir().unwrap();
    write_seed(dir.path());

    import_all(&db, dir.path()).await.unwrap();

    assert_eq!(db.next_id("user").await.unwrap(), 4);
    assert_eq!(db.next_id("course").await.unwrap(), 3);
    assert_eq!(db.next_id("member").await.unwrap(), 4);
}

#[tokio::test]
async fn a_missing_file_aborts_before_any_write() {
    let db = db().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("user-data.csv"),
        "username,password,email,firstname,lastname\n\
         ada,s3cret,ada@example.com,Ada,Lovelace\n",
    )
    .unwrap();

    let err = import_all(&db, dir.path()).await.unwrap_err();

    assert!(err.to_string().contains("course-data.csv"));
    assert_eq!(count(&db, "user").await, 0);
}
