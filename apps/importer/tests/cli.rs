use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn write_seed(dir: &Path) {
    std::fs::write(
        dir.join("user-data.csv"),
        "username,password,email,firstname,lastname\n\
         ada,s3cret,ada@example.com,Ada,Lovelace\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("course-data.csv"),
        "name,price,description,teacher\n\
         Rust 101,100,Intro to Rust,ada\n",
    )
    .unwrap();
    std::fs::write(dir.join("member-data.csv"), "course_id,user_id,roles\n1,1,std\n").unwrap();
}

#[test]
fn a_full_run_succeeds_against_the_embedded_engine() {
    let dir = tempfile::tempdir().unwrap();
    write_seed(dir.path());

    Command::cargo_bin("slms-importer")
        .expect("bin")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success();
}

#[test]
fn a_missing_file_fails_and_names_the_path() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("slms-importer")
        .expect("bin")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("user-data.csv"));
}

#[test]
fn the_directory_argument_is_required() {
    Command::cargo_bin("slms-importer")
        .expect("bin")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dir"));
}
