use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use common::command::{init_repository_dir, run_strata_command};
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use predicates::prelude::predicate;
use rstest::rstest;
use sha2::{Digest, Sha256};

mod common;

fn write_fake_file(dir: &TempDir) -> Result<(String, String), Box<dyn std::error::Error>> {
    let file_name = format!("{}.txt", Word().fake::<String>());
    let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
    dir.child(&file_name).write_str(&file_content)?;

    Ok((file_name, file_content))
}

fn stdout_line(output: std::process::Output) -> Result<String, Box<dyn std::error::Error>> {
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

#[rstest]
fn hash_object_prints_sha256_digest(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let (file_name, file_content) = write_fake_file(&init_repository_dir)?;
    let expected = format!("{:x}", Sha256::digest(file_content.as_bytes()));

    run_strata_command(init_repository_dir.path(), &["hash-object", &file_name])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[0-9a-f]{64}\n$")?)
        .stdout(predicate::str::contains(expected.clone()));

    // without -w nothing is stored
    let object_path = init_repository_dir
        .path()
        .join(".strata/objects")
        .join(&expected[..2])
        .join(&expected[2..]);
    assert!(!object_path.exists());

    Ok(())
}

#[rstest]
fn written_blob_is_readable_with_cat_file(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let (file_name, file_content) = write_fake_file(&init_repository_dir)?;

    let output = run_strata_command(init_repository_dir.path(), &["hash-object", "-w", &file_name])
        .output()?;
    let oid = stdout_line(output)?;
    assert!(
        init_repository_dir
            .path()
            .join(".strata/objects")
            .join(&oid[..2])
            .join(&oid[2..])
            .is_file()
    );

    run_strata_command(init_repository_dir.path(), &["cat-file", &oid])
        .assert()
        .success()
        .stdout(predicate::eq(file_content.clone()));

    run_strata_command(init_repository_dir.path(), &["cat-file", &oid[..8]])
        .assert()
        .success()
        .stdout(predicate::eq(file_content));

    Ok(())
}

#[rstest]
fn cat_file_of_unknown_object_fails(init_repository_dir: TempDir) {
    let unknown = format!("{:x}", Sha256::digest(b"never stored"));

    run_strata_command(init_repository_dir.path(), &["cat-file", &unknown])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    run_strata_command(init_repository_dir.path(), &["cat-file", "not-hex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid object id"));
}
