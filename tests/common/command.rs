use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_strata_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

pub fn run_strata_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("strata").expect("Failed to find strata binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Persisted index as raw JSON
pub fn read_index(dir: &Path) -> serde_json::Value {
    let content =
        std::fs::read(dir.join(".strata").join("index")).expect("Failed to read index file");
    serde_json::from_slice(&content).expect("Index is not valid JSON")
}

/// Digest recorded in the persisted index for `path`
pub fn staged_oid(dir: &Path, path: &str) -> Option<String> {
    read_index(dir)["entries"][path]["oid"]
        .as_str()
        .map(str::to_string)
}
