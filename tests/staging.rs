use assert_fs::TempDir;
use common::command::repository_dir;
use common::file::{FileSpec, write_file, write_generated_files};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::{Path, PathBuf};
use strata::areas::repository::Repository;
use strata::artifacts::index::stage_outcome::StagingReport;
use strata::artifacts::objects::object_id::ObjectId;
use strata::errors::Error;

mod common;

async fn init_repository(dir: &Path) -> Result<Repository, Box<dyn std::error::Error>> {
    let mut repository = Repository::new(&dir.to_string_lossy(), Box::new(std::io::sink()))?;
    repository.init().await?;

    Ok(repository)
}

async fn staged_oid(repository: &Repository, path: &str) -> Option<ObjectId> {
    let index = repository.index();
    let index = index.lock().await;
    index.entry_by_path(Path::new(path)).map(|entry| entry.oid.clone())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_batch_stages_every_distinct_file(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let repository = init_repository(repository_dir.path()).await?;
    let files = write_generated_files(repository_dir.path(), 64);

    let report = repository
        .add_to_index(files.iter().map(|file| file.path.clone()).collect())
        .await?;

    assert_eq!(report.added, 64);

    // a fresh load sees every entry with its content stored
    let reloaded = Repository::new(&repository_dir.path().to_string_lossy(), Box::new(std::io::sink()))?;
    let index = reloaded.index();
    let mut index = index.lock().await;
    index.rehydrate()?;
    assert_eq!(index.len(), 64);
    for file in &files {
        let relative = file.path.strip_prefix(repository_dir.path())?;
        let entry = index.entry_by_path(relative).expect("file is staged");
        assert_eq!(
            reloaded.database().read(&entry.oid)?.to_vec(),
            file.content.as_bytes().to_vec()
        );
    }

    Ok(())
}

#[rstest]
#[tokio::test]
async fn staging_unchanged_content_twice_keeps_digest(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let repository = init_repository(repository_dir.path()).await?;
    let path = repository_dir.path().join("stable.txt");
    write_file(FileSpec::new(path.clone(), "stable content".repeat(1000)));

    repository.add_to_index(vec![path.clone()]).await?;
    let first = staged_oid(&repository, "stable.txt").await;

    // a newer mtime alone is not a change
    filetime::set_file_mtime(&path, filetime::FileTime::from_unix_time(2_000_000_000, 0))?;
    let report = repository.add_to_index(vec![path]).await?;

    assert_eq!(
        report,
        StagingReport {
            unchanged: 1,
            ..Default::default()
        }
    );
    assert_eq!(staged_oid(&repository, "stable.txt").await, first);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn staging_changed_content_updates_digest(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let repository = init_repository(repository_dir.path()).await?;
    let path = repository_dir.path().join("draft.md");
    write_file(FileSpec::new(path.clone(), "# Draft\n".repeat(600)));
    repository.add_to_index(vec![path.clone()]).await?;
    let first = staged_oid(&repository, "draft.md").await.expect("staged");

    let updated = format!("{}\nappendix", "# Draft\n".repeat(600));
    write_file(FileSpec::new(path.clone(), updated.clone()));
    let report = repository.add_to_index(vec![path]).await?;

    assert_eq!(report.updated, 1);
    let second = staged_oid(&repository, "draft.md").await.expect("staged");
    assert_ne!(first, second);
    assert_eq!(second, ObjectId::hash(updated.as_bytes()));
    assert_eq!(repository.database().read(&second)?.to_vec(), updated.into_bytes());

    Ok(())
}

#[rstest]
#[tokio::test]
async fn ignored_files_never_reach_the_index(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = repository_dir.path();
    let repository = init_repository(root).await?;
    write_file(FileSpec::new(root.join(".strataignore"), "logs/\n".to_string()));
    write_file(FileSpec::new(root.join("logs/debug.log"), "noise".to_string()));
    write_file(FileSpec::new(root.join("not_logs/debug.log"), "kept".to_string()));

    let report = repository
        .add_to_index(vec![root.join("logs/debug.log"), root.join("not_logs/debug.log")])
        .await?;

    assert_eq!(report.ignored, 1);
    assert_eq!(report.added, 1);
    assert!(staged_oid(&repository, "logs/debug.log").await.is_none());
    assert!(staged_oid(&repository, "not_logs/debug.log").await.is_some());

    Ok(())
}

#[rstest]
#[tokio::test]
async fn partial_failure_persists_nothing(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = repository_dir.path();
    let repository = init_repository(root).await?;
    let files = write_generated_files(root, 4);
    let index_before = std::fs::read(root.join(".strata/index"))?;

    let mut batch = files.iter().map(|file| file.path.clone()).collect::<Vec<_>>();
    batch.push(root.join("missing.txt"));
    let result = repository.add_to_index(batch).await;

    match result {
        Err(Error::Staging { failures }) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, PathBuf::from("missing.txt"));
            assert!(matches!(failures[0].1, Error::Io { .. }));
        }
        other => panic!("expected a staging failure, got {:?}", other.map(|_| ())),
    }
    assert_eq!(std::fs::read(root.join(".strata/index"))?, index_before);
    for file in &files {
        let relative = file.path.strip_prefix(root)?.to_string_lossy().into_owned();
        assert!(staged_oid(&repository, &relative).await.is_none(), "{relative}");
    }

    Ok(())
}

#[rstest]
#[tokio::test]
async fn negated_patterns_never_stage_metadata_files(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = repository_dir.path();
    let repository = init_repository(root).await?;
    write_file(FileSpec::new(root.join(".strataignore"), "*.log\n!config\n!*\n".to_string()));

    let report = repository
        .add_to_index(vec![
            root.join(".strata/config"),
            root.join(".strata/HEAD"),
            root.join(".strata/index"),
        ])
        .await?;

    assert_eq!(
        report,
        StagingReport {
            ignored: 3,
            ..Default::default()
        }
    );
    assert!(staged_oid(&repository, ".strata/config").await.is_none());

    Ok(())
}
