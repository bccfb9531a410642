//! Runs the `snip` binary against a temporary repository.

use snip_object::{ContentHash, FsRepository, ObjectKind, ObjectStore, Repository};
use snip_test_utils::{build_tree, dir, file, lookup, sample_snapshot};
use std::path::Path;
use std::process::{Command, Output};

fn seeded_repository(root: &Path) -> ContentHash {
    let repo = FsRepository::init(root).unwrap();
    let tree = build_tree(&repo, &[dir("a", vec![file("b.txt"), file("c.txt")])]);
    repo.flush().unwrap();
    repo.save_index().unwrap();
    repo.save_unpacked(ObjectKind::Snapshot, &sample_snapshot(tree))
        .unwrap()
}

fn snip(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_snip"))
        .args(args)
        .env_remove("SNIP_REPOSITORY")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn erase_prints_new_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let original = seeded_repository(tmp.path());
    let repo = tmp.path().to_str().unwrap();

    let output = snip(&["--repo", repo, "erase", "--snapshot", &original.to_string()[..10], "a/b.txt"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let id: ContentHash = stdout.trim().strip_prefix("new snapshot ").unwrap().parse().unwrap();

    let reopened = FsRepository::open(tmp.path()).unwrap();
    let forged = reopened.load_snapshot(&id).unwrap();
    assert!(lookup(&reopened, &forged.tree, "a/b.txt").is_none());
    assert!(lookup(&reopened, &forged.tree, "a/c.txt").is_some());
    assert_eq!(reopened.list_snapshots().unwrap().len(), 2);
}

#[test]
fn repository_from_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let repo_dir = tmp.path().join("repo");
    seeded_repository(&repo_dir);
    let config = tmp.path().join("snip.toml");
    std::fs::write(
        &config,
        format!("[repository]\npath = {:?}\n", repo_dir.to_str().unwrap()),
    )
    .unwrap();

    let output = snip(&[
        "--config",
        config.to_str().unwrap(),
        "erase",
        "--snapshot",
        "latest",
        "--host",
        "laptop",
        "a/c.txt",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn unknown_snapshot_exits_with_one() {
    let tmp = tempfile::tempdir().unwrap();
    seeded_repository(tmp.path());

    let output = snip(&[
        "--repo",
        tmp.path().to_str().unwrap(),
        "erase",
        "--snapshot",
        "latest",
        "--host",
        "elsewhere",
        "a/b.txt",
    ]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_path_exits_with_two() {
    let tmp = tempfile::tempdir().unwrap();
    seeded_repository(tmp.path());

    let output = snip(&[
        "--repo",
        tmp.path().to_str().unwrap(),
        "erase",
        "--snapshot",
        "latest",
        "a/zzz",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("path \"a/zzz\" not found in snapshot"), "{stderr}");
    assert_eq!(stderr.matches("not found in snapshot").count(), 1, "{stderr}");
    assert_eq!(FsRepository::open(tmp.path()).unwrap().list_snapshots().unwrap().len(), 1);
}

#[test]
fn missing_repository_is_a_failure() {
    let output = snip(&["erase", "--snapshot", "latest", "a"]);
    assert_eq!(output.status.code(), Some(2));
}
