use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_config(dir: &Path, manifest: &Path, extra: &str) -> std::path::PathBuf {
    let path = dir.join("harvest.yaml");
    let yaml = format!(
        "manifest: {}\ndata_dir: {}\n{extra}",
        manifest.display(),
        dir.join("data").display()
    );
    fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn harvest_converts_repositories_already_on_disk() {
    let tmp = tempdir().unwrap();
    let manifest = tmp.path().join("repos.jsonl");
    fs::write(&manifest, "\"someone/demo\"\n").unwrap();

    let repo = tmp.path().join("data/repos/demo");
    fs::create_dir_all(repo.join(".git")).unwrap();
    fs::write(repo.join("README.md"), "one\ntwo\n").unwrap();
    fs::write(repo.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();

    let config = write_config(tmp.path(), &manifest, "");
    Command::cargo_bin("repo-harvest")
        .unwrap()
        .args(["harvest", "--config"])
        .arg(&config)
        .env_remove("REPO_HARVEST_BASE_URL")
        .env_remove("REPO_HARVEST_LIMIT")
        .assert()
        .success()
        .stdout(predicate::str::contains("converted demo (1 records)"));

    let artifact = fs::read_to_string(tmp.path().join("data/jsonl/demo.jsonl")).unwrap();
    assert_eq!(artifact.lines().count(), 1);
    let record: serde_json::Value = serde_json::from_str(artifact.trim_end()).unwrap();
    assert_eq!(record["line_count"], 3);
    assert_eq!(record["category"], "text");
}

#[test]
fn clone_failures_do_not_fail_the_run() {
    let tmp = tempdir().unwrap();
    let manifest = tmp.path().join("repos.jsonl");
    fs::write(&manifest, "\"nobody/missing\"\n").unwrap();

    let config = write_config(tmp.path(), &manifest, "");
    let unreachable = format!("file://{}", tmp.path().join("no-such-remote").display());
    Command::cargo_bin("repo-harvest")
        .unwrap()
        .args(["harvest", "--config"])
        .arg(&config)
        .env("REPO_HARVEST_BASE_URL", unreachable)
        .env_remove("REPO_HARVEST_LIMIT")
        .assert()
        .success()
        .stdout(predicate::str::contains("failed to clone: nobody/missing"));

    assert!(!tmp.path().join("data/repos/missing").exists());
}

#[test]
fn missing_manifest_exits_with_failure() {
    let tmp = tempdir().unwrap();
    let config = write_config(tmp.path(), &tmp.path().join("absent.jsonl"), "");

    Command::cargo_bin("repo-harvest")
        .unwrap()
        .args(["harvest", "--config"])
        .arg(&config)
        .env_remove("REPO_HARVEST_LIMIT")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn convert_subcommand_writes_a_single_artifact() {
    let tmp = tempdir().unwrap();
    let repo = tmp.path().join("local-project");
    fs::create_dir_all(&repo).unwrap();
    fs::write(repo.join("build.mk"), "all:\n").unwrap();
    let out = tmp.path().join("out");

    Command::cargo_bin("repo-harvest")
        .unwrap()
        .args(["convert", "--repo"])
        .arg(&repo)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 records"));

    Command::cargo_bin("repo-harvest")
        .unwrap()
        .args(["convert", "--repo"])
        .arg(&repo)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Already converted"));
}
