use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use repo_harvest::load_config::{load_config, BASE_URL_ENV, LIMIT_ENV};

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

fn clear_env() {
    env::remove_var(BASE_URL_ENV);
    env::remove_var(LIMIT_ENV);
}

#[test]
#[serial]
fn data_dir_layout_is_expanded() {
    clear_env();
    let file = config_file(
        r#"
manifest: sources/github_repos.jsonl
data_dir: ./data/raw/github
limit: 3
concurrency: 4
"#,
    );

    let config = load_config(file.path()).expect("Config should load");
    assert_eq!(config.manifest_path, PathBuf::from("sources/github_repos.jsonl"));
    assert_eq!(config.clone_root, PathBuf::from("./data/raw/github/repos"));
    assert_eq!(config.output_dir, PathBuf::from("./data/raw/github/jsonl"));
    assert_eq!(config.limit, Some(3));
    assert_eq!(config.concurrency, 4);
    assert_eq!(config.base_url, "https://github.com");
}

#[test]
#[serial]
fn explicit_directories_and_base_url() {
    clear_env();
    let file = config_file(
        r#"
manifest: repos.jsonl
clone_root: /srv/clones
output_dir: /srv/corpus
base_url: https://git.example.org
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.clone_root, PathBuf::from("/srv/clones"));
    assert_eq!(config.output_dir, PathBuf::from("/srv/corpus"));
    assert_eq!(config.base_url, "https://git.example.org");
    assert_eq!(config.limit, None);
    assert_eq!(config.concurrency, 1);
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    clear_env();
    let file = config_file("manifest: m.jsonl\ndata_dir: d\nlimit: 50\n");
    env::set_var(BASE_URL_ENV, "file:///mirror");
    env::set_var(LIMIT_ENV, "2");

    let config = load_config(file.path()).unwrap();
    clear_env();

    assert_eq!(config.base_url, "file:///mirror");
    assert_eq!(config.limit, Some(2));
}

#[test]
#[serial]
fn non_numeric_limit_env_is_rejected() {
    clear_env();
    let file = config_file("manifest: m.jsonl\ndata_dir: d\n");
    env::set_var(LIMIT_ENV, "lots");

    let err = load_config(file.path()).unwrap_err();
    clear_env();
    assert!(err.to_string().contains(LIMIT_ENV), "got: {err}");
}

#[test]
#[serial]
fn missing_directory_layout_is_rejected() {
    clear_env();
    let file = config_file("manifest: m.jsonl\nclone_root: only-one\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("data_dir"), "got: {err}");
}

#[test]
#[serial]
fn invalid_yaml_is_reported_as_parse_error() {
    clear_env();
    let file = config_file("not-yaml: [:::");
    let err = load_config(file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("parse") || msg.contains("YAML"), "got: {msg}");
}
