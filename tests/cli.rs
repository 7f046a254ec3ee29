//! CLI smoke tests for shelfsync.
//!
//! Everything here fails or finishes before any network call: argument
//! parsing, field validation, and settings resolution.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const SETTINGS_ENV: &[&str] = &[
    "SHELFSYNC_CATALOG_URL",
    "SHELFSYNC_CONFIG",
    "SHELFSYNC_PER_PAGE",
    "SHELFSYNC_SPREADSHEET",
    "SHELFSYNC_GOOGLE_TOKEN",
    "WOOCOMMERCE_CONSUMER_KEY",
    "WOOCOMMERCE_CONSUMER_SECRET",
    "GOOGLE_ACCESS_TOKEN",
    "RUST_LOG",
];

/// A shelfsync command isolated from the caller's home, env, and `.env`.
fn shelfsync(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("shelfsync");
    cmd.current_dir(home.path()).env("HOME", home.path());
    for name in SETTINGS_ENV {
        cmd.env_remove(name);
    }
    cmd
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    shelfsync(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export").and(predicate::str::contains("import")));
}

#[test]
fn version_prints_package_version() {
    let home = TempDir::new().unwrap();
    shelfsync(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn completions_generate_script() {
    let home = TempDir::new().unwrap();
    shelfsync(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shelfsync"));
}

// =============================================================================
// Argument errors
// =============================================================================

#[test]
fn export_requires_fields() {
    let home = TempDir::new().unwrap();
    shelfsync(&home).arg("export").assert().failure();
}

#[test]
fn unknown_field_is_rejected_with_suggestion() {
    let home = TempDir::new().unwrap();
    shelfsync(&home)
        .args(["export", "--fields", "prise"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("UNRECOGNIZED_FIELD")
                .and(predicate::str::contains("Did you mean: price?")),
        );
}

#[test]
fn star_mixed_with_names_is_rejected() {
    let home = TempDir::new().unwrap();
    shelfsync(&home)
        .args(["import", "-f", "*", "price"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("INVALID_ARGUMENT"));
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn import_without_catalog_url_fails() {
    let home = TempDir::new().unwrap();
    shelfsync(&home)
        .args(["import", "--fields", "price", "--dry-run"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("MISSING_SETTING")
                .and(predicate::str::contains("SHELFSYNC_CATALOG_URL")),
        );
}

#[test]
fn missing_google_token_is_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("shelfsync.json");
    std::fs::write(
        &config,
        r#"{
            "catalog_url": "https://shop.example.com/wp-json/wc/v3",
            "consumer_key": "ck_test",
            "consumer_secret": "cs_test"
        }"#,
    )
    .unwrap();

    shelfsync(&home)
        .args(["export", "-f", "price", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GOOGLE_ACCESS_TOKEN"));
}

#[test]
fn unreadable_config_file_is_a_config_error() {
    let home = TempDir::new().unwrap();
    shelfsync(&home)
        .args(["export", "-f", "price", "--config", "does-not-exist.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("CONFIG_ERROR"));
}

#[test]
fn json_errors_include_hint() {
    let home = TempDir::new().unwrap();
    shelfsync(&home)
        .args(["export", "-f", "prise", "--json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\"hint\""));
}
