//! Integration tests for the innkeeper CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd. None of
//! them reach a backend: drafts are checked offline and address trees are
//! read from files.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an innkeeper command isolated from the user's session and config
fn innkeeper(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("innkeeper").unwrap();
    cmd.current_dir(tmp.path())
        .env("INNKEEPER_SESSION_FILE", tmp.path().join("session.json"))
        .env("INNKEEPER_AUTHOR", "tester@example.com")
        .env("INNKEEPER_API_URL", "http://127.0.0.1:9/api/")
        .env_remove("INNKEEPER_PASSWORD")
        .env_remove("INNKEEPER_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

const VALID_DRAFT: &str = r#"
business:
  legalName: Lakeside Lodge Ltd
  businessTypeId: "1"
  ownershipTypeId: "2"
  registrationDate: "2019-03-14"
  contactPhone: "+256764521328"
  contactEmail: info@lakeside.ug
address:
  parishName: Nakasero I
  physicalAddress: Plot 12, Kyadondo Road
bankAccounts:
  - bankId: "10"
    accountName: Lakeside Lodge Ltd
    accountNumber: "9030012345678"
    accountTypeId: "3"
    isPrimary: true
contacts:
  - name: Grace Namubiru
    phone: "+256772000111"
    isPrimary: true
attachments:
  ownerNin: CM12345678ABCD
images:
  - front.jpg
  - pool.png
coverImage: 1
"#;

const ADDRESS_TREE: &str = r#"{
  "success": true,
  "data": {
    "regions": [{ "id": 1, "name": "Central" }],
    "districts": [{ "id": 10, "name": "Kampala", "regionId": 1 }],
    "counties": [{ "id": 100, "name": "Kampala Central Division", "districtId": 10 }],
    "subCounties": [{ "id": 1000, "name": "Nakasero", "countyId": 100 }],
    "parishes": [
      { "id": 5, "name": "Nakasero I", "subCountyId": 1000 },
      { "id": 6, "name": "Nakasero II", "subCountyId": 1000 }
    ]
  }
}"#;

/// Write a draft plus the image files it refers to
fn write_draft(tmp: &TempDir, name: &str, yaml: &str) {
    fs::write(tmp.path().join(name), yaml).unwrap();
    fs::write(tmp.path().join("front.jpg"), b"\xFF\xD8\xFF\xE0 jpeg").unwrap();
    fs::write(tmp.path().join("pool.png"), b"\x89PNG png").unwrap();
}

fn write_tree(tmp: &TempDir) {
    fs::write(tmp.path().join("tree.json"), ADDRESS_TREE).unwrap();
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("admin"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("innkeeper"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp).arg("checkin").assert().failure();
}

// ============================================================================
// Validate Command Tests
// ============================================================================

#[test]
fn test_validate_valid_draft() {
    let tmp = TempDir::new().unwrap();
    write_draft(&tmp, "lodge.yaml", VALID_DRAFT);

    innkeeper(&tmp)
        .args(["validate", "lodge.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All drafts passed validation"));
}

#[test]
fn test_validate_reports_field_paths() {
    let tmp = TempDir::new().unwrap();
    let draft = VALID_DRAFT
        .replace("\"+256764521328\"", "\"0764521328\"")
        .replace("isPrimary: true\ncontacts", "isPrimary: false\ncontacts");
    write_draft(&tmp, "lodge.yaml", &draft);

    innkeeper(&tmp)
        .args(["validate", "lodge.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("contactPhone"))
        .stderr(predicate::str::contains("Validation failed"));
}

#[test]
fn test_validate_accepts_spaced_phone_numbers() {
    let tmp = TempDir::new().unwrap();
    let draft = VALID_DRAFT
        .replace("\"+256764521328\"", "\"+256 764 521 328\"")
        .replace("\"+256772000111\"", "\"+256-772-000-111\"");
    write_draft(&tmp, "lodge.yaml", &draft);

    innkeeper(&tmp)
        .args(["validate", "lodge.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All drafts passed validation"));
}

#[test]
fn test_validate_reports_missing_images() {
    let tmp = TempDir::new().unwrap();
    let draft = VALID_DRAFT.replace("  - front.jpg\n  - pool.png\ncoverImage: 1\n", "  - gone.jpg\n");
    write_draft(&tmp, "lodge.yaml", &draft);

    innkeeper(&tmp)
        .args(["validate", "lodge.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("gone.jpg"));
}

#[test]
fn test_validate_directory_json() {
    let tmp = TempDir::new().unwrap();
    write_draft(&tmp, "good.yaml", VALID_DRAFT);
    fs::write(tmp.path().join("empty.yml"), "business:\n  legalName: Empty Inn\n").unwrap();

    let output = innkeeper(&tmp)
        .args(["validate", ".", "--format", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    let empty = reports
        .iter()
        .find(|r| r["path"].as_str().unwrap().ends_with("empty.yml"))
        .unwrap();
    assert!(empty["errors"]["business"]["businessTypeId"].is_string());
    assert!(empty["errors"]["images"].is_object());
}

#[test]
fn test_validate_warns_about_unknown_parish() {
    let tmp = TempDir::new().unwrap();
    write_tree(&tmp);
    write_draft(&tmp, "lodge.yaml", &VALID_DRAFT.replace("Nakasero I\n", "Atlantis\n"));

    innkeeper(&tmp)
        .args(["validate", "lodge.yaml", "--tree", "tree.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Atlantis"));
}

#[test]
fn test_validate_nothing_to_check() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No draft files"));
}

// ============================================================================
// Register Command Tests
// ============================================================================

#[test]
fn test_register_dry_run_prints_payload() {
    let tmp = TempDir::new().unwrap();
    write_draft(&tmp, "lodge.yaml", VALID_DRAFT);

    let output = innkeeper(&tmp)
        .args(["register", "--from", "lodge.yaml", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let registration = &payload["registration"];
    assert_eq!(registration["business"]["status"], "PENDING");
    assert_eq!(registration["business"]["createdBy"], "tester@example.com");
    assert!(registration["clientReference"]
        .as_str()
        .unwrap()
        .starts_with("REG-"));
    assert_eq!(registration["address"]["parishVerified"], false);
    assert_eq!(payload["coverImageIndex"], 1);
    assert_eq!(payload["files"].as_array().unwrap().len(), 2);
}

#[test]
fn test_register_dry_run_resolves_parish_from_tree() {
    let tmp = TempDir::new().unwrap();
    write_tree(&tmp);
    write_draft(&tmp, "lodge.yaml", VALID_DRAFT);

    let output = innkeeper(&tmp)
        .args(["register", "--from", "lodge.yaml", "--dry-run", "--tree", "tree.json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let address = &payload["registration"]["address"];
    assert_eq!(address["parishVerified"], true);
    assert_eq!(address["parishId"], "5");
    assert_eq!(address["regionName"], "Central");
}

#[test]
fn test_register_dry_run_stops_at_first_bad_step() {
    let tmp = TempDir::new().unwrap();
    write_draft(&tmp, "lodge.yaml", &VALID_DRAFT.replace("  physicalAddress: Plot 12, Kyadondo Road\n", ""));

    innkeeper(&tmp)
        .args(["register", "--from", "lodge.yaml", "--dry-run"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("physicalAddress"))
        .stderr(predicate::str::contains("Address"));
}

#[test]
fn test_register_dry_run_needs_draft() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp)
        .args(["register", "--dry-run"])
        .assert()
        .failure();
}

#[test]
fn test_register_requires_login() {
    let tmp = TempDir::new().unwrap();
    write_draft(&tmp, "lodge.yaml", VALID_DRAFT);

    innkeeper(&tmp)
        .args(["register", "--from", "lodge.yaml", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("logged in"));
}

// ============================================================================
// Address Command Tests
// ============================================================================

#[test]
fn test_address_search_from_tree() {
    let tmp = TempDir::new().unwrap();
    write_tree(&tmp);

    innkeeper(&tmp)
        .args(["address", "search", "nakasero", "--tree", "tree.json", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5\tNakasero I\tNakasero\tKampala Central Division\tKampala\tCentral"))
        .stdout(predicate::str::contains("Nakasero II"));
}

#[test]
fn test_address_search_no_match() {
    let tmp = TempDir::new().unwrap();
    write_tree(&tmp);

    innkeeper(&tmp)
        .args(["address", "search", "Gulu", "--tree", "tree.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No parish matches"));
}

#[test]
fn test_address_resolve_json() {
    let tmp = TempDir::new().unwrap();
    write_tree(&tmp);

    let output = innkeeper(&tmp)
        .args(["address", "resolve", "6", "--tree", "tree.json", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let chains: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(chains[0]["parish"], "Nakasero II");
    assert_eq!(chains[0]["district"], "Kampala");
}

#[test]
fn test_address_resolve_unknown_id() {
    let tmp = TempDir::new().unwrap();
    write_tree(&tmp);

    innkeeper(&tmp)
        .args(["address", "resolve", "404", "--tree", "tree.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown parish id"));
}

// ============================================================================
// Session, Config and Completions Tests
// ============================================================================

#[test]
fn test_logout_without_session() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_logout_removes_session_file() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("session.json");
    fs::write(
        &session,
        r#"{"token":"tok","user":{"id":"1","email":"owner@lakeside.ug","name":"Grace","role":"owner"}}"#,
    )
    .unwrap();

    innkeeper(&tmp)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("owner@lakeside.ug"));
    assert!(!session.exists());
}

#[test]
fn test_admin_requires_admin_role() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("session.json"),
        r#"{"token":"tok","user":{"id":"1","email":"owner@lakeside.ug","role":"owner"}}"#,
    )
    .unwrap();

    innkeeper(&tmp)
        .args(["admin", "pending"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an admin"));
}

#[test]
fn test_config_show_key_uses_env() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp)
        .args(["config", "show", "author"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tester@example.com"));
}

#[test]
fn test_config_set_local_then_show() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp)
        .args(["config", "set", "timeout_secs", "45"])
        .assert()
        .success();
    assert!(tmp.path().join(".innkeeper.yaml").exists());

    innkeeper(&tmp)
        .args(["config", "show", "timeout_secs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("45"));

    innkeeper(&tmp)
        .args(["config", "unset", "timeout_secs"])
        .assert()
        .success();
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp)
        .args(["config", "set", "editor", "vim"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_path_lists_session_file() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("session.json"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    innkeeper(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("innkeeper"));
}
