//! Integration tests driving the `dit` binary end to end

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command running inside the given workspace as inspector "jdoe"
fn dit(ws: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dit").unwrap();
    cmd.current_dir(ws.path()).env("DIT_AUTHOR", "jdoe");
    cmd
}

/// A command running as the QC reviewer "qchu"
fn dit_as(ws: &TempDir, author: &str) -> Command {
    let mut cmd = Command::cargo_bin("dit").unwrap();
    cmd.current_dir(ws.path()).env("DIT_AUTHOR", author);
    cmd
}

/// Initialize a workspace with a roster, project, phase, spec, and item
fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    dit(&tmp).args(["init", "."]).assert().success();
    dit(&tmp).args(["team", "init"]).assert().success();
    dit(&tmp)
        .args([
            "team", "add", "-n", "Jane Doe", "-e", "jdoe@example.com", "-u", "jdoe", "-r",
            "inspector",
        ])
        .assert()
        .success();
    dit(&tmp)
        .args([
            "team", "add", "-n", "Quinn Chu", "-e", "qchu@example.com", "-u", "qchu", "-r",
            "quality",
        ])
        .assert()
        .success();

    dit(&tmp)
        .args([
            "project",
            "new",
            "--name",
            "Runway 9L Rehab",
            "--contract",
            "FAA-2026-017",
        ])
        .assert()
        .success();
    dit(&tmp)
        .args(["phase", "new", "--name", "Phase 1 - Paving"])
        .assert()
        .success();
    dit(&tmp)
        .args([
            "spec",
            "new",
            "-c",
            "P-401",
            "-d",
            "Asphalt Mix Pavement",
            "-Q",
            "Tack coat applied?",
            "-Q",
            "Mat temperature within range?",
        ])
        .assert()
        .success();
    dit(&tmp)
        .args([
            "item", "new", "-p", "PRJ@1", "-s", "SPEC@1", "-c", "P-401", "-d",
            "Asphalt Mix Pavement", "-u", "TON",
        ])
        .assert()
        .success();
    tmp
}

/// Create a report with the standard seed references
fn new_report(ws: &TempDir) {
    dit(ws)
        .args([
            "report", "new", "-p", "PRJ@1", "--phase", "PHS@1", "-d", "2026-08-01", "--dir",
            "001", "--shift-start", "07:00", "--shift-end", "15:30",
        ])
        .assert()
        .success();
}

#[test]
fn test_init_creates_workspace_structure() {
    let tmp = TempDir::new().unwrap();
    dit(&tmp).args(["init", "."]).assert().success();

    assert!(tmp.path().join(".dit/config.yaml").exists());
    assert!(tmp.path().join("projects").is_dir());
    assert!(tmp.path().join("reports").is_dir());
}

#[test]
fn test_report_starts_creating_with_derived_pass() {
    let ws = workspace();
    new_report(&ws);

    dit(&ws)
        .args(["report", "show", "DIR@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: creating"))
        .stdout(predicate::str::contains("result: pass"));
}

#[test]
fn test_report_requires_project_and_phase() {
    let ws = workspace();
    dit(&ws)
        .args([
            "report", "new", "-p", "PRJ@9", "--phase", "PHS@1", "-d", "2026-08-01",
        ])
        .assert()
        .failure();
}

#[test]
fn test_result_derivation_over_cli_saves() {
    let ws = workspace();
    new_report(&ws);

    // A pending QA test downgrades the report to pending
    dit(&ws)
        .args(["report", "add-qa", "DIR@1", "-t", "nuclear_gauge", "-r", "pending"])
        .assert()
        .success();
    dit(&ws)
        .args(["report", "show", "DIR@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result: pending"));

    // An NCR outranks the pending test
    dit(&ws)
        .args(["report", "set", "DIR@1", "--deficiency", "ncr"])
        .assert()
        .success();
    dit(&ws)
        .args(["report", "show", "DIR@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result: fail"));
}

#[test]
fn test_workflow_submit_approve_forces_pass() {
    let ws = workspace();
    new_report(&ws);

    dit(&ws)
        .args(["report", "add-qa", "DIR@1", "-t", "compaction", "-r", "fail"])
        .assert()
        .success();

    dit(&ws).args(["submit", "DIR@1"]).assert().success();
    dit(&ws)
        .args(["report", "show", "DIR@1"])
        .assert()
        .stdout(predicate::str::contains("status: qc_review"));

    // The inspector may not approve; QC may, and approval forces pass
    dit(&ws).args(["approve", "DIR@1"]).assert().failure();
    dit_as(&ws, "qchu")
        .args(["approve", "DIR@1"])
        .assert()
        .success();

    dit(&ws)
        .args(["report", "show", "DIR@1"])
        .assert()
        .stdout(predicate::str::contains("status: authorization"))
        .stdout(predicate::str::contains("result: pass"));
}

#[test]
fn test_revision_request_logs_identified_actor() {
    let ws = workspace();
    new_report(&ws);
    dit(&ws).args(["submit", "DIR@1"]).assert().success();

    dit_as(&ws, "qchu")
        .args(["revise", "DIR@1", "-n", "Missing density tests"])
        .assert()
        .success();

    dit(&ws)
        .args(["report", "show", "DIR@1"])
        .assert()
        .stdout(predicate::str::contains("status: revise"))
        .stdout(predicate::str::contains("result: fail"))
        .stdout(predicate::str::contains("actor: qchu"))
        .stdout(predicate::str::contains("Missing density tests"));
}

#[test]
fn test_revision_rejects_unknown_actor() {
    let ws = workspace();
    new_report(&ws);

    dit_as(&ws, "ghost")
        .args(["revise", "DIR@1", "-n", "who am I"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not on the team"));
}

#[test]
fn test_item_code_unique_within_project_only() {
    let ws = workspace();

    // Same code in the same project is rejected
    dit(&ws)
        .args([
            "item", "new", "-p", "PRJ@1", "-s", "SPEC@1", "-c", "P-401", "-d", "Duplicate",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    // Same code in a different project succeeds
    dit(&ws)
        .args([
            "project", "new", "--name", "Taxiway B", "--contract", "C-1002",
        ])
        .assert()
        .success();
    dit(&ws)
        .args([
            "item", "new", "-p", "PRJ@2", "-s", "SPEC@1", "-c", "P-401", "-d", "Same code",
        ])
        .assert()
        .success();
}

#[test]
fn test_delete_bid_item_in_use_is_rejected() {
    let ws = workspace();
    new_report(&ws);
    dit(&ws)
        .args(["report", "add-qty", "DIR@1", "-i", "ITEM@1", "-n", "250"])
        .assert()
        .success();

    dit(&ws)
        .args(["item", "delete", "ITEM@1", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reference it"));

    // Both records are intact
    dit(&ws)
        .args(["item", "show", "ITEM@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P-401"));
    dit(&ws)
        .args(["report", "show", "DIR@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quantity: 250"));
}

#[test]
fn test_item_checklist_resolution_prefers_override() {
    let ws = workspace();

    // Spec default applies while the item has no override
    dit(&ws)
        .args(["item", "checklist", "ITEM@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tack coat applied?"));

    // A non-empty override wins verbatim
    dit(&ws)
        .args(["item", "questions", "ITEM@1", "--set", "Edge compaction checked?"])
        .assert()
        .success();
    dit(&ws)
        .args(["item", "checklist", "ITEM@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Edge compaction checked?"))
        .stdout(predicate::str::contains("Tack coat applied?").not());

    // Clearing the override falls back to the spec default
    dit(&ws)
        .args(["item", "questions", "ITEM@1", "--clear"])
        .assert()
        .success();
    dit(&ws)
        .args(["item", "checklist", "ITEM@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tack coat applied?"));
}

#[test]
fn test_checklist_save_json_contract() {
    let ws = workspace();
    new_report(&ws);

    dit(&ws)
        .args([
            "checklist",
            "save",
            "-r",
            "DIR@1",
            "-s",
            "SPEC@1",
            "-a",
            r#"{"Tack coat applied?":"Yes"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status":"success""#))
        .stdout(predicate::str::contains(r#""code":"P-401""#));

    // A malformed answer value is the error envelope with exit 1
    dit(&ws)
        .args([
            "checklist",
            "save",
            "-r",
            "DIR@1",
            "-s",
            "SPEC@1",
            "-a",
            r#"{"Tack coat applied?":"Maybe"}"#,
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""status":"error""#));

    dit(&ws)
        .args(["checklist", "show", "DIR@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tack coat applied?: Yes"));
}

#[test]
fn test_csv_master_log_rows() {
    let ws = workspace();
    new_report(&ws);
    dit(&ws)
        .args([
            "report", "add-qty", "DIR@1", "-i", "ITEM@1", "-n", "250", "--location",
            "Sta 10+00",
        ])
        .assert()
        .success();

    dit(&ws)
        .args(["report", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DIR #,Start Date,End Date,Inspector"))
        .stdout(predicate::str::contains("P-401"))
        .stdout(predicate::str::contains("TON"))
        .stdout(predicate::str::contains("Sta 10+00"));

    // A report with no placed quantities still gets a placeholder row
    dit(&ws)
        .args([
            "report", "new", "-p", "PRJ@1", "--phase", "PHS@1", "-d", "2026-08-02", "--dir",
            "002",
        ])
        .assert()
        .success();
    dit(&ws)
        .args(["report", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No Activity"));
}

#[test]
fn test_csv_filter_by_status() {
    let ws = workspace();
    new_report(&ws);
    dit(&ws).args(["submit", "DIR@1"]).assert().success();

    dit(&ws)
        .args(["report", "csv", "--status", "creating"])
        .assert()
        .success()
        .stdout(predicate::str::contains("001").not());

    dit(&ws)
        .args(["report", "csv", "--status", "qc_review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("001"));
}

#[test]
fn test_export_writes_docx() {
    let ws = workspace();
    new_report(&ws);
    dit(&ws)
        .args(["report", "add-qty", "DIR@1", "-i", "ITEM@1", "-n", "100"])
        .assert()
        .success();

    dit(&ws).args(["export", "DIR@1"]).assert().success();

    let path = ws.path().join("DIR_001_2026-08-01.docx");
    assert!(path.exists());
    // A .docx is a zip archive; check the magic bytes
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_report_list_filters_by_inspector() {
    let ws = workspace();
    new_report(&ws);

    dit(&ws)
        .args(["report", "list", "--inspector", "jdoe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("001"));

    dit(&ws)
        .args(["report", "list", "--inspector", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("001").not());
}

#[test]
fn test_phase_delete_in_use_rejected() {
    let ws = workspace();
    new_report(&ws);

    dit(&ws)
        .args(["phase", "delete", "PHS@1", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reference it"));

    dit(&ws)
        .args(["report", "delete", "DIR@1", "-y"])
        .assert()
        .success();
    dit(&ws)
        .args(["phase", "delete", "PHS@1", "-y"])
        .assert()
        .success();
}
