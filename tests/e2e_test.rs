/// End-to-end tests for the CLI
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const NODE_PROJECT: &str = "tests/fixtures/node-project";
const RUBY_PROJECT: &str = "tests/fixtures/ruby-project";

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: Success - nothing risky reported offline
    #[test]
    fn test_exit_code_success() {
        cargo_bin_cmd!("package-audit")
            .args([NODE_PROJECT, "--offline"])
            .assert()
            .code(0);
    }

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("package-audit").arg("--help").assert().code(0);
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        cargo_bin_cmd!("package-audit")
            .arg("--version")
            .assert()
            .code(0)
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        cargo_bin_cmd!("package-audit")
            .arg("--invalid-option")
            .assert()
            .code(2);
    }

    /// Exit code 2: Invalid format value
    #[test]
    fn test_exit_code_invalid_format() {
        cargo_bin_cmd!("package-audit")
            .args([NODE_PROJECT, "-f", "invalid_format"])
            .assert()
            .code(2);
    }

    /// Exit code 2: Invalid technology value
    #[test]
    fn test_exit_code_invalid_technology() {
        cargo_bin_cmd!("package-audit")
            .args([NODE_PROJECT, "-t", "python"])
            .assert()
            .code(2);
    }

    /// Exit code 2: Settings rejected before any work
    #[test]
    fn test_exit_code_invalid_batch_size() {
        cargo_bin_cmd!("package-audit")
            .args([NODE_PROJECT, "--batch-size", "0"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("batch size"));
    }

    /// Exit code 2: Including and skipping one risk kind at once
    #[test]
    fn test_exit_code_conflicting_filter_flags() {
        cargo_bin_cmd!("package-audit")
            .args([NODE_PROJECT, "--offline", "--vulnerable", "--skip-vulnerable"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("cannot be used with"));
    }

    /// Exit code 3: Application error - non-existent project path
    #[test]
    fn test_exit_code_application_error_nonexistent_path() {
        cargo_bin_cmd!("package-audit")
            .arg("/nonexistent/path/that/does/not/exist")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Directory does not exist"));
    }

    /// Exit code 3: Application error - path is a file, not a directory
    #[test]
    fn test_exit_code_application_error_file_not_directory() {
        cargo_bin_cmd!("package-audit")
            .arg("Cargo.toml")
            .assert()
            .code(3);
    }

    /// Exit code 3: Application error - requested technology is absent
    #[test]
    fn test_exit_code_technology_not_detected() {
        cargo_bin_cmd!("package-audit")
            .args([NODE_PROJECT, "--offline", "-t", "ruby"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("is not used in"));
    }

    /// Exit code 3: Application error - no manifest at all
    #[test]
    fn test_exit_code_no_supported_technology() {
        let temp_dir = TempDir::new().unwrap();
        cargo_bin_cmd!("package-audit")
            .arg(temp_dir.path())
            .arg("--offline")
            .assert()
            .code(3);
    }
}

#[test]
fn test_e2e_table_format() {
    cargo_bin_cmd!("package-audit")
        .args([NODE_PROJECT, "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("node"))
        .stdout(predicate::str::contains("No risky packages found"))
        .stderr(predicate::str::contains("Resolved 3 package(s)"));
}

#[test]
fn test_e2e_json_format() {
    let output = cargo_bin_cmd!("package-audit")
        .args([NODE_PROJECT, "--offline", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tool"]["name"], "package-audit");
    assert_eq!(report["has_risks"], false);
    assert_eq!(report["reports"][0]["technology"], "node");
    assert_eq!(report["reports"][0]["total_count"], 3);
}

#[test]
fn test_e2e_csv_format() {
    cargo_bin_cmd!("package-audit")
        .args([NODE_PROJECT, "--offline", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("technology,name,version,"));

    cargo_bin_cmd!("package-audit")
        .args([NODE_PROJECT, "--offline", "-f", "csv", "--csv-exclude-headers"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_e2e_format_from_environment() {
    cargo_bin_cmd!("package-audit")
        .args([RUBY_PROJECT, "--offline"])
        .env("PACKAGE_AUDIT_FORMAT", "markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Package Audit"))
        .stdout(predicate::str::contains("## ruby"));
}

#[test]
fn test_e2e_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("audit.md");

    cargo_bin_cmd!("package-audit")
        .args([RUBY_PROJECT, "--offline", "-f", "markdown", "-o"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Report written to"));

    let written = std::fs::read_to_string(&output_path).unwrap();
    assert!(written.contains("3 resolved package(s)"));
}

#[test]
fn test_e2e_output_file_missing_parent() {
    cargo_bin_cmd!("package-audit")
        .args([RUBY_PROJECT, "--offline", "-o", "/nonexistent/dir/audit.json"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Parent directory does not exist"));
}

#[test]
fn test_e2e_explicit_config_must_exist() {
    cargo_bin_cmd!("package-audit")
        .args([NODE_PROJECT, "--offline", "-c", "tests/fixtures/missing.yml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("missing.yml"));
}
