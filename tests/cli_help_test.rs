#[cfg(test)]
mod cli_help_tests {
    use assert_cmd::prelude::*;
    use predicates::prelude::*;
    use std::process::Command;

    #[test]
    fn test_cli_help_output() {
        let mut cmd = Command::cargo_bin("anaplan").unwrap();
        let assert_result = cmd.arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        assert!(help_output.contains("Usage:"));
        assert!(help_output.contains("Commands:"));
        for command in [
            "list",
            "resolve",
            "upload",
            "download",
            "run",
            "user",
            "workspaces",
            "models",
            "config",
        ] {
            assert!(help_output.contains(command), "missing command {}", command);
        }
        assert!(help_output.contains("-V, --version"));
    }

    #[test]
    fn test_run_help_lists_options() {
        let mut cmd = Command::cargo_bin("anaplan").unwrap();
        cmd.args(["run", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--parameter"))
            .stdout(predicate::str::contains("--retries"))
            .stdout(predicate::str::contains("--timeout"));
    }

    #[test]
    fn test_upload_rejects_oversized_chunks() {
        let mut cmd = Command::cargo_bin("anaplan").unwrap();
        cmd.args(["upload", "113000000001", "--file", "data.csv", "--chunk-size", "51"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("51"));
    }

    #[test]
    fn test_config_path_honours_environment() {
        let dir = tempfile::tempdir().unwrap();
        let mut cmd = Command::cargo_bin("anaplan").unwrap();
        cmd.env("ANAPLAN_CONFIG_DIR", dir.path())
            .args(["config", "get", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains(dir.path().to_string_lossy().as_ref()))
            .stdout(predicate::str::contains("config.yml"));
    }

    #[test]
    fn test_config_set_then_show() {
        let dir = tempfile::tempdir().unwrap();

        Command::cargo_bin("anaplan")
            .unwrap()
            .env("ANAPLAN_CONFIG_DIR", dir.path())
            .args(["config", "set", "workspace_id", "8a81b09d5e8c6f27015ece3402487d33"])
            .assert()
            .success();
        assert!(dir.path().join("config.yml").exists());

        Command::cargo_bin("anaplan")
            .unwrap()
            .env("ANAPLAN_CONFIG_DIR", dir.path())
            .env_remove("ANAPLAN_FORMAT")
            .args(["config", "show", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("8a81b09d5e8c6f27015ece3402487d33"));
    }

    #[test]
    fn test_unknown_property_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        Command::cargo_bin("anaplan")
            .unwrap()
            .env("ANAPLAN_CONFIG_DIR", dir.path())
            .args(["config", "set", "colour", "blue"])
            .assert()
            .failure();
    }
}
