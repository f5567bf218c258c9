use assert_cmd::Command;
use mvnhook_test_utils::{
    count_occurrences, TestWorkspace, MALFORMED_POM, PLAIN_POM, PROFILES_POM,
};
use predicates::prelude::*;

fn mvnhook() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mvnhook"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    mvnhook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Instrument Maven build descriptors with the SeaLights build plugin",
        ));
}

#[test]
fn test_cli_version() {
    mvnhook()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mvnhook 0.1.0"));
}

#[test]
fn test_integrate_folder() {
    let ws = TestWorkspace::new();
    let root = ws.write("pom.xml", PLAIN_POM);
    let module = ws.write("web/pom.xml", PROFILES_POM);

    mvnhook()
        .arg("integrate")
        .arg("--folder")
        .arg(ws.path())
        .args(["--app-name", "shop", "--framework", "junit"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "2 file(s): 2 instrumented, 0 skipped, 0 failed",
        ));

    let text = ws.read(&root);
    assert!(text.contains("<appName>shop</appName>"));
    assert_eq!(count_occurrences(&ws.read(&module), "sealights-maven-plugin"), 3);
    assert!(ws.path().join("pom.xml.slbak").exists());
}

#[test]
fn test_integrate_defaults_workspace_path_to_working_directory() {
    let ws = TestWorkspace::new();
    let pom = ws.write("pom.xml", PLAIN_POM);

    mvnhook()
        .current_dir(ws.path())
        .args(["integrate", "--no-backup"])
        .assert()
        .success();

    let cwd = std::fs::canonicalize(ws.path()).unwrap();
    let expected = format!("<workspacepath>{}</workspacepath>", cwd.display());
    assert!(ws.read(&pom).contains(&expected), "{}", ws.read(&pom));
}

#[test]
fn test_integrate_twice_skips() {
    let ws = TestWorkspace::new();
    ws.write("pom.xml", PLAIN_POM);

    for _ in 0..2 {
        mvnhook()
            .arg("integrate")
            .arg("-f")
            .arg(ws.path())
            .assert()
            .success();
    }
    mvnhook()
        .arg("integrate")
        .arg("-f")
        .arg(ws.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already instrumented"));
}

#[test]
fn test_integrate_malformed_still_succeeds() {
    let ws = TestWorkspace::new();
    ws.write("a/pom.xml", PLAIN_POM);
    ws.write("b/pom.xml", MALFORMED_POM);

    mvnhook()
        .arg("integrate")
        .arg("-f")
        .arg(ws.path())
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"failed\": 1"))
        .stdout(predicate::str::contains("\"instrumented\": 1"));
}

#[test]
fn test_integrate_with_settings_file() {
    let ws = TestWorkspace::new();
    let pom = ws.write("svc/pom.xml", PLAIN_POM);
    let config = ws.write(
        "mvnhook.toml",
        &format!(
            r#"
testing_framework = "testng"
backup = false

[global]
customer_id = "acme"

[settings]
app_name = "shop"
module_name = "svc"
build_strategy = "build-per-module"

[discovery]
folders = ["{}"]
"#,
            ws.path().join("svc").display().to_string().replace('\\', "/")
        ),
    );

    mvnhook()
        .arg("integrate")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let text = ws.read(&pom);
    assert!(text.contains("<customerid>acme</customerid>"));
    assert!(text.contains("<appName>[shop] - svc</appName>"));
    assert!(!ws.path().join("svc/pom.xml.slbak").exists());
}

#[test]
fn test_restore_puts_original_back() {
    let ws = TestWorkspace::new();
    let pom = ws.write("pom.xml", PLAIN_POM);

    mvnhook().arg("integrate").arg("-f").arg(ws.path()).assert().success();
    assert_ne!(ws.read(&pom), PLAIN_POM);

    mvnhook()
        .arg("restore")
        .arg("-f")
        .arg(ws.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file(s) restored"));
    assert_eq!(ws.read(&pom), PLAIN_POM);
}

#[test]
fn test_invalid_pattern_fails() {
    let ws = TestWorkspace::new();
    mvnhook()
        .arg("integrate")
        .arg("-f")
        .arg(ws.path())
        .args(["--pattern", "pom[.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid file pattern"));
}

#[test]
fn test_missing_settings_file_fails() {
    mvnhook()
        .args(["integrate", "--config", "/nonexistent/mvnhook.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read settings file"));
}

#[test]
fn test_agent_args() {
    let ws = TestWorkspace::new();
    let config = ws.write(
        "agent.toml",
        r#"
[command]
mode = "end"
build_session_id = "from-file"
"#,
    );

    mvnhook()
        .arg("agent-args")
        .arg("-c")
        .arg(&config)
        .args(["--build-session-id", "bsid-7"])
        .assert()
        .success()
        .stdout(predicate::str::diff("end -buildsessionid bsid-7\n"));
}

#[test]
fn test_agent_args_without_command_table() {
    let ws = TestWorkspace::new();
    let config = ws.write("empty.toml", "");

    mvnhook()
        .arg("agent-args")
        .arg("-c")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no [command] table"));
}
