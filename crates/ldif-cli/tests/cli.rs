use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn ldiff(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ldiff"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run ldiff")
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

const BEFORE: &str = r#"{
    "dn": "cn=Alice,dc=example,dc=com",
    "attributes": [
        { "description": "cn", "values": ["Alice"] },
        { "description": "mail", "values": ["a@example.com", "alice@example.com"] }
    ]
}"#;

const AFTER: &str = r#"{
    "dn": "cn=Alice,dc=example,dc=com",
    "attributes": [
        { "description": "cn", "values": ["Alicia"] },
        { "description": "mail", "values": ["alice@example.com"] }
    ]
}"#;

#[test]
fn diff_prints_modify_record() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", BEFORE);
    let after = write(dir.path(), "after.json", AFTER);

    let output = ldiff(&["diff", before.to_str().unwrap(), after.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "dn: cn=Alice,dc=example,dc=com\n\
         changetype: modify\n\
         delete: mail\n\
         mail: a@example.com\n\
         -\n\
         replace: cn\n\
         cn: Alicia\n\
         -\n\
         \n"
    );
}

#[test]
fn diff_of_identical_snapshots() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", BEFORE);

    let output = ldiff(&["diff", before.to_str().unwrap(), before.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "No differences.\n");
}

#[test]
fn diff_json_output() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", BEFORE);
    let after = write(dir.path(), "after.json", AFTER);

    let output = ldiff(&[
        "diff",
        before.to_str().unwrap(),
        after.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["changed"], true);
    assert_eq!(value["dn"], "cn=Alice,dc=example,dc=com");
    assert_eq!(value["mod_specs"][0]["kind"], "delete");
    assert_eq!(value["mod_specs"][1]["attribute"], "cn");
}

#[test]
fn diff_honours_config_file() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", BEFORE);
    let after = write(dir.path(), "after.json", AFTER);
    let config = write(
        dir.path(),
        "ldiff.toml",
        "[format]\nspace_after_separator = false\nline_separator = \"crlf\"\n",
    );

    let output = ldiff(&[
        "diff",
        before.to_str().unwrap(),
        after.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("dn:cn=Alice,dc=example,dc=com\r\nchangetype:modify\r\n"));
    assert!(text.ends_with("-\r\n\r\n"));
}

#[test]
fn diff_rejects_malformed_snapshot() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", BEFORE);
    let bad = write(
        dir.path(),
        "bad.json",
        r#"{"dn": "cn=a", "attributes": [{"description": "bad name", "values": []}]}"#,
    );

    let output = ldiff(&["diff", before.to_str().unwrap(), bad.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad.json"));
}

#[test]
fn lint_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    let file = write(
        dir.path(),
        "ok.ldif",
        "dn: cn=Alice,dc=example,dc=com\nchangetype: modify\nreplace: cn\ncn: Alicia\n-\n\n",
    );

    let output = ldiff(&["lint", file.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("no problems"));
}

#[test]
fn lint_reports_invalid_lines() {
    let dir = TempDir::new().unwrap();
    let file = write(
        dir.path(),
        "bad.ldif",
        "dn: cn=Alice\njust some text\ncn:: !!!\n",
    );

    let output = ldiff(&["lint", file.to_str().unwrap(), "--format", "json"]);
    assert!(!output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let problems = value.as_array().unwrap();
    assert_eq!(problems.len(), 2);
    assert_eq!(problems[0]["line"], 2);
    assert_eq!(problems[1]["line"], 3);
}

#[test]
fn config_prints_defaults() {
    let output = ldiff(&["config"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("[format]"));
    assert!(text.contains("wrap_width = 76"));
    assert!(text.contains("line_separator = \"lf\""));
}

#[test]
fn config_rejects_bad_wrap_width() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "ldiff.toml", "[format]\nwrap_width = 1\n");

    let output = ldiff(&["config", "--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
}
