#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn eimu(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_eimu"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("EIMU_PORT")
        .env_remove("EIMU_BAUD")
        .env_remove("EIMU_TIMEOUT")
        .output()
        .expect("eimu should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn version_reports_package_version() {
    let output = eimu(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("eimu {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn extended_version_lists_features() {
    let output = eimu(&["version", "--extended"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("name: eimu"));
    assert!(text.contains("cli=true"));
}

#[test]
fn commands_lists_operation_table_as_json() {
    let output = eimu(&["--format", "json", "commands"]);
    assert!(output.status.success());
    let rows: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("valid JSON");
    let rows = rows.as_array().expect("array of operations");

    let rpy = rows
        .iter()
        .find(|r| r["name"] == "rpy" && r["kind"] == "read")
        .expect("rpy listed");
    assert_eq!(rpy["opcode"], "0x02");
    assert_eq!(rpy["reply_floats"], 3);

    let imu = rows
        .iter()
        .find(|r| r["name"] == "imu-data")
        .expect("imu-data listed");
    assert_eq!(imu["reply_floats"], 9);

    let gain = rows
        .iter()
        .find(|r| r["name"] == "filter-gain" && r["kind"] == "set")
        .expect("filter-gain setter listed");
    assert_eq!(gain["request_bytes"], 5);
}

#[test]
fn ports_prints_json_array_or_transport_error() {
    let output = eimu(&["--format", "json", "ports"]);
    if output.status.success() {
        let ports: serde_json::Value =
            serde_json::from_str(stdout(&output).trim()).expect("valid JSON");
        assert!(ports.is_array());
    } else {
        // Hosts without a usable enumeration backend.
        assert_eq!(output.status.code(), Some(3));
    }
}

#[test]
fn unknown_quantity_is_usage_error() {
    let output = eimu(&["read", "/dev/null", "altitude"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("altitude"));
}

#[test]
fn missing_port_is_transport_error() {
    let output = eimu(&[
        "read",
        "/dev/eimu-does-not-exist",
        "rpy",
        "--settle",
        "0",
    ]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("connect failed"));
}

#[test]
fn invalid_timeout_is_usage_error() {
    let output = eimu(&[
        "info",
        "/dev/eimu-does-not-exist",
        "--timeout",
        "soon",
    ]);
    assert_eq!(output.status.code(), Some(64));
}
