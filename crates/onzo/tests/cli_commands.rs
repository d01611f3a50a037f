#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn onzo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_onzo"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("ONZO_VID")
        .env_remove("ONZO_PID")
        .output()
        .expect("onzo should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn version_prints_package_version() {
    let output = onzo(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("onzo {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn registers_lists_table_without_device() {
    let output = onzo(&["--format", "json", "registers", "clamp"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(r#"{"name":"EAR","addresses":[16,17],"words":2}"#));
    assert!(out.contains(r#""name":"batteryvolts""#));
}

#[test]
fn registers_raw_format() {
    let output = onzo(&["--format", "raw", "registers", "display"]);
    assert!(output.status.success());
    assert!(stdout(&output)
        .lines()
        .any(|line| line == "standingcharge 129,130 2"));
}

#[test]
fn simulated_read_reports_readings() {
    let output = onzo(&["--simulate", "--format", "json", "read"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(r#""power":1500"#));
    assert!(out.contains(r#""reactive_power":200"#));
    assert!(out.contains(r#""apparent_power":1513"#));
    assert!(out.contains(r#""cumulative_kwh":12345.6789"#));
}

#[test]
fn simulated_set_reads_back() {
    let output = onzo(&["--simulate", "--format", "pretty", "set", "clamp", "EAR", "65537"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "device=clamp field=EAR value=65537");
}

#[test]
fn simulated_monitor_stops_after_count() {
    let output = onzo(&[
        "--simulate",
        "--format",
        "raw",
        "monitor",
        "--interval",
        "10ms",
        "--count",
        "3",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).lines().count(), 3);
}

#[test]
fn simulated_rates_round_trip() {
    let output = onzo(&[
        "--simulate",
        "--format",
        "json",
        "rates",
        "--standing-charge",
        "0.3",
        "--unit-rate",
        "0.2",
    ]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        r#"{"standing_charge":0.3,"unit_rate":0.2}"#
    );
}

#[test]
fn unknown_field_is_usage_error() {
    let output = onzo(&["--simulate", "get", "display", "EAR"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown register 'EAR'"));
}

#[cfg(not(feature = "hidapi"))]
#[test]
fn hardware_access_needs_hidapi_feature() {
    let output = onzo(&["read"]);
    assert_eq!(output.status.code(), Some(3));
}
