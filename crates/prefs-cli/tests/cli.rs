use std::io::Write;
use std::process::Command;

fn prefs() -> Command {
    Command::new(env!("CARGO_BIN_EXE_prefs"))
}

#[test]
fn check_password_reports_strength() {
    let strong = prefs().args(["check-password", "Abcdefg1"]).output().unwrap();
    assert!(strong.status.success());
    assert_eq!(String::from_utf8_lossy(&strong.stdout).trim(), "strong");

    let weak = prefs().args(["check-password", "abcdefg1"]).output().unwrap();
    assert_eq!(weak.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&weak.stdout).starts_with("weak:"));
}

#[test]
fn check_password_policy_flag() {
    let output = prefs()
        .args(["check-password", "Abc!efg1", "--policy", "alphanumeric"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn submit_with_mismatch_fails_without_server() {
    let output = prefs()
        .args(["submit", "--password", "Abcdefg1", "--confirm", "Abcdefg2"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Passwords don't match."));
}

#[test]
fn show_config_merges_file_with_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[form]\nredirect = \"/done\"\n\n[remote]\ntimeout_secs = 3").unwrap();

    let output = prefs()
        .args(["show-config", "--config"])
        .arg(file.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("redirect = \"/done\""));
    assert!(text.contains("timeout_secs = 3"));
    assert!(text.contains("redirect_delay_secs = 5"));
}

#[test]
fn missing_config_file_is_an_error() {
    let output = prefs()
        .args(["show-config", "--config", "/nonexistent/prefs.toml"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("reading config"));
}
