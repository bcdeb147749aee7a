//! Integration tests for the `simplify` CLI binary.
//!
//! These run the real binary through `assert_cmd`. Nothing here touches the
//! network: tokenization is exercised with `--dry-run` only.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn simplify() -> Command {
    let mut cmd = Command::cargo_bin("simplify").unwrap();
    cmd.env_remove("SIMPLIFY_API_KEY")
        .env_remove("SIMPLIFY_BUNDLE_ID")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper: split dry-run output into the request head and the parsed body.
fn dry_run_body(stdout: &[u8]) -> serde_json::Value {
    let text = String::from_utf8(stdout.to_vec()).unwrap();
    let (_, body) = text.split_once("\n\n").expect("blank line before body");
    serde_json::from_str(body).unwrap()
}

// ============================================================================
// key
// ============================================================================

#[test]
fn key_sandbox() {
    simplify()
        .args(["key", "sbpb_abc"])
        .assert()
        .success()
        .stdout("sandbox\n");
}

#[test]
fn key_live() {
    simplify()
        .args(["key", "lvpb_abc"])
        .assert()
        .success()
        .stdout("live\n");
}

#[test]
fn key_invalid() {
    simplify()
        .args(["key", "xxpb_abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid API Key"));
}

// ============================================================================
// token --dry-run
// ============================================================================

#[test]
fn token_dry_run_from_card_file() {
    let output = simplify()
        .args(["token", "--api-key", "sbpb_abc", "--card", &fixture("card.json"), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "POST https://sandbox.simplify.com/v1/api/payment/cardToken\n",
        ))
        .stdout(predicate::str::contains("content-type: application/json"))
        .stdout(predicate::str::is_match(r"user-agent: Rust-SDK/\d+(\.\d+)* \( Device: .*; OS: .* \)").unwrap())
        .get_output()
        .stdout
        .clone();

    let body = dry_run_body(&output);
    assert_eq!(body["key"], "sbpb_abc");
    assert_eq!(body["card"]["number"], "5555555555554444");
    assert_eq!(body["card"]["cvc"], "123");
    assert!(body.get("secure3DRequestData").is_none());
}

#[test]
fn token_dry_run_from_flags_with_secure3d() {
    let output = simplify()
        .args([
            "token",
            "--number", "4111111111111111",
            "--exp-month", "1",
            "--exp-year", "30",
            "--cvc", "999",
            "--amount", "1500",
            "--currency", "AUD",
            "--description", "Test",
            "--dry-run",
        ])
        .env("SIMPLIFY_API_KEY", "lvpb_abc")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "POST https://api.simplify.com/v1/api/payment/cardToken\n",
        ))
        .get_output()
        .stdout
        .clone();

    let body = dry_run_body(&output);
    assert_eq!(body["card"]["expMonth"], "1");
    assert_eq!(
        body["secure3DRequestData"],
        serde_json::json!({"amount": 1500, "currency": "AUD", "description": "Test"})
    );
}

#[test]
fn token_dry_run_from_stdin() {
    simplify()
        .args(["token", "--api-key", "sbpb_abc", "--dry-run"])
        .write_stdin(r#"{"number":"5555555555554444","expMonth":"12","expYear":"99","cvc":"123"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""number": "5555555555554444""#));
}

#[test]
fn token_dry_run_with_bundle_id_and_pins() {
    simplify()
        .args([
            "token",
            "--api-key", "sbpb_abc",
            "--card", &fixture("card.json"),
            "--pin", &fixture("pins.pem"),
            "--bundle-id", "com.example.shop",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bundle: com.example.shop )"));
}

#[test]
fn token_invalid_key_fails() {
    simplify()
        .args(["token", "--api-key", "nope", "--card", &fixture("card.json"), "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid API Key"));
}

#[test]
fn token_missing_key_fails() {
    simplify()
        .args(["token", "--card", &fixture("card.json"), "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--api-key"));
}

#[test]
fn token_card_must_be_object() {
    simplify()
        .args(["token", "--api-key", "sbpb_abc", "--dry-run"])
        .write_stdin("[1,2,3]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Card JSON must be an object"));
}

#[test]
fn token_partial_card_flags_fail() {
    simplify()
        .args(["token", "--api-key", "sbpb_abc", "--number", "4111", "--dry-run"])
        .assert()
        .failure();
}

#[test]
fn token_pin_file_without_certificates_fails() {
    simplify()
        .args([
            "token",
            "--api-key", "sbpb_abc",
            "--card", &fixture("card.json"),
            "--pin", &fixture("card.json"),
            "--dry-run",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PEM certificates"));
}

// ============================================================================
// pins
// ============================================================================

#[test]
fn pins_lists_certificates() {
    simplify()
        .args(["pins", &fixture("pins.pem")])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 certificate(s)"))
        .stdout(predicate::str::contains("[0] 69 bytes DER"))
        .stdout(predicate::str::contains("[1] 100 bytes DER"));
}

#[test]
fn pins_without_certificates_fails() {
    simplify()
        .args(["pins", &fixture("card.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No certificates could be pinned"));
}

#[test]
fn pins_missing_file_fails() {
    simplify()
        .args(["pins", "/nonexistent/pins.pem"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ============================================================================
// redirect
// ============================================================================

#[test]
fn redirect_authenticated() {
    simplify()
        .args([
            "redirect",
            "simplifysdk://secure3d?result=%7B%22secure3d%22%3A%7B%22authenticated%22%3Atrue%7D%7D",
        ])
        .assert()
        .success()
        .stdout("authenticated\n");
}

#[test]
fn redirect_error() {
    simplify()
        .args([
            "redirect",
            "simplifysdk://secure3d?result=%7B%22secure3d%22%3A%7B%22error%22%3A%22Timed%20out%22%7D%7D",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("3-D Secure failed: Timed out"));
}

#[test]
fn redirect_other_scheme() {
    simplify()
        .args(["redirect", "https://example.com/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a 3-D Secure redirect"));
}

// ============================================================================
// challenge
// ============================================================================

#[test]
fn challenge_from_token_file() {
    simplify()
        .args(["challenge", "-i", &fixture("token.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("action='https://acs.example.com/pareq'"))
        .stdout(predicate::str::contains("name='MD' value='merchant-data-1'"));
}

#[test]
fn challenge_to_output_file() {
    let dir = std::env::temp_dir().join(format!("simplify-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("challenge.html");

    simplify()
        .args(["challenge", "-i", &fixture("token.json"), "-o", out.to_str().unwrap()])
        .assert()
        .success();

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn challenge_missing_field() {
    simplify()
        .arg("challenge")
        .write_stdin(r#"{"card":{"secure3DData":{"acsUrl":"https://acs"}}}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Card token must contain 'card.secure3DData.paReq'",
        ));
}
