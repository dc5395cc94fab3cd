//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("ogmeta")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn stdout_json(args: &[&str]) -> serde_json::Value {
    let output = cmd().args(args).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_file_input() {
    let json = stdout_json(&[&get_fixture_path("basic.html")]);

    assert_eq!(json["baseUrl"], "http://localhost/");
    assert_eq!(json["og"]["title"][0]["value"], "The Rock");
    assert_eq!(json["ogType"], "video");
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("article.html")).unwrap();
    cmd()
        .arg("-")
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ogType\": \"article\""));
}

#[test]
fn test_cli_page_url_resolves_relative_links() {
    let json = stdout_json(&["-u", "http://example.com/", &get_fixture_path("links.html")]);

    assert_eq!(json["baseUrl"], "http://example.com/");
    assert_eq!(json["links"]["canonical"][0]["href"], "http://example.com/2015/01/entry-name/");
}

#[test]
fn test_cli_compact_json() {
    cmd()
        .args(["--compact", &get_fixture_path("basic.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\"baseUrl\":").and(predicate::str::contains("\n  ").not()));
}

#[test]
fn test_cli_text_format() {
    cmd()
        .args(["-f", "text", &get_fixture_path("media.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("image: http://example.com/rock.jpg"))
        .stdout(predicate::str::contains("    width: 300"));
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "yaml", &get_fixture_path("basic.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output.json");

    cmd()
        .args(["-o", output.to_str().unwrap()])
        .arg(get_fixture_path("article.html"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Output written to"));

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["metaProperties"]["twitter:card"][0], "summary_large_image");
}

#[test]
fn test_cli_invalid_file() {
    cmd()
        .arg("nonexistent.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_cli_deeply_nested_input_fails() {
    let length = 5_000;
    let html = format!("<html><body>{}{}</body></html>", "<div><p>Test</p>".repeat(length), "</div>".repeat(length));

    cmd()
        .arg("-")
        .write_stdin(html)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to extract metadata"));
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", &get_fixture_path("basic.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("ogmeta"))
        .stderr(predicate::str::contains("Extraction Details"));
}

#[test]
fn test_cli_batch() {
    let output = cmd().args(["--batch", &get_fixture_path("batch.json")]).output().unwrap();
    assert!(output.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["result"]["url"], "not-a-url");
    assert_eq!(lines[0]["result"]["meta"]["id"], 1);
    assert!(lines[0]["err"].as_str().unwrap().starts_with("Invalid URL"));
}

#[test]
fn test_cli_batch_without_items() {
    cmd()
        .arg("--batch")
        .arg("-")
        .write_stdin(r#"{"options": {}}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown input data"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ogmeta"));
}
