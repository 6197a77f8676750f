//! Integration tests for the chefwiki CLI
//!
//! These tests run the actual binary. Searches are answered from saved
//! JSON via `--rows`, so no Chef Server is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get the binary to test
fn chefwiki_cmd() -> Command {
    Command::cargo_bin("chefwiki").unwrap()
}

/// Write a saved search response and return its path as a string
fn rows_file(dir: &TempDir, json: &str) -> String {
    let path = dir.path().join("rows.json");
    fs::write(&path, json).unwrap();
    path.to_str().unwrap().to_string()
}

const TWO_NODES: &str = r#"{
  "total": 2,
  "start": 0,
  "rows": [
    {"name": "web01", "link": "https://chef/nodes/web01", "title": "web01",
     "automatic": {"ipaddress": "10.0.0.1", "platform": "debian"}},
    {"name": "web02", "link": "https://chef/nodes/web02", "title": "web02",
     "automatic": {"ipaddress": "10.0.0.2", "platform": "ubuntu"}}
  ]
}"#;

#[test]
fn test_help_flag() {
    chefwiki_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Render Chef Server node searches into wiki pages",
        ));
}

#[test]
fn test_search_help() {
    chefwiki_cmd()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--refresh"));
}

// ============================================================================
// compile
// ============================================================================

#[test]
fn test_compile_shows_segments() {
    chefwiki_cmd()
        .args(["compile", "x%a|b%y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 segments, 1 placeholders"))
        .stdout(predicate::str::contains("link    a | b"));
}

#[test]
fn test_compile_first_pipe_only() {
    chefwiki_cmd()
        .args(["compile", "%a|b|c%"])
        .assert()
        .success()
        .stdout(predicate::str::contains("link    a | b|c"));
}

// ============================================================================
// search
// ============================================================================

#[test]
fn test_search_default_format_renders_links() {
    let dir = TempDir::new().unwrap();
    let rows = rows_file(&dir, TWO_NODES);

    chefwiki_cmd()
        .args(["--rows", &rows, "search", "role:web"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<ul>"))
        .stdout(predicate::str::contains(
            "<a href=\"https://chef/nodes/web02\" class=\"urlextern\" rel=\"nofollow\">web02</a>",
        ))
        .stderr(predicate::str::contains("refresh: 14400s"));
}

#[test]
fn test_search_custom_format_and_refresh() {
    let dir = TempDir::new().unwrap();
    let rows = rows_file(&dir, TWO_NODES);

    chefwiki_cmd()
        .args([
            "--rows",
            &rows,
            "search",
            "role:web",
            "--format",
            "%name% on %automatic.platform%",
            "--refresh",
            "300",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("web01 on debian"))
        .stdout(predicate::str::contains("web02 on ubuntu"))
        .stderr(predicate::str::contains("refresh: 300s"));
}

#[test]
fn test_search_bad_field_is_inline_diagnostic() {
    let dir = TempDir::new().unwrap();
    let rows = rows_file(&dir, TWO_NODES);

    chefwiki_cmd()
        .args(["--rows", &rows, "search", "role:web", "--format", "%automatic%"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<p><em>attribute automatic is an object</em></p>",
        ));
}

#[test]
fn test_search_no_results_is_not_a_failure() {
    let dir = TempDir::new().unwrap();
    let rows = rows_file(&dir, r#"{"total": 0, "start": 0, "rows": []}"#);

    chefwiki_cmd()
        .args(["--rows", &rows, "search", "role:none"])
        .assert()
        .success()
        .stdout("<p><em>No results</em></p>\n");
}

#[test]
fn test_search_bad_server_url() {
    chefwiki_cmd()
        .args(["--server", "not a url", "search", "role:web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_search_script_link_is_plain_text() {
    let dir = TempDir::new().unwrap();
    let rows = rows_file(
        &dir,
        r#"[{"link": "javascript:alert(document.cookie)", "title": "web01"}]"#,
    );

    chefwiki_cmd()
        .args(["--rows", &rows, "search", "role:web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("href=\"javascript:").not())
        .stdout(predicate::str::contains("<div class=\"li\">web01</div>"));
}

#[test]
fn test_search_config_with_key_is_refused() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("chefwiki.yaml");
    fs::write(
        &config,
        "api:\n  server: https://chef.example.com\n  key: /etc/chef/client.pem\n",
    )
    .unwrap();

    chefwiki_cmd()
        .args(["--config", config.to_str().unwrap(), "search", "role:web"])
        .env_remove("CHEF_SERVER")
        .assert()
        .failure()
        .stderr(predicate::str::contains("request signing is not supported"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_search_missing_rows_file() {
    chefwiki_cmd()
        .args(["--rows", "/nonexistent/rows.json", "search", "role:web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

// ============================================================================
// page
// ============================================================================

#[test]
fn test_page_replaces_tags() {
    let dir = TempDir::new().unwrap();
    let rows = rows_file(&dir, TWO_NODES);
    let page = dir.path().join("servers.txt");
    fs::write(
        &page,
        "====== Web ======\n{{chef>role:web|refresh=900|format=%name%}}\nEnd.\n",
    )
    .unwrap();

    chefwiki_cmd()
        .args(["--rows", &rows, "page", page.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("====== Web ======\n<ul>"))
        .stdout(predicate::str::contains("<div class=\"li\">web01</div>"))
        .stdout(predicate::str::ends_with("</ul>\n\nEnd.\n"))
        .stderr(predicate::str::contains("1 tags, 0 failed"))
        .stderr(predicate::str::contains("refresh: 900s"));
}

#[test]
fn test_page_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let rows = rows_file(&dir, TWO_NODES);
    let page = dir.path().join("page.txt");
    let out = dir.path().join("page.html");
    fs::write(&page, "{{chef>role:web}} and {{chef>role:web|format=%name%}}").unwrap();

    chefwiki_cmd()
        .args([
            "--rows",
            &rows,
            "page",
            page.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("2 tags, 0 failed"));

    let html = fs::read_to_string(&out).unwrap();
    assert_eq!(html.matches("<ul>").count(), 2);
    assert!(html.contains("</ul>\n and <ul>"));
}

#[test]
fn test_page_without_tags_passes_through() {
    let dir = TempDir::new().unwrap();
    let rows = rows_file(&dir, TWO_NODES);
    let page = dir.path().join("plain.txt");
    fs::write(&page, "just text\n").unwrap();

    chefwiki_cmd()
        .args(["--rows", &rows, "page", page.to_str().unwrap()])
        .assert()
        .success()
        .stdout("just text\n")
        .stderr(predicate::str::contains("0 tags, 0 failed"));
}
