//! CLI integration tests
//!
//! These tests run the `navtree` binary against a scratch database and check
//! both its output and what it left in the store.

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const ROOT_A_B: &str = r#"
schema_version: 0
taxonomies:
  - code: root
    name: Root
    children:
      - code: a
        name: A
        children:
          - code: b
            name: B
"#;

fn setup_test_repo(temp_dir: &TempDir) -> PathBuf {
    let seed_path = temp_dir.path().join("taxonomy.yaml");
    fs::write(&seed_path, ROOT_A_B).unwrap();
    temp_dir.path().join("store.db")
}

fn navtree(temp_dir: &TempDir, db_path: &Path, args: &[&str]) -> Output {
    let cli_bin = env!("CARGO_BIN_EXE_navtree");
    Command::new(cli_bin)
        .current_dir(temp_dir.path())
        .arg("--db")
        .arg(db_path)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn assert_success(output: &Output) -> String {
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_import_create_build_render() {
    // Scenario: a navigation built from Root > A > B without its root
    let temp_dir = TempDir::new().unwrap();
    let db_path = setup_test_repo(&temp_dir);

    let stdout = assert_success(&navtree(&temp_dir, &db_path, &["taxon", "import", "taxonomy.yaml"]));
    assert!(stdout.contains("Imported 3 taxons"));

    assert_success(&navtree(&temp_dir, &db_path, &["navigation", "create", "main"]));
    assert_success(&navtree(
        &temp_dir,
        &db_path,
        &["navigation", "build", "main", "--from", "root"],
    ));

    let rendered = assert_success(&navtree(&temp_dir, &db_path, &["navigation", "render", "main"]));
    assert_eq!(rendered, "- A\n  - B\n");

    // Assert: Three closure records were committed
    let conn = Connection::open(&db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM item_closures", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 3);

    let listed = assert_success(&navtree(&temp_dir, &db_path, &["navigation", "list"]));
    assert_eq!(listed, "main\tcompleted\tenabled\n");
}

#[test]
fn test_item_add_move_disable_remove() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = setup_test_repo(&temp_dir);
    assert_success(&navtree(&temp_dir, &db_path, &["navigation", "create", "main"]));

    let docs = assert_success(&navtree(&temp_dir, &db_path, &["item", "add", "main", "Docs"]));
    let docs = docs.trim().to_string();
    let blog = assert_success(&navtree(
        &temp_dir,
        &db_path,
        &["item", "add", "main", "Blog", "--position", "1", "--url", "/blog"],
    ));
    let blog = blog.trim().to_string();

    // Blog moves under Docs
    assert_success(&navtree(
        &temp_dir,
        &db_path,
        &["item", "move", &blog, "--parent", &docs],
    ));
    let rendered = assert_success(&navtree(&temp_dir, &db_path, &["navigation", "render", "main"]));
    assert_eq!(rendered, "- Docs\n  - [Blog](/blog)\n");

    // Disabled items hide their subtree
    assert_success(&navtree(&temp_dir, &db_path, &["item", "disable", &docs]));
    let rendered = assert_success(&navtree(&temp_dir, &db_path, &["navigation", "render", "main"]));
    assert_eq!(rendered, "");

    // The JSON export still shows disabled items
    let shown = assert_success(&navtree(&temp_dir, &db_path, &["navigation", "show", "main"]));
    let tree: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(tree[0]["label"], "Docs");
    assert_eq!(tree[0]["enabled"], false);
    assert_eq!(tree[0]["children"][0]["url"], "/blog");

    assert_success(&navtree(&temp_dir, &db_path, &["item", "remove", &docs]));
    let conn = Connection::open(&db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM item_closures", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn test_build_unknown_taxon_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = setup_test_repo(&temp_dir);
    assert_success(&navtree(&temp_dir, &db_path, &["navigation", "create", "main"]));

    let output = navtree(
        &temp_dir,
        &db_path,
        &["navigation", "build", "main", "--from", "missing"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));

    let listed = assert_success(&navtree(&temp_dir, &db_path, &["navigation", "list"]));
    assert_eq!(listed, "main\tfailed\tenabled\n");
}

#[test]
fn test_config_restricts_item_types() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = setup_test_repo(&temp_dir);
    fs::write(
        temp_dir.path().join("navtree.toml"),
        "logging = \"test\"\nitem_types = [\"text\"]\n",
    )
    .unwrap();
    assert_success(&navtree(&temp_dir, &db_path, &["navigation", "create", "main"]));

    let output = navtree(
        &temp_dir,
        &db_path,
        &["item", "add", "main", "Blog", "--url", "/blog"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("link"));
}
