use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn arbor_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("arbor");
    path
}

/// Builds a small export: a navigation index with "Home", a parent page
/// "Guides" holding one attachment reference, and a child page "Setup".
fn setup_export() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    fs::write(
        root.join("index.html"),
        r#"<html><head><title>Docs</title></head><body>
        <div id="main-content">
        <ul>
            <li><a href="index.html">Home</a></li>
            <li><a href="guides.html">Guides</a>
                <ul>
                    <li><a href="setup.html">Setup</a></li>
                </ul>
            </li>
        </ul>
        </div></body></html>"#,
    )
    .unwrap();

    fs::write(
        root.join("guides.html"),
        r#"<html><head><title>Docs : Guides</title></head><body>
        <div id="main-content">
            <h1>Guides</h1>
            <p>Start with the diagram.</p>
            <img src="attachments/diagram.png?version=2">
            <img class="emoticon" src="attachments/smile.gif">
            <a href="attachments/missing.pdf">handbook</a>
        </div></body></html>"#,
    )
    .unwrap();

    fs::write(
        root.join("setup.html"),
        r#"<html><head><title>Docs : Setup</title></head><body>
        <div id="main-content"><h1>Setup</h1><p>Install the thing.</p></div>
        </body></html>"#,
    )
    .unwrap();

    fs::create_dir_all(root.join("attachments")).unwrap();
    fs::write(root.join("attachments/diagram.png"), b"png bytes").unwrap();

    tmp
}

fn run_arbor(args: &[&str]) -> (String, String, bool) {
    let binary = arbor_binary();
    let output = Command::new(&binary)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run arbor binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn markdown_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "markdown".to_string(),
        "--input".to_string(),
        input.to_string_lossy().to_string(),
        "--output".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

fn run_markdown(input: &Path, output: &Path) -> (String, String, bool) {
    let args = markdown_args(input, output);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    run_arbor(&refs)
}

#[test]
fn test_markdown_mirrors_hierarchy() {
    let export = setup_export();
    let out = TempDir::new().unwrap();

    let (stdout, stderr, success) = run_markdown(export.path(), out.path());
    assert!(success, "markdown failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("conversion completed successfully"));

    let guides = out.path().join("Guides/Guides.md");
    let setup = out.path().join("Guides/Setup/Setup.md");
    assert!(guides.exists(), "missing {}", guides.display());
    assert!(setup.exists(), "missing {}", setup.display());

    // "Home" is the export's own root entry, not content.
    assert!(!out.path().join("Home").exists());
}

#[test]
fn test_markdown_relocates_attachments() {
    let export = setup_export();
    let out = TempDir::new().unwrap();

    run_markdown(export.path(), out.path());

    let copied = out.path().join("Guides/attachments/diagram.png");
    assert_eq!(fs::read(&copied).unwrap(), b"png bytes");

    let markdown = fs::read_to_string(out.path().join("Guides/Guides.md")).unwrap();
    assert!(
        markdown.contains("attachments/diagram.png"),
        "reference not rewritten: {}",
        markdown
    );
    // Query suffix is stripped by relocation.
    assert!(!markdown.contains("version=2"));
    // Missing attachment keeps its original reference.
    assert!(markdown.contains("attachments/missing.pdf"));
    // Emoticons are removed, not relocated.
    assert!(!markdown.contains("smile.gif"));
}

#[test]
fn test_markdown_is_idempotent_per_run() {
    let export = setup_export();
    let out = TempDir::new().unwrap();

    let (_, _, first) = run_markdown(export.path(), out.path());
    assert!(first);
    // A second run over the same output overwrites in place.
    let (_, _, second) = run_markdown(export.path(), out.path());
    assert!(second);
    assert!(out.path().join("Guides/Guides.md").exists());
}

#[test]
fn test_markdown_deduplicates_shared_pages() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(
        root.join("index.html"),
        r#"<html><body><ul>
            <li><a href="a.html">A</a>
                <ul><li><a href="shared.html">Shared</a></li></ul>
            </li>
            <li><a href="b.html">B</a>
                <ul><li><a href="shared.html">Shared</a></li></ul>
            </li>
        </ul></body></html>"#,
    )
    .unwrap();
    for (file, title) in [("a.html", "A"), ("b.html", "B"), ("shared.html", "Shared")] {
        fs::write(
            root.join(file),
            format!(
                "<html><head><title>Docs : {}</title></head>\
                 <body><div id=\"main-content\"><p>{} text</p></div></body></html>",
                title, title
            ),
        )
        .unwrap();
    }

    let out = TempDir::new().unwrap();
    let (stdout, _, success) = run_markdown(root, out.path());
    assert!(success, "markdown failed: {}", stdout);

    assert!(out.path().join("A/Shared/Shared.md").exists());
    // The second occurrence was skipped, not persisted twice.
    assert!(!out.path().join("B/Shared").exists());
    assert!(stdout.contains("1 duplicates skipped"));
}

#[test]
fn test_markdown_missing_page_skips_but_continues() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(
        root.join("index.html"),
        r#"<html><body><ul>
            <li><a href="gone.html">Gone</a></li>
            <li><a href="kept.html">Kept</a></li>
        </ul></body></html>"#,
    )
    .unwrap();
    fs::write(
        root.join("kept.html"),
        "<html><head><title>Docs : Kept</title></head>\
         <body><div id=\"main-content\"><p>kept text</p></div></body></html>",
    )
    .unwrap();

    let out = TempDir::new().unwrap();
    let (stdout, _, success) = run_markdown(root, out.path());
    assert!(success, "run should survive a missing page: {}", stdout);
    assert!(out.path().join("Kept/Kept.md").exists());
    assert!(stdout.contains("1 failed"));
}

#[test]
fn test_markdown_missing_input_fails() {
    let out = TempDir::new().unwrap();
    let (_, stderr, success) = run_markdown(Path::new("/nonexistent/export"), out.path());
    assert!(!success, "missing input should fail the run");
    assert!(stderr.contains("index.html"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_publish_requires_remote_config() {
    let export = setup_export();
    let out = TempDir::new().unwrap();
    let config = export.path().join("arbor.toml");
    fs::write(&config, "").unwrap();

    let (_, stderr, success) = run_arbor(&[
        "--config",
        config.to_str().unwrap(),
        "publish",
        "--input",
        export.path().to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
        "--collection",
        "col-1",
    ]);
    assert!(!success, "publish without [remote] should fail");
    assert!(stderr.contains("[remote]"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_collections_requires_config_file() {
    let (_, stderr, success) = run_arbor(&["--config", "/nonexistent/arbor.toml", "collections"]);
    assert!(!success);
    assert!(
        stderr.contains("Failed to read config file"),
        "unexpected stderr: {}",
        stderr
    );
}
