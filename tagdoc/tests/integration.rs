#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::fs;

use tagdoc::input::load_document;
use tagdoc_config::Config;
use tagdoc_html::write_html;
use tempfile::tempdir;

const DOCUMENT: &str = r#"{
  "lines": [
    {"text": "Contents", "flags": ["html", "heading"]},
    {"text": "", "flags": ["toc"]},
    {"text": "Graphics", "flags": ["html", "heading"]},
    {"text": "<a name=\"blit\">void blit()</a>", "flags": ["html", "definition"]},
    {"text": "Copies a rectangle & more.", "flags": ["html"]},
    {"text": "stretch_blit", "flags": ["xref"]},
    {"text": "Sprites", "flags": ["html", "heading"]},
    {"text": "blit", "flags": ["xref"]},
    {"text": "stretch_blit", "flags": ["html", "definition"]}
  ],
  "toc": [
    {"text": "", "htmlable": false},
    {"text": "Graphics", "root": true},
    {"text": "blit"},
    {"text": "Sprites", "root": true},
    {"text": "stretch_blit"}
  ]
}"#;

#[test]
fn test_document_file_to_multifile_html() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input = temp_dir.path().join("allegro.json");
  let config_file = temp_dir.path().join("tagdoc.toml");
  let output = temp_dir.path().join("html").join("allegro.html");

  fs::write(&input, DOCUMENT).expect("Failed to write document in test");
  fs::write(
    &config_file,
    "document_title = \"Allegro Manual\"\nhtml_footer = \"Back to contents\"\n",
  )
  .expect("Failed to write config in test");
  fs::create_dir_all(output.parent().expect("Output has a parent"))
    .expect("Failed to create dir in test");

  let config =
    Config::load(&[config_file], &["multifile=true".to_string()])
      .expect("Failed to load config");
  let document = load_document(&input).expect("Failed to load document");
  let files =
    write_html(&document, &config, &output).expect("Failed to write html");

  let names: Vec<_> = files
    .iter()
    .filter_map(|file| file.file_name())
    .map(|name| name.to_string_lossy().into_owned())
    .collect();
  assert_eq!(names, ["allegro.html", "alleg000.html", "alleg001.html"]);

  let contents =
    fs::read_to_string(&files[0]).expect("Failed to read output in test");
  assert!(contents.contains("<li><a href=\"alleg000.html\">Graphics</a>"));
  assert!(contents.contains("<li><a href=\"alleg001.html\">Sprites</a>"));

  let graphics =
    fs::read_to_string(&files[1]).expect("Failed to read output in test");
  assert!(graphics.contains("<title>\nAllegro Manual: Graphics\n</title>"));
  assert!(graphics.contains("Copies a rectangle &amp; more.<br>"));
  assert!(graphics.contains("href=\"alleg001.html#stretch_blit\""));
  assert!(graphics.contains("<hr><a href=\"allegro.html\">Back to contents</a>"));

  let sprites =
    fs::read_to_string(&files[2]).expect("Failed to read output in test");
  assert!(sprites.contains("href=\"alleg000.html#blit\""));
  assert!(!sprites.contains("post_process"));
}

#[test]
fn test_missing_title_is_reported_before_writing() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input = temp_dir.path().join("doc.json");
  fs::write(&input, DOCUMENT).expect("Failed to write document in test");
  let output = temp_dir.path().join("doc.html");

  let config = Config::load(&[], &[]).expect("Failed to load config");
  let document = load_document(&input).expect("Failed to load document");

  let result = write_html(&document, &config, &output);
  assert!(result.is_err());
  assert!(!output.exists());
}
