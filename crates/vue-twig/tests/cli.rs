//! Integration tests for the vue-twig binary.

use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vue-twig"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run vue-twig")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const CARD: &str = r#"<template>
  <article class="card">
    <h2 v-if="title">{{ title }}</h2>
    <button :disabled="busy" @click="save">Save</button>
  </article>
</template>

<script>
export default { props: ['title', 'busy'] }
</script>
"#;

const CARD_TWIG: &str = r#"<article class="card">
    {% if title %}<h2>{{ title }}</h2>{% endif %}
    <button disabled="{{ busy }}">Save</button>
  </article>"#;

#[derive(Debug, Deserialize)]
struct JsonFailure {
    filename: String,
    start: Option<JsonPosition>,
    code: String,
}

#[derive(Debug, Deserialize)]
struct JsonPosition {
    line: u32,
    column: u32,
}

#[test]
fn test_single_file_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Card.vue"), CARD).unwrap();

    let output = run(dir.path(), &["Card.vue"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), format!("{CARD_TWIG}\n"));
    assert!(stderr(&output).contains("converted 1 of 1 file"));
}

#[test]
fn test_directory_with_banners() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/nested")).unwrap();
    fs::write(dir.path().join("src/A.vue"), "<template><a></a></template>").unwrap();
    fs::write(
        dir.path().join("src/nested/B.vue"),
        "<template><b></b></template>",
    )
    .unwrap();

    let output = run(dir.path(), &["src"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "{# src/A.vue #}\n<a></a>\n{# src/nested/B.vue #}\n<b></b>\n"
    );
}

#[test]
fn test_out_dir_mirrors_layout() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/cards")).unwrap();
    fs::write(dir.path().join("src/cards/Card.vue"), CARD).unwrap();

    let output = run(dir.path(), &["src", "--out-dir", "build"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "");

    let written = fs::read_to_string(dir.path().join("build/cards/Card.twig")).unwrap();
    assert_eq!(written, format!("{CARD_TWIG}\n"));
}

#[test]
fn test_failure_sets_exit_code_and_location() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Bad.vue"),
        "<template>\n  <div>\n    <p v-else>x</p>\n  </div>\n</template>",
    )
    .unwrap();

    let output = run(dir.path(), &["Bad.vue"]);
    assert_eq!(output.status.code(), Some(1));
    let report = stderr(&output);
    assert!(report.contains("Bad.vue:3:5"), "{report}");
    assert!(report.contains("chain-state"), "{report}");
}

#[test]
fn test_json_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Two.vue"),
        "<template><a></a><b></b></template>",
    )
    .unwrap();

    let output = run(dir.path(), &["Two.vue", "--output", "json"]);
    assert_eq!(output.status.code(), Some(1));
    let failures: Vec<JsonFailure> = serde_json::from_str(&stderr(&output)).unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].filename, "Two.vue");
    assert_eq!(failures[0].code, "structural");
    let start = failures[0].start.as_ref().unwrap();
    assert_eq!((start.line, start.column), (1, 1));
}

#[test]
fn test_config_file_and_flag_override() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("vue-twig.json"),
        r#"{
            // partials for shared components
            "components": { "Badge": "partials/badge.twig" },
            "chainMode": "compat"
        }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("List.vue"),
        r#"<template><ul><li v-for="b in badges"><Badge :label="b.name"/></li></ul></template>"#,
    )
    .unwrap();

    let output = run(dir.path(), &["List.vue", "--trim-blocks"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "<ul>{%- for b in badges -%}<li>{%- include \"partials/badge.twig\" with { 'label': b.name, 'class': \"\" } -%}</li>{%- endfor -%}</ul>\n"
    );
}

#[test]
fn test_ignore_patterns() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("legacy")).unwrap();
    fs::write(dir.path().join("Keep.vue"), "<template><p></p></template>").unwrap();
    fs::write(dir.path().join("legacy/Old.vue"), "<template></template>").unwrap();

    let output = run(dir.path(), &[".", "--ignore", "legacy/**"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "<p></p>\n");
}

#[test]
fn test_missing_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["nope.vue"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no such file or directory"));
}
