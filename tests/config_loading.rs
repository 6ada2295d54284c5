mod common;

use std::fs;
use std::path::Path;

use common::ConfigFileBuilder;
use taskroute::config::{build_rule_map, load_and_validate, parse_str, ConfigFile};
use taskroute::errors::TaskrouteError;
use taskroute::types::FilesSpec;
use tempfile::tempdir;

fn validate(text: &str) -> Result<ConfigFile, TaskrouteError> {
    ConfigFile::try_from(parse_str(text)?)
}

#[test]
fn full_config_round_trips_into_accessors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Taskroute.toml");
    fs::write(
        &path,
        r#"
files = ["src/**", "*.md"]

[options]
watch = true
fields = ["size"]

[watch]
poll_interval_ms = 100

[hooks]
before = "mkdir -p dist"
after = "echo done"

[[rule]]
pattern = '\.src$'
cmd = "compile $TASKROUTE_PATH"

[[rule]]
pattern = '\.md$'
cmd = "render $TASKROUTE_PATH"
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(
        cfg.files(),
        Some(&FilesSpec::Many(vec!["src/**".into(), "*.md".into()]))
    );
    assert!(cfg.options().watch);
    assert!(!cfg.options().commit);
    assert_eq!(cfg.options().fields, vec!["size".to_string()]);
    assert_eq!(cfg.watch_section().poll_interval_ms, 100);
    assert_eq!(cfg.hooks().before.as_deref(), Some("mkdir -p dist"));
    assert_eq!(cfg.rules().len(), 2);
    assert_eq!(cfg.rules()[0].pattern, r"\.src$");
}

#[test]
fn defaults_apply_to_a_minimal_config() {
    let cfg = validate("[[rule]]\npattern = 'x'\ncmd = 'true'\n").unwrap();
    assert!(cfg.files().is_none());
    assert!(!cfg.options().watch);
    assert_eq!(cfg.watch_section().poll_interval_ms, 250);
    assert!(cfg.hooks().before.is_none());
}

#[test]
fn single_string_files_field() {
    let cfg = validate("files = 'src/**'\n[[rule]]\npattern = 'x'\ncmd = 'true'\n").unwrap();
    assert_eq!(cfg.files(), Some(&FilesSpec::One("src/**".into())));
}

#[test]
fn watch_with_commit_is_rejected_at_load() {
    let raw = ConfigFileBuilder::new()
        .with_rule("x", "true")
        .with_watch(true)
        .with_commit(true)
        .raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(TaskrouteError::WatchWithCommit)
    ));
}

#[test]
fn config_without_rules_is_rejected() {
    let err = validate("[options]\nwatch = false\n").unwrap_err();
    assert!(matches!(err, TaskrouteError::ConfigError(_)));
}

#[test]
fn malformed_pattern_is_rejected_with_the_pattern() {
    let err = validate("[[rule]]\npattern = '(oops'\ncmd = 'true'\n").unwrap_err();
    match err {
        TaskrouteError::Pattern { pattern, .. } => assert_eq!(pattern, "(oops"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_cmd_and_zero_interval_are_rejected() {
    assert!(validate("[[rule]]\npattern = 'x'\ncmd = '  '\n").is_err());
    assert!(validate("[watch]\npoll_interval_ms = 0\n[[rule]]\npattern = 'x'\ncmd = 'true'\n").is_err());
    assert!(validate("[hooks]\nafter = ''\n[[rule]]\npattern = 'x'\ncmd = 'true'\n").is_err());
}

#[test]
fn unknown_toml_syntax_is_a_toml_error() {
    assert!(matches!(parse_str("[[rule]\n"), Err(TaskrouteError::TomlError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_and_validate(dir.path().join("nope.toml")),
        Err(TaskrouteError::IoError(_))
    ));
}

#[test]
fn repeated_rule_patterns_collapse_in_the_rule_map() {
    let cfg = ConfigFileBuilder::new()
        .with_rule(r"\.src$", "first")
        .with_rule(r"\.md$", "doc")
        .with_rule(r"\.src$", "second")
        .build();
    let map = build_rule_map(&cfg, Path::new("."));
    assert_eq!(map.len(), 2);
}
