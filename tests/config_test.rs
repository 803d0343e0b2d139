//! Integration tests for Settings loading with layered merge semantics.
//!
//! Merge Semantics:
//! - Defaults → Global → Explicit file: overlay wins where a key is present
//! - Any → Env vars: REPLACE (explicit user override)
//!
//! Note: These tests assume no global config exists on the test machine,
//! so explicit files effectively merge onto the compiled defaults.

use std::fs;

use tempfile::TempDir;

use treedit::application::ApplicationError;
use treedit::config::{Editable, RawSettings, Settings};
use treedit::domain::OrphanPolicy;

fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

// ============================================================
// Defaults
// ============================================================

#[test]
fn given_no_sources_when_defaults_then_nothing_is_editable() {
    let settings = Settings::default();

    assert_eq!(settings.editable, Editable::default());
    assert!(settings.multiple_roots);
    assert_eq!(settings.max_depth, None);
    assert_eq!(settings.orphans, OrphanPolicy::Drop);
    assert_eq!(settings.fields.parent_id, "parentId");
    assert_eq!(settings.placeholder, "Create your first item");
}

// ============================================================
// Explicit config file
// ============================================================

#[test]
fn given_explicit_file_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treedit.toml");
    fs::write(
        &path,
        r#"
max_depth = 2
multiple_roots = false
orphans = "fail"

[fields]
parent_id = "parent"

[editable]
can_create = true
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(path.as_path())).expect("load settings");

    assert_eq!(settings.max_depth, Some(2));
    assert!(!settings.multiple_roots);
    assert_eq!(settings.orphans, OrphanPolicy::Fail);
    assert_eq!(settings.fields.parent_id, "parent");
    assert_eq!(settings.fields.id, "id", "unspecified field names inherit");
    assert!(settings.editable.can_create);
    assert!(!settings.editable.can_delete);
}

#[test]
fn given_base_with_everything_editable_when_file_disables_delete_then_only_delete_changes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treedit.toml");
    fs::write(&path, "[editable]\ncan_delete = false\n").unwrap();
    let base = Settings {
        editable: Editable::all(),
        ..Settings::default()
    };

    let settings = Settings::load_onto(base, Some(path.as_path())).expect("load settings");

    assert!(!settings.editable.can_delete);
    assert!(settings.editable.can_create);
    assert!(settings.editable.can_delete_parent);
    assert!(settings.editable.can_update);
}

#[test]
fn given_missing_explicit_file_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();

    let result = Settings::load(Some(dir.path().join("absent.toml").as_path()));

    assert!(result.unwrap_err().to_string().contains("absent.toml"));
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "max_depth = [not toml").unwrap();

    let result = Settings::load(Some(path.as_path()));

    assert!(result.unwrap_err().to_string().starts_with("config error"));
}

// ============================================================
// Environment overrides
// ============================================================

#[test]
fn given_env_vars_when_applied_then_override_file_values() {
    let base = Settings {
        max_depth: Some(5),
        ..Settings::default()
    };
    let source = env(&[
        ("TREEDIT_MAX_DEPTH", "1"),
        ("TREEDIT_EDITABLE__CAN_DELETE", "true"),
        ("TREEDIT_FIELDS__NAME", "title"),
        ("TREEDIT_ORPHANS", "FAIL"),
    ]);

    let settings = Settings::apply_env_overrides(base, source).unwrap();

    assert_eq!(settings.max_depth, Some(1));
    assert!(settings.editable.can_delete);
    assert!(!settings.editable.can_create);
    assert_eq!(settings.fields.name, "title");
    assert_eq!(settings.orphans, OrphanPolicy::Fail);
}

#[test]
fn given_unknown_orphan_policy_in_env_when_applied_then_error() {
    let result = Settings::apply_env_overrides(
        Settings::default(),
        env(&[("TREEDIT_ORPHANS", "adopt")]),
    );

    assert!(result.unwrap_err().to_string().contains("adopt"));
}

#[test]
fn given_negative_max_depth_in_env_when_applied_then_error_instead_of_unbounded() {
    let base = Settings {
        max_depth: Some(3),
        ..Settings::default()
    };

    let result = Settings::apply_env_overrides(base, env(&[("TREEDIT_MAX_DEPTH", "-1")]));

    let err = result.unwrap_err();
    assert!(matches!(err, ApplicationError::Config { .. }));
    assert!(err.to_string().contains("-1"));
}

#[test]
fn given_unrelated_env_vars_when_applied_then_settings_unchanged() {
    let settings = Settings::apply_env_overrides(
        Settings::default(),
        env(&[("OTHER_MAX_DEPTH", "1"), ("TREEDITX", "true")]),
    )
    .unwrap();

    assert_eq!(settings, Settings::default());
}

// ============================================================
// Serialization
// ============================================================

#[test]
fn given_settings_when_shown_as_toml_then_parses_back() {
    let settings = Settings {
        max_depth: Some(3),
        editable: Editable::all(),
        ..Settings::default()
    };

    let text = settings.to_toml().unwrap();
    let raw: RawSettings = toml::from_str(&text).unwrap();

    assert_eq!(Settings::default().merge_with(&raw), settings);
}

#[test]
fn given_template_when_written_and_loaded_then_equals_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treedit.toml");
    fs::write(&path, Settings::template()).unwrap();

    let settings = Settings::load(Some(path.as_path())).unwrap();

    assert_eq!(settings, Settings::default());
}
