//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treedit/treedit.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `TREEDIT_*` prefix, `__` between nested keys

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{FieldNames, OrphanPolicy};

/// Which structural edits are allowed. Every flag defaults to false on its own.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Editable {
    /// Allow creating new items
    pub can_create: bool,
    /// Allow deleting leaf items
    pub can_delete: bool,
    /// Allow deleting items that have children (the subtree goes too)
    pub can_delete_parent: bool,
    /// Allow editing fields and moving items
    pub can_update: bool,
}

impl Editable {
    /// Everything allowed.
    pub fn all() -> Self {
        Self {
            can_create: true,
            can_delete: true,
            can_delete_parent: true,
            can_update: true,
        }
    }
}

/// Raw editable flags: `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawEditable {
    pub can_create: Option<bool>,
    pub can_delete: Option<bool>,
    pub can_delete_parent: Option<bool>,
    pub can_update: Option<bool>,
}

impl Editable {
    fn merge(&self, overlay: &RawEditable) -> Self {
        Self {
            can_create: overlay.can_create.unwrap_or(self.can_create),
            can_delete: overlay.can_delete.unwrap_or(self.can_delete),
            can_delete_parent: overlay.can_delete_parent.unwrap_or(self.can_delete_parent),
            can_update: overlay.can_update.unwrap_or(self.can_update),
        }
    }
}

/// Raw field names for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawFieldNames {
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub name: Option<String>,
    pub is_open: Option<String>,
}

fn merge_fields(base: &FieldNames, overlay: &RawFieldNames) -> FieldNames {
    FieldNames {
        id: overlay.id.clone().unwrap_or_else(|| base.id.clone()),
        parent_id: overlay
            .parent_id
            .clone()
            .unwrap_or_else(|| base.parent_id.clone()),
        name: overlay.name.clone().unwrap_or_else(|| base.name.clone()),
        is_open: overlay
            .is_open
            .clone()
            .unwrap_or_else(|| base.is_open.clone()),
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub fields: RawFieldNames,
    pub max_depth: Option<usize>,
    pub multiple_roots: Option<bool>,
    pub editable: RawEditable,
    pub logging: Option<bool>,
    pub orphans: Option<OrphanPolicy>,
    pub placeholder: Option<String>,
}

/// Unified configuration for treedit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Payload field names carrying structure
    pub fields: FieldNames,
    /// Deepest level new or moved items may reach (roots are level 0); unbounded if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Whether more than one root item is allowed
    pub multiple_roots: bool,
    /// Editability flags
    pub editable: Editable,
    /// Log cancelled operations at info level
    pub logging: bool,
    /// Handling of items that cannot be attached during unflatten
    pub orphans: OrphanPolicy,
    /// Text shown for an empty tree
    pub placeholder: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fields: FieldNames::default(),
            max_depth: None,
            multiple_roots: true,
            editable: Editable::default(),
            logging: false,
            orphans: OrphanPolicy::default(),
            placeholder: "Create your first item".into(),
        }
    }
}

/// Get the XDG config directory for treedit.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treedit").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treedit.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins where specified.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            fields: merge_fields(&self.fields, &overlay.fields),
            max_depth: overlay.max_depth.or(self.max_depth),
            multiple_roots: overlay.multiple_roots.unwrap_or(self.multiple_roots),
            editable: self.editable.merge(&overlay.editable),
            logging: overlay.logging.unwrap_or(self.logging),
            orphans: overlay.orphans.unwrap_or(self.orphans),
            placeholder: overlay
                .placeholder
                .clone()
                .unwrap_or_else(|| self.placeholder.clone()),
        }
    }

    /// Load settings with layered precedence on top of compiled defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_onto(Self::default(), explicit)
    }

    /// Load settings with layered precedence on top of `base`.
    ///
    /// # Precedence (lowest to highest)
    /// 1. `base`
    /// 2. Global config: `$XDG_CONFIG_HOME/treedit/treedit.toml`
    /// 3. Explicit config file; must exist when given
    /// 4. Environment variables: `TREEDIT_*` prefix
    pub fn load_onto(base: Self, explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = base;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = explicit {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current, None)
    }

    /// Apply TREEDIT_* environment variables as explicit overrides.
    ///
    /// `source` replaces the process environment when given.
    pub fn apply_env_overrides(
        mut settings: Self,
        source: Option<config::Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("TREEDIT")
                .prefix_separator("_")
                .separator("__")
                .source(source),
        );

        let config = builder.build().map_err(config_err)?;

        for (key, field) in [
            ("fields.id", &mut settings.fields.id),
            ("fields.parent_id", &mut settings.fields.parent_id),
            ("fields.name", &mut settings.fields.name),
            ("fields.is_open", &mut settings.fields.is_open),
            ("placeholder", &mut settings.placeholder),
        ] {
            if let Ok(val) = config.get_string(key) {
                *field = val;
            }
        }
        if let Ok(val) = config.get_int("max_depth") {
            let depth = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("max_depth must not be negative: {val}"),
            })?;
            settings.max_depth = Some(depth);
        }
        for (key, flag) in [
            ("multiple_roots", &mut settings.multiple_roots),
            ("logging", &mut settings.logging),
            ("editable.can_create", &mut settings.editable.can_create),
            ("editable.can_delete", &mut settings.editable.can_delete),
            ("editable.can_delete_parent", &mut settings.editable.can_delete_parent),
            ("editable.can_update", &mut settings.editable.can_update),
        ] {
            if let Ok(val) = config.get_bool(key) {
                *flag = val;
            }
        }
        if let Ok(val) = config.get_string("orphans") {
            settings.orphans = match val.to_lowercase().as_str() {
                "drop" => OrphanPolicy::Drop,
                "fail" => OrphanPolicy::Fail,
                other => {
                    return Err(ApplicationError::Config {
                        message: format!("unknown orphan policy: {other}"),
                    })
                }
            };
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treedit configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/treedit/treedit.toml
#   Explicit: --config <file>
#   Env:      TREEDIT_* environment variables, e.g. TREEDIT_EDITABLE__CAN_DELETE=true

# Deepest level new items may be created at (roots are level 0)
# max_depth = 3

# Allow more than one root item
# multiple_roots = true

# Log cancelled operations at info level
# logging = false

# Items with a missing parent: "drop" them with a warning, or "fail"
# orphans = "drop"

# Text shown for an empty tree
# placeholder = "Create your first item"

[fields]
# id = "id"
# parent_id = "parentId"
# name = "name"
# is_open = "isOpen"

[editable]
# can_create = true
# can_delete = true
# can_delete_parent = false
# can_update = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
