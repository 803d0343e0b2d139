//! Command dispatch: load, edit, save, print

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::application::{
    ApplicationError, Cancelled, DefaultItemFactory, TreeEditor, TreeOptions,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{self, Editable, Settings};
use crate::domain::{flatten_with, unflatten, ItemId, ToTermTree};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::store::{load_nested, write_json_stdout, ItemStore, JsonFileStore};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `treedit --help`".into(),
        ));
    };
    let settings = load_settings(cli)?;

    match command {
        Commands::Show { file } => cmd_show(&settings, file),
        Commands::Nest { file } => cmd_nest(&settings, file),
        Commands::Flatten { file } => cmd_flatten(&settings, file),
        Commands::Add { file, parent, name } => {
            cmd_add(settings, file, parent.as_deref(), name.as_deref())
        }
        Commands::Remove { file, id } => cmd_remove(settings, file, id),
        Commands::Move { file, id, parent } => cmd_move(settings, file, id, parent.as_deref()),
        Commands::Rename { file, id, name } => cmd_rename(settings, file, id, name),
        Commands::Config { command } => cmd_config(&settings, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "treedit", &mut io::stdout());
            Ok(())
        }
    }
}

/// CLI settings: everything editable unless config says otherwise, then `--max-depth`.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let base = Settings {
        editable: Editable::all(),
        ..Settings::default()
    };
    let mut settings = Settings::load_onto(base, cli.config.as_deref())?;
    if cli.max_depth.is_some() {
        settings.max_depth = cli.max_depth;
    }
    debug!(?settings, "effective settings");
    Ok(settings)
}

fn open_editor(settings: &Settings, store: &JsonFileStore) -> CliResult<TreeEditor> {
    let items = store.load()?;
    let options = TreeOptions::new(settings.clone());
    Ok(TreeEditor::from_flat(items, options)?)
}

fn save(editor: &TreeEditor, store: &JsonFileStore) -> CliResult<()> {
    store.save(&editor.to_flat())?;
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_show(settings: &Settings, file: &Path) -> CliResult<()> {
    let items = JsonFileStore::new(file).load()?;
    let tree = unflatten(items, &settings.fields, settings.orphans).map_err(ApplicationError::from)?;
    if tree.is_empty() {
        output::empty_tree(&settings.placeholder);
        return Ok(());
    }
    let title = file.display().to_string();
    output::data(&tree.as_slice().to_term_tree(&settings.fields, &title));
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_nest(settings: &Settings, file: &Path) -> CliResult<()> {
    let items = JsonFileStore::new(file).load()?;
    let tree = unflatten(items, &settings.fields, settings.orphans).map_err(ApplicationError::from)?;
    write_json_stdout(&tree)?;
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_flatten(settings: &Settings, file: &Path) -> CliResult<()> {
    let tree = load_nested(file)?;
    write_json_stdout(&flatten_with(tree, &settings.fields))?;
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_add(
    settings: Settings,
    file: &Path,
    parent: Option<&str>,
    name: Option<&str>,
) -> CliResult<()> {
    let store = JsonFileStore::new(file);
    let items = store.load()?;
    let names = settings.fields.clone();
    let mut factory = DefaultItemFactory::new(names.clone());
    if let Some(name) = name {
        factory = factory.with_name(non_empty(name)?);
    }
    let options = TreeOptions::new(settings).with_factory(factory);
    let mut editor = TreeEditor::from_flat(items, options)?;

    let parent = parent.map(|p| resolve_id(&editor, p));
    let label = match &parent {
        Some(parent) => editor.add_child(parent, None),
        None => editor.create(None, None),
    }
    .map_err(edit_err)?
    .label(&names);
    save(&editor, &store)?;
    output::edited("Created", &label);
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_remove(settings: Settings, file: &Path, id: &str) -> CliResult<()> {
    let store = JsonFileStore::new(file);
    let mut editor = open_editor(&settings, &store)?;
    let id = resolve_id(&editor, id);
    let removed = editor.delete(&id).map_err(edit_err)?;
    save(&editor, &store)?;
    output::edited(
        "Removed",
        &format!("{} ({} items)", removed.item.label(&settings.fields), removed.len()),
    );
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_move(settings: Settings, file: &Path, id: &str, parent: Option<&str>) -> CliResult<()> {
    let store = JsonFileStore::new(file);
    let mut editor = open_editor(&settings, &store)?;
    let id = resolve_id(&editor, id);
    let parent = parent.map(|p| resolve_id(&editor, p));
    let label = editor
        .move_item(&id, parent.as_ref())
        .map_err(edit_err)?
        .label(&settings.fields);
    save(&editor, &store)?;
    match parent {
        Some(parent) => output::edited("Moved", &format!("{label} under {parent}")),
        None => output::edited("Moved", &format!("{label} to root")),
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_rename(settings: Settings, file: &Path, id: &str, name: &str) -> CliResult<()> {
    let store = JsonFileStore::new(file);
    let mut editor = open_editor(&settings, &store)?;
    let mut changes = Map::new();
    changes.insert(
        settings.fields.name.clone(),
        Value::String(non_empty(name)?.to_string()),
    );
    let id = resolve_id(&editor, id);
    let label = editor
        .update(&id, changes)
        .map_err(edit_err)?
        .label(&settings.fields);
    save(&editor, &store)?;
    output::edited("Renamed", &label);
    Ok(())
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::data(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let template = Settings::template();
            if !global {
                output::data(&template);
                return Ok(());
            }
            let path = config::global_config_path().ok_or_else(|| {
                CliError::Usage("cannot determine global config directory".into())
            })?;
            if path.exists() {
                output::warning(&format!("config already exists: {}", path.display()));
                return Ok(());
            }
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
            }
            std::fs::write(&path, template)
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::edited("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            output::header("Config locations");
            match config::global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "exists" } else { "not found" };
                    output::detail(&format!("global: {} ({state})", path.display()));
                }
                None => output::detail("global: <unavailable>"),
            }
            output::detail("env:    TREEDIT_* (nested keys separated by __)");
            Ok(())
        }
    }
}

fn non_empty(name: &str) -> CliResult<&str> {
    match name.trim() {
        "" => Err(CliError::InvalidArgs("name must not be empty".into())),
        trimmed => Ok(trimmed),
    }
}

/// Numeric input matches integer ids first, then string ids spelled the same.
fn resolve_id(editor: &TreeEditor, input: &str) -> ItemId {
    let id = ItemId::from_input(input);
    if matches!(id, ItemId::Int(_)) && editor.find(&id).is_none() {
        let as_str = ItemId::from(input);
        if editor.find(&as_str).is_some() {
            return as_str;
        }
    }
    id
}

fn edit_err(cancelled: Cancelled) -> CliError {
    ApplicationError::from(cancelled).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::{item, str_item};

    #[test]
    fn given_numeric_string_id_when_resolving_then_falls_back_to_string() {
        let items = vec![item(1, 0, "int"), str_item("7", None, "str")];
        let editor = TreeEditor::from_flat(items, TreeOptions::default()).unwrap();

        assert_eq!(resolve_id(&editor, "1"), ItemId::Int(1));
        assert_eq!(resolve_id(&editor, "7"), ItemId::from("7"));
        assert_eq!(resolve_id(&editor, "9"), ItemId::Int(9));
    }
}
