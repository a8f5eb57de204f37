//! Command dispatch: one handler per subcommand

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use generational_arena::Index;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::ModelTree;
use crate::application::{CatalogEntry, Field};
use crate::cli::args::{Cli, Commands, ConfigCommands, NotesCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::notes::{pack, unpack_with_cap};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{InMemoryStore, InfraError};

/// Prefix of the temporary directory used when `roundtrip` gets no `--dir`.
pub const ROUNDTRIP_DIR_PREFIX: &str = "fmodel-roundtrip-";

pub fn execute(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage("no command given, see `fmodel --help`".to_string()));
    };

    if let Commands::Completion { shell } = command {
        clap_complete::generate(*shell, &mut Cli::command(), "fmodel", &mut io::stdout());
        return Ok(());
    }

    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("get current directory", e))?,
    };
    let settings = Settings::load(Some(&project_dir))?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Tree { scope, ids } => cmd_tree(cli, &container, scope.as_deref(), *ids),
        Commands::Show { id } => cmd_show(cli, &container, id),
        Commands::Get { id, field } => cmd_get(cli, &container, id, *field),
        Commands::Set { id, field, value } => cmd_set(cli, &container, id, *field, value),
        Commands::Export { scope, output } => cmd_export(cli, &container, scope.as_deref(), output),
        Commands::Import { file, into } => cmd_import(cli, &container, file, into),
        Commands::Roundtrip { scope, dir } => {
            cmd_roundtrip(cli, &container, scope.as_deref(), dir.as_deref())
        }
        Commands::Notes { command } => cmd_notes(&container, command),
        Commands::Config { command } => cmd_config(&container, &project_dir, command),
        Commands::Completion { .. } => Ok(()),
    }
}

// ============================================================
// Helpers
// ============================================================

fn store_path(cli: &Cli, container: &ServiceContainer) -> CliResult<PathBuf> {
    cli.store
        .clone()
        .or_else(|| container.settings.store_path.clone())
        .ok_or_else(|| {
            CliError::Usage("no model store: pass --store or set store_path".to_string())
        })
}

fn open_store(container: &ServiceContainer, path: &Path) -> CliResult<InMemoryStore> {
    if !container.fs.exists(path) {
        return Err(CliError::MissingStore(path.to_path_buf()));
    }
    let model = container.interchange.read(path)?;
    InMemoryStore::from_model(model).map_err(|e| InfraError::store(path, e).into())
}

fn save_store(container: &ServiceContainer, path: &Path, store: &InMemoryStore) -> CliResult<()> {
    container.interchange.write(path, &store.to_model())?;
    debug!("saved store to {}", path.display());
    Ok(())
}

/// Explicit scope, else the configured default, else the last root of the store.
fn resolve_scope(
    scope: Option<&str>,
    container: &ServiceContainer,
    store: &InMemoryStore,
) -> CliResult<String> {
    scope
        .map(str::to_string)
        .or_else(|| container.settings.default_scope.clone())
        .or_else(|| store.root_ids().last().map(|id| id.to_string()))
        .ok_or_else(|| CliError::Usage("no scope given and the store is empty".to_string()))
}

fn render_node(tree: &ModelTree, idx: Index, ids: bool) -> Tree<String> {
    let Some(node) = tree.get_node(idx) else {
        return Tree::new(String::new());
    };
    let mut label = match &node.payload {
        Some(object) if object.stereotype.is_empty() => object.name.clone(),
        Some(object) => format!("{} [{}]", object.name, object.stereotype),
        None => node.id.clone(),
    };
    if ids {
        label.push_str(&format!(" ({})", node.id));
    }
    let links = tree.consequence_links(idx).len();
    if links > 0 {
        label.push_str(&format!(" -> {links} consequence link(s)"));
    }

    let mut rendered = Tree::new(label);
    for &child in &node.children {
        rendered.push(render_node(tree, child, ids));
    }
    rendered
}

// ============================================================
// Commands
// ============================================================

#[instrument(skip(cli, container))]
fn cmd_tree(cli: &Cli, container: &ServiceContainer, scope: Option<&str>, ids: bool) -> CliResult<()> {
    let store = open_store(container, &store_path(cli, container)?)?;
    let scope = resolve_scope(scope, container, &store)?;
    let tree = container.model.load_tree(&store, &scope)?;

    match tree.root() {
        Some(root) => output::data(&render_node(&tree, root, ids)),
        None => output::warning(&format!("scope {scope} has no root element")),
    }
    for id in tree.unattached() {
        output::warning(&format!("not attached: {id}"));
    }
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_show(cli: &Cli, container: &ServiceContainer, id: &str) -> CliResult<()> {
    let store = open_store(container, &store_path(cli, container)?)?;
    let entry = CatalogEntry::require_with_cap(&store, id, container.settings.note_tag_cap)?;

    output::entry_header(entry.path(), &entry.classification());
    if entry.classification().is_override() {
        output::field("base", entry.base_id());
    }
    for field in entry.fields() {
        output::field(field, &entry.get(&store, *field)?);
    }
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_get(cli: &Cli, container: &ServiceContainer, id: &str, field: Field) -> CliResult<()> {
    let store = open_store(container, &store_path(cli, container)?)?;
    let entry = CatalogEntry::require_with_cap(&store, id, container.settings.note_tag_cap)?;
    output::data(&entry.get(&store, field)?);
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_set(
    cli: &Cli,
    container: &ServiceContainer,
    id: &str,
    field: Field,
    raw: &str,
) -> CliResult<()> {
    let value = field
        .parse_value(raw)
        .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    let path = store_path(cli, container)?;
    let mut store = open_store(container, &path)?;
    let entry = CatalogEntry::require_with_cap(&store, id, container.settings.note_tag_cap)?;

    entry.set(&mut store, field, value)?;
    save_store(container, &path, &store)?;

    output::status(true, &format!("{id}: {field} = {}", entry.get(&store, field)?));
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_export(
    cli: &Cli,
    container: &ServiceContainer,
    scope: Option<&str>,
    out: &Path,
) -> CliResult<()> {
    let store = open_store(container, &store_path(cli, container)?)?;
    let scope = resolve_scope(scope, container, &store)?;
    let model = container.model.export(&store, &scope)?;
    container.interchange.write(out, &model)?;

    output::status(
        true,
        &format!(
            "exported {} objects, {} relationships to {}",
            model.objects.len(),
            model.relationships.len(),
            out.display()
        ),
    );
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_import(cli: &Cli, container: &ServiceContainer, file: &Path, into: &str) -> CliResult<()> {
    let path = store_path(cli, container)?;
    let mut store = open_store(container, &path)?;
    let model = container.interchange.read(file)?;
    let root = container.model.import(&mut store, into, &model)?;
    save_store(container, &path, &store)?;

    output::status(true, &format!("imported {root} below {into}"));
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_roundtrip(
    cli: &Cli,
    container: &ServiceContainer,
    scope: Option<&str>,
    dir: Option<&Path>,
) -> CliResult<()> {
    let source = open_store(container, &store_path(cli, container)?)?;
    let scope = resolve_scope(scope, container, &source)?;
    // Dropped on return, which removes the default directory on every path
    let scratch_dir: tempfile::TempDir;
    let dir = match dir {
        Some(dir) => {
            container
                .fs
                .create_dir_all(dir)
                .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
            dir
        }
        None => {
            scratch_dir = tempfile::Builder::new()
                .prefix(ROUNDTRIP_DIR_PREFIX)
                .tempdir()
                .map_err(|e| InfraError::io("create temporary directory", e))?;
            scratch_dir.path()
        }
    };

    let mut scratch = InMemoryStore::new();
    let report = container
        .model
        .roundtrip(&source, &scope, &mut scratch, dir)?;

    output::field("objects", &report.objects);
    output::field("relationships", &report.relationships);
    output::field(&report.first_path.display(), &report.first_digest);
    output::field(&report.second_path.display(), &report.second_digest);

    output::status(report.is_identical(), &format!("round trip of {scope}"));
    if report.is_identical() {
        Ok(())
    } else {
        Err(CliError::RoundTripMismatch {
            first: report.first_path.display().to_string(),
            second: report.second_path.display().to_string(),
        })
    }
}

fn cmd_notes(container: &ServiceContainer, command: &NotesCommands) -> CliResult<()> {
    match command {
        NotesCommands::Pack { fields } => {
            let mut pairs = Vec::with_capacity(fields.len());
            for field in fields {
                let (key, value) = field.split_once('=').ok_or_else(|| {
                    CliError::InvalidArgs(format!("expected KEY=VALUE, got '{field}'"))
                })?;
                if key.len() != 2 || !key.chars().all(|c| c.is_ascii_uppercase()) {
                    return Err(CliError::InvalidArgs(format!(
                        "tag must be two uppercase letters: '{key}'"
                    )));
                }
                pairs.push((key, value));
            }
            output::data(&pack(&pairs));
        }
        NotesCommands::Unpack { text, cap } => {
            let cap = cap.unwrap_or(container.settings.note_tag_cap);
            for (tag, value) in unpack_with_cap(text, cap).iter() {
                output::data(&format!("{tag}={value}"));
            }
        }
    }
    Ok(())
}

fn cmd_config(
    container: &ServiceContainer,
    project_dir: &Path,
    command: &ConfigCommands,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::data(&container.settings.to_toml()?),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(global) => output::location("global", &global),
                None => output::warning("no global config directory on this platform"),
            }
            output::location("local", &local_config_path(project_dir));
        }
        ConfigCommands::Template => output::data(&Settings::template()),
    }
    Ok(())
}
