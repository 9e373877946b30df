//! Command dispatch: each subcommand loads the corpus tree, applies the engine
//! operations it names and renders the result.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::render::{self, RenderOptions, TreeNodeConvert};
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{CorpusTreeEngine, NodeId};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{SelectionItem, Selector};
use crate::infrastructure::InfraError;

/// Execute a CLI command.
pub fn execute(cli: Cli) -> CliResult<()> {
    let config_dir = cli.config_dir.clone();
    let settings = Settings::load(config_dir.as_deref().or(Some(Path::new("."))))?;
    let container = ServiceContainer::new(settings);
    execute_with(&container, cli)
}

/// Execute a CLI command against an explicit container (tests inject fakes here).
pub fn execute_with(container: &ServiceContainer, cli: Cli) -> CliResult<()> {
    match cli.command {
        Some(Commands::Tree {
            file,
            query,
            expand_all,
            expand,
            priority,
        }) => cmd_tree(container, file, query, expand_all, &expand, priority),
        Some(Commands::Search {
            file,
            query,
            matching,
        }) => cmd_search(container, file, &query.join(" "), matching),
        Some(Commands::Select {
            file,
            query,
            none,
            toggle,
            request,
        }) => cmd_select(container, file, query, none, &toggle, request),
        Some(Commands::Pick { file, query }) => cmd_pick(container, file, query),
        Some(Commands::Config { command }) => cmd_config(container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".to_string())),
    }
}

/// Load the engine from `file`, falling back to the configured corpora file.
fn load_engine(
    container: &ServiceContainer,
    file: Option<PathBuf>,
) -> CliResult<CorpusTreeEngine> {
    let path = file
        .or_else(|| container.settings.corpora_file.clone())
        .ok_or(ApplicationError::NoCorporaFile)?;
    debug!("load_engine: {}", path.display());
    Ok(container.corpus_service.load_file(&path)?)
}

#[instrument(level = "debug", skip(container))]
fn cmd_tree(
    container: &ServiceContainer,
    file: Option<PathBuf>,
    query: Option<String>,
    expand_all: bool,
    expand: &[String],
    priority: bool,
) -> CliResult<()> {
    let mut engine = load_engine(container, file)?;
    if let Some(query) = query.as_deref() {
        engine.search(query);
    }
    for path in expand {
        let id = engine.resolve(path)?;
        // expand the whole chain so the node is actually reachable in the view
        let mut current = Some(id);
        while let Some(cur) = current {
            if !engine.get(cur).is_some_and(|n| n.expanded) {
                engine.toggle_expansion(cur)?;
            }
            current = engine.parent(cur);
        }
    }

    let mut options = RenderOptions::from(&container.settings.display);
    options.expand_all |= expand_all;
    options.show_priority |= priority;
    output::info(&engine.to_tree_string(options));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_search(
    container: &ServiceContainer,
    file: Option<PathBuf>,
    query: &str,
    matching: bool,
) -> CliResult<()> {
    let mut engine = load_engine(container, file)?;
    engine.search(query);

    let mut ranked: Vec<(u32, String)> = engine
        .iter()
        .filter(|(_, node)| !matching || node.priority > 0)
        .filter_map(|(id, node)| engine.path_of(id).map(|path| (node.priority, path)))
        .collect();
    // stable: equal scores stay in tree order
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    for (priority, path) in &ranked {
        output::ranked(*priority, path);
    }
    let stats = engine.stats();
    debug!("cmd_search: {} of {} corpora match", stats.matching, stats.total);
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_select(
    container: &ServiceContainer,
    file: Option<PathBuf>,
    query: Option<String>,
    none: bool,
    toggle: &[String],
    request: Option<String>,
) -> CliResult<()> {
    let mut engine = load_engine(container, file)?;
    if let Some(query) = query.as_deref() {
        engine.search(query);
    }
    if none {
        engine.select_all(false);
    }
    for path in toggle {
        let id = engine.resolve(path)?;
        let selected = engine.toggle_selection(id)?;
        debug!("cmd_select: {} -> {}", path, selected);
    }

    match request {
        Some(text) => {
            let request =
                container
                    .corpus_service
                    .build_request(&engine, &text, &container.settings.search)?;
            let json = serde_json::to_string_pretty(&request).map_err(InfraError::from)?;
            output::info(&json);
        }
        None => print_selection(&engine),
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_pick(
    container: &ServiceContainer,
    file: Option<PathBuf>,
    query: Option<String>,
) -> CliResult<()> {
    let mut engine = load_engine(container, file)?;
    if let Some(query) = query.as_deref() {
        engine.search(query);
    }

    let options = RenderOptions {
        show_priority: query.is_some(),
        ..RenderOptions::default()
    };
    match pick_and_toggle(&mut engine, container.selector.as_ref(), options)? {
        Some((id, selected)) => {
            let label = if selected { "Selected" } else { "Deselected" };
            let path = engine.path_of(id).unwrap_or_default();
            output::action(label, &path);
            print_selection(&engine);
        }
        None => output::warning("nothing picked"),
    }
    Ok(())
}

/// Offer every node in pre-order, toggle the picked one's selection.
///
/// Returns the picked node and its new selection value, None when cancelled.
pub fn pick_and_toggle(
    engine: &mut CorpusTreeEngine,
    selector: &dyn Selector,
    options: RenderOptions,
) -> CliResult<Option<(NodeId, bool)>> {
    let (ids, items): (Vec<NodeId>, Vec<SelectionItem>) = engine
        .iter()
        .filter_map(|(id, node)| {
            let path = engine.path_of(id)?;
            let indent = "  ".repeat(engine.depth_of(id));
            let item = SelectionItem {
                display: format!("{}{}", indent, render::label(node, options)),
                value: path,
            };
            Some((id, item))
        })
        .unzip();

    let picked = selector
        .select_one(&items, "corpus> ")
        .map_err(|message| InfraError::Selector { message })?;
    let Some(pos) = picked else {
        return Ok(None);
    };
    let id = *ids.get(pos).ok_or_else(|| InfraError::Selector {
        message: format!("picked item {pos} of {}", ids.len()),
    })?;
    let selected = engine.toggle_selection(id)?;
    debug!("pick_and_toggle: {} -> {}", id, selected);
    Ok(Some((id, selected)))
}

fn cmd_config(container: &ServiceContainer, command: ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no global config directory on this platform"),
            }
            output::action("local", &local_config_path(Path::new(".")).display());
        }
    }
    Ok(())
}

fn print_selection(engine: &CorpusTreeEngine) {
    let stats = engine.stats();
    output::header(&format!(
        "{} of {} corpora selected",
        stats.selected, stats.total
    ));
    for (id, _) in engine.selected() {
        if let Some(path) = engine.path_of(id) {
            output::detail(&path);
        }
    }
}
