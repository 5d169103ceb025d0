//! Command dispatch and handler modules.

mod check;
mod parse;
mod show;

use std::path::{Path, PathBuf};

use miette::Result;
use modman_core::config::GlobalConfig;
use modman_core::modlist::InstalledMods;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => GlobalConfig::load_from(path)?,
        None => GlobalConfig::load()?,
    };

    match cli.command {
        Command::Check {
            mod_list,
            package_id,
            strict,
        } => check::exec(&config, mod_list.as_deref(), package_id.as_deref(), strict),
        Command::Show {
            package_id,
            mod_list,
        } => show::exec(&config, mod_list.as_deref(), &package_id),
        Command::Parse {
            lines,
            kind,
            mod_list,
        } => parse::exec(mod_list.as_deref(), &lines, kind.into()),
    }
}

/// The mod list given on the command line, or the configured one.
fn mod_list_path(config: &GlobalConfig, flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| config.paths.mod_list.clone())
}

fn load_mods(config: &GlobalConfig, flag: Option<&Path>) -> Result<InstalledMods> {
    let path = mod_list_path(config, flag);
    tracing::debug!("reading mod list {}", path.display());
    Ok(InstalledMods::from_path(&path)?)
}
