//! CLI argument definitions for modman.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use modman_resolver::dependency::DependencyKind;

#[derive(Parser, Debug)]
#[command(
    name = "modman",
    version,
    about = "Dependency and version checks for installed game mods",
    long_about = "modman reads each mod's Manifest.xml and the host's mod metadata, \
                  resolves mod versions, and reports which dependency, incompatibility \
                  and load-order constraints are met or missing."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this configuration file instead of ~/.modman/config.toml
    #[arg(long, global = true, env = "MODMAN_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report missing requirements of active mods
    Check {
        /// Mod list to read (defaults to the configured mod list)
        #[arg(long)]
        mod_list: Option<PathBuf>,
        /// Check a single mod by package id (active or not)
        #[arg(long = "mod")]
        package_id: Option<String>,
        /// Fail when any requirement is missing
        #[arg(long)]
        strict: bool,
    },

    /// Print a mod's resolved manifest
    Show {
        /// Package id of the mod
        package_id: String,
        /// Mod list to read (defaults to the configured mod list)
        #[arg(long)]
        mod_list: Option<PathBuf>,
    },

    /// Parse dependency lines and print the normalized constraint
    Parse {
        /// Lines such as `author.mod >= 1.2.0`
        #[arg(required = true)]
        lines: Vec<String>,
        /// Constraint kind the lines belong to
        #[arg(long, value_enum, default_value_t = KindArg::DependsOn)]
        kind: KindArg,
        /// Mod list used to resolve legacy names (optional)
        #[arg(long)]
        mod_list: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    DependsOn,
    Incompatible,
    LoadBefore,
    LoadAfter,
}

impl From<KindArg> for DependencyKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::DependsOn => DependencyKind::DependsOn,
            KindArg::Incompatible => DependencyKind::Incompatible,
            KindArg::LoadBefore => DependencyKind::LoadBefore,
            KindArg::LoadAfter => DependencyKind::LoadAfter,
        }
    }
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
