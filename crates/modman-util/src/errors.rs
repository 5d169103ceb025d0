use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all modman operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ModmanError {
    /// A dependency line did not split into 1 to 3 tokens.
    #[error("Malformed dependency line: '{line}'")]
    #[diagnostic(help("Expected `<packageId>`, `<packageId> <op><version>` or `<packageId> <op> <version>`"))]
    MalformedDependency { line: String },

    /// A package id neither matched the id format nor resolved as a legacy alias.
    #[error("Invalid packageId: '{id}'")]
    #[diagnostic(help("Package ids look like `author.modname`"))]
    InvalidPackageId { id: String },

    /// A mod's Manifest.xml could not be read or parsed.
    #[error("Failed to parse manifest {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    /// A version string (or range operand) could not be parsed.
    #[error("Invalid version: '{input}'")]
    VersionParse { input: String },

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.modman/config.toml for syntax errors"))]
    Config { message: String },

    /// Invalid or unreadable mod list.
    #[error("Mod list error: {message}")]
    ModList { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type ModmanResult<T> = miette::Result<T>;
