use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use modman_util::errors::ModmanResult;

/// Global user configuration loaded from `~/.modman/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Default input locations from `[paths]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_mod_list", rename = "mod-list")]
    pub mod_list: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mod_list: default_mod_list(),
        }
    }
}

fn default_mod_list() -> PathBuf {
    PathBuf::from("modlist.toml")
}

/// Where per-mod metadata lives, from `[manifest]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestConfig {
    #[serde(default = "default_about_dir", rename = "about-dir")]
    pub about_dir: String,
    #[serde(default = "default_file_name", rename = "file-name")]
    pub file_name: String,
    #[serde(default = "default_assemblies_dir", rename = "assemblies-dir")]
    pub assemblies_dir: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            about_dir: default_about_dir(),
            file_name: default_file_name(),
            assemblies_dir: default_assemblies_dir(),
        }
    }
}

fn default_about_dir() -> String {
    "About".to_string()
}

fn default_file_name() -> String {
    "Manifest.xml".to_string()
}

fn default_assemblies_dir() -> String {
    "Assemblies".to_string()
}

/// Logging preferences from `[log]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Surface developer-facing messages (alias resolution and the like).
    #[serde(default, rename = "dev-mode")]
    pub dev_mode: bool,
}

/// The slice of configuration the manifest resolver needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    pub manifest: ManifestConfig,
    pub dev_mode: bool,
}

impl ResolverConfig {
    /// Path of the manifest file for a mod rooted at `root`.
    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest.about_dir)
            .join(&self.manifest.file_name)
    }

    /// Directory searched for assemblies for a mod rooted at `root`.
    pub fn assemblies_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest.assemblies_dir)
    }
}

impl GlobalConfig {
    /// Load the global configuration from `~/.modman/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> ModmanResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path, returning defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> ModmanResult<Self> {
        if path.is_file() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                modman_util::errors::ModmanError::Config {
                    message: format!("Failed to read {}: {e}", path.display()),
                }
            })?;
            toml::from_str(&content).map_err(|e| {
                modman_util::errors::ModmanError::Config {
                    message: format!("Failed to parse {}: {e}", path.display()),
                }
                .into()
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    pub fn resolver(&self) -> ResolverConfig {
        ResolverConfig {
            manifest: self.manifest.clone(),
            dev_mode: self.log.dev_mode,
        }
    }
}

/// Returns the path to the modman data directory (`~/.modman/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".modman")
}
