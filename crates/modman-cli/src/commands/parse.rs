//! Handler for `modman parse`.

use std::path::Path;

use miette::Result;
use modman_core::modlist::InstalledMods;
use modman_resolver::dependency::{Dependency, DependencyKind};
use modman_util::errors::ModmanError;
use modman_util::progress::{self, Tone};

pub fn exec(mod_list: Option<&Path>, lines: &[String], kind: DependencyKind) -> Result<()> {
    let mods = match mod_list {
        Some(path) => InstalledMods::from_path(path)?,
        None => InstalledMods::new(),
    };

    let mut failures = 0;
    for line in lines {
        match Dependency::parse(line, kind, "", &mods) {
            Ok(dep) => println!("{dep}"),
            Err(e) => {
                failures += 1;
                progress::status(Tone::Error, "Error", &e.to_string());
            }
        }
    }

    if failures > 0 {
        return Err(ModmanError::Generic {
            message: format!("{failures} of {} lines could not be parsed", lines.len()),
        }
        .into());
    }
    Ok(())
}
