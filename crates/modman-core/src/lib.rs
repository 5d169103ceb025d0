//! Core data types for modman.
//!
//! This crate describes what the host game knows about installed mods:
//! their identities, activation state and native dependency metadata,
//! exposed through the [`registry::ModRegistry`] trait. It also owns
//! package-id validation, the TOML mod-list loader, and global configuration.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod config;
pub mod modlist;
pub mod package_id;
pub mod registry;
