//! Dependency constraint model and manifest resolution.
//!
//! A mod's manifest aggregates constraints from its `About/Manifest.xml`
//! and from the host's native metadata, resolves the mod's version, and
//! partitions every constraint into met and missing sets on demand.

pub mod assembly;
pub mod dependency;
pub mod manifest;
pub mod manifest_xml;
pub mod report;
pub mod store;
pub mod version;
