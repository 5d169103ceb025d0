//! Assembly file versions.
//!
//! A mod without an explicit manifest version takes the file version of
//! its last assembly. The file version is read from the `RT_VERSION`
//! resource of the PE image, not the assembly version.

use std::path::{Path, PathBuf};

use goblin::pe::section_table::SectionTable;
use goblin::pe::PE;

/// Resource type id of version resources.
const RT_VERSION: u32 = 16;

/// `VS_FIXEDFILEINFO.dwSignature`.
const FIXED_FILE_INFO_SIGNATURE: u32 = 0xFEEF_04BD;

/// High bit of a resource directory entry: named entry / subdirectory.
const HIGH_BIT: u32 = 0x8000_0000;

/// Reads a file-version string from a compiled assembly.
pub trait FileVersionReader {
    fn file_version(&self, path: &Path) -> Option<String>;
}

/// Reads the fixed file-info block from a PE image's version resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeFileVersion;

impl FileVersionReader for PeFileVersion {
    fn file_version(&self, path: &Path) -> Option<String> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("cannot read assembly {}: {e}", path.display());
                return None;
            }
        };
        fixed_file_version(&bytes)
    }
}

/// Extract `major.minor.build.revision` from the `VS_FIXEDFILEINFO` of a
/// PE image's first version resource.
pub fn fixed_file_version(bytes: &[u8]) -> Option<String> {
    let pe = match PE::parse(bytes) {
        Ok(pe) => pe,
        Err(e) => {
            tracing::debug!("not a PE image: {e}");
            return None;
        }
    };
    let optional_header = pe.header.optional_header.as_ref()?;
    let (table_rva, table_size) = optional_header
        .data_directories
        .get_resource_table()
        .as_ref()
        .map(|t| (t.virtual_address, t.size as usize))?;

    let start = rva_to_offset(&pe.sections, table_rva)?;
    let end = start.saturating_add(table_size).min(bytes.len());
    let rsrc = bytes.get(start..end)?;

    let (data_rva, size) = version_data_entry(rsrc)?;
    let offset = rva_to_offset(&pe.sections, data_rva)?;
    let resource = bytes.get(offset..offset.checked_add(size)?)?;
    fixed_info_version(resource)
}

/// The path-last `.dll` under `dir`, searched recursively.
pub fn last_assembly(dir: &Path) -> Option<PathBuf> {
    modman_util::fs::collect_files_with_extension(dir, "dll").pop()
}

fn rva_to_offset(sections: &[SectionTable], rva: u32) -> Option<usize> {
    sections.iter().find_map(|s| {
        let delta = rva.checked_sub(s.virtual_address)?;
        let span = s.virtual_size.max(s.size_of_raw_data);
        (delta < span).then(|| s.pointer_to_raw_data as usize + delta as usize)
    })
}

/// Walk type -> name -> language in the resource directory `rsrc` and
/// return the RVA and size of the first `RT_VERSION` data entry.
fn version_data_entry(rsrc: &[u8]) -> Option<(u32, usize)> {
    let (names, is_dir) = find_entry(rsrc, 0, Some(RT_VERSION))?;
    if !is_dir {
        return None;
    }
    let (languages, is_dir) = find_entry(rsrc, names, None)?;
    if !is_dir {
        return None;
    }
    let (data, is_dir) = find_entry(rsrc, languages, None)?;
    if is_dir {
        return None;
    }
    Some((read_u32(rsrc, data)?, read_u32(rsrc, data + 4)? as usize))
}

/// First entry of the directory at `dir` (matching `id` when given).
/// Returns the entry's target offset and whether it is a subdirectory.
fn find_entry(rsrc: &[u8], dir: usize, id: Option<u32>) -> Option<(usize, bool)> {
    let named = read_u16(rsrc, dir + 12)? as usize;
    let ids = read_u16(rsrc, dir + 14)? as usize;
    (0..named + ids).find_map(|i| {
        let at = dir + 16 + i * 8;
        let name = read_u32(rsrc, at)?;
        if id.is_some_and(|want| name & HIGH_BIT != 0 || name != want) {
            return None;
        }
        let target = read_u32(rsrc, at + 4)?;
        Some(((target & !HIGH_BIT) as usize, target & HIGH_BIT != 0))
    })
}

/// Read the fixed file info out of a `VS_VERSIONINFO` block.
///
/// Layout: `wLength`, `wValueLength`, `wType`, the NUL-terminated UTF-16
/// key, padding to 32 bits, then `VS_FIXEDFILEINFO`.
fn fixed_info_version(resource: &[u8]) -> Option<String> {
    if read_u16(resource, 2)? == 0 {
        return None;
    }
    let mut pos = 6;
    while read_u16(resource, pos)? != 0 {
        pos += 2;
    }
    let fixed = (pos + 2 + 3) & !3;
    if read_u32(resource, fixed)? != FIXED_FILE_INFO_SIGNATURE {
        return None;
    }
    let ms = read_u32(resource, fixed + 8)?;
    let ls = read_u32(resource, fixed + 12)?;
    Some(format!(
        "{}.{}.{}.{}",
        ms >> 16,
        ms & 0xFFFF,
        ls >> 16,
        ls & 0xFFFF
    ))
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let slice = bytes.get(at..at.checked_add(2)?)?;
    Some(u16::from_le_bytes(slice.try_into().ok()?))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let slice = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes(slice.try_into().ok()?))
}
