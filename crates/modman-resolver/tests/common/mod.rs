//! Minimal PE32 images carrying an `RT_VERSION` resource.

#![allow(dead_code)]

const TEXT_RAW: usize = 0x200;
const RSRC_RAW: usize = 0x400;
const RAW_SIZE: usize = 0x200;
const TEXT_RVA: u32 = 0x1000;
const RSRC_RVA: u32 = 0x2000;

pub const FIXED_FILE_INFO_SIGNATURE: [u8; 4] = [0xBD, 0x04, 0xEF, 0xFE];

fn put(image: &mut [u8], at: usize, bytes: &[u8]) {
    image[at..at + bytes.len()].copy_from_slice(bytes);
}

fn put_u16(image: &mut [u8], at: usize, value: u16) {
    put(image, at, &value.to_le_bytes());
}

fn put_u32(image: &mut [u8], at: usize, value: u32) {
    put(image, at, &value.to_le_bytes());
}

/// `VS_VERSIONINFO` with only the fixed file info.
fn version_info(major: u16, minor: u16, build: u16, revision: u16) -> Vec<u8> {
    let mut out = vec![0u8; 92];
    put_u16(&mut out, 0, 92);
    put_u16(&mut out, 2, 52);
    for (i, unit) in "VS_VERSION_INFO".encode_utf16().enumerate() {
        put_u16(&mut out, 6 + i * 2, unit);
    }
    put(&mut out, 40, &FIXED_FILE_INFO_SIGNATURE);
    put_u32(&mut out, 44, 0x0001_0000);
    put_u32(&mut out, 48, ((major as u32) << 16) | minor as u32);
    put_u32(&mut out, 52, ((build as u32) << 16) | revision as u32);
    out
}

/// Resource section: type 16 -> name 1 -> language 0x409 -> version info.
fn resource_section(major: u16, minor: u16, build: u16, revision: u16) -> Vec<u8> {
    let info = version_info(major, minor, build, revision);
    let mut out = vec![0u8; 0x58];
    for (dir, id, target) in [
        (0x00, 16u32, 0x8000_0018u32),
        (0x18, 1, 0x8000_0030),
        (0x30, 0x409, 0x48),
    ] {
        put_u16(&mut out, dir + 14, 1);
        put_u32(&mut out, dir + 16, id);
        put_u32(&mut out, dir + 20, target);
    }
    put_u32(&mut out, 0x48, RSRC_RVA + 0x58);
    put_u32(&mut out, 0x4C, info.len() as u32);
    out.extend_from_slice(&info);
    out
}

/// A PE32 DLL with `text` as its code section and no version resource.
pub fn pe_image(text: &[u8]) -> Vec<u8> {
    build(text, None)
}

/// A PE32 DLL whose version resource reports `major.minor.build.revision`.
pub fn versioned_dll(major: u16, minor: u16, build: u16, revision: u16) -> Vec<u8> {
    versioned_dll_with_code(b"\xC3", major, minor, build, revision)
}

/// Like [`versioned_dll`] with custom bytes in the code section.
pub fn versioned_dll_with_code(
    text: &[u8],
    major: u16,
    minor: u16,
    build: u16,
    revision: u16,
) -> Vec<u8> {
    self::build(text, Some(resource_section(major, minor, build, revision)))
}

fn build(text: &[u8], rsrc: Option<Vec<u8>>) -> Vec<u8> {
    assert!(text.len() <= RAW_SIZE);
    let mut image = vec![0u8; RSRC_RAW + RAW_SIZE];

    // DOS header
    put(&mut image, 0, b"MZ");
    put_u32(&mut image, 0x3C, 0x80);

    // PE signature and COFF header
    put(&mut image, 0x80, b"PE\0\0");
    put_u16(&mut image, 0x84, 0x014C);
    put_u16(&mut image, 0x86, 2);
    put_u16(&mut image, 0x94, 224);
    put_u16(&mut image, 0x96, 0x2102);

    // Optional header, standard fields
    put_u16(&mut image, 0x98, 0x010B);
    put_u32(&mut image, 0x9C, RAW_SIZE as u32);
    put_u32(&mut image, 0xA0, RAW_SIZE as u32);
    put_u32(&mut image, 0xAC, TEXT_RVA);
    put_u32(&mut image, 0xB0, RSRC_RVA);

    // Optional header, Windows fields
    put_u32(&mut image, 0xB4, 0x1000_0000);
    put_u32(&mut image, 0xB8, 0x1000);
    put_u32(&mut image, 0xBC, 0x200);
    put_u16(&mut image, 0xC0, 6);
    put_u16(&mut image, 0xC8, 6);
    put_u32(&mut image, 0xD0, 0x3000);
    put_u32(&mut image, 0xD4, 0x200);
    put_u16(&mut image, 0xDC, 3);
    put_u32(&mut image, 0xE0, 0x0010_0000);
    put_u32(&mut image, 0xE4, 0x1000);
    put_u32(&mut image, 0xE8, 0x0010_0000);
    put_u32(&mut image, 0xEC, 0x1000);
    put_u32(&mut image, 0xF4, 16);

    // Data directory 2: resource table
    if let Some(rsrc) = &rsrc {
        assert!(rsrc.len() <= RAW_SIZE);
        put_u32(&mut image, 0x108, RSRC_RVA);
        put_u32(&mut image, 0x10C, rsrc.len() as u32);
    }

    // Section table
    let sections = [
        (b".text\0\0\0", TEXT_RVA, TEXT_RAW, 0x6000_0020u32),
        (b".rsrc\0\0\0", RSRC_RVA, RSRC_RAW, 0x4000_0040u32),
    ];
    for (i, (name, rva, raw, characteristics)) in sections.into_iter().enumerate() {
        let at = 0x178 + i * 40;
        put(&mut image, at, name);
        put_u32(&mut image, at + 8, RAW_SIZE as u32);
        put_u32(&mut image, at + 12, rva);
        put_u32(&mut image, at + 16, RAW_SIZE as u32);
        put_u32(&mut image, at + 20, raw as u32);
        put_u32(&mut image, at + 36, characteristics);
    }

    put(&mut image, TEXT_RAW, text);
    if let Some(rsrc) = &rsrc {
        put(&mut image, RSRC_RAW, rsrc);
    }
    image
}
