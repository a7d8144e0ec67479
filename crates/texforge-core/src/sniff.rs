//! Decode-path selection from file names.

use std::path::Path;

/// Which decoder an image file goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// 8-bit raster formats (PNG, JPEG, TGA, ...).
    Ldr,
    /// OpenEXR floating point images.
    Hdr,
}

/// Picks the decode path for `path` from its extension alone.
///
/// The extension is the text after the last `.` of the file name, compared
/// case-insensitively. Only `exr` selects [`ImageKind::Hdr`]; files with any
/// other extension, or none, go to the LDR decoder, which identifies the
/// container from its content.
#[must_use]
pub fn sniff(path: &Path) -> ImageKind {
    let is_exr = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("exr"));

    if is_exr {
        ImageKind::Hdr
    } else {
        ImageKind::Ldr
    }
}
