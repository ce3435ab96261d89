//! Destination paths for downloaded font files.
//!
//! Every file lives directly in the cache directory under
//! `<font>-<version>-<subsets>-<variant>.<format>`. Nothing else in the crate
//! builds these paths, so the same `{font, version, subsets, variant, format}`
//! always maps to the same file. Each component is encoded injectively; ids
//! that themselves contain `-` can still line up across component boundaries.

use std::path::{Path, PathBuf};

/// Builds the cache path for one `{variant, format}` file.
#[must_use]
pub fn font_file_path<S: AsRef<str>>(
    cache_dir: &Path,
    font_id: &str,
    font_version: &str,
    subsets: &[S],
    variant_id: &str,
    format: &str,
) -> PathBuf {
    let subsets = subsets
        .iter()
        .map(|subset| sanitize_component(subset.as_ref()))
        .collect::<Vec<_>>()
        .join("_");

    let filename = format!(
        "{}-{}-{}-{}.{}",
        sanitize_component(font_id),
        sanitize_component(font_version),
        subsets,
        sanitize_component(variant_id),
        sanitize_component(format),
    );
    cache_dir.join(filename)
}

/// Percent-encodes every byte outside ASCII alphanumerics, `-` and `.`.
///
/// The mapping is injective, so distinct ids stay distinct, and path
/// separators are encoded, so a component can never escape the cache directory.
fn sanitize_component(value: &str) -> String {
    let mut sanitized = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '.') {
            sanitized.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                sanitized.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    sanitized
}
