//! Output file naming.

use std::path::{Path, PathBuf};

use crate::media::MediaKind;

/// Appended to the input's file stem to name the default output.
pub const OUTPUT_SUFFIX: &str = " (Quality Munched)";

/// `<dir>/<stem> (Quality Munched).<ext>` next to the input.
#[must_use]
pub fn default_output_path(input: &Path, kind: MediaKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}.{}", kind.output_extension()))
}

/// Picks the output path for one input.
///
/// Runs with several inputs always use the default name, since a single
/// `--output` cannot name them all. A relative `--output` is placed in the
/// input's directory.
#[must_use]
pub fn resolve_output_path(
    input: &Path,
    requested: Option<&Path>,
    multiple_inputs: bool,
    kind: MediaKind,
) -> PathBuf {
    match requested {
        Some(requested) if !multiple_inputs => {
            if requested.is_absolute() {
                requested.to_path_buf()
            } else {
                input
                    .parent()
                    .map(|dir| dir.join(requested))
                    .unwrap_or_else(|| requested.to_path_buf())
            }
        }
        _ => default_output_path(input, kind),
    }
}
