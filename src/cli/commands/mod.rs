//! Subcommands of the `ttt-qlearn` binary

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{Preset, RunConfig};

pub mod evaluate;
pub mod train;

/// Start from `--config` when given, otherwise from the preset
pub(crate) fn resolve_run_config(preset: Preset, config: Option<&Path>) -> Result<RunConfig> {
    match config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("failed to load run configuration from {}", path.display())),
        None => Ok(preset.run_config()),
    }
}

/// Normalise a JSON output path.
///
/// A directory target gets `default_name` appended and any other extension is
/// replaced with `.json`.
pub(crate) fn json_output_path(raw: &Path, default_name: &str) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push(default_name);
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

/// Create the parent directory of an output file when it is missing
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
