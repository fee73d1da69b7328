use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;

pub const DEFAULT_MARKER: &str = "price";

/// Returns true when `file_name` is a delimited file whose name carries `marker`.
pub fn is_price_list(file_name: &str, marker: &str) -> bool {
    let path = Path::new(file_name);
    let delimited = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv")
    );
    delimited && file_name.to_lowercase().contains(&marker.to_lowercase())
}

/// Lists the price lists directly inside `dir`, sorted by file name.
pub fn list_price_files(dir: &Path, marker: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Reading directory {dir:?}"))?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Listing directory {dir:?}"))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            debug!("Ignoring non UTF-8 file name {file_name:?}");
            continue;
        };
        if !is_price_list(name, marker) {
            continue;
        }
        let path = entry.path();
        if path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    debug!("Found {} price list(s) in {:?}", found.len(), dir);
    Ok(found)
}
