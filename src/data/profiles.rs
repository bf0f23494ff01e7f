use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use super::error::{LoadError, Result};
use super::loader::row_fields;
use super::model::IndexEntry;
use super::redo;

/// File listing the profiles written by a run.
pub const INDEX_FILE: &str = "profiles.index";

/// Directory a run writes its logs to when nothing else is configured.
pub const DEFAULT_LOGS_DIR: &str = "LOGS";

/// Field holding the profile number within an index row.
const FILE_ID_FIELD: usize = 2;

/// Read `profiles.index` from `dir`.
///
/// The first line (profile count) is skipped. Each following row contributes
/// its first field as the model number and its third field as the profile
/// number.
pub fn read_profile_index(dir: impl AsRef<Path>) -> Result<Vec<IndexEntry>> {
    let path = dir.as_ref().join(INDEX_FILE);
    let file = File::open(&path).map_err(|e| LoadError::io(&path, e))?;
    let mut lines = BufReader::new(file).lines();

    match lines.next() {
        Some(Ok(_)) => {}
        Some(Err(e)) => return Err(LoadError::io(&path, e)),
        None => return Err(LoadError::format(&path, 1, "empty profile index")),
    }

    let mut entries = Vec::new();
    let mut line_count = 1;
    for line in lines {
        let line = line.map_err(|e| LoadError::io(&path, e))?;
        line_count += 1;

        let fields = row_fields(&line);
        if fields.is_empty() {
            continue;
        }
        let field = |i: usize, what: &str| -> Result<f64> {
            let tok = fields.get(i).ok_or_else(|| {
                LoadError::format(&path, line_count, format!("row has no {what} field"))
            })?;
            tok.parse::<f64>().map_err(|_| {
                LoadError::format(&path, line_count, format!("{what} '{tok}' is not a number"))
            })
        };
        let model_number = field(0, "model number")?;
        let file_id = field(FILE_ID_FIELD, "profile number")?;
        if !is_valid_file_id(file_id) {
            return Err(LoadError::format(
                &path,
                line_count,
                format!("profile number {file_id} cannot name a profile file"),
            ));
        }
        entries.push(IndexEntry {
            model_number,
            file_id,
        });
    }

    if entries.is_empty() {
        return Err(LoadError::format(&path, line_count, "profile index has no entries"));
    }
    Ok(entries)
}

/// Finite and, once truncated, representable as an `i64`.
fn is_valid_file_id(file_id: f64) -> bool {
    // 2^63 is exact in f64; anything at or above it overflows.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    file_id.is_finite() && file_id.trunc() >= -LIMIT && file_id.trunc() < LIMIT
}

/// Drop index entries superseded by redos.
pub fn clean_index(entries: &[IndexEntry]) -> Vec<IndexEntry> {
    let steps: Vec<f64> = entries.iter().map(|e| e.model_number).collect();
    let mask = redo::compute_mask(&steps);
    redo::compress(entries, &mask)
}

/// Path of the profile file with the given number inside `dir`.
pub fn profile_path(dir: &str, file_id: f64) -> String {
    format!("{dir}/profile{}.data", file_id.trunc() as i64)
}

/// Resolve the redo-free list of profile files across `dirs`.
///
/// Directories are processed in order and their profiles concatenated.
pub fn resolve_profile_paths<S: AsRef<str>>(dirs: &[S]) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for dir in dirs {
        let dir = dir.as_ref();
        let entries = read_profile_index(dir)?;
        let kept = clean_index(&entries);
        debug!(
            "{dir}: {} profiles listed, {} after removing redos",
            entries.len(),
            kept.len()
        );
        paths.extend(kept.iter().map(|e| profile_path(dir, e.file_id)));
    }
    Ok(paths)
}
