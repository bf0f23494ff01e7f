#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const PREAMBLE: &str = "\
                 1                 2                 3
    version_number      initial_mass         initial_z
          \"r15140\"               1.0    2.0000000000000000E-02

                 1                 2                 3                 4
      model_number          star_age             log_L         log_Teff
";

/// A history whose run reached model 3, restarted from 2 and finished at 5.
pub const REDO_ROWS: &str = "\
 1  1.0  0.10  3.70
 2  2.0  0.20  3.71
 3  3.0  0.30  3.72
 2  2.5  0.25  3.715
 3  3.5  0.35  3.725
 4  4.5  0.45  3.735
 5  5.5  0.55  3.745
";

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

/// Temp dir holding `history.data` = preamble + `rows`.
pub fn history(rows: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("create temp dir");
    let path = write_file(tmp.path(), "history.data", &format!("{PREAMBLE}{rows}"));
    (tmp, path)
}
