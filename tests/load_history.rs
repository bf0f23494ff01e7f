mod common;

use common::{history, write_file, TestResult, PREAMBLE, REDO_ROWS};
use mesa_logs::data::{load, HeaderValue, LoadError, LoadOptions, STEP_COLUMN};
use tempfile::TempDir;

#[test]
fn header_values_are_typed() -> TestResult {
    let (_tmp, path) = history(REDO_ROWS);
    let data = load(&path, &LoadOptions::default())?;

    assert_eq!(
        data.header.get("version_number"),
        Some(&HeaderValue::String("r15140".into()))
    );
    assert_eq!(data.header.get("initial_mass"), Some(&HeaderValue::Float(1.0)));
    assert_eq!(data.header.get("initial_z"), Some(&HeaderValue::Float(0.02)));
    let names: Vec<&str> = data.header.iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["version_number", "initial_mass", "initial_z"]);
    Ok(())
}

#[test]
fn column_index_is_zero_based() -> TestResult {
    let (_tmp, path) = history(REDO_ROWS);
    let data = load(&path, &LoadOptions::default().read_data(false))?;

    let index = data.column_index.as_ref().expect("column index");
    assert_eq!(index.position("model_number"), Some(0));
    assert_eq!(index.position("log_Teff"), Some(3));
    assert_eq!(index.names().len(), 4);
    assert!(data.table.is_none());
    Ok(())
}

#[test]
fn redo_rows_are_removed_from_every_column() -> TestResult {
    let (_tmp, path) = history(REDO_ROWS);
    let data = load(&path, &LoadOptions::default())?;

    assert_eq!(data.get("model_number")?, &[1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(data.get("star_age")?, &[1.0, 2.0, 3.5, 4.5, 5.5]);
    assert_eq!(data.get("log_L")?, &[0.10, 0.20, 0.35, 0.45, 0.55]);
    assert_eq!(data.get("log_Teff")?.len(), 5);
    assert_eq!(
        data.columns(),
        ["model_number", "star_age", "log_L", "log_Teff"]
    );
    Ok(())
}

#[test]
fn clean_data_false_keeps_every_row() -> TestResult {
    let (_tmp, path) = history(REDO_ROWS);
    let data = load(&path, &LoadOptions::default().clean_data(false))?;

    assert_eq!(
        data.get("model_number")?,
        &[1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 5.0]
    );
    assert_eq!(data.get("star_age")?.len(), 7);
    Ok(())
}

#[test]
fn step_column_is_kept_when_not_requested() -> TestResult {
    let (_tmp, path) = history(REDO_ROWS);
    let data = load(&path, &LoadOptions::default().columns(["star_age"]))?;

    assert_eq!(data.columns(), ["star_age", STEP_COLUMN]);
    assert_eq!(data.get(STEP_COLUMN)?, &[1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(data.get("star_age")?, &[1.0, 2.0, 3.5, 4.5, 5.5]);
    assert!(matches!(data.get("log_L"), Err(LoadError::Key(_))));
    Ok(())
}

#[test]
fn single_column_request_without_step_column() -> TestResult {
    let tmp = TempDir::new()?;
    let text = "\
banner
name
'x'

1 2
zone logT
1 7.0
2 6.5
3 6.0
";
    let path = write_file(tmp.path(), "profile1.data", text);
    let data = load(&path, &LoadOptions::default().columns(["logT"]))?;

    assert_eq!(data.columns(), ["logT"]);
    assert_eq!(data.get("logT")?, &[7.0, 6.5, 6.0]);
    Ok(())
}

#[test]
fn increasing_history_is_unchanged() -> TestResult {
    let (_tmp, path) = history(" 1 1.0 0.1 3.7\n 2 2.0 0.2 3.8\n 5 3.0 0.3 3.9\n");
    let data = load(&path, &LoadOptions::default())?;

    assert_eq!(data.get("model_number")?, &[1.0, 2.0, 5.0]);
    assert_eq!(data.get("log_Teff")?, &[3.7, 3.8, 3.9]);
    Ok(())
}

#[test]
fn empty_and_single_row_tables() -> TestResult {
    let (_tmp, path) = history("");
    let data = load(&path, &LoadOptions::default())?;
    assert!(data.table.as_ref().expect("table").is_empty());
    assert_eq!(data.get("star_age")?, &[] as &[f64]);

    let (_tmp, path) = history(" 7 1.0 0.1 3.7\n");
    let data = load(&path, &LoadOptions::default())?;
    assert_eq!(data.get("model_number")?, &[7.0]);
    Ok(())
}

#[test]
fn blank_lines_and_comments_in_data_are_skipped() -> TestResult {
    let (_tmp, path) = history(" 1 1.0 0.1 3.7\n\n# restart\n 2 2.0 0.2 3.8  # tail\n");
    let data = load(&path, &LoadOptions::default())?;
    assert_eq!(data.get("model_number")?, &[1.0, 2.0]);
    Ok(())
}

#[test]
fn header_only_needs_three_lines() -> TestResult {
    let tmp = TempDir::new()?;
    let path = write_file(tmp.path(), "h.data", "banner\na b\n1 two\n");
    let data = load(&path, &LoadOptions::header_only())?;

    assert_eq!(data.header.get("a"), Some(&HeaderValue::Integer(1)));
    assert_eq!(data.header.get("b"), Some(&HeaderValue::String("two".into())));
    assert!(data.column_index.is_none());
    assert!(data.table.is_none());
    assert!(matches!(data.get("a"), Err(LoadError::Key(_))));
    Ok(())
}

#[test]
fn read_data_after_preamble_only_load() -> TestResult {
    let (_tmp, path) = history(REDO_ROWS);
    let mut data = load(&path, &LoadOptions::default().read_data(false))?;
    assert!(data.columns().is_empty());

    data.read_data(&["log_L"], false)?;
    assert_eq!(data.columns(), ["log_L", STEP_COLUMN]);
    assert_eq!(data.get("log_L")?.len(), 7);

    data.read_data(&["log_L"], true)?;
    assert_eq!(data.get("log_L")?.len(), 5);
    Ok(())
}

#[test]
fn read_data_after_header_only_load_fails() -> TestResult {
    let (_tmp, path) = history(REDO_ROWS);
    let mut data = load(&path, &LoadOptions::header_only())?;
    let err = data.read_data(&["log_L"], true).unwrap_err();
    assert!(matches!(err, LoadError::Format { .. }));
    Ok(())
}

#[test]
fn missing_file_is_io_error() {
    let tmp = TempDir::new().expect("create temp dir");
    let err = load(tmp.path().join("nope.data"), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn truncated_preamble_is_format_error() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = write_file(tmp.path(), "h.data", "banner\na b\n1 2\n\n1 2\n");
    let err = load(&path, &LoadOptions::default()).unwrap_err();
    match err {
        LoadError::Format { line, .. } => assert_eq!(line, 6),
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn missing_header_value_is_format_error() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = write_file(tmp.path(), "h.data", "banner\na b c\n1 2\n");
    let err = load(&path, &LoadOptions::header_only()).unwrap_err();
    assert!(matches!(err, LoadError::Format { line: 3, .. }));
}

#[test]
fn unknown_column_is_format_error() {
    let (_tmp, path) = history(REDO_ROWS);
    let err = load(&path, &LoadOptions::default().columns(["center_h1"])).unwrap_err();
    assert!(matches!(err, LoadError::Format { .. }));
}

#[test]
fn malformed_number_aborts_the_load() {
    let (_tmp, path) = history(" 1 1.0 0.1 3.7\n 2 abc 0.2 3.8\n");
    let err = load(&path, &LoadOptions::default()).unwrap_err();
    match err {
        LoadError::Format { line, message, .. } => {
            assert_eq!(line, 8);
            assert!(message.contains("abc"), "{message}");
        }
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn repeated_preamble_in_data_is_format_error() {
    let (_tmp, path) = history(&format!(" 1 1.0 0.1 3.7\n{PREAMBLE}"));
    let err = load(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Format { .. }));
}

#[test]
fn short_row_is_format_error() {
    let (_tmp, path) = history(" 1 1.0 0.1\n");
    let err = load(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Format { line: 7, .. }));
}
