use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use log::debug;

use super::error::{LoadError, Result};
use super::model::{ColumnIndex, HeaderValue, RunHeader, Table, STEP_COLUMN};
use super::redo;

/// Number of lines before the numeric block of a history file.
const PREAMBLE_LINES: usize = 6;

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

/// What to read from a history file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Stop after the run header (lines 1–3).
    pub only_header: bool,
    /// Read the numeric block after the preamble.
    pub read_data: bool,
    /// Columns to load; empty means every column in schema order.
    pub columns: Vec<String>,
    /// Remove rows superseded by restarts.
    pub clean_data: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            only_header: false,
            read_data: true,
            columns: Vec::new(),
            clean_data: true,
        }
    }
}

impl LoadOptions {
    pub fn header_only() -> Self {
        Self {
            only_header: true,
            ..Self::default()
        }
    }

    pub fn read_data(mut self, read_data: bool) -> Self {
        self.read_data = read_data;
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn clean_data(mut self, clean_data: bool) -> Self {
        self.clean_data = clean_data;
        self
    }
}

// ---------------------------------------------------------------------------
// MesaData – a loaded history file
// ---------------------------------------------------------------------------

/// The parsed contents of one history file.
#[derive(Debug, Clone)]
pub struct MesaData {
    path: PathBuf,
    /// Run metadata from lines 2 and 3.
    pub header: RunHeader,
    /// `None` for header-only loads.
    pub column_index: Option<ColumnIndex>,
    /// `None` unless data was read.
    pub table: Option<Table>,
}

impl MesaData {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Values of a loaded column.
    pub fn get(&self, column: &str) -> Result<&[f64]> {
        match &self.table {
            Some(table) => table.get(column),
            None => Err(LoadError::Key(column.to_string())),
        }
    }

    /// Names of the loaded columns, in load order.
    pub fn columns(&self) -> &[String] {
        self.table.as_ref().map(Table::column_names).unwrap_or(&[])
    }

    /// (Re)read data columns, replacing any previously loaded table.
    ///
    /// Needs the column index, so it fails on header-only loads.
    pub fn read_data<S: AsRef<str>>(&mut self, columns: &[S], clean_data: bool) -> Result<()> {
        let index = self.column_index.as_ref().ok_or_else(|| {
            LoadError::format(&self.path, 5, "column index not read (header-only load)")
        })?;
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self.table = Some(read_table(&self.path, index, &columns, clean_data)?);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a history file.
///
/// Layout:
/// ```text
/// line 1   banner (ignored)
/// line 2   header names
/// line 3   header values
/// line 4   blank
/// line 5   column numbers (1-based)
/// line 6   column names
/// line 7+  numeric rows
/// ```
pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<MesaData> {
    let path = path.as_ref();
    let (header, column_index) = read_preamble(path, options.only_header)?;

    let mut data = MesaData {
        path: path.to_path_buf(),
        header,
        column_index,
        table: None,
    };

    if options.read_data {
        if let Some(index) = &data.column_index {
            let table = read_table(path, index, &options.columns, options.clean_data)?;
            data.table = Some(table);
        }
    }
    Ok(data)
}

// ---------------------------------------------------------------------------
// Preamble
// ---------------------------------------------------------------------------

struct LineReader<'a> {
    path: &'a Path,
    lines: Lines<BufReader<File>>,
    /// 1-based number of the last line returned.
    line_no: usize,
}

impl<'a> LineReader<'a> {
    fn open(path: &'a Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Next line, or `None` at end of file.
    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(Ok(line)) => {
                self.line_no += 1;
                Ok(Some(line))
            }
            Some(Err(e)) => Err(LoadError::io(self.path, e)),
            None => Ok(None),
        }
    }

    /// Next line, failing if the file ends first.
    fn expect_line(&mut self, what: &str) -> Result<String> {
        let expected = self.line_no + 1;
        self.next_line()?.ok_or_else(|| {
            LoadError::format(self.path, expected, format!("file ends before {what}"))
        })
    }

    fn error(&self, message: impl Into<String>) -> LoadError {
        LoadError::format(self.path, self.line_no, message)
    }
}

fn read_preamble(path: &Path, only_header: bool) -> Result<(RunHeader, Option<ColumnIndex>)> {
    let mut reader = LineReader::open(path)?;

    reader.expect_line("the banner line")?;
    let names_line = reader.expect_line("the header names")?;
    let values_line = reader.expect_line("the header values")?;

    let names: Vec<&str> = names_line.split_whitespace().collect();
    let values: Vec<&str> = values_line.split_whitespace().collect();
    if values.len() < names.len() {
        return Err(reader.error(format!(
            "{} header names but only {} values",
            names.len(),
            values.len()
        )));
    }

    let mut header = RunHeader::default();
    for (name, value) in names.iter().zip(&values) {
        header.push(name.to_string(), HeaderValue::parse_literal(value));
    }

    if only_header {
        debug!("{}: read {} header fields", path.display(), header.len());
        return Ok((header, None));
    }

    reader.expect_line("the separator line")?;
    let numbers_line = reader.expect_line("the column numbers")?;
    let numbers = numbers_line
        .split_whitespace()
        .map(|tok| match tok.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(reader.error(format!("'{tok}' is not a 1-based column number"))),
        })
        .collect::<Result<Vec<_>>>()?;

    let column_line = reader.expect_line("the column names")?;
    let column_names: Vec<&str> = column_line.split_whitespace().collect();
    if numbers.len() < column_names.len() {
        return Err(reader.error(format!(
            "{} column names but only {} column numbers",
            column_names.len(),
            numbers.len()
        )));
    }

    let mut index = ColumnIndex::default();
    for (name, number) in column_names.iter().zip(&numbers) {
        if !index.insert(name.to_string(), number - 1) {
            return Err(reader.error(format!("duplicate column '{name}'")));
        }
    }

    debug!(
        "{}: read {} header fields and {} columns",
        path.display(),
        header.len(),
        index.len()
    );
    Ok((header, Some(index)))
}

// ---------------------------------------------------------------------------
// Numeric block
// ---------------------------------------------------------------------------

/// Whitespace-separated fields of a data row, ignoring anything after `#`.
///
/// Blank and comment-only lines yield no fields.
pub(crate) fn row_fields(line: &str) -> Vec<&str> {
    line.split('#')
        .next()
        .unwrap_or("")
        .split_whitespace()
        .collect()
}

/// Work out which columns to read: the request (or every column), without
/// repeats, with the step counter appended when the schema has it.
fn resolve_request(
    path: &Path,
    index: &ColumnIndex,
    requested: &[String],
) -> Result<Vec<(String, usize)>> {
    let mut names: Vec<String> = if requested.is_empty() {
        index.names().to_vec()
    } else {
        let mut unique = Vec::with_capacity(requested.len() + 1);
        for name in requested {
            if !unique.contains(name) {
                unique.push(name.clone());
            }
        }
        unique
    };

    if index.contains(STEP_COLUMN) && !names.iter().any(|n| n == STEP_COLUMN) {
        names.push(STEP_COLUMN.to_string());
    }

    names
        .into_iter()
        .map(|name| match index.position(&name) {
            Some(pos) => Ok((name, pos)),
            None => Err(LoadError::format(
                path,
                PREAMBLE_LINES,
                format!("column '{name}' is not in the column index"),
            )),
        })
        .collect()
}

fn read_table(
    path: &Path,
    index: &ColumnIndex,
    requested: &[String],
    clean_data: bool,
) -> Result<Table> {
    let request = resolve_request(path, index, requested)?;

    let mut reader = LineReader::open(path)?;
    for _ in 0..PREAMBLE_LINES {
        reader.expect_line("the end of the preamble")?;
    }

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); request.len()];
    while let Some(line) = reader.next_line()? {
        let fields = row_fields(&line);
        if fields.is_empty() {
            continue;
        }

        for ((name, pos), column) in request.iter().zip(values.iter_mut()) {
            let tok = fields.get(*pos).ok_or_else(|| {
                reader.error(format!(
                    "row has {} fields, column '{name}' is field {}",
                    fields.len(),
                    pos + 1
                ))
            })?;
            let value = tok
                .parse::<f64>()
                .map_err(|_| reader.error(format!("'{tok}' in column '{name}' is not a number")))?;
            column.push(value);
        }
    }
    drop(reader);

    let mut table = Table::from_columns(
        request
            .into_iter()
            .map(|(name, _)| name)
            .zip(values)
            .collect(),
    );

    if clean_data && index.contains(STEP_COLUMN) && table.len() > 1 {
        let mask = redo::compute_mask(table.get(STEP_COLUMN)?);
        let dropped = redo::masked_count(&mask);
        if dropped > 0 {
            debug!(
                "{}: dropping {dropped} of {} rows superseded by redos",
                path.display(),
                mask.len()
            );
            table.map_columns(|column| redo::compress(column, &mask));
        }
    }

    Ok(table)
}
