use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mesa_logs::data::{self, profiles::DEFAULT_LOGS_DIR, LoadOptions};
use mesa_logs::export::{self, ExportFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
    Parquet,
}

impl From<FormatArg> for ExportFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Parquet => ExportFormat::Parquet,
        }
    }
}

#[derive(Parser)]
#[command(about = "Read MESA history logs and profile indexes with restarts removed.")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the run header of a history file.
    Header {
        file: PathBuf,
    },

    /// Load columns of a history file and write them out.
    Load {
        file: PathBuf,

        /// Columns to load (comma separated). Defaults to every column.
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Keep rows superseded by restarts.
        #[arg(long)]
        no_clean: bool,

        /// Output format. Inferred from `--output` when omitted, CSV otherwise.
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Output file. Writes to stdout when omitted.
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// List the profile files of one or more log directories, restarts removed.
    Profiles {
        #[arg(default_value = DEFAULT_LOGS_DIR)]
        dirs: Vec<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    match Args::parse().command {
        Command::Header { file } => cmd_header(file),
        Command::Load {
            file,
            columns,
            no_clean,
            format,
            output,
        } => cmd_load(file, columns, !no_clean, format, output),
        Command::Profiles { dirs } => cmd_profiles(&dirs),
    }
}

fn cmd_header(file: PathBuf) -> Result<()> {
    let data = data::load(&file, &LoadOptions::header_only())
        .with_context(|| format!("reading header of {}", file.display()))?;

    let mut out = io::stdout().lock();
    for (name, value) in data.header.iter() {
        writeln!(out, "{name} = {value}")?;
    }
    Ok(())
}

fn cmd_load(
    file: PathBuf,
    columns: Vec<String>,
    clean_data: bool,
    format: Option<FormatArg>,
    output: Option<PathBuf>,
) -> Result<()> {
    let options = LoadOptions::default()
        .columns(columns)
        .clean_data(clean_data);
    let data = data::load(&file, &options)
        .with_context(|| format!("loading {}", file.display()))?;

    let format = match (format, &output) {
        (Some(f), _) => f.into(),
        (None, Some(path)) => ExportFormat::from_path(path)?,
        (None, None) => ExportFormat::Csv,
    };

    match output {
        Some(path) => {
            let out = File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            export::export(&data, format, BufWriter::new(out))?;
            log::info!(
                "wrote {} rows x {} columns to {}",
                data.table.as_ref().map_or(0, |t| t.len()),
                data.columns().len(),
                path.display()
            );
        }
        None => export::export(&data, format, io::stdout())?,
    }
    Ok(())
}

fn cmd_profiles(dirs: &[String]) -> Result<()> {
    let paths = data::resolve_profile_paths(dirs).context("resolving profile paths")?;

    let mut out = io::stdout().lock();
    for path in paths {
        writeln!(out, "{path}")?;
    }
    Ok(())
}
