use std::{
    error::Error,
    fmt, fs,
    io::{Read, Write, stdin, stdout},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use norbufr_core::tables::{table_a_name, TableB, TableC, TableD, TableFormat};
use norbufr_core::{decoder, framing, DecodedMessage, LogBuffer, LogLevel};
use norbufr_esoh::{ingest, Oscar, ProjectorConfig, TimeWindowConfig};

/// Decode WMO FM-94 BUFR messages and project them to E-SOH GeoJSON
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct NorbufrCli {
    /// Raise the log level to Trace and always render the run's log to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    /// How to render the run's log to stderr; omit to stay silent unless -v
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum LogFormat {
    Csv,
    Json,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Decodes one or more concatenated BUFR envelopes and prints a summary of each
    Decode {
        /// Path to the BUFR file; - (hyphen) reads from stdin
        input: String,
    },
    /// Decodes and projects a BUFR file, writing one NDJSON line per observation
    Project {
        /// Path to the BUFR file; - (hyphen) reads from stdin
        input: String,
        /// Directory holding Table B/C/D files (WMO CSV, ecCodes, or OPERA)
        #[arg(long)]
        tables: PathBuf,
        /// WMO OSCAR stationSearchResults JSON snapshot
        #[arg(long)]
        oscar: PathBuf,
        /// Message template overriding the built-in default
        #[arg(long)]
        template: Option<PathBuf>,
    },
}

#[derive(Debug)]
enum CliError {
    Core(norbufr_core::CoreError),
    Projection(norbufr_esoh::ProjectionError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Arg(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Core(e) => write!(f, "{e}"),
            CliError::Projection(e) => write!(f, "{e}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Json(e) => write!(f, "JSON error: {e}"),
            CliError::Arg(detail) => write!(f, "{detail}"),
        }
    }
}

impl Error for CliError {}

impl From<norbufr_core::CoreError> for CliError {
    fn from(e: norbufr_core::CoreError) -> Self {
        CliError::Core(e)
    }
}

impl From<norbufr_esoh::ProjectionError> for CliError {
    fn from(e: norbufr_esoh::ProjectionError) -> Self {
        CliError::Projection(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

fn read_input(input: &str) -> Result<Vec<u8>, CliError> {
    if input.is_empty() || input == "-" {
        let mut buf = Vec::new();
        stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read(input)?)
    }
}

/// Picks the table files out of `dir` by file name, the same way
/// [`TableFormat::from_filename`] does, and loads whichever of Table B/C/D
/// it can identify. A directory missing one of the three is not an error by
/// itself; the caller gets empty tables and sees the effect downstream as
/// table-lookup misses in the log.
fn load_tables(dir: &Path) -> Result<(TableB, TableC, TableD), CliError> {
    let mut table_b = TableB::new();
    let mut table_c = TableC::new();
    let mut table_d = TableD::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(format) = TableFormat::from_filename(&path) else { continue };
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        match format {
            TableFormat::WmoCsv => {
                if name.starts_with("BUFRCREX_TableB") {
                    table_b = TableB::load(&path)?;
                } else if name.starts_with("BUFRCREX_CodeFlag") {
                    table_c = TableC::load(&path)?;
                } else if name.starts_with("BUFR_TableD") {
                    table_d = TableD::load(&path)?;
                }
            }
            TableFormat::EcCodes => {
                if name == "element.table" {
                    table_b = TableB::load(&path)?;
                } else if name == "sequence.def" {
                    table_d = TableD::load(&path)?;
                } else if path.to_str().map(|p| p.contains("codetables")).unwrap_or(false) {
                    table_c = TableC::load(&path)?;
                }
            }
            TableFormat::Opera => {
                let lower = name.to_ascii_lowercase();
                if lower.contains("tableb") {
                    table_b = TableB::load(&path)?;
                } else if lower.contains("tabled") {
                    table_d = TableD::load(&path)?;
                } else if lower.contains("codeflag") || lower.contains("tablec") {
                    table_c = TableC::load(&path)?;
                }
            }
        }
    }

    Ok((table_b, table_c, table_d))
}

fn print_decode_summary(index: usize, decoded: &DecodedMessage) {
    let s1 = &decoded.section1;
    println!("envelope {index}: edition {}", decoded.edition);
    println!(
        "  data category: {} ({}), subcategory {}/{}",
        s1.data_category,
        table_a_name(s1.data_category),
        s1.intl_data_subcategory,
        s1.local_data_subcategory
    );
    println!("  centre {} subcentre {}, master table {} v{}.{}", s1.centre, s1.subcentre, s1.master_table, s1.version_master, s1.version_local);
    println!("  reference time: {}", s1.bufr_time);
    println!("  subsets: {}", decoded.expanded_per_subset.len());
    let descriptor_count: usize = decoded.expanded_per_subset.iter().map(|s| s.len()).sum();
    println!("  descriptors (all subsets): {descriptor_count}");
}

fn run_decode(input: &str, log: &mut LogBuffer) -> Result<(), CliError> {
    let data = read_input(input)?;
    let mut pos = 0usize;
    let mut index = 0usize;
    loop {
        let envelope = match framing::read_next_envelope(&data, &mut pos, log, None)? {
            Some(envelope) => envelope,
            None => break,
        };
        index += 1;
        let table_b = TableB::new();
        let table_d = TableD::new();
        match decoder::decode_message(&envelope, &table_b, &table_d, log, None) {
            Ok(decoded) => print_decode_summary(index, &decoded),
            Err(e) => log.add(chrono::Utc::now(), LogLevel::Error, "cli", None, format!("envelope {index}: decode error: {e}")),
        }
    }
    Ok(())
}

fn run_project(input: &str, tables: &Path, oscar: &Path, template: Option<&Path>, log: &mut LogBuffer) -> Result<(), CliError> {
    let (table_b, table_c, table_d) = load_tables(tables)?;
    let oscar = Oscar::load(oscar)?;
    let time_window = TimeWindowConfig::from_env();

    let mut config = ProjectorConfig::default();
    if let Some(template_path) = template {
        let contents = fs::read_to_string(template_path)?;
        config.template = serde_json::from_str(&contents)?;
    }

    let data = read_input(input)?;
    let stdout = stdout();
    let mut out = stdout.lock();
    for line in ingest::ingest_bytes(&data, &table_b, &table_d, &table_c, &oscar, &time_window, &config, log) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn render_log(log: &LogBuffer, format: LogFormat) {
    match format {
        LogFormat::Csv => eprintln!("{}", log.to_csv(';')),
        LogFormat::Json => eprintln!("{}", log.to_json()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = NorbufrCli::parse();
    let level = if args.verbose { LogLevel::Trace } else { LogLevel::Warn };
    let mut log = LogBuffer::new(10_000, level);

    let result = match &args.action {
        Action::Decode { input } => run_decode(input, &mut log),
        Action::Project { input, tables, oscar, template } => run_project(input, tables, oscar, template.as_deref(), &mut log),
    };

    if let Some(format) = args.log_format {
        render_log(&log, format);
    } else if args.verbose && !log.is_empty() {
        render_log(&log, LogFormat::Csv);
    }

    result.map_err(|e| Box::new(e) as Box<dyn Error>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directory_yields_empty_tables() {
        let dir = std::env::temp_dir().join("norbufr_cli_test_empty_tables");
        let _ = fs::create_dir(&dir);
        let (b, _c, d) = load_tables(&dir).unwrap();
        assert_eq!(b.len(), 0);
        assert_eq!(d.len(), 0);
        let _ = fs::remove_dir(&dir);
    }
}
