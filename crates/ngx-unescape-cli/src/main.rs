use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use ngx_unescape_core::{ErrorKind, Mode, UnescapeError, decode};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ngx-unescape")]
#[command(version)]
#[command(
    about = "Reverts nginx access-log escaping (\\xHH) on already-split log fields.",
    long_about = None,
    after_help = "Examples:\n  ngx-unescape decode user_agents.txt -o decoded.txt\n  cut -d '\"' -f 6 access.log | ngx-unescape decode - --stdout\n  ngx-unescape decode fields.txt --stdout --strict --on-error skip"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a file holding one escaped field per line.
    Decode {
        /// Path to the field file, or `-` for stdin
        input: PathBuf,

        /// Output path for decoded fields
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Write decoded fields to stdout
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Reject raw bytes nginx would have escaped (untrusted input)
        #[arg(long)]
        strict: bool,

        /// What to do with a field that fails to decode
        #[arg(long, value_enum, default_value_t = OnError::Fail)]
        on_error: OnError,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OnError {
    /// Stop at the first bad field
    Fail,
    /// Drop bad fields and keep going
    Skip,
    /// Emit the bytes decoded before the failure and keep going
    Partial,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            stdout,
            strict,
            on_error,
            quiet,
        } => {
            init_tracing(cli.verbose, quiet);
            cmd_decode(input, output, stdout, strict, on_error, quiet)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    fields: usize,
    rejected: usize,
}

fn cmd_decode(
    input: PathBuf,
    output: Option<PathBuf>,
    stdout: bool,
    strict: bool,
    on_error: OnError,
    quiet: bool,
) -> Result<(), CliError> {
    let output = if stdout {
        None
    } else {
        Some(output.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--output or --stdout".to_string()),
            )
        })?)
    };
    if let Some(output) = output.as_ref() {
        ensure_distinct_paths(&input, output)?;
    }

    let data = read_input(&input)?;
    let mode = if strict { Mode::Strict } else { Mode::Permissive };
    let (decoded, summary) = decode_fields(&data, mode, on_error)?;
    debug!(
        fields = summary.fields,
        rejected = summary.rejected,
        ?mode,
        "decoded input"
    );

    let Some(output) = output else {
        io::stdout()
            .lock()
            .write_all(&decoded)
            .context("Failed to write to stdout")?;
        return Ok(());
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(&output, &decoded)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    if !quiet {
        eprintln!(
            "OK: {} fields decoded ({} rejected) -> {}",
            summary.fields,
            summary.rejected,
            output.display()
        );
    }
    Ok(())
}

fn decode_fields(
    data: &[u8],
    mode: Mode,
    on_error: OnError,
) -> Result<(Vec<u8>, Summary), CliError> {
    let mut out = Vec::with_capacity(data.len());
    let mut summary = Summary::default();

    for (index, field) in split_fields(data).into_iter().enumerate() {
        let line = index + 1;
        summary.fields += 1;
        match decode(field, mode) {
            Ok(decoded) => {
                out.extend_from_slice(&decoded);
                out.push(b'\n');
            }
            Err(err) => {
                summary.rejected += 1;
                match on_error {
                    OnError::Fail => return Err(field_error(line, &err)),
                    OnError::Skip => {
                        warn!(line, offset = err.offset(), "skipping field: {err}");
                    }
                    OnError::Partial => {
                        warn!(line, offset = err.offset(), "keeping partial field: {err}");
                        out.extend_from_slice(err.partial());
                        out.push(b'\n');
                    }
                }
            }
        }
    }

    Ok((out, summary))
}

/// One field per line. A final newline terminates the last field rather than
/// starting an empty one.
fn split_fields(data: &[u8]) -> Vec<&[u8]> {
    if data.is_empty() {
        return Vec::new();
    }
    let data = data.strip_suffix(b"\n").unwrap_or(data);
    data.split(|&b| b == b'\n').collect()
}

fn field_error(line: usize, err: &UnescapeError) -> CliError {
    let hint = match err.kind() {
        ErrorKind::ShortScan => {
            "field holds a malformed \\xHH escape; use --on-error skip or partial to continue"
        }
        ErrorKind::NotEscaped => {
            "field holds raw bytes nginx would have escaped; drop --strict for trusted logs"
        }
    };
    CliError::new(format!("line {}: {}", line, err), Some(hint.to_string()))
}

fn read_input(input: &Path) -> Result<Vec<u8>, CliError> {
    if is_stdin(input) {
        let mut data = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut data)
            .context("Failed to read stdin")?;
        return Ok(data);
    }

    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a file with one escaped field per line, or `-` for stdin".to_string()),
        ));
    }
    let meta = fs::metadata(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a regular file, or `-` for stdin".to_string()),
        ));
    }
    fs::read(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))
        .map_err(Into::into)
}

fn ensure_distinct_paths(input: &Path, output: &Path) -> Result<(), CliError> {
    if is_stdin(input) || !input.exists() {
        return Ok(());
    }
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let output_dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing output directory cannot contain the input.
    let Ok(output_dir) = fs::canonicalize(output_dir) else {
        return Ok(());
    };
    let file_name = output
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?;
    if output_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn is_stdin(input: &Path) -> bool {
    input.as_os_str() == "-"
}
