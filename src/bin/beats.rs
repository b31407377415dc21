//! Beats CLI - Command-line interface for the activity-tier classifier
//!
//! Commands:
//! - classify: Classify a file of rate samples (batch mode)
//! - run: Process activity events from stdin (streaming mode)
//! - doctor: Diagnose configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{channel, Receiver};

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use beats_tier::{
    ActivityEvent, ActivitySession, ComputeError, RateSample, SessionConfig, SessionOutput,
    ThresholdTable, TierSnapshot, BEATS_VERSION, PRODUCER_NAME,
};

/// Beats - map keyboard and mouse activity to engagement tiers
#[derive(Parser)]
#[command(name = "beats")]
#[command(version = BEATS_VERSION)]
#[command(about = "Classify keyboard/mouse activity rates into tiers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify rate samples (batch mode)
    Classify {
        /// Input file of NDJSON rate samples (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Process activity events from stdin (streaming mode)
    Run {
        /// Emit a report after every N ticks (0 disables)
        #[arg(long, default_value = "0")]
        report_every: u32,

        /// Flush output after each record (`--flush false` to buffer)
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        flush: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Diagnose configuration
    Doctor {
        /// Config file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct SettingsArgs {
    /// JSON session config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated ascending thresholds, overriding the config
    #[arg(long)]
    thresholds: Option<String>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one snapshot per line)
    Ndjson,
    /// JSON array of snapshots
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), BeatsCliError> {
    match cli.command {
        Commands::Classify {
            input,
            output,
            output_format,
            settings,
        } => cmd_classify(&input, &output, output_format, &settings),
        Commands::Run {
            report_every,
            flush,
            settings,
        } => cmd_run(report_every, flush, &settings),
        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn load_config(settings: &SettingsArgs) -> Result<SessionConfig, BeatsCliError> {
    let mut config = match &settings.config {
        Some(path) => SessionConfig::from_path(path)?,
        None => SessionConfig::default(),
    };

    if let Some(list) = &settings.thresholds {
        config.thresholds = ThresholdTable::parse_list(list)?.into();
    }

    config.validate()?;
    debug!(?config, "loaded session config");
    Ok(config)
}

fn cmd_classify(
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
    settings: &SettingsArgs,
) -> Result<(), BeatsCliError> {
    let config = load_config(settings)?;

    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let snapshots = classify_samples(&input_data, &config)?;
    info!(samples = snapshots.len(), "classified rate samples");

    let rendered = format_output(&snapshots, &output_format)?;
    if output.to_string_lossy() == "-" {
        let mut stdout = io::stdout();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
    } else {
        fs::write(output, rendered)?;
    }

    Ok(())
}

/// Classify NDJSON rate samples, one snapshot per non-empty line
fn classify_samples(
    input_data: &str,
    config: &SessionConfig,
) -> Result<Vec<TierSnapshot>, BeatsCliError> {
    // Tier changes are already visible in each snapshot
    let (tx, rx) = channel();
    let mut session = ActivitySession::new(config, tx)?;
    let mut snapshots: Vec<TierSnapshot> = Vec::new();

    for (line_no, line) in input_data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let sample: RateSample = serde_json::from_str(trimmed).map_err(|e| {
            BeatsCliError::ParseError(format!("line {}: {}", line_no + 1, e))
        })?;
        session.dispatch(ActivityEvent::Rate(sample))?;
        rx.try_iter().for_each(drop);
        snapshots.push(session.snapshot());
    }

    if snapshots.is_empty() {
        return Err(BeatsCliError::NoSamples);
    }
    Ok(snapshots)
}

fn cmd_run(report_every: u32, flush: bool, settings: &SettingsArgs) -> Result<(), BeatsCliError> {
    let config = load_config(settings)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    stream_session(&config, stdin.lock(), &mut stdout, report_every, flush)
}

/// Drive one session from NDJSON records, writing its outputs as NDJSON.
/// A final report is emitted once the input ends.
fn stream_session(
    config: &SessionConfig,
    input: impl BufRead,
    out: &mut impl Write,
    report_every: u32,
    flush: bool,
) -> Result<(), BeatsCliError> {
    let (tx, rx) = channel();
    let mut session = ActivitySession::new(config, tx)?;
    info!(session_id = session.id(), "streaming activity session started");

    let mut ticks: u64 = 0;

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        match parse_stream_record(trimmed)? {
            StreamRecord::Tick => {
                session.tick()?;
                ticks += 1;
                if report_every > 0 && ticks % u64::from(report_every) == 0 {
                    session.report()?;
                }
            }
            StreamRecord::Report => {
                session.report()?;
            }
            StreamRecord::Event(event) => session.dispatch(event)?,
        }

        drain_outputs(&rx, out)?;
        if flush {
            out.flush()?;
        }
    }

    session.report()?;
    drain_outputs(&rx, out)?;
    out.flush()?;

    Ok(())
}

/// One line of the streaming input
enum StreamRecord {
    Tick,
    Report,
    Event(ActivityEvent),
}

fn parse_stream_record(line: &str) -> Result<StreamRecord, BeatsCliError> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| BeatsCliError::ParseError(format!("Failed to parse record: {}", e)))?;

    match value.get("type").and_then(|t| t.as_str()) {
        Some("tick") => Ok(StreamRecord::Tick),
        Some("report") => Ok(StreamRecord::Report),
        _ => serde_json::from_value(value)
            .map(StreamRecord::Event)
            .map_err(|e| BeatsCliError::ParseError(format!("Unknown activity event: {}", e))),
    }
}

fn drain_outputs(rx: &Receiver<SessionOutput>, out: &mut impl Write) -> Result<(), BeatsCliError> {
    for output in rx.try_iter() {
        writeln!(out, "{}", serde_json::to_string(&output)?)?;
    }
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), BeatsCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, BEATS_VERSION),
    });

    checks.push(config_check(config));

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: BEATS_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Beats Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(BeatsCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Check a config file the same way `classify` and `run` load it
fn config_check(config: Option<&Path>) -> DoctorCheck {
    match config {
        Some(path) if !path.exists() => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: format!("Config file {} does not exist", path.display()),
        },
        Some(path) => match SessionConfig::from_path(path) {
            Ok(config) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Config valid ({} thresholds, {} tiers, {} ms interval)",
                    config.thresholds.len(),
                    config.thresholds.len() + 1,
                    config.sample_interval_ms
                ),
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        },
        None => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Using defaults: thresholds {:?}",
                SessionConfig::default().thresholds
            ),
        },
    }
}

fn format_output(
    snapshots: &[TierSnapshot],
    format: &OutputFormat,
) -> Result<String, BeatsCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for snapshot in snapshots {
                lines.push(serde_json::to_string(snapshot)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(snapshots)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(snapshots)?),
    }
}

// Error types

#[derive(Debug)]
enum BeatsCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoSamples,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for BeatsCliError {
    fn from(e: io::Error) -> Self {
        BeatsCliError::Io(e)
    }
}

impl From<ComputeError> for BeatsCliError {
    fn from(e: ComputeError) -> Self {
        BeatsCliError::Compute(e)
    }
}

impl From<serde_json::Error> for BeatsCliError {
    fn from(e: serde_json::Error) -> Self {
        BeatsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<BeatsCliError> for CliError {
    fn from(e: BeatsCliError) -> Self {
        match e {
            BeatsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            BeatsCliError::Compute(e @ ComputeError::InvalidThresholds(_)) => CliError {
                code: "THRESHOLD_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Thresholds must be finite and ascending, e.g. 100,200,500".to_string()),
            },
            BeatsCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'beats doctor --config <file>' to check the config".to_string()),
            },
            BeatsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            BeatsCliError::NoSamples => CliError {
                code: "NO_SAMPLES".to_string(),
                message: "No rate samples found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            BeatsCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            BeatsCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some(
                    "Records look like {\"type\":\"input\",\"kind\":\"keyboard\"} or {\"type\":\"tick\"}"
                        .to_string(),
                ),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Debug, PartialEq, serde::Serialize)]
enum CheckStatus {
    Ok,
    Error,
}
