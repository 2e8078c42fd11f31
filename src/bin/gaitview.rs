//! gaitview - Command-line interface for gait-trials
//!
//! Commands:
//! - table: Print the per-subject trial ceiling
//! - list: List the trial codes of a dataset folder
//! - info: Write the trial information report for one trial
//! - session: Drive a headless trial selector from stdin

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use gait_trials::controls::Representation;
use gait_trials::dataset::{render_report, Catalog, TrialCode, TrialMetadata, DEFAULT_DATA_DIR};
use gait_trials::page::{ControlEvent, ControlTarget, EventKind, HeadlessPage, PageSnapshot};
use gait_trials::{ClampConfig, GaitError, Parameters, SubjectMaxTable, GAIT_VERSION};

/// gaitview - Browse the trials of the gait dataset
#[derive(Parser)]
#[command(name = "gaitview")]
#[command(version = GAIT_VERSION)]
#[command(about = "Browse subjects and trials of the gait dataset", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the maximum trial number of every subject
    Table {
        /// Derive the table from a dataset folder instead of the built-in one
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the trial codes found in a dataset folder
    List {
        /// Dataset folder
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },

    /// Write the information report of one trial
    Info {
        /// The subject identifier
        #[arg(long)]
        subject: u32,

        /// The trial identifier
        #[arg(long)]
        trial: u32,

        /// Dataset folder
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "trial_info.txt")]
        output: PathBuf,

        /// Output the trial summary as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Drive a headless trial selector with commands read from stdin
    ///
    /// One command per line: `subject <value>` or `trial <value>`, optionally
    /// qualified with `slider`/`numeric` and `input`/`change`
    /// (e.g. `subject slider input 14`).
    Session {
        /// Initial subject
        #[arg(long, default_value = "1")]
        subject: i64,

        /// Initial trial
        #[arg(long, default_value = "1")]
        trial: i64,

        /// Also copy clamped trial values back on trial edits
        #[arg(long)]
        resync_on_trial_change: bool,

        /// Widget configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Derive the subject table from a dataset folder
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), GaitCliError> {
    match cli.command {
        Commands::Table { data_dir, json } => cmd_table(data_dir.as_deref(), json),

        Commands::List { data_dir } => cmd_list(&data_dir),

        Commands::Info {
            subject,
            trial,
            data_dir,
            output,
            json,
        } => cmd_info(subject, trial, &data_dir, &output, json),

        Commands::Session {
            subject,
            trial,
            resync_on_trial_change,
            config,
            data_dir,
            json,
        } => cmd_session(
            Parameters::new(subject, trial),
            resync_on_trial_change,
            config.as_deref(),
            data_dir.as_deref(),
            json,
        ),
    }
}

fn cmd_table(data_dir: Option<&Path>, json: bool) -> Result<(), GaitCliError> {
    let table = load_table(data_dir)?;

    if json {
        println!("{}", serde_json::to_string(&table)?);
    } else {
        println!("Subject  Max trial");
        println!("=======  =========");
        for (idx, max) in table.as_slice().iter().enumerate() {
            println!("{:>7}  {:>9}", idx + 1, max);
        }
    }

    Ok(())
}

fn cmd_list(data_dir: &Path) -> Result<(), GaitCliError> {
    let catalog = Catalog::scan(data_dir)?;

    if catalog.is_empty() {
        return Err(GaitError::EmptyCatalog(data_dir.to_path_buf()).into());
    }

    for code in catalog.codes() {
        println!("{code}");
    }

    Ok(())
}

fn cmd_info(
    subject: u32,
    trial: u32,
    data_dir: &Path,
    output: &Path,
    json: bool,
) -> Result<(), GaitCliError> {
    let code = TrialCode::new(subject, trial)?;
    let catalog = Catalog::scan(data_dir)?;
    catalog.require(code)?;

    let summary = TrialMetadata::load(&catalog, code)?.summary();

    let output_data = if json {
        serde_json::to_string_pretty(&summary)? + "\n"
    } else {
        render_report(&summary)
    };

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_session(
    params: Parameters,
    resync_on_trial_change: bool,
    config: Option<&Path>,
    data_dir: Option<&Path>,
    json: bool,
) -> Result<(), GaitCliError> {
    let mut config = match config {
        Some(path) => ClampConfig::from_json(&fs::read_to_string(path)?)?,
        None => ClampConfig::default(),
    };
    if resync_on_trial_change {
        config.resync_on_trial_change = true;
    }
    let table = load_table(data_dir)?;

    let mut page = HeadlessPage::headless(params);
    page.on_ready(table, config);
    page.ready();

    let mut stdout = io::stdout();
    write_snapshot(&mut stdout, &page.snapshot(), json)?;

    let interactive = atty::is(atty::Stream::Stdin);
    let mut lines = io::stdin().lock().lines();
    let mut line_no = 0;

    loop {
        if interactive {
            eprint!("> ");
        }
        let Some(line) = lines.next() else { break };
        let line = line?;
        line_no += 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let event = parse_session_line(trimmed)
            .map_err(|message| GaitCliError::Session { line: line_no, message })?;
        page.dispatch(&event);

        write_snapshot(&mut stdout, &page.snapshot(), json)?;
        stdout.flush()?;
    }

    Ok(())
}

// Helper functions

fn load_table(data_dir: Option<&Path>) -> Result<SubjectMaxTable, GaitCliError> {
    match data_dir {
        Some(dir) => Ok(Catalog::scan(dir)?.subject_max_table()?),
        None => Ok(SubjectMaxTable::default()),
    }
}

fn parse_session_line(line: &str) -> Result<ControlEvent, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (target, rest) = tokens.split_first().ok_or("empty command")?;
    let (value, qualifiers) = rest.split_last().ok_or("missing value")?;

    let target = match *target {
        "subject" => ControlTarget::Subject,
        "trial" => ControlTarget::Trial,
        other => return Err(format!("unknown control '{other}'")),
    };

    let mut event = ControlEvent::commit(target, *value);
    for qualifier in qualifiers {
        match *qualifier {
            "slider" => event.source = Representation::Slider,
            "numeric" => event.source = Representation::Numeric,
            "input" => event.kind = EventKind::Input,
            "change" => event.kind = EventKind::Change,
            other => return Err(format!("unknown qualifier '{other}'")),
        }
    }

    Ok(event)
}

fn write_snapshot(out: &mut impl Write, snapshot: &PageSnapshot, json: bool) -> Result<(), GaitCliError> {
    if json {
        writeln!(out, "{}", serde_json::to_string(snapshot)?)?;
    } else {
        writeln!(
            out,
            "subject={} trial={} | control {}/{} (max {}) | {}",
            snapshot.parameters.subject,
            snapshot.parameters.trial,
            snapshot.trial_numeric,
            snapshot.trial_slider,
            snapshot.trial_max.as_deref().unwrap_or("-"),
            snapshot.label,
        )?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum GaitCliError {
    Io(io::Error),
    Gait(GaitError),
    Json(serde_json::Error),
    Session { line: usize, message: String },
}

impl From<io::Error> for GaitCliError {
    fn from(e: io::Error) -> Self {
        GaitCliError::Io(e)
    }
}

impl From<GaitError> for GaitCliError {
    fn from(e: GaitError) -> Self {
        GaitCliError::Gait(e)
    }
}

impl From<serde_json::Error> for GaitCliError {
    fn from(e: serde_json::Error) -> Self {
        GaitCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<GaitCliError> for CliError {
    fn from(e: GaitCliError) -> Self {
        match e {
            GaitCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            GaitCliError::Gait(e) => {
                let (code, hint) = match &e {
                    GaitError::Io(_) => ("IO_ERROR", "Check that --data-dir points at the dataset folder"),
                    GaitError::UnknownTrial { .. } => ("UNKNOWN_TRIAL", "Run 'gaitview list' to see available trials"),
                    GaitError::EmptyCatalog(_) | GaitError::MissingSubject(_) => {
                        ("INCOMPLETE_DATASET", "Check that the dataset folder is complete")
                    }
                    GaitError::InvalidMetadata { .. } | GaitError::Json(_) => {
                        ("METADATA_ERROR", "Check the trial's JSON metadata file")
                    }
                    GaitError::InvalidTrialCode(_) => ("INVALID_TRIAL_CODE", "Subject and trial start at 1"),
                    GaitError::InvalidTable(_) => ("INVALID_TABLE", "Every subject needs at least one trial"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            GaitCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            GaitCliError::Session { line, message } => CliError {
                code: "SESSION_ERROR".to_string(),
                message: format!("line {line}: {message}"),
                hint: Some("Use 'subject <value>' or 'trial <value>'".to_string()),
            },
        }
    }
}
