//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::pivot_csv_adapter::{PivotCsvReader, ProjectionCsvWriter};
use crate::domain::config_validation::{
    build_analysis_settings, build_projection_settings, parse_iso_date, validate_date_order,
};
use crate::domain::date_index::{IndexBuild, ScriptDateIndex};
use crate::domain::error::SwingError;
use crate::domain::ohlcv::Interval;
use crate::domain::projection::DateProjector;
use crate::domain::respect::MovingAverageAnalyzer;
use crate::domain::query::{self, INVALID_DATE_MESSAGE, Query, QueryKind};
use crate::domain::screen::{ScreenReport, ScreenRequest, parse_symbols, screen_symbols};
use crate::ports::pivot_port::{PivotSource, ProjectionSink};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT: &str = "updated_file_with_two_cycles.csv";
pub const NO_RESPECTED_MESSAGE: &str = "No SMAs respected continuously for the selected stocks.";

#[derive(Parser, Debug)]
#[command(
    name = "swingcycle",
    about = "Moving-average respect screen and degree-cycle date projection"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report which moving averages each symbol respected
    Analyze {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma-separated symbols
        #[arg(long)]
        symbols: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
        /// 1d, 1wk or 1mo
        #[arg(long)]
        interval: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Project both degree cycles for every pivot row and write the table
    Project {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        pivots: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Look up projected dates by date or by script
    Query {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        pivots: Option<PathBuf>,
        /// dd-mm-yyyy
        #[arg(long, conflicts_with = "script")]
        date: Option<String>,
        #[arg(long)]
        script: Option<String>,
    },
    /// Check whether a date trades
    Calendar {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            symbols,
            start,
            end,
            interval,
            data_dir,
        } => run_analyze(
            config.as_deref(),
            AnalyzeOverrides {
                symbols,
                start,
                end,
                interval,
                data_dir,
            },
        ),
        Command::Project {
            config,
            pivots,
            output,
        } => run_project(config.as_deref(), pivots, output),
        Command::Query {
            config,
            pivots,
            date,
            script,
        } => run_query(config.as_deref(), pivots, date, script),
        Command::Calendar { config, date } => run_calendar(config.as_deref(), &date),
    }
}

fn report(err: &SwingError) -> ExitCode {
    error!("{err}");
    err.into()
}

/// Load the INI file at `path`, or an empty config when none is given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, SwingError> {
    match path {
        None => Ok(FileConfigAdapter::empty()),
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path).map_err(|e| SwingError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    }
}

#[derive(Debug, Default)]
pub struct AnalyzeOverrides {
    pub symbols: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub interval: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// Everything `analyze` needs, after merging flags over config.
#[derive(Debug)]
pub struct AnalyzePlan {
    pub symbols: Vec<String>,
    pub request: ScreenRequest,
    pub analyzer: MovingAverageAnalyzer,
    pub data_dir: PathBuf,
}

pub fn build_analyze_plan(
    config: &FileConfigAdapter,
    overrides: AnalyzeOverrides,
) -> Result<AnalyzePlan, SwingError> {
    let settings = build_analysis_settings(config)?;

    let symbols_raw = overrides
        .symbols
        .or(settings.symbols.clone())
        .ok_or_else(|| SwingError::ConfigMissing {
            section: "analysis".into(),
            key: "symbols".into(),
        })?;
    let symbols = parse_symbols(&symbols_raw);
    if symbols.is_empty() {
        return Err(SwingError::ConfigInvalid {
            section: "analysis".into(),
            key: "symbols".into(),
            reason: "no symbols given".into(),
        });
    }

    let start_date = resolve_date(overrides.start.as_deref(), settings.start_date, "start_date")?;
    let end_date = resolve_date(overrides.end.as_deref(), settings.end_date, "end_date")?;
    validate_date_order(start_date, end_date)?;

    let interval = match overrides.interval {
        Some(s) => s.parse::<Interval>()?,
        None => settings.interval,
    };

    Ok(AnalyzePlan {
        symbols,
        request: ScreenRequest {
            start_date,
            end_date,
            interval,
            lookback_days: settings.lookback_days,
        },
        analyzer: settings.analyzer()?,
        data_dir: overrides
            .data_dir
            .or(settings.data_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    })
}

fn resolve_date(
    flag: Option<&str>,
    configured: Option<NaiveDate>,
    key: &str,
) -> Result<NaiveDate, SwingError> {
    match flag {
        Some(s) => parse_iso_date(s, "analysis", key),
        None => configured.ok_or_else(|| SwingError::ConfigMissing {
            section: "analysis".into(),
            key: key.into(),
        }),
    }
}

/// `symbol,window,touches` lines, or the no-result message.
pub fn format_screen_report(report: &ScreenReport) -> Vec<String> {
    let rows = report.rows();
    if rows.is_empty() {
        return vec![NO_RESPECTED_MESSAGE.to_string()];
    }
    std::iter::once("Stock Symbol,Respected SMA,Touch Count".to_string())
        .chain(
            rows.into_iter()
                .map(|(symbol, window, touches)| format!("{symbol},{window},{touches}")),
        )
        .collect()
}

fn run_analyze(config_path: Option<&Path>, overrides: AnalyzeOverrides) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return report(&e),
    };
    let plan = match build_analyze_plan(&config, overrides) {
        Ok(p) => p,
        Err(e) => return report(&e),
    };

    info!(
        symbols = plan.symbols.len(),
        start = %plan.request.start_date,
        end = %plan.request.end_date,
        interval = %plan.request.interval,
        "screening moving averages"
    );

    let data_port = CsvAdapter::new(plan.data_dir.clone());
    let screen = screen_symbols(&data_port, &plan.analyzer, &plan.symbols, &plan.request);

    for line in format_screen_report(&screen) {
        println!("{line}");
    }

    if screen.results.is_empty() {
        if let Some(last) = screen.skipped.last() {
            error!("no symbol could be analyzed");
            return (&last.reason).into();
        }
    }
    ExitCode::SUCCESS
}

/// Read pivots, project both cycles, index them and hand the rows to `sink`.
pub fn run_projection_pipeline(
    source: &dyn PivotSource,
    sink: Option<&dyn ProjectionSink>,
    projector: &DateProjector,
) -> Result<IndexBuild, SwingError> {
    let rows = source.read_rows()?;
    info!(rows = rows.len(), "projecting pivot rows");

    let build = ScriptDateIndex::build(projector, rows);

    for failure in &build.failures {
        warn!(
            line = failure.line,
            symbol = failure.symbol.as_deref().unwrap_or("-"),
            error = %failure.error,
            "row skipped"
        );
    }

    if let Some(sink) = sink {
        sink.write(&build.projections, projector.degrees())?;
    }

    info!(
        projected = build.projections.len(),
        failed = build.failures.len(),
        dates = build.index.date_count(),
        "index built"
    );
    Ok(build)
}

fn projection_inputs(
    config_path: Option<&Path>,
    pivots: Option<PathBuf>,
) -> Result<(DateProjector, PathBuf, Option<PathBuf>), SwingError> {
    let config = load_config(config_path)?;
    let settings = build_projection_settings(&config)?;
    let projector = settings.projector()?;
    let pivots = pivots
        .or(settings.pivots)
        .ok_or_else(|| SwingError::ConfigMissing {
            section: "projection".into(),
            key: "pivots".into(),
        })?;
    Ok((projector, pivots, settings.output))
}

fn run_project(
    config_path: Option<&Path>,
    pivots: Option<PathBuf>,
    output: Option<PathBuf>,
) -> ExitCode {
    let (projector, pivots, configured_output) = match projection_inputs(config_path, pivots) {
        Ok(inputs) => inputs,
        Err(e) => return report(&e),
    };
    let output = output
        .or(configured_output)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let source = PivotCsvReader::new(pivots);
    let sink = ProjectionCsvWriter::new(output.clone());

    match run_projection_pipeline(&source, Some(&sink), &projector) {
        Ok(build) => {
            println!(
                "Projected {} rows ({} failed) onto {} dates",
                build.projections.len(),
                build.failures.len(),
                build.index.date_count()
            );
            println!("Results written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_query(
    config_path: Option<&Path>,
    pivots: Option<PathBuf>,
    date: Option<String>,
    script: Option<String>,
) -> ExitCode {
    let (projector, pivots, _) = match projection_inputs(config_path, pivots) {
        Ok(inputs) => inputs,
        Err(e) => return report(&e),
    };
    let source = PivotCsvReader::new(pivots);
    let build = match run_projection_pipeline(&source, None, &projector) {
        Ok(b) => b,
        Err(e) => return report(&e),
    };

    let (kind, text) = match (date, script) {
        (Some(d), _) => (QueryKind::Date, d),
        (None, Some(s)) => (QueryKind::Script, s),
        (None, None) => {
            println!("Enter 'date <dd-mm-yyyy>', 'script <name>' or 'quit'.");
            let stdin = io::stdin();
            return match query::run_interactive(&build.index, stdin.lock(), io::stdout()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => report(&SwingError::Io(e)),
            };
        }
    };

    match Query::parse(kind, &text) {
        Ok(q) => {
            for line in query::answer(&build.index, &q) {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{INVALID_DATE_MESSAGE}");
            warn!(%e, "query not answered");
            (&e).into()
        }
    }
}

fn run_calendar(config_path: Option<&Path>, date: &str) -> ExitCode {
    let outcome = load_config(config_path)
        .and_then(|config| build_projection_settings(&config))
        .and_then(|settings| Ok((settings.calendar()?, settings.max_advance_days)))
        .and_then(|(calendar, max_days)| {
            let date = parse_iso_date(date, "calendar", "date")?;
            let next = calendar.advance_to_trading_day(date, max_days)?;
            Ok((calendar.is_non_trading_day(date), calendar.is_holiday(date), date, next))
        });

    match outcome {
        Ok((false, _, date, _)) => {
            println!("{date} is a trading day");
            ExitCode::SUCCESS
        }
        Ok((true, holiday, date, next)) => {
            let why = if holiday { "holiday" } else { "weekend" };
            println!("{date} is a non-trading day ({why}); next trading day {next}");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}
