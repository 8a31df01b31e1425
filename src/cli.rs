//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::typst_report::{tables, TypstReportAdapter};
use crate::domain::bar::Bar;
use crate::domain::config_validation::{
    parse_session_date, validate_data_config, validate_strategy_config,
};
use crate::domain::error::TradesimError;
use crate::domain::ledger::{Ledger, LedgerSummary};
use crate::domain::simulator::{simulate, SimulationParams};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_source::PriceSource;
use crate::ports::report_port::{ReportPort, SessionInfo};

pub const DEFAULT_DATA_DIR: &str = "tsla_data_1min";
pub const DEFAULT_SYMBOL: &str = "TSLA";
pub const DEFAULT_REPORT_PATH: &str = "report.typ";

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Single-day intraday trade simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where to find the price series. Flags override the `[data]` config section.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub symbol: Option<String>,
    /// Session date, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    /// Explicit CSV file; overrides data dir, symbol and date lookup
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a session and simulate forced trades
    Run {
        #[command(flatten)]
        data: DataArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        no_report: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// Preview a price file: columns, row count and time range
    Inspect {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Resolved location of one session's price file.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesLocation {
    File {
        path: PathBuf,
        symbol: String,
        session: Option<NaiveDate>,
    },
    Session {
        dir: PathBuf,
        symbol: String,
        session: NaiveDate,
    },
}

impl SeriesLocation {
    pub fn symbol(&self) -> &str {
        match self {
            SeriesLocation::File { symbol, .. } | SeriesLocation::Session { symbol, .. } => symbol,
        }
    }

    pub fn session(&self) -> Option<NaiveDate> {
        match self {
            SeriesLocation::File { session, .. } => *session,
            SeriesLocation::Session { session, .. } => Some(*session),
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            data,
            output,
            no_report,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&data)
            } else {
                run_simulation(&data, output.as_deref(), no_report)
            }
        }
        Command::Inspect { data } => run_inspect(&data),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load the INI file if one was given; otherwise every key takes its default.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, TradesimError> {
    match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_simulation_params(config: &dyn ConfigPort) -> Result<SimulationParams, TradesimError> {
    validate_strategy_config(config)?;

    let defaults = SimulationParams::default();
    Ok(SimulationParams {
        entry_buffer: config.get_double("strategy", "entry_buffer", defaults.entry_buffer),
        reward_ratio: config.get_double("strategy", "reward_ratio", defaults.reward_ratio),
        risk_per_trade: config.get_double("strategy", "risk_per_trade", defaults.risk_per_trade),
        stop_offset: config.get_double("strategy", "stop_offset", defaults.stop_offset),
        entry_cadence: config.get_usize("strategy", "entry_cadence", defaults.entry_cadence),
        holding_period: config.get_usize("strategy", "holding_period", defaults.holding_period),
        warmup_bars: config.get_usize("strategy", "warmup_bars", defaults.warmup_bars),
        min_bars: config.get_usize("strategy", "min_bars", defaults.min_bars),
    })
}

pub fn resolve_location(
    args: &DataArgs,
    config: &dyn ConfigPort,
) -> Result<SeriesLocation, TradesimError> {
    validate_data_config(config)?;

    let symbol = args
        .symbol
        .clone()
        .or_else(|| config.get_string("data", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty());

    let date = match args.date.as_deref() {
        Some(d) => Some(parse_session_date(d, "data", "date")?),
        None => match config.get_string("data", "date") {
            Some(d) => Some(parse_session_date(&d, "data", "date")?),
            None => None,
        },
    };

    let file = args
        .file
        .clone()
        .or_else(|| config.get_string("data", "file").map(PathBuf::from));

    if let Some(path) = file {
        let symbol = symbol.unwrap_or_else(|| symbol_from_path(&path));
        return Ok(SeriesLocation::File {
            path,
            symbol,
            session: date,
        });
    }

    let session = date.ok_or_else(|| TradesimError::ConfigMissing {
        section: "data".into(),
        key: "date".into(),
    })?;
    let dir = args
        .data_dir
        .clone()
        .or_else(|| config.get_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    Ok(SeriesLocation::Session {
        dir,
        symbol: symbol.unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
        session,
    })
}

/// `TSLA_2025-04-08.csv` -> `TSLA`.
fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.split('_').next())
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SYMBOL.to_string())
}

/// Fetch one session's bars through a price source.
pub fn load_session(
    source: &dyn PriceSource,
    symbol: &str,
    session: NaiveDate,
) -> Result<Vec<Bar>, TradesimError> {
    info!(symbol, %session, "loading price series");
    source.fetch_bars(symbol, session)
}

pub fn load_bars(location: &SeriesLocation) -> Result<Vec<Bar>, TradesimError> {
    match location {
        SeriesLocation::File { path, .. } => CsvAdapter::read_file(path),
        SeriesLocation::Session {
            dir,
            symbol,
            session,
        } => load_session(&CsvAdapter::new(dir.clone()), symbol, *session),
    }
}

/// Simulate, print the trade table and summary to `out`, and hand the ledger
/// to the reporter if one is given. Any failure aborts with no partial output
/// to the reporter.
pub fn run_pipeline(
    bars: &[Bar],
    params: &SimulationParams,
    session: &SessionInfo,
    report: Option<(&dyn ReportPort, &str)>,
    out: &mut dyn Write,
) -> Result<Ledger, TradesimError> {
    let ledger = simulate(bars, params)?;
    let summary = LedgerSummary::compute(&ledger);

    out.write_all(tables::format_console_table(&ledger).as_bytes())?;
    write_summary(out, &summary)?;

    if let Some((port, output_path)) = report {
        if ledger.is_empty() {
            info!("no trades executed, report will contain an empty ledger");
        }
        port.write(&ledger, params, session, output_path)?;
    }

    Ok(ledger)
}

fn write_summary(out: &mut dyn Write, summary: &LedgerSummary) -> io::Result<()> {
    writeln!(out, "\n=== Summary ===")?;
    writeln!(out, "Total Trades:     {}", summary.total_trades)?;
    writeln!(out, "Win Rate:         {:.1}%", summary.win_rate * 100.0)?;
    writeln!(out, "Total PnL:        {:.2}", summary.total_pnl)?;
    writeln!(out, "Largest Win:      {:.2}", summary.largest_win)?;
    writeln!(out, "Largest Loss:     {:.2}", summary.largest_loss)?;
    writeln!(out, "Max Drawdown:     {:.2}", summary.max_drawdown)?;
    Ok(())
}

fn run_simulation(
    args: &DataArgs,
    output_override: Option<&Path>,
    no_report: bool,
) -> Result<(), TradesimError> {
    let config = load_config(args.config.as_deref())?;
    let params = build_simulation_params(&config)?;
    let location = resolve_location(args, &config)?;

    let bars = load_bars(&location)?;
    let session = SessionInfo {
        symbol: location.symbol().to_string(),
        session: location.session(),
        bars: bars.len(),
    };

    let write_report = !no_report && config.get_bool("report", "enabled", true);
    let output_path = output_override
        .map(|p| p.display().to_string())
        .or_else(|| config.get_string("report", "output"))
        .unwrap_or_else(|| DEFAULT_REPORT_PATH.to_string());

    let reporter = match config.get_string("report", "template_path") {
        Some(path) => TypstReportAdapter::from_template_file(Path::new(&path))?,
        None => TypstReportAdapter::new(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report: Option<(&dyn ReportPort, &str)> = if write_report {
        Some((&reporter, output_path.as_str()))
    } else {
        None
    };
    run_pipeline(&bars, &params, &session, report, &mut out)?;
    Ok(())
}

fn run_dry_run(args: &DataArgs) -> Result<(), TradesimError> {
    let config = load_config(args.config.as_deref())?;
    let params = build_simulation_params(&config)?;
    let location = resolve_location(args, &config)?;

    let mut out = io::stdout().lock();
    write_dry_run(&mut out, &params, &location)?;
    Ok(())
}

pub fn write_dry_run(
    out: &mut dyn Write,
    params: &SimulationParams,
    location: &SeriesLocation,
) -> io::Result<()> {
    writeln!(out, "Series:")?;
    match location {
        SeriesLocation::File { path, .. } => writeln!(out, "  file:           {}", path.display())?,
        SeriesLocation::Session { dir, .. } => writeln!(out, "  data dir:       {}", dir.display())?,
    }
    writeln!(out, "  symbol:         {}", location.symbol())?;
    if let Some(session) = location.session() {
        writeln!(out, "  session:        {}", session)?;
    }

    writeln!(out, "\nParameters:")?;
    writeln!(out, "  entry_buffer:   {}", params.entry_buffer)?;
    writeln!(out, "  reward_ratio:   {}", params.reward_ratio)?;
    writeln!(out, "  risk_per_trade: {}", params.risk_per_trade)?;
    writeln!(out, "  stop_offset:    {}", params.stop_offset)?;
    writeln!(out, "  entry_cadence:  {}", params.entry_cadence)?;
    writeln!(out, "  holding_period: {}", params.holding_period)?;
    writeln!(out, "  warmup_bars:    {}", params.warmup_bars)?;
    writeln!(out, "  min_bars:       {}", params.min_bars)?;

    writeln!(out, "\nDry run complete: configuration is valid")?;
    Ok(())
}

fn run_inspect(args: &DataArgs) -> Result<(), TradesimError> {
    let config = load_config(args.config.as_deref())?;
    let params = build_simulation_params(&config)?;
    let location = resolve_location(args, &config)?;

    let path = match &location {
        SeriesLocation::File { path, .. } => path.clone(),
        SeriesLocation::Session {
            dir,
            symbol,
            session,
        } => CsvAdapter::new(dir.clone()).csv_path(symbol, *session),
    };

    let info = CsvAdapter::describe(&path)?;
    println!("{}", info.path.display());
    println!("  columns: {}", info.columns.join(", "));
    println!("  rows:    {}", info.rows);
    if let (Some(first), Some(last)) = (info.first, info.last) {
        println!("  range:   {} to {}", first, last);
    }

    if info.rows < params.min_bars {
        warn!(
            rows = info.rows,
            min_bars = params.min_bars,
            "too few rows to simulate"
        );
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), TradesimError> {
    let config = load_config(Some(config_path))?;
    validate_strategy_config(&config)?;
    validate_data_config(&config)?;
    println!("Configuration is valid.");
    Ok(())
}
