//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, info_span, warn};

use crate::adapters::csv_adapter::{CsvAdapter, CsvLayout};
use crate::adapters::csv_report_adapter::{self, CsvReportAdapter, ReportLayout};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::table_report::{format_summary, format_trade_table};
use crate::domain::config_validation::validate_strategy_config;
use crate::domain::error::FxcrossError;
use crate::domain::indicator::{IndicatorParams, IndicatorSet};
use crate::domain::metrics::TradeSummary;
use crate::domain::position::Position;
use crate::domain::price_bar::closes;
use crate::domain::signal::{derive_signals, RsiLevels, Signal};
use crate::domain::simulator::{simulate, SimulationResult};
use crate::domain::strategy::{ExitPolicy, PolicyKind, StrategyConfig, DEFAULT_RSI_EXIT_LEVEL};
use crate::logging::init_tracing;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_TRADE_OUTPUT: &str = "backtest_results.csv";
pub const DEFAULT_INDICATOR_OUTPUT: &str = "indicators.csv";

#[derive(Parser, Debug)]
#[command(name = "fxcross", about = "EMA crossover backtester with RSI confirmation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the trade log
    Backtest {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        strategy: StrategyArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Trade log columns: full or compact
        #[arg(long)]
        report_layout: Option<ReportLayout>,
        #[arg(long)]
        log_level: Option<String>,
    },
    /// Write per-bar indicator values and signals
    Indicators {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        strategy: StrategyArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        log_level: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Price CSV file (overrides [data] path)
    #[arg(short, long)]
    pub data: Option<PathBuf>,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// CSV layout: auto, bid_ask or simple
    #[arg(long)]
    pub layout: Option<CsvLayout>,
}

/// Command-line overrides for `[indicators]` and `[strategy]` keys.
#[derive(Args, Debug, Clone, Default)]
pub struct StrategyArgs {
    #[arg(long)]
    pub ema_short: Option<usize>,
    #[arg(long)]
    pub ema_long: Option<usize>,
    #[arg(long)]
    pub rsi_period: Option<usize>,
    #[arg(long)]
    pub rsi_buy: Option<f64>,
    #[arg(long)]
    pub rsi_sell: Option<f64>,
    #[arg(long)]
    pub rsi_exit: Option<f64>,
    /// reversal or rsi-exit
    #[arg(long)]
    pub policy: Option<PolicyKind>,
    #[arg(long)]
    pub close_open_at_end: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            input,
            strategy,
            output,
            report_layout,
            log_level,
        } => run_backtest(
            &input,
            &strategy,
            output.as_deref(),
            report_layout,
            log_level.as_deref(),
        ),
        Command::Indicators {
            input,
            strategy,
            output,
            log_level,
        } => run_indicators(&input, &strategy, output.as_deref(), log_level.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, FxcrossError> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Merge config file values and command-line overrides into a strategy.
/// Missing keys take their defaults.
pub fn build_strategy_config(
    config: &dyn ConfigPort,
    overrides: &StrategyArgs,
) -> Result<StrategyConfig, FxcrossError> {
    let ind = IndicatorParams::default();
    let lvl = RsiLevels::default();

    let indicators = IndicatorParams {
        ema_short_period: overrides.ema_short.map_or_else(
            || config.get_usize("indicators", "ema_short_period", ind.ema_short_period),
            Ok,
        )?,
        ema_long_period: overrides.ema_long.map_or_else(
            || config.get_usize("indicators", "ema_long_period", ind.ema_long_period),
            Ok,
        )?,
        rsi_period: overrides.rsi_period.map_or_else(
            || config.get_usize("indicators", "rsi_period", ind.rsi_period),
            Ok,
        )?,
    };

    let levels = RsiLevels {
        buy_level: overrides.rsi_buy.map_or_else(
            || config.get_double("strategy", "rsi_buy_level", lvl.buy_level),
            Ok,
        )?,
        sell_level: overrides.rsi_sell.map_or_else(
            || config.get_double("strategy", "rsi_sell_level", lvl.sell_level),
            Ok,
        )?,
    };

    let kind = match (overrides.policy, config.get_string("strategy", "policy")) {
        (Some(kind), _) => kind,
        (None, Some(raw)) => raw
            .parse()
            .map_err(|reason: String| FxcrossError::invalid("strategy", "policy", reason))?,
        (None, None) => PolicyKind::default(),
    };
    let policy = match kind {
        PolicyKind::Reversal => ExitPolicy::Reversal,
        PolicyKind::RsiExit => ExitPolicy::RsiExit {
            exit_level: overrides.rsi_exit.map_or_else(
                || config.get_double("strategy", "rsi_exit_level", DEFAULT_RSI_EXIT_LEVEL),
                Ok,
            )?,
        },
    };

    let close_open_at_end =
        overrides.close_open_at_end || config.get_bool("strategy", "close_open_at_end", false)?;

    Ok(StrategyConfig {
        indicators,
        levels,
        policy,
        close_open_at_end,
    })
}

pub fn resolve_data_path(
    data_override: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, FxcrossError> {
    data_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "path").map(PathBuf::from))
        .ok_or_else(|| {
            FxcrossError::invalid("data", "path", "no price file given (use --data or set [data] path)")
        })
}

pub fn resolve_csv_layout(
    layout_override: Option<CsvLayout>,
    config: &dyn ConfigPort,
) -> Result<CsvLayout, FxcrossError> {
    match (layout_override, config.get_string("data", "layout")) {
        (Some(layout), _) => Ok(layout),
        (None, Some(raw)) => raw
            .parse()
            .map_err(|reason: String| FxcrossError::invalid("data", "layout", reason)),
        (None, None) => Ok(CsvLayout::default()),
    }
}

pub fn resolve_report_layout(
    layout_override: Option<ReportLayout>,
    config: &dyn ConfigPort,
    policy: PolicyKind,
) -> Result<ReportLayout, FxcrossError> {
    match (layout_override, config.get_string("report", "layout")) {
        (Some(layout), _) => Ok(layout),
        (None, Some(raw)) => raw
            .parse()
            .map_err(|reason: String| FxcrossError::invalid("report", "layout", reason)),
        (None, None) => Ok(ReportLayout::for_policy(policy)),
    }
}

fn resolve_output(output_override: Option<&Path>, config: &dyn ConfigPort, default: &str) -> PathBuf {
    output_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

fn fail(err: FxcrossError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

/// Load the config, start logging and build the validated strategy.
fn prepare(
    input: &InputArgs,
    overrides: &StrategyArgs,
    log_level: Option<&str>,
) -> Result<(FileConfigAdapter, StrategyConfig), FxcrossError> {
    let config = load_config(input.config.as_deref())?;
    init_tracing(log_level, config.get_string("logging", "level"))
        .map_err(|reason| FxcrossError::invalid("logging", "level", reason))?;

    let strategy = build_strategy_config(&config, overrides)?;
    validate_strategy_config(&strategy)?;
    Ok((config, strategy))
}

fn run_backtest(
    input: &InputArgs,
    overrides: &StrategyArgs,
    output: Option<&Path>,
    report_layout: Option<ReportLayout>,
    log_level: Option<&str>,
) -> ExitCode {
    let result = prepare(input, overrides, log_level).and_then(|(config, strategy)| {
        let data_path = resolve_data_path(input.data.as_deref(), &config)?;
        let csv_layout = resolve_csv_layout(input.layout, &config)?;
        let layout = resolve_report_layout(report_layout, &config, strategy.policy.kind())?;
        let output = resolve_output(output, &config, DEFAULT_TRADE_OUTPUT);

        let data_port = CsvAdapter::new(data_path, csv_layout);
        let report_port = CsvReportAdapter::new(layout);
        run_backtest_pipeline(&data_port, &strategy, &report_port, &output)
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &StrategyConfig,
    report_port: &dyn ReportPort,
    output_path: &Path,
) -> Result<SimulationResult, FxcrossError> {
    let _span = info_span!("backtest", source = %data_port.source()).entered();

    // Stage 1: Load price data
    eprintln!("Loading price data from {}", data_port.source());
    let bars = data_port.fetch_bars()?;
    warn_if_short(bars.len(), &strategy.indicators);

    // Stage 2: Indicators
    let indicators = IndicatorSet::compute(&closes(&bars), &strategy.indicators);
    info!(
        ema_short = strategy.indicators.ema_short_period,
        ema_long = strategy.indicators.ema_long_period,
        rsi = strategy.indicators.rsi_period,
        rsi_from = ?indicators.rsi.first_valid(),
        "computed indicators"
    );

    // Stage 3: Simulate
    eprintln!(
        "Running backtest: {} bars, {} to {}, policy {}",
        bars.len(),
        bars.first().map(|b| b.timestamp.to_string()).unwrap_or_default(),
        bars.last().map(|b| b.timestamp.to_string()).unwrap_or_default(),
        strategy.policy.kind(),
    );
    let result = simulate(&bars, &indicators, strategy);

    // Stage 4: Console output
    print!("{}", format_trade_table(&result.trades));
    eprintln!();
    eprint!("{}", format_summary(&TradeSummary::compute(&result.trades)));
    if let (
        Position::Open {
            side,
            entry_price,
            entry_time,
        },
        Some(last),
    ) = (result.open_position, bars.last())
    {
        eprintln!(
            "Open position at end of data: {side} from {entry_time} at {entry_price:.5}, \
             {:+.1} pips unrealized (not counted)",
            result.open_position.unrealized_pips(last.close)
        );
    }

    // Stage 5: Trade log
    report_port.write(&result.trades, output_path)?;
    eprintln!("\nTrade log written to: {}", output_path.display());

    Ok(result)
}

fn run_indicators(
    input: &InputArgs,
    overrides: &StrategyArgs,
    output: Option<&Path>,
    log_level: Option<&str>,
) -> ExitCode {
    let result = prepare(input, overrides, log_level).and_then(|(config, strategy)| {
        let data_path = resolve_data_path(input.data.as_deref(), &config)?;
        let csv_layout = resolve_csv_layout(input.layout, &config)?;
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INDICATOR_OUTPUT));

        run_indicator_pipeline(&CsvAdapter::new(data_path, csv_layout), &strategy, &output)
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

/// Compute indicators and signals and write them per bar. Returns the signals.
pub fn run_indicator_pipeline(
    data_port: &dyn DataPort,
    strategy: &StrategyConfig,
    output_path: &Path,
) -> Result<Vec<Signal>, FxcrossError> {
    let _span = info_span!("indicators", source = %data_port.source()).entered();

    let bars = data_port.fetch_bars()?;
    warn_if_short(bars.len(), &strategy.indicators);
    let indicators = IndicatorSet::compute(&closes(&bars), &strategy.indicators);
    let signals = derive_signals(&indicators, &strategy.levels);

    csv_report_adapter::write_indicators(&bars, &indicators, &signals, output_path)?;

    let fired = signals.iter().filter(|s| **s != Signal::None).count();
    eprintln!(
        "{} bars, {} signals; indicators written to: {}",
        bars.len(),
        fired,
        output_path.display()
    );
    Ok(signals)
}

fn warn_if_short(bar_count: usize, params: &IndicatorParams) {
    if bar_count <= params.rsi_period {
        warn!(
            bars = bar_count,
            rsi_period = params.rsi_period,
            "not enough bars for RSI, no signal can fire"
        );
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let result = load_config(Some(config_path)).and_then(|config| {
        let strategy = build_strategy_config(&config, &StrategyArgs::default())?;
        validate_strategy_config(&strategy)?;
        resolve_csv_layout(None, &config)?;
        resolve_report_layout(None, &config, strategy.policy.kind())?;
        Ok(strategy)
    });

    match result {
        Ok(strategy) => {
            eprintln!(
                "  EMA {}/{}, RSI {}",
                strategy.indicators.ema_short_period,
                strategy.indicators.ema_long_period,
                strategy.indicators.rsi_period
            );
            match strategy.policy {
                ExitPolicy::Reversal => eprintln!(
                    "  policy reversal, buy level {}, sell level {}",
                    strategy.levels.buy_level, strategy.levels.sell_level
                ),
                ExitPolicy::RsiExit { exit_level } => eprintln!(
                    "  policy rsi_exit, entry below {}, exit above {}",
                    strategy.levels.sell_level, exit_level
                ),
            }
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
