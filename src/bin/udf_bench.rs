use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use udf_bench::config::{BenchConfig, SelectionOverrides};
use udf_bench::engine::{CancelToken, EngineId};
use udf_bench::error::BenchError;
use udf_bench::orchestrator::{prepare_engines, Orchestrator};
use udf_bench::{report, stats, Catalog};

/// Exit status of a run interrupted with Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

#[derive(clap::Args, Debug, Default)]
struct Selection {
    /// Only benchmark these functions. Can be provided multiple times.
    #[arg(long = "udf", value_name = "NAME", action = ArgAction::Append)]
    udfs: Vec<String>,

    /// Only benchmark these categories. Can be provided multiple times.
    #[arg(long = "category", value_name = "CATEGORY", action = ArgAction::Append)]
    categories: Vec<String>,

    /// Only run these engines, regardless of `enabled` in the config.
    #[arg(long = "engine", visible_alias = "system", value_enum, action = ArgAction::Append)]
    engines: Vec<EngineId>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Benchmark the selected functions on every active engine.
    Run {
        #[command(flatten)]
        select: Selection,

        /// Engine the ratios are computed against.
        #[arg(long, value_enum)]
        primary: Option<EngineId>,

        /// JSON output path; the trial CSV is written beside it.
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Run engines concurrently, one sequential worker per engine.
        #[arg(long, default_value_t = false)]
        parallel_engines: bool,
    },

    /// Show the selected functions and which engines support them.
    List {
        #[command(flatten)]
        select: Selection,
    },

    /// Re-render the comparison table of a persisted run.
    Report {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        #[arg(long, value_enum)]
        primary: Option<EngineId>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "udf-bench", version)]
#[command(about = "SQL function latency benchmarks across DataFusion, DuckDB and ClickHouse")]
struct Args {
    /// Configuration file. Defaults to ./udf-bench.toml when present.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("udf_bench={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn overrides(select: Selection) -> SelectionOverrides {
    SelectionOverrides {
        udfs: select.udfs,
        categories: select.categories,
        engines: select.engines,
        ..Default::default()
    }
}

fn run(args: Args) -> Result<ExitCode, BenchError> {
    let config = BenchConfig::load_or_default(args.config.as_deref())?;

    match args.cmd {
        Command::Run {
            select,
            primary,
            output,
            parallel_engines,
        } => {
            let settings = config.settings(&SelectionOverrides {
                primary,
                output,
                parallel_engines,
                ..overrides(select)
            })?;

            let cancel = CancelToken::new();
            let handler_token = cancel.clone();
            ctrlc::set_handler(move || {
                warn!("received Ctrl-C, stopping the current query");
                handler_token.cancel();
            })?;

            let engines = prepare_engines(&settings, &cancel)?;
            let catalog = Catalog::builtin();
            let mut orchestrator = Orchestrator::new(&catalog, &settings, engines, cancel);
            let outcome = orchestrator.run(|aggregation| {
                println!();
                print!("{}", report::render(aggregation));
            })?;

            if let Some(persisted) = &outcome.persisted {
                info!("results saved to {}", persisted.json.display());
            }
            if outcome.record.meta.cancelled {
                return Ok(ExitCode::from(EXIT_CANCELLED));
            }
        }
        Command::List { select } => {
            let settings = config.settings(&overrides(select))?;
            let catalog = Catalog::builtin();
            let specs = catalog.lookup(&settings.filter)?;
            let engines: Vec<EngineId> = settings.engines.iter().map(|(id, _)| *id).collect();
            print!("{}", report::render_catalog(&specs, &engines));
        }
        Command::Report { input, primary } => {
            let record = report::load(&input)?;
            let aggregation = stats::aggregate(&record, primary.or(record.config.primary));
            if record.meta.cancelled {
                warn!("{} is a partial run (cancelled)", input.display());
            }
            print!("{}", report::render(&aggregation));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::from(2)
        }
    }
}
