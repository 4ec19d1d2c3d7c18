use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use shift_scheduler::config::ScheduleConfig;
use shift_scheduler::display::{availability_names, write_report, write_schedule_table, write_workers};
use shift_scheduler::export::{export_schedule_csv, export_worker_loads_csv};
use shift_scheduler::parser::load_roster;
use shift_scheduler::schedule::{Roster, RunResult, Scheduler};
use shift_scheduler::sweep::{sweep, SweepOptions, SweepOutcome};
use shift_scheduler::web;

#[derive(Parser, Debug)]
#[command(name = "shift-scheduler")]
#[command(version)]
#[command(about = "Builds a weekly shift schedule from per-worker availability files")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Schedule one seed, or sweep seeds and print the best schedule
    Run(RunArgs),

    /// Sweep seeds, then serve the best schedule over HTTP
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Directory with one availability file per worker
    dir: PathBuf,

    /// Schedule configuration (JSON); built-in defaults otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lower requirements that cannot be met instead of failing
    #[arg(long)]
    accept_shortfalls: bool,
}

#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Run only this seed
    #[arg(long, conflicts_with_all = ["start_seed", "max_seeds", "jobs"])]
    seed: Option<u64>,

    /// First seed of the sweep
    #[arg(long, default_value = "1")]
    start_seed: u64,

    /// Stop after this many seeds (runs until Ctrl-C otherwise)
    #[arg(long)]
    max_seeds: Option<u64>,

    /// Worker threads for the sweep
    #[arg(long, default_value = "1")]
    jobs: usize,

    /// Write `day,shift,worker` rows to this file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write per-worker load rows to this file
    #[arg(long)]
    loads_csv: Option<PathBuf>,

    /// Print the result as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Print everyone available for each shift before scheduling
    #[arg(long)]
    show_availability: bool,

    /// Print the roster before scheduling
    #[arg(long)]
    show_workers: bool,

    /// With --show-workers, list every availability slot too
    #[arg(long, requires = "show_workers")]
    show_worker_slots: bool,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Port for the HTTP server
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Seeds to sweep before serving
    #[arg(long, default_value = "1000")]
    seeds: u64,

    /// First seed of the sweep
    #[arg(long, default_value = "1")]
    start_seed: u64,

    /// Worker threads for the sweep
    #[arg(long, default_value = "1")]
    jobs: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Commands::Run(args) => run(args).await,
        Commands::Serve(args) => serve(args).await,
    }
}

fn load(input: &InputArgs) -> Result<(Roster, ScheduleConfig), Box<dyn std::error::Error>> {
    let config = match &input.config {
        Some(path) => ScheduleConfig::load(path)?,
        None => ScheduleConfig::default(),
    };
    let (roster, _) = load_roster(&input.dir, &config, input.accept_shortfalls)?;
    Ok((roster, config))
}

/// Runs the sweep on the blocking pool; Ctrl-C stops it after the current runs.
async fn sweep_in_background(
    roster: Roster,
    config: ScheduleConfig,
    options: SweepOptions,
) -> Result<(Roster, ScheduleConfig, SweepOutcome), Box<dyn std::error::Error>> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, finishing the seeds in progress");
            flag.store(true, Ordering::Relaxed);
        }
    });

    let (roster, config, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = sweep(&roster, &config, &options, &stop);
        (roster, config, outcome)
    })
    .await?;
    Ok((roster, config, outcome?))
}

async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (roster, config) = load(&args.input)?;

    {
        let mut stdout = io::stdout().lock();
        if args.show_workers {
            write_workers(&mut stdout, &roster, args.show_worker_slots)?;
            writeln!(stdout)?;
        }
        if args.show_availability {
            write_schedule_table(&mut stdout, roster.calendar(), &availability_names(&roster), &config.printing)?;
            writeln!(stdout)?;
        }
    }

    let (roster, config, result, summary) = match args.seed {
        Some(seed) => {
            let started = Instant::now();
            let result = Scheduler::new(&roster, &config.policy).run(seed)?;
            tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, seed, "single run");
            (roster, config, result, None)
        }
        None => {
            if args.max_seeds.is_none() {
                tracing::info!("sweeping seeds, press Ctrl-C to stop and print the best result");
            }
            let options = SweepOptions {
                start_seed: args.start_seed,
                max_seeds: args.max_seeds,
                jobs: args.jobs,
            };
            let (roster, config, mut outcome) = sweep_in_background(roster, config, options).await?;
            let Some(best) = outcome.best.take() else {
                println!("No seeds were run.");
                return Ok(());
            };
            (roster, config, best, Some(outcome))
        }
    };

    print_result(&roster, &config, &result, args.json)?;
    if let Some(outcome) = summary {
        println!();
        println!("Seeds checked: {}", outcome.seeds_checked);
        println!("Time taken (s): {:.3}", outcome.elapsed.as_secs_f64());
        println!("Iterations per second: {:.1}", outcome.runs_per_second());
    }

    if let Some(path) = &args.csv {
        export_schedule_csv(&result, path)?;
        tracing::info!(path = %path.display(), "wrote schedule CSV");
    }
    if let Some(path) = &args.loads_csv {
        export_worker_loads_csv(&result, path)?;
        tracing::info!(path = %path.display(), "wrote worker loads CSV");
    }
    Ok(())
}

fn print_result(
    roster: &Roster,
    config: &ScheduleConfig,
    result: &RunResult,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, result)?;
        writeln!(stdout)?;
        return Ok(());
    }
    writeln!(stdout, "Schedule generated {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(stdout)?;
    write_report(&mut stdout, roster.calendar(), result, &config.printing)?;
    Ok(())
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (roster, config) = load(&args.input)?;
    let options = SweepOptions {
        start_seed: args.start_seed,
        max_seeds: Some(args.seeds),
        jobs: args.jobs,
    };
    let (roster, config, outcome) = sweep_in_background(roster, config, options).await?;

    println!("Starting web server on port {}...", args.port);
    println!("Access the site at http://localhost:{}", args.port);
    let state = web::AppState::new(roster, config, outcome.best);
    web::start_server(state, args.port).await?;
    Ok(())
}
