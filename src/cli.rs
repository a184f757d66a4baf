use crate::config::LogConfig;
use crate::config_loader::load_config;
use crate::consumer::ConsumeStats;
use crate::log_reader::LogReader;
use crate::log_runtime::{open_session, LogRuntime};
use crate::pretty_printer::PrettyPrinter;
use crate::severity::{Severity, COLOR_RESET};
use crate::{log_d, log_event, log_i, log_w};
use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Top-level CLI interface for spud
#[derive(Parser, Debug)]
#[command(
    name = "spud",
    version,
    about = "Headless host for the spudlog binary + console logging pipeline"
)]
pub struct Cli {
    /// Increase console verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run worker threads that log while the main loop drains on an idle cadence
    Run {
        /// Number of producer threads
        #[arg(long, default_value_t = 2)]
        threads: usize,
        /// Events logged by each producer
        #[arg(long, default_value_t = 100)]
        events: usize,
        /// Idle drain interval, overriding the configuration
        #[arg(long)]
        idle_ms: Option<u64>,
    },

    /// Decode a binary log file and print it
    Dump {
        file: PathBuf,
        /// Hide events below this severity
        #[arg(long)]
        min_severity: Option<Severity>,
        /// One JSON object per line instead of formatted text
        #[arg(long)]
        json: bool,
        #[arg(long)]
        no_color: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

pub fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?.with_verbosity(cli.verbose);

    match cli.command {
        Commands::Run {
            threads,
            events,
            idle_ms,
        } => {
            let idle = Duration::from_millis(idle_ms.unwrap_or(config.idle_interval_ms));
            let totals = run_host(&config, threads, events, idle)?;
            println!(
                "{} events ({} bytes) written to {}",
                totals.events,
                totals.bytes,
                config.log_file.display()
            );
        }
        Commands::Dump {
            file,
            min_severity,
            json,
            no_color,
        } => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            dump_log(
                &file,
                &config,
                min_severity.unwrap_or(Severity::Trace),
                json,
                config.color && !no_color,
                &mut out,
            )?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Produce from `threads` workers and drain on every idle tick until they
/// finish, then perform the final drain.
pub fn run_host(
    config: &LogConfig,
    threads: usize,
    events: usize,
    idle: Duration,
) -> anyhow::Result<ConsumeStats> {
    let session = open_session(config);
    let mut runtime = LogRuntime::new(&session, config)?;
    let main = session.writer("main");

    log_i!(main, "app", "Starting spud v{}", env!("CARGO_PKG_VERSION"));
    log_d!(main, "app", "{} {}", std::env::consts::OS, std::env::consts::ARCH);

    let mut handles = Vec::with_capacity(threads);
    for index in 0..threads {
        let session = session.clone();
        let handle = thread::Builder::new()
            .name(format!("worker-{index}"))
            .spawn(move || {
                let writer = session.thread_writer();
                for item in 0..events {
                    let severity = Severity::ALL[item % Severity::ALL.len()];
                    log_event!(writer, severity, "worker", "work item {} of {}", item + 1, events);
                }
            })
            .with_context(|| format!("failed to spawn worker-{index}"))?;
        handles.push(handle);
    }

    let mut totals = ConsumeStats::default();
    while !handles.iter().all(|handle| handle.is_finished()) {
        accumulate(&mut totals, runtime.process());
        thread::sleep(idle);
    }

    for handle in handles {
        if handle.join().is_err() {
            log_w!(main, "app", "a worker thread panicked");
        }
    }

    log_i!(main, "app", "Exiting");
    drop(main);

    accumulate(&mut totals, runtime.shutdown());
    Ok(totals)
}

fn accumulate(totals: &mut ConsumeStats, stats: ConsumeStats) {
    totals.events += stats.events;
    totals.bytes += stats.bytes;
}

/// Print every event of a binary log at or above `min_severity`
pub fn dump_log<W: Write>(
    path: &Path,
    config: &LogConfig,
    min_severity: Severity,
    json: bool,
    color: bool,
    out: &mut W,
) -> anyhow::Result<usize> {
    let reader = LogReader::open(path)?;
    let printer: PrettyPrinter = config.printer()?;
    let mut printed = 0;

    for decoded in reader {
        let event = match decoded {
            Ok(event) => event,
            Err(e) if e.is_decode_error() => {
                tracing::warn!("{}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(anyhow!(e)),
        };

        if !event.severity().passes(min_severity) {
            continue;
        }

        if json {
            serde_json::to_writer(&mut *out, &event)?;
            writeln!(out)?;
        } else if color {
            write!(
                out,
                "{}{}{}",
                event.severity().color(),
                printer.render(&event),
                COLOR_RESET
            )?;
        } else {
            write!(out, "{}", printer.render(&event))?;
        }
        printed += 1;
    }

    out.flush()?;
    Ok(printed)
}
