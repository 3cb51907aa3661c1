//! statlined - status-line resource sampler.
//!
//! Samples CPU, memory and load from /proc and prints a compact status line
//! on every tick. Reads control commands from stdin:
//!
//! ```text
//! start | stop | refresh | interval <secs> | show <cpu,memory,load|none> | tooltip | quit
//! ```

use std::io::Write;
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(target_os = "linux")]
use statline::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use statline::collector::mock::MockFs;
use statline::collector::{Collector, FileSystem};
use statline::config::SampleConfig;
use statline::models::{DisplaySelection, Metric};
use statline::presenter::{DisplaySink, ErrorSink, MetricPicker, StatusFrame};
use statline::SampleEngine;

/// Status-line resource sampler.
#[derive(Parser)]
#[command(name = "statlined", about = "Status-line CPU, memory and load sampler", version = statline::VERSION)]
struct Args {
    /// Sampling interval in seconds (fractions allowed).
    #[arg(short, long, default_value = "2", env = "STATLINE_INTERVAL")]
    interval: f64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc", env = "STATLINE_PROC_PATH")]
    proc_path: String,

    /// Metrics shown in the status line: any of cpu, memory, load, or "none".
    #[arg(
        long,
        default_value = "cpu,memory,load",
        env = "STATLINE_METRICS",
        value_delimiter = ','
    )]
    metrics: Vec<String>,

    /// Do not start the sampling timer.
    #[arg(long, env = "STATLINE_DISABLED")]
    disabled: bool,

    /// Take one sample, print it and exit.
    #[arg(long)]
    once: bool,

    /// Print each frame as a JSON line instead of the status text.
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
///
/// Logs go to stderr; stdout carries only status frames.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["statline", "statlined"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Parses a metric list such as `["cpu", "load"]`; `none` hides everything.
fn parse_selection(items: &[String]) -> Result<DisplaySelection, String> {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if items.len() == 1 && items[0].eq_ignore_ascii_case("none") {
        return Ok(DisplaySelection::none());
    }

    let metrics = items
        .iter()
        .map(|s| s.parse::<Metric>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DisplaySelection::from_metrics(&metrics))
}

/// A control command read from stdin.
#[derive(Debug, PartialEq)]
enum Command {
    Start,
    Stop,
    Refresh,
    Interval(f64),
    Show(DisplaySelection),
    Tooltip,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<String> = parts
        .flat_map(|p| p.split(','))
        .map(str::to_string)
        .collect();

    match name.to_ascii_lowercase().as_str() {
        "start" => Ok(Command::Start),
        "stop" => Ok(Command::Stop),
        "refresh" => Ok(Command::Refresh),
        "tooltip" => Ok(Command::Tooltip),
        "quit" | "exit" => Ok(Command::Quit),
        "interval" => {
            let value = rest
                .first()
                .ok_or_else(|| "usage: interval <secs>".to_string())?;
            value
                .parse::<f64>()
                .map(Command::Interval)
                .map_err(|e| format!("invalid interval '{}': {}", value, e))
        }
        "show" => {
            if rest.is_empty() {
                return Err("usage: show <cpu,memory,load|none>".to_string());
            }
            parse_selection(&rest).map(Command::Show)
        }
        other => Err(format!("unknown command '{}'", other)),
    }
}

/// Prints frames to stdout and remembers the latest tooltip.
struct TerminalSink {
    json: bool,
    tooltip: Mutex<Option<String>>,
}

impl TerminalSink {
    fn new(json: bool) -> Self {
        Self {
            json,
            tooltip: Mutex::new(None),
        }
    }

    fn tooltip(&self) -> Option<String> {
        self.tooltip
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DisplaySink for TerminalSink {
    fn show(&self, frame: &StatusFrame) {
        *self.tooltip.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(frame.tooltip.clone());

        let line = if self.json {
            match serde_json::to_string(frame) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "failed to serialize frame");
                    return;
                }
            }
        } else {
            frame.status.clone()
        };

        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }

    fn clear(&self) {
        *self.tooltip.lock().unwrap_or_else(PoisonError::into_inner) = None;
        if !self.json {
            let _ = writeln!(std::io::stdout().lock());
        }
    }
}

impl ErrorSink for TerminalSink {
    fn report(&self, message: &str) {
        eprintln!("statlined: failed to collect system metrics: {}", message);
    }
}

/// Picker answering with a selection typed on stdin.
struct TypedPicker(DisplaySelection);

impl MetricPicker for TypedPicker {
    fn pick(&self, _current: DisplaySelection) -> Option<Vec<Metric>> {
        Some(self.0.metrics())
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> ExitCode {
    let config = match SampleConfig::from_secs(args.interval) {
        Ok(config) => config.with_enabled(!args.disabled),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let selection = match parse_selection(&args.metrics) {
        Ok(selection) => selection,
        Err(e) => {
            error!("invalid --metrics: {}", e);
            return ExitCode::FAILURE;
        }
    };

    #[cfg(target_os = "linux")]
    let collector = Collector::new(RealFs::new(), &args.proc_path);
    #[cfg(not(target_os = "linux"))]
    let collector = Collector::new(MockFs::typical_system(), &args.proc_path);

    for path in collector.missing_sources() {
        warn!(path = %path.display(), "source file not found");
    }

    info!("statlined {} starting", statline::VERSION);
    info!(
        "Config: interval={}s, proc={}, metrics={:?}",
        args.interval,
        collector.proc_path().display(),
        selection.metrics()
    );

    let sink = Arc::new(TerminalSink::new(args.json));
    let engine = SampleEngine::new(collector, config, sink.clone(), sink.clone())
        .with_selection(selection);

    if args.once {
        return match engine.collect_and_update().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    }

    if !engine.start_if_enabled() {
        return ExitCode::SUCCESS;
    }
    // Show a first frame without waiting a full interval.
    let _ = engine.collect_and_update().await;

    run_commands(&engine, &sink).await;

    info!("Shutting down...");
    engine.stop();
    ExitCode::SUCCESS
}

/// Reads stdin commands until `quit`, EOF, or Ctrl-C.
async fn run_commands<F: FileSystem + 'static>(engine: &SampleEngine<F>, sink: &TerminalSink) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                return;
            }
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                error!(error = %e, "failed to read stdin");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Start) => engine.start(),
            Ok(Command::Stop) => engine.stop(),
            Ok(Command::Refresh) => {
                let _ = engine.collect_and_update().await;
            }
            Ok(Command::Interval(secs)) => {
                if let Err(e) = engine.update_interval(secs) {
                    eprintln!("statlined: {}", e);
                }
            }
            Ok(Command::Show(selection)) => {
                let _ = engine.configure_display(&TypedPicker(selection)).await;
            }
            Ok(Command::Tooltip) => match sink.tooltip() {
                Some(tooltip) => println!("{}", tooltip),
                None => println!("(no sample yet)"),
            },
            Ok(Command::Quit) => return,
            Err(e) => eprintln!("statlined: {}", e),
        }
    }
}
