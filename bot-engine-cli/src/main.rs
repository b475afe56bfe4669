//! Bot Engine CLI Application
//!
//! Runs lesson bots locally against a captured inputs payload, the same way
//! the platform would invoke them:
//! - Runtime subscription filtering (runtime.json)
//! - One invocation of the bot's entry point
//! - Delayed timer callbacks, fired no earlier than requested

use anyhow::{bail, Context, Result};
use bot_engine::Bot;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod report;
mod runner;

/// Bot Engine - run home-automation lesson bots locally
#[derive(Parser, Debug)]
#[command(name = "botctl")]
#[command(about = "Run home-automation lesson bots against captured inputs", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a lesson against an inputs JSON file, then fire its timers
    Run {
        /// Path to the inputs JSON file
        #[arg(short, long, value_name = "FILE")]
        inputs: PathBuf,

        /// Lesson to run (see `botctl lessons`)
        #[arg(short, long, value_name = "NAME")]
        lesson: Option<String>,

        /// runtime.json replacing the lesson's built-in subscriptions
        #[arg(short, long, value_name = "FILE")]
        runtime: Option<PathBuf>,

        /// Wait in real time for timers instead of skipping ahead
        #[arg(long, overrides_with = "no_realtime")]
        realtime: bool,

        /// Skip ahead to each timer, even if the config file sets realtime
        #[arg(long, overrides_with = "realtime")]
        no_realtime: bool,

        /// Path to configuration file (botctl.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// List available lessons
    Lessons,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::debug!("Bot Engine CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using bot engine library v{}", bot_engine::VERSION);

    match args.command {
        Command::Lessons => list_lessons(),
        Command::Run {
            inputs,
            lesson,
            runtime,
            realtime,
            no_realtime,
            config,
        } => {
            let file = match &config {
                Some(path) => config::load_config(path)?,
                None => config::AppConfig::default(),
            };
            let realtime = if realtime {
                Some(true)
            } else if no_realtime {
                Some(false)
            } else {
                None
            };
            let settings = resolve(lesson, runtime, realtime, file)?;

            run_mode(
                &inputs,
                &settings.lesson,
                settings.runtime.as_deref(),
                settings.realtime,
            )
        }
    }
}

/// Options for one `run`, flags merged over botctl.toml
#[derive(Debug, PartialEq, Eq)]
struct RunSettings {
    lesson: String,
    runtime: Option<PathBuf>,
    realtime: bool,
}

/// Merge command-line values over the config file; a flag always wins
fn resolve(
    lesson: Option<String>,
    runtime: Option<PathBuf>,
    realtime: Option<bool>,
    file: config::AppConfig,
) -> Result<RunSettings> {
    let lesson = lesson
        .or(file.run.lesson)
        .context("No lesson given (use --lesson or set [run] lesson in the config file)")?;

    Ok(RunSettings {
        lesson,
        runtime: runtime.or(file.run.runtime),
        realtime: realtime.unwrap_or(file.run.realtime),
    })
}

fn list_lessons() -> Result<()> {
    for bot in bot_engine::lessons::all() {
        println!("{:<20} {}", bot.name(), bot.description());
    }
    Ok(())
}

/// Run mode - parse inputs, execute the lesson, drive its timers
fn run_mode(
    inputs: &std::path::Path,
    lesson: &str,
    runtime: Option<&std::path::Path>,
    realtime: bool,
) -> Result<()> {
    use bot_engine::LocalHost;

    let Some(bot) = bot_engine::lessons::find(lesson) else {
        bail!("Unknown lesson '{}' (run `botctl lessons` for the list)", lesson);
    };

    let execution = bot_engine::load_inputs(inputs)
        .with_context(|| format!("Failed to load inputs: {:?}", inputs))?;

    let mut host = match runtime {
        Some(path) => {
            let config = bot_engine::load_runtime(path)
                .with_context(|| format!("Failed to load runtime configuration: {:?}", path))?;
            LocalHost::with_runtime(bot, config)
        }
        None => LocalHost::new(bot),
    };

    let when = chrono::DateTime::from_timestamp_millis(execution.time)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| execution.time.to_string());
    log::info!(
        "Running '{}' on {} trigger at {}",
        bot.name(),
        execution.trigger_type,
        when
    );

    let clock = if realtime {
        runner::Clock::Realtime
    } else {
        runner::Clock::Virtual
    };
    let summary = runner::run(&mut host, &execution, clock)
        .with_context(|| format!("Bot '{}' failed", bot.name()))?;

    if !summary.executed {
        log::info!("Event filtered out by the runtime subscriptions; bot not invoked");
        return Ok(());
    }

    log::info!("Done: {} timer(s) fired", summary.timers_fired);
    if summary.timer_failures > 0 {
        bail!("{} timer callback(s) failed", summary.timer_failures);
    }

    Ok(())
}

/// Initialize logging based on verbosity level
///
/// `RUST_LOG` is applied on top, e.g. `RUST_LOG=bot=warn` hides bot chatter
/// while keeping host output.
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_run_command() {
        let args = Args::parse_from([
            "botctl", "-v", "run", "--inputs", "door.json", "--lesson", "measurements",
        ]);
        assert_eq!(args.verbose, 1);
        match args.command {
            Command::Run { inputs, lesson, realtime, .. } => {
                assert_eq!(inputs, PathBuf::from("door.json"));
                assert_eq!(lesson.as_deref(), Some("measurements"));
                assert!(!realtime);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_realtime_flags_last_one_wins() {
        let args = Args::parse_from([
            "botctl", "run", "-i", "door.json", "--realtime", "--no-realtime",
        ]);
        match args.command {
            Command::Run { realtime, no_realtime, .. } => {
                assert!(!realtime);
                assert!(no_realtime);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn file_config(lesson: &str, runtime: &str, realtime: bool) -> config::AppConfig {
        config::AppConfig {
            run: config::RunConfig {
                lesson: Some(lesson.to_string()),
                runtime: Some(PathBuf::from(runtime)),
                realtime,
            },
        }
    }

    #[test]
    fn test_resolve_flags_override_file() {
        let file = file_config("measurements", "file-runtime.json", true);
        let settings = resolve(
            Some("combining-triggers".to_string()),
            Some(PathBuf::from("flag-runtime.json")),
            Some(false),
            file,
        )
        .unwrap();

        assert_eq!(
            settings,
            RunSettings {
                lesson: "combining-triggers".to_string(),
                runtime: Some(PathBuf::from("flag-runtime.json")),
                realtime: false,
            }
        );
    }

    #[test]
    fn test_resolve_falls_back_to_file() {
        let file = file_config("measurements", "file-runtime.json", true);
        let settings = resolve(None, None, None, file).unwrap();

        assert_eq!(settings.lesson, "measurements");
        assert_eq!(settings.runtime, Some(PathBuf::from("file-runtime.json")));
        assert!(settings.realtime);
    }

    #[test]
    fn test_resolve_without_lesson() {
        let err = resolve(None, None, Some(true), config::AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No lesson given"));
    }

    #[test]
    fn test_unknown_lesson() {
        let err = run_mode(std::path::Path::new("unused.json"), "lesson-42", None, false).unwrap_err();
        assert!(err.to_string().contains("Unknown lesson"));
    }
}
