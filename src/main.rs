// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dualsub::app_config::{Config, LogLevel};
use dualsub::language_utils;
use dualsub::display::TextDisplay;
use dualsub::playback::simulated::{SimulatedPlatform, SimulatedProgressBar, SimulatedVideo};
use dualsub::playback::{PlatformEvent, SubtitleData};
use dualsub::providers::ProviderProfile;
use dualsub::providers::mock::MockTranslator;
use dualsub::subtitle::vtt;
use dualsub::SubtitleController;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a WebVTT file and print its cues
    Parse {
        /// WebVTT file to parse
        #[arg(value_name = "VTT_FILE")]
        input: PathBuf,

        /// Print cues as JSON
        #[arg(long, conflicts_with = "vtt")]
        json: bool,

        /// Print a normalized WEBVTT document
        #[arg(long)]
        vtt: bool,
    },

    /// Replay playback of a subtitle track through the full pipeline
    Replay(ReplayArgs),

    /// Generate shell completions for dualsub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Original-language WebVTT file
    #[arg(value_name = "VTT_FILE")]
    input: PathBuf,

    /// Native target-language WebVTT file; enables dual-track mode
    #[arg(long, value_name = "VTT_FILE")]
    target: Option<PathBuf>,

    /// Playback start in seconds
    #[arg(long, default_value_t = 0.0)]
    from: f64,

    /// Playback end in seconds (defaults to the last cue's end)
    #[arg(long)]
    to: Option<f64>,

    /// Seconds between time updates
    #[arg(long, default_value_t = 0.25)]
    step: f64,

    /// Subtitle offset in seconds, overrides the config
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<f64>,

    /// Make every Nth simulated translation request fail
    #[arg(long, value_name = "N")]
    fail_every: Option<usize>,

    /// Track time through a simulated progress bar instead of the media clock
    #[arg(long)]
    progress_bar: bool,

    /// Target language, overrides the config
    #[arg(short, long)]
    target_language: Option<String>,
}

/// dualsub - dual-language subtitle synchronization and translation
#[derive(Parser, Debug)]
#[command(name = "dualsub")]
#[command(version)]
#[command(about = "Dual-language subtitle synchronization and translation core")]
#[command(long_about = "dualsub parses WebVTT subtitle tracks and replays them through the
synchronization and translation pipeline of a dual-subtitle overlay.

EXAMPLES:
    dualsub parse episode.vtt                       # List the cues of a track
    dualsub parse --json episode.vtt                # Same, as JSON
    dualsub replay episode.vtt -t fr                # Replay with simulated French translation
    dualsub replay episode.vtt --target es.vtt      # Replay two native tracks side by side
    dualsub replay episode.vtt --offset -1.5        # Shift subtitles 1.5 s earlier
    dualsub completions bash > dualsub.bash         # Generate bash completions

CONFIGURATION:
    Configuration is stored in dualsub.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "dualsub.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker and ANSI color for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "\x1B[1;31m"),
            Level::Warn => ("🚧", "\x1B[1;33m"),
            Level::Info => ("  ", "\x1B[1;32m"),
            Level::Debug => ("🔍", "\x1B[1;36m"),
            Level::Trace => ("📋", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (marker, color) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                color,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The level is adjusted once the config is known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    if let Some(level) = &cli.log_level {
        log::set_max_level(LogLevel::from(level.clone()).to_level_filter());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "dualsub", &mut std::io::stdout());
            Ok(())
        }
        Commands::Parse { input, json, vtt } => run_parse(&input, json, vtt),
        Commands::Replay(args) => {
            let config = load_config(&cli.config_path, cli.log_level.as_ref())?;
            run_replay(args, config).await
        }
    }
}

/// Load the config file, creating a default one when it does not exist
fn load_config(config_path: &str, cli_level: Option<&CliLogLevel>) -> Result<Config> {
    let config = if Path::new(config_path).exists() {
        Config::load(config_path)
            .with_context(|| format!("Failed to load config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    config.validate().context("Configuration validation failed")?;

    if cli_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }
    Ok(config)
}

fn read_track(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read subtitle file: {:?}", path))
}

fn run_parse(input: &Path, json: bool, as_vtt: bool) -> Result<()> {
    let cues = vtt::parse(&read_track(input)?);
    if cues.is_empty() {
        return Err(anyhow!("No cues found in {:?}", input));
    }

    let mut stdout = std::io::stdout().lock();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&cues)?)?;
    } else if as_vtt {
        write!(stdout, "{}", vtt::format_vtt(&cues))?;
    } else {
        for cue in &cues {
            writeln!(
                stdout,
                "{} --> {}  {}",
                vtt::format_timestamp(cue.start),
                vtt::format_timestamp(cue.end),
                cue.text
            )?;
        }
    }
    info!("{} cues", cues.len());
    Ok(())
}

async fn run_replay(args: ReplayArgs, mut config: Config) -> Result<()> {
    if args.step <= 0.0 || !args.step.is_finite() {
        return Err(anyhow!("--step must be a positive number of seconds"));
    }
    if let Some(offset) = args.offset {
        config.time_offset = offset;
    }
    if let Some(target_language) = &args.target_language {
        config.target_language = target_language.clone();
    }
    // Simulated requests answer instantly; pacing would only slow the replay down
    config.translation.request_delay_ms = Some(0);
    config.translation.continuation_delay_ms = 0;
    config.validate().context("Invalid replay settings")?;

    let vtt_text = read_track(&args.input)?;
    let target_vtt_text = args.target.as_deref().map(read_track).transpose()?;

    let last_end = vtt::parse(&vtt_text)
        .iter()
        .map(|cue| cue.end)
        .fold(0.0_f64, f64::max);
    let end = args.to.unwrap_or(last_end);

    let platform = Arc::new(SimulatedPlatform::new("replay", args.progress_bar));
    let video = Arc::new(SimulatedVideo::new(1, Some(end.max(args.step))));
    let video_id = args
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "replay".to_string());
    platform.set_video(Some(video.clone()));
    platform.set_video_id(Some(&video_id));
    let progress = Arc::new(SimulatedProgressBar::new(0.0, end.max(args.step)));
    if args.progress_bar {
        platform.install_progress_bar(progress.clone());
    }

    let profile = ProviderProfile::for_provider(config.translation.provider);
    let translator = match args.fail_every {
        Some(n) if n > 0 => MockTranslator::intermittent(n),
        _ => MockTranslator::working(),
    }
    .with_profile(profile);
    info!(
        "Replaying {:?} with simulated {} translation to {} ({})",
        args.input,
        config.translation.provider.display_name(),
        language_utils::get_language_name(&config.target_language)
            .unwrap_or_else(|| "unknown language".to_string()),
        config.target_language
    );

    let controller = SubtitleController::new(
        platform.clone(),
        Arc::new(translator.clone()),
        Arc::new(config.clone()),
        TextDisplay::new(std::io::stdout()),
    );
    let strategy = controller.attach().await?;
    info!("Time source: {:?}", strategy);

    let native = target_vtt_text.is_some();
    controller.handle_event(PlatformEvent::SubtitleDataFound(SubtitleData {
        vtt_text,
        target_vtt_text,
        video_id: video_id.clone(),
        source_language: config.original_language.clone(),
        target_language: config.target_language.clone(),
        use_native_target: native,
        url: Some(args.input.to_string_lossy().into_owned()),
    }))?;

    let mut time = args.from;
    while time <= end {
        video.set_time(time);
        controller.with_driver_mut(|display| display.set_time(time));

        // Let background translation settle before the frame is rendered
        controller.scheduler().request_run();
        controller.scheduler().wait_until_idle().await;

        let event = if args.progress_bar {
            progress.set(time, end.max(args.step));
            PlatformEvent::ProgressMutation
        } else {
            PlatformEvent::MediaTimeUpdate
        };
        controller.handle_event(event)?;
        time += args.step;
    }

    controller.scheduler().wait_until_idle().await;
    let stats = controller.scheduler().cache().stats();
    info!(
        "Replay finished: {} translation requests, {} cache hits",
        translator.request_count(),
        stats.hits
    );
    if translator.request_count() == 0 && !native {
        warn!("No translation requests were made");
    }
    Ok(())
}
