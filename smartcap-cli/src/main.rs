// SmartCap command line host
// Replays recorded scenarios through the alert engine and manages configuration

mod scenario;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scenario::Scenario;
use smartcap_cns::{HapticController, HapticDriver, LogHapticDriver, WriterHapticDriver};
use smartcap_core::Alert;
use smartcap_engine::{AlertEngine, Pipeline, ProcessingStats, SmartCapConfig};
use smartcap_spk::{EngineKind, LogTtsEngine, NativeTtsEngine, TtsEngine, VoiceOutput};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smartcap")]
#[command(about = "SmartCap object tracking and alert engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines scenario through the alert engine
    Run {
        /// Scenario file, one frame per line
        #[arg(long, short)]
        scenario: PathBuf,

        /// Configuration file (JSON, TOML or YAML)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Pace frames by their timestamps and run the full frame pipeline
        #[arg(long)]
        realtime: bool,

        /// Write haptic commands to this device instead of the log
        #[arg(long)]
        haptic_device: Option<PathBuf>,
    },

    /// Validate a configuration file
    CheckConfig {
        path: PathBuf,
    },

    /// Print the default configuration as TOML
    Defaults,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scenario, config, realtime, haptic_device } => {
            let config = load_config(config.as_deref())?;
            init_logging(&config.log_level, cli.verbose);
            run_scenario(&scenario, config, realtime, haptic_device.as_deref()).await?;
        }
        Commands::CheckConfig { path } => {
            init_logging("warn", cli.verbose);
            let config = load_config(Some(path.as_path()))?;
            println!("{}: ok", path.display());
            if cli.verbose {
                println!("{}", config.to_toml()?);
            }
        }
        Commands::Defaults => {
            print!("{}", SmartCapConfig::default().to_toml()?);
        }
    }

    Ok(())
}

fn init_logging(level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `~/.config/smartcap/config.toml` on Linux, used when no `--config` is given
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("smartcap").join("config.toml"))
        .filter(|path| path.is_file())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SmartCapConfig> {
    let path = path.map(Path::to_path_buf).or_else(user_config_path);
    let mut config = match path {
        Some(path) => SmartCapConfig::from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SmartCapConfig::default(),
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
}

async fn run_scenario(
    path: &Path,
    config: SmartCapConfig,
    realtime: bool,
    haptic_device: Option<&Path>,
) -> anyhow::Result<()> {
    let scenario = Scenario::from_file(path)?;
    if scenario.is_empty() {
        warn!("Scenario {} has no frames", path.display());
        return Ok(());
    }
    info!("Replaying {} frames from {}", scenario.len(), path.display());

    let tts: Arc<dyn TtsEngine> = match config.speech.engine {
        EngineKind::Native => Arc::new(NativeTtsEngine::new()),
        EngineKind::Log => Arc::new(LogTtsEngine::new()),
    };
    let motor: Arc<dyn HapticDriver> = match haptic_device {
        Some(device) => {
            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .open(device)
                .await
                .with_context(|| format!("Failed to open haptic device {}", device.display()))?;
            Arc::new(WriterHapticDriver::new(file))
        }
        None => Arc::new(LogHapticDriver::new()),
    };

    let voice = VoiceOutput::spawn(tts, config.speech.clone())?;
    let haptic = HapticController::spawn(motor, config.haptic.clone())?;

    let engine = AlertEngine::builder()
        .config(config.clone())
        .detector(Arc::new(scenario.detector()))
        .text_recognizer(Arc::new(scenario.recognizer()))
        .voice(Arc::new(voice))
        .haptic(Arc::new(haptic))
        .build()?;

    let stats = if realtime {
        replay_pipeline(engine, &scenario, &config).await?
    } else {
        replay_direct(engine, &scenario).await?
    };

    info!(
        "Replay finished: {} frames, {} alerts ({} suppressed), {} dropped, {} failures, {:.2}ms avg",
        stats.frames_processed,
        stats.alerts_dispatched,
        stats.alerts_suppressed,
        stats.frames_dropped,
        stats.cycle_failures,
        stats.avg_latency_ms
    );
    Ok(())
}

/// Feed frames straight into the engine on the scenario's clock
async fn replay_direct(mut engine: AlertEngine, scenario: &Scenario) -> anyhow::Result<ProcessingStats> {
    let start = Instant::now();

    for frame in &scenario.frames {
        let input = frame.to_input();
        match engine
            .process_at(&input.frame, input.ranging_mm, start + frame.offset())
            .await
        {
            Ok(Some(alert)) => print_alert(&alert)?,
            Ok(None) => {}
            Err(e) => {
                warn!("Frame {} skipped: {}", frame.frame_id, e);
                engine.record_cycle_failure();
            }
        }
    }

    // let queued speech and vibration play out
    tokio::time::sleep(Duration::from_millis(200)).await;
    engine.shutdown().await;
    Ok(engine.stats())
}

/// Run the frame pipeline against the wall clock until the scenario ends or
/// Ctrl-C
async fn replay_pipeline(
    engine: AlertEngine,
    scenario: &Scenario,
    config: &SmartCapConfig,
) -> anyhow::Result<ProcessingStats> {
    let (alert_tx, mut alert_rx) = mpsc::channel::<Alert>(64);
    let pipeline = Arc::new(Pipeline::new(engine, config.pipeline.clone())?.with_alert_sink(alert_tx));

    let printer = tokio::spawn(async move {
        while let Some(alert) = alert_rx.recv().await {
            if let Err(e) = print_alert(&alert) {
                warn!("Failed to print alert: {}", e);
            }
        }
    });

    let interrupt = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, stopping pipeline");
                pipeline.stop();
            }
        })
    };

    let result = pipeline.run(scenario.source(true)).await;

    interrupt.abort();
    let _ = interrupt.await;
    drop(pipeline);
    printer.await.context("Alert printer failed")?;

    Ok(result?)
}

fn print_alert(alert: &Alert) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(alert)?);
    Ok(())
}
