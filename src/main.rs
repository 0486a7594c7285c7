//! switch-scan-daemon: scanning keyboard driven by one or two switches
//!
//! This daemon wires the scan engine to its runtime collaborators:
//! - Switch edges read line by line from stdin
//! - Settings and the session log in a JSON file store
//! - Speech through an external text-to-speech command
//!
//! Scan events are logged; a renderer can subscribe to the same channel.
//!
//! The language model is a plug-in behind `Predictor` and is not bundled
//! here, so the daemon runs with `NullPredictor` and builds candidates
//! without predictions. Swap in a real predictor in `Collaborators`.

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use switch_scan::alphabet::BuiltinAlphabet;
use switch_scan::config::Config;
use switch_scan::events::ScanEvent;
use switch_scan::lifecycle::ShutdownSignal;
use switch_scan::prediction::NullPredictor;
use switch_scan::scan::{Collaborators, ScanEngine};
use switch_scan::scheduler::{Clock, TimerQueue};
use switch_scan::settings::ScanSettings;
use switch_scan::speech::CommandSpeech;
use switch_scan::store::FileStore;
use switch_scan::switch::{KeyMap, SwitchListener};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "switch-scan-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.store_path, speech = %config.speech_command, "configuration loaded");

    let store = FileStore::open(&config.store_path);
    let settings = ScanSettings::load(&store);
    info!(mode = ?settings.mode, language = %settings.language, "settings loaded");

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Listener -> engine
    let (switch_tx, switch_rx) = mpsc::channel(32);
    // Engine -> subscribers
    let (event_tx, mut event_rx) = broadcast::channel::<ScanEvent>(256);

    let clock = Clock::new();
    let keys = KeyMap::new(&settings.switch1_key, &settings.switch2_key);

    let collaborators = Collaborators {
        predictor: Box::new(NullPredictor),
        speech: Box::new(CommandSpeech::new(config.speech_command.clone())),
        store: Box::new(store),
        alphabet: Box::new(BuiltinAlphabet),
    };
    let mut engine = ScanEngine::new(settings, collaborators, TimerQueue::new(), event_tx);
    info!(voices = engine.voices().len(), "speech backend ready");

    // Start the switch listener (runs on dedicated thread)
    let listener = SwitchListener::new(switch_tx, keys, clock);
    match listener.start() {
        Ok(()) => {
            info!("switch listener started");
        }
        Err(e) => {
            error!(?e, "failed to start switch listener");
            warn!("continuing without switch input");
        }
    }

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the engine (processes switch events and timers)
        _ = engine.run(switch_rx, clock) => {
            info!("scan engine exited");
        }

        // Log scan events
        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(ScanEvent::HoldProgress { .. }) => {}
                    Ok(event) => {
                        info!(%event, "scan event");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "scan event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("scan event logger exited");
        }

        // Wait for shutdown signal
        result = shutdown.wait() => {
            match result {
                Ok(reason) => info!(%reason, "shutdown signal received"),
                Err(e) => {
                    listener.stop();
                    return Err(e.into());
                }
            }
        }
    }

    // Cleanup
    info!("shutting down...");

    listener.stop();
    engine.shutdown();

    info!("switch-scan-daemon stopped");

    Ok(())
}
