//! Line-oriented switch listener
//!
//! Reads switch edges from a text stream (stdin in the daemon), one command
//! per line:
//!
//! ```text
//! down space | up space | repeat space
//! pause | resume | start | stop | forget
//! ```
//!
//! Runs on a dedicated thread and forwards events to the engine. Edges are
//! timestamped on arrival with the shared engine [`Clock`].

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::scheduler::{Clock, Millis};

use super::keys::{KeyMap, SwitchEdge};

/// Events sent from the listener to the scan engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchEvent {
    /// A raw switch edge
    Edge(SwitchEdge),
    /// Suspend (false) or resume (true) input, e.g. around an overlay
    InputEnabled(bool),
    /// Start auto-scan
    Start,
    /// Stop auto-scan
    Stop,
    /// Forget the learned session log
    ClearSessionLog,
}

/// Errors that can occur in the switch listener
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("switch listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),
}

/// Parse one command line into an event
///
/// Returns `None` for blank lines, unknown commands and unmapped keys.
pub fn parse_line(line: &str, keys: &KeyMap, now: Millis) -> Option<SwitchEvent> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();

    let edge = |build: fn(super::keys::SwitchId, Millis) -> SwitchEdge, key: Option<&str>| {
        let key = key?;
        match keys.lookup(key) {
            Some(switch) => Some(SwitchEvent::Edge(build(switch, now))),
            None => {
                debug!(key, "key not mapped to a switch");
                None
            }
        }
    };

    match command.as_str() {
        "down" => edge(SwitchEdge::down, words.next()),
        "up" => edge(SwitchEdge::up, words.next()),
        "repeat" => edge(SwitchEdge::repeat, words.next()),
        "pause" => Some(SwitchEvent::InputEnabled(false)),
        "resume" => Some(SwitchEvent::InputEnabled(true)),
        "start" => Some(SwitchEvent::Start),
        "stop" => Some(SwitchEvent::Stop),
        "forget" => Some(SwitchEvent::ClearSessionLog),
        other => {
            debug!(command = other, "unknown listener command");
            None
        }
    }
}

/// Listener that turns input lines into switch events
pub struct SwitchListener {
    event_tx: mpsc::Sender<SwitchEvent>,
    keys: KeyMap,
    clock: Clock,
    running: Arc<AtomicBool>,
}

impl SwitchListener {
    /// Create a new switch listener
    pub fn new(event_tx: mpsc::Sender<SwitchEvent>, keys: KeyMap, clock: Clock) -> Self {
        Self {
            event_tx,
            keys,
            clock,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start reading stdin on a dedicated thread
    pub fn start(&self) -> Result<(), ListenerError> {
        self.start_with(std::io::BufReader::new(std::io::stdin()))
    }

    /// Start reading `input` on a dedicated thread
    ///
    /// The thread runs until the input ends, the engine side of the channel
    /// is dropped, or `stop()` is called.
    pub fn start_with<R>(&self, input: R) -> Result<(), ListenerError>
    where
        R: BufRead + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ListenerError::AlreadyRunning);
        }

        let event_tx = self.event_tx.clone();
        let running = Arc::clone(&self.running);
        let keys = self.keys.clone();
        let clock = self.clock;

        thread::Builder::new()
            .name("switch-listener".to_string())
            .spawn(move || {
                info!("switch listener thread started");
                read_loop(input, &keys, clock, &event_tx, &running);
                running.store(false, Ordering::SeqCst);
                info!("switch listener thread stopped");
            })
            .map_err(|e| ListenerError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    /// Stop the listener after the next line
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn read_loop<R: BufRead>(
    input: R,
    keys: &KeyMap,
    clock: Clock,
    event_tx: &mpsc::Sender<SwitchEvent>,
    running: &AtomicBool,
) {
    for line in input.lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(?e, "failed to read switch input");
                break;
            }
        };

        let Some(event) = parse_line(&line, keys, clock.now_ms()) else {
            continue;
        };

        // not in an async context, block until the engine has room
        if event_tx.blocking_send(event).is_err() {
            warn!("failed to send switch event - channel closed?");
            break;
        }
    }
}
