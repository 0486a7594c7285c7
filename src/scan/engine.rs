//! Core scan engine
//!
//! One explicit value holding the session, message, classifier and timers.
//! Switch edges and fired timers are the only inputs; every transition runs
//! to completion before the next input is looked at.

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::alphabet::{apply_case, apply_case_str, scan_order, AlphabetProvider};
use crate::events::{AudioCue, HoldZone, ScanEvent};
use crate::prediction::{adjacency_map, PredictionError, Predictor, PredictorConfig};
use crate::scheduler::{Clock, Millis, Scheduler, TimerHandle, TimerKind, TimerQueue};
use crate::settings::{HoldAction, ScanMode, ScanSettings, SettingsError};
use crate::speech::{SpeechOutput, Voice};
use crate::store::{KeyValueStore, SessionLog};
use crate::switch::{HoldState, SwitchClassifier, SwitchCommand, SwitchEdge, SwitchEvent};

use super::auto_scan::AutoScanTimer;
use super::candidates::{build_candidates, CandidateInputs};
use super::commit::{commit, CommitContext};
use super::game::GameMode;
use super::session::{CandidateItem, ControlAction, ScanSession};

/// External collaborators the engine consumes
pub struct Collaborators {
    pub predictor: Box<dyn Predictor>,
    pub speech: Box<dyn SpeechOutput>,
    pub store: Box<dyn KeyValueStore>,
    pub alphabet: Box<dyn AlphabetProvider>,
}

/// Predictions fetched for one rebuild
#[derive(Debug, Default)]
struct Predicted {
    letters: Vec<char>,
    words: Vec<String>,
}

/// The scan engine
pub struct ScanEngine<S: Scheduler = TimerQueue> {
    settings: ScanSettings,
    session: ScanSession,
    message: String,
    /// Alphabet in scan order
    letters: Vec<char>,
    prediction_ready: bool,
    input_enabled: bool,
    classifier: SwitchClassifier,
    auto_scan: AutoScanTimer,
    game: GameMode,
    scheduler: S,
    predictor: Box<dyn Predictor>,
    speech: Box<dyn SpeechOutput>,
    store: Box<dyn KeyValueStore>,
    alphabet: Box<dyn AlphabetProvider>,
    /// Channel for emitting scan events
    event_tx: broadcast::Sender<ScanEvent>,
}

impl<S: Scheduler> ScanEngine<S> {
    /// Create the engine and build the initial candidate list
    pub fn new(
        settings: ScanSettings,
        collaborators: Collaborators,
        scheduler: S,
        event_tx: broadcast::Sender<ScanEvent>,
    ) -> Self {
        let Collaborators {
            predictor,
            speech,
            store,
            alphabet,
        } = collaborators;

        let mut engine = Self {
            session: ScanSession::new(settings.mode, Vec::new()),
            message: String::new(),
            letters: Vec::new(),
            prediction_ready: false,
            input_enabled: true,
            classifier: SwitchClassifier::new(),
            auto_scan: AutoScanTimer::new(),
            game: GameMode::new(&settings.game_phrases, settings.letter_case),
            settings,
            scheduler,
            predictor,
            speech,
            store,
            alphabet,
            event_tx,
        };

        engine.reload_letters();
        engine.train_predictor();
        engine.rebuild();

        info!(
            mode = ?engine.settings.mode,
            candidates = engine.session.candidates().len(),
            prediction_ready = engine.prediction_ready,
            "scan engine ready"
        );
        engine
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub fn prediction_ready(&self) -> bool {
        self.prediction_ready
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn hold_state(&self) -> &HoldState {
        self.classifier.hold_state()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Target phrase in game mode
    pub fn game_target(&self) -> Option<&str> {
        if self.settings.game_mode {
            self.game.target()
        } else {
            None
        }
    }

    /// When the engine next needs [`ScanEngine::tick`]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.scheduler.next_deadline()
    }

    /// Fire every timer due at or before `now`
    pub fn tick(&mut self, now: Millis) {
        while let Some((handle, kind)) = self.scheduler.pop_due(now) {
            self.on_timer(handle, kind);
        }
        self.scheduler.advance_to(now);
    }

    /// Process one switch edge at its timestamp
    pub fn handle_edge(&mut self, edge: SwitchEdge) {
        self.tick(edge.timestamp);
        let commands = self
            .classifier
            .on_edge(edge, &self.settings, &mut self.scheduler);
        self.apply_commands(commands);
    }

    /// Process one listener event at `now`
    pub fn handle_event(&mut self, event: SwitchEvent, now: Millis) {
        match event {
            SwitchEvent::Edge(edge) => self.handle_edge(edge),
            SwitchEvent::InputEnabled(enabled) => {
                self.tick(now);
                self.set_input_enabled(enabled);
            }
            SwitchEvent::Start => {
                self.tick(now);
                self.start();
            }
            SwitchEvent::Stop => {
                self.tick(now);
                self.stop();
            }
            SwitchEvent::ClearSessionLog => {
                self.tick(now);
                self.clear_session_log();
            }
        }
    }

    /// Start auto-scanning from the current index
    pub fn start(&mut self) {
        if self.session.is_running() {
            return;
        }
        self.session.set_running(true);
        info!(index = self.session.index(), "scan started");
        self.emit(ScanEvent::ScanStarted);
        self.rearm_auto_scan();
    }

    /// Stop auto-scanning; the index stays where it is
    pub fn stop(&mut self) {
        if !self.session.is_running() {
            return;
        }
        self.session.set_running(false);
        self.auto_scan.cancel(&mut self.scheduler);
        info!(index = self.session.index(), "scan stopped");
        self.emit(ScanEvent::ScanStopped);
    }

    /// Suspend or resume all input and timers, e.g. while an overlay is open
    pub fn set_input_enabled(&mut self, enabled: bool) {
        if self.input_enabled == enabled {
            return;
        }
        self.input_enabled = enabled;
        self.classifier.set_suspended(!enabled, &mut self.scheduler);
        if enabled {
            self.rearm_auto_scan();
        } else {
            self.auto_scan.cancel(&mut self.scheduler);
        }
        info!(enabled, "input enabled changed");
        self.emit(ScanEvent::InputEnabledChanged { enabled });
    }

    /// Replace the settings
    ///
    /// Persists them, drops in-flight press state when switch handling
    /// changed, refreshes letters and predictor hints, and rebuilds.
    pub fn apply_settings(&mut self, settings: ScanSettings) -> Result<(), SettingsError> {
        settings.validate()?;
        let old = std::mem::replace(&mut self.settings, settings);
        self.settings.save(&mut *self.store);

        let switch_handling_changed = old.mode != self.settings.mode
            || old.hold_actions_enabled != self.settings.hold_actions_enabled
            || old.short_hold_duration_ms != self.settings.short_hold_duration_ms
            || old.long_hold_duration_ms != self.settings.long_hold_duration_ms
            || old.hold_speed_ms != self.settings.hold_speed_ms;
        if switch_handling_changed {
            self.classifier.reset(&mut self.scheduler);
        }

        if old.mode != self.settings.mode {
            info!(from = ?old.mode, to = ?self.settings.mode, "scan mode changed");
            self.session.set_mode(self.settings.mode);
            self.session.set_running(false);
        }

        if old.language != self.settings.language
            || old.script != self.settings.script
            || old.letter_case != self.settings.letter_case
            || old.letter_order != self.settings.letter_order
        {
            self.reload_letters();
        }

        if old.game_phrases != self.settings.game_phrases || old.letter_case != self.settings.letter_case {
            self.game = GameMode::new(&self.settings.game_phrases, self.settings.letter_case);
        }

        if self.settings.enable_prediction && !self.prediction_ready {
            self.train_predictor();
        }

        self.rebuild();
        Ok(())
    }

    /// Voices the speech backend offers, for a voice picker
    pub fn voices(&self) -> Vec<Voice> {
        self.speech.voices()
    }

    /// Forget the learned session log and retrain on the empty corpus
    pub fn clear_session_log(&mut self) {
        if let Err(e) = SessionLog::clear(&mut *self.store) {
            warn!(?e, "failed to clear session log");
        }
        self.predictor.reset_context();
        self.train_predictor();
        info!(prediction_ready = self.prediction_ready, "session log cleared");
        self.rebuild();
    }

    /// Cancel every timer; the engine does nothing further until new input
    pub fn shutdown(&mut self) {
        self.classifier.reset(&mut self.scheduler);
        self.auto_scan.cancel(&mut self.scheduler);
        self.session.set_running(false);
        info!("scan engine shut down");
    }

    fn on_timer(&mut self, handle: TimerHandle, kind: TimerKind) {
        if kind == TimerKind::AutoScan {
            if self.auto_scan.take_if_owned(handle) {
                self.advance();
            }
            return;
        }

        let commands = self
            .classifier
            .on_timer(handle, kind, &self.settings, &mut self.scheduler);
        self.apply_commands(commands);
    }

    fn apply_commands(&mut self, commands: Vec<SwitchCommand>) {
        for command in commands {
            match command {
                SwitchCommand::Tap => self.tap(),
                SwitchCommand::Advance => self.advance(),
                SwitchCommand::Commit => self.commit_current(),
                SwitchCommand::Hold(action) => self.hold_action(action),
                SwitchCommand::ZoneEntered(zone) => {
                    let cue = match zone {
                        HoldZone::Short => AudioCue::ShortHold,
                        HoldZone::Long => AudioCue::LongHold,
                    };
                    self.emit(ScanEvent::HoldZoneEntered { zone });
                    self.emit(ScanEvent::AudioCue { cue });
                }
                SwitchCommand::Progress(percent) => self.emit(ScanEvent::HoldProgress { percent }),
            }
        }
    }

    /// Single-switch tap: start from the first item when idle, commit the
    /// highlight when running
    fn tap(&mut self) {
        if self.session.mode() != ScanMode::OneSwitch {
            return;
        }
        if self.session.is_running() {
            self.commit_current();
        } else {
            self.session.restart();
            self.start();
        }
    }

    fn advance(&mut self) {
        if let Some(index) = self.session.advance() {
            debug!(index, "index advanced");
            self.emit(ScanEvent::IndexAdvanced { index });
        }
        self.rearm_auto_scan();
    }

    fn hold_action(&mut self, action: HoldAction) {
        debug!(?action, "hold action");
        match action {
            HoldAction::None => {}
            HoldAction::Select => self.tap(),
            HoldAction::Advance => self.advance(),
            HoldAction::Restart => {
                self.session.restart();
                self.emit(ScanEvent::IndexAdvanced { index: 0 });
                self.rearm_auto_scan();
            }
            HoldAction::Stop => self.stop(),
            HoldAction::Undo => self.commit(CandidateItem::Action(ControlAction::Undo)),
            HoldAction::Clear => self.commit(CandidateItem::Action(ControlAction::Clear)),
            HoldAction::Speak => self.commit(CandidateItem::Action(ControlAction::Speak)),
        }
    }

    fn commit_current(&mut self) {
        match self.session.current().cloned() {
            Some(candidate) => self.commit(candidate),
            None => warn!("commit requested with no candidates"),
        }
    }

    /// Apply a candidate, then rebuild
    pub fn commit(&mut self, candidate: CandidateItem) {
        let outcome = commit(
            &candidate,
            &mut CommitContext {
                message: &mut self.message,
                predictor: &mut *self.predictor,
                speech: &mut *self.speech,
                store: &mut *self.store,
                voice_id: self.settings.voice_id.as_deref(),
            },
        );

        info!(candidate = %candidate, message = %self.message, "committed");
        self.emit(ScanEvent::Committed {
            candidate: candidate.label(),
            message: self.message.clone(),
        });
        if let Some(text) = outcome.spoken {
            self.emit(ScanEvent::SpeechRequested { text });
        }
        if let Some(message) = outcome.notice {
            self.emit(ScanEvent::Notice { message });
        }

        if self.settings.game_mode && self.game.is_complete(&self.message) {
            let phrase = self.game.target().unwrap_or_default().to_string();
            info!(%phrase, "game phrase completed");
            self.emit(ScanEvent::GamePhraseCompleted { phrase });
            self.message.clear();
            self.predictor.reset_context();
            self.game.advance();
        }

        self.rebuild();
    }

    /// Recompute candidates and reset the index in one step
    fn rebuild(&mut self) {
        let (predicted, ready) = self.fetch_predictions();
        let game_next = if self.settings.game_mode {
            self.game.next_expected_char(&self.message)
        } else {
            None
        };

        let candidates = build_candidates(&CandidateInputs {
            alphabet: &self.letters,
            message: &self.message,
            predicted_letters: &predicted.letters,
            predicted_words: &predicted.words,
            enable_prediction: self.settings.enable_prediction,
            prediction_ready: ready,
            show_word_prediction: self.settings.show_word_prediction,
            speak_after_predictions: self.settings.speak_after_predictions,
            game_mode: self.settings.game_mode,
            game_target_next_char: game_next,
        });

        self.session.replace_candidates(candidates);
        let count = self.session.candidates().len();
        debug!(count, "candidates rebuilt");
        self.emit(ScanEvent::CandidatesRebuilt { count });
        self.rearm_auto_scan();
    }

    /// Ask the predictor for this rebuild's predictions
    ///
    /// Any failure means this rebuild takes the non-prediction path.
    fn fetch_predictions(&mut self) -> (Predicted, bool) {
        if !(self.settings.enable_prediction && self.prediction_ready) {
            return (Predicted::default(), false);
        }

        match self.query_predictor() {
            Ok(predicted) => (predicted, true),
            Err(e) => {
                warn!(%e, "prediction failed, building without predictions");
                (Predicted::default(), false)
            }
        }
    }

    fn query_predictor(&mut self) -> Result<Predicted, PredictionError> {
        let case = self.settings.letter_case;

        let mut letters: Vec<char> = Vec::new();
        for prediction in self.predictor.predict_next_character(&self.message)? {
            let mut chars = prediction.text.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                continue;
            };
            let c = apply_case(c, case);
            if self.letters.contains(&c) && !letters.contains(&c) {
                letters.push(c);
            }
            if letters.len() >= self.settings.predicted_letter_count {
                break;
            }
        }

        let mut words = Vec::new();
        if self.settings.show_word_prediction {
            let split = self.message.rfind(' ').map(|i| i + 1).unwrap_or(0);
            let (preceding, partial) = self.message.split_at(split);
            words = self
                .predictor
                .predict_word_completion(partial, preceding)?
                .into_iter()
                .map(|p| apply_case_str(p.text.trim(), case))
                .filter(|w| !w.is_empty())
                .take(self.settings.predicted_word_count)
                .collect();
        }

        Ok(Predicted { letters, words })
    }

    fn rearm_auto_scan(&mut self) {
        self.auto_scan.rearm(
            &self.session,
            &self.settings,
            self.input_enabled,
            &mut self.scheduler,
        );
    }

    /// Load the alphabet in scan order and push adjacency hints
    fn reload_letters(&mut self) {
        let letters = self.alphabet.letters(
            &self.settings.language,
            self.settings.script.as_deref(),
            self.settings.letter_case,
        );
        self.letters = scan_order(letters, self.settings.letter_order, &self.settings.language);
        self.predictor.update_config(PredictorConfig {
            adjacency: Some(adjacency_map(&self.letters)),
            max_predictions: Some(self.settings.predicted_letter_count.max(self.settings.predicted_word_count)),
        });
        debug!(
            language = %self.settings.language,
            order = ?self.settings.letter_order,
            letters = self.letters.len(),
            "alphabet loaded"
        );
    }

    /// Train on the session log; prediction is ready only on success
    fn train_predictor(&mut self) {
        self.prediction_ready = false;
        if !self.settings.enable_prediction || !self.predictor.is_available() {
            return;
        }

        let corpus = SessionLog::contents(&*self.store);
        match self.predictor.train(&corpus) {
            Ok(()) => {
                self.prediction_ready = true;
                info!(corpus_chars = corpus.chars().count(), "predictor trained");
            }
            Err(e) => warn!(%e, "predictor training failed, prediction disabled"),
        }
    }

    /// Emit a scan event to subscribers
    fn emit(&self, event: ScanEvent) {
        debug!(%event, "emitting scan event");
        let _ = self.event_tx.send(event);
    }

    /// Run the engine on wall-clock time, processing listener events
    pub async fn run(&mut self, mut event_rx: mpsc::Receiver<SwitchEvent>, clock: Clock) {
        info!("scan engine started");

        loop {
            let deadline = self.next_deadline();
            let sleep = async {
                match deadline {
                    Some(at) => tokio::time::sleep_until(clock.instant_at(at).into()).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                event = event_rx.recv() => match event {
                    Some(event) => self.handle_event(event, clock.now_ms()),
                    None => break,
                },
                _ = sleep => self.tick(clock.now_ms()),
            }
        }

        self.shutdown();
        info!("scan engine stopped");
    }
}
