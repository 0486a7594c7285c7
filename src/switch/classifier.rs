//! Switch input classifier
//!
//! Turns raw switch edges into engine commands:
//! - debounces presses that follow a release too closely
//! - in single-switch mode with hold actions on, measures the hold and
//!   classifies the release as tap, short hold or long hold
//! - in two-switch mode, steps on switch 1 (repeating while held) and
//!   commits on switch 2
//!
//! Every timer a press creates is cancelled on the matching release, on
//! [`SwitchClassifier::reset`], and while input is suspended.

use tracing::debug;

use crate::events::HoldZone;
use crate::scheduler::{Millis, Scheduler, TimerHandle, TimerKind};
use crate::settings::{HoldAction, ScanMode, ScanSettings};

use super::keys::{Edge, SwitchEdge, SwitchId};

/// Hold progress polling interval
pub const HOLD_POLL_MS: Millis = 50;

/// What the engine should do in response to input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCommand {
    /// Plain switch-1 action in single-switch mode
    Tap,
    /// Step the highlight forward
    Advance,
    /// Commit the highlighted candidate
    Commit,
    /// A hold was released inside a zone
    Hold(HoldAction),
    /// A hold crossed into a zone
    ZoneEntered(HoldZone),
    /// Hold progress towards the long zone, 0..=100
    Progress(u8),
}

/// Whether switch 1 is currently being measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldPhase {
    #[default]
    Idle,
    Holding,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HoldTimers {
    short: Option<TimerHandle>,
    long: Option<TimerHandle>,
    progress: Option<TimerHandle>,
}

/// Measurement of one press-release cycle of switch 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldState {
    pub phase: HoldPhase,
    pub zone: Option<HoldZone>,
    pub start_time: Millis,
    pub progress_percent: u8,
    timers: HoldTimers,
}

impl HoldState {
    fn is_holding(&self) -> bool {
        self.phase == HoldPhase::Holding
    }
}

/// Debounce, hold and repeat classifier for the two logical switches
#[derive(Debug, Default)]
pub struct SwitchClassifier {
    /// Time of the last Up edge, per switch, bounced presses included
    last_up: [Option<Millis>; 2],
    /// Accepted press waiting for its release, per switch
    pressed: [bool; 2],
    hold: HoldState,
    repeat_timer: Option<TimerHandle>,
    suspended: bool,
}

impl SwitchClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current hold measurement
    pub fn hold_state(&self) -> &HoldState {
        &self.hold
    }

    /// Whether a press on `switch` is waiting for its release
    pub fn is_pressed(&self, switch: SwitchId) -> bool {
        self.pressed[switch.slot()]
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Classify one edge
    pub fn on_edge(
        &mut self,
        edge: SwitchEdge,
        settings: &ScanSettings,
        scheduler: &mut dyn Scheduler,
    ) -> Vec<SwitchCommand> {
        if self.suspended {
            debug!(?edge, "input suspended, edge ignored");
            return Vec::new();
        }

        match edge.edge {
            Edge::Down if edge.is_repeat => self.on_repeat(edge, settings, scheduler),
            Edge::Down => self.on_press(edge, settings, scheduler),
            Edge::Up => self.on_release(edge, settings, scheduler),
        }
    }

    fn on_press(
        &mut self,
        edge: SwitchEdge,
        settings: &ScanSettings,
        scheduler: &mut dyn Scheduler,
    ) -> Vec<SwitchCommand> {
        let slot = edge.switch.slot();

        if let Some(last_up) = self.last_up[slot] {
            let since_up = edge.timestamp.saturating_sub(last_up);
            if since_up < settings.debounce_time_ms {
                debug!(switch = ?edge.switch, since_up, "press debounced");
                return Vec::new();
            }
        }

        if self.pressed[slot] {
            debug!(switch = ?edge.switch, "press without release, ignored");
            return Vec::new();
        }
        self.pressed[slot] = true;

        match (settings.mode, edge.switch) {
            (ScanMode::OneSwitch, SwitchId::One) if settings.hold_classification() => {
                self.start_hold(edge.timestamp, settings, scheduler);
                Vec::new()
            }
            (ScanMode::OneSwitch, SwitchId::One) => vec![SwitchCommand::Tap],
            (ScanMode::OneSwitch, SwitchId::Two) => Vec::new(),
            (ScanMode::TwoSwitch, SwitchId::One) => vec![SwitchCommand::Advance],
            (ScanMode::TwoSwitch, SwitchId::Two) => vec![SwitchCommand::Commit],
        }
    }

    fn on_repeat(
        &mut self,
        edge: SwitchEdge,
        settings: &ScanSettings,
        scheduler: &mut dyn Scheduler,
    ) -> Vec<SwitchCommand> {
        let accepted = self.pressed[edge.switch.slot()];
        let steps = settings.mode == ScanMode::TwoSwitch && edge.switch == SwitchId::One;

        if accepted && steps && self.repeat_timer.is_none() {
            debug!(hold_speed_ms = settings.hold_speed_ms, "repeat-advance started");
            self.repeat_timer = Some(scheduler.schedule(settings.hold_speed_ms, TimerKind::RepeatAdvance));
        }
        Vec::new()
    }

    fn on_release(
        &mut self,
        edge: SwitchEdge,
        settings: &ScanSettings,
        scheduler: &mut dyn Scheduler,
    ) -> Vec<SwitchCommand> {
        let slot = edge.switch.slot();
        self.last_up[slot] = Some(edge.timestamp);
        if !self.pressed[slot] {
            return Vec::new();
        }
        self.pressed[slot] = false;

        if edge.switch != SwitchId::One {
            return Vec::new();
        }

        if let Some(handle) = self.repeat_timer.take() {
            scheduler.cancel(handle);
            debug!("repeat-advance stopped");
        }

        if !self.hold.is_holding() {
            return Vec::new();
        }

        let zone = self.hold.zone;
        self.clear_hold(scheduler);

        let command = match zone {
            Some(HoldZone::Long) => SwitchCommand::Hold(settings.long_hold_action),
            Some(HoldZone::Short) => SwitchCommand::Hold(settings.short_hold_action),
            None => SwitchCommand::Tap,
        };
        debug!(?zone, ?command, held_ms = edge.timestamp.saturating_sub(self.hold.start_time), "hold released");
        vec![command]
    }

    fn start_hold(&mut self, now: Millis, settings: &ScanSettings, scheduler: &mut dyn Scheduler) {
        self.hold = HoldState {
            phase: HoldPhase::Holding,
            zone: None,
            start_time: now,
            progress_percent: 0,
            timers: HoldTimers {
                short: Some(scheduler.schedule(settings.short_hold_duration_ms, TimerKind::HoldShort)),
                long: Some(scheduler.schedule(settings.long_hold_duration_ms, TimerKind::HoldLong)),
                progress: Some(scheduler.schedule(HOLD_POLL_MS, TimerKind::HoldProgress)),
            },
        };
        debug!(start = now, "hold started");
    }

    fn clear_hold(&mut self, scheduler: &mut dyn Scheduler) {
        let timers = self.hold.timers;
        for handle in [timers.short, timers.long, timers.progress].into_iter().flatten() {
            scheduler.cancel(handle);
        }
        self.hold = HoldState {
            start_time: self.hold.start_time,
            ..HoldState::default()
        };
    }

    /// Handle a fired timer that belongs to the classifier
    pub fn on_timer(
        &mut self,
        handle: TimerHandle,
        kind: TimerKind,
        settings: &ScanSettings,
        scheduler: &mut dyn Scheduler,
    ) -> Vec<SwitchCommand> {
        match kind {
            TimerKind::HoldShort if self.hold.timers.short == Some(handle) => {
                self.hold.timers.short = None;
                self.enter_zone(HoldZone::Short)
            }
            TimerKind::HoldLong if self.hold.timers.long == Some(handle) => {
                self.hold.timers.long = None;
                let mut commands = self.enter_zone(HoldZone::Long);
                if let Some(progress) = self.hold.timers.progress.take() {
                    scheduler.cancel(progress);
                }
                self.hold.progress_percent = 100;
                commands.push(SwitchCommand::Progress(100));
                commands
            }
            TimerKind::HoldProgress if self.hold.timers.progress == Some(handle) => {
                let elapsed = scheduler.now().saturating_sub(self.hold.start_time);
                let long = settings.long_hold_duration_ms.max(1);
                let percent = (elapsed.saturating_mul(100) / long).min(100) as u8;
                self.hold.progress_percent = percent;
                self.hold.timers.progress = Some(scheduler.schedule(HOLD_POLL_MS, TimerKind::HoldProgress));
                vec![SwitchCommand::Progress(percent)]
            }
            TimerKind::RepeatAdvance if self.repeat_timer == Some(handle) => {
                self.repeat_timer = Some(scheduler.schedule(settings.hold_speed_ms, TimerKind::RepeatAdvance));
                vec![SwitchCommand::Advance]
            }
            _ => Vec::new(),
        }
    }

    /// Move the hold zone forward; zones never go back within one hold
    fn enter_zone(&mut self, zone: HoldZone) -> Vec<SwitchCommand> {
        if !self.hold.is_holding() || self.hold.zone >= Some(zone) {
            return Vec::new();
        }

        let mut commands = Vec::with_capacity(2);
        if zone == HoldZone::Long && self.hold.zone.is_none() {
            self.hold.zone = Some(HoldZone::Short);
            commands.push(SwitchCommand::ZoneEntered(HoldZone::Short));
        }
        self.hold.zone = Some(zone);
        commands.push(SwitchCommand::ZoneEntered(zone));
        debug!(?zone, "hold zone entered");
        commands
    }

    /// Cancel every pending timer and drop in-flight press state
    pub fn reset(&mut self, scheduler: &mut dyn Scheduler) {
        self.clear_hold(scheduler);
        if let Some(handle) = self.repeat_timer.take() {
            scheduler.cancel(handle);
        }
        self.pressed = [false; 2];
    }

    /// Suspend or resume classification
    ///
    /// Suspending cancels every timer. Resuming starts clean: a release of a
    /// key pressed before the suspension is ignored.
    pub fn set_suspended(&mut self, suspended: bool, scheduler: &mut dyn Scheduler) {
        if suspended {
            self.reset(scheduler);
        }
        self.suspended = suspended;
    }
}
