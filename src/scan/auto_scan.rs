//! Auto-scan timer
//!
//! Owns at most one pending [`TimerKind::AutoScan`]. Every re-arm cancels
//! the previous timer and computes the delay from the current index: the
//! first item waits `firstItemDelayMs`, every other item `scanSpeedMs`.

use tracing::debug;

use crate::scheduler::{Millis, Scheduler, TimerHandle, TimerKind};
use crate::settings::{ScanMode, ScanSettings};

use super::session::ScanSession;

/// Delay before leaving the item at `index`
pub fn delay_for(index: usize, settings: &ScanSettings) -> Millis {
    if index == 0 {
        settings.first_item_delay_ms
    } else {
        settings.scan_speed_ms
    }
}

#[derive(Debug, Default)]
pub struct AutoScanTimer {
    pending: Option<TimerHandle>,
}

impl AutoScanTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// True if `handle` is this timer's pending tick; consumes it
    pub fn take_if_owned(&mut self, handle: TimerHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Cancel any pending tick and schedule a fresh one if scanning should run
    pub fn rearm(
        &mut self,
        session: &ScanSession,
        settings: &ScanSettings,
        input_enabled: bool,
        scheduler: &mut dyn Scheduler,
    ) {
        self.cancel(scheduler);

        let should_run = session.mode() == ScanMode::OneSwitch
            && session.is_running()
            && input_enabled
            && !session.candidates().is_empty();
        if !should_run {
            return;
        }

        let delay = delay_for(session.index(), settings);
        self.pending = Some(scheduler.schedule(delay, TimerKind::AutoScan));
        debug!(index = session.index(), delay_ms = delay, "auto-scan armed");
    }

    pub fn cancel(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::session::CandidateItem;
    use crate::scheduler::TimerQueue;

    fn running_session() -> ScanSession {
        let mut session = ScanSession::new(
            ScanMode::OneSwitch,
            "ABC".chars().map(CandidateItem::Letter).collect(),
        );
        session.set_running(true);
        session
    }

    #[test]
    fn test_first_item_uses_first_delay() {
        let settings = ScanSettings::default();
        let mut queue = TimerQueue::new();
        let mut timer = AutoScanTimer::new();

        timer.rearm(&running_session(), &settings, true, &mut queue);
        assert_eq!(queue.next_deadline(), Some(settings.first_item_delay_ms));
    }

    #[test]
    fn test_later_items_use_scan_speed() {
        let settings = ScanSettings::default();
        let mut queue = TimerQueue::new();
        let mut timer = AutoScanTimer::new();
        let mut session = running_session();
        session.advance();

        timer.rearm(&session, &settings, true, &mut queue);
        assert_eq!(queue.next_deadline(), Some(settings.scan_speed_ms));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_rearm_replaces_pending_tick() {
        let settings = ScanSettings::default();
        let mut queue = TimerQueue::new();
        let mut timer = AutoScanTimer::new();
        let session = running_session();

        timer.rearm(&session, &settings, true, &mut queue);
        timer.rearm(&session, &settings, true, &mut queue);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_not_armed_when_stopped_or_disabled() {
        let settings = ScanSettings::default();
        let mut queue = TimerQueue::new();
        let mut timer = AutoScanTimer::new();

        let mut session = running_session();
        timer.rearm(&session, &settings, false, &mut queue);
        assert!(!timer.is_armed());

        session.set_running(false);
        timer.rearm(&session, &settings, true, &mut queue);
        assert!(!timer.is_armed());

        let mut two = running_session();
        two.set_mode(ScanMode::TwoSwitch);
        timer.rearm(&two, &settings, true, &mut queue);
        assert!(!timer.is_armed());
        assert!(queue.is_empty());
    }
}
