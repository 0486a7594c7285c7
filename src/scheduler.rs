//! Timer scheduling for the scan engine
//!
//! The engine never sleeps. It asks a [`Scheduler`] for one-shot timers and
//! gets them back as [`TimerKind`] tokens when they come due. Interval
//! behaviour (auto-scan, hold progress, repeat-advance) is built by re-arming
//! from the handler.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Milliseconds on the engine's monotonic clock
pub type Millis = u64;

/// What a scheduled timer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Single-switch auto-scan advance
    AutoScan,
    /// Hold reached the short zone
    HoldShort,
    /// Hold reached the long zone
    HoldLong,
    /// Hold progress polling tick
    HoldProgress,
    /// Two-switch repeat-advance tick while switch 1 is held
    RepeatAdvance,
}

/// Opaque handle used to cancel a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Scheduling capability injected into the engine
pub trait Scheduler {
    /// Current time on the scheduler clock
    fn now(&self) -> Millis;

    /// Move the clock forward without firing anything
    fn advance_to(&mut self, now: Millis);

    /// Schedule `kind` to fire `delay_ms` from now
    fn schedule(&mut self, delay_ms: Millis, kind: TimerKind) -> TimerHandle;

    /// Cancel a pending timer. Cancelling a fired or unknown handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle);

    /// Deadline of the earliest pending timer
    fn next_deadline(&self) -> Option<Millis>;

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline
    fn pop_due(&mut self, until: Millis) -> Option<(TimerHandle, TimerKind)>;
}

/// Deterministic deadline-ordered timer queue
///
/// Timers with the same deadline fire in scheduling order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Millis,
    next_id: u64,
    pending: BTreeMap<(Millis, u64), TimerKind>,
    deadlines: HashMap<u64, Millis>,
}

impl TimerQueue {
    /// Create an empty queue with its clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers still pending
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether a timer of this kind is pending
    pub fn has_pending(&self, kind: TimerKind) -> bool {
        self.pending.values().any(|k| *k == kind)
    }
}

impl Scheduler for TimerQueue {
    fn now(&self) -> Millis {
        self.now
    }

    fn advance_to(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    fn schedule(&mut self, delay_ms: Millis, kind: TimerKind) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = self.now.saturating_add(delay_ms);
        self.pending.insert((deadline, id), kind);
        self.deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(deadline) = self.deadlines.remove(&handle.0) {
            self.pending.remove(&(deadline, handle.0));
        }
    }

    fn next_deadline(&self) -> Option<Millis> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    fn pop_due(&mut self, until: Millis) -> Option<(TimerHandle, TimerKind)> {
        let (&(deadline, id), _) = self.pending.iter().next()?;
        if deadline > until {
            return None;
        }
        let kind = self.pending.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.now = self.now.max(deadline);
        Some((TimerHandle(id), kind))
    }
}

/// Monotonic wall clock mapped onto scheduler milliseconds
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    /// Start a clock at zero
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the clock started
    pub fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }

    /// Wall-clock instant of a scheduler deadline
    pub fn instant_at(&self, at: Millis) -> Instant {
        self.origin + Duration::from_millis(at)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(200, TimerKind::HoldLong);
        queue.schedule(100, TimerKind::HoldShort);

        assert_eq!(queue.pop_due(50), None);
        assert_eq!(queue.pop_due(500).map(|(_, k)| k), Some(TimerKind::HoldShort));
        assert_eq!(queue.now(), 100);
        assert_eq!(queue.pop_due(500).map(|(_, k)| k), Some(TimerKind::HoldLong));
        assert_eq!(queue.now(), 200);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_same_deadline_fires_in_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(100, TimerKind::HoldShort);
        queue.schedule(100, TimerKind::HoldProgress);

        assert_eq!(queue.pop_due(100).map(|(_, k)| k), Some(TimerKind::HoldShort));
        assert_eq!(queue.pop_due(100).map(|(_, k)| k), Some(TimerKind::HoldProgress));
    }

    #[test]
    fn test_cancel_removes_timer() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(100, TimerKind::AutoScan);
        queue.cancel(handle);
        queue.cancel(handle);

        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
        assert_eq!(queue.pop_due(1_000), None);
    }

    #[test]
    fn test_rearm_from_deadline_keeps_cadence() {
        let mut queue = TimerQueue::new();
        queue.schedule(100, TimerKind::RepeatAdvance);

        let mut fired = Vec::new();
        while let Some((_, kind)) = queue.pop_due(350) {
            fired.push(queue.now());
            queue.schedule(100, kind);
        }

        assert_eq!(fired, vec![100, 200, 300]);
        assert_eq!(queue.next_deadline(), Some(400));
    }

    #[test]
    fn test_advance_never_moves_backwards() {
        let mut queue = TimerQueue::new();
        queue.advance_to(500);
        queue.advance_to(100);
        assert_eq!(queue.now(), 500);
    }
}
