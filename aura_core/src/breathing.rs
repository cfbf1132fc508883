//! Breathing exercise cycle controller.
//!
//! Two states, Idle and Cycling. Starting runs one inhale immediately and
//! arms a repeating timer; every cycle schedules the exhale half a period
//! later. Timers are requested from an injected [`Scheduler`], so the
//! controller never sleeps and tests can drive it with [`TimerQueue`].

use std::fmt;
use std::time::Duration;

/// Shortest cycle the controller runs; half of it must still be non-zero
pub const MIN_PERIOD: Duration = Duration::from_nanos(2);

/// Identifies a scheduled timer so it can be cancelled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Timer payloads delivered back to the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreathEvent {
    /// The repeating timer fired: start the next cycle
    Cycle,
    /// Half a period has passed since the cycle of run `epoch` began
    Exhale { epoch: u64 },
}

/// Timer service the controller schedules against
pub trait Scheduler {
    /// Fire `event` every `period`, first after one full period
    fn repeat(&mut self, period: Duration, event: BreathEvent) -> TimerHandle;
    /// Fire `event` once after `delay`
    fn once(&mut self, delay: Duration, event: BreathEvent) -> TimerHandle;
    /// Stop a timer; unknown handles are ignored
    fn cancel(&mut self, handle: TimerHandle);
}

// ============================================================================
// Virtual-time scheduler
// ============================================================================

#[derive(Debug)]
struct Timer {
    handle: TimerHandle,
    due: Duration,
    period: Option<Duration>,
    event: BreathEvent,
}

/// Deterministic scheduler over a virtual clock
///
/// Time only moves when [`TimerQueue::advance`] is called. Timers due at
/// the same instant fire in the order they were scheduled.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since the queue was created
    pub fn now(&self) -> Duration {
        self.now
    }

    /// When the earliest pending timer fires
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Number of live timers, repeating ones included
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock forward by `by`, handing every timer that comes due
    /// to `dispatch` at its own instant
    ///
    /// `dispatch` may schedule or cancel timers; new timers that fall due
    /// before the end of the step fire within the same call.
    pub fn advance<F>(&mut self, by: Duration, mut dispatch: F)
    where
        F: FnMut(&mut TimerQueue, BreathEvent),
    {
        let target = self.now + by;
        while let Some(event) = self.pop_due(target) {
            dispatch(self, event);
        }
        self.now = target;
    }

    fn pop_due(&mut self, until: Duration) -> Option<BreathEvent> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.handle))
            .map(|(idx, _)| idx)?;

        let timer = &mut self.timers[idx];
        self.now = timer.due;
        let event = timer.event;
        match timer.period {
            Some(period) => timer.due += period,
            None => {
                self.timers.remove(idx);
            }
        }
        Some(event)
    }

    fn push(&mut self, delay: Duration, period: Option<Duration>, event: BreathEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            due: self.now + delay,
            period,
            event,
        });
        handle
    }
}

impl Scheduler for TimerQueue {
    fn repeat(&mut self, period: Duration, event: BreathEvent) -> TimerHandle {
        self.push(period, Some(period), event)
    }

    fn once(&mut self, delay: Duration, event: BreathEvent) -> TimerHandle {
        self.push(delay, None, event)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|t| t.handle != handle);
    }
}

// ============================================================================
// Controller
// ============================================================================

/// What the breathing circle currently shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreathPhase {
    /// Stopped, waiting for the user to start
    Ready,
    Inhale,
    Exhale,
}

impl BreathPhase {
    /// Text shown inside the circle
    pub fn prompt(&self) -> &'static str {
        match self {
            BreathPhase::Ready => "Inhale",
            BreathPhase::Inhale => "Inhale...",
            BreathPhase::Exhale => "Exhale...",
        }
    }

    /// Whether the circle is drawn expanded
    pub fn expanded(&self) -> bool {
        matches!(self, BreathPhase::Inhale)
    }
}

impl fmt::Display for BreathPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prompt())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CycleState {
    Idle,
    Cycling { interval: TimerHandle },
}

/// Idle/Cycling state machine for the breathing exercise
#[derive(Debug)]
pub struct BreathingController {
    state: CycleState,
    phase: BreathPhase,
    period: Duration,
    /// Bumped on every start so exhales from an earlier run are ignored
    epoch: u64,
}

impl BreathingController {
    /// Periods shorter than [`MIN_PERIOD`] are raised to it
    pub fn new(period: Duration) -> Self {
        Self {
            state: CycleState::Idle,
            phase: BreathPhase::Ready,
            period: period.max(MIN_PERIOD),
            epoch: 0,
        }
    }

    pub fn is_cycling(&self) -> bool {
        matches!(self.state, CycleState::Cycling { .. })
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Label for the start/stop button
    pub fn button_label(&self) -> &'static str {
        if self.is_cycling() {
            "Stop"
        } else {
            "Start"
        }
    }

    /// Start cycling when idle, stop when cycling. Returns the new phase.
    pub fn toggle<S: Scheduler>(&mut self, scheduler: &mut S) -> BreathPhase {
        match self.state {
            CycleState::Cycling { interval } => {
                scheduler.cancel(interval);
                self.state = CycleState::Idle;
                self.phase = BreathPhase::Ready;
                tracing::debug!("Breathing stopped");
            }
            CycleState::Idle => {
                self.epoch += 1;
                let interval = scheduler.repeat(self.period, BreathEvent::Cycle);
                self.state = CycleState::Cycling { interval };
                self.begin_cycle(scheduler);
                tracing::debug!("Breathing started (period {:?})", self.period);
            }
        }
        self.phase
    }

    /// Apply a fired timer. Returns the new phase when it changed.
    pub fn handle<S: Scheduler>(&mut self, event: BreathEvent, scheduler: &mut S) -> Option<BreathPhase> {
        let before = self.phase;
        match event {
            BreathEvent::Cycle if self.is_cycling() => self.begin_cycle(scheduler),
            BreathEvent::Exhale { epoch } if self.is_cycling() && epoch == self.epoch => {
                self.phase = BreathPhase::Exhale;
            }
            stale => tracing::trace!("Ignoring stale breathing event {:?}", stale),
        }
        (self.phase != before).then_some(self.phase)
    }

    fn begin_cycle<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.phase = BreathPhase::Inhale;
        scheduler.once(self.period / 2, BreathEvent::Exhale { epoch: self.epoch });
    }
}
