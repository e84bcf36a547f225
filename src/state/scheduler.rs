use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::Result;

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    ScrollSettle,
    ResizeRecompute,
    FocusHandoff,
}

pub const SCROLL_SETTLE_DELAY: Duration = Duration::from_millis(300);
pub const RESIZE_DEBOUNCE_DELAY: Duration = Duration::from_millis(100);

type TimerCallback = Box<dyn FnOnce() -> Result<()>>;

struct PendingTimer {
    seq: u64,
    kind: TimerKind,
    deadline: Instant,
    callback: TimerCallback,
}

/// Timers keyed by [`TimerKind`]. Nothing runs until the host calls
/// [`Scheduler::run_due`].
pub struct Scheduler {
    clock: Rc<dyn Clock>,
    pending: RefCell<Vec<PendingTimer>>,
    next_seq: Cell<u64>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<TimerKind> = self.pending.borrow().iter().map(|t| t.kind).collect();
        f.debug_struct("Scheduler").field("pending", &kinds).finish()
    }
}

impl Scheduler {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            pending: RefCell::new(Vec::new()),
            next_seq: Cell::new(0),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Arms `callback` to run after `delay`, superseding a pending timer of the same kind.
    pub fn schedule(
        &self,
        kind: TimerKind,
        delay: Duration,
        callback: impl FnOnce() -> Result<()> + 'static,
    ) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        let deadline = self.clock.now() + delay;

        let mut pending = self.pending.borrow_mut();
        pending.retain(|timer| timer.kind != kind);
        pending.push(PendingTimer {
            seq,
            kind,
            deadline,
            callback: Box::new(callback),
        });
    }

    pub fn cancel(&self, kind: TimerKind) -> bool {
        let mut pending = self.pending.borrow_mut();
        let before = pending.len();
        pending.retain(|timer| timer.kind != kind);
        pending.len() != before
    }

    pub fn cancel_all(&self) {
        self.pending.borrow_mut().clear();
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.borrow().iter().any(|timer| timer.kind == kind)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.borrow().iter().map(|timer| timer.deadline).min()
    }

    /// Runs every timer that is due, earliest first. Timers armed by these
    /// callbacks wait for the next call, even with a zero delay.
    pub fn run_due(&self) -> Result<usize> {
        let now = self.clock.now();
        let horizon = self.next_seq.get();
        let mut ran = 0;
        let mut first_error = None;

        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                let position = pending
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.seq < horizon && timer.deadline <= now)
                    .min_by_key(|(_, timer)| (timer.deadline, timer.seq))
                    .map(|(idx, _)| idx);
                position.map(|idx| pending.remove(idx))
            };
            let Some(timer) = next else {
                break;
            };

            ran += 1;
            if let Err(err) = (timer.callback)() {
                tracing::error!(kind = ?timer.kind, error = %err, "deferred callback failed");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(ran),
        }
    }
}
