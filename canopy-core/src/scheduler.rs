//! Re-render Scheduler
//!
//! State updates never re-render synchronously. A setter call enqueues a
//! [`Task`] naming the component instance that owns the state; the task comes
//! due `delay` after it was enqueued, where `delay` is the process-wide
//! option from [`crate::options`] unless the scheduler carries an override.
//!
//! # Algorithm
//!
//! The queue is plain FIFO. Because every task is stamped with
//! `now + delay` at enqueue time, tasks come due in insertion order as long
//! as the delay does not shrink between enqueues; [`Scheduler::pop_due`]
//! nevertheless scans for the first due task so a shrinking delay cannot
//! starve anything.
//!
//! # Clocks
//!
//! Time comes from an injectable [`Clock`]. Production code uses
//! [`SystemClock`]; tests use [`ManualClock`] and advance it explicitly, so
//! "wait for the debounce window" is a deterministic call rather than a
//! sleep.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::hooks::InstanceId;
use crate::options;

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

/// A pending re-render of one component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub instance: InstanceId,
    pub due: Instant,
}

struct Inner {
    clock: Rc<dyn Clock>,
    delay: Cell<Option<Duration>>,
    queue: RefCell<VecDeque<Task>>,
}

/// Shared handle to the deferred re-render queue.
///
/// Cloning is cheap; every component instance of a renderer holds a clone.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<Inner>,
}

impl Scheduler {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(Inner {
                clock,
                delay: Cell::new(None),
                queue: RefCell::new(VecDeque::new()),
            }),
        }
    }

    pub fn now(&self) -> Instant {
        self.inner.clock.now()
    }

    /// The effective debounce window.
    pub fn delay(&self) -> Duration {
        self.inner
            .delay
            .get()
            .unwrap_or_else(|| options::current().delay())
    }

    /// Pin the delay for this scheduler (`None` follows the global option).
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.inner.delay.set(delay);
    }

    /// Queue a re-render of `instance`.
    pub fn enqueue(&self, instance: InstanceId) -> Task {
        let task = Task {
            instance,
            due: self.now() + self.delay(),
        };
        self.inner.queue.borrow_mut().push_back(task);
        tracing::debug!(instance = ?instance, "re-render scheduled");
        task
    }

    /// Remove and return the first task due at or before `deadline`, or the
    /// first task at all when there is no deadline.
    pub fn pop_due(&self, deadline: Option<Instant>) -> Option<Task> {
        let mut queue = self.inner.queue.borrow_mut();
        let index = match deadline {
            None => (!queue.is_empty()).then_some(0)?,
            Some(deadline) => queue.iter().position(|task| task.due <= deadline)?,
        };
        queue.remove(index)
    }

    /// Earliest due instant among queued tasks.
    pub fn next_due(&self) -> Option<Instant> {
        self.inner.queue.borrow().iter().map(|task| task.due).min()
    }

    pub fn len(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.borrow().is_empty()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Rc::new(SystemClock))
    }
}
