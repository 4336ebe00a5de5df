//! Main-loop / timer collaborator: a handle passed into the server
//! constructor rather than a process-wide singleton, so tests can
//! inject a fake loop instead of relying on wall-clock time.

use std::time::{Duration, Instant};

/// Opaque handle returned by [`MainLoop::add_timeout`], used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutHandle(u64);

/// Timer service the core drives its periodic work through (the
/// heartbeat emitter is the only user).
pub trait MainLoop {
    /// Register a periodic callback firing every `interval_ms`.
    fn add_timeout(&mut self, interval_ms: u64, callback: Box<dyn FnMut()>) -> TimeoutHandle;

    /// Cancel a previously registered timeout. No-op if already cancelled.
    fn del_timeout(&mut self, handle: TimeoutHandle);

    /// How long until the earliest pending timeout is due, or `None` if
    /// none are registered. The server uses this as the read timeout on
    /// its blocking socket poll — the main loop is the only entity that
    /// may block.
    fn next_deadline(&self) -> Option<Duration>;

    /// Fire (and reschedule) every timeout whose deadline has passed.
    fn fire_due(&mut self);
}

struct Entry {
    handle: TimeoutHandle,
    interval: Duration,
    next_due: Instant,
    callback: Box<dyn FnMut()>,
}

/// Real-clock [`MainLoop`] implementation: an `Instant`-deadline list
/// polled cooperatively from the server's single thread.
#[derive(Default)]
pub struct StdMainLoop {
    entries: Vec<Entry>,
    next_handle: u64,
}

impl StdMainLoop {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MainLoop for StdMainLoop {
    fn add_timeout(&mut self, interval_ms: u64, callback: Box<dyn FnMut()>) -> TimeoutHandle {
        let handle = TimeoutHandle(self.next_handle);
        self.next_handle += 1;
        let interval = Duration::from_millis(interval_ms);
        self.entries.push(Entry {
            handle,
            interval,
            next_due: Instant::now() + interval,
            callback,
        });
        handle
    }

    fn del_timeout(&mut self, handle: TimeoutHandle) {
        self.entries.retain(|e| e.handle != handle);
    }

    fn next_deadline(&self) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .iter()
            .map(|e| e.next_due.saturating_duration_since(now))
            .min()
    }

    fn fire_due(&mut self) {
        let now = Instant::now();
        for entry in self.entries.iter_mut() {
            if entry.next_due <= now {
                (entry.callback)();
                entry.next_due = now + entry.interval;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::thread::sleep;

    #[test]
    fn fires_after_interval_elapses() {
        let mut ml = StdMainLoop::new();
        let count = Rc::new(RefCell::new(0));
        let count_clone = count.clone();
        ml.add_timeout(10, Box::new(move || *count_clone.borrow_mut() += 1));

        sleep(Duration::from_millis(20));
        ml.fire_due();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn del_timeout_stops_future_fires() {
        let mut ml = StdMainLoop::new();
        let count = Rc::new(RefCell::new(0));
        let count_clone = count.clone();
        let handle = ml.add_timeout(5, Box::new(move || *count_clone.borrow_mut() += 1));
        ml.del_timeout(handle);

        sleep(Duration::from_millis(15));
        ml.fire_due();
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn next_deadline_none_when_empty() {
        let ml = StdMainLoop::new();
        assert!(ml.next_deadline().is_none());
    }
}
