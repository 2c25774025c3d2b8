use crossbeam::channel::{self as cbchan, Receiver, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;

/// Gate channel state. The channel never carries a message: dropping the
/// sender disconnects every receiver, which is the broadcast.
#[derive(Default)]
struct Gate {
    signaled: bool,
    tx: Option<Sender<()>>,
    rx: Option<Receiver<()>>,
}

/// One-shot broadcast event.
///
/// Once [`set`](Event::set) it stays set. Any number of threads can block on a
/// [`WaitHandle`]; handles obtained after the event was set resolve immediately.
/// The gate channel is only allocated when somebody waits.
#[derive(Default)]
pub struct Event {
    gate: Mutex<Gate>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle resolving once the event is set.
    pub fn wait(&self) -> WaitHandle {
        let mut gate = self.gate.lock();
        if let Some(rx) = gate.rx.as_ref() {
            return WaitHandle { rx: rx.clone() };
        }

        let (tx, rx) = cbchan::bounded::<()>(0);
        if gate.signaled {
            drop(tx);
        } else {
            gate.tx = Some(tx);
        }
        gate.rx = Some(rx.clone());
        WaitHandle { rx }
    }

    /// Marks the event as set and wakes all waiters. Repeated calls are no-ops.
    /// Returns true only for the call that actually set it.
    pub fn set(&self) -> bool {
        let mut gate = self.gate.lock();
        if gate.signaled {
            return false;
        }
        gate.signaled = true;
        gate.tx.take();
        true
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.gate.lock().signaled
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("is_set", &self.is_set())
            .finish()
    }
}

/// Waiter side of an [`Event`]. Cheap to clone.
#[derive(Clone)]
pub struct WaitHandle {
    rx: Receiver<()>,
}

impl WaitHandle {
    /// Blocks until the event is set.
    pub fn wait(&self) {
        // Nothing is ever sent, so this only returns on disconnect.
        let _ = self.rx.recv();
    }

    /// Blocks until the event is set or `timeout` elapses.
    /// Returns true if the event was set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.rx.recv_timeout(timeout),
            Err(cbchan::RecvTimeoutError::Disconnected)
        )
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        matches!(self.rx.try_recv(), Err(cbchan::TryRecvError::Disconnected))
    }

    /// Raw receiver for use in `crossbeam::select!`. It becomes ready
    /// (with a disconnect error) once the event is set.
    #[inline]
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

impl fmt::Debug for WaitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitHandle")
            .field("is_set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn wait_after_set_resolves_immediately() {
        let ev = Event::new();
        ev.set();
        let handle = ev.wait();
        assert!(handle.is_set());
        assert!(handle.wait_timeout(Duration::ZERO));
    }

    #[test]
    fn set_is_idempotent() {
        let ev = Event::new();
        let handle = ev.wait();
        assert!(!handle.is_set());
        assert!(ev.set());
        assert!(!ev.set());
        assert!(ev.is_set());
        assert!(handle.is_set());
        assert!(ev.wait().is_set());
    }

    #[test]
    fn unset_event_times_out() {
        let ev = Event::new();
        assert!(!ev.wait().wait_timeout(Duration::from_millis(20)));
        assert!(!ev.is_set());
    }

    #[test]
    fn wakes_every_waiter() {
        let ev = Arc::new(Event::new());
        let (done_tx, done_rx) = cbchan::unbounded();

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let ev = ev.clone();
                let done_tx = done_tx.clone();
                thread::spawn(move || {
                    ev.wait().wait();
                    done_tx.send(i).ok();
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        assert!(done_rx.try_recv().is_err());

        ev.set();
        for w in workers {
            w.join().expect("waiter panicked");
        }
        assert_eq!(done_rx.try_iter().count(), 8);
    }
}
