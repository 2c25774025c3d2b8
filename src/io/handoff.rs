use crate::error::SendError;
use crate::io::base::Cursor;
use crate::utils::WaitHandle;
use crossbeam::channel as cbchan;
use crossbeam::select;

/// Zero-capacity rendezvous channel. A send completes only when the
/// receiver takes the value, so nothing is ever buffered ahead of the reader.
pub struct Handoff;

impl Handoff {
    #[inline]
    pub fn channel<T: Send>() -> (HandoffSender<T>, HandoffReceiver<T>) {
        let (tx, rx) = cbchan::bounded::<T>(0);
        (HandoffSender { tx }, HandoffReceiver { rx, cur: None })
    }
}

/// Sending half. Dropping the last sender closes the channel.
pub struct HandoffSender<T> {
    tx: cbchan::Sender<T>,
}

impl<T> HandoffSender<T> {
    /// Blocks until the receiver takes `value` or `stop` is set, whichever
    /// happens first.
    pub fn send(&self, value: T, stop: &WaitHandle) -> Result<(), SendError<T>> {
        if stop.is_set() {
            return Err(SendError::cancelled(Some(value)));
        }

        select! {
            recv(stop.receiver()) -> _ => Err(SendError::cancelled(None)),
            send(self.tx, value) -> res => res.map_err(|e| SendError::closed(Some(e.into_inner()))),
        }
    }

    /// Hands the value over only if a receiver is already waiting.
    pub fn try_send(&self, value: T) -> Result<(), SendError<T>> {
        match self.tx.try_send(value) {
            Ok(()) => Ok(()),
            Err(cbchan::TrySendError::Full(v)) => Err(SendError::full(Some(v))),
            Err(cbchan::TrySendError::Disconnected(v)) => Err(SendError::closed(Some(v))),
        }
    }
}

/// Receiving half; also a [`Cursor`] over the handed-off values.
pub struct HandoffReceiver<T> {
    rx: cbchan::Receiver<T>,
    cur: Option<T>,
}

impl<T> HandoffReceiver<T> {
    /// Blocks for the next value. `None` once every sender is gone.
    #[inline]
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    #[inline]
    pub(crate) fn set_current(&mut self, value: Option<T>) -> bool {
        self.cur = value;
        self.cur.is_some()
    }

    #[inline]
    pub(crate) fn current(&self) -> Option<&T> {
        self.cur.as_ref()
    }
}

impl<T> Cursor for HandoffReceiver<T> {
    type Item = T;

    fn next(&mut self) -> bool {
        let value = self.recv();
        self.set_current(value)
    }

    fn value(&self) -> &Self::Item {
        match self.cur.as_ref() {
            Some(v) => v,
            None => panic!("HandoffReceiver::value called without a current item"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SendFailReason;
    use crate::utils::Event;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn handoff_is_unbuffered() {
        let (tx, rx) = Handoff::channel::<u32>();
        // No reader is waiting, so a non-blocking send cannot complete.
        assert!(tx.try_send(1).is_err());

        let reader = thread::spawn(move || {
            let mut rx = rx;
            let mut seen = Vec::new();
            while rx.next() {
                seen.push(*rx.value());
            }
            seen
        });

        let stop = Event::new();
        for i in 0..5 {
            tx.send(i, &stop.wait()).expect("reader alive");
        }
        drop(tx);

        assert_eq!(reader.join().expect("reader panicked"), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn stop_unblocks_pending_send() {
        let (tx, _rx) = Handoff::channel::<u32>();
        let stop = Event::new();
        let handle = stop.wait();

        let sender = thread::spawn(move || tx.send(9, &handle));
        thread::sleep(Duration::from_millis(20));
        stop.set();

        let err = sender
            .join()
            .expect("sender panicked")
            .expect_err("send must be cancelled");
        assert_eq!(err.reason, SendFailReason::Cancelled);
    }

    #[test]
    fn send_after_stop_keeps_value() {
        let (tx, _rx) = Handoff::channel::<&str>();
        let stop = Event::new();
        stop.set();
        let err = tx.send("kept", &stop.wait()).expect_err("stopped");
        assert_eq!(err.into_value(), Some("kept"));
    }

    #[test]
    fn dropped_receiver_closes() {
        let (tx, rx) = Handoff::channel::<u8>();
        drop(rx);
        let stop = Event::new();
        let err = tx.send(1, &stop.wait()).expect_err("closed");
        assert_eq!(err.reason, SendFailReason::Closed);
    }
}
