use std::any::Any;
use std::{error::Error, fmt, io};

const ERR_MSG_HANDOFF_CLOSED: &str = "handoff receiver is gone";
const ERR_MSG_CANCELLED: &str = "handoff cancelled by stop request";
const ERR_MSG_STOPPED: &str = "generator stopped";
const ERR_MSG_NO_RECEIVER: &str = "no receiver is waiting";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SendFailReason {
    /// The stop event fired while the value was waiting to be taken.
    Cancelled,
    /// The receiving side was dropped.
    Closed,
    /// Non-blocking send found no receiver waiting.
    Full,
}

impl fmt::Display for SendFailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendFailReason::Cancelled => write!(f, "{ERR_MSG_CANCELLED}"),
            SendFailReason::Closed => write!(f, "{ERR_MSG_HANDOFF_CLOSED}"),
            SendFailReason::Full => write!(f, "{ERR_MSG_NO_RECEIVER}"),
        }
    }
}

/// Failed handoff. The value that could not be delivered is handed back.
#[derive(Debug)]
pub struct SendError<T> {
    pub value: Option<T>,
    pub reason: SendFailReason,
}

impl<T> SendError<T> {
    pub fn cancelled(value: Option<T>) -> Self {
        Self {
            value,
            reason: SendFailReason::Cancelled,
        }
    }

    pub fn closed(value: Option<T>) -> Self {
        Self {
            value,
            reason: SendFailReason::Closed,
        }
    }

    pub fn full(value: Option<T>) -> Self {
        Self {
            value,
            reason: SendFailReason::Full,
        }
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

impl<T> fmt::Display for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reason.fmt(f)
    }
}

impl<T: fmt::Debug> Error for SendError<T> {}

/// Errors crossing the generator bridge.
///
/// `Stopped` is control flow: it is what [`Yielder::send`](crate::generator::Yielder::send)
/// returns once a stop was requested, and the bridge swallows it when it comes
/// back out of the producer. The consumer never observes it.
#[derive(Debug)]
pub enum GeneratorError {
    Stopped,
    /// The producer returned an error.
    Producer(anyhow::Error),
    /// The producer panicked with the given message.
    Panicked(String),
    /// The producer thread could not be started.
    Spawn(io::Error),
}

impl GeneratorError {
    /// Whether this is the cooperative stop signal rather than a failure.
    pub fn is_stop(&self) -> bool {
        matches!(self, GeneratorError::Stopped)
    }

    /// Classifies an error returned by a producer function.
    pub(crate) fn from_producer(err: anyhow::Error) -> Self {
        match err.downcast::<GeneratorError>() {
            Ok(inner) => inner,
            Err(other) => GeneratorError::Producer(other),
        }
    }

    pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
        if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        }
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::Stopped => write!(f, "{ERR_MSG_STOPPED}"),
            GeneratorError::Producer(err) => write!(f, "producer failed: {err:#}"),
            GeneratorError::Panicked(msg) => write!(f, "producer panicked: {msg}"),
            GeneratorError::Spawn(err) => write!(f, "cannot spawn producer thread: {err}"),
        }
    }
}

impl Error for GeneratorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GeneratorError::Producer(err) => Some(err.as_ref()),
            GeneratorError::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

/// Any failed handoff from inside a producer means the consumer is gone
/// or asked to stop; either way the producer has to unwind.
impl<T> From<SendError<T>> for GeneratorError {
    fn from(_: SendError<T>) -> Self {
        GeneratorError::Stopped
    }
}

impl From<io::Error> for GeneratorError {
    fn from(err: io::Error) -> Self {
        GeneratorError::Spawn(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_signal_survives_anyhow_round_trip() {
        let err: anyhow::Error = GeneratorError::Stopped.into();
        assert!(GeneratorError::from_producer(err).is_stop());
    }

    #[test]
    fn foreign_errors_become_producer_failures() {
        let err = anyhow::anyhow!("disk on fire");
        match GeneratorError::from_producer(err) {
            GeneratorError::Producer(inner) => assert_eq!(inner.to_string(), "disk on fire"),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn send_error_hands_value_back() {
        let err = SendError::cancelled(Some(7_u32));
        assert_eq!(err.to_string(), ERR_MSG_CANCELLED);
        assert_eq!(err.into_value(), Some(7));
    }

    #[test]
    fn panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(GeneratorError::panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(GeneratorError::panic_message(boxed.as_ref()), "owned boom");
        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(
            GeneratorError::panic_message(boxed.as_ref()),
            "non-string panic payload"
        );
    }
}
