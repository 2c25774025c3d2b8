use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use crate::io::base::Cursor;
use crate::io::handoff::{Handoff, HandoffReceiver, HandoffSender};
use crate::utils::{Event, Phase, PhaseFlag, WaitHandle};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle, ThreadId};

/// What a producer left behind when it exited abnormally.
enum Failure {
    Error(GeneratorError),
    Panic(Box<dyn Any + Send>),
}

/// State shared between the consumer handles and the producer thread.
struct Shared {
    /// Set by `stop`; observed by the producer at its next `send`.
    closing: Event,
    /// Set by the producer thread right before it returns.
    stopped: Event,
    failure: Mutex<Option<Failure>>,
    phase: PhaseFlag,
    producer: OnceLock<ThreadId>,
}

impl Shared {
    fn new() -> Self {
        Self {
            closing: Event::new(),
            stopped: Event::new(),
            failure: Mutex::new(None),
            phase: PhaseFlag::new(Phase::Created),
            producer: OnceLock::new(),
        }
    }

    fn record(&self, failure: Failure) {
        let mut slot = self.failure.lock();
        if slot.is_none() {
            *slot = Some(failure);
        }
    }

    fn take_failure(&self) -> Option<Failure> {
        self.failure.lock().take()
    }

    fn on_producer_thread(&self) -> bool {
        self.producer.get() == Some(&thread::current().id())
    }

    /// Requests the stop and waits until the producer thread is done.
    /// From the producer thread itself this only requests the stop.
    fn stop(&self) {
        self.phase.advance(Phase::Closing);
        if self.closing.set() {
            tracing::debug!("[Generator] stop requested");
        }
        if self.on_producer_thread() {
            return;
        }
        self.stopped.wait().wait();
    }
}

/// Send capability handed to a producer function.
pub struct Yielder<T> {
    tx: HandoffSender<T>,
    closing: WaitHandle,
    sent: usize,
}

impl<T> Yielder<T> {
    /// Hands `value` to the consumer, blocking until it is taken.
    ///
    /// Fails with [`GeneratorError::Stopped`] once a stop was requested or the
    /// consumer is gone. Propagate it with `?` to unwind the producer; the
    /// bridge treats it as a normal exit.
    pub fn send(&mut self, value: T) -> Result<(), GeneratorError> {
        match self.tx.send(value, &self.closing) {
            Ok(()) => {
                self.sent += 1;
                tracing::trace!(sent = self.sent, "[Generator] handoff");
                Ok(())
            }
            Err(err) => {
                tracing::trace!(reason = %err.reason, "[Generator] handoff aborted");
                Err(GeneratorError::Stopped)
            }
        }
    }

    /// Number of values the consumer has taken so far.
    #[inline]
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Whether a stop was requested. Lets long computations between sends
    /// bail out early.
    #[inline]
    pub fn is_closing(&self) -> bool {
        self.closing.is_set()
    }
}

/// Body of the producer thread.
fn run_producer<T, F>(shared: Arc<Shared>, tx: HandoffSender<T>, producer: F)
where
    F: FnOnce(&mut Yielder<T>) -> anyhow::Result<()>,
{
    let _ = shared.producer.set(thread::current().id());
    let mut yielder = Yielder {
        tx,
        closing: shared.closing.wait(),
        sent: 0,
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| producer(&mut yielder)));
    shared.phase.advance(Phase::Closing);
    let sent = yielder.sent;

    match outcome {
        Ok(Ok(())) => tracing::debug!(sent, "[Generator] producer finished"),
        Ok(Err(err)) => {
            let err = GeneratorError::from_producer(err);
            if err.is_stop() {
                tracing::debug!(sent, "[Generator] producer stopped");
            } else {
                tracing::warn!(sent, "[Generator] producer failed: {}", err);
                shared.record(Failure::Error(err));
            }
        }
        Err(payload) => {
            tracing::warn!(
                sent,
                "[Generator] producer panicked: {}",
                GeneratorError::panic_message(payload.as_ref())
            );
            shared.record(Failure::Panic(payload));
        }
    }

    // The failure must be recorded before the consumer can see the close.
    drop(yielder);
    shared.phase.advance(Phase::Stopped);
    shared.stopped.set();
}

/// Pull cursor over values produced by a function running on its own thread.
///
/// Every [`next`](Cursor::next) blocks until the producer hands over a value
/// or exits. Handoffs are synchronous: the producer never runs more than one
/// value ahead of the consumer.
///
/// Dropping the generator stops it, so abandoning it half way never leaks
/// the producer thread.
pub struct Generator<T> {
    rx: HandoffReceiver<T>,
    shared: Arc<Shared>,
    /// Producer thread, joined on the first stop.
    join: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Generator<T> {
    /// Starts `producer` on a new thread with default settings.
    ///
    /// # Panics
    ///
    /// If the OS refuses to create the thread, as [`std::thread::spawn`] does.
    pub fn spawn<F>(producer: F) -> Self
    where
        F: FnOnce(&mut Yielder<T>) -> anyhow::Result<()> + Send + 'static,
    {
        match Self::with_config(GeneratorConfig::default(), producer) {
            Ok(generator) => generator,
            Err(e) => panic!("[Generator] {e}"),
        }
    }

    /// Starts `producer` on a new thread configured by `cfg`.
    pub fn with_config<F>(cfg: GeneratorConfig, producer: F) -> Result<Self, GeneratorError>
    where
        F: FnOnce(&mut Yielder<T>) -> anyhow::Result<()> + Send + 'static,
    {
        let (tx, rx) = Handoff::channel::<T>();
        let shared = Arc::new(Shared::new());

        let mut builder = thread::Builder::new().name(cfg.thread_name().to_string());
        if let Some(size) = cfg.stack_size {
            builder = builder.stack_size(size);
        }

        let join = {
            let shared = shared.clone();
            builder.spawn(move || run_producer(shared, tx, producer))?
        };
        shared.phase.advance(Phase::Running);
        tracing::debug!(thread = cfg.thread_name(), "[Generator] producer spawned");

        Ok(Self {
            rx,
            shared,
            join: Some(join),
        })
    }
}

impl<T> Generator<T> {
    /// Fallible variant of [`Cursor::next`]: a producer failure comes back as
    /// an error instead of being re-raised.
    ///
    /// The failure is reported once, by the first pull after the producer
    /// exited. Later pulls return `Ok(false)`.
    pub fn try_next(&mut self) -> Result<bool, GeneratorError> {
        self.pull().map_err(|failure| match failure {
            Failure::Error(err) => err,
            Failure::Panic(payload) => {
                GeneratorError::Panicked(GeneratorError::panic_message(payload.as_ref()))
            }
        })
    }

    fn pull(&mut self) -> Result<bool, Failure> {
        let value = self.rx.recv();
        if self.rx.set_current(value) {
            return Ok(true);
        }
        match self.shared.take_failure() {
            Some(failure) => Err(failure),
            None => Ok(false),
        }
    }

    /// Stops the producer and waits until its thread has exited.
    ///
    /// Idempotent. The producer notices the request at its next `send`;
    /// a producer that never sends again keeps this call waiting.
    pub fn stop(&mut self) {
        self.shared.stop();
        if self.shared.on_producer_thread() {
            return;
        }
        if let Some(join) = self.join.take() {
            // The producer body catches its own panics.
            let _ = join.join();
        }
    }

    /// Handle that can stop this generator from other threads.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shared: self.shared.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.shared.phase.get()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.phase.is(Phase::Stopped)
    }
}

impl<T> Cursor for Generator<T> {
    type Item = T;

    /// # Panics
    ///
    /// Re-raises a producer failure: a producer panic resumes with its
    /// original payload, a producer error becomes the panic payload itself
    /// (the `anyhow::Error` the producer returned, so callers can downcast).
    fn next(&mut self) -> bool {
        match self.pull() {
            Ok(more) => more,
            Err(Failure::Panic(payload)) => panic::resume_unwind(payload),
            Err(Failure::Error(GeneratorError::Producer(err))) => panic::panic_any(err),
            Err(Failure::Error(err)) => panic::panic_any(err),
        }
    }

    fn value(&self) -> &Self::Item {
        match self.rx.current() {
            Some(v) => v,
            None => panic!("Generator::value called without a current item"),
        }
    }
}

impl<T> Drop for Generator<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<T> fmt::Debug for Generator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("phase", &self.phase())
            .finish()
    }
}

/// Clonable stop handle for a [`Generator`].
///
/// [`stop`](StopHandle::stop) has the same contract as [`Generator::stop`]
/// and may be called from any number of threads at once.
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<Shared>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.shared.stop();
    }

    pub fn phase(&self) -> Phase {
        self.shared.phase.get()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.phase.is(Phase::Stopped)
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("phase", &self.phase())
            .finish()
    }
}

/// Starts `producer` as a [`Generator`] with default settings.
pub fn start<T, F>(producer: F) -> Generator<T>
where
    T: Send + 'static,
    F: FnOnce(&mut Yielder<T>) -> anyhow::Result<()> + Send + 'static,
{
    Generator::spawn(producer)
}
