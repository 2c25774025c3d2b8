use crossbeam::utils::CachePadded;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a generator bridge. Ordered; transitions only move forward.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u8)]
pub enum Phase {
    Created = 0,
    Running = 1,
    /// Stop requested or producer returned; thread not yet gone.
    Closing = 2,
    Stopped = 3,
}

impl Phase {
    #[inline]
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Phase::Created,
            1 => Phase::Running,
            2 => Phase::Closing,
            _ => Phase::Stopped,
        }
    }
}

/// Cheaply clonable, monotonic phase cell shared between the producer
/// thread and its handles. Cache padded to keep it off hot neighbours.
#[derive(Clone)]
#[repr(transparent)]
pub struct PhaseFlag(Arc<CachePadded<AtomicU8>>);

impl PhaseFlag {
    #[inline]
    pub fn new(initial: Phase) -> Self {
        Self(Arc::new(CachePadded::new(AtomicU8::new(initial as u8))))
    }

    #[inline(always)]
    fn atomic(&self) -> &AtomicU8 {
        &self.0
    }

    #[inline]
    pub fn get(&self) -> Phase {
        Phase::from_u8(self.atomic().load(Ordering::Acquire))
    }

    /// Moves forward to `phase`. Never moves backwards.
    /// Returns the previous phase.
    #[inline]
    pub fn advance(&self, phase: Phase) -> Phase {
        Phase::from_u8(self.atomic().fetch_max(phase as u8, Ordering::AcqRel))
    }

    #[inline]
    pub fn is(&self, phase: Phase) -> bool {
        self.get() == phase
    }
}

impl fmt::Debug for PhaseFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseFlag")
            .field("phase", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_only_move_forward() {
        let flag = PhaseFlag::new(Phase::Created);
        assert_eq!(flag.advance(Phase::Running), Phase::Created);
        assert_eq!(flag.advance(Phase::Stopped), Phase::Running);
        assert_eq!(flag.advance(Phase::Closing), Phase::Stopped);
        assert!(flag.is(Phase::Stopped));
    }

    #[test]
    fn clones_share_state() {
        let a = PhaseFlag::new(Phase::Running);
        let b = a.clone();
        b.advance(Phase::Closing);
        assert_eq!(a.get(), Phase::Closing);
    }
}
