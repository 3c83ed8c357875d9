//! One-in-flight frame admission.
//!
//! While a frame holds a [`FramePermit`], every other admission attempt fails
//! and is counted as dropped. Nothing is queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::trace::trace_event;

/// Admitted and dropped frame counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames that obtained a permit.
    pub admitted: u64,
    /// Frames rejected because another frame was in flight.
    pub dropped: u64,
}

/// Admission gate shared between the frame producer and the decode lane.
#[derive(Debug, Default)]
pub struct FrameGate {
    busy: AtomicBool,
    admitted: AtomicU64,
    dropped: AtomicU64,
}

impl FrameGate {
    /// Creates an idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a frame if none is in flight.
    ///
    /// Returns `None` and counts the frame as dropped otherwise.
    pub fn try_admit(&self) -> Option<FramePermit<'_>> {
        match self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
        {
            Ok(_) => {
                self.admitted.fetch_add(1, Ordering::Relaxed);
                Some(FramePermit { gate: self })
            }
            Err(_) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                trace_event!("frame_dropped", total = dropped);
                None
            }
        }
    }

    /// Returns `true` while a permit is alive.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> FrameStats {
        FrameStats {
            admitted: self.admitted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Proof that the holder owns the decode lane. Dropping it reopens the gate.
#[derive(Debug)]
pub struct FramePermit<'a> {
    gate: &'a FrameGate,
}

impl Drop for FramePermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}
