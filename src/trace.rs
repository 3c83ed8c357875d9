//! Instrumentation hooks for the decode pipeline.
//!
//! Every stage opens a span and reports counts through the two macros below.
//! They expand to `tracing` calls when the `tracing` feature is on. With the
//! feature off, spans become [`NoopSpan`], events only evaluate their values,
//! and [`FrameTimer`] never reads the clock.

/// Opens an info-level span named after a pipeline stage.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($stage:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($stage $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($stage:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Reports stage counters (candidate totals, survivors, frame latency).
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($stage:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(stage = $stage, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($stage:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($stage, $($value,)+);
    };
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Placeholder returned by `trace_span!` without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
pub(crate) struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub(crate) fn entered(self) -> Self {
        self
    }
}

/// Wall-clock latency of one frame, reported through `trace_event!`.
#[cfg(feature = "tracing")]
pub(crate) struct FrameTimer(std::time::Instant);

#[cfg(feature = "tracing")]
impl FrameTimer {
    pub(crate) fn start() -> Self {
        Self(std::time::Instant::now())
    }

    pub(crate) fn elapsed_micros(&self) -> u64 {
        u64::try_from(self.0.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

/// Without tracing nobody consumes frame latency, so the clock is skipped.
#[cfg(not(feature = "tracing"))]
pub(crate) struct FrameTimer;

#[cfg(not(feature = "tracing"))]
impl FrameTimer {
    #[inline]
    pub(crate) fn start() -> Self {
        Self
    }

    #[inline]
    pub(crate) fn elapsed_micros(&self) -> u64 {
        0
    }
}
