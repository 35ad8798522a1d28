//! Lock-free progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Pipeline stage a batch is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Splitting the grid and mapping columns.
    Reading,
    /// Row-by-row validation.
    Validating,
    /// Writing lines and alerts to the store.
    Persisting,
    /// Finished.
    Done,
    /// Stopped on request.
    Cancelled,
    /// Aborted on a structural error.
    Failed,
}

impl Stage {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Validating,
            2 => Self::Persisting,
            3 => Self::Done,
            4 => Self::Cancelled,
            5 => Self::Failed,
            _ => Self::Reading,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Reading => 0,
            Self::Validating => 1,
            Self::Persisting => 2,
            Self::Done => 3,
            Self::Cancelled => 4,
            Self::Failed => 5,
        }
    }
}

/// Point-in-time view of a batch's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// Current stage.
    pub stage: Stage,
    /// Rows validated so far.
    pub rows_done: usize,
    /// Total rows in the sheet.
    pub rows_total: usize,
}

/// Cloneable handle that the processor updates and observers poll.
#[derive(Debug, Clone, Default)]
pub struct ProgressHandle {
    inner: Arc<ProgressInner>,
}

#[derive(Debug, Default)]
struct ProgressInner {
    stage: AtomicU8,
    rows_done: AtomicUsize,
    rows_total: AtomicUsize,
}

impl ProgressHandle {
    /// Creates a handle at the `Reading` stage with zero rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the pipeline to `stage`.
    pub fn set_stage(&self, stage: Stage) {
        self.inner.stage.store(stage.as_u8(), Ordering::Release);
    }

    /// Records the total row count once the sheet is split.
    pub fn set_total(&self, total: usize) {
        self.inner.rows_total.store(total, Ordering::Release);
    }

    /// Marks one more row as validated.
    pub fn row_done(&self) {
        self.inner.rows_done.fetch_add(1, Ordering::AcqRel);
    }

    /// Reads the current progress.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            stage: Stage::from_u8(self.inner.stage.load(Ordering::Acquire)),
            rows_done: self.inner.rows_done.load(Ordering::Acquire),
            rows_total: self.inner.rows_total.load(Ordering::Acquire),
        }
    }
}

/// Cooperative cancellation flag checked between rows.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// True when cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
