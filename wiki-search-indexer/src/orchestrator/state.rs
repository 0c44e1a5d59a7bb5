//! Rebuild admission state.

use std::sync::atomic::{AtomicU8, Ordering};

const QUEUED: u8 = 0b001;
const RUNNING: u8 = 0b010;
/// A rebuild started after the queued request, so the queued job has nothing to do.
const SATISFIED: u8 = 0b100;

/// Where the index rebuild is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Idle,
    Queued,
    InProgress,
}

/// Shared, atomically updated rebuild admission flags.
///
/// A background request sets `QUEUED` only from idle, and the flag stays set until the
/// queued job itself runs. A direct rebuild takes `RUNNING` and, when a request is
/// queued, marks it `SATISFIED` so the queued job skips. Exclusion holds within one
/// process only.
#[derive(Debug, Default)]
pub struct IndexStatus {
    flags: AtomicU8,
}

impl IndexStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> IndexState {
        let flags = self.flags.load(Ordering::Acquire);
        if flags & RUNNING != 0 {
            IndexState::InProgress
        } else if flags & QUEUED != 0 {
            IndexState::Queued
        } else {
            IndexState::Idle
        }
    }

    /// Move `Idle -> Queued`. Returns `false` if a rebuild is already queued or running.
    pub fn try_queue(&self) -> bool {
        self.flags
            .compare_exchange(0, QUEUED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Undo a [`try_queue`](Self::try_queue) whose job could not be submitted.
    pub fn cancel_queued(&self) {
        let _ = self
            .flags
            .compare_exchange(QUEUED, 0, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Start a direct rebuild unless one is running.
    ///
    /// A queued request stays queued but is marked satisfied. The returned guard clears
    /// the running flag when dropped, including during unwinding.
    pub fn try_begin(&self) -> Option<RebuildGuard<'_>> {
        self.flags
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |flags| {
                (flags & RUNNING == 0).then(|| {
                    let satisfied = if flags & QUEUED != 0 { SATISFIED } else { 0 };
                    flags | RUNNING | satisfied
                })
            })
            .is_ok()
            .then(|| RebuildGuard { status: self })
    }

    /// Start the rebuild a queued job was submitted for.
    ///
    /// Always clears the queued request. Returns `None` when a rebuild started after
    /// the request already covered it.
    pub fn begin_queued(&self) -> Option<RebuildGuard<'_>> {
        let previous = self
            .flags
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |flags| {
                Some(if flags & (RUNNING | SATISFIED) != 0 {
                    flags & !(QUEUED | SATISFIED)
                } else {
                    RUNNING
                })
            })
            .unwrap_or_else(|flags| flags);

        (previous & (RUNNING | SATISFIED) == 0).then(|| RebuildGuard { status: self })
    }
}

/// Holds the running flag for the duration of a rebuild.
#[derive(Debug)]
pub struct RebuildGuard<'a> {
    status: &'a IndexStatus,
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.status.flags.fetch_and(!RUNNING, Ordering::AcqRel);
    }
}
