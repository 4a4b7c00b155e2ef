//! Per-refresh frame scheduler.
//!
//! Mirrors a display's "call me on the next refresh" facility: a caller
//! requests a frame and gets back a [`FrameHandle`], which it can later use
//! to cancel the request. The host loop drains the due handles once per
//! display refresh and feeds them back to whoever requested them.

use smallvec::SmallVec;

/// Identifies one requested frame. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RefreshScheduler {
    next_id: u64,
    pending: SmallVec<[FrameHandle; 2]>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a callback on the next refresh.
    pub fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    /// Withdraw a pending request. Unknown or already-fired handles are ignored.
    pub fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
    }

    /// Take every request due on this refresh.
    ///
    /// Requests made while handling the returned handles land in the next
    /// refresh, never the current one.
    pub fn take_due(&mut self) -> SmallVec<[FrameHandle; 2]> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
