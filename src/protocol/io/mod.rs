//! Bounded IO buffers between the state machine and the caller's CAN
//! driver: the outbound frame stack and the inbound freshness monitor.
use crate::protocol::can_frame::Frame;
use crate::protocol::codec::TelemetryGroup;

/// Outbound frames queued per TX cycle: setpoint, broadcast, static.
pub const TX_STACK_DEPTH: usize = 3;

/// All five telemetry groups observed at least once since the last reset.
pub const TELEMETRY_COMPLETE_MASK: u8 = 0x1F;

//==================================================================================TxStack

/// Outbound frame buffer.
///
/// Frames drain in reverse push order. The OEM controller interleaves its
/// three command frames that way, so the order is part of the external
/// contract, not an implementation detail.
#[derive(Debug)]
pub struct TxStack {
    frames: [Frame; TX_STACK_DEPTH],
    count: u8,
    /// Only one instance in a multi-module charger should broadcast 0x45C.
    /// Enabled by default.
    pub enable_broadcast: bool,
    /// Transmission scheduling timer.
    pub timer_ms: u32,
}

impl TxStack {
    pub const fn new() -> Self {
        Self {
            frames: [Frame::empty(); TX_STACK_DEPTH],
            count: 0,
            enable_broadcast: true,
            timer_ms: 0,
        }
    }

    /// Discard any frames not yet drained.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Number of frames waiting to be drained.
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Queue a frame. The controller re-encodes the whole batch each TX
    /// cycle, so the stack never legitimately overflows.
    pub fn push(&mut self, frame: Frame) {
        debug_assert!((self.count as usize) < TX_STACK_DEPTH);
        if (self.count as usize) < TX_STACK_DEPTH {
            self.frames[self.count as usize] = frame;
            self.count += 1;
        }
    }

    /// Pop the most recently queued frame.
    pub fn pop(&mut self) -> Option<Frame> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        Some(self.frames[self.count as usize])
    }
}

impl Default for TxStack {
    fn default() -> Self {
        Self::new()
    }
}

//==================================================================================RxMonitor

/// Inbound freshness tracking: which telemetry groups have reported since
/// the last reset, and for how long the module has been silent.
#[derive(Debug)]
pub struct RxMonitor {
    /// Reception timeout timer.
    pub timer_ms: u32,
    recv_flags: u8,
    has_frames: bool,
}

impl RxMonitor {
    pub const fn new() -> Self {
        Self {
            timer_ms: 0,
            recv_flags: 0,
            has_frames: false,
        }
    }

    /// Record a recognized frame. `group` is `None` for module
    /// transmissions that carry no mapped fields; those count toward
    /// freshness but contribute no completion bit.
    ///
    /// Readiness is asserted, and the timeout timer rearmed, only once
    /// every group has been observed.
    pub fn note_frame(&mut self, group: Option<TelemetryGroup>) {
        if let Some(group) = group {
            self.recv_flags |= 1 << group.bit();
        }
        if self.recv_flags == TELEMETRY_COMPLETE_MASK {
            self.has_frames = true;
            self.timer_ms = 0;
        }
    }

    /// True once a full telemetry set has been observed and is still fresh.
    pub fn has_frames(&self) -> bool {
        self.has_frames
    }

    /// Mask of observed groups, one bit per [`TelemetryGroup`].
    pub fn recv_flags(&self) -> u8 {
        self.recv_flags
    }

    /// Drop freshness but keep the observed-group mask. Used when the
    /// module has gone silent.
    pub fn mark_stale(&mut self) {
        self.has_frames = false;
    }

    /// Restart the observation window, keeping the observed-group mask.
    pub fn restart(&mut self) {
        self.timer_ms = 0;
        self.has_frames = false;
    }

    /// Forget everything observed so far.
    pub fn invalidate(&mut self) {
        self.has_frames = false;
        self.recv_flags = 0;
    }
}

impl Default for RxMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
