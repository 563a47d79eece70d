//! Confirmed-edge event set shared with interrupt context
//!
//! The detection front end raises one bit per channel from interrupt or
//! task context; the control loop takes every pending bit at once with
//! [`EdgeBus::drain`]. Raising is `fetch_or` and draining is `swap(0)`, so an
//! edge that lands between the read and the clear of a drain can't be lost.
//!
//! On thumbv6m the atomics come from `portable-atomic` with its
//! critical-section fallback, i.e. interrupts are masked for the swap.

use portable_atomic::{AtomicU8, Ordering};

/// Detection input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeChannel {
    /// First body sensor (DETECT_1)
    BodyA,
    /// Head sensor (DETECT_2)
    Head,
    /// Second body sensor (DETECT_3)
    BodyB,
}

impl EdgeChannel {
    /// All channels in input-pin order
    pub const ALL: [EdgeChannel; 3] = [EdgeChannel::BodyA, EdgeChannel::Head, EdgeChannel::BodyB];

    const fn bit(self) -> u8 {
        match self {
            EdgeChannel::BodyA => 1 << 0,
            EdgeChannel::Head => 1 << 1,
            EdgeChannel::BodyB => 1 << 2,
        }
    }
}

/// Snapshot of pending edges, one bit per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeSet(u8);

impl EdgeSet {
    /// No edges
    pub const EMPTY: EdgeSet = EdgeSet(0);

    /// Set containing only `channel`
    pub const fn only(channel: EdgeChannel) -> Self {
        EdgeSet(channel.bit())
    }

    /// This set with `channel` added
    pub const fn with(self, channel: EdgeChannel) -> Self {
        EdgeSet(self.0 | channel.bit())
    }

    pub fn contains(self, channel: EdgeChannel) -> bool {
        self.0 & channel.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// A head edge is pending
    pub fn head(self) -> bool {
        self.contains(EdgeChannel::Head)
    }

    /// At least one body edge is pending (both sensors count once)
    pub fn body(self) -> bool {
        self.contains(EdgeChannel::BodyA) || self.contains(EdgeChannel::BodyB)
    }

    /// Iterate the channels present in this set
    pub fn iter(self) -> impl Iterator<Item = EdgeChannel> {
        EdgeChannel::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

/// Set of confirmed edges raised by any number of producers and drained by
/// the control loop
pub struct EdgeBus {
    pending: AtomicU8,
}

impl Default for EdgeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeBus {
    /// Create an empty bus (usable in a `static`)
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
        }
    }

    /// Record a confirmed rising edge on `channel`
    ///
    /// Repeated edges on the same channel before the next drain collapse into one.
    pub fn raise(&self, channel: EdgeChannel) {
        self.pending.fetch_or(channel.bit(), Ordering::AcqRel);
    }

    /// Take every pending edge and clear the bus
    pub fn drain(&self) -> EdgeSet {
        EdgeSet(self.pending.swap(0, Ordering::AcqRel))
    }

    /// Look at pending edges without clearing them
    pub fn peek(&self) -> EdgeSet {
        EdgeSet(self.pending.load(Ordering::Acquire))
    }
}
