//! Inter-task communication channels
//!
//! Defines the statics shared between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use mannequin_core::signal::EdgeBus;
use mannequin_core::state::HitReport;

/// Channel capacity for hit reports awaiting the relay
const HIT_CHANNEL_SIZE: usize = 4;

/// Confirmed rising edges from the detect tasks, drained by the control tick
pub static EDGES: EdgeBus = EdgeBus::new();

/// Hits acted upon by the control tick, forwarded by the relay task
pub static HIT_CHANNEL: Channel<CriticalSectionRawMutex, HitReport, HIT_CHANNEL_SIZE> =
    Channel::new();
