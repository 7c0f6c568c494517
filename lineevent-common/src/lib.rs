#![no_std]
use num_enum::{IntoPrimitive, TryFromPrimitive};

pub mod v1;

/// Capacity of the consumer label carried by a line request.
pub const CONSUMER_LABEL_LEN: usize = 32;
/// Number of line values exchanged by a handle value request.
pub const HANDLES_MAX: usize = 64;

/*include/uapi/linux/gpio.h*/
pub mod handle_flags {
    pub const REQUEST_INPUT: u32 = 1 << 0;
    pub const REQUEST_ACTIVE_LOW: u32 = 1 << 2;
}

pub mod event_flags {
    pub const RISING_EDGE: u32 = 1 << 0;
    pub const FALLING_EDGE: u32 = 1 << 1;
    pub const BOTH_EDGES: u32 = RISING_EDGE | FALLING_EDGE;
}

/// Kind of transition reported in an event record.
#[repr(u32)]
#[derive(IntoPrimitive, TryFromPrimitive, Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum EventId {
    RisingEdge = 1,
    FallingEdge = 2,
}
