//! Line event records of the GPIO character device uAPI v1.
//!
//! Records are exchanged as byte arrays with named fields at fixed offsets,
//! in native byte order. The `Raw*` mirrors below follow the kernel structs
//! and only exist so the offsets are checked at compile time.

use core::mem::{offset_of, size_of};

use num_enum::TryFromPrimitiveError;

use crate::{EventId, CONSUMER_LABEL_LEN, HANDLES_MAX};

#[allow(dead_code)]
#[repr(C)]
struct RawEventRequest {
    line_offset: u32,
    handle_flags: u32,
    event_flags: u32,
    consumer_label: [u8; CONSUMER_LABEL_LEN],
    fd: i32,
}

#[allow(dead_code)]
#[repr(C)]
struct RawEventData {
    timestamp: u64,
    id: u32,
    reserved: u32,
}

#[allow(dead_code)]
#[repr(C)]
struct RawHandleData {
    values: [u8; HANDLES_MAX],
}

const _: () = {
    assert!(size_of::<RawEventRequest>() == EventRequest::SIZE);
    assert!(offset_of!(RawEventRequest, line_offset) == EventRequest::LINE_OFFSET_AT);
    assert!(offset_of!(RawEventRequest, handle_flags) == EventRequest::HANDLE_FLAGS_AT);
    assert!(offset_of!(RawEventRequest, event_flags) == EventRequest::EVENT_FLAGS_AT);
    assert!(offset_of!(RawEventRequest, consumer_label) == EventRequest::LABEL_AT);
    assert!(offset_of!(RawEventRequest, fd) == EventRequest::FD_AT);
    assert!(size_of::<RawEventData>() == EventRecord::SIZE);
    assert!(offset_of!(RawEventData, timestamp) == EventRecord::TIMESTAMP_AT);
    assert!(offset_of!(RawEventData, id) == EventRecord::ID_AT);
    assert!(size_of::<RawHandleData>() == HandleData::SIZE);
};

fn read_u32(buf: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buf[at..at + 4]);
    u32::from_ne_bytes(word)
}

fn read_u64(buf: &[u8], at: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&buf[at..at + 8]);
    u64::from_ne_bytes(word)
}

/// Request for a line event descriptor (`struct gpioevent_request`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventRequest {
    pub line_offset: u32,
    pub handle_flags: u32,
    pub event_flags: u32,
    pub consumer_label: [u8; CONSUMER_LABEL_LEN],
}

impl EventRequest {
    pub const SIZE: usize = 48;
    pub const LINE_OFFSET_AT: usize = 0;
    pub const HANDLE_FLAGS_AT: usize = 4;
    pub const EVENT_FLAGS_AT: usize = 8;
    pub const LABEL_AT: usize = 12;
    pub const FD_AT: usize = 44;

    /// Builds a request. `consumer` is copied into the label field and
    /// silently truncated to [`CONSUMER_LABEL_LEN`] bytes.
    pub fn new(line_offset: u32, handle_flags: u32, event_flags: u32, consumer: &str) -> Self {
        let mut consumer_label = [0u8; CONSUMER_LABEL_LEN];
        let len = consumer.len().min(CONSUMER_LABEL_LEN);
        consumer_label[..len].copy_from_slice(&consumer.as_bytes()[..len]);
        Self {
            line_offset,
            handle_flags,
            event_flags,
            consumer_label,
        }
    }

    /// Label bytes up to the first NUL.
    pub fn consumer(&self) -> &[u8] {
        let end = self
            .consumer_label
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(CONSUMER_LABEL_LEN);
        &self.consumer_label[..end]
    }

    /// Kernel layout of the request; the result descriptor slot is zeroed.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[Self::LINE_OFFSET_AT..Self::LINE_OFFSET_AT + 4]
            .copy_from_slice(&self.line_offset.to_ne_bytes());
        buf[Self::HANDLE_FLAGS_AT..Self::HANDLE_FLAGS_AT + 4]
            .copy_from_slice(&self.handle_flags.to_ne_bytes());
        buf[Self::EVENT_FLAGS_AT..Self::EVENT_FLAGS_AT + 4]
            .copy_from_slice(&self.event_flags.to_ne_bytes());
        buf[Self::LABEL_AT..Self::LABEL_AT + CONSUMER_LABEL_LEN].copy_from_slice(&self.consumer_label);
        buf
    }

    /// Descriptor written back by the kernel into an encoded request.
    pub fn result_fd(buf: &[u8; Self::SIZE]) -> i32 {
        read_u32(buf, Self::FD_AT) as i32
    }
}

/// One line event (`struct gpioevent_data`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventRecord {
    /// Nanoseconds on the kernel event clock.
    pub timestamp: u64,
    pub id: u32,
}

impl EventRecord {
    pub const SIZE: usize = 16;
    pub const TIMESTAMP_AT: usize = 0;
    pub const ID_AT: usize = 8;

    pub fn decode(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            timestamp: read_u64(buf, Self::TIMESTAMP_AT),
            id: read_u32(buf, Self::ID_AT),
        }
    }

    /// Kernel layout of the record, reserved bytes zeroed.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[Self::TIMESTAMP_AT..Self::TIMESTAMP_AT + 8].copy_from_slice(&self.timestamp.to_ne_bytes());
        buf[Self::ID_AT..Self::ID_AT + 4].copy_from_slice(&self.id.to_ne_bytes());
        buf
    }

    pub fn kind(&self) -> Result<EventId, TryFromPrimitiveError<EventId>> {
        EventId::try_from(self.id)
    }
}

/// Line values exchanged with a line handle (`struct gpiohandle_data`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandleData {
    pub values: [u8; HANDLES_MAX],
}

impl HandleData {
    pub const SIZE: usize = HANDLES_MAX;
}

impl Default for HandleData {
    fn default() -> Self {
        Self {
            values: [0u8; HANDLES_MAX],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event_flags, handle_flags};

    #[test]
    fn request_fields_land_at_fixed_offsets() {
        let req = EventRequest::new(17, handle_flags::REQUEST_INPUT, event_flags::BOTH_EDGES, "door");
        let buf = req.encode();
        assert_eq!(read_u32(&buf, 0), 17);
        assert_eq!(read_u32(&buf, 4), handle_flags::REQUEST_INPUT);
        assert_eq!(read_u32(&buf, 8), event_flags::BOTH_EDGES);
        assert_eq!(&buf[12..16], b"door");
        assert_eq!(buf[16], 0);
        assert_eq!(EventRequest::result_fd(&buf), 0);
    }

    #[test]
    fn long_consumer_is_truncated() {
        let long = "a-consumer-label-that-is-longer-than-thirty-two-bytes";
        let req = EventRequest::new(0, 0, 0, long);
        assert_eq!(req.consumer().len(), CONSUMER_LABEL_LEN);
        assert_eq!(req.consumer(), &long.as_bytes()[..CONSUMER_LABEL_LEN]);
    }

    #[test]
    fn result_fd_reads_kernel_slot() {
        let mut buf = EventRequest::new(3, 0, 0, "").encode();
        buf[EventRequest::FD_AT..].copy_from_slice(&9i32.to_ne_bytes());
        assert_eq!(EventRequest::result_fd(&buf), 9);
    }

    #[test]
    fn record_decodes_timestamp_and_id() {
        let mut buf = [0u8; EventRecord::SIZE];
        buf[..8].copy_from_slice(&5_000_000_000u64.to_ne_bytes());
        buf[8..12].copy_from_slice(&2u32.to_ne_bytes());
        buf[12..].copy_from_slice(&[0xff; 4]);
        let record = EventRecord::decode(&buf);
        assert_eq!(record.timestamp, 5_000_000_000);
        assert_eq!(record.kind().unwrap(), EventId::FallingEdge);
    }

    #[test]
    fn unknown_record_id_is_reported() {
        let record = EventRecord { timestamp: 1, id: 7 };
        assert!(record.kind().is_err());
    }
}
