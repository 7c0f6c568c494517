use std::io::{ErrorKind, Read};
use std::os::fd::BorrowedFd;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lineevent_common::v1::EventRecord;
use log::{debug, warn};

use crate::error::Fault;
use crate::sys::FdReader;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Treats `raw_ns` as nanoseconds since the Unix epoch.
///
/// The kernel event clock is taken as wall-clock time without correction.
pub fn to_calendar_time(raw_ns: u64) -> SystemTime {
    let secs = raw_ns / NANOS_PER_SEC;
    let nanos = raw_ns % NANOS_PER_SEC;
    UNIX_EPOCH + Duration::new(secs, nanos as u32)
}

/// Reads exactly one event record and converts its timestamp.
///
/// A read interrupted by a signal yields the current time instead of a
/// kernel timestamp. End of input before a full record is a fault.
pub fn read_event_time<R: Read>(reader: &mut R) -> Result<SystemTime, Fault> {
    let mut buf = [0u8; EventRecord::SIZE];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(Fault::ShortRead { read: filled }),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => {
                warn!("GPIO event read interrupted, using current time");
                return Ok(SystemTime::now());
            }
            Err(err) => return Err(Fault::Read(err)),
        }
    }
    let record = EventRecord::decode(&buf);
    match record.kind() {
        Ok(kind) => debug!("GPIO {} event at {} ns", kind, record.timestamp),
        Err(_) => debug!("GPIO event id {} at {} ns", record.id, record.timestamp),
    }
    Ok(to_calendar_time(record.timestamp))
}

/// Decoder handed to the notifier for line event descriptors.
pub fn read_line_event(fd: BorrowedFd<'_>) -> Result<SystemTime, Fault> {
    read_event_time(&mut FdReader(fd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn record(timestamp: u64, id: u32) -> [u8; EventRecord::SIZE] {
        EventRecord { timestamp, id }.encode()
    }

    #[test]
    fn five_billion_nanos_is_five_seconds() {
        let t = to_calendar_time(5_000_000_000);
        assert_eq!(t.duration_since(UNIX_EPOCH).unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn remainder_becomes_subsecond_part() {
        let t = to_calendar_time(1_700_000_000_123_456_789);
        let since = t.duration_since(UNIX_EPOCH).unwrap();
        assert_eq!(since.as_secs(), 1_700_000_000);
        assert_eq!(since.subsec_nanos(), 123_456_789);
    }

    #[test]
    fn largest_count_does_not_overflow() {
        let since = to_calendar_time(u64::MAX).duration_since(UNIX_EPOCH).unwrap();
        assert_eq!(since.as_secs(), u64::MAX / NANOS_PER_SEC);
        assert_eq!(since.subsec_nanos() as u64, u64::MAX % NANOS_PER_SEC);
    }

    #[test]
    fn reads_full_record() {
        let buf = record(5_000_000_000, 1);
        let t = read_event_time(&mut &buf[..]).unwrap();
        assert_eq!(t, UNIX_EPOCH + Duration::from_secs(5));
    }

    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((&b, rest)) if !buf.is_empty() => {
                    buf[0] = b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn record_split_across_reads_is_assembled() {
        let buf = record(2_500_000_000, 2);
        let t = read_event_time(&mut Trickle(&buf)).unwrap();
        assert_eq!(t, UNIX_EPOCH + Duration::from_millis(2_500));
    }

    #[test]
    fn truncated_record_is_a_fault() {
        let buf = record(1, 1);
        let err = read_event_time(&mut &buf[..10]).unwrap_err();
        assert!(matches!(err, Fault::ShortRead { read: 10 }));
        let err = read_event_time(&mut io::empty()).unwrap_err();
        assert!(matches!(err, Fault::ShortRead { read: 0 }));
    }

    struct Failing(ErrorKind);

    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }
    }

    #[test]
    fn interrupted_read_uses_current_time() {
        let before = SystemTime::now();
        let t = read_event_time(&mut Failing(ErrorKind::Interrupted)).unwrap();
        let after = SystemTime::now();
        assert!(t >= before && t <= after);
        let skew = after.duration_since(before).unwrap();
        assert!(skew < Duration::from_secs(1));
    }

    #[test]
    fn other_read_errors_are_faults() {
        let err = read_event_time(&mut Failing(ErrorKind::BrokenPipe)).unwrap_err();
        assert!(matches!(err, Fault::Read(e) if e.kind() == ErrorKind::BrokenPipe));
    }
}
