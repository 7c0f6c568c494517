//! Closes descriptors behind the library's back, so it runs alone in its own
//! binary where no other test can pick up the freed descriptor numbers.

use std::fs::File;
use std::os::fd::{AsFd, AsRawFd, FromRawFd, OwnedFd};

use lineevent::{Closed, Error, LineWithEvents};

fn pipe() -> (OwnedFd, File) {
    let mut fds = [0; 2];
    assert_eq!(unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) }, 0);
    unsafe { (OwnedFd::from_raw_fd(fds[0]), File::from_raw_fd(fds[1])) }
}

fn is_ebadf(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(libc::EBADF)
}

#[test]
fn composite_close_prefers_line_handle_error() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    // Both descriptors already gone: only the line handle error is reported.
    let (reader, _writer) = pipe();
    let events_raw = reader.as_raw_fd();
    let line = LineWithEvents::from_event_fd(reader)?;
    let line_raw = line.line().as_fd().as_raw_fd();
    assert_ne!(line_raw, events_raw);
    let events = line.events();
    unsafe {
        libc::close(line_raw);
        libc::close(events_raw);
    }
    let result = line.close();
    assert!(matches!(&result, Err(Error::CloseLine(e)) if is_ebadf(e)));
    assert_eq!(events.recv(), Err(Closed));

    // Only the event descriptor gone: its error comes through.
    let (reader, _writer) = pipe();
    let events_raw = reader.as_raw_fd();
    let line = LineWithEvents::from_event_fd(reader)?;
    let events = line.events();
    unsafe {
        libc::close(events_raw);
    }
    let result = line.close();
    assert!(matches!(&result, Err(Error::CloseEvents(e)) if is_ebadf(e)));
    assert_eq!(events.recv(), Err(Closed));
    Ok(())
}
