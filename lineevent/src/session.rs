use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::time::SystemTime;

use log::{debug, error};

use crate::channel::Receiver;
use crate::config::EventLineConfig;
use crate::error::{Error, Fault, Result};
use crate::event::read_line_event;
use crate::notifier::{EdgeNotifier, Interest};
use crate::sys;

/// One line event descriptor, its worker and its delivery channel.
pub struct Session {
    notifier: Option<EdgeNotifier<SystemTime>>,
    events: Receiver<SystemTime>,
}

impl Session {
    /// Requests events for the configured line on `chip` and starts watching them.
    pub fn new(chip: BorrowedFd<'_>, config: &EventLineConfig) -> Result<Self> {
        let fd = sys::request_line_event(chip, &config.to_request()).map_err(Error::Request)?;
        debug!("line {} event fd {}", config.offset, fd.as_raw_fd());
        Self::with_fd(fd)
    }

    /// Starts watching an already requested event descriptor.
    pub fn with_fd(fd: OwnedFd) -> Result<Self> {
        let interest = Interest::READABLE | Interest::PRIORITY | Interest::EDGE;
        let (notifier, events) = EdgeNotifier::spawn(fd, interest, read_line_event)?;
        Ok(Self {
            notifier: Some(notifier),
            events,
        })
    }

    /// Receiving end of the event channel. Only the latest unread event
    /// time is kept; the channel closes when the session is closed.
    pub fn events(&self) -> Receiver<SystemTime> {
        self.events.clone()
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.notifier.as_ref().and_then(|notifier| notifier.fault())
    }

    pub fn try_clone_fd(&self) -> io::Result<OwnedFd> {
        match &self.notifier {
            Some(notifier) => notifier.as_fd().try_clone_to_owned(),
            None => Err(io::Error::from_raw_os_error(libc::EBADF)),
        }
    }

    pub fn close(mut self) -> Result<()> {
        self.teardown()
    }

    // Worker stopped and joined, then descriptor closed, then channel closed.
    fn teardown(&mut self) -> Result<()> {
        let Some(notifier) = self.notifier.take() else {
            return Ok(());
        };
        let (fd, sender) = notifier.shutdown()?;
        let raw = fd.as_raw_fd();
        let closed = sys::close(fd).map_err(Error::CloseEvents);
        sender.close();
        debug!("event session on fd {} closed", raw);
        closed
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            error!("failed to close event session: {}", err);
        }
    }
}
