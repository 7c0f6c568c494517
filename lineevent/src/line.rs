//! Lines opened with events.
//!
//! A [`LineWithEvents`] holds two descriptors for the same kernel line: the
//! one watched by its [`Session`] and a duplicate owned by its
//! [`LineHandle`] for level reads. Closing either one has no effect on the
//! other.

use std::fs::File;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::path::Path;
use std::time::SystemTime;

use log::debug;

use crate::channel::Receiver;
use crate::config::EventLineConfig;
use crate::error::{Error, Fault, Result};
use crate::session::Session;
use crate::sys;

/// Descriptor used for synchronous level reads of a single line.
#[derive(Debug)]
pub struct LineHandle {
    fd: OwnedFd,
}

impl LineHandle {
    pub fn from_fd(fd: OwnedFd) -> Self {
        Self { fd }
    }

    /// Current level, 1 (high) or 0 (low).
    pub fn value(&self) -> Result<u8> {
        let data = sys::line_values(self.fd.as_fd()).map_err(Error::Value)?;
        Ok(data.values[0])
    }

    pub fn close(self) -> Result<()> {
        sys::close(self.fd).map_err(Error::CloseLine)
    }
}

impl AsFd for LineHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

/// An opened line whose edge events can be subscribed to.
pub struct LineWithEvents {
    line: LineHandle,
    session: Session,
}

impl LineWithEvents {
    /// Builds the composite from an event descriptor returned by the kernel.
    pub fn from_event_fd(fd: OwnedFd) -> Result<Self> {
        Self::from_session(Session::with_fd(fd)?)
    }

    fn from_session(session: Session) -> Result<Self> {
        // On failure the session is dropped, which stops its worker first.
        let fd = session.try_clone_fd().map_err(Error::Dup)?;
        Ok(Self {
            line: LineHandle::from_fd(fd),
            session,
        })
    }

    pub fn value(&self) -> Result<u8> {
        self.line.value()
    }

    /// Channel of best estimates of event times.
    ///
    /// Sending never blocks: only the latest unread time is kept. The
    /// channel is closed when the line is closed.
    pub fn events(&self) -> Receiver<SystemTime> {
        self.session.events()
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.session.fault()
    }

    pub fn line(&self) -> &LineHandle {
        &self.line
    }

    pub fn into_parts(self) -> (LineHandle, Session) {
        (self.line, self.session)
    }

    /// Closes both descriptors. If both fail, the line handle error is returned.
    pub fn close(self) -> Result<()> {
        let line = self.line.close();
        let session = self.session.close();
        line.and(session)
    }
}

#[derive(Debug)]
pub struct Chip {
    file: File,
}

impl Chip {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(Error::Open)?;
        debug!("opened {}", path.display());
        Ok(Self { file })
    }

    /// Requests an input line with edge events.
    pub fn request_events(&self, config: &EventLineConfig) -> Result<LineWithEvents> {
        LineWithEvents::from_session(Session::new(self.file.as_fd(), config)?)
    }
}

impl AsFd for Chip {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}
