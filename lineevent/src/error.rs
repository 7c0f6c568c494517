use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while setting up or tearing down a line.
#[derive(Debug, Error)]
pub enum Error {
    #[error("open GPIO chip failed: {0}")]
    Open(#[source] io::Error),
    #[error("request GPIO event failed: ioctl {0}")]
    Request(#[source] io::Error),
    #[error("request GPIO event failed: dup {0}")]
    Dup(#[source] io::Error),
    #[error("read GPIO line value failed: ioctl {0}")]
    Value(#[source] io::Error),
    #[error("create event notifier failed: epoll {0}")]
    Epoll(#[source] io::Error),
    #[error("create event notifier failed: eventfd {0}")]
    EventFd(#[source] io::Error),
    #[error("spawn event worker failed: {0}")]
    Spawn(#[source] io::Error),
    #[error("stop event worker failed: {0}")]
    Stop(#[source] io::Error),
    #[error("event worker panicked")]
    WorkerPanicked,
    #[error("close line handle failed: {0}")]
    CloseLine(#[source] io::Error),
    #[error("close event descriptor failed: {0}")]
    CloseEvents(#[source] io::Error),
}

/// Fault that terminated an event worker.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("failed to read GPIO event: short read of {read} bytes")]
    ShortRead { read: usize },
    #[error("failed to read GPIO event: {0}")]
    Read(#[source] io::Error),
    #[error("failed to wait for GPIO event: {0}")]
    Wait(#[source] io::Error),
}
