//! Edge-triggered readiness notifier.
//!
//! An [`EdgeNotifier`] owns a target descriptor and one worker thread. The
//! worker blocks in `epoll_wait` until the target becomes ready or the stop
//! eventfd is signalled, decodes exactly one value per wakeup and publishes
//! it to a single-slot [`channel`].
//!
//! A decode fault ends the worker. The fault is kept in a write-once slot
//! and the channel stays open until [`EdgeNotifier::shutdown`] hands the
//! sender back, so a closed channel alone does not tell a fault from a
//! regular shutdown. If the stop eventfd cannot be signalled the worker is
//! detached instead of joined: it keeps the target open and the sender
//! alive, so its channel never closes.

use std::io::ErrorKind;
use std::ops::BitOr;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, OwnedFd, RawFd};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::channel::{channel, Receiver, Sender};
use crate::error::{Error, Fault, Result};
use crate::sys;

const TARGET: u64 = 0;
const STOP: u64 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interest(u32);

impl Interest {
    pub const READABLE: Interest = Interest(libc::EPOLLIN as u32);
    pub const PRIORITY: Interest = Interest(libc::EPOLLPRI as u32);
    pub const EDGE: Interest = Interest(libc::EPOLLET as u32);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_edge_triggered(self) -> bool {
        self.0 & Self::EDGE.0 != 0
    }
}

impl BitOr for Interest {
    type Output = Interest;

    fn bitor(self, rhs: Interest) -> Interest {
        Interest(self.0 | rhs.0)
    }
}

struct Running<T> {
    target: OwnedFd,
    stop: OwnedFd,
    worker: JoinHandle<Sender<T>>,
}

impl<T> Running<T> {
    fn stop(self) -> Result<(OwnedFd, Sender<T>)> {
        let Running {
            target,
            stop,
            worker,
        } = self;
        if let Err(err) = sys::eventfd_signal(stop.as_fd()) {
            // The worker may still be blocked on the target, leave it open.
            let raw = target.into_raw_fd();
            error!(
                "cannot wake event worker on fd {}, detaching it; its channel stays open",
                raw
            );
            return Err(Error::Stop(err));
        }
        let sender = worker.join().map_err(|_| Error::WorkerPanicked)?;
        Ok((target, sender))
    }
}

pub struct EdgeNotifier<T> {
    running: Option<Running<T>>,
    fault: Arc<OnceLock<Fault>>,
}

impl<T: Send + 'static> EdgeNotifier<T> {
    /// Registers `target` with a fresh epoll set and starts the worker.
    ///
    /// `decode` runs on the worker once per wakeup. On error `target` is
    /// closed before returning.
    pub fn spawn<F>(target: OwnedFd, interest: Interest, decode: F) -> Result<(Self, Receiver<T>)>
    where
        F: FnMut(BorrowedFd<'_>) -> std::result::Result<T, Fault> + Send + 'static,
    {
        let epoll = sys::epoll_create().map_err(Error::Epoll)?;
        let stop = sys::eventfd().map_err(Error::EventFd)?;
        let raw = target.as_raw_fd();
        sys::epoll_add(epoll.as_fd(), raw, interest.bits(), TARGET).map_err(Error::Epoll)?;
        sys::epoll_add(epoll.as_fd(), stop.as_raw_fd(), libc::EPOLLIN as u32, STOP)
            .map_err(Error::Epoll)?;

        let (sender, receiver) = channel();
        let fault = Arc::new(OnceLock::new());
        let worker = thread::Builder::new()
            .name(format!("line-event-{}", raw))
            .spawn({
                let fault = fault.clone();
                move || run(epoll, raw, decode, sender, fault)
            })
            .map_err(Error::Spawn)?;
        debug!(
            "watching fd {} (mask {:#x}, edge triggered: {})",
            raw,
            interest.bits(),
            interest.is_edge_triggered()
        );

        let notifier = Self {
            running: Some(Running {
                target,
                stop,
                worker,
            }),
            fault,
        };
        Ok((notifier, receiver))
    }
}

impl<T> EdgeNotifier<T> {
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.get()
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.worker.is_finished())
    }

    /// Signals the worker, waits for it to exit and returns the still open
    /// target together with the sender, so the caller can close them in that
    /// order.
    pub fn shutdown(mut self) -> Result<(OwnedFd, Sender<T>)> {
        let Some(running) = self.running.take() else {
            unreachable!("notifier stopped twice");
        };
        running.stop()
    }
}

impl<T> AsFd for EdgeNotifier<T> {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match &self.running {
            Some(running) => running.target.as_fd(),
            None => unreachable!("notifier used after shutdown"),
        }
    }
}

impl<T> Drop for EdgeNotifier<T> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            if let Err(err) = running.stop() {
                error!("failed to stop event worker: {}", err);
            }
        }
    }
}

fn run<T, F>(
    epoll: OwnedFd,
    raw: RawFd,
    mut decode: F,
    sender: Sender<T>,
    fault: Arc<OnceLock<Fault>>,
) -> Sender<T>
where
    F: FnMut(BorrowedFd<'_>) -> std::result::Result<T, Fault>,
{
    // SAFETY: the notifier keeps the target open until this thread is joined.
    let target = unsafe { BorrowedFd::borrow_raw(raw) };
    let mut events = [libc::epoll_event { events: 0, u64: 0 }; 2];
    loop {
        let n = match sys::epoll_wait(epoll.as_fd(), &mut events) {
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                error!("event worker on fd {} terminated: {}", raw, err);
                let _ = fault.set(Fault::Wait(err));
                return sender;
            }
        };
        let stopping = events[..n].iter().any(|event| {
            let token = event.u64;
            token == STOP
        });
        if stopping {
            debug!("event worker on fd {} stopping", raw);
            return sender;
        }
        // One record per wakeup, even if more are queued behind this edge.
        match decode(target) {
            Ok(value) => {
                sender.publish(value);
            }
            Err(err) => {
                error!("event worker on fd {} terminated: {}", raw, err);
                let _ = fault.set(err);
                return sender;
            }
        }
    }
}
