//! Single-slot delivery channel.
//!
//! The slot holds at most one value. Publishing never waits for a consumer
//! and replaces any unread value. After the [`Sender`] is closed or dropped,
//! a value still in the slot is delivered once, then every receive reports
//! [`Closed`].

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("channel closed")]
pub struct Closed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryRecvError {
    #[error("channel empty")]
    Empty,
    #[error("channel closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecvTimeoutError {
    #[error("timed out waiting on channel")]
    Timeout,
    #[error("channel closed")]
    Closed,
}

struct Slot<T> {
    value: Option<T>,
    closed: bool,
}

impl<T> Slot<T> {
    fn take(&mut self) -> Result<T, TryRecvError> {
        match self.value.take() {
            Some(value) => Ok(value),
            None if self.closed => Err(TryRecvError::Closed),
            None => Err(TryRecvError::Empty),
        }
    }
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
    notify: Notify,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wake(&self) {
        self.ready.notify_all();
        self.notify.notify_waiters();
    }
}

pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot {
            value: None,
            closed: false,
        }),
        ready: Condvar::new(),
        notify: Notify::new(),
    });
    (
        Sender {
            shared: shared.clone(),
        },
        Receiver { shared },
    )
}

/// Producing end. Closing consumes it, so nothing can be published after close.
pub struct Sender<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Sender<T> {
    /// Stores `value`, returning the unread value it displaced, if any.
    pub fn publish(&self, value: T) -> Option<T> {
        let displaced = self.shared.lock().value.replace(value);
        self.shared.wake();
        displaced
    }

    /// Closes the channel. A pending value is still delivered.
    pub fn close(self) {}
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        self.shared.lock().closed = true;
        self.shared.wake();
    }
}

/// Consuming end. Clones share the same slot; a value is delivered to
/// whichever receiver takes it first.
pub struct Receiver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Receiver<T> {
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.shared.lock().take()
    }

    /// Waits until a value is published or the channel closes.
    pub fn recv(&self) -> Result<T, Closed> {
        let mut slot = self.shared.lock();
        loop {
            match slot.take() {
                Ok(value) => return Ok(value),
                Err(TryRecvError::Closed) => return Err(Closed),
                Err(TryRecvError::Empty) => {
                    slot = self
                        .shared
                        .ready
                        .wait(slot)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.shared.lock();
        loop {
            match slot.take() {
                Ok(value) => return Ok(value),
                Err(TryRecvError::Closed) => return Err(RecvTimeoutError::Closed),
                Err(TryRecvError::Empty) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(RecvTimeoutError::Timeout);
                    }
                    let (guard, _) = self
                        .shared
                        .ready
                        .wait_timeout(slot, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner);
                    slot = guard;
                }
            }
        }
    }

    pub async fn recv_async(&self) -> Result<T, Closed> {
        loop {
            // Registered before the slot is checked so a publish in between still wakes us.
            let notified = self.shared.notify.notified();
            match self.try_recv() {
                Ok(value) => return Ok(value),
                Err(TryRecvError::Closed) => return Err(Closed),
                Err(TryRecvError::Empty) => notified.await,
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}
