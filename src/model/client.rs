use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Outbound frames a connection may have queued before sends start failing.
pub const OUTBOUND_CAPACITY: usize = 64;

/// One encoded frame. Clones share the same buffer, so every recipient of a
/// broadcast gets the bytes that were encoded once.
pub type Frame = Utf8Bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    /// Allocates a process-unique id.
    pub fn next() -> ClientId {
        static ID_COUNTER: AtomicU64 = AtomicU64::new(0);
        ClientId(ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Deref for ClientId {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("outbound queue is full")]
    Full,
    #[error("connection is closed")]
    Closed,
}

/// The hub's handle to one live WebSocket.
///
/// Frames go into a bounded queue that the connection task drains onto the
/// socket. The handle holds no timer state.
#[derive(Debug, Clone)]
pub struct ClientConnection {
    pub id: ClientId,
    tx: mpsc::Sender<Frame>,
}

impl ClientConnection {
    pub fn new(id: ClientId, tx: mpsc::Sender<Frame>) -> ClientConnection {
        ClientConnection { id, tx }
    }

    /// Creates a handle together with the receiving end of its queue.
    pub fn channel(id: ClientId) -> (ClientConnection, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        (ClientConnection::new(id, tx), rx)
    }

    /// False once the connection task has gone away.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queues a frame without waiting.
    pub fn send(&self, frame: Frame) -> Result<(), SendError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => SendError::Full,
            TrySendError::Closed(_) => SendError::Closed,
        })
    }
}
