//! Inputs delivered from connection tasks to the hub
//!
//! Connection tasks never touch the timer or the registry themselves. They
//! describe what happened on their socket, and the hub applies these inputs
//! one at a time in arrival order.

use crate::model::client::{ClientConnection, ClientId};

#[derive(Debug)]
pub enum Input {
    /// A WebSocket finished its upgrade and can receive frames.
    Connected(ClientConnection),

    /// A text frame arrived from a client.
    Message(ClientId, String),

    /// The socket closed or failed. Sent once per connection.
    Disconnected(ClientId),
}
