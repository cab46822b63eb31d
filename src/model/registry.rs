//! The live set of connected clients

use std::collections::HashMap;

use crate::model::client::{ClientConnection, ClientId};

#[derive(Debug, Default)]
pub struct Registry {
    connections: HashMap<ClientId, ClientConnection>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Registers a connection. It takes part in the next broadcast.
    pub fn add(&mut self, connection: ClientConnection) {
        self.connections.insert(connection.id, connection);
    }

    /// Deregisters a connection. Returns whether it was present, so removing
    /// twice is harmless.
    pub fn remove(&mut self, id: ClientId) -> bool {
        self.connections.remove(&id).is_some()
    }

    /// Visits every connection that is still open. Connections whose task
    /// already ended, but which were not yet removed, are skipped.
    pub fn for_each(&self, f: impl FnMut(&ClientConnection)) {
        self.connections.values().filter(|c| c.is_open()).for_each(f);
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
