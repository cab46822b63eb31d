//! The hub: one owner for the timer and the registry
//!
//! [`TimerService`] holds all shared state. It is moved into a single task
//! ([`run`]) that reads [`Input`]s off a channel and handles each one to
//! completion before reading the next, so state changes and the broadcasts
//! they cause are totally ordered.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::broadcast::{propagate, unicast};
use crate::model::{
    client::{ClientConnection, ClientId},
    command::Command,
    input::Input,
    registry::Registry,
    timer::{now_millis, Millis, Timer, TimerState},
};

/// Sending side used by connection tasks to reach the hub.
pub type HubHandle = UnboundedSender<Input>;

/// Where the service reads the time from.
pub type Clock = fn() -> Millis;

pub struct TimerService {
    timer: Timer,
    registry: Registry,
    clock: Clock,
}

impl Default for TimerService {
    fn default() -> Self {
        TimerService::new()
    }
}

impl TimerService {
    pub fn new() -> TimerService {
        TimerService::with_clock(now_millis)
    }

    pub fn with_clock(clock: Clock) -> TimerService {
        TimerService {
            timer: Timer::new(),
            registry: Registry::new(),
            clock,
        }
    }

    pub fn state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn connections(&self) -> usize {
        self.registry.len()
    }

    pub fn handle_input(&mut self, input: Input) {
        match input {
            Input::Connected(conn) => self.handle_connect(conn),
            Input::Message(id, text) => self.handle_message(id, &text),
            Input::Disconnected(id) => self.handle_disconnect(id),
        }
    }

    /// Brings the new client up to date, then makes it visible to broadcasts.
    ///
    /// The sync frame is queued before the connection joins the registry, so
    /// it always precedes any broadcast on that connection.
    fn handle_connect(&mut self, conn: ClientConnection) {
        info!(client = %conn.id, "client connected");

        if let Some(event) = self.timer.sync_event((self.clock)()) {
            debug!(client = %conn.id, ?event, "syncing late joiner");
            unicast(&event, &conn);
        }

        self.registry.add(conn);
    }

    fn handle_message(&mut self, id: ClientId, text: &str) {
        let command = match Command::decode(text) {
            Ok(command) => command,
            Err(e) => {
                warn!(client = %id, error = %e, "discarding message");
                return;
            }
        };

        let Some(event) = self.timer.apply_at(command, (self.clock)()) else {
            debug!(client = %id, ?command, "command had no effect");
            return;
        };

        match self.timer.state() {
            TimerState::Running { start_time } => info!(client = %id, start_time, "timer started"),
            TimerState::Idle => info!(client = %id, ?command, "timer idle"),
        }

        propagate(&event, &self.registry);
    }

    fn handle_disconnect(&mut self, id: ClientId) {
        if self.registry.remove(id) {
            info!(client = %id, remaining = self.registry.len(), "client disconnected");
        }
    }
}

/// Creates the hub channel.
pub fn channel() -> (HubHandle, UnboundedReceiver<Input>) {
    mpsc::unbounded_channel()
}

/// Drives the service until every [`HubHandle`] is dropped.
pub async fn run(mut service: TimerService, mut rx: UnboundedReceiver<Input>) {
    while let Some(input) = rx.recv().await {
        service.handle_input(input);
    }
    debug!("hub channel closed");
}
