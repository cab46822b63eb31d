//! Event fan-out to connected clients.

use tracing::{debug, warn};

use crate::model::{
    client::{ClientConnection, Frame},
    event::Event,
    registry::Registry,
};

fn encode(event: &Event) -> Option<Frame> {
    match event.encode() {
        Ok(json) => Some(Frame::from(json)),
        Err(e) => {
            warn!(?event, error = %e, "failed to serialize event");
            None
        }
    }
}

/// Sends one event to every open connection in the registry.
///
/// The event is encoded once and the same frame is shared by all recipients.
/// A failed send is logged and skipped so the remaining recipients still get
/// the frame. Returns how many connections accepted it.
pub fn propagate(event: &Event, registry: &Registry) -> usize {
    let Some(frame) = encode(event) else {
        return 0;
    };

    let mut delivered = 0;
    registry.for_each(|conn| match conn.send(frame.clone()) {
        Ok(()) => delivered += 1,
        Err(e) => warn!(client = %conn.id, error = %e, "failed to send event to client"),
    });

    debug!(?event, delivered, registered = registry.len(), "broadcast event");
    delivered
}

/// Sends one event to a single connection.
pub fn unicast(event: &Event, conn: &ClientConnection) -> bool {
    let Some(frame) = encode(event) else {
        return false;
    };

    match conn.send(frame) {
        Ok(()) => true,
        Err(e) => {
            warn!(client = %conn.id, error = %e, "failed to send event to client");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::client::ClientId;
    use tokio::sync::mpsc;

    fn registered(registry: &mut Registry) -> mpsc::Receiver<Frame> {
        let (conn, rx) = ClientConnection::channel(ClientId::next());
        registry.add(conn);
        rx
    }

    #[test]
    fn every_open_connection_receives() {
        let mut registry = Registry::new();
        let mut rx1 = registered(&mut registry);
        let mut rx2 = registered(&mut registry);

        assert_eq!(propagate(&Event::Stop, &registry), 2);
        assert_eq!(rx1.try_recv().unwrap().as_str(), r#"{"type":"stop"}"#);
        assert_eq!(rx2.try_recv().unwrap().as_str(), r#"{"type":"stop"}"#);
    }

    #[test]
    fn frame_is_encoded_once_and_shared() {
        let mut registry = Registry::new();
        let mut rx1 = registered(&mut registry);
        let mut rx2 = registered(&mut registry);

        propagate(&Event::Reset, &registry);

        let a = rx1.try_recv().unwrap();
        let b = rx2.try_recv().unwrap();
        assert_eq!(a.as_str(), b.as_str());
        assert_eq!(a.as_str().as_ptr(), b.as_str().as_ptr());
    }

    #[test]
    fn full_recipient_does_not_block_others() {
        let mut registry = Registry::new();

        let (tx, mut stuck_rx) = mpsc::channel(1);
        let stuck = ClientConnection::new(ClientId::next(), tx);
        stuck.send(Frame::from("pending".to_owned())).unwrap();
        registry.add(stuck);
        let mut healthy_rx = registered(&mut registry);

        assert_eq!(propagate(&Event::Reset, &registry), 1);
        assert_eq!(healthy_rx.try_recv().unwrap().as_str(), r#"{"type":"reset"}"#);
        assert_eq!(stuck_rx.try_recv().unwrap().as_str(), "pending");
        assert!(stuck_rx.try_recv().is_err());
    }

    #[test]
    fn closed_recipient_is_skipped() {
        let mut registry = Registry::new();
        drop(registered(&mut registry));
        let mut rx = registered(&mut registry);

        assert_eq!(propagate(&Event::Stop, &registry), 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn empty_registry_is_fine() {
        assert_eq!(propagate(&Event::Reset, &Registry::new()), 0);
    }

    #[test]
    fn unicast_reaches_only_target() {
        let mut registry = Registry::new();
        let mut other_rx = registered(&mut registry);
        let (conn, mut rx) = ClientConnection::channel(ClientId::next());

        let event = Event::Start {
            start_time: 10,
            timestamp: 20,
        };
        assert!(unicast(&event, &conn));
        assert_eq!(Event::decode(rx.try_recv().unwrap().as_str()).unwrap(), event);
        assert!(other_rx.try_recv().is_err());
    }
}
