//! Outbound state-change events
//!
//! Every event is sent as one JSON text frame with a `type` tag, e.g.
//! `{"type":"start","startTime":1700000000000,"timestamp":1700000000042}`.

use serde::{Deserialize, Serialize};

use crate::model::timer::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// The timer is running since `start_time`.
    ///
    /// `timestamp` is the server clock at send time, so receivers can
    /// estimate how far their own clock is off.
    Start {
        #[serde(rename = "startTime")]
        start_time: Millis,
        timestamp: Millis,
    },
    Stop,
    Reset,
}

impl Event {
    /// Serializes the event into its wire frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> Result<Event, serde_json::Error> {
        serde_json::from_str(text)
    }
}
