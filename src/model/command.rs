//! Inbound client commands and their decoder

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A request from a client to change the shared timer.
///
/// Commands carry no timestamp, the server stamps them when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Stop,
    Reset,
}

/// Why an inbound payload was not turned into a [`Command`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("payload has no `type` field")]
    MissingType,

    #[error("unrecognized command type: {0}")]
    UnknownType(String),
}

impl Command {
    /// Decodes one text frame such as `{"type":"start"}`.
    ///
    /// Fields other than `type` are ignored.
    pub fn decode(text: &str) -> Result<Command, DecodeError> {
        let value: Value = serde_json::from_str(text).map_err(DecodeError::Malformed)?;
        let tag = value.get("type").ok_or(DecodeError::MissingType)?;

        Command::deserialize(tag).map_err(|_| {
            let shown = match tag {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            DecodeError::UnknownType(shown)
        })
    }

    /// The wire form sent by clients, used by the watch client.
    pub fn encode(&self) -> String {
        serde_json::json!({ "type": self }).to_string()
    }
}

impl std::str::FromStr for Command {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::deserialize(Value::String(s.to_owned()))
            .map_err(|_| DecodeError::UnknownType(s.to_owned()))
    }
}
