//! A shared stopwatch kept in sync across every connected WebSocket client.
//!
//! Clients send `start`, `stop` and `reset` commands. The server applies them
//! to one authoritative timer and broadcasts each real change to everyone,
//! and brings late joiners up to date when they connect.

pub mod broadcast;
pub mod client;
pub mod config;
pub mod connection;
pub mod model;
pub mod server;
pub mod service;
pub mod util;
