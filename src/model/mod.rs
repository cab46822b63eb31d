//! Data models for the shared timer
//!
//! This module contains the timer state machine, the wire types that flow in
//! and out of it, and the registry of connected clients.

pub mod client;
pub mod command;
pub mod event;
pub mod input;
pub mod registry;
pub mod timer;
