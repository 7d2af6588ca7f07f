//! Multi-room chat relay library.
//!
//! Clients create or join rooms over HTTP and exchange messages, typing and
//! presence events over one WebSocket per member. All state lives in memory
//! for the lifetime of the process.

pub mod config;

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
