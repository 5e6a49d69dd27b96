//! Real-time chat server for classroom materials and direct messages.
//!
//! Clients connect over WebSocket to a material room or a direct room,
//! authenticate with a bearer token, and exchange chat messages, typing
//! indicators and read receipts. Chat messages are stored before anyone
//! sees them.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
