//! Data Transfer Objects (DTOs) for the chat subsystem.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event codec
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
