//! WebSocket / HTTP server implementation.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Collaborators, Server};
