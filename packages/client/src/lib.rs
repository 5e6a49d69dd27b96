//! CLI chat client for classchat material and direct rooms.

pub mod domain;
pub mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use domain::RoomSelector;
pub use runner::run_client;
