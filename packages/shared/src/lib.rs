//! Shared utilities for the classchat workspace.

pub mod logger;
pub mod time;
