//! Infrastructure layer: concrete implementations of the domain traits and
//! the wire formats.

pub mod auth;
pub mod dto;
pub mod registry;
pub mod repository;
