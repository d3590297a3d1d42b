//! Hosted backend adapters (REST tables and object storage).

pub mod client;
pub mod dto;

pub use client::BackendClient;
