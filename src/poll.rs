//! Periodic status polling against the backend.

pub mod runner;

pub use runner::StatusPoller;
