//! Client runtime for fan-control dashboards.
//!
//! Polls a backend's `/status` endpoint on a fixed cadence, normalizes
//! whatever comes back into a fully-populated snapshot, renders it onto an
//! abstract set of named controls, and dispatches PWM writes with
//! single-flight guarding and legacy-route fallback.

pub mod api;
pub mod app;
pub mod config;
pub mod control;
pub mod poll;
pub mod render;
pub mod status;
pub mod ui;
