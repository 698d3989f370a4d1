//! Rendering: snapshot projection and the raw-payload inspector.

pub mod engine;
pub mod inspector;

pub use engine::{max_sensor_value, RenderEngine};
pub use inspector::DebugInspector;
