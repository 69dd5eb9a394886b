//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (DOM key names to held directions and latched commands)

pub mod input;

pub use input::KeyState;
