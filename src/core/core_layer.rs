// Core layer - platform-agnostic bot logic.

#[path = "dispatch/mod.rs"]
pub mod dispatch;
