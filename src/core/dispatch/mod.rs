// Core dispatch module - routes inbound command interactions to handlers.
// Same layout as the other core features: models, ports, services.

pub mod clock;
pub mod cooldown;
pub mod dispatcher;
pub mod events;
pub mod handler_models;
pub mod interaction;
pub mod paginator;
pub mod permissions;
pub mod registry;

#[cfg(test)]
pub mod test_support;

pub use clock::*;
pub use cooldown::*;
pub use dispatcher::*;
pub use events::*;
pub use handler_models::*;
pub use interaction::*;
pub use paginator::*;
pub use permissions::*;
pub use registry::*;

/// Error type returned by handler behaviors and event listeners.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
