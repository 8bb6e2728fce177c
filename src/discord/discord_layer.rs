// Discord layer - serenity glue around the dispatch core.

#[path = "commands/command_catalog.rs"]
pub mod commands;
pub mod deploy;
pub mod embeds;
#[path = "events/listeners.rs"]
pub mod events;
pub mod interaction;
pub mod paginator;

use crate::config::BotConfig;
use crate::core::dispatch::{Dispatcher, EventRegistry};
use std::sync::Arc;

pub use crate::core::dispatch::Error;
pub use events::GatewayEvent;
pub use interaction::DiscordInteraction;

/// Shared state handed to every poise callback.
pub struct Data {
    pub dispatcher: Arc<Dispatcher<DiscordInteraction>>,
    pub events: Arc<EventRegistry<GatewayEvent>>,
    pub config: Arc<BotConfig>,
}
