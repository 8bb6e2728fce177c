// Discord commands module.
// Each command group gets its own file; `build_registry` is the one place that
// lists them all.

pub mod help;
pub mod info;
pub mod moderation;
pub mod ping;

use crate::config::BotConfig;
use crate::core::dispatch::{Capability, HandlerDescriptor, Registry, RegistryBuilder};
use crate::discord::interaction::DiscordInteraction;
use std::time::Instant;

pub fn build_registry(config: &BotConfig, started_at: Instant) -> Registry<DiscordInteraction> {
    RegistryBuilder::new()
        .command(
            HandlerDescriptor::command("ping", "View the bot's latency and uptime.")
                .category("misc"),
            ping::Ping { started_at },
        )
        .command(
            HandlerDescriptor::command("help", "Browse every command by category.")
                .category("guide"),
            help::Help {
                idle_timeout: config.paginator_timeout,
            },
        )
        .command(
            HandlerDescriptor::command("purge", "Bulk delete recent messages in this channel.")
                .category("moderation")
                .guild_only()
                .both_require(Capability::ManageMessages)
                .agent_requires(Capability::ReadMessageHistory),
            moderation::Purge,
        )
        .command(
            HandlerDescriptor::command("slowmode", "Set the slowmode delay for this channel.")
                .category("moderation")
                .guild_only()
                .both_require(Capability::ManageChannels),
            moderation::Slowmode,
        )
        .command(
            HandlerDescriptor::command("kick", "Kick a member from the server.")
                .category("moderation")
                .guild_only()
                .both_require(Capability::KickMembers)
                .cooldown_millis(5_000),
            moderation::Kick,
        )
        .command(
            HandlerDescriptor::command("info", "Information about users, the server or the bot.")
                .category("utility"),
            info::InfoRoot,
        )
        .subcommand(
            HandlerDescriptor::subcommand("info", "user", "Show details about a user.")
                .cooldown_millis(3_000),
            info::InfoUser,
        )
        .subcommand(
            HandlerDescriptor::subcommand("info", "server", "Show details about this server.")
                .guild_only()
                .cooldown_millis(3_000),
            info::InfoServer,
        )
        .subcommand(
            HandlerDescriptor::subcommand("info", "bot", "Show details about the bot."),
            info::InfoBot { started_at },
        )
        .build()
}
