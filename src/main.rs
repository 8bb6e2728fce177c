// Entry point of the community bot.
//
// **Architecture Overview:**
// - `core/` = dispatch logic (registry, permission gate, cooldowns, paginator)
// - `infra/` = implementations of core storage traits
// - `discord/` = serenity/poise adapters (interaction, commands, events)
// - `config/` = environment-driven settings
//
// This file loads configuration, wires the services together and hands every
// gateway event to either the dispatcher or the event registry.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "config/bot_config.rs"]
mod config;
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::config::{BotConfig, CooldownBackend};
use crate::core::dispatch::{CooldownTracker, Dispatcher, SystemClock};
use crate::discord::commands::build_registry;
use crate::discord::deploy::deploy_commands;
use crate::discord::events::{build_event_registry, event_kind};
use crate::discord::{Data, DiscordInteraction, Error, GatewayEvent};
use crate::infra::cooldowns::{InMemoryCooldownStore, SqliteCooldownStore};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Instant;

/// Routes slash commands to the dispatcher and everything else to the
/// event registry.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Command(command),
        } => {
            let interaction = DiscordInteraction::new(ctx.clone(), command.clone());
            let outcome = data.dispatcher.dispatch(&interaction).await;
            tracing::debug!(
                command = %command.data.name,
                actor_id = command.user.id.get(),
                ?outcome,
                "Dispatch finished"
            );
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => {
            // Paginator presses are picked up by their collectors
            tracing::debug!(custom_id = %component.data.custom_id, "Component interaction received");
        }
        other => {
            if let Some(kind) = event_kind(other) {
                if data.events.has_listeners(kind) {
                    let gateway_event = GatewayEvent {
                        ctx: ctx.clone(),
                        event: other.clone(),
                    };
                    data.events.emit(kind, &gateway_event).await;
                }
            }
        }
    }
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        // Commands are resolved by our own registry, not poise's
        poise::FrameworkError::UnknownInteraction { .. } => {}
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling framework error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = Arc::new(BotConfig::from_env()?);
    std::fs::create_dir_all(&config.data_dir)?;
    let started_at = Instant::now();

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let registry = Arc::new(build_registry(&config, started_at));

    let cooldowns = match config.cooldown_backend {
        CooldownBackend::Memory => CooldownTracker::new(InMemoryCooldownStore::new()),
        CooldownBackend::Sqlite => {
            let path = config.cooldown_db_path();
            let store = SqliteCooldownStore::new(&path.to_string_lossy()).await?;
            tracing::info!("Persisting cooldowns to {}", path.display());
            CooldownTracker::new(store)
        }
    };

    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        cooldowns,
        config.dispatch_policy(),
        Arc::new(SystemClock),
    ));

    let data = Data {
        dispatcher,
        events: Arc::new(build_event_registry(&config)),
        config: Arc::clone(&config),
    };

    if config.dev.override_permissions {
        tracing::warn!(
            privileged = config.dev.users.len(),
            guild_id = ?config.dev.guild_id,
            "Developer mode active, commands are restricted"
        );
    }

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MODERATION
        | serenity::GatewayIntents::GUILD_MESSAGES;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            // Slash commands are deployed and dispatched by our own registry
            commands: vec![],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, _framework| {
            Box::pin(async move {
                deploy_commands(&ctx.http, data.dispatcher.registry(), &data.config).await;
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await?;

    client.start().await?;
    Ok(())
}
