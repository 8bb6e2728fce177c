// Moderation commands. Permission and guild checks happen in the dispatcher,
// these bodies only do the Discord work.

use crate::core::dispatch::{CommandContext, CommandHandler, Error, Interaction, Reply};
use crate::discord::interaction::DiscordInteraction;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;


/// Discord refuses to bulk delete anything older than this.
const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60;
pub const MAX_PURGE: i64 = 100;
/// Six hours, Discord's upper limit.
pub const MAX_SLOWMODE_SECS: i64 = 21_600;

/// Guild-only commands never reach their body from a DM.
pub(crate) fn guild_of(interaction: &DiscordInteraction) -> Result<serenity::GuildId, Error> {
    interaction
        .guild_id()
        .ok_or_else(|| "guild-only command invoked outside a guild".into())
}

pub struct Purge;

#[async_trait]
impl CommandHandler<DiscordInteraction> for Purge {
    async fn run(&self, ctx: CommandContext<'_, DiscordInteraction>) -> Result<(), Error> {
        let interaction = ctx.interaction;
        guild_of(interaction)?;

        let amount = interaction
            .integer_option("amount")
            .unwrap_or(1)
            .clamp(1, MAX_PURGE) as u8;

        interaction.defer(true).await?;

        let serenity_ctx = interaction.serenity_context();
        let channel_id = interaction.channel_id();
        let cutoff = chrono::Utc::now().timestamp() - BULK_DELETE_MAX_AGE_SECS;

        let recent: Vec<serenity::Message> = channel_id
            .messages(serenity_ctx, serenity::GetMessages::new().limit(amount))
            .await?
            .into_iter()
            .filter(|message| message.timestamp.unix_timestamp() > cutoff)
            .collect();

        match recent.len() {
            0 => {}
            1 => channel_id.delete_message(&serenity_ctx.http, recent[0].id).await?,
            _ => channel_id.delete_messages(&serenity_ctx.http, &recent).await?,
        }

        tracing::info!(
            actor_id = interaction.actor_id(),
            channel_id = channel_id.get(),
            requested = amount,
            deleted = recent.len(),
            "Purged messages"
        );

        let text = match recent.len() {
            0 => "There were no recent messages to delete.".to_string(),
            1 => "Deleted 1 message.".to_string(),
            n => format!("Deleted {} messages.", n),
        };
        interaction.follow_up(Reply::approve(text).ephemeral()).await?;
        Ok(())
    }
}

pub struct Slowmode;

#[async_trait]
impl CommandHandler<DiscordInteraction> for Slowmode {
    async fn run(&self, ctx: CommandContext<'_, DiscordInteraction>) -> Result<(), Error> {
        let interaction = ctx.interaction;
        guild_of(interaction)?;

        let seconds = interaction
            .integer_option("seconds")
            .unwrap_or(0)
            .clamp(0, MAX_SLOWMODE_SECS) as u16;

        interaction
            .channel_id()
            .edit(
                interaction.serenity_context(),
                serenity::EditChannel::new().rate_limit_per_user(seconds),
            )
            .await?;

        let text = if seconds == 0 {
            "Slowmode disabled.".to_string()
        } else {
            format!("Slowmode set to {} second(s).", seconds)
        };
        interaction.reply(Reply::approve(text)).await?;
        Ok(())
    }
}

pub struct Kick;

#[async_trait]
impl CommandHandler<DiscordInteraction> for Kick {
    async fn run(&self, ctx: CommandContext<'_, DiscordInteraction>) -> Result<(), Error> {
        let interaction = ctx.interaction;
        let guild_id = guild_of(interaction)?;

        let Some(target) = interaction.user_option("member") else {
            interaction
                .reply(Reply::deny("You must choose a member to kick.").ephemeral())
                .await?;
            return Ok(());
        };

        if target.get() == interaction.actor_id() {
            interaction
                .reply(Reply::deny("You cannot kick yourself.").ephemeral())
                .await?;
            return Ok(());
        }

        let reason = interaction
            .string_option("reason")
            .unwrap_or("No reason provided");

        guild_id
            .kick_with_reason(&interaction.serenity_context().http, target, reason)
            .await?;

        tracing::info!(
            actor_id = interaction.actor_id(),
            guild_id = guild_id.get(),
            target_id = target.get(),
            reason,
            "Kicked member"
        );

        interaction
            .reply(Reply::approve(format!("Kicked <@{}>. Reason: {}", target.get(), reason)))
            .await?;
        Ok(())
    }
}
