use crate::core::dispatch::{
    CommandContext, CommandHandler, Error, Interaction, Reply, format_cooldown,
};
use crate::discord::commands::moderation::guild_of;
use crate::discord::embeds::info_embed;
use crate::discord::interaction::DiscordInteraction;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::time::Instant;

fn relative_time(timestamp: serenity::Timestamp) -> String {
    format!("<t:{}:R>", timestamp.unix_timestamp())
}

/// `/info` itself. Discord always sends a subcommand, so this only lists them.
pub struct InfoRoot;

#[async_trait]
impl CommandHandler<DiscordInteraction> for InfoRoot {
    async fn run(&self, ctx: CommandContext<'_, DiscordInteraction>) -> Result<(), Error> {
        let subcommands: Vec<String> = ctx
            .registry
            .commands()
            .find(|c| c.handler().descriptor().name == ctx.descriptor.name)
            .map(|c| {
                c.subcommands()
                    .map(|sub| format!("`/{}`", sub.descriptor().qualified_name()))
                    .collect()
            })
            .unwrap_or_default();

        ctx.interaction
            .reply(Reply::info(format!("Try one of: {}", subcommands.join(", "))).ephemeral())
            .await?;
        Ok(())
    }
}

pub struct InfoUser;

#[async_trait]
impl CommandHandler<DiscordInteraction> for InfoUser {
    async fn run(&self, ctx: CommandContext<'_, DiscordInteraction>) -> Result<(), Error> {
        let interaction = ctx.interaction;
        let serenity_ctx = interaction.serenity_context();
        let target = interaction
            .user_option("user")
            .unwrap_or_else(|| serenity::UserId::new(interaction.actor_id()));

        let user = target.to_user(serenity_ctx).await?;

        let mut embed = info_embed(format!("👤 {}", user.tag()))
            .thumbnail(user.face())
            .field("ID", user.id.get().to_string(), true)
            .field("Bot", if user.bot { "Yes" } else { "No" }, true)
            .field("Account created", relative_time(target.created_at()), true);

        if let Some(guild_id) = interaction.guild_id() {
            if let Ok(member) = guild_id.member(serenity_ctx, target).await {
                if let Some(joined_at) = member.joined_at {
                    embed = embed.field("Joined server", relative_time(joined_at), true);
                }
                embed = embed.field("Roles", member.roles.len().to_string(), true);
            }
        }

        interaction.respond_embed(embed, false).await?;
        Ok(())
    }
}

pub struct InfoServer;

#[async_trait]
impl CommandHandler<DiscordInteraction> for InfoServer {
    async fn run(&self, ctx: CommandContext<'_, DiscordInteraction>) -> Result<(), Error> {
        let interaction = ctx.interaction;
        let serenity_ctx = interaction.serenity_context();
        let guild_id = guild_of(interaction)?;

        // Cache refs are not Send, so copy out before any await
        let cached = serenity_ctx.cache.guild(guild_id).map(|guild| {
            (
                guild.name.clone(),
                Some(guild.member_count),
                Some(guild.channels.len()),
                guild.roles.len(),
                guild.owner_id,
            )
        });

        let (name, members, channels, roles, owner_id) = match cached {
            Some(summary) => summary,
            None => {
                let guild = guild_id.to_partial_guild(serenity_ctx).await?;
                (
                    guild.name,
                    guild.approximate_member_count,
                    None,
                    guild.roles.len(),
                    guild.owner_id,
                )
            }
        };

        let unknown = || "unknown".to_string();
        let embed = info_embed(format!("🏰 {}", name))
            .field("Owner", format!("<@{}>", owner_id.get()), true)
            .field("Members", members.map(|n| n.to_string()).unwrap_or_else(unknown), true)
            .field("Channels", channels.map(|n| n.to_string()).unwrap_or_else(unknown), true)
            .field("Roles", roles.to_string(), true)
            .field("Created", relative_time(guild_id.created_at()), true);

        interaction.respond_embed(embed, false).await?;
        Ok(())
    }
}

pub struct InfoBot {
    pub started_at: Instant,
}

#[async_trait]
impl CommandHandler<DiscordInteraction> for InfoBot {
    async fn run(&self, ctx: CommandContext<'_, DiscordInteraction>) -> Result<(), Error> {
        let serenity_ctx = ctx.interaction.serenity_context();
        let uptime = self.started_at.elapsed().as_millis() as u64;

        let embed = info_embed("🤖 About this bot")
            .field("Version", env!("CARGO_PKG_VERSION"), true)
            .field("Uptime", format_cooldown(uptime), true)
            .field("Servers", serenity_ctx.cache.guild_count().to_string(), true)
            .field(
                "Commands",
                format!(
                    "{} ({} subcommands)",
                    ctx.registry.command_count(),
                    ctx.registry.total_subcommand_count()
                ),
                true,
            );

        ctx.interaction.respond_embed(embed, false).await?;
        Ok(())
    }
}
