use crate::core::dispatch::{CommandContext, CommandHandler, Error, Interaction, format_cooldown};
use crate::discord::embeds::info_embed;
use crate::discord::interaction::DiscordInteraction;
use async_trait::async_trait;
use std::time::Instant;

/// Uptime plus the round trip of acknowledging the interaction.
pub struct Ping {
    pub started_at: Instant,
}

#[async_trait]
impl CommandHandler<DiscordInteraction> for Ping {
    async fn run(&self, ctx: CommandContext<'_, DiscordInteraction>) -> Result<(), Error> {
        let sent_at = Instant::now();
        ctx.interaction.defer(false).await?;
        let round_trip = sent_at.elapsed();

        let uptime = self.started_at.elapsed().as_millis() as u64;
        let embed = info_embed("🏓 Pong!")
            .field("Round trip", format!("{} ms", round_trip.as_millis()), true)
            .field("Uptime", format_cooldown(uptime), true);

        ctx.interaction.follow_up_embed(embed, false).await?;
        Ok(())
    }
}
