// Serenity-backed implementation of the dispatch core's Interaction port.

use crate::core::dispatch::{Capability, CapabilitySet, Interaction, Reply, ReplyError};
use crate::discord::embeds::reply_embed;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::atomic::{AtomicBool, Ordering};

const PERMISSION_MAP: [(Capability, serenity::Permissions); 13] = [
    (Capability::Administrator, serenity::Permissions::ADMINISTRATOR),
    (Capability::ViewChannel, serenity::Permissions::VIEW_CHANNEL),
    (Capability::SendMessages, serenity::Permissions::SEND_MESSAGES),
    (Capability::EmbedLinks, serenity::Permissions::EMBED_LINKS),
    (Capability::ReadMessageHistory, serenity::Permissions::READ_MESSAGE_HISTORY),
    (Capability::ManageMessages, serenity::Permissions::MANAGE_MESSAGES),
    (Capability::ManageChannels, serenity::Permissions::MANAGE_CHANNELS),
    (Capability::ManageGuild, serenity::Permissions::MANAGE_GUILD),
    (Capability::KickMembers, serenity::Permissions::KICK_MEMBERS),
    (Capability::BanMembers, serenity::Permissions::BAN_MEMBERS),
    (Capability::ModerateMembers, serenity::Permissions::MODERATE_MEMBERS),
    (Capability::Connect, serenity::Permissions::CONNECT),
    (Capability::Speak, serenity::Permissions::SPEAK),
];

pub fn capabilities_from(permissions: serenity::Permissions) -> CapabilitySet {
    PERMISSION_MAP
        .iter()
        .filter(|(_, flag)| permissions.contains(*flag))
        .map(|(capability, _)| *capability)
        .collect()
}

pub fn permissions_from(capabilities: &CapabilitySet) -> serenity::Permissions {
    PERMISSION_MAP
        .iter()
        .filter(|(capability, _)| capabilities.contains(*capability))
        .fold(serenity::Permissions::empty(), |acc, (_, flag)| acc | *flag)
}

/// The subcommand name, if the first option is a subcommand.
fn subcommand_of(data: &serenity::CommandData) -> Option<String> {
    data.options.first().and_then(|option| match &option.value {
        serenity::CommandDataOptionValue::SubCommand(_) => Some(option.name.clone()),
        _ => None,
    })
}

pub struct DiscordInteraction {
    ctx: serenity::Context,
    command: serenity::CommandInteraction,
    subcommand: Option<String>,
    responded: AtomicBool,
}

impl DiscordInteraction {
    pub fn new(ctx: serenity::Context, command: serenity::CommandInteraction) -> Self {
        let subcommand = subcommand_of(&command.data);
        Self {
            ctx,
            command,
            subcommand,
            responded: AtomicBool::new(false),
        }
    }

    pub fn serenity_context(&self) -> &serenity::Context {
        &self.ctx
    }

    pub fn command(&self) -> &serenity::CommandInteraction {
        &self.command
    }

    pub fn guild_id(&self) -> Option<serenity::GuildId> {
        self.command.guild_id
    }

    pub fn channel_id(&self) -> serenity::ChannelId {
        self.command.channel_id
    }

    /// Options of the invoked handler, looking inside the subcommand if any.
    fn options(&self) -> &[serenity::CommandDataOption] {
        match self.command.data.options.first().map(|o| &o.value) {
            Some(serenity::CommandDataOptionValue::SubCommand(inner)) => inner,
            _ => &self.command.data.options,
        }
    }

    fn option(&self, name: &str) -> Option<&serenity::CommandDataOptionValue> {
        self.options()
            .iter()
            .find(|o| o.name == name)
            .map(|o| &o.value)
    }

    pub fn integer_option(&self, name: &str) -> Option<i64> {
        self.option(name).and_then(|v| v.as_i64())
    }

    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(|v| v.as_str())
    }

    pub fn user_option(&self, name: &str) -> Option<serenity::UserId> {
        self.option(name).and_then(|v| v.as_user_id())
    }

    /// Claim the single initial response slot.
    pub(crate) fn claim_response(&self) -> Result<(), ReplyError> {
        if self.responded.swap(true, Ordering::SeqCst) {
            return Err(ReplyError::AlreadyResponded);
        }
        Ok(())
    }

    fn transport_failed(&self, error: serenity::Error) -> ReplyError {
        // Nothing reached Discord, so the slot is free again
        self.responded.store(false, Ordering::SeqCst);
        ReplyError::Transport(error.to_string())
    }

    pub async fn respond_embed(
        &self,
        embed: serenity::CreateEmbed,
        ephemeral: bool,
    ) -> Result<(), ReplyError> {
        self.claim_response()?;
        let message = serenity::CreateInteractionResponseMessage::new()
            .embed(embed)
            .ephemeral(ephemeral);
        self.command
            .create_response(&self.ctx, serenity::CreateInteractionResponse::Message(message))
            .await
            .map_err(|e| self.transport_failed(e))
    }

    pub async fn follow_up_embed(
        &self,
        embed: serenity::CreateEmbed,
        ephemeral: bool,
    ) -> Result<serenity::Message, ReplyError> {
        if !self.has_responded() {
            return Err(ReplyError::NotResponded);
        }
        let followup = serenity::CreateInteractionResponseFollowup::new()
            .embed(embed)
            .ephemeral(ephemeral);
        self.command
            .create_followup(&self.ctx, followup)
            .await
            .map_err(|e| ReplyError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Interaction for DiscordInteraction {
    fn actor_id(&self) -> u64 {
        self.command.user.id.get()
    }

    fn context_id(&self) -> Option<u64> {
        self.command.guild_id.map(|id| id.get())
    }

    fn command_name(&self) -> &str {
        &self.command.data.name
    }

    fn subcommand_name(&self) -> Option<&str> {
        self.subcommand.as_deref()
    }

    fn actor_capabilities(&self) -> CapabilitySet {
        self.command
            .member
            .as_ref()
            .and_then(|member| member.permissions)
            .map(capabilities_from)
            .unwrap_or_default()
    }

    fn agent_capabilities(&self) -> CapabilitySet {
        self.command
            .app_permissions
            .map(capabilities_from)
            .unwrap_or_default()
    }

    fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    async fn reply(&self, reply: Reply) -> Result<(), ReplyError> {
        let embed = reply_embed(&reply, self.actor_id());
        self.respond_embed(embed, reply.ephemeral).await
    }

    async fn defer(&self, ephemeral: bool) -> Result<(), ReplyError> {
        self.claim_response()?;
        let result = if ephemeral {
            self.command.defer_ephemeral(&self.ctx).await
        } else {
            self.command.defer(&self.ctx).await
        };
        result.map_err(|e| self.transport_failed(e))
    }

    async fn follow_up(&self, reply: Reply) -> Result<(), ReplyError> {
        let embed = reply_embed(&reply, self.actor_id());
        self.follow_up_embed(embed, reply.ephemeral).await?;
        Ok(())
    }
}
