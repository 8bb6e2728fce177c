// Gateway event listeners: presence on ready, a welcome message for new members,
// and a mod-log audit trail of member and moderation activity.

pub mod formatter;

use crate::config::BotConfig;
use crate::core::dispatch::{Error, EventDescriptor, EventKind, EventListener, EventRegistry};
use ::serenity::model::guild::audit_log::{Action, ChannelAction, MemberAction};
use async_trait::async_trait;
use chrono::Utc;
use formatter::{AUDIT_MATCH_WINDOW_SECS, AuditEvent, Moderator, audit_embed, welcome_embed};
use poise::serenity_prelude as serenity;

/// What listeners receive: the serenity context plus the raw event.
pub struct GatewayEvent {
    pub ctx: serenity::Context,
    pub event: serenity::FullEvent,
}

/// Listener kind of a gateway event, `None` for events nobody listens to.
pub fn event_kind(event: &serenity::FullEvent) -> Option<EventKind> {
    match event {
        serenity::FullEvent::Ready { .. } => Some(EventKind::Ready),
        serenity::FullEvent::GuildMemberAddition { .. } => Some(EventKind::MemberJoin),
        serenity::FullEvent::GuildMemberRemoval { .. } => Some(EventKind::MemberLeave),
        serenity::FullEvent::MessageDelete { .. } => Some(EventKind::MessageDelete),
        serenity::FullEvent::ChannelCreate { .. } => Some(EventKind::ChannelCreate),
        serenity::FullEvent::GuildBanAddition { .. } => Some(EventKind::BanAdd),
        _ => None,
    }
}

pub struct ReadyListener;

#[async_trait]
impl EventListener<GatewayEvent> for ReadyListener {
    async fn handle(&self, event: &GatewayEvent) -> Result<(), Error> {
        let serenity::FullEvent::Ready { data_about_bot } = &event.event else {
            return Ok(());
        };

        let activity = serenity::ActivityData::watching("for /help");
        event
            .ctx
            .set_presence(Some(activity), serenity::OnlineStatus::Online);

        tracing::info!(
            user = %data_about_bot.user.name,
            guilds = data_about_bot.guilds.len(),
            "Logged in and ready"
        );
        Ok(())
    }
}

/// Latest audit-log entry for `action`, if a moderator other than the bot made
/// it within the last few seconds. Missing audit-log access yields `None`.
async fn recent_moderator(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    action: Action,
    target: Option<u64>,
) -> Option<Moderator> {
    let logs = match guild_id
        .audit_logs(&ctx.http, Some(action), None, None, Some(1))
        .await
    {
        Ok(logs) => logs,
        Err(e) => {
            tracing::debug!(guild_id = guild_id.get(), "Audit log unavailable: {}", e);
            return None;
        }
    };

    let entry = logs.entries.into_iter().next()?;
    if entry.user_id == ctx.cache.current_user().id {
        return None;
    }
    let age_secs = Utc::now().timestamp() - entry.id.created_at().unix_timestamp();
    if age_secs > AUDIT_MATCH_WINDOW_SECS {
        return None;
    }
    if let Some(target) = target {
        if entry.target_id.map(|id| id.get()) != Some(target) {
            return None;
        }
    }

    Some(Moderator {
        id: entry.user_id.get(),
        reason: entry.reason,
    })
}

/// Posts audit embeds to the mod-log channel. Without one it only logs.
pub struct AuditTrail {
    pub mod_log: Option<serenity::ChannelId>,
}

impl AuditTrail {
    async fn post(
        &self,
        ctx: &serenity::Context,
        event: AuditEvent,
        moderator: Option<Moderator>,
    ) -> Result<(), Error> {
        let Some(channel) = self.mod_log else {
            return Ok(());
        };
        channel
            .send_message(
                &ctx.http,
                serenity::CreateMessage::new().embed(audit_embed(&event, moderator.as_ref())),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EventListener<GatewayEvent> for AuditTrail {
    async fn handle(&self, event: &GatewayEvent) -> Result<(), Error> {
        let ctx = &event.ctx;
        match &event.event {
            serenity::FullEvent::GuildMemberAddition { new_member } => {
                tracing::info!(
                    guild_id = new_member.guild_id.get(),
                    user_id = new_member.user.id.get(),
                    user = %new_member.user.name,
                    "Member joined"
                );
                let audit = AuditEvent::MemberJoined {
                    user_id: new_member.user.id.get(),
                    account_created: new_member.user.id.created_at().unix_timestamp(),
                };
                self.post(ctx, audit, None).await?;
            }
            serenity::FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
                tracing::info!(
                    guild_id = guild_id.get(),
                    user_id = user.id.get(),
                    user = %user.name,
                    "Member left"
                );
                if self.mod_log.is_none() {
                    return Ok(());
                }

                let target = Some(user.id.get());
                let kicked =
                    recent_moderator(ctx, *guild_id, Action::Member(MemberAction::Kick), target)
                        .await;
                let (audit, moderator) = match kicked {
                    Some(moderator) => (
                        AuditEvent::MemberKicked {
                            user_id: user.id.get(),
                        },
                        Some(moderator),
                    ),
                    None => match recent_moderator(
                        ctx,
                        *guild_id,
                        Action::Member(MemberAction::BanAdd),
                        target,
                    )
                    .await
                    {
                        Some(moderator) => (
                            AuditEvent::MemberBanned {
                                user_id: user.id.get(),
                            },
                            Some(moderator),
                        ),
                        None => {
                            let member_count = ctx
                                .cache
                                .guild(*guild_id)
                                .map(|guild| guild.member_count);
                            (
                                AuditEvent::MemberLeft {
                                    user_id: user.id.get(),
                                    member_count,
                                },
                                None,
                            )
                        }
                    },
                };
                self.post(ctx, audit, moderator).await?;
            }
            serenity::FullEvent::MessageDelete {
                channel_id,
                deleted_message_id,
                guild_id,
                ..
            } => {
                tracing::info!(
                    guild_id = ?guild_id.map(|id| id.get()),
                    channel_id = channel_id.get(),
                    message_id = deleted_message_id.get(),
                    "Message deleted"
                );
                if guild_id.is_none() {
                    return Ok(());
                }

                // Cache refs are not Send, so copy out before any await
                let cached = ctx
                    .cache
                    .message(*channel_id, *deleted_message_id)
                    .map(|message| {
                        (
                            message.author.id.get(),
                            message.author.bot,
                            message.content.clone(),
                        )
                    });
                if matches!(cached, Some((_, true, _))) {
                    return Ok(());
                }

                let (author_id, content) = match cached {
                    Some((author, _, content)) => (Some(author), Some(content)),
                    None => (None, None),
                };
                let audit = AuditEvent::MessageDeleted {
                    channel_id: channel_id.get(),
                    author_id,
                    content,
                };
                self.post(ctx, audit, None).await?;
            }
            serenity::FullEvent::ChannelCreate { channel } => {
                tracing::info!(
                    guild_id = channel.guild_id.get(),
                    channel_id = channel.id.get(),
                    channel = %channel.name,
                    "Channel created"
                );
                if self.mod_log.is_none() {
                    return Ok(());
                }

                // Channels the bot or an integration made are not worth a log entry.
                let Some(moderator) = recent_moderator(
                    ctx,
                    channel.guild_id,
                    Action::Channel(ChannelAction::Create),
                    Some(channel.id.get()),
                )
                .await
                else {
                    return Ok(());
                };
                let audit = AuditEvent::ChannelCreated {
                    channel_id: channel.id.get(),
                    name: channel.name.clone(),
                };
                self.post(ctx, audit, Some(moderator)).await?;
            }
            serenity::FullEvent::GuildBanAddition {
                guild_id,
                banned_user,
                ..
            } => {
                tracing::warn!(
                    guild_id = guild_id.get(),
                    user_id = banned_user.id.get(),
                    user = %banned_user.name,
                    "Member banned"
                );
                if self.mod_log.is_none() {
                    return Ok(());
                }

                let Some(moderator) = recent_moderator(
                    ctx,
                    *guild_id,
                    Action::Member(MemberAction::BanAdd),
                    Some(banned_user.id.get()),
                )
                .await
                else {
                    return Ok(());
                };
                let audit = AuditEvent::MemberBanned {
                    user_id: banned_user.id.get(),
                };
                self.post(ctx, audit, Some(moderator)).await?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// Greets new human members in the welcome channel, or the guild's system
/// channel when none is configured.
pub struct Welcome {
    pub channel: Option<serenity::ChannelId>,
}

#[async_trait]
impl EventListener<GatewayEvent> for Welcome {
    async fn handle(&self, event: &GatewayEvent) -> Result<(), Error> {
        let serenity::FullEvent::GuildMemberAddition { new_member } = &event.event else {
            return Ok(());
        };
        if new_member.user.bot {
            return Ok(());
        }

        let ctx = &event.ctx;
        let (guild_name, system_channel) = ctx
            .cache
            .guild(new_member.guild_id)
            .map(|guild| (guild.name.clone(), guild.system_channel_id))
            .unwrap_or_else(|| ("the server".to_string(), None));

        let Some(channel) = self.channel.or(system_channel) else {
            tracing::debug!(
                guild_id = new_member.guild_id.get(),
                "No welcome channel, skipping greeting"
            );
            return Ok(());
        };

        let embed = welcome_embed(
            new_member.user.id.get(),
            &new_member.user.name,
            &guild_name,
        );
        channel
            .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }
}

pub fn build_event_registry(config: &BotConfig) -> EventRegistry<GatewayEvent> {
    let audit = || AuditTrail {
        mod_log: config.mod_log_channel.map(serenity::ChannelId::new),
    };

    EventRegistry::new()
        .register(EventDescriptor::once("ready", EventKind::Ready), ReadyListener)
        .register(
            EventDescriptor::on("welcome", EventKind::MemberJoin),
            Welcome {
                channel: config.welcome_channel.map(serenity::ChannelId::new),
            },
        )
        .register(
            EventDescriptor::on("member-join-audit", EventKind::MemberJoin),
            audit(),
        )
        .register(
            EventDescriptor::on("member-leave-audit", EventKind::MemberLeave),
            audit(),
        )
        .register(
            EventDescriptor::on("message-delete-audit", EventKind::MessageDelete),
            audit(),
        )
        .register(
            EventDescriptor::on("channel-create-audit", EventKind::ChannelCreate),
            audit(),
        )
        .register(EventDescriptor::on("ban-audit", EventKind::BanAdd), audit())
}
