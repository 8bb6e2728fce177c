// Mod-log and welcome embeds. Descriptions are built as plain strings first so
// they can be checked without a gateway.

use crate::discord::embeds::{APPROVE_COLOR, DENY_COLOR, INFO_COLOR};
use poise::serenity_prelude::{self as serenity, CreateEmbed, CreateEmbedFooter};

/// Audit-log entries older than this are not tied to a gateway event.
pub const AUDIT_MATCH_WINDOW_SECS: i64 = 5;

/// Something the mod log records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    MemberJoined {
        user_id: u64,
        account_created: i64,
    },
    MemberLeft {
        user_id: u64,
        member_count: Option<u64>,
    },
    MemberKicked {
        user_id: u64,
    },
    MemberBanned {
        user_id: u64,
    },
    MessageDeleted {
        channel_id: u64,
        author_id: Option<u64>,
        content: Option<String>,
    },
    ChannelCreated {
        channel_id: u64,
        name: String,
    },
}

/// Who did it, from the guild audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moderator {
    pub id: u64,
    pub reason: Option<String>,
}

/// Escape markdown so user text cannot restyle the log.
pub fn cleanse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '_' | '~' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn audit_title(event: &AuditEvent) -> &'static str {
    match event {
        AuditEvent::MemberJoined { .. } => "Member Joined",
        AuditEvent::MemberLeft { .. } => "Member Left",
        AuditEvent::MemberKicked { .. } => "Member Kicked",
        AuditEvent::MemberBanned { .. } => "Member Banned",
        AuditEvent::MessageDeleted { .. } => "Message Deleted",
        AuditEvent::ChannelCreated { .. } => "Channel Created",
    }
}

/// The id shown in the footer: the affected user, author or channel.
pub fn audit_subject(event: &AuditEvent) -> Option<u64> {
    match event {
        AuditEvent::MemberJoined { user_id, .. }
        | AuditEvent::MemberLeft { user_id, .. }
        | AuditEvent::MemberKicked { user_id }
        | AuditEvent::MemberBanned { user_id } => Some(*user_id),
        AuditEvent::MessageDeleted { author_id, .. } => *author_id,
        AuditEvent::ChannelCreated { channel_id, .. } => Some(*channel_id),
    }
}

pub fn audit_description(event: &AuditEvent, moderator: Option<&Moderator>) -> String {
    let mut lines = match event {
        AuditEvent::MemberJoined {
            user_id,
            account_created,
        } => vec![
            format!("<@{}> joined the server.", user_id),
            format!("Account created <t:{}:R>.", account_created),
        ],
        AuditEvent::MemberLeft {
            user_id,
            member_count,
        } => {
            let mut lines = vec![format!("<@{}> left the server.", user_id)];
            if let Some(count) = member_count {
                lines.push(format!("There are now **{}** members.", count));
            }
            lines
        }
        AuditEvent::MemberKicked { user_id } => vec![
            format!("**<@{}> was kicked from the server.**", user_id),
            String::new(),
            "### ID".to_string(),
            format!("```{}```", user_id),
        ],
        AuditEvent::MemberBanned { user_id } => vec![
            format!("**<@{}> was banned from the server.**", user_id),
            String::new(),
            "### ID".to_string(),
            format!("```{}```", user_id),
        ],
        AuditEvent::MessageDeleted {
            channel_id,
            author_id,
            content,
        } => {
            let mut lines = vec![match author_id {
                Some(author) => format!(
                    "**Message sent by <@{}> deleted in <#{}>.**",
                    author, channel_id
                ),
                None => format!("**A message was deleted in <#{}>.**", channel_id),
            }];
            if let Some(content) = content.as_deref().filter(|c| !c.is_empty()) {
                lines.push(String::new());
                lines.push("### Content".to_string());
                lines.push(format!("```{}```", cleanse(content)));
            }
            lines
        }
        AuditEvent::ChannelCreated { name, .. } => {
            vec!["### Channel Created".to_string(), format!("`{}`", cleanse(name))]
        }
    };

    if let Some(moderator) = moderator {
        lines.push("### Responsible Moderator".to_string());
        lines.push(format!("<@{}>", moderator.id));
        if let Some(reason) = moderator.reason.as_deref().filter(|r| !r.is_empty()) {
            lines.push("### Reason".to_string());
            lines.push(format!("```{}```", cleanse(reason)));
        }
    }

    lines.join("\n")
}

fn audit_color(event: &AuditEvent) -> u32 {
    match event {
        AuditEvent::MemberJoined { .. } | AuditEvent::ChannelCreated { .. } => APPROVE_COLOR,
        AuditEvent::MemberLeft { .. } => INFO_COLOR,
        _ => DENY_COLOR,
    }
}

pub fn audit_embed(event: &AuditEvent, moderator: Option<&Moderator>) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(audit_title(event))
        .description(audit_description(event, moderator))
        .color(audit_color(event))
        .timestamp(serenity::Timestamp::now());
    if let Some(subject) = audit_subject(event) {
        embed = embed.footer(CreateEmbedFooter::new(format!("ID: {}", subject)));
    }
    embed
}

pub fn welcome_description(user_id: u64, guild_name: &str) -> String {
    format!(
        "Welcome to {}, <@{}>!\nWe are so happy to have you here!",
        cleanse(guild_name),
        user_id
    )
}

pub fn welcome_embed(user_id: u64, user_name: &str, guild_name: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("Welcome, {}!", user_name))
        .description(welcome_description(user_id, guild_name))
        .color(INFO_COLOR)
        .timestamp(serenity::Timestamp::now())
        .footer(CreateEmbedFooter::new(format!("ID: {}", user_id)))
}
