// Embed rendering for dispatch replies.

use crate::core::dispatch::{Reply, ReplyTone};
use poise::serenity_prelude as serenity;

pub const DENY_COLOR: u32 = 0xED4245;
pub const APPROVE_COLOR: u32 = 0x57F287;
pub const INFO_COLOR: u32 = 0x5865F2;

pub fn tone_color(tone: ReplyTone) -> u32 {
    match tone {
        ReplyTone::Deny => DENY_COLOR,
        ReplyTone::Approve => APPROVE_COLOR,
        ReplyTone::Info => INFO_COLOR,
    }
}

fn decorated(reply: &Reply) -> String {
    match reply.tone {
        ReplyTone::Deny => format!("❌ {}", reply.text),
        ReplyTone::Approve => format!("✅ {}", reply.text),
        ReplyTone::Info => reply.text.clone(),
    }
}

/// Single-line embed with the tone's marker and color.
pub fn reply_embed(reply: &Reply, actor_id: u64) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .description(decorated(reply))
        .color(tone_color(reply.tone))
        .footer(serenity::CreateEmbedFooter::new(format!("ID: {}", actor_id)))
}

/// Base embed for richer command output.
pub fn info_embed(title: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .color(INFO_COLOR)
        .timestamp(serenity::Timestamp::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_prefixes() {
        assert_eq!(decorated(&Reply::deny("No.")), "❌ No.");
        assert_eq!(decorated(&Reply::approve("Done.")), "✅ Done.");
        assert_eq!(decorated(&Reply::info("Hi.")), "Hi.");
    }

    #[test]
    fn tone_colors_differ() {
        assert_ne!(tone_color(ReplyTone::Deny), tone_color(ReplyTone::Approve));
        assert_ne!(tone_color(ReplyTone::Approve), tone_color(ReplyTone::Info));
    }
}
