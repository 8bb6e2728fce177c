use crate::core::dispatch::{
    CommandContext, CommandHandler, Error, HandlerDescriptor, Interaction, Registry,
    format_cooldown,
};
use crate::discord::embeds::info_embed;
use crate::discord::interaction::DiscordInteraction;
use crate::discord::paginator::run_paginator;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::collections::BTreeMap;
use std::time::Duration;

const CATEGORY_ORDER: &[&str] = &["guide", "misc", "moderation", "utility"];
const FALLBACK_CATEGORY: &str = "misc";

fn category_emoji(category: &str) -> &'static str {
    match category {
        "guide" => "📖",
        "misc" => "🎲",
        "moderation" => "🛡️",
        "utility" => "🧰",
        _ => "•",
    }
}

/// One help page: every command of a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpPage {
    pub category: String,
    pub lines: Vec<String>,
}

fn help_line(descriptor: &HandlerDescriptor) -> String {
    let mut line = format!("**/{}**: {}", descriptor.qualified_name(), descriptor.description);
    if !descriptor.required_actor_capabilities.is_empty() {
        line.push_str(&format!(
            "\n  Requires {}",
            descriptor.required_actor_capabilities.to_code_list()
        ));
    }
    if descriptor.cooldown_millis > 0 {
        line.push_str(&format!(
            "\n  Cooldown {}",
            format_cooldown(descriptor.cooldown_millis)
        ));
    }
    line
}

/// Group the registry into pages, known categories first.
pub fn help_pages<I: Interaction>(registry: &Registry<I>) -> Vec<HelpPage> {
    let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for command in registry.commands() {
        let descriptor = command.handler().descriptor();
        let category = if descriptor.category.is_empty() {
            FALLBACK_CATEGORY.to_string()
        } else {
            descriptor.category.clone()
        };

        let lines = categories.entry(category).or_default();
        lines.push(help_line(descriptor));
        for sub in command.subcommands() {
            lines.push(help_line(sub.descriptor()));
        }
    }

    let mut pages: Vec<HelpPage> = categories
        .into_iter()
        .map(|(category, lines)| HelpPage { category, lines })
        .collect();
    pages.sort_by_key(|page| {
        CATEGORY_ORDER
            .iter()
            .position(|c| *c == page.category)
            .unwrap_or(CATEGORY_ORDER.len())
    });
    pages
}

fn render(page: &HelpPage, number: usize, total: usize) -> serenity::CreateEmbed {
    info_embed(format!("{} {}", category_emoji(&page.category), page.category))
        .description(page.lines.join("\n"))
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{}",
            number, total
        )))
}

/// Browse the command list one category per page.
pub struct Help {
    pub idle_timeout: Duration,
}

#[async_trait]
impl CommandHandler<DiscordInteraction> for Help {
    async fn run(&self, ctx: CommandContext<'_, DiscordInteraction>) -> Result<(), Error> {
        let pages = help_pages(ctx.registry);
        let total = pages.len();
        let embeds = pages
            .iter()
            .enumerate()
            .map(|(i, page)| render(page, i + 1, total))
            .collect();

        run_paginator(ctx.interaction, embeds, self.idle_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::test_support::{MockInteraction, Noop};
    use crate::core::dispatch::{Capability, RegistryBuilder};

    #[test]
    fn pages_follow_category_order() {
        let registry: Registry<MockInteraction> = RegistryBuilder::new()
            .command(
                HandlerDescriptor::command("zeta", "Custom").category("zzz"),
                Noop,
            )
            .command(
                HandlerDescriptor::command("kick", "Kick a member")
                    .category("moderation")
                    .both_require(Capability::KickMembers)
                    .cooldown_millis(5_000),
                Noop,
            )
            .command(HandlerDescriptor::command("ping", "Pong"), Noop)
            .command(
                HandlerDescriptor::command("help", "This list").category("guide"),
                Noop,
            )
            .build();

        let pages = help_pages(&registry);
        let categories: Vec<&str> = pages.iter().map(|p| p.category.as_str()).collect();
        assert_eq!(categories, vec!["guide", "misc", "moderation", "zzz"]);

        assert_eq!(
            pages[2].lines,
            vec!["**/kick**: Kick a member\n  Requires `KickMembers`\n  Cooldown 5.000s".to_string()]
        );
    }

    #[test]
    fn subcommands_follow_their_parent() {
        let registry: Registry<MockInteraction> = RegistryBuilder::new()
            .command(
                HandlerDescriptor::command("info", "Information").category("utility"),
                Noop,
            )
            .subcommand(
                HandlerDescriptor::subcommand("info", "user", "About a user"),
                Noop,
            )
            .build();

        let pages = help_pages(&registry);
        assert_eq!(pages.len(), 1);
        assert_eq!(
            pages[0].lines,
            vec![
                "**/info**: Information".to_string(),
                "**/info user**: About a user".to_string(),
            ]
        );
    }
}
