// Slash command deployment: turns the registry into Discord command
// definitions and pushes them globally or to the dev guild.

use crate::config::{BotConfig, BotMode};
use crate::core::dispatch::{HandlerDescriptor, Registry};
use crate::discord::interaction::{DiscordInteraction, permissions_from};
use crate::discord::commands::moderation::{MAX_PURGE, MAX_SLOWMODE_SECS};
use poise::serenity_prelude as serenity;

/// Arguments of each handler, keyed by qualified name.
fn options_for(qualified_name: &str) -> Vec<serenity::CreateCommandOption> {
    use serenity::CommandOptionType as Kind;
    use serenity::CreateCommandOption as Opt;

    match qualified_name {
        "purge" => vec![
            Opt::new(Kind::Integer, "amount", "How many messages to delete")
                .required(true)
                .min_int_value(1)
                .max_int_value(MAX_PURGE as u64),
        ],
        "slowmode" => vec![
            Opt::new(Kind::Integer, "seconds", "Delay between messages, 0 to disable")
                .required(true)
                .min_int_value(0)
                .max_int_value(MAX_SLOWMODE_SECS as u64),
        ],
        "kick" => vec![
            Opt::new(Kind::User, "member", "The member to kick").required(true),
            Opt::new(Kind::String, "reason", "Shown in the audit log"),
        ],
        "info user" => vec![Opt::new(Kind::User, "user", "Defaults to you")],
        _ => vec![],
    }
}

fn subcommand_option(descriptor: &HandlerDescriptor) -> serenity::CreateCommandOption {
    options_for(&descriptor.qualified_name()).into_iter().fold(
        serenity::CreateCommandOption::new(
            serenity::CommandOptionType::SubCommand,
            &descriptor.name,
            &descriptor.description,
        ),
        |sub, option| sub.add_sub_option(option),
    )
}

pub fn command_manifest(registry: &Registry<DiscordInteraction>) -> Vec<serenity::CreateCommand> {
    registry
        .commands()
        .map(|command| {
            let descriptor = command.handler().descriptor();
            let mut create = serenity::CreateCommand::new(&descriptor.name)
                .description(&descriptor.description);

            // Hide the command from members who would be denied anyway
            if !descriptor.required_actor_capabilities.is_empty() {
                create = create.default_member_permissions(permissions_from(
                    &descriptor.required_actor_capabilities,
                ));
            }

            let mut has_subcommands = false;
            for sub in command.subcommands() {
                has_subcommands = true;
                create = create.add_option(subcommand_option(sub.descriptor()));
            }
            if !has_subcommands {
                for option in options_for(&descriptor.name) {
                    create = create.add_option(option);
                }
            }
            create
        })
        .collect()
}

/// Push the manifest. Failures are logged; the bot keeps serving whatever is
/// already deployed.
pub async fn deploy_commands(
    http: &serenity::Http,
    registry: &Registry<DiscordInteraction>,
    config: &BotConfig,
) {
    let manifest = command_manifest(registry);
    let count = manifest.len();

    let result = match (config.mode, config.dev.guild_id) {
        (BotMode::Prod, _) => serenity::Command::set_global_commands(http, manifest)
            .await
            .map(|_| "globally".to_string()),
        (BotMode::Dev, Some(guild_id)) => serenity::GuildId::new(guild_id)
            .set_commands(http, manifest)
            .await
            .map(|_| format!("to guild {}", guild_id)),
        (BotMode::Dev, None) => {
            tracing::warn!("Dev mode without DEV_GUILD_ID, skipping command deployment");
            return;
        }
    };

    match result {
        Ok(target) => tracing::info!("Deployed {} commands {}", count, target),
        Err(e) => tracing::error!("Failed to deploy commands: {}", e),
    }
}
