// Dispatcher - runs one inbound interaction through the check sequence.
//
// Order (a later step never runs once an earlier one has terminated):
// 1. bot can see/talk in the channel (silent abort otherwise)
// 2. command exists
// 3. developer mode allow-list
// 4. DMs skip steps 5 and 7
// 5. developer mode guild restriction
// 6. subcommand exists
// 7. permission gate (actor, then bot)
// 7b. guild-only commands refuse DMs
// 8. cooldown
// 9. run the handler inside the failure boundary (errors and panics)
//
// `dispatch` never returns an error: every exit is a reply, a log line, or both.

use super::clock::Clock;
use super::cooldown::{CooldownTracker, format_cooldown};
use super::handler_models::{CapabilitySet, HandlerDescriptor};
use super::interaction::{Interaction, Reply};
use super::permissions::{
    Party, baseline_agent_capabilities, check_actor, check_agent, denial_message,
};
use super::registry::{CommandContext, Handler, Registry};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

pub const OUTDATED_COMMAND: &str = "This command is outdated. Please try again.";
pub const OUTDATED_SUBCOMMAND: &str = "This subcommand is outdated. Please try again.";
pub const DEVELOPER_MODE: &str = "The bot is currently in developer mode.";
pub const WRONG_CONTEXT: &str = "That command cannot be used here!";
pub const HANDLER_FAILED: &str = "There was an error executing this command.";
pub const GUILD_ONLY: &str = "This command can only be used in a server.";

/// Execution restrictions supplied by configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Restrict execution to `privileged_actors` inside `restricted_context`.
    pub override_permissions: bool,
    pub privileged_actors: HashSet<u64>,
    pub restricted_context: Option<u64>,
}

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The bot cannot respond in this channel, nothing was sent.
    Aborted,
    CommandNotFound,
    ModeRestricted,
    ContextRestricted,
    SubcommandNotFound,
    PermissionDenied {
        party: Party,
        missing: CapabilitySet,
    },
    /// A guild-only command was invoked in a DM.
    GuildOnly,
    CooldownActive {
        remaining_millis: u64,
    },
    Completed,
    HandlerFailed,
}

pub struct Dispatcher<I: Interaction> {
    registry: Arc<Registry<I>>,
    cooldowns: CooldownTracker,
    policy: DispatchPolicy,
    clock: Arc<dyn Clock>,
}

impl<I: Interaction> Dispatcher<I> {
    pub fn new(
        registry: Arc<Registry<I>>,
        cooldowns: CooldownTracker,
        policy: DispatchPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            cooldowns,
            policy,
            clock,
        }
    }

    pub fn registry(&self) -> &Registry<I> {
        &self.registry
    }

    pub async fn dispatch(&self, interaction: &I) -> DispatchOutcome {
        let actor_id = interaction.actor_id();
        let context_id = interaction.context_id();
        let command_name = interaction.command_name();

        if context_id.is_some() {
            let baseline = check_agent(
                &interaction.agent_capabilities(),
                &baseline_agent_capabilities(),
            );
            if !baseline.allowed {
                tracing::debug!(
                    actor_id,
                    guild_id = ?context_id,
                    command = %command_name,
                    missing = %baseline.missing.to_code_list(),
                    "Cannot respond in this channel, dropping interaction"
                );
                return DispatchOutcome::Aborted;
            }
        }

        let Some(command) = self.registry.resolve(command_name) else {
            tracing::debug!(actor_id, command = %command_name, "Unknown command invoked");
            self.send(interaction, Reply::deny(OUTDATED_COMMAND).ephemeral())
                .await;
            return DispatchOutcome::CommandNotFound;
        };

        if self.policy.override_permissions && !self.policy.privileged_actors.contains(&actor_id)
        {
            self.send(interaction, Reply::deny(DEVELOPER_MODE)).await;
            return DispatchOutcome::ModeRestricted;
        }

        if let Some(context_id) = context_id {
            if self.policy.override_permissions
                && self.policy.restricted_context != Some(context_id)
            {
                self.send(interaction, Reply::deny(WRONG_CONTEXT)).await;
                return DispatchOutcome::ContextRestricted;
            }
        }

        let subcommand = match interaction.subcommand_name() {
            Some(sub) => match self.registry.resolve_subcommand(command_name, sub) {
                Some(handler) => Some(handler),
                None => {
                    tracing::debug!(
                        actor_id,
                        command = %command_name,
                        subcommand = %sub,
                        "Unknown subcommand invoked"
                    );
                    self.send(interaction, Reply::deny(OUTDATED_SUBCOMMAND).ephemeral())
                        .await;
                    return DispatchOutcome::SubcommandNotFound;
                }
            },
            None => None,
        };

        // Permissions only exist inside a guild.
        if context_id.is_some() {
            let mut gated = vec![command.descriptor()];
            if let Some(sub) = subcommand {
                gated.push(sub.descriptor());
            }
            for descriptor in gated {
                if let Some(denied) = self.check_permissions(interaction, descriptor).await {
                    return denied;
                }
            }
        }

        let handler = subcommand.unwrap_or(command);
        let descriptor = handler.descriptor();

        if context_id.is_none() && (command.descriptor().guild_only || descriptor.guild_only) {
            self.send(interaction, Reply::deny(GUILD_ONLY).ephemeral()).await;
            return DispatchOutcome::GuildOnly;
        }

        if descriptor.cooldown_millis != 0 {
            let now = self.clock.now_millis();
            match self
                .cooldowns
                .check(
                    actor_id,
                    &descriptor.qualified_name(),
                    descriptor.cooldown_millis,
                    now,
                )
                .await
            {
                Ok(check) if !check.allowed => {
                    let text = format!(
                        "You must wait another `{}` before using that command.",
                        format_cooldown(check.remaining_millis)
                    );
                    self.send(interaction, Reply::deny(text).ephemeral()).await;
                    return DispatchOutcome::CooldownActive {
                        remaining_millis: check.remaining_millis,
                    };
                }
                Ok(_) => {}
                Err(e) => {
                    // Fail open: a broken store should not lock everyone out.
                    tracing::error!(
                        actor_id,
                        command = %descriptor.qualified_name(),
                        "Cooldown store failed, allowing invocation: {}",
                        e
                    );
                }
            }
        }

        self.invoke(interaction, handler).await
    }

    /// Actor first, then the bot. `None` means both sides pass.
    async fn check_permissions(
        &self,
        interaction: &I,
        descriptor: &HandlerDescriptor,
    ) -> Option<DispatchOutcome> {
        let actor = check_actor(
            &interaction.actor_capabilities(),
            &descriptor.required_actor_capabilities,
        );
        if !actor.allowed {
            return Some(self.deny(interaction, Party::Actor, actor.missing).await);
        }

        let agent = check_agent(
            &interaction.agent_capabilities(),
            &descriptor.required_agent_capabilities,
        );
        if !agent.allowed {
            return Some(self.deny(interaction, Party::Agent, agent.missing).await);
        }

        None
    }

    async fn deny(&self, interaction: &I, party: Party, missing: CapabilitySet) -> DispatchOutcome {
        self.send(
            interaction,
            Reply::deny(denial_message(party, &missing)).ephemeral(),
        )
        .await;
        DispatchOutcome::PermissionDenied { party, missing }
    }

    async fn invoke(&self, interaction: &I, handler: &Handler<I>) -> DispatchOutcome {
        let descriptor = handler.descriptor();
        let qualified = descriptor.qualified_name();

        match interaction.context_id() {
            Some(guild_id) => tracing::debug!(
                actor_id = interaction.actor_id(),
                guild_id,
                command = %qualified,
                "Running command"
            ),
            None => tracing::debug!(
                actor_id = interaction.actor_id(),
                command = %qualified,
                "Running command outside of a guild"
            ),
        }

        let ctx = CommandContext {
            interaction,
            registry: self.registry.as_ref(),
            descriptor,
        };

        let result = AssertUnwindSafe(handler.behavior().run(ctx))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(())) => return DispatchOutcome::Completed,
            Ok(Err(e)) => {
                tracing::error!(
                    actor_id = interaction.actor_id(),
                    command = %qualified,
                    error = ?e,
                    "Error executing command: {}",
                    e
                );
            }
            Err(payload) => {
                tracing::error!(
                    actor_id = interaction.actor_id(),
                    command = %qualified,
                    "Command panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }

        let reply = Reply::deny(HANDLER_FAILED).ephemeral();
        let sent = if interaction.has_responded() {
            interaction.follow_up(reply).await
        } else {
            interaction.reply(reply).await
        };
        if let Err(e) = sent {
            tracing::warn!(command = %qualified, "Failed to report command error: {}", e);
        }

        DispatchOutcome::HandlerFailed
    }

    async fn send(&self, interaction: &I, reply: Reply) {
        if let Err(e) = interaction.reply(reply).await {
            tracing::warn!(
                actor_id = interaction.actor_id(),
                command = %interaction.command_name(),
                "Failed to send dispatch reply: {}",
                e
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::handler_models::Capability;
    use crate::core::dispatch::registry::RegistryBuilder;
    use crate::core::dispatch::test_support::{
        Counting, Failing, ManualClock, MemoryCooldowns, MockInteraction, Panicking, Sent,
    };

    const GUILD: u64 = 500;
    const DEV_GUILD: u64 = 900;

    struct Fixture {
        dispatcher: Dispatcher<MockInteraction>,
        clock: Arc<ManualClock>,
        ping: Counting,
        kick: Counting,
        info_user: Counting,
        slowmode: Counting,
    }

    fn fixture(policy: DispatchPolicy) -> Fixture {
        let ping = Counting::default();
        let kick = Counting::default();
        let info_user = Counting::default();
        let slowmode = Counting::default();

        let registry = RegistryBuilder::new()
            .command(
                HandlerDescriptor::command("ping", "View ping statistics."),
                ping.clone(),
            )
            .command(
                HandlerDescriptor::command("kick", "Kick a member")
                    .both_require(Capability::KickMembers)
                    .cooldown_millis(5_000),
                kick.clone(),
            )
            .command(HandlerDescriptor::command("info", "Information"), Counting::default())
            .subcommand(
                HandlerDescriptor::subcommand("info", "user", "User info")
                    .actor_requires(Capability::ModerateMembers)
                    .cooldown_millis(1_000),
                info_user.clone(),
            )
            .command(
                HandlerDescriptor::command("slowmode", "Set slowmode")
                    .guild_only()
                    .cooldown_millis(10_000),
                slowmode.clone(),
            )
            .command(HandlerDescriptor::command("server", "Server tools"), Counting::default())
            .subcommand(
                HandlerDescriptor::subcommand("server", "stats", "Server stats").guild_only(),
                Counting::default(),
            )
            .command(
                HandlerDescriptor::command("explode", "Panics"),
                Panicking { defer_first: false },
            )
            .command(
                HandlerDescriptor::command("explode-late", "Defers then panics"),
                Panicking { defer_first: true },
            )
            .command(
                HandlerDescriptor::command("broken", "Always fails"),
                Failing { defer_first: false },
            )
            .command(
                HandlerDescriptor::command("deferred", "Defers then fails"),
                Failing { defer_first: true },
            )
            .build();

        let clock = Arc::new(ManualClock::new(1_000_000));
        let dispatcher = Dispatcher::new(
            Arc::new(registry),
            CooldownTracker::new(MemoryCooldowns::default()),
            policy,
            clock.clone(),
        );

        Fixture {
            dispatcher,
            clock,
            ping,
            kick,
            info_user,
            slowmode,
        }
    }

    fn dev_policy() -> DispatchPolicy {
        DispatchPolicy {
            override_permissions: true,
            privileged_actors: HashSet::from([1]),
            restricted_context: Some(DEV_GUILD),
        }
    }

    fn kicker() -> CapabilitySet {
        CapabilitySet::from([Capability::KickMembers])
    }

    fn bot_with(extra: Capability) -> CapabilitySet {
        CapabilitySet::from([Capability::ViewChannel, Capability::SendMessages, extra])
    }

    #[tokio::test]
    async fn ping_in_dm_runs_once_and_replies_once() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "ping");

        let outcome = f.dispatcher.dispatch(&interaction).await;

        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(f.ping.calls(), 1);
        assert_eq!(interaction.sent(), vec![Sent::Reply(Reply::info("pong"))]);
    }

    #[tokio::test]
    async fn kick_without_permission_is_denied() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "kick")
            .in_guild(GUILD)
            .agent_grants(bot_with(Capability::KickMembers));

        let outcome = f.dispatcher.dispatch(&interaction).await;

        assert_eq!(
            outcome,
            DispatchOutcome::PermissionDenied {
                party: Party::Actor,
                missing: kicker(),
            }
        );
        assert_eq!(f.kick.calls(), 0);
        assert!(interaction.single_text().contains("`KickMembers`"));
        match &interaction.sent()[0] {
            Sent::Reply(reply) => assert!(reply.ephemeral),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn bot_missing_permission_is_reported_separately() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "kick")
            .in_guild(GUILD)
            .actor_grants(kicker());

        let outcome = f.dispatcher.dispatch(&interaction).await;

        assert_eq!(
            outcome,
            DispatchOutcome::PermissionDenied {
                party: Party::Agent,
                missing: kicker(),
            }
        );
        assert!(interaction.single_text().starts_with("I am missing"));
        assert_eq!(f.kick.calls(), 0);
    }

    #[tokio::test]
    async fn permission_denial_does_not_consume_cooldown() {
        let f = fixture(DispatchPolicy::default());

        let denied = MockInteraction::new(1, "kick")
            .in_guild(GUILD)
            .agent_grants(bot_with(Capability::KickMembers));
        assert!(matches!(
            f.dispatcher.dispatch(&denied).await,
            DispatchOutcome::PermissionDenied { .. }
        ));

        // Same actor, now holding the permission, immediately after
        let allowed = MockInteraction::new(1, "kick")
            .in_guild(GUILD)
            .actor_grants(kicker())
            .agent_grants(bot_with(Capability::KickMembers));
        assert_eq!(
            f.dispatcher.dispatch(&allowed).await,
            DispatchOutcome::Completed
        );
        assert_eq!(f.kick.calls(), 1);
    }

    #[tokio::test]
    async fn cooldown_blocks_second_invocation_until_window_passes() {
        let f = fixture(DispatchPolicy::default());
        let make = || {
            MockInteraction::new(1, "kick")
                .in_guild(GUILD)
                .actor_grants(kicker())
                .agent_grants(bot_with(Capability::KickMembers))
        };

        assert_eq!(f.dispatcher.dispatch(&make()).await, DispatchOutcome::Completed);

        f.clock.advance(std::time::Duration::from_millis(750));
        let blocked = make();
        assert_eq!(
            f.dispatcher.dispatch(&blocked).await,
            DispatchOutcome::CooldownActive {
                remaining_millis: 4_250
            }
        );
        assert_eq!(
            blocked.single_text(),
            "You must wait another `4.250s` before using that command."
        );

        f.clock.advance(std::time::Duration::from_millis(4_250));
        assert_eq!(f.dispatcher.dispatch(&make()).await, DispatchOutcome::Completed);
        assert_eq!(f.kick.calls(), 2);
    }

    #[tokio::test]
    async fn cooldown_applies_outside_guilds_too() {
        let f = fixture(DispatchPolicy::default());

        // No permission checks in DMs, but the window still holds.
        assert_eq!(
            f.dispatcher.dispatch(&MockInteraction::new(3, "kick")).await,
            DispatchOutcome::Completed
        );
        assert!(matches!(
            f.dispatcher.dispatch(&MockInteraction::new(3, "kick")).await,
            DispatchOutcome::CooldownActive { .. }
        ));
    }

    #[tokio::test]
    async fn unknown_command_replies_outdated() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "removed");

        assert_eq!(
            f.dispatcher.dispatch(&interaction).await,
            DispatchOutcome::CommandNotFound
        );
        assert_eq!(interaction.single_text(), OUTDATED_COMMAND);
    }

    #[tokio::test]
    async fn unknown_subcommand_replies_outdated() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "info").subcommand("weather");

        assert_eq!(
            f.dispatcher.dispatch(&interaction).await,
            DispatchOutcome::SubcommandNotFound
        );
        assert_eq!(interaction.single_text(), OUTDATED_SUBCOMMAND);
    }

    #[tokio::test]
    async fn subcommand_is_gated_and_invoked() {
        let f = fixture(DispatchPolicy::default());

        let denied = MockInteraction::new(1, "info")
            .in_guild(GUILD)
            .subcommand("user");
        assert_eq!(
            f.dispatcher.dispatch(&denied).await,
            DispatchOutcome::PermissionDenied {
                party: Party::Actor,
                missing: CapabilitySet::from([Capability::ModerateMembers]),
            }
        );

        let allowed = MockInteraction::new(1, "info")
            .in_guild(GUILD)
            .subcommand("user")
            .actor_grants(CapabilitySet::from([Capability::ModerateMembers]));
        assert_eq!(
            f.dispatcher.dispatch(&allowed).await,
            DispatchOutcome::Completed
        );
        assert_eq!(f.info_user.calls(), 1);
    }

    #[tokio::test]
    async fn subcommand_cooldown_uses_qualified_name() {
        let f = fixture(DispatchPolicy::default());
        let make = || MockInteraction::new(4, "info").subcommand("user");

        assert_eq!(f.dispatcher.dispatch(&make()).await, DispatchOutcome::Completed);
        assert!(matches!(
            f.dispatcher.dispatch(&make()).await,
            DispatchOutcome::CooldownActive {
                remaining_millis: 1_000
            }
        ));
    }

    #[tokio::test]
    async fn missing_baseline_aborts_silently() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "ping")
            .in_guild(GUILD)
            .agent_grants(CapabilitySet::from([Capability::ViewChannel]));

        assert_eq!(
            f.dispatcher.dispatch(&interaction).await,
            DispatchOutcome::Aborted
        );
        assert!(interaction.sent().is_empty());
        assert_eq!(f.ping.calls(), 0);
    }

    #[tokio::test]
    async fn abort_runs_before_lookup() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "removed")
            .in_guild(GUILD)
            .agent_grants(CapabilitySet::new());

        assert_eq!(
            f.dispatcher.dispatch(&interaction).await,
            DispatchOutcome::Aborted
        );
        assert!(interaction.sent().is_empty());
    }

    #[tokio::test]
    async fn developer_mode_rejects_unlisted_actors() {
        let f = fixture(dev_policy());
        let interaction = MockInteraction::new(2, "ping");

        assert_eq!(
            f.dispatcher.dispatch(&interaction).await,
            DispatchOutcome::ModeRestricted
        );
        assert_eq!(interaction.single_text(), DEVELOPER_MODE);
        assert_eq!(f.ping.calls(), 0);
    }

    #[tokio::test]
    async fn developer_mode_restricts_guild() {
        let f = fixture(dev_policy());

        let elsewhere = MockInteraction::new(1, "ping").in_guild(GUILD);
        assert_eq!(
            f.dispatcher.dispatch(&elsewhere).await,
            DispatchOutcome::ContextRestricted
        );
        assert_eq!(elsewhere.single_text(), WRONG_CONTEXT);

        let home = MockInteraction::new(1, "ping").in_guild(DEV_GUILD);
        assert_eq!(
            f.dispatcher.dispatch(&home).await,
            DispatchOutcome::Completed
        );

        let dm = MockInteraction::new(1, "ping");
        assert_eq!(f.dispatcher.dispatch(&dm).await, DispatchOutcome::Completed);
        assert_eq!(f.ping.calls(), 2);
    }

    #[tokio::test]
    async fn unknown_command_is_reported_before_mode_check() {
        let f = fixture(dev_policy());
        let interaction = MockInteraction::new(2, "removed");

        assert_eq!(
            f.dispatcher.dispatch(&interaction).await,
            DispatchOutcome::CommandNotFound
        );
    }

    #[tokio::test]
    async fn handler_failure_gets_fresh_reply() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "broken");

        assert_eq!(
            f.dispatcher.dispatch(&interaction).await,
            DispatchOutcome::HandlerFailed
        );
        assert_eq!(
            interaction.sent(),
            vec![Sent::Reply(Reply::deny(HANDLER_FAILED).ephemeral())]
        );
    }

    #[tokio::test]
    async fn handler_failure_after_defer_uses_follow_up() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "deferred");

        assert_eq!(
            f.dispatcher.dispatch(&interaction).await,
            DispatchOutcome::HandlerFailed
        );
        assert_eq!(
            interaction.sent(),
            vec![
                Sent::Defer { ephemeral: false },
                Sent::FollowUp(Reply::deny(HANDLER_FAILED).ephemeral()),
            ]
        );
    }

    #[tokio::test]
    async fn failure_does_not_affect_later_dispatches() {
        let f = fixture(DispatchPolicy::default());

        f.dispatcher
            .dispatch(&MockInteraction::new(1, "broken"))
            .await;
        assert_eq!(
            f.dispatcher.dispatch(&MockInteraction::new(1, "ping")).await,
            DispatchOutcome::Completed
        );
    }

    #[tokio::test]
    async fn handler_panic_is_reported_like_a_failure() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "explode");

        assert_eq!(
            f.dispatcher.dispatch(&interaction).await,
            DispatchOutcome::HandlerFailed
        );
        assert_eq!(
            interaction.sent(),
            vec![Sent::Reply(Reply::deny(HANDLER_FAILED).ephemeral())]
        );
    }

    #[tokio::test]
    async fn handler_panic_after_defer_uses_follow_up() {
        let f = fixture(DispatchPolicy::default());
        let interaction = MockInteraction::new(1, "explode-late");

        assert_eq!(
            f.dispatcher.dispatch(&interaction).await,
            DispatchOutcome::HandlerFailed
        );
        assert_eq!(
            interaction.sent(),
            vec![
                Sent::Defer { ephemeral: false },
                Sent::FollowUp(Reply::deny(HANDLER_FAILED).ephemeral()),
            ]
        );

        // The dispatcher keeps working after a panic
        assert_eq!(
            f.dispatcher.dispatch(&MockInteraction::new(1, "ping")).await,
            DispatchOutcome::Completed
        );
    }

    #[tokio::test]
    async fn guild_only_command_in_dm_is_refused_without_consuming_cooldown() {
        let f = fixture(DispatchPolicy::default());
        let dm = MockInteraction::new(1, "slowmode");

        assert_eq!(f.dispatcher.dispatch(&dm).await, DispatchOutcome::GuildOnly);
        assert_eq!(dm.sent(), vec![Sent::Reply(Reply::deny(GUILD_ONLY).ephemeral())]);
        assert_eq!(f.slowmode.calls(), 0);

        // The 10 s window was never opened, so the guild call goes straight through
        let in_guild = MockInteraction::new(1, "slowmode").in_guild(GUILD);
        assert_eq!(
            f.dispatcher.dispatch(&in_guild).await,
            DispatchOutcome::Completed
        );
        assert_eq!(f.slowmode.calls(), 1);
    }

    #[tokio::test]
    async fn guild_only_subcommand_is_refused_in_dm() {
        let f = fixture(DispatchPolicy::default());
        let dm = MockInteraction::new(1, "server").subcommand("stats");

        assert_eq!(f.dispatcher.dispatch(&dm).await, DispatchOutcome::GuildOnly);
        assert_eq!(dm.single_text(), GUILD_ONLY);
    }
}
