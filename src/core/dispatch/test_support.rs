// Test doubles shared by the dispatch tests.

use super::Error;
use super::clock::Clock;
use super::cooldown::CooldownCheck;
use super::handler_models::{Capability, CapabilitySet};
use super::interaction::{Interaction, Reply, ReplyError};
use super::registry::{CommandContext, CommandHandler};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Reply(Reply),
    Defer { ephemeral: bool },
    FollowUp(Reply),
}

/// Interaction that records everything sent through it.
pub struct MockInteraction {
    actor_id: u64,
    context_id: Option<u64>,
    command: String,
    subcommand: Option<String>,
    actor_caps: CapabilitySet,
    agent_caps: CapabilitySet,
    responded: AtomicBool,
    sent: Mutex<Vec<Sent>>,
}

impl MockInteraction {
    /// A DM invocation (no guild).
    pub fn new(actor_id: u64, command: &str) -> Self {
        Self {
            actor_id,
            context_id: None,
            command: command.to_string(),
            subcommand: None,
            actor_caps: CapabilitySet::new(),
            agent_caps: CapabilitySet::new(),
            responded: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Invoke inside a guild where the bot can see and talk in the channel.
    pub fn in_guild(mut self, guild_id: u64) -> Self {
        self.context_id = Some(guild_id);
        self.agent_caps.insert(Capability::ViewChannel);
        self.agent_caps.insert(Capability::SendMessages);
        self
    }

    pub fn subcommand(mut self, name: &str) -> Self {
        self.subcommand = Some(name.to_string());
        self
    }

    pub fn actor_grants(mut self, caps: CapabilitySet) -> Self {
        self.actor_caps = caps;
        self
    }

    pub fn agent_grants(mut self, caps: CapabilitySet) -> Self {
        self.agent_caps = caps;
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Text of the only message sent, panicking otherwise.
    pub fn single_text(&self) -> String {
        let sent = self.sent();
        assert_eq!(sent.len(), 1, "expected exactly one message, got {:?}", sent);
        match &sent[0] {
            Sent::Reply(r) | Sent::FollowUp(r) => r.text.clone(),
            Sent::Defer { .. } => panic!("only a defer was sent"),
        }
    }
}

#[async_trait]
impl Interaction for MockInteraction {
    fn actor_id(&self) -> u64 {
        self.actor_id
    }

    fn context_id(&self) -> Option<u64> {
        self.context_id
    }

    fn command_name(&self) -> &str {
        &self.command
    }

    fn subcommand_name(&self) -> Option<&str> {
        self.subcommand.as_deref()
    }

    fn actor_capabilities(&self) -> CapabilitySet {
        self.actor_caps.clone()
    }

    fn agent_capabilities(&self) -> CapabilitySet {
        self.agent_caps.clone()
    }

    fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    async fn reply(&self, reply: Reply) -> Result<(), ReplyError> {
        if self.responded.swap(true, Ordering::SeqCst) {
            return Err(ReplyError::AlreadyResponded);
        }
        self.sent.lock().unwrap().push(Sent::Reply(reply));
        Ok(())
    }

    async fn defer(&self, ephemeral: bool) -> Result<(), ReplyError> {
        if self.responded.swap(true, Ordering::SeqCst) {
            return Err(ReplyError::AlreadyResponded);
        }
        self.sent.lock().unwrap().push(Sent::Defer { ephemeral });
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> Result<(), ReplyError> {
        if !self.has_responded() {
            return Err(ReplyError::NotResponded);
        }
        self.sent.lock().unwrap().push(Sent::FollowUp(reply));
        Ok(())
    }
}

/// Does nothing.
pub struct Noop;

#[async_trait]
impl CommandHandler<MockInteraction> for Noop {
    async fn run(&self, _ctx: CommandContext<'_, MockInteraction>) -> Result<(), Error> {
        Ok(())
    }
}

/// Counts invocations and replies "pong".
#[derive(Clone, Default)]
pub struct Counting {
    pub calls: Arc<AtomicUsize>,
}

impl Counting {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandHandler<MockInteraction> for Counting {
    async fn run(&self, ctx: CommandContext<'_, MockInteraction>) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ctx.interaction.reply(Reply::info("pong")).await?;
        Ok(())
    }
}

/// Fails, optionally after deferring.
pub struct Failing {
    pub defer_first: bool,
}

#[async_trait]
impl CommandHandler<MockInteraction> for Failing {
    async fn run(&self, ctx: CommandContext<'_, MockInteraction>) -> Result<(), Error> {
        if self.defer_first {
            ctx.interaction.defer(false).await?;
        }
        Err("database exploded".into())
    }
}

/// Panics, optionally after deferring.
pub struct Panicking {
    pub defer_first: bool,
}

#[async_trait]
impl CommandHandler<MockInteraction> for Panicking {
    async fn run(&self, ctx: CommandContext<'_, MockInteraction>) -> Result<(), Error> {
        if self.defer_first {
            ctx.interaction.defer(false).await?;
        }
        let pages: Vec<u32> = Vec::new();
        let _ = pages[3];
        Ok(())
    }
}

/// Map-backed cooldown store.
#[derive(Default)]
pub struct MemoryCooldowns {
    entries: dashmap::DashMap<(u64, String), i64>,
}

#[async_trait]
impl super::cooldown::CooldownStore for MemoryCooldowns {
    async fn last_invocation(
        &self,
        actor_id: u64,
        command: &str,
    ) -> Result<Option<i64>, super::cooldown::CooldownError> {
        Ok(self
            .entries
            .get(&(actor_id, command.to_string()))
            .map(|v| *v))
    }

    async fn try_acquire(
        &self,
        actor_id: u64,
        command: &str,
        cooldown_millis: u64,
        now_millis: i64,
    ) -> Result<CooldownCheck, super::cooldown::CooldownError> {
        let check = match self.entries.entry((actor_id, command.to_string())) {
            Entry::Occupied(mut slot) => {
                let check = CooldownCheck::evaluate(Some(*slot.get()), cooldown_millis, now_millis);
                if check.allowed {
                    slot.insert(now_millis);
                }
                check
            }
            Entry::Vacant(slot) => {
                slot.insert(now_millis);
                CooldownCheck::allowed()
            }
        };
        Ok(check)
    }
}

/// A fixed time that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[test]
fn manual_clock_only_moves_when_advanced() {
    let clock = ManualClock::new(1_000);
    assert_eq!(clock.now_millis(), 1_000);

    clock.advance(Duration::from_millis(250));
    assert_eq!(clock.now_millis(), 1_250);

    clock.set(10);
    assert_eq!(clock.now_millis(), 10);
}
