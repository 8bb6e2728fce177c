// The inbound interaction port.
//
// The dispatcher only sees this trait. The Discord layer implements it on top of
// serenity's CommandInteraction; tests implement it with a recording mock.

use super::handler_models::CapabilitySet;
use async_trait::async_trait;
use thiserror::Error;

/// How a reply should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTone {
    Deny,
    Approve,
    Info,
}

/// Outbound reply content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub tone: ReplyTone,
    pub text: String,
    pub ephemeral: bool,
}

impl Reply {
    pub fn deny(text: impl Into<String>) -> Self {
        Self {
            tone: ReplyTone::Deny,
            text: text.into(),
            ephemeral: false,
        }
    }

    pub fn approve(text: impl Into<String>) -> Self {
        Self {
            tone: ReplyTone::Approve,
            text: text.into(),
            ephemeral: false,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            tone: ReplyTone::Info,
            text: text.into(),
            ephemeral: false,
        }
    }

    /// Only the actor will see this reply.
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }
}

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("Interaction was already replied to or deferred")]
    AlreadyResponded,

    #[error("Interaction has not been replied to or deferred yet")]
    NotResponded,

    #[error("Failed to deliver reply: {0}")]
    Transport(String),
}

/// An invoked slash command as seen by the dispatch core.
///
/// Replies are two-phase: either one `reply`, or `defer` followed by any
/// number of `follow_up` calls.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// The user who invoked the command.
    fn actor_id(&self) -> u64;

    /// The guild the command was invoked in, `None` for DMs.
    fn context_id(&self) -> Option<u64>;

    fn command_name(&self) -> &str;

    fn subcommand_name(&self) -> Option<&str>;

    /// Permissions the actor holds in the originating context.
    fn actor_capabilities(&self) -> CapabilitySet;

    /// Permissions the bot holds in the originating channel.
    /// An empty set means they are unknown.
    fn agent_capabilities(&self) -> CapabilitySet;

    /// Whether the interaction was already replied to or deferred.
    fn has_responded(&self) -> bool;

    async fn reply(&self, reply: Reply) -> Result<(), ReplyError>;

    async fn defer(&self, ephemeral: bool) -> Result<(), ReplyError>;

    async fn follow_up(&self, reply: Reply) -> Result<(), ReplyError>;
}
