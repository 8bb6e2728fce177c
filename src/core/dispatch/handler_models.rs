// Dispatch domain models - capabilities and handler descriptors.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer maps serenity permission bits onto `Capability`.

use std::collections::BTreeSet;
use std::fmt;

/// A named permission flag a command can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Administrator,
    ViewChannel,
    SendMessages,
    EmbedLinks,
    ReadMessageHistory,
    ManageMessages,
    ManageChannels,
    ManageGuild,
    KickMembers,
    BanMembers,
    ModerateMembers,
    Connect,
    Speak,
}

#[cfg(test)]
impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 13] = [
        Capability::Administrator,
        Capability::ViewChannel,
        Capability::SendMessages,
        Capability::EmbedLinks,
        Capability::ReadMessageHistory,
        Capability::ManageMessages,
        Capability::ManageChannels,
        Capability::ManageGuild,
        Capability::KickMembers,
        Capability::BanMembers,
        Capability::ModerateMembers,
        Capability::Connect,
        Capability::Speak,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Administrator => "Administrator",
            Capability::ViewChannel => "ViewChannel",
            Capability::SendMessages => "SendMessages",
            Capability::EmbedLinks => "EmbedLinks",
            Capability::ReadMessageHistory => "ReadMessageHistory",
            Capability::ManageMessages => "ManageMessages",
            Capability::ManageChannels => "ManageChannels",
            Capability::ManageGuild => "ManageGuild",
            Capability::KickMembers => "KickMembers",
            Capability::BanMembers => "BanMembers",
            Capability::ModerateMembers => "ModerateMembers",
            Capability::Connect => "Connect",
            Capability::Speak => "Speak",
        };
        write!(f, "{}", name)
    }
}

/// An ordered set of capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Capabilities in `self` that `granted` does not cover.
    pub fn missing_from(&self, granted: &CapabilitySet) -> CapabilitySet {
        if granted.contains(Capability::Administrator) {
            return CapabilitySet::new();
        }
        self.0
            .iter()
            .filter(|c| !granted.contains(**c))
            .copied()
            .collect()
    }

    /// Render as "`A`, `B`" for user-facing messages.
    pub fn to_code_list(&self) -> String {
        self.0
            .iter()
            .map(|c| format!("`{}`", c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Capability; N]> for CapabilitySet {
    fn from(value: [Capability; N]) -> Self {
        value.into_iter().collect()
    }
}

/// Identifies a command or subcommand and carries its dispatch policy.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerDescriptor {
    pub name: String,
    pub description: String,
    /// Help category (e.g. "moderation"). Empty for subcommands.
    pub category: String,
    pub required_actor_capabilities: CapabilitySet,
    pub required_agent_capabilities: CapabilitySet,
    /// Minimum time between allowed invocations per actor. 0 disables it.
    pub cooldown_millis: u64,
    /// Refuse to run outside a guild.
    pub guild_only: bool,
    /// Present only for subcommands.
    pub parent_name: Option<String>,
}

impl HandlerDescriptor {
    /// Describe a top-level command.
    pub fn command(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: String::new(),
            required_actor_capabilities: CapabilitySet::new(),
            required_agent_capabilities: CapabilitySet::new(),
            cooldown_millis: 0,
            guild_only: false,
            parent_name: None,
        }
    }

    /// Describe a subcommand bound to `parent`.
    pub fn subcommand(
        parent: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            parent_name: Some(parent.into()),
            ..Self::command(name, description)
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn actor_requires(mut self, capability: Capability) -> Self {
        self.required_actor_capabilities.insert(capability);
        self
    }

    pub fn agent_requires(mut self, capability: Capability) -> Self {
        self.required_agent_capabilities.insert(capability);
        self
    }

    /// Require the capability from both the actor and the bot.
    pub fn both_require(self, capability: Capability) -> Self {
        self.actor_requires(capability).agent_requires(capability)
    }

    pub fn cooldown_millis(mut self, millis: u64) -> Self {
        self.cooldown_millis = millis;
        self
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    pub fn is_subcommand(&self) -> bool {
        self.parent_name.is_some()
    }

    /// Name used for cooldown keys and logs: "parent sub" for subcommands.
    pub fn qualified_name(&self) -> String {
        match &self.parent_name {
            Some(parent) => format!("{} {}", parent, self.name),
            None => self.name.clone(),
        }
    }
}
