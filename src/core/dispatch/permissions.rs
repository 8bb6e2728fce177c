// Permission gate - compares granted capabilities against a handler's requirements.
//
// Pure functions only. Safe to call for dry runs (e.g. greying out commands).

use super::handler_models::{Capability, CapabilitySet};

/// Which side of the interaction lacks a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// The user invoking the command.
    Actor,
    /// The bot executing it.
    Agent,
}

/// Result of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    pub allowed: bool,
    pub missing: CapabilitySet,
}

impl PermissionCheck {
    fn from_missing(missing: CapabilitySet) -> Self {
        Self {
            allowed: missing.is_empty(),
            missing,
        }
    }
}

/// Check the invoking user's capabilities.
pub fn check_actor(granted: &CapabilitySet, required: &CapabilitySet) -> PermissionCheck {
    PermissionCheck::from_missing(required.missing_from(granted))
}

/// Check the bot's own capabilities.
pub fn check_agent(granted: &CapabilitySet, required: &CapabilitySet) -> PermissionCheck {
    PermissionCheck::from_missing(required.missing_from(granted))
}

/// What the bot needs in a channel before it can say anything at all.
pub fn baseline_agent_capabilities() -> CapabilitySet {
    CapabilitySet::from([Capability::ViewChannel, Capability::SendMessages])
}

/// User-facing denial text for a failed check.
pub fn denial_message(party: Party, missing: &CapabilitySet) -> String {
    let noun = if missing.len() == 1 {
        "permission"
    } else {
        "permissions"
    };
    match party {
        Party::Actor => format!(
            "You are missing the {} {} to use this command.",
            noun,
            missing.to_code_list()
        ),
        Party::Agent => format!(
            "I am missing the {} {} to execute this command.",
            noun,
            missing.to_code_list()
        ),
    }
}
