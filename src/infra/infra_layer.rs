// The infra module contains implementations of core traits.

#[path = "cooldowns/cooldown_store.rs"]
pub mod cooldowns;
