// Cooldown store implementations.

pub mod in_memory;
pub mod sqlite_store;

pub use in_memory::InMemoryCooldownStore;
pub use sqlite_store::SqliteCooldownStore;
