// Cooldown tracker - per-actor, per-command invocation windows.
//
// A rejected attempt never touches the stored timestamp, so retrying a command
// while locked out cannot extend the lockout.

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum CooldownError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Where last-invocation timestamps live.
///
/// The in-memory store is per process. A shared store (SQLite) can be plugged in
/// for deployments that run several bot processes.
#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Last allowed invocation in unix millis, if any.
    async fn last_invocation(
        &self,
        actor_id: u64,
        command: &str,
    ) -> Result<Option<i64>, CooldownError>;

    /// Decide and, when allowed, record `now_millis` as one atomic step.
    ///
    /// Two concurrent calls for the same key must never both be allowed inside
    /// one window.
    async fn try_acquire(
        &self,
        actor_id: u64,
        command: &str,
        cooldown_millis: u64,
        now_millis: i64,
    ) -> Result<CooldownCheck, CooldownError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Outcome of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownCheck {
    pub allowed: bool,
    pub remaining_millis: u64,
}

impl CooldownCheck {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            remaining_millis: 0,
        }
    }

    /// Judge an attempt against the last allowed invocation.
    ///
    /// A clock that went backwards counts as zero elapsed time.
    pub fn evaluate(last: Option<i64>, cooldown_millis: u64, now_millis: i64) -> Self {
        let Some(last) = last else {
            return Self::allowed();
        };
        let elapsed = now_millis.saturating_sub(last).max(0) as u64;
        if elapsed < cooldown_millis {
            Self {
                allowed: false,
                remaining_millis: cooldown_millis - elapsed,
            }
        } else {
            Self::allowed()
        }
    }
}

pub struct CooldownTracker {
    store: Box<dyn CooldownStore>,
}

impl CooldownTracker {
    pub fn new(store: impl CooldownStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Check (and on success, consume) a cooldown slot.
    pub async fn check(
        &self,
        actor_id: u64,
        command: &str,
        cooldown_millis: u64,
        now_millis: i64,
    ) -> Result<CooldownCheck, CooldownError> {
        if cooldown_millis == 0 {
            return Ok(CooldownCheck::allowed());
        }

        self.store
            .try_acquire(actor_id, command, cooldown_millis, now_millis)
            .await
    }
}

/// Render a duration like `1d 2h 3m 4s`, or `4.250s` below one minute.
///
/// With a day, hour or minute component the total is rounded up to whole
/// seconds first, so `119_999` reads `2m 0s`.
pub fn format_cooldown(millis: u64) -> String {
    if millis < 60_000 {
        return format!("{:.3}s", millis as f64 / 1000.0);
    }

    let total_secs = millis.div_ceil(1000);
    let days = total_secs / 86_400;
    let hours = (total_secs / 3_600) % 24;
    let minutes = (total_secs / 60) % 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d ", days));
    }
    if hours > 0 {
        out.push_str(&format!("{}h ", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m ", minutes));
    }
    out.push_str(&format!("{}s", seconds));
    out
}

// ============================================================================
// TESTS
// ============================================================================
