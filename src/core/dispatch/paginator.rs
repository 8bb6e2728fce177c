// Paginator - multi-page session navigated by its owner through buttons.
//
// Pure state: the Discord layer owns the message and the collector, and asks
// the session what to render and how long to keep listening.

use std::time::Duration;
use thiserror::Error;

pub const PAGE_FIRST: &str = "pageFirst";
pub const PAGE_PREV: &str = "pagePrev";
pub const PAGE_COUNT: &str = "pageCount";
pub const PAGE_NEXT: &str = "pageNext";
pub const PAGE_LAST: &str = "pageLast";

pub const NOT_OWNER: &str = "You did not invoke this command!";

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginatorError {
    #[error("A paginator needs at least one page")]
    Empty,
}

// ============================================================================
// MODELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    First,
    Prev,
    Next,
    Last,
}

impl NavAction {
    pub fn from_control_id(id: &str) -> Option<Self> {
        match id {
            PAGE_FIRST => Some(Self::First),
            PAGE_PREV => Some(Self::Prev),
            PAGE_NEXT => Some(Self::Next),
            PAGE_LAST => Some(Self::Last),
            _ => None,
        }
    }

    pub fn control_id(self) -> &'static str {
        match self {
            Self::First => PAGE_FIRST,
            Self::Prev => PAGE_PREV,
            Self::Next => PAGE_NEXT,
            Self::Last => PAGE_LAST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginatorState {
    AtFirst,
    Middle,
    AtLast,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationResult {
    Moved { index: usize },
    /// Already at the edge in that direction.
    Unchanged { index: usize },
    NotOwner,
    Destroyed,
}

/// What the control row should look like for the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    pub first_disabled: bool,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub last_disabled: bool,
    pub label: String,
}

// ============================================================================
// SESSION
// ============================================================================

pub struct PaginationSession<P> {
    pages: Vec<P>,
    index: usize,
    owner_id: u64,
    idle_timeout_ms: i64,
    deadline_ms: i64,
    destroyed: bool,
}

impl<P> PaginationSession<P> {
    pub fn new(
        pages: Vec<P>,
        owner_id: u64,
        idle_timeout: Duration,
        now_ms: i64,
    ) -> Result<Self, PaginatorError> {
        if pages.is_empty() {
            return Err(PaginatorError::Empty);
        }
        let idle_timeout_ms = idle_timeout.as_millis() as i64;
        Ok(Self {
            pages,
            index: 0,
            owner_id,
            idle_timeout_ms,
            deadline_ms: now_ms + idle_timeout_ms,
            destroyed: false,
        })
    }

    pub fn owner_id(&self) -> u64 {
        self.owner_id
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_page(&self) -> &P {
        &self.pages[self.index]
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn state(&self) -> PaginatorState {
        if self.destroyed {
            PaginatorState::Destroyed
        } else if self.index == 0 {
            PaginatorState::AtFirst
        } else if self.index == self.last_index() {
            PaginatorState::AtLast
        } else {
            PaginatorState::Middle
        }
    }

    /// Apply a button press. Only the owner moves the session, and only an
    /// accepted press pushes the idle deadline back.
    pub fn navigate(&mut self, actor_id: u64, action: NavAction, now_ms: i64) -> NavigationResult {
        if self.destroyed {
            return NavigationResult::Destroyed;
        }
        if now_ms >= self.deadline_ms {
            self.destroy();
            return NavigationResult::Destroyed;
        }
        if actor_id != self.owner_id {
            return NavigationResult::NotOwner;
        }

        self.deadline_ms = now_ms + self.idle_timeout_ms;

        let target = match action {
            NavAction::First => 0,
            NavAction::Prev => self.index.saturating_sub(1),
            NavAction::Next => (self.index + 1).min(self.last_index()),
            NavAction::Last => self.last_index(),
        };

        if target == self.index {
            NavigationResult::Unchanged { index: self.index }
        } else {
            self.index = target;
            NavigationResult::Moved { index: target }
        }
    }

    /// `None` once destroyed: the final render carries no controls.
    pub fn controls(&self) -> Option<PageControls> {
        if self.destroyed {
            return None;
        }
        let at_first = self.index == 0;
        let at_last = self.index == self.last_index();
        Some(PageControls {
            first_disabled: at_first,
            prev_disabled: at_first,
            next_disabled: at_last,
            last_disabled: at_last,
            label: format!("{} / {}", self.index + 1, self.pages.len()),
        })
    }

    /// Time left before the session expires, zero once it has.
    pub fn remaining_idle(&self, now_ms: i64) -> Duration {
        if self.destroyed {
            return Duration::ZERO;
        }
        Duration::from_millis((self.deadline_ms - now_ms).max(0) as u64)
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    fn last_index(&self) -> usize {
        self.pages.len() - 1
    }
}

// ============================================================================
// TESTS
// ============================================================================
