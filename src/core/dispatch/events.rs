// Event registry - gateway listeners keyed by event kind.
//
// Listeners run in registration order. A failing listener is logged and the
// rest still run. A `once` listener is disarmed the first time it is picked,
// even if it fails.

use super::Error;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    MemberJoin,
    MemberLeave,
    MessageDelete,
    ChannelCreate,
    BanAdd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    pub name: String,
    pub kind: EventKind,
    pub once: bool,
}

impl EventDescriptor {
    pub fn on(name: impl Into<String>, kind: EventKind) -> Self {
        Self {
            name: name.into(),
            kind,
            once: false,
        }
    }

    pub fn once(name: impl Into<String>, kind: EventKind) -> Self {
        Self {
            once: true,
            ..Self::on(name, kind)
        }
    }
}

#[async_trait]
pub trait EventListener<E: Sync>: Send + Sync {
    async fn handle(&self, event: &E) -> Result<(), Error>;
}

struct Registration<E> {
    descriptor: EventDescriptor,
    listener: Box<dyn EventListener<E>>,
    fired: AtomicBool,
}

pub struct EventRegistry<E> {
    registrations: Vec<Registration<E>>,
}

impl<E: Sync> Default for EventRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Sync> EventRegistry<E> {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    pub fn register(
        mut self,
        descriptor: EventDescriptor,
        listener: impl EventListener<E> + 'static,
    ) -> Self {
        tracing::debug!(
            listener = %descriptor.name,
            kind = ?descriptor.kind,
            once = descriptor.once,
            "Registered event listener"
        );
        self.registrations.push(Registration {
            descriptor,
            listener: Box::new(listener),
            fired: AtomicBool::new(false),
        });
        self
    }

    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.registrations
            .iter()
            .any(|r| r.descriptor.kind == kind && !(r.descriptor.once && r.fired.load(Ordering::SeqCst)))
    }

    /// Run every armed listener for `kind`. Returns how many ran successfully.
    pub async fn emit(&self, kind: EventKind, event: &E) -> usize {
        let mut succeeded = 0;

        for registration in self.registrations.iter().filter(|r| r.descriptor.kind == kind) {
            if registration.descriptor.once && registration.fired.swap(true, Ordering::SeqCst) {
                continue;
            }

            match registration.listener.handle(event).await {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    tracing::error!(
                        listener = %registration.descriptor.name,
                        kind = ?kind,
                        "Event listener failed: {}",
                        e
                    );
                }
            }
        }

        succeeded
    }
}

// ============================================================================
// TESTS
// ============================================================================
