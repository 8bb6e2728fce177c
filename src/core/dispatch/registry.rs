// Handler registry - the name -> handler map the dispatcher resolves against.
//
// Handlers are declared explicitly through `RegistryBuilder`, one call each.
// The registry is built once at startup and is read-only afterwards.
//
// Duplicate names: the first registration wins, later ones are logged and dropped.

use super::Error;
use super::handler_models::HandlerDescriptor;
use super::interaction::Interaction;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// What a handler gets when invoked.
pub struct CommandContext<'a, I: Interaction> {
    pub interaction: &'a I,
    pub registry: &'a Registry<I>,
    pub descriptor: &'a HandlerDescriptor,
}

/// The behavior half of a handler.
#[async_trait]
pub trait CommandHandler<I: Interaction>: Send + Sync {
    async fn run(&self, ctx: CommandContext<'_, I>) -> Result<(), Error>;
}

/// A descriptor plus its behavior.
pub struct Handler<I: Interaction> {
    descriptor: HandlerDescriptor,
    behavior: Box<dyn CommandHandler<I>>,
}

impl<I: Interaction> Handler<I> {
    pub fn new(descriptor: HandlerDescriptor, behavior: impl CommandHandler<I> + 'static) -> Self {
        Self {
            descriptor,
            behavior: Box::new(behavior),
        }
    }

    pub fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    pub fn behavior(&self) -> &dyn CommandHandler<I> {
        self.behavior.as_ref()
    }
}

/// A top-level command and the subcommands bound to it.
pub struct RegisteredCommand<I: Interaction> {
    handler: Handler<I>,
    subcommands: BTreeMap<String, Handler<I>>,
}

impl<I: Interaction> RegisteredCommand<I> {
    pub fn handler(&self) -> &Handler<I> {
        &self.handler
    }

    pub fn subcommands(&self) -> impl Iterator<Item = &Handler<I>> {
        self.subcommands.values()
    }
}

pub struct Registry<I: Interaction> {
    commands: BTreeMap<String, RegisteredCommand<I>>,
}

impl<I: Interaction> Default for Registry<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Interaction> Registry<I> {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// Insert a top-level command. Returns `false` if the name was taken or the
    /// descriptor belongs to a subcommand.
    pub fn register(&mut self, handler: Handler<I>) -> bool {
        if let Some(parent) = &handler.descriptor.parent_name {
            tracing::warn!(
                command = %handler.descriptor.name,
                parent = %parent,
                "Subcommand descriptor registered as a command, dropping it"
            );
            return false;
        }

        let name = handler.descriptor.name.clone();
        if self.commands.contains_key(&name) {
            tracing::warn!(command = %name, "Duplicate command name, keeping first registration");
            return false;
        }

        self.commands.insert(
            name,
            RegisteredCommand {
                handler,
                subcommands: BTreeMap::new(),
            },
        );
        true
    }

    /// Bind a subcommand to its parent. Returns `false` if it was dropped.
    pub fn attach_subcommand(&mut self, handler: Handler<I>) -> bool {
        let Some(parent_name) = handler.descriptor.parent_name.clone() else {
            tracing::warn!(
                subcommand = %handler.descriptor.name,
                "Subcommand has no parent name, dropping it"
            );
            return false;
        };

        let Some(parent) = self.commands.get_mut(&parent_name) else {
            tracing::warn!(
                subcommand = %handler.descriptor.name,
                parent = %parent_name,
                "Parent command not registered, dropping subcommand"
            );
            return false;
        };

        let name = handler.descriptor.name.clone();
        if parent.subcommands.contains_key(&name) {
            tracing::warn!(
                subcommand = %name,
                parent = %parent_name,
                "Duplicate subcommand name, keeping first registration"
            );
            return false;
        }

        parent.subcommands.insert(name, handler);
        true
    }

    pub fn resolve(&self, name: &str) -> Option<&Handler<I>> {
        self.commands.get(name).map(|c| &c.handler)
    }

    pub fn resolve_subcommand(&self, parent: &str, name: &str) -> Option<&Handler<I>> {
        self.commands
            .get(parent)
            .and_then(|c| c.subcommands.get(name))
    }

    /// Number of subcommands bound to `parent` (0 if it does not exist).
    pub fn subcommand_count(&self, parent: &str) -> usize {
        self.commands
            .get(parent)
            .map(|c| c.subcommands.len())
            .unwrap_or(0)
    }

    /// All commands, ordered by name.
    pub fn commands(&self) -> impl Iterator<Item = &RegisteredCommand<I>> {
        self.commands.values()
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn total_subcommand_count(&self) -> usize {
        self.commands.values().map(|c| c.subcommands.len()).sum()
    }
}

/// Explicit manifest of handlers.
///
/// Subcommands are buffered and bound after every command is in place, so the
/// declaration order between a parent and its subcommands does not matter.
pub struct RegistryBuilder<I: Interaction> {
    commands: Vec<Handler<I>>,
    subcommands: Vec<Handler<I>>,
}

impl<I: Interaction> Default for RegistryBuilder<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Interaction> RegistryBuilder<I> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    pub fn command(
        mut self,
        descriptor: HandlerDescriptor,
        behavior: impl CommandHandler<I> + 'static,
    ) -> Self {
        self.commands.push(Handler::new(descriptor, behavior));
        self
    }

    pub fn subcommand(
        mut self,
        descriptor: HandlerDescriptor,
        behavior: impl CommandHandler<I> + 'static,
    ) -> Self {
        self.subcommands.push(Handler::new(descriptor, behavior));
        self
    }

    pub fn build(self) -> Registry<I> {
        let mut registry = Registry::new();

        for handler in self.commands {
            registry.register(handler);
        }

        let declared = self.subcommands.len();
        let mut bound = 0;
        for handler in self.subcommands {
            if registry.attach_subcommand(handler) {
                bound += 1;
            }
        }

        tracing::info!(
            commands = registry.command_count(),
            subcommands = bound,
            dropped_subcommands = declared - bound,
            "Loaded command registry"
        );

        registry
    }
}

// ============================================================================
// TESTS
// ============================================================================
