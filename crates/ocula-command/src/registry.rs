//! Command dispatch registry

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ocula_core::{BehaviorFlag, BehaviorFlags, OculaError, OculaResult};
use tracing::{debug, warn};

use crate::{flag_commands, Command, Payload};

type Handler = Box<dyn Fn(&Command) -> OculaResult<()> + Send + Sync>;

/// What happened to a dispatched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    /// No handler registered; dropped
    Unknown,
    /// Payload could not be coerced; dropped before reaching the handler
    Malformed,
}

/// Dispatch counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub handled: u64,
    pub unknown: u64,
    pub malformed: u64,
}

impl DispatchStats {
    pub fn total(&self) -> u64 {
        self.handled + self.unknown + self.malformed
    }

    pub fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Handled => self.handled += 1,
            DispatchOutcome::Unknown => self.unknown += 1,
            DispatchOutcome::Malformed => self.malformed += 1,
        }
    }
}

/// Maps command ids to handlers.
///
/// Registration needs `&mut self`; dispatch needs only `&self`. Fill the
/// registry, then wrap it in an `Arc` for the receiving thread, so no handler
/// can be added once dispatching has started.
pub struct CommandDispatchRegistry {
    handlers: HashMap<String, Handler>,
    handled: AtomicU64,
    unknown: AtomicU64,
    malformed: AtomicU64,
}

impl CommandDispatchRegistry {
    pub fn new() -> Self {
        CommandDispatchRegistry {
            handlers: HashMap::new(),
            handled: AtomicU64::new(0),
            unknown: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
        }
    }

    /// Registry with every flag command bound to `flags`
    pub fn with_flag_commands(flags: &Arc<BehaviorFlags>) -> Self {
        let mut registry = Self::new();
        for (id, flag) in flag_commands() {
            registry.register_flag(*id, Arc::clone(flags), *flag);
        }
        registry
    }

    /// Register a raw handler. The handler sees the whole payload and is
    /// expected to reject it with [`OculaError::MalformedPayload`] itself.
    pub fn register<F>(&mut self, id: impl Into<String>, handler: F)
    where
        F: Fn(&Command) -> OculaResult<()> + Send + Sync + 'static,
    {
        let id = id.into();
        if self.handlers.insert(id.clone(), Box::new(handler)).is_some() {
            warn!(command = %id, "command handler replaced");
        }
    }

    /// Register a handler that only ever receives a valid bool
    pub fn register_bool<F>(&mut self, id: impl Into<String>, handler: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.register(id, move |cmd: &Command| {
            let value = cmd.payload.as_bool().ok_or_else(|| cmd.malformed("bool"))?;
            handler(value);
            Ok(())
        });
    }

    /// Register a handler that only ever receives a finite number
    pub fn register_number<F>(&mut self, id: impl Into<String>, handler: F)
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.register(id, move |cmd: &Command| {
            let value = cmd
                .payload
                .as_number()
                .ok_or_else(|| cmd.malformed("number"))?;
            handler(value);
            Ok(())
        });
    }

    /// Register a handler that only ever receives a string
    pub fn register_text<F>(&mut self, id: impl Into<String>, handler: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.register(id, move |cmd: &Command| {
            let value = cmd.payload.as_text().ok_or_else(|| cmd.malformed("string"))?;
            handler(value);
            Ok(())
        });
    }

    /// Bind a bool command directly to a behavior flag
    pub fn register_flag(
        &mut self,
        id: impl Into<String>,
        flags: Arc<BehaviorFlags>,
        flag: BehaviorFlag,
    ) {
        self.register_bool(id, move |value| {
            flags.set(flag, value);
        });
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for `command` on the calling thread.
    /// Unknown ids and malformed payloads are reported and dropped.
    pub fn dispatch(&self, command: &Command) -> DispatchOutcome {
        let Some(handler) = self.handlers.get(&command.id) else {
            let err = OculaError::UnknownCommand(command.id.clone());
            warn!(error = %err, "command dropped");
            self.unknown.fetch_add(1, Ordering::Relaxed);
            return DispatchOutcome::Unknown;
        };

        match handler(command) {
            Ok(()) => {
                debug!(command = %command.id, payload = %command.payload, "command handled");
                self.handled.fetch_add(1, Ordering::Relaxed);
                DispatchOutcome::Handled
            }
            Err(err) => {
                warn!(command = %command.id, error = %err, "command dropped");
                self.malformed.fetch_add(1, Ordering::Relaxed);
                DispatchOutcome::Malformed
            }
        }
    }

    /// Convenience for building and dispatching in one call
    pub fn dispatch_parts(&self, id: &str, payload: impl Into<Payload>) -> DispatchOutcome {
        self.dispatch(&Command::new(id, payload))
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            handled: self.handled.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

impl Default for CommandDispatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandDispatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.handlers.keys().collect();
        ids.sort();
        f.debug_struct("CommandDispatchRegistry")
            .field("commands", &ids)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Error for a handler that rejects a well-typed but out-of-range value
pub fn rejected(command: &Command, expected: &'static str) -> OculaError {
    command.malformed(expected)
}
