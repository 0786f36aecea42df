//! Command registry: every loaded definition, indexed by invocation name and
//! by owned UI-element id.

use std::{collections::HashMap, sync::Arc};

use {serde_json::Value, tracing::debug};

use crate::{command::CommandDefinition, error::LoadError};

struct Entry {
    command: Arc<CommandDefinition>,
    payload: Value,
}

/// Immutable once loaded; shared read-only between event tasks.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
    by_ui_element: HashMap<String, Arc<CommandDefinition>>,
}

impl CommandRegistry {
    /// Load `commands` all-or-nothing.
    ///
    /// A later definition with an already loaded name replaces the earlier
    /// one in place (last write wins), and so do UI-element ids claimed twice.
    pub fn load(
        commands: impl IntoIterator<Item = CommandDefinition>,
    ) -> Result<Self, LoadError> {
        let mut registry = Self::default();
        for (index, command) in commands.into_iter().enumerate() {
            if command.name().trim().is_empty() {
                return Err(LoadError::MissingName { index });
            }
            let payload = command
                .payload_json()
                .map_err(|source| LoadError::Unserializable {
                    name: command.name().to_string(),
                    source,
                })?;
            registry.insert(command, payload);
        }
        debug!(count = registry.len(), "command registry loaded");
        Ok(registry)
    }

    fn insert(&mut self, command: CommandDefinition, payload: Value) {
        let command = Arc::new(command);
        for id in command.ui_element_ids() {
            self.by_ui_element.insert(id.clone(), Arc::clone(&command));
        }
        let entry = Entry {
            command: Arc::clone(&command),
            payload,
        };
        match self.by_name.get(command.name()) {
            Some(&slot) => {
                debug!(command = command.name(), "replacing duplicate command");
                let previous = std::mem::replace(&mut self.entries[slot], entry);
                // Drop UI ids that only the replaced definition still owned.
                self.by_ui_element
                    .retain(|_, owner| !Arc::ptr_eq(owner, &previous.command));
            },
            None => {
                self.by_name
                    .insert(command.name().to_string(), self.entries.len());
                self.entries.push(entry);
            },
        }
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&Arc<CommandDefinition>> {
        self.by_name.get(name).map(|&slot| &self.entries[slot].command)
    }

    pub fn lookup_by_ui_element_id(&self, custom_id: &str) -> Option<&Arc<CommandDefinition>> {
        self.by_ui_element.get(custom_id)
    }

    /// All definitions in load order.
    pub fn all_definitions(&self) -> Vec<Arc<CommandDefinition>> {
        self.entries.iter().map(|e| Arc::clone(&e.command)).collect()
    }

    /// Serialized payloads in load order, ready for bulk upload.
    pub fn payloads(&self) -> Vec<Value> {
        self.entries.iter().map(|e| e.payload.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
