//! Command definitions: a capability record with optional hooks.
//!
//! A command is described by data, not by a trait hierarchy. Every hook is
//! optional and each inbound event kind only calls the hook that matches it:
//!
//! | event                 | hook            |
//! |-----------------------|-----------------|
//! | structured command    | `execute`       |
//! | button click          | `button`        |
//! | autocomplete request  | `autocomplete`  |
//! | legacy text trigger   | `text`          |

use std::{fmt, future::Future, pin::Pin, sync::Arc};

use {anyhow::Result, serde::Serialize};

use crate::{
    interaction::{AutocompleteInteraction, CommandInteraction, ComponentInteraction},
    legacy::TextInvocation,
};

// ── Hook types ───────────────────────────────────────────────────────────────

/// A boxed, sendable future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type ExecuteFn = Arc<dyn Fn(CommandInteraction) -> BoxFuture<Result<()>> + Send + Sync>;
pub type ButtonFn = Arc<dyn Fn(ComponentInteraction) -> BoxFuture<Result<()>> + Send + Sync>;
pub type AutocompleteFn =
    Arc<dyn Fn(AutocompleteInteraction) -> BoxFuture<Result<()>> + Send + Sync>;
pub type TextFn = Arc<dyn Fn(TextInvocation) -> BoxFuture<Result<()>> + Send + Sync>;

/// Decides per invocation whether the voice gate applies.
pub type VoicePredicate = Arc<dyn Fn(&CommandInteraction) -> Result<bool> + Send + Sync>;

/// Whether a command may only run while the caller is in a voice channel.
#[derive(Clone)]
pub enum VoiceRequirement {
    Static(bool),
    /// Depends on the invocation, e.g. on one of its options.
    Dynamic(VoicePredicate),
}

impl Default for VoiceRequirement {
    fn default() -> Self {
        Self::Static(false)
    }
}

impl fmt::Debug for VoiceRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(required) => f.debug_tuple("Static").field(required).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

// ── Payload ──────────────────────────────────────────────────────────────────

/// The platform-facing shape of a command, uploaded during registration.
///
/// Blanket-implemented for every `Serialize` type; serialization is checked
/// once when the registry loads the command.
pub trait CommandPayload: Send + Sync {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T: Serialize + Send + Sync> CommandPayload for T {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

// ── Definition ───────────────────────────────────────────────────────────────

/// One invocable capability.
pub struct CommandDefinition {
    name: String,
    payload: Box<dyn CommandPayload>,
    voice: VoiceRequirement,
    ui_element_ids: Vec<String>,
    execute: Option<ExecuteFn>,
    button: Option<ButtonFn>,
    autocomplete: Option<AutocompleteFn>,
    text: Option<TextFn>,
}

impl CommandDefinition {
    pub fn new(name: impl Into<String>, payload: impl CommandPayload + 'static) -> Self {
        Self {
            name: name.into(),
            payload: Box::new(payload),
            voice: VoiceRequirement::default(),
            ui_element_ids: Vec::new(),
            execute: None,
            button: None,
            autocomplete: None,
            text: None,
        }
    }

    pub fn requires_voice(mut self, required: bool) -> Self {
        self.voice = VoiceRequirement::Static(required);
        self
    }

    pub fn requires_voice_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CommandInteraction) -> Result<bool> + Send + Sync + 'static,
    {
        self.voice = VoiceRequirement::Dynamic(Arc::new(predicate));
        self
    }

    /// Route clicks on the UI element `custom_id` to this command.
    pub fn owns_ui_element(mut self, custom_id: impl Into<String>) -> Self {
        self.ui_element_ids.push(custom_id.into());
        self
    }

    pub fn on_execute<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(CommandInteraction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.execute = Some(Arc::new(move |interaction: CommandInteraction| -> BoxFuture<Result<()>> {
            Box::pin(hook(interaction))
        }));
        self
    }

    pub fn on_button<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(ComponentInteraction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.button = Some(Arc::new(move |interaction: ComponentInteraction| -> BoxFuture<Result<()>> {
            Box::pin(hook(interaction))
        }));
        self
    }

    pub fn on_autocomplete<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(AutocompleteInteraction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.autocomplete = Some(Arc::new(move |interaction: AutocompleteInteraction| -> BoxFuture<Result<()>> {
            Box::pin(hook(interaction))
        }));
        self
    }

    /// Opt into the legacy text trigger.
    pub fn on_text<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(TextInvocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.text = Some(Arc::new(move |invocation: TextInvocation| -> BoxFuture<Result<()>> {
            Box::pin(hook(invocation))
        }));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn voice_requirement(&self) -> &VoiceRequirement {
        &self.voice
    }

    pub fn ui_element_ids(&self) -> &[String] {
        &self.ui_element_ids
    }

    pub fn payload_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        self.payload.to_json()
    }

    pub fn execute_hook(&self) -> Option<&ExecuteFn> {
        self.execute.as_ref()
    }

    pub fn button_hook(&self) -> Option<&ButtonFn> {
        self.button.as_ref()
    }

    pub fn autocomplete_hook(&self) -> Option<&AutocompleteFn> {
        self.autocomplete.as_ref()
    }

    pub fn text_hook(&self) -> Option<&TextFn> {
        self.text.as_ref()
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("voice", &self.voice)
            .field("ui_element_ids", &self.ui_element_ids)
            .field("execute", &self.execute.is_some())
            .field("button", &self.button.is_some())
            .field("autocomplete", &self.autocomplete.is_some())
            .field("text", &self.text.is_some())
            .finish()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn builder_sets_hooks_and_ids() {
        let command = CommandDefinition::new("queue", json!({ "name": "queue" }))
            .owns_ui_element("queue:skip")
            .on_execute(|_| async { Ok(()) })
            .on_button(|_| async { Ok(()) });

        assert_eq!(command.name(), "queue");
        assert_eq!(command.ui_element_ids(), ["queue:skip".to_string()]);
        assert!(command.execute_hook().is_some());
        assert!(command.button_hook().is_some());
        assert!(command.autocomplete_hook().is_none());
        assert!(command.text_hook().is_none());
        assert!(matches!(
            command.voice_requirement(),
            VoiceRequirement::Static(false)
        ));
    }

    #[test]
    fn payload_serializes_through_serde() {
        #[derive(Serialize)]
        struct Shape {
            name: &'static str,
        }
        let command = CommandDefinition::new("ping", Shape { name: "ping" });
        assert_eq!(command.payload_json().unwrap(), json!({ "name": "ping" }));
    }
}
