//! Inbound events and the reply payloads sent back for them.

use std::{fmt, sync::Arc};

use anyhow::Result;

use crate::{
    ids::{ChannelId, GuildId, UserId},
    transport::{
        AutocompleteResponder, InteractionResponder, MessageResponder, ReplyState,
    },
};

// ── Origin ───────────────────────────────────────────────────────────────────

/// Where an event came from. `guild_id` is `None` for direct messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub guild_id: Option<GuildId>,
    pub channel_id: Option<ChannelId>,
    pub user_id: UserId,
}

impl Origin {
    pub fn guild(guild_id: GuildId, user_id: UserId) -> Self {
        Self {
            guild_id: Some(guild_id),
            channel_id: None,
            user_id,
        }
    }

    pub fn direct(user_id: UserId) -> Self {
        Self {
            guild_id: None,
            channel_id: None,
            user_id,
        }
    }

    pub fn with_channel(mut self, channel_id: ChannelId) -> Self {
        self.channel_id = Some(channel_id);
        self
    }
}

// ── Options ──────────────────────────────────────────────────────────────────

/// A resolved command option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    /// User, channel, role or mentionable id.
    Snowflake(u64),
}

/// Options of a command invocation, in the order the platform sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOptions(Vec<(String, OptionValue)>);

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace an option.
    pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, OptionValue)> for CommandOptions {
    fn from_iter<I: IntoIterator<Item = (S, OptionValue)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (name, value) in iter {
            options.insert(name, value);
        }
        options
    }
}

// ── Outbound payloads ────────────────────────────────────────────────────────

/// Clickable button attached to a reply. `custom_id` routes the click back to
/// the command that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub custom_id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Only visible to the invoking user.
    pub ephemeral: bool,
    pub buttons: Vec<Button>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            ..Default::default()
        }
    }

    pub fn with_button(mut self, custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.buttons.push(Button {
            custom_id: custom_id.into(),
            label: label.into(),
        });
        self
    }
}

/// Autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub name: String,
    pub value: String,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ── Interactions ─────────────────────────────────────────────────────────────

/// Application command type as declared by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Slash command typed in the chat input.
    ChatInput,
    /// Context-menu command on a user.
    User,
    /// Context-menu command on a message.
    Message,
    Unknown,
}

/// A structured command invocation.
#[derive(Clone)]
pub struct CommandInteraction {
    pub name: String,
    pub kind: CommandKind,
    pub options: CommandOptions,
    pub origin: Origin,
    responder: Arc<dyn InteractionResponder>,
}

impl CommandInteraction {
    pub fn new(
        name: impl Into<String>,
        kind: CommandKind,
        origin: Origin,
        options: CommandOptions,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            options,
            origin,
            responder,
        }
    }

    pub fn responder(&self) -> &dyn InteractionResponder {
        self.responder.as_ref()
    }

    pub async fn reply(&self, reply: Reply) -> Result<()> {
        self.responder.reply(reply).await
    }

    pub async fn defer(&self, ephemeral: bool) -> Result<()> {
        self.responder.defer(ephemeral).await
    }

    pub async fn edit(&self, reply: Reply) -> Result<()> {
        self.responder.edit(reply).await
    }

    /// Reply if nothing was sent yet, otherwise edit the existing response.
    pub async fn respond(&self, reply: Reply) -> Result<()> {
        respond_via(self.responder.as_ref(), reply).await
    }

    pub fn reply_state(&self) -> ReplyState {
        self.responder.state()
    }
}

impl fmt::Debug for CommandInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInteraction")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("origin", &self.origin)
            .field("reply_state", &self.responder.state())
            .finish()
    }
}

/// A click on a UI element (button) previously sent by the bot.
#[derive(Clone)]
pub struct ComponentInteraction {
    pub custom_id: String,
    pub origin: Origin,
    responder: Arc<dyn InteractionResponder>,
}

impl ComponentInteraction {
    pub fn new(
        custom_id: impl Into<String>,
        origin: Origin,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        Self {
            custom_id: custom_id.into(),
            origin,
            responder,
        }
    }

    pub fn responder(&self) -> &dyn InteractionResponder {
        self.responder.as_ref()
    }

    pub async fn reply(&self, reply: Reply) -> Result<()> {
        self.responder.reply(reply).await
    }

    pub async fn defer(&self, ephemeral: bool) -> Result<()> {
        self.responder.defer(ephemeral).await
    }

    pub async fn respond(&self, reply: Reply) -> Result<()> {
        respond_via(self.responder.as_ref(), reply).await
    }
}

impl fmt::Debug for ComponentInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInteraction")
            .field("custom_id", &self.custom_id)
            .field("origin", &self.origin)
            .field("reply_state", &self.responder.state())
            .finish()
    }
}

/// The option the user is currently typing into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedOption {
    pub name: String,
    pub partial: String,
}

/// A request for suggestions while the user types a command option.
#[derive(Clone)]
pub struct AutocompleteInteraction {
    pub name: String,
    pub options: CommandOptions,
    pub focused: Option<FocusedOption>,
    pub origin: Origin,
    responder: Arc<dyn AutocompleteResponder>,
}

impl AutocompleteInteraction {
    pub fn new(
        name: impl Into<String>,
        origin: Origin,
        focused: Option<FocusedOption>,
        responder: Arc<dyn AutocompleteResponder>,
    ) -> Self {
        Self {
            name: name.into(),
            options: CommandOptions::new(),
            focused,
            origin,
            responder,
        }
    }

    pub fn with_options(mut self, options: CommandOptions) -> Self {
        self.options = options;
        self
    }

    /// Text typed so far into the focused option, or `""`.
    pub fn partial(&self) -> &str {
        self.focused.as_ref().map_or("", |f| f.partial.as_str())
    }

    pub async fn suggest(&self, choices: Vec<Choice>) -> Result<()> {
        self.responder.suggest(choices).await
    }
}

impl fmt::Debug for AutocompleteInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutocompleteInteraction")
            .field("name", &self.name)
            .field("focused", &self.focused)
            .field("origin", &self.origin)
            .finish()
    }
}

/// Everything the interaction stream can deliver.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Command(CommandInteraction),
    Component(ComponentInteraction),
    Autocomplete(AutocompleteInteraction),
    /// Interaction kinds the bot has no use for (pings, modals, ...).
    Unsupported(&'static str),
}

/// A plain chat message from the separate message stream.
#[derive(Clone)]
pub struct InboundMessage {
    pub content: String,
    pub origin: Origin,
    pub author_is_bot: bool,
    pub responder: Arc<dyn MessageResponder>,
}

impl fmt::Debug for InboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundMessage")
            .field("content", &self.content)
            .field("origin", &self.origin)
            .field("author_is_bot", &self.author_is_bot)
            .finish()
    }
}

pub(crate) async fn respond_via(responder: &dyn InteractionResponder, reply: Reply) -> Result<()> {
    if responder.state().is_acknowledged() {
        responder.edit(reply).await
    } else {
        responder.reply(reply).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_replace_by_name() {
        let mut options = CommandOptions::new()
            .with("query", OptionValue::String("a".into()))
            .with("clear", OptionValue::Boolean(true));
        options.insert("query", OptionValue::String("b".into()));

        assert_eq!(options.string("query"), Some("b"));
        assert_eq!(options.boolean("clear"), Some(true));
        assert_eq!(options.iter().count(), 2);
    }

    #[test]
    fn typed_getters_reject_other_types() {
        let options: CommandOptions = [("n", OptionValue::Integer(3))].into_iter().collect();
        assert_eq!(options.integer("n"), Some(3));
        assert_eq!(options.string("n"), None);
        assert_eq!(options.boolean("missing"), None);
    }

    #[test]
    fn reply_builders() {
        let reply = Reply::ephemeral("hi").with_button("queue:skip", "Skip");
        assert!(reply.ephemeral);
        assert_eq!(reply.buttons[0].custom_id, "queue:skip");
        assert!(!Reply::text("x").ephemeral);
    }
}
