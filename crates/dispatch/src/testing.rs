//! In-memory implementations of every transport port, for tests in this crate
//! and (behind the `testing` feature) in downstream crates.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use {
    anyhow::{Result, bail},
    async_trait::async_trait,
    cadence_config::PresenceConfig,
    serde_json::Value,
};

use crate::{
    error::Scope,
    ids::{ChannelId, GuildId, UserId},
    interaction::{Choice, Reply},
    transport::{
        AutocompleteResponder, CommandUploader, InteractionResponder, MessageResponder,
        PresenceSink, ReplyState, ReplyTracker, VoiceStates,
    },
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Interaction responder ────────────────────────────────────────────────────

/// One call made on a [`RecordingResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Reply(Reply),
    Defer { ephemeral: bool },
    Edit(Reply),
}

/// Records replies and tracks reply state like the real platform does.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    sent: Mutex<Vec<Sent>>,
    tracker: ReplyTracker,
    fail: AtomicBool,
}

impl RecordingResponder {
    /// A responder whose every call fails.
    pub fn failing() -> Self {
        let responder = Self::default();
        responder.set_failing(true);
        responder
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        lock(&self.sent).clone()
    }

    /// Only the initial replies, in order.
    pub fn replies(&self) -> Vec<Reply> {
        lock(&self.sent)
            .iter()
            .filter_map(|s| match s {
                Sent::Reply(reply) => Some(reply.clone()),
                _ => None,
            })
            .collect()
    }

    /// Only the edits, in order.
    pub fn edits(&self) -> Vec<Reply> {
        lock(&self.sent)
            .iter()
            .filter_map(|s| match s {
                Sent::Edit(reply) => Some(reply.clone()),
                _ => None,
            })
            .collect()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("responder unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn reply(&self, reply: Reply) -> Result<()> {
        self.check()?;
        if self.tracker.state().is_acknowledged() {
            bail!("interaction has already been acknowledged");
        }
        lock(&self.sent).push(Sent::Reply(reply));
        self.tracker.mark_replied();
        Ok(())
    }

    async fn defer(&self, ephemeral: bool) -> Result<()> {
        self.check()?;
        if self.tracker.state().is_acknowledged() {
            bail!("interaction has already been acknowledged");
        }
        lock(&self.sent).push(Sent::Defer { ephemeral });
        self.tracker.mark_deferred();
        Ok(())
    }

    async fn edit(&self, reply: Reply) -> Result<()> {
        self.check()?;
        if !self.tracker.state().is_acknowledged() {
            bail!("unknown interaction response");
        }
        lock(&self.sent).push(Sent::Edit(reply));
        self.tracker.mark_replied();
        Ok(())
    }

    fn state(&self) -> ReplyState {
        self.tracker.state()
    }
}

// ── Autocomplete / messages ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSuggestions {
    sent: Mutex<Vec<Vec<Choice>>>,
    fail: AtomicBool,
}

impl RecordingSuggestions {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Vec<Choice>> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl AutocompleteResponder for RecordingSuggestions {
    async fn suggest(&self, choices: Vec<Choice>) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("autocomplete response rejected");
        }
        lock(&self.sent).push(choices);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingMessages {
    sent: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingMessages {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl MessageResponder for RecordingMessages {
    async fn send_text(&self, text: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("missing permission to send messages");
        }
        lock(&self.sent).push(text.to_string());
        Ok(())
    }
}

// ── Voice states ─────────────────────────────────────────────────────────────

/// Fixed voice membership.
#[derive(Debug, Default)]
pub struct StaticVoiceStates {
    members: HashMap<(GuildId, UserId), ChannelId>,
}

impl StaticVoiceStates {
    pub fn with(mut self, guild: GuildId, user: UserId, channel: ChannelId) -> Self {
        self.members.insert((guild, user), channel);
        self
    }
}

impl VoiceStates for StaticVoiceStates {
    fn voice_channel_of(&self, guild: GuildId, user: UserId) -> Option<ChannelId> {
        self.members.get(&(guild, user)).copied()
    }
}

// ── Registration / presence ──────────────────────────────────────────────────

/// Records bulk uploads; uploads to scopes marked failing return an error.
#[derive(Debug, Default)]
pub struct RecordingUploader {
    uploads: Mutex<Vec<(Scope, Vec<Value>)>>,
    failing: HashSet<Scope>,
}

impl RecordingUploader {
    pub fn failing_on(mut self, scope: Scope) -> Self {
        self.failing.insert(scope);
        self
    }

    /// Completed uploads, in completion order.
    pub fn uploads(&self) -> Vec<(Scope, Vec<Value>)> {
        lock(&self.uploads).clone()
    }

    pub fn upload_for(&self, scope: Scope) -> Option<Vec<Value>> {
        lock(&self.uploads)
            .iter()
            .find(|(s, _)| *s == scope)
            .map(|(_, commands)| commands.clone())
    }

    fn record(&self, scope: Scope, commands: &[Value]) -> Result<()> {
        if self.failing.contains(&scope) {
            bail!("upload to {scope} rejected");
        }
        lock(&self.uploads).push((scope, commands.to_vec()));
        Ok(())
    }
}

#[async_trait]
impl CommandUploader for RecordingUploader {
    async fn set_application_commands(&self, commands: &[Value]) -> Result<()> {
        self.record(Scope::Application, commands)
    }

    async fn set_guild_commands(&self, guild: GuildId, commands: &[Value]) -> Result<()> {
        self.record(Scope::Guild(guild), commands)
    }
}

#[derive(Debug, Default)]
pub struct RecordingPresence {
    published: Mutex<Vec<PresenceConfig>>,
    fail: AtomicBool,
}

impl RecordingPresence {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn published(&self) -> Vec<PresenceConfig> {
        lock(&self.published).clone()
    }
}

#[async_trait]
impl PresenceSink for RecordingPresence {
    async fn set_presence(&self, presence: &PresenceConfig) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("gateway closed");
        }
        lock(&self.published).push(presence.clone());
        Ok(())
    }
}
