//! Transport ports.
//!
//! The chat platform (gateway connection, REST API, cache) lives behind these
//! traits. The Discord adapter implements them for production; the `testing`
//! module implements them in memory.

use std::sync::atomic::{AtomicU8, Ordering};

use {anyhow::Result, async_trait::async_trait, cadence_config::PresenceConfig};

use crate::{
    ids::{ChannelId, GuildId, UserId},
    interaction::{Choice, Reply},
};

// ── Reply state ──────────────────────────────────────────────────────────────

/// How far an interaction has been answered.
///
/// The platform accepts exactly one initial response (a reply or a deferral);
/// everything after that has to be an edit of that response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyState {
    Pending,
    Deferred,
    Replied,
}

impl ReplyState {
    /// True once the initial response slot has been used.
    pub fn is_acknowledged(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

const PENDING: u8 = 0;
const DEFERRED: u8 = 1;
const REPLIED: u8 = 2;

/// Lock-free reply state shared between a responder and its callers.
#[derive(Debug, Default)]
pub struct ReplyTracker(AtomicU8);

impl ReplyTracker {
    pub fn state(&self) -> ReplyState {
        match self.0.load(Ordering::Acquire) {
            PENDING => ReplyState::Pending,
            DEFERRED => ReplyState::Deferred,
            _ => ReplyState::Replied,
        }
    }

    /// Record a deferral. Has no effect once a reply was sent.
    pub fn mark_deferred(&self) {
        let _ = self
            .0
            .compare_exchange(PENDING, DEFERRED, Ordering::AcqRel, Ordering::Acquire);
    }

    pub fn mark_replied(&self) {
        self.0.store(REPLIED, Ordering::Release);
    }
}

// ── Per-event capabilities ───────────────────────────────────────────────────

/// Reply/edit capability bound to one command or component interaction.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Send the initial response.
    async fn reply(&self, reply: Reply) -> Result<()>;

    /// Acknowledge now and answer later through [`InteractionResponder::edit`].
    async fn defer(&self, ephemeral: bool) -> Result<()>;

    /// Replace the content of the initial (or deferred) response.
    async fn edit(&self, reply: Reply) -> Result<()>;

    fn state(&self) -> ReplyState;
}

/// Answer an autocomplete request with suggestions.
#[async_trait]
pub trait AutocompleteResponder: Send + Sync {
    async fn suggest(&self, choices: Vec<Choice>) -> Result<()>;
}

/// Plain-text answer to a message in the channel it was posted in.
#[async_trait]
pub trait MessageResponder: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;
}

// ── Process-wide capabilities ────────────────────────────────────────────────

/// Live voice-state lookup.
pub trait VoiceStates: Send + Sync {
    /// The voice channel `user` is connected to in `guild`, if any.
    fn voice_channel_of(&self, guild: GuildId, user: UserId) -> Option<ChannelId>;
}

/// Bulk command-definition upload. Both calls replace the whole set stored
/// for their scope; an empty slice clears it.
#[async_trait]
pub trait CommandUploader: Send + Sync {
    async fn set_application_commands(&self, commands: &[serde_json::Value]) -> Result<()>;

    async fn set_guild_commands(
        &self,
        guild: GuildId,
        commands: &[serde_json::Value],
    ) -> Result<()>;
}

/// Set the bot's displayed status and activity.
#[async_trait]
pub trait PresenceSink: Send + Sync {
    async fn set_presence(&self, presence: &PresenceConfig) -> Result<()>;
}
