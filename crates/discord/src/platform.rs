//! Process-wide ports: command upload, presence and voice membership.

use std::{
    num::NonZeroU64,
    sync::{Arc, OnceLock},
};

use {
    anyhow::{Context as _, Result},
    async_trait::async_trait,
    cadence_config::{ActivityKind, PresenceConfig, PresenceStatus},
    cadence_dispatch::{ChannelId, CommandUploader, GuildId, PresenceSink, UserId, VoiceStates},
    serde_json::Value,
    serenity::all::{
        ActivityData, Cache, Context, GuildId as DiscordGuildId, Http, OnlineStatus,
        UserId as DiscordUserId,
    },
    tracing::warn,
};

fn discord_id(id: u64) -> Option<NonZeroU64> {
    NonZeroU64::new(id)
}

// ── Command upload ───────────────────────────────────────────────────────────

/// Bulk-overwrites command sets over REST.
pub struct HttpUploader {
    http: Arc<Http>,
}

impl HttpUploader {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CommandUploader for HttpUploader {
    async fn set_application_commands(&self, commands: &[Value]) -> Result<()> {
        self.http
            .create_global_commands(&commands)
            .await
            .context("failed to overwrite application commands")?;
        Ok(())
    }

    async fn set_guild_commands(&self, guild: GuildId, commands: &[Value]) -> Result<()> {
        let id = discord_id(guild.get())
            .map(DiscordGuildId::from)
            .with_context(|| format!("invalid guild id {guild}"))?;
        self.http
            .create_guild_commands(id, &commands)
            .await
            .with_context(|| format!("failed to overwrite commands for guild {guild}"))?;
        Ok(())
    }
}

// ── Presence ─────────────────────────────────────────────────────────────────

pub fn online_status(status: PresenceStatus) -> OnlineStatus {
    match status {
        PresenceStatus::Online => OnlineStatus::Online,
        PresenceStatus::Idle => OnlineStatus::Idle,
        PresenceStatus::Dnd => OnlineStatus::DoNotDisturb,
        PresenceStatus::Invisible => OnlineStatus::Invisible,
    }
}

/// Streaming without a usable URL falls back to "playing".
pub fn activity(presence: &PresenceConfig) -> Option<ActivityData> {
    let activity = presence.activity.as_ref()?;
    let name = activity.name.clone();
    Some(match activity.kind {
        ActivityKind::Playing => ActivityData::playing(name),
        ActivityKind::Listening => ActivityData::listening(name),
        ActivityKind::Watching => ActivityData::watching(name),
        ActivityKind::Competing => ActivityData::competing(name),
        ActivityKind::Streaming => match activity.url.as_deref() {
            Some(url) => ActivityData::streaming(name.clone(), url).unwrap_or_else(|e| {
                warn!(url, error = %e, "invalid stream url, showing as playing");
                ActivityData::playing(name)
            }),
            None => ActivityData::playing(name),
        },
    })
}

/// Sets presence on the shard that delivered the ready event.
pub struct ContextPresence {
    ctx: Context,
}

impl ContextPresence {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl PresenceSink for ContextPresence {
    async fn set_presence(&self, presence: &PresenceConfig) -> Result<()> {
        self.ctx
            .set_presence(activity(presence), online_status(presence.status));
        Ok(())
    }
}

// ── Voice states ─────────────────────────────────────────────────────────────

/// Voice membership read from the gateway cache.
///
/// The cache only exists once the client is built, which happens after the
/// router is wired, so it is attached later. Until then nobody is in voice.
#[derive(Default)]
pub struct CacheVoiceStates {
    cache: OnceLock<Arc<Cache>>,
}

impl CacheVoiceStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the client cache. Later calls are ignored.
    pub fn attach(&self, cache: Arc<Cache>) {
        let _ = self.cache.set(cache);
    }
}

impl VoiceStates for CacheVoiceStates {
    fn voice_channel_of(&self, guild: GuildId, user: UserId) -> Option<ChannelId> {
        let cache = self.cache.get()?;
        let guild_id = DiscordGuildId::from(discord_id(guild.get())?);
        let user_id = DiscordUserId::from(discord_id(user.get())?);
        let guild = cache.guild(guild_id)?;
        guild
            .voice_states
            .get(&user_id)
            .and_then(|state| state.channel_id)
            .map(|channel| ChannelId(channel.get()))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        cadence_config::ActivityConfig,
        serenity::all::ActivityType,
    };

    fn presence(kind: ActivityKind, url: Option<&str>) -> PresenceConfig {
        PresenceConfig {
            status: PresenceStatus::Dnd,
            activity: Some(ActivityConfig {
                name: "/play".into(),
                kind,
                url: url.map(str::to_string),
            }),
        }
    }

    #[test]
    fn maps_status() {
        assert_eq!(online_status(PresenceStatus::Dnd), OnlineStatus::DoNotDisturb);
        assert_eq!(online_status(PresenceStatus::Online), OnlineStatus::Online);
    }

    #[test]
    fn maps_activity_kinds() {
        let listening = activity(&presence(ActivityKind::Listening, None));
        assert!(matches!(
            listening,
            Some(ActivityData { kind: ActivityType::Listening, ref name, .. }) if name == "/play"
        ));
        assert!(activity(&PresenceConfig::default()).is_none());
    }

    #[test]
    fn streaming_falls_back_to_playing() {
        let no_url = activity(&presence(ActivityKind::Streaming, None));
        assert!(matches!(no_url, Some(ActivityData { kind: ActivityType::Playing, .. })));

        let with_url = activity(&presence(
            ActivityKind::Streaming,
            Some("https://twitch.tv/cadence"),
        ));
        assert!(matches!(with_url, Some(ActivityData { kind: ActivityType::Streaming, .. })));
    }

    #[test]
    fn detached_cache_reports_nobody_in_voice() {
        let voice = CacheVoiceStates::new();
        assert_eq!(voice.voice_channel_of(GuildId(1), UserId(2)), None);
    }
}
