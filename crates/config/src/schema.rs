//! Config schema types (discord connection, command registration, voice gate,
//! legacy text trigger, presence).

use {
    secrecy::Secret,
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    pub discord: DiscordConfig,
    pub commands: CommandsConfig,
    pub voice: VoiceConfig,
    pub legacy: LegacyConfig,
    pub presence: PresenceConfig,
}

/// Discord connection settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token. Falls back to `DISCORD_TOKEN` when absent.
    pub token: Option<Secret<String>>,
}

/// Command registration settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Register commands on every known guild instead of application-wide.
    /// Guild registration also clears any stale application-wide set.
    pub register_per_guild: bool,
}

/// Voice-channel gate settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// User ids that may run voice commands without being in a voice channel.
    pub exempt_users: Vec<u64>,
}

/// Legacy `?play`-style text trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    pub enabled: bool,
    /// Token a message must start with, followed by whitespace or nothing.
    pub trigger: String,
    /// Registered command the trigger is routed to.
    pub command: String,
    /// Name of the string option the remainder of the message is exposed as.
    pub option: String,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trigger: "?play".into(),
            command: "play".into(),
            option: "query".into(),
        }
    }
}

/// Bot presence published once after command registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub status: PresenceStatus,
    pub activity: Option<ActivityConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    #[default]
    Online,
    Idle,
    Dnd,
    Invisible,
}

/// Displayed activity, e.g. "Listening to /play".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub name: String,
    #[serde(default)]
    pub kind: ActivityKind,
    /// Stream URL; only meaningful for [`ActivityKind::Streaming`].
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Playing,
    #[default]
    Listening,
    Watching,
    Competing,
    Streaming,
}
