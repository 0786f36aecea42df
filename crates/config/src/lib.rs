//! Configuration loading: schema, file discovery and `${VAR}` substitution.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{TOKEN_ENV, apply_env_overrides, config_dir, discover_and_load, load_config},
    schema::{
        ActivityConfig, ActivityKind, CadenceConfig, CommandsConfig, DiscordConfig, LegacyConfig,
        PresenceConfig, PresenceStatus, VoiceConfig,
    },
};
