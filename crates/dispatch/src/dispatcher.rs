//! Startup orchestration: load once, then on the first ready signal
//! synchronize registrations and publish presence.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use {
    cadence_config::CadenceConfig,
    tracing::{debug, info},
};

use crate::{
    command::CommandDefinition,
    error::{LoadError, RegistrationError},
    ids::GuildId,
    legacy::LegacyRoute,
    presence::PresencePublisher,
    registry::CommandRegistry,
    router::InteractionRouter,
    sync::{RegistrationMode, RegistrationSynchronizer},
    transport::{CommandUploader, PresenceSink, VoiceStates},
    voice_gate::VoiceGate,
};

/// Result of a ready signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// Registration and presence ran.
    Started,
    /// A later ready (reconnect); nothing ran.
    AlreadyStarted,
}

pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    router: Arc<InteractionRouter>,
    synchronizer: RegistrationSynchronizer,
    publisher: PresencePublisher,
    started: AtomicBool,
}

impl Dispatcher {
    /// Load `commands` and wire the router from `config`.
    pub fn from_config(
        config: &CadenceConfig,
        commands: impl IntoIterator<Item = CommandDefinition>,
        voice: Arc<dyn VoiceStates>,
    ) -> Result<Self, LoadError> {
        let registry = Arc::new(CommandRegistry::load(commands)?);
        let legacy = LegacyRoute::from_config(&config.legacy);
        if let Some(route) = &legacy
            && registry.lookup_by_name(&route.command).is_none()
        {
            debug!(trigger = %route.trigger, command = %route.command, "legacy trigger target not loaded");
        }

        let router = InteractionRouter::new(
            Arc::clone(&registry),
            VoiceGate::from_config(&config.voice),
            voice,
            legacy,
        );
        let mode = RegistrationMode::from_per_guild_flag(config.commands.register_per_guild);
        info!(commands = registry.len(), ?mode, "dispatcher ready");

        Ok(Self {
            registry,
            router: Arc::new(router),
            synchronizer: RegistrationSynchronizer::new(mode),
            publisher: PresencePublisher::new(config.presence.clone()),
            started: AtomicBool::new(false),
        })
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn router(&self) -> Arc<InteractionRouter> {
        Arc::clone(&self.router)
    }

    pub fn registration_mode(&self) -> RegistrationMode {
        self.synchronizer.mode()
    }

    /// Handle the connection-ready signal.
    ///
    /// Only the first call synchronizes and publishes presence; presence is
    /// only published after a successful synchronization.
    pub async fn on_ready(
        &self,
        guilds: &[GuildId],
        uploader: &dyn CommandUploader,
        presence: &dyn PresenceSink,
    ) -> Result<ReadyOutcome, RegistrationError> {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("ready signal after startup, skipping registration");
            return Ok(ReadyOutcome::AlreadyStarted);
        }

        info!(
            mode = ?self.synchronizer.mode(),
            guilds = guilds.len(),
            "synchronizing command registrations"
        );
        self.synchronizer
            .sync(&self.registry.payloads(), guilds, uploader)
            .await?;
        self.publisher.publish(presence).await;
        Ok(ReadyOutcome::Started)
    }
}
