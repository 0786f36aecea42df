//! Voice gate: who may run a command that needs a voice channel.

use std::{
    collections::HashSet,
    panic::{AssertUnwindSafe, catch_unwind},
};

use {cadence_config::VoiceConfig, tracing::warn};

use crate::{
    command::{CommandDefinition, VoiceRequirement},
    ids::{ChannelId, GuildId, UserId},
    interaction::CommandInteraction,
};

/// Voice-channel precondition with a fixed exemption list.
#[derive(Debug, Clone, Default)]
pub struct VoiceGate {
    exempt: HashSet<UserId>,
}

impl VoiceGate {
    pub fn new(exempt: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            exempt: exempt.into_iter().collect(),
        }
    }

    pub fn from_config(config: &VoiceConfig) -> Self {
        Self::new(config.exempt_users.iter().copied().map(UserId))
    }

    pub fn is_exempt(&self, caller: UserId) -> bool {
        self.exempt.contains(&caller)
    }

    /// Exempt callers always pass. Everyone else needs a guild and a voice
    /// channel in it.
    pub fn is_allowed(
        &self,
        caller: UserId,
        guild: Option<GuildId>,
        voice_channel: Option<ChannelId>,
    ) -> bool {
        if self.is_exempt(caller) {
            return true;
        }
        guild.is_some() && voice_channel.is_some()
    }

    /// Resolve the command's requirement for this invocation. A dynamic
    /// requirement that errors or panics counts as required.
    pub fn requires_voice(command: &CommandDefinition, interaction: &CommandInteraction) -> bool {
        match command.voice_requirement() {
            VoiceRequirement::Static(required) => *required,
            VoiceRequirement::Dynamic(predicate) => {
                match catch_unwind(AssertUnwindSafe(|| predicate(interaction))) {
                    Ok(Ok(required)) => required,
                    Ok(Err(e)) => {
                        warn!(command = command.name(), error = %e, "voice requirement check failed");
                        true
                    },
                    Err(_) => {
                        warn!(command = command.name(), "voice requirement check panicked");
                        true
                    },
                }
            },
        }
    }

    /// Requirement on the text path, where no structured interaction exists
    /// to evaluate a dynamic requirement against.
    pub fn requires_voice_for_text(command: &CommandDefinition) -> bool {
        match command.voice_requirement() {
            VoiceRequirement::Static(required) => *required,
            VoiceRequirement::Dynamic(_) => true,
        }
    }
}
