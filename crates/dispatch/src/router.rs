//! Interaction router.
//!
//! Each inbound event is classified, resolved against the registry, checked
//! against the guild and voice preconditions and handed to the matching hook.
//! Errors and panics from any of those steps are contained per event: the
//! fault is logged, one best-effort error reply is sent, and the event ends.
//!
//! Structured command flow:
//!
//! ```text
//! lookup ─► chat-input? ─► in guild? ─► voice gate ─► execute hook
//!   │           │              │             │              │
//!   ▼           ▼              ▼             ▼              ▼
//! ignored    ignored     "outside server"  "join voice"   handled / failed
//! ```

use std::{any::Any, future::Future, panic::AssertUnwindSafe, sync::Arc};

use {
    futures::FutureExt,
    tracing::{debug, warn},
};

use crate::{
    command::CommandDefinition,
    error::{ReplyDeliveryFault, RoutingFault},
    ids::{GuildId, UserId},
    interaction::{
        AutocompleteInteraction, CommandInteraction, CommandKind, ComponentInteraction,
        InboundEvent, InboundMessage, Reply, respond_via,
    },
    legacy::{LegacyRoute, TextInvocation},
    registry::CommandRegistry,
    transport::{InteractionResponder, VoiceStates},
    voice_gate::VoiceGate,
};

pub const OUTSIDE_GUILD_MESSAGE: &str = "This command can only be used inside a server.";
pub const VOICE_REQUIRED_MESSAGE: &str = "You must be in a voice channel to use this command.";
pub const GENERIC_ERROR_MESSAGE: &str = "There was an error while executing this command!";
pub const TEXT_ERROR_MESSAGE: &str = "There was an error trying to execute that command!";
pub const COMMAND_NOT_FOUND_MESSAGE: &str = "Command not found.";

/// How a single event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Not addressed to any command (unknown kind, name, id or trigger).
    Ignored,
    /// The command exists but has no hook for this event kind.
    NoHandler,
    /// Rejected because the event came from a direct message.
    OutsideGuild,
    /// Rejected by the voice gate.
    VoiceRequired,
    /// The legacy trigger points at a command that is not loaded.
    NotFound,
    Handled,
    /// A fault was contained and reported to the user.
    Failed,
}

pub struct InteractionRouter {
    registry: Arc<CommandRegistry>,
    gate: VoiceGate,
    voice: Arc<dyn VoiceStates>,
    legacy: Option<LegacyRoute>,
}

impl InteractionRouter {
    pub fn new(
        registry: Arc<CommandRegistry>,
        gate: VoiceGate,
        voice: Arc<dyn VoiceStates>,
        legacy: Option<LegacyRoute>,
    ) -> Self {
        Self {
            registry,
            gate,
            voice,
            legacy,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Handle one event from the interaction stream. Never fails.
    pub async fn route(&self, event: InboundEvent) -> RouteOutcome {
        match event {
            InboundEvent::Command(interaction) => self.route_command(interaction).await,
            InboundEvent::Component(interaction) => self.route_component(interaction).await,
            InboundEvent::Autocomplete(interaction) => {
                self.route_autocomplete(interaction).await
            },
            InboundEvent::Unsupported(kind) => {
                debug!(kind, "ignoring unsupported interaction");
                RouteOutcome::Ignored
            },
        }
    }

    // ── Structured commands ──────────────────────────────────────────────────

    async fn route_command(&self, interaction: CommandInteraction) -> RouteOutcome {
        let name = interaction.name.clone();
        let origin = interaction.origin;
        let handle = interaction.clone();

        match contain(self.dispatch_command(interaction)).await {
            Ok(outcome) => outcome,
            Err(fault) => {
                warn!(
                    command = %name,
                    guild_id = ?origin.guild_id,
                    user_id = %origin.user_id,
                    error = %fault,
                    "command failed"
                );
                recover_interaction(handle.responder()).await;
                RouteOutcome::Failed
            },
        }
    }

    async fn dispatch_command(
        &self,
        interaction: CommandInteraction,
    ) -> Result<RouteOutcome, RoutingFault> {
        let Some(command) = self.registry.lookup_by_name(&interaction.name).cloned() else {
            debug!(command = %interaction.name, "no command registered under this name");
            return Ok(RouteOutcome::Ignored);
        };
        if interaction.kind != CommandKind::ChatInput {
            debug!(command = %interaction.name, kind = ?interaction.kind, "not a chat-input command");
            return Ok(RouteOutcome::Ignored);
        }

        let user = interaction.origin.user_id;
        let Some(guild) = interaction.origin.guild_id else {
            debug!(command = %interaction.name, user_id = %user, "command used outside a guild");
            interaction
                .reply(Reply::text(OUTSIDE_GUILD_MESSAGE))
                .await
                .map_err(RoutingFault::Transport)?;
            return Ok(RouteOutcome::OutsideGuild);
        };

        if VoiceGate::requires_voice(&command, &interaction) && !self.voice_allows(user, guild) {
            debug!(command = %interaction.name, guild_id = %guild, user_id = %user, "caller not in a voice channel");
            interaction
                .reply(Reply::ephemeral(VOICE_REQUIRED_MESSAGE))
                .await
                .map_err(RoutingFault::Transport)?;
            return Ok(RouteOutcome::VoiceRequired);
        }

        let Some(hook) = command.execute_hook() else {
            return Ok(no_handler(&command, "execute"));
        };
        debug!(command = %interaction.name, guild_id = %guild, user_id = %user, "executing command");
        hook(interaction).await.map_err(RoutingFault::Handler)?;
        Ok(RouteOutcome::Handled)
    }

    // ── UI elements ──────────────────────────────────────────────────────────

    async fn route_component(&self, interaction: ComponentInteraction) -> RouteOutcome {
        let custom_id = interaction.custom_id.clone();
        let handle = interaction.clone();

        match contain(self.dispatch_component(interaction)).await {
            Ok(outcome) => outcome,
            Err(fault) => {
                warn!(custom_id = %custom_id, error = %fault, "button handler failed");
                recover_interaction(handle.responder()).await;
                RouteOutcome::Failed
            },
        }
    }

    async fn dispatch_component(
        &self,
        interaction: ComponentInteraction,
    ) -> Result<RouteOutcome, RoutingFault> {
        let Some(command) = self
            .registry
            .lookup_by_ui_element_id(&interaction.custom_id)
            .cloned()
        else {
            debug!(custom_id = %interaction.custom_id, "no command owns this ui element");
            return Ok(RouteOutcome::Ignored);
        };
        let Some(hook) = command.button_hook() else {
            return Ok(no_handler(&command, "button"));
        };
        debug!(
            command = command.name(),
            custom_id = %interaction.custom_id,
            user_id = %interaction.origin.user_id,
            "handling button"
        );
        hook(interaction).await.map_err(RoutingFault::Handler)?;
        Ok(RouteOutcome::Handled)
    }

    // ── Autocomplete ─────────────────────────────────────────────────────────

    async fn route_autocomplete(&self, interaction: AutocompleteInteraction) -> RouteOutcome {
        let name = interaction.name.clone();
        let handle = interaction.clone();

        match contain(self.dispatch_autocomplete(interaction)).await {
            Ok(outcome) => outcome,
            Err(fault) => {
                warn!(command = %name, error = %fault, "autocomplete handler failed");
                // Autocomplete cannot carry a message; answer with no choices.
                let delivery = AssertUnwindSafe(handle.suggest(Vec::new()))
                    .catch_unwind()
                    .await;
                report_delivery(delivery);
                RouteOutcome::Failed
            },
        }
    }

    async fn dispatch_autocomplete(
        &self,
        interaction: AutocompleteInteraction,
    ) -> Result<RouteOutcome, RoutingFault> {
        let Some(command) = self.registry.lookup_by_name(&interaction.name).cloned() else {
            debug!(command = %interaction.name, "autocomplete for unknown command");
            return Ok(RouteOutcome::Ignored);
        };
        let Some(hook) = command.autocomplete_hook() else {
            return Ok(no_handler(&command, "autocomplete"));
        };
        hook(interaction).await.map_err(RoutingFault::Handler)?;
        Ok(RouteOutcome::Handled)
    }

    // ── Legacy text trigger ──────────────────────────────────────────────────

    /// Handle one plain chat message. Never fails.
    pub async fn route_message(&self, message: InboundMessage) -> RouteOutcome {
        if message.author_is_bot {
            return RouteOutcome::Ignored;
        }
        let Some(guild) = message.origin.guild_id else {
            return RouteOutcome::Ignored;
        };
        let Some(route) = &self.legacy else {
            return RouteOutcome::Ignored;
        };
        let Some(argument) = route.match_trigger(&message.content) else {
            return RouteOutcome::Ignored;
        };

        let invocation = TextInvocation::new(
            route,
            argument,
            message.origin,
            Arc::clone(&message.responder),
        );
        let user = message.origin.user_id;

        match contain(self.dispatch_text(route, guild, invocation)).await {
            Ok(outcome) => outcome,
            Err(fault) => {
                warn!(
                    command = %route.command,
                    guild_id = %guild,
                    user_id = %user,
                    error = %fault,
                    "text command failed"
                );
                let delivery = AssertUnwindSafe(message.responder.send_text(TEXT_ERROR_MESSAGE))
                    .catch_unwind()
                    .await;
                report_delivery(delivery);
                RouteOutcome::Failed
            },
        }
    }

    async fn dispatch_text(
        &self,
        route: &LegacyRoute,
        guild: GuildId,
        invocation: TextInvocation,
    ) -> Result<RouteOutcome, RoutingFault> {
        let Some(command) = self.registry.lookup_by_name(&route.command).cloned() else {
            debug!(command = %route.command, "legacy trigger target is not loaded");
            invocation
                .reply(COMMAND_NOT_FOUND_MESSAGE)
                .await
                .map_err(RoutingFault::Transport)?;
            return Ok(RouteOutcome::NotFound);
        };

        let user = invocation.origin().user_id;
        if VoiceGate::requires_voice_for_text(&command) && !self.voice_allows(user, guild) {
            debug!(command = %route.command, guild_id = %guild, user_id = %user, "caller not in a voice channel");
            invocation
                .reply(VOICE_REQUIRED_MESSAGE)
                .await
                .map_err(RoutingFault::Transport)?;
            return Ok(RouteOutcome::VoiceRequired);
        }

        let Some(hook) = command.text_hook() else {
            return Ok(no_handler(&command, "text"));
        };
        debug!(command = %route.command, guild_id = %guild, user_id = %user, "executing text command");
        hook(invocation).await.map_err(RoutingFault::Handler)?;
        Ok(RouteOutcome::Handled)
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn voice_allows(&self, user: UserId, guild: GuildId) -> bool {
        let channel = if self.gate.is_exempt(user) {
            None
        } else {
            self.voice.voice_channel_of(guild, user)
        };
        self.gate.is_allowed(user, Some(guild), channel)
    }
}

fn no_handler(command: &CommandDefinition, hook: &'static str) -> RouteOutcome {
    debug!(command = command.name(), hook, "command has no hook for this event");
    RouteOutcome::NoHandler
}

/// Run `fut`, turning a panic into [`RoutingFault::Panicked`].
async fn contain<T, F>(fut: F) -> Result<T, RoutingFault>
where
    F: Future<Output = Result<T, RoutingFault>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(RoutingFault::Panicked(panic_message(panic.as_ref()))),
    }
}

/// Edit the existing response to the generic error, or send it as a new
/// ephemeral reply when nothing was sent yet.
async fn recover_interaction(responder: &dyn InteractionResponder) {
    let delivery = AssertUnwindSafe(respond_via(
        responder,
        Reply::ephemeral(GENERIC_ERROR_MESSAGE),
    ))
    .catch_unwind()
    .await;
    report_delivery(delivery);
}

fn report_delivery(delivery: Result<anyhow::Result<()>, Box<dyn Any + Send>>) {
    let error = match delivery {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e,
        Err(panic) => anyhow::anyhow!("panicked: {}", panic_message(panic.as_ref())),
    };
    let fault = ReplyDeliveryFault(error);
    warn!(error = %fault, "error reply not delivered");
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
