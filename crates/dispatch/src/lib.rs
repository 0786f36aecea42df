//! Command dispatch core.
//!
//! Commands are plain [`CommandDefinition`] records loaded into a
//! [`CommandRegistry`]. The [`InteractionRouter`] resolves every inbound event
//! against the registry, applies the guild check and the [`VoiceGate`], runs
//! the matching hook and contains whatever goes wrong. The [`Dispatcher`]
//! wires it all up from config and, on the first ready signal, runs the
//! [`RegistrationSynchronizer`] followed by the [`PresencePublisher`].
//!
//! The chat platform itself stays behind the ports in [`transport`].

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod interaction;
pub mod legacy;
pub mod presence;
pub mod registry;
pub mod router;
pub mod sync;
pub mod transport;
pub mod voice_gate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use {
    command::{CommandDefinition, CommandPayload, VoiceRequirement},
    dispatcher::{Dispatcher, ReadyOutcome},
    error::{LoadError, RegistrationError, ReplyDeliveryFault, RoutingFault, Scope},
    ids::{ChannelId, GuildId, UserId},
    interaction::{
        AutocompleteInteraction, Button, Choice, CommandInteraction, CommandKind,
        CommandOptions, ComponentInteraction, FocusedOption, InboundEvent, InboundMessage,
        OptionValue, Origin, Reply,
    },
    legacy::{LegacyRoute, TextInvocation},
    presence::PresencePublisher,
    registry::CommandRegistry,
    router::{InteractionRouter, RouteOutcome},
    sync::{RegistrationMode, RegistrationSynchronizer},
    transport::{
        AutocompleteResponder, CommandUploader, InteractionResponder, MessageResponder,
        PresenceSink, ReplyState, ReplyTracker, VoiceStates,
    },
    voice_gate::VoiceGate,
};
