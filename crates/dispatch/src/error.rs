//! Error types for the dispatch core.

use std::fmt;

use crate::ids::GuildId;

/// A registration boundary: the whole application or one guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Application,
    Guild(GuildId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application => f.write_str("application"),
            Self::Guild(id) => write!(f, "guild {id}"),
        }
    }
}

/// Loading command definitions failed. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("command #{index} has no name")]
    MissingName { index: usize },
    #[error("command '{name}' has an unserializable definition: {source}")]
    Unserializable {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Synchronizing command definitions with the platform failed.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("application-wide command registration failed: {0:#}")]
    Application(#[source] anyhow::Error),
    #[error("command registration failed for {}", format_scopes(.failed))]
    Partial { failed: Vec<Scope> },
}

fn format_scopes(scopes: &[Scope]) -> String {
    scopes
        .iter()
        .map(Scope::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single inbound event failed. Contained by the router.
#[derive(Debug, thiserror::Error)]
pub enum RoutingFault {
    #[error("handler failed: {0:#}")]
    Handler(#[source] anyhow::Error),
    #[error("handler panicked: {0}")]
    Panicked(String),
    #[error("transport failed: {0:#}")]
    Transport(#[source] anyhow::Error),
}

/// Reporting a [`RoutingFault`] back to the user failed as well.
#[derive(Debug, thiserror::Error)]
#[error("could not deliver error reply: {0:#}")]
pub struct ReplyDeliveryFault(#[source] pub anyhow::Error);
