//! Discord transport for the dispatch core.
//!
//! Translates gateway interactions and messages into dispatch events, and
//! implements the dispatch ports (replies, command upload, presence, voice
//! membership) on top of serenity.

pub mod client;
pub mod convert;
pub mod handler;
pub mod platform;
pub mod responder;

pub use {
    client::{intents, run},
    handler::Handler,
    platform::{CacheVoiceStates, ContextPresence, HttpUploader},
    responder::{ChannelResponder, DiscordResponder, SuggestionResponder},
};
