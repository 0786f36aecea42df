//! Gateway client lifecycle.

use std::sync::Arc;

use {
    anyhow::{Context as _, Result},
    cadence_dispatch::Dispatcher,
    secrecy::{ExposeSecret, Secret},
    serenity::all::{Client, GatewayIntents},
    tokio::sync::mpsc,
    tracing::info,
};

use crate::{handler::Handler, platform::CacheVoiceStates};

/// Guild and voice-state events for routing and the voice gate, plus message
/// content for the legacy text trigger.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Connect and serve events until the gateway closes, registration fails or
/// the process is interrupted.
///
/// `voice` must be the voice-state port the dispatcher was built with; the
/// client cache is attached to it here.
pub async fn run(
    token: &Secret<String>,
    dispatcher: Arc<Dispatcher>,
    voice: Arc<CacheVoiceStates>,
) -> Result<()> {
    let (fatal_tx, mut fatal_rx) = mpsc::channel(1);
    let mut client = Client::builder(token.expose_secret(), intents())
        .event_handler(Handler::new(dispatcher, fatal_tx))
        .await
        .context("failed to build discord client")?;
    voice.attach(Arc::clone(&client.cache));
    let shards = Arc::clone(&client.shard_manager);

    info!("connecting to discord gateway");
    let result = tokio::select! {
        started = client.start() => started.context("discord gateway connection ended"),
        Some(e) = fatal_rx.recv() => Err(e.context("startup failed")),
        signal = tokio::signal::ctrl_c() => {
            info!("shutting down");
            signal.context("failed to listen for ctrl-c")
        },
    };

    shards.shutdown_all().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_cover_voice_and_message_content() {
        let intents = intents();
        assert!(intents.contains(GatewayIntents::GUILD_VOICE_STATES));
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(!intents.contains(GatewayIntents::GUILD_PRESENCES));
    }
}
