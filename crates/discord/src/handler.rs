//! Gateway event handler feeding the dispatcher.

use std::sync::Arc;

use {
    async_trait::async_trait,
    cadence_dispatch::{Dispatcher, GuildId, ReadyOutcome},
    serenity::all::{Context, EventHandler, Interaction, Message, Ready},
    tokio::sync::mpsc,
    tracing::{debug, error, info},
};

use crate::{
    convert::{inbound_event, inbound_message},
    platform::{ContextPresence, HttpUploader},
};

/// Forwards gateway events to the dispatcher. Serenity runs each event on
/// its own task, so events are handled concurrently.
pub struct Handler {
    dispatcher: Arc<Dispatcher>,
    fatal: mpsc::Sender<anyhow::Error>,
}

impl Handler {
    /// `fatal` receives the startup registration failure, which ends the
    /// process.
    pub fn new(dispatcher: Arc<Dispatcher>, fatal: mpsc::Sender<anyhow::Error>) -> Self {
        Self { dispatcher, fatal }
    }
}

pub fn ready_guilds(ready: &Ready) -> Vec<GuildId> {
    ready.guilds.iter().map(|g| GuildId(g.id.get())).collect()
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            application = %ready.application.id,
            guilds = ready.guilds.len(),
            "connected"
        );

        ctx.http.set_application_id(ready.application.id);
        let guilds = ready_guilds(&ready);
        let uploader = HttpUploader::new(Arc::clone(&ctx.http));
        let presence = ContextPresence::new(ctx);
        match self.dispatcher.on_ready(&guilds, &uploader, &presence).await {
            Ok(ReadyOutcome::Started) => info!("commands registered"),
            Ok(ReadyOutcome::AlreadyStarted) => debug!("reconnected"),
            Err(e) => {
                error!(error = %e, "command registration failed");
                if self.fatal.try_send(e.into()).is_err() {
                    error!("shutdown channel closed, registration failure not delivered");
                }
            },
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let event = inbound_event(Arc::clone(&ctx.http), interaction);
        let outcome = self.dispatcher.router().route(event).await;
        debug!(?outcome, "interaction routed");
    }

    async fn message(&self, ctx: Context, message: Message) {
        let inbound = inbound_message(Arc::clone(&ctx.http), &message);
        let outcome = self.dispatcher.router().route_message(inbound).await;
        debug!(?outcome, "message routed");
    }
}
