//! `/queue [clear]`: show the queue with a skip button, or clear it.
//!
//! Only clearing needs the caller in a voice channel; listing is open to
//! everyone in the guild.

use std::{fmt::Write as _, sync::Arc};

use {
    anyhow::{Result, bail},
    cadence_dispatch::{CommandDefinition, CommandInteraction, ComponentInteraction, Reply},
    tracing::debug,
};

use crate::{
    schema::{CommandSchema, OptionKind, OptionSchema},
    tracks::TrackQueue,
};

pub const NAME: &str = "queue";
pub const CLEAR_OPTION: &str = "clear";
pub const SKIP_BUTTON_ID: &str = "queue:skip";

const EMPTY: &str = "The queue is empty.";
/// Longest listing shown; the rest is summarized.
const MAX_LISTED: usize = 10;

pub fn command(queue: Arc<TrackQueue>) -> CommandDefinition {
    let schema = CommandSchema::new(NAME, "Show or clear the track queue").option(OptionSchema::new(
        CLEAR_OPTION,
        "Remove every queued track",
        OptionKind::Boolean,
    ));
    let on_execute = Arc::clone(&queue);

    CommandDefinition::new(NAME, schema)
        .requires_voice_when(|i| Ok(i.options.boolean(CLEAR_OPTION).unwrap_or(false)))
        .owns_ui_element(SKIP_BUTTON_ID)
        .on_execute(move |i| execute(Arc::clone(&on_execute), i))
        .on_button(move |i| skip(Arc::clone(&queue), i))
}

async fn execute(queue: Arc<TrackQueue>, interaction: CommandInteraction) -> Result<()> {
    let Some(guild) = interaction.origin.guild_id else {
        bail!("queue invoked outside a guild");
    };

    if interaction.options.boolean(CLEAR_OPTION).unwrap_or(false) {
        let removed = queue.clear(guild).await;
        debug!(guild_id = %guild, removed, "queue cleared");
        return interaction
            .reply(Reply::text(format!("Cleared {removed} track(s).")))
            .await;
    }

    let tracks = queue.list(guild).await;
    if tracks.is_empty() {
        return interaction.reply(Reply::ephemeral(EMPTY)).await;
    }

    let mut listing = String::new();
    for (index, track) in tracks.iter().take(MAX_LISTED).enumerate() {
        let _ = writeln!(listing, "{}. {} (<@{}>)", index + 1, track.title, track.requested_by);
    }
    if tracks.len() > MAX_LISTED {
        let _ = writeln!(listing, "…and {} more", tracks.len() - MAX_LISTED);
    }
    interaction
        .reply(Reply::text(listing.trim_end()).with_button(SKIP_BUTTON_ID, "Skip"))
        .await
}

async fn skip(queue: Arc<TrackQueue>, interaction: ComponentInteraction) -> Result<()> {
    let Some(guild) = interaction.origin.guild_id else {
        return interaction.reply(Reply::ephemeral(EMPTY)).await;
    };
    match queue.pop(guild).await {
        Some(track) => {
            interaction
                .reply(Reply::text(format!("Skipped **{}**.", track.title)))
                .await
        },
        None => interaction.reply(Reply::ephemeral(EMPTY)).await,
    }
}
