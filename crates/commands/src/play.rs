//! `/play <query>`: queue a track. Also reachable through the legacy text
//! trigger and offers autocomplete from the guild's queue history.

use std::sync::Arc;

use {
    anyhow::{Result, bail},
    cadence_dispatch::{
        AutocompleteInteraction, Choice, CommandDefinition, CommandInteraction, Reply,
        TextInvocation,
    },
    tracing::debug,
};

use crate::{
    schema::{CommandSchema, OptionKind, OptionSchema},
    tracks::{MAX_TITLE_CHARS, Track, TrackQueue, clamp_title},
};

pub const NAME: &str = "play";
pub const QUERY_OPTION: &str = "query";

const MISSING_QUERY: &str = "Tell me what to play, e.g. `/play lofi beats`.";
pub const QUERY_TOO_LONG: &str = "Track titles are limited to 100 characters.";

pub fn command(queue: Arc<TrackQueue>) -> CommandDefinition {
    let schema = CommandSchema::new(NAME, "Add a track to the queue").option(
        OptionSchema::new(QUERY_OPTION, "Title or search terms", OptionKind::String)
            .required()
            .autocomplete()
            .max_length(MAX_TITLE_CHARS as u16),
    );
    let on_execute = Arc::clone(&queue);
    let on_autocomplete = Arc::clone(&queue);

    CommandDefinition::new(NAME, schema)
        .requires_voice(true)
        .on_execute(move |i| execute(Arc::clone(&on_execute), i))
        .on_autocomplete(move |i| autocomplete(Arc::clone(&on_autocomplete), i))
        .on_text(move |i| text(Arc::clone(&queue), i))
}

fn queued_message(title: &str, position: usize) -> String {
    if position == 1 {
        format!("Now playing **{title}**.")
    } else {
        format!("Queued **{title}** at position {position}.")
    }
}

async fn execute(queue: Arc<TrackQueue>, interaction: CommandInteraction) -> Result<()> {
    let Some(guild) = interaction.origin.guild_id else {
        bail!("play invoked outside a guild");
    };
    let Some(query) = interaction
        .options
        .string(QUERY_OPTION)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| clamp_title(q).to_string())
    else {
        return interaction.reply(Reply::ephemeral(MISSING_QUERY)).await;
    };

    interaction.defer(false).await?;
    let position = queue
        .push(guild, Track {
            title: query.clone(),
            requested_by: interaction.origin.user_id,
        })
        .await;
    debug!(guild_id = %guild, position, "track queued");
    interaction
        .edit(Reply::text(queued_message(&query, position)))
        .await
}

async fn autocomplete(queue: Arc<TrackQueue>, interaction: AutocompleteInteraction) -> Result<()> {
    let choices = match interaction.origin.guild_id {
        Some(guild) => queue
            .suggest(guild, interaction.partial())
            .await
            .into_iter()
            .map(|title| Choice::new(title.clone(), title))
            .collect(),
        None => Vec::new(),
    };
    interaction.suggest(choices).await
}

async fn text(queue: Arc<TrackQueue>, invocation: TextInvocation) -> Result<()> {
    let origin = invocation.origin();
    let Some(guild) = origin.guild_id else {
        bail!("play invoked outside a guild");
    };
    let Some(query) = invocation.string_option(QUERY_OPTION).map(str::to_string) else {
        return invocation.reply(MISSING_QUERY).await;
    };
    if query.chars().count() > MAX_TITLE_CHARS {
        return invocation.reply(QUERY_TOO_LONG).await;
    }

    let position = queue
        .push(guild, Track {
            title: query.clone(),
            requested_by: origin.user_id,
        })
        .await;
    invocation.reply(&queued_message(&query, position)).await
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        cadence_dispatch::{
            ChannelId, CommandKind, CommandOptions, CommandRegistry, FocusedOption, GuildId,
            InboundEvent, InboundMessage, InteractionResponder, InteractionRouter, LegacyRoute,
            MessageResponder, OptionValue, Origin, RouteOutcome, UserId, VoiceGate,
            testing::{
                RecordingMessages, RecordingResponder, RecordingSuggestions, Sent,
                StaticVoiceStates,
            },
        },
    };

    const GUILD: GuildId = GuildId(1);
    const LISTENER: UserId = UserId(2);

    fn router(queue: &Arc<TrackQueue>) -> InteractionRouter {
        InteractionRouter::new(
            Arc::new(CommandRegistry::load([command(Arc::clone(queue))]).unwrap()),
            VoiceGate::default(),
            Arc::new(StaticVoiceStates::default().with(GUILD, LISTENER, ChannelId(3))),
            Some(LegacyRoute::new("?play", NAME, QUERY_OPTION)),
        )
    }

    fn play(query: &str, user: UserId, responder: &Arc<RecordingResponder>) -> InboundEvent {
        InboundEvent::Command(CommandInteraction::new(
            NAME,
            CommandKind::ChatInput,
            Origin::guild(GUILD, user),
            CommandOptions::new().with(QUERY_OPTION, OptionValue::String(query.into())),
            Arc::clone(responder) as Arc<dyn InteractionResponder>,
        ))
    }

    #[tokio::test]
    async fn defers_then_edits_with_position() {
        let queue = Arc::new(TrackQueue::new());
        let router = router(&queue);

        let first = Arc::new(RecordingResponder::default());
        let second = Arc::new(RecordingResponder::default());
        assert_eq!(
            router.route(play("lofi", LISTENER, &first)).await,
            RouteOutcome::Handled
        );
        router.route(play("jazz", LISTENER, &second)).await;

        assert_eq!(first.sent(), vec![
            Sent::Defer { ephemeral: false },
            Sent::Edit(Reply::text("Now playing **lofi**.")),
        ]);
        assert_eq!(
            second.edits(),
            vec![Reply::text("Queued **jazz** at position 2.")]
        );
        assert_eq!(queue.list(GUILD).await.len(), 2);
    }

    #[tokio::test]
    async fn requires_voice() {
        let queue = Arc::new(TrackQueue::new());
        let responder = Arc::new(RecordingResponder::default());

        let outcome = router(&queue)
            .route(play("lofi", UserId(99), &responder))
            .await;

        assert_eq!(outcome, RouteOutcome::VoiceRequired);
        assert!(queue.list(GUILD).await.is_empty());
    }

    #[tokio::test]
    async fn blank_query_is_rejected_ephemerally() {
        let queue = Arc::new(TrackQueue::new());
        let responder = Arc::new(RecordingResponder::default());

        router(&queue).route(play("   ", LISTENER, &responder)).await;

        assert_eq!(responder.replies(), vec![Reply::ephemeral(MISSING_QUERY)]);
        assert!(queue.list(GUILD).await.is_empty());
    }

    #[tokio::test]
    async fn autocomplete_suggests_history() {
        let queue = Arc::new(TrackQueue::new());
        queue
            .push(GUILD, Track {
                title: "Lofi Beats".into(),
                requested_by: LISTENER,
            })
            .await;
        let suggestions = Arc::new(RecordingSuggestions::default());

        router(&queue)
            .route(InboundEvent::Autocomplete(AutocompleteInteraction::new(
                NAME,
                Origin::guild(GUILD, LISTENER),
                Some(FocusedOption {
                    name: QUERY_OPTION.into(),
                    partial: "lof".into(),
                }),
                suggestions.clone(),
            )))
            .await;

        assert_eq!(suggestions.sent(), vec![vec![Choice::new(
            "Lofi Beats",
            "Lofi Beats"
        )]]);
    }

    #[tokio::test]
    async fn legacy_trigger_queues_the_remainder() {
        let queue = Arc::new(TrackQueue::new());
        let messages = Arc::new(RecordingMessages::default());

        let outcome = router(&queue)
            .route_message(InboundMessage {
                content: "?play lofi beats".into(),
                origin: Origin::guild(GUILD, LISTENER),
                author_is_bot: false,
                responder: Arc::clone(&messages) as Arc<dyn MessageResponder>,
            })
            .await;

        assert_eq!(outcome, RouteOutcome::Handled);
        assert_eq!(queue.list(GUILD).await[0].title, "lofi beats");
        assert_eq!(messages.sent(), vec!["Now playing **lofi beats**.".to_string()]);
    }

    #[tokio::test]
    async fn legacy_trigger_rejects_over_long_titles() {
        let queue = Arc::new(TrackQueue::new());
        let messages = Arc::new(RecordingMessages::default());

        let outcome = router(&queue)
            .route_message(InboundMessage {
                content: format!("?play {}", "a".repeat(MAX_TITLE_CHARS + 1)),
                origin: Origin::guild(GUILD, LISTENER),
                author_is_bot: false,
                responder: Arc::clone(&messages) as Arc<dyn MessageResponder>,
            })
            .await;

        assert_eq!(outcome, RouteOutcome::Handled);
        assert!(queue.list(GUILD).await.is_empty());
        assert_eq!(messages.sent(), vec![QUERY_TOO_LONG.to_string()]);
    }

    #[tokio::test]
    async fn over_long_slash_query_is_clamped_in_the_reply() {
        let queue = Arc::new(TrackQueue::new());
        let responder = Arc::new(RecordingResponder::default());

        let outcome = router(&queue)
            .route(play(&"b".repeat(6000), LISTENER, &responder))
            .await;

        assert_eq!(outcome, RouteOutcome::Handled);
        let title = "b".repeat(MAX_TITLE_CHARS);
        assert_eq!(queue.list(GUILD).await[0].title, title);
        assert_eq!(responder.edits(), vec![Reply::text(format!(
            "Now playing **{title}**."
        ))]);
    }

    #[test]
    fn query_option_declares_its_length_limit() {
        let payload = command(Arc::new(TrackQueue::new())).payload_json().unwrap();
        assert_eq!(payload["options"][0]["max_length"], MAX_TITLE_CHARS);
    }
}
