//! Reply capabilities bound to one gateway event.

use std::sync::Arc;

use {
    anyhow::{Context as _, Result},
    async_trait::async_trait,
    cadence_dispatch::{
        AutocompleteResponder, Button, Choice, InteractionResponder, MessageResponder, Reply,
        ReplyState, ReplyTracker,
    },
    serenity::all::{
        ChannelId as DiscordChannelId, CommandInteraction as SlashInteraction,
        ComponentInteraction as ButtonInteraction, CreateActionRow, CreateAutocompleteResponse,
        CreateButton, CreateInteractionResponse, CreateInteractionResponseMessage,
        EditInteractionResponse, Http,
    },
};

/// The platform caps an action row at five buttons.
const BUTTONS_PER_ROW: usize = 5;

pub(crate) fn action_rows(buttons: &[Button]) -> Vec<CreateActionRow> {
    buttons
        .chunks(BUTTONS_PER_ROW)
        .map(|row| {
            CreateActionRow::Buttons(
                row.iter()
                    .map(|b| CreateButton::new(&b.custom_id).label(&b.label))
                    .collect(),
            )
        })
        .collect()
}

pub(crate) fn response_message(reply: &Reply) -> CreateInteractionResponseMessage {
    let message = CreateInteractionResponseMessage::new()
        .content(&reply.content)
        .ephemeral(reply.ephemeral);
    if reply.buttons.is_empty() {
        message
    } else {
        message.components(action_rows(&reply.buttons))
    }
}

/// Edits replace the buttons too, so stale ones disappear.
pub(crate) fn edit_message(reply: &Reply) -> EditInteractionResponse {
    EditInteractionResponse::new()
        .content(&reply.content)
        .components(action_rows(&reply.buttons))
}

enum Target {
    Command(SlashInteraction),
    Component(ButtonInteraction),
}

/// Responder for slash commands and button clicks.
pub struct DiscordResponder {
    http: Arc<Http>,
    target: Target,
    tracker: ReplyTracker,
}

impl DiscordResponder {
    pub fn command(http: Arc<Http>, interaction: SlashInteraction) -> Self {
        Self {
            http,
            target: Target::Command(interaction),
            tracker: ReplyTracker::default(),
        }
    }

    pub fn component(http: Arc<Http>, interaction: ButtonInteraction) -> Self {
        Self {
            http,
            target: Target::Component(interaction),
            tracker: ReplyTracker::default(),
        }
    }

    async fn create_response(&self, response: CreateInteractionResponse) -> Result<()> {
        let http = self.http.as_ref();
        let result = match &self.target {
            Target::Command(i) => i.create_response(http, response).await,
            Target::Component(i) => i.create_response(http, response).await,
        };
        result.context("failed to create interaction response")
    }
}

#[async_trait]
impl InteractionResponder for DiscordResponder {
    async fn reply(&self, reply: Reply) -> Result<()> {
        self.create_response(CreateInteractionResponse::Message(response_message(&reply)))
            .await?;
        self.tracker.mark_replied();
        Ok(())
    }

    async fn defer(&self, ephemeral: bool) -> Result<()> {
        let message = CreateInteractionResponseMessage::new().ephemeral(ephemeral);
        self.create_response(CreateInteractionResponse::Defer(message))
            .await?;
        self.tracker.mark_deferred();
        Ok(())
    }

    async fn edit(&self, reply: Reply) -> Result<()> {
        let http = self.http.as_ref();
        let edit = edit_message(&reply);
        let result = match &self.target {
            Target::Command(i) => i.edit_response(http, edit).await,
            Target::Component(i) => i.edit_response(http, edit).await,
        };
        result.context("failed to edit interaction response")?;
        self.tracker.mark_replied();
        Ok(())
    }

    fn state(&self) -> ReplyState {
        self.tracker.state()
    }
}

/// Answers an autocomplete request.
pub struct SuggestionResponder {
    http: Arc<Http>,
    interaction: SlashInteraction,
}

impl SuggestionResponder {
    pub fn new(http: Arc<Http>, interaction: SlashInteraction) -> Self {
        Self { http, interaction }
    }
}

#[async_trait]
impl AutocompleteResponder for SuggestionResponder {
    async fn suggest(&self, choices: Vec<Choice>) -> Result<()> {
        let response = choices
            .into_iter()
            .fold(CreateAutocompleteResponse::new(), |r, c| {
                r.add_string_choice(c.name, c.value)
            });
        self.interaction
            .create_response(
                self.http.as_ref(),
                CreateInteractionResponse::Autocomplete(response),
            )
            .await
            .context("failed to send autocomplete choices")
    }
}

/// Plain message in the channel an inbound message came from.
pub struct ChannelResponder {
    http: Arc<Http>,
    channel: DiscordChannelId,
}

impl ChannelResponder {
    pub fn new(http: Arc<Http>, channel: DiscordChannelId) -> Self {
        Self { http, channel }
    }
}

#[async_trait]
impl MessageResponder for ChannelResponder {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.channel
            .say(self.http.as_ref(), text)
            .await
            .with_context(|| format!("failed to send message to channel {}", self.channel))?;
        Ok(())
    }
}
