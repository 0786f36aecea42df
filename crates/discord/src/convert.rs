//! Gateway payloads → dispatch events.

use std::sync::Arc;

use {
    cadence_dispatch::{
        AutocompleteInteraction, ChannelId, CommandInteraction, CommandKind, CommandOptions,
        ComponentInteraction, FocusedOption, GuildId, InboundEvent, InboundMessage, OptionValue,
        Origin, UserId,
    },
    serenity::all::{
        ChannelId as DiscordChannelId, CommandDataOption, CommandDataOptionValue, CommandType,
        GuildId as DiscordGuildId, Http, Interaction, Message, UserId as DiscordUserId,
    },
};

use crate::responder::{ChannelResponder, DiscordResponder, SuggestionResponder};

pub fn origin(
    guild_id: Option<DiscordGuildId>,
    channel_id: DiscordChannelId,
    user_id: DiscordUserId,
) -> Origin {
    Origin {
        guild_id: guild_id.map(|g| GuildId(g.get())),
        channel_id: Some(ChannelId(channel_id.get())),
        user_id: UserId(user_id.get()),
    }
}

pub fn command_kind(kind: CommandType) -> CommandKind {
    match kind {
        CommandType::ChatInput => CommandKind::ChatInput,
        CommandType::User => CommandKind::User,
        CommandType::Message => CommandKind::Message,
        _ => CommandKind::Unknown,
    }
}

fn option_value(value: &CommandDataOptionValue) -> Option<OptionValue> {
    Some(match value {
        CommandDataOptionValue::String(s) => OptionValue::String(s.clone()),
        CommandDataOptionValue::Integer(i) => OptionValue::Integer(*i),
        CommandDataOptionValue::Number(n) => OptionValue::Number(*n),
        CommandDataOptionValue::Boolean(b) => OptionValue::Boolean(*b),
        CommandDataOptionValue::User(id) => OptionValue::Snowflake(id.get()),
        CommandDataOptionValue::Channel(id) => OptionValue::Snowflake(id.get()),
        CommandDataOptionValue::Role(id) => OptionValue::Snowflake(id.get()),
        CommandDataOptionValue::Mentionable(id) => OptionValue::Snowflake(id.get()),
        // Subcommands, attachments and the focused autocomplete value carry
        // no plain option value.
        _ => return None,
    })
}

/// Top-level options with a plain value.
pub fn command_options(options: &[CommandDataOption]) -> CommandOptions {
    options
        .iter()
        .filter_map(|o| option_value(&o.value).map(|v| (o.name.as_str(), v)))
        .collect()
}

/// Translate one gateway interaction. Replies go out through `http`.
pub fn inbound_event(http: Arc<Http>, interaction: Interaction) -> InboundEvent {
    match interaction {
        Interaction::Command(command) => {
            let origin = origin(command.guild_id, command.channel_id, command.user.id);
            let name = command.data.name.clone();
            let kind = command_kind(command.data.kind);
            let options = command_options(&command.data.options);
            InboundEvent::Command(CommandInteraction::new(
                name,
                kind,
                origin,
                options,
                Arc::new(DiscordResponder::command(http, command)),
            ))
        },
        Interaction::Component(component) => {
            let origin = origin(component.guild_id, component.channel_id, component.user.id);
            let custom_id = component.data.custom_id.clone();
            InboundEvent::Component(ComponentInteraction::new(
                custom_id,
                origin,
                Arc::new(DiscordResponder::component(http, component)),
            ))
        },
        Interaction::Autocomplete(request) => {
            let origin = origin(request.guild_id, request.channel_id, request.user.id);
            let name = request.data.name.clone();
            let focused = request.data.autocomplete().map(|o| FocusedOption {
                name: o.name.to_string(),
                partial: o.value.to_string(),
            });
            let options = command_options(&request.data.options);
            InboundEvent::Autocomplete(
                AutocompleteInteraction::new(
                    name,
                    origin,
                    focused,
                    Arc::new(SuggestionResponder::new(http, request)),
                )
                .with_options(options),
            )
        },
        Interaction::Ping(_) => InboundEvent::Unsupported("ping"),
        Interaction::Modal(_) => InboundEvent::Unsupported("modal"),
        _ => InboundEvent::Unsupported("unknown"),
    }
}

pub fn inbound_message(http: Arc<Http>, message: &Message) -> InboundMessage {
    InboundMessage {
        content: message.content.clone(),
        origin: origin(message.guild_id, message.channel_id, message.author.id),
        author_is_bot: message.author.bot,
        responder: Arc::new(ChannelResponder::new(http, message.channel_id)),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn option(value: serde_json::Value) -> CommandDataOption {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn maps_plain_options() {
        let options = command_options(&[
            option(json!({ "name": "query", "type": 3, "value": "lofi" })),
            option(json!({ "name": "clear", "type": 5, "value": true })),
            option(json!({ "name": "count", "type": 4, "value": 3 })),
            option(json!({ "name": "who", "type": 6, "value": "42" })),
        ]);

        assert_eq!(options.string("query"), Some("lofi"));
        assert_eq!(options.boolean("clear"), Some(true));
        assert_eq!(options.integer("count"), Some(3));
        assert_eq!(options.get("who"), Some(&OptionValue::Snowflake(42)));
    }

    #[test]
    fn skips_focused_autocomplete_value() {
        let options = command_options(&[option(
            json!({ "name": "query", "type": 3, "value": "lo", "focused": true }),
        )]);
        assert!(options.is_empty());
    }

    #[test]
    fn maps_command_kinds_and_origin() {
        assert_eq!(command_kind(CommandType::ChatInput), CommandKind::ChatInput);
        assert_eq!(command_kind(CommandType::User), CommandKind::User);

        let dm = origin(None, DiscordChannelId::new(5), DiscordUserId::new(7));
        assert_eq!(dm.guild_id, None);
        assert_eq!(dm.user_id, UserId(7));

        let guild = origin(
            Some(DiscordGuildId::new(1)),
            DiscordChannelId::new(5),
            DiscordUserId::new(7),
        );
        assert_eq!(guild.guild_id, Some(GuildId(1)));
        assert_eq!(guild.channel_id, Some(ChannelId(5)));
    }
}
