//! Legacy text trigger (`?play lofi beats`).
//!
//! Plain chat messages that start with the configured trigger are routed to a
//! single registered command. The command sees a [`TextInvocation`]: the rest
//! of the message as one string option plus a plain-text reply channel.

use std::{fmt, sync::Arc};

use {anyhow::Result, cadence_config::LegacyConfig};

use crate::{interaction::Origin, transport::MessageResponder};

/// Where the legacy trigger leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRoute {
    pub trigger: String,
    pub command: String,
    pub option: String,
}

impl LegacyRoute {
    pub fn new(
        trigger: impl Into<String>,
        command: impl Into<String>,
        option: impl Into<String>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            command: command.into(),
            option: option.into(),
        }
    }

    /// `None` when the trigger is disabled or blank.
    pub fn from_config(config: &LegacyConfig) -> Option<Self> {
        if !config.enabled || config.trigger.trim().is_empty() {
            return None;
        }
        Some(Self::new(
            config.trigger.trim(),
            config.command.as_str(),
            config.option.as_str(),
        ))
    }

    /// Returns the argument after the trigger, trimmed, if `content` starts
    /// with the trigger followed by whitespace or the end of the message.
    pub fn match_trigger<'a>(&self, content: &'a str) -> Option<&'a str> {
        let rest = content.trim_start().strip_prefix(self.trigger.as_str())?;
        match rest.chars().next() {
            None => Some(""),
            Some(c) if c.is_whitespace() => Some(rest.trim()),
            Some(_) => None,
        }
    }
}

/// Narrow invocation handed to a command's text hook.
#[derive(Clone)]
pub struct TextInvocation {
    command: String,
    option: String,
    argument: Option<String>,
    origin: Origin,
    responder: Arc<dyn MessageResponder>,
}

impl TextInvocation {
    pub fn new(
        route: &LegacyRoute,
        argument: &str,
        origin: Origin,
        responder: Arc<dyn MessageResponder>,
    ) -> Self {
        Self {
            command: route.command.clone(),
            option: route.option.clone(),
            argument: (!argument.is_empty()).then(|| argument.to_string()),
            origin,
            responder,
        }
    }

    /// The free-form argument, exposed under the route's option name only.
    pub fn string_option(&self, name: &str) -> Option<&str> {
        if name == self.option {
            self.argument.as_deref()
        } else {
            None
        }
    }

    pub fn command_name(&self) -> &str {
        &self.command
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub async fn reply(&self, text: &str) -> Result<()> {
        self.responder.send_text(text).await
    }
}

impl fmt::Debug for TextInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextInvocation")
            .field("command", &self.command)
            .field("option", &self.option)
            .field("argument", &self.argument)
            .field("origin", &self.origin)
            .finish()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            ids::{GuildId, UserId},
            testing::RecordingMessages,
        },
        rstest::rstest,
    };

    fn route() -> LegacyRoute {
        LegacyRoute::new("?play", "play", "query")
    }

    #[rstest]
    #[case("?play lofi beats", Some("lofi beats"))]
    #[case("  ?play\tsong  ", Some("song"))]
    #[case("?play", Some(""))]
    #[case("?playlist", None)]
    #[case("hello ?play x", None)]
    fn trigger_needs_word_boundary(#[case] content: &str, #[case] expected: Option<&str>) {
        assert_eq!(route().match_trigger(content), expected);
    }

    #[test]
    fn disabled_config_has_no_route() {
        let mut config = LegacyConfig::default();
        assert_eq!(LegacyRoute::from_config(&config), Some(route()));
        config.enabled = false;
        assert_eq!(LegacyRoute::from_config(&config), None);
        config.enabled = true;
        config.trigger = "  ".into();
        assert_eq!(LegacyRoute::from_config(&config), None);
    }

    #[tokio::test]
    async fn invocation_exposes_argument_and_replies() {
        let messages = Arc::new(RecordingMessages::default());
        let invocation = TextInvocation::new(
            &route(),
            "lofi beats",
            Origin::guild(GuildId(1), UserId(2)),
            messages.clone(),
        );

        assert_eq!(invocation.string_option("query"), Some("lofi beats"));
        assert_eq!(invocation.string_option("other"), None);
        assert_eq!(invocation.command_name(), "play");

        invocation.reply("queued").await.unwrap();
        assert_eq!(messages.sent(), vec!["queued".to_string()]);
    }

    #[test]
    fn empty_argument_is_absent() {
        let invocation = TextInvocation::new(
            &route(),
            "",
            Origin::guild(GuildId(1), UserId(2)),
            Arc::new(RecordingMessages::default()),
        );
        assert_eq!(invocation.string_option("query"), None);
    }
}
