//! Platform-shaped command definitions, serialized into the bulk-upload body.

use serde::{Serialize, Serializer};

/// Chat-input (slash) command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSchema>,
    pub dm_permission: bool,
}

const CHAT_INPUT: u8 = 1;

impl CommandSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: CHAT_INPUT,
            options: Vec::new(),
            dm_permission: false,
        }
    }

    pub fn option(mut self, option: OptionSchema) -> Self {
        self.options.push(option);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
}

impl OptionKind {
    fn code(self) -> u8 {
        match self {
            Self::String => 3,
            Self::Integer => 4,
            Self::Boolean => 5,
        }
    }
}

impl Serialize for OptionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub autocomplete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
}

impl OptionSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            autocomplete: false,
            max_length: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }

    /// Upper bound on a string option's length, enforced by the client.
    pub fn max_length(mut self, max: u16) -> Self {
        self.max_length = Some(max);
        self
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn serializes_in_platform_shape() {
        let schema = CommandSchema::new("play", "Queue a track").option(
            OptionSchema::new("query", "What to play", OptionKind::String)
                .required()
                .autocomplete()
                .max_length(100),
        );

        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "name": "play",
                "description": "Queue a track",
                "type": 1,
                "dm_permission": false,
                "options": [{
                    "name": "query",
                    "description": "What to play",
                    "type": 3,
                    "required": true,
                    "autocomplete": true,
                    "max_length": 100,
                }],
            })
        );
    }

    #[test]
    fn omits_empty_options() {
        let value = serde_json::to_value(CommandSchema::new("ping", "Check latency")).unwrap();
        assert!(value.get("options").is_none());
        assert_eq!(value["type"], 1);
    }
}
