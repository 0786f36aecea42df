use {
    anyhow::Result,
    cadence_dispatch::{CommandDefinition, CommandInteraction, Reply},
};

use crate::schema::CommandSchema;

pub const NAME: &str = "ping";

pub fn command() -> CommandDefinition {
    CommandDefinition::new(NAME, CommandSchema::new(NAME, "Check that the bot is responsive"))
        .on_execute(execute)
}

async fn execute(interaction: CommandInteraction) -> Result<()> {
    interaction.reply(Reply::ephemeral("Pong!")).await
}
