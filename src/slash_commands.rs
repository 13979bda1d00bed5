use std::{fmt::Display, str::FromStr};

use serenity::{
    builder::CreateApplicationCommand,
    client::Context,
    model::application::interaction::application_command::ApplicationCommandInteraction,
};

use tracing::error;

#[derive(Debug)]
pub struct SlashCommandParseError(String);

impl std::fmt::Display for SlashCommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown slash command: {}", self.0)
    }
}

impl std::error::Error for SlashCommandParseError {}

mod shift;

/// All slash commands
#[derive(Debug)]
pub enum AppCommands {
    Shift,
}

/// All commands that should be created when the bot starts
const DEFAULT_COMMANDS: [AppCommands; 1] = [AppCommands::Shift];

impl FromStr for AppCommands {
    type Err = SlashCommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            shift::CMD_SHIFT => Ok(Self::Shift),
            _ => Err(SlashCommandParseError(s.to_owned())),
        }
    }
}

impl Display for AppCommands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shift => write!(f, "{}", shift::CMD_SHIFT),
        }
    }
}

impl AppCommands {
    pub fn create(&self) -> CreateApplicationCommand {
        match self {
            Self::Shift => shift::create(),
        }
    }

    pub fn create_default() -> Vec<CreateApplicationCommand> {
        DEFAULT_COMMANDS
            .iter()
            .map(Self::create)
            .collect::<Vec<_>>()
    }

    async fn handle(&self, ctx: &Context, aci: &ApplicationCommandInteraction) {
        match self {
            Self::Shift => shift::handle(ctx, aci).await,
        }
    }
}

pub async fn slash_command_interaction(ctx: &Context, aci: &ApplicationCommandInteraction) {
    match AppCommands::from_str(&aci.data.name) {
        Ok(cmd) => cmd.handle(ctx, aci).await,
        Err(e) => error!("{}", e),
    }
}

// helper functions for quick replies. Always ephemeral
pub mod helpers {
    use std::collections::HashMap;

    use serde_json::Value;
    use serenity::{
        client::Context,
        model::application::interaction::{
            application_command::{ApplicationCommandInteraction, CommandDataOption},
            InteractionResponseType,
        },
    };

    use crate::utils::{CROSS_EMOJI, WARNING_EMOJI};

    /// Helps to quickly access command options
    pub fn command_map(opt: &CommandDataOption) -> HashMap<String, Value> {
        opt.options
            .iter()
            .filter_map(|o| o.value.as_ref().map(|val| (o.name.clone(), val.clone())))
            .collect()
    }

    async fn respond(
        ctx: &Context,
        aci: &ApplicationCommandInteraction,
        content: String,
    ) -> serenity::Result<()> {
        aci.create_interaction_response(ctx, |r| {
            r.kind(InteractionResponseType::ChannelMessageWithSource);
            r.interaction_response_data(|d| {
                d.ephemeral(true);
                d.content(content)
            })
        })
        .await
    }

    pub async fn quick_success<S: ToString>(
        ctx: &Context,
        aci: &ApplicationCommandInteraction,
        msg: S,
    ) -> serenity::Result<()> {
        respond(ctx, aci, msg.to_string()).await
    }

    pub async fn quick_info<S: ToString>(
        ctx: &Context,
        aci: &ApplicationCommandInteraction,
        msg: S,
    ) -> serenity::Result<()> {
        respond(ctx, aci, format!("{} {}", WARNING_EMOJI, msg.to_string())).await
    }

    pub async fn quick_error<S: ToString>(
        ctx: &Context,
        aci: &ApplicationCommandInteraction,
        msg: S,
    ) -> serenity::Result<()> {
        respond(ctx, aci, format!("{} {}", CROSS_EMOJI, msg.to_string())).await
    }
}
