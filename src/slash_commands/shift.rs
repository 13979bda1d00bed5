use std::sync::Arc;

use anyhow::{anyhow, Context as ErrContext, Result};
use chrono::Utc;
use serenity::{
    builder::CreateApplicationCommand,
    client::Context,
    model::{
        application::{
            command::CommandOptionType,
            interaction::application_command::{
                ApplicationCommandInteraction, CommandDataOption,
            },
        },
        mention::Mention,
    },
    prelude::RwLock,
};
use tracing::warn;

use crate::{
    board::ShiftBoard,
    data::{ConfigValues, ConfigValuesData, ShiftStoreData},
    logging::{log_discord, LogTrace, ReplyHelper},
    slash_commands::helpers,
    status,
    store::{ShiftError, ShiftStatus, ShiftStore},
    tasks,
    utils::*,
};

pub const CMD_SHIFT: &str = "shift";

const SUB_SETUP: &str = "setup";
const SUB_CREATE: &str = "create";
const SUB_END: &str = "end";
const SUB_CANCEL: &str = "cancel";
const SUB_CLEAR: &str = "clear";

pub fn create() -> CreateApplicationCommand {
    let mut app = CreateApplicationCommand::default();
    app.name(CMD_SHIFT);
    app.description("Shift system");
    app.create_option(|o| {
        o.kind(CommandOptionType::SubCommand);
        o.name(SUB_SETUP);
        o.description("Post a fresh shift board message to the shifts channel")
    });
    app.create_option(|o| {
        o.kind(CommandOptionType::SubCommand);
        o.name(SUB_CREATE);
        o.description("Create a shift");
        o.create_sub_option(|o| {
            o.kind(CommandOptionType::String);
            o.name("title");
            o.description("Shift title");
            o.required(true)
        });
        o.create_sub_option(|o| {
            o.kind(CommandOptionType::String);
            o.name("time");
            o.description("Time (HH:MM or YYYY-MM-DD HH:MM)");
            o.required(true)
        });
        o.create_sub_option(|o| {
            o.kind(CommandOptionType::String);
            o.name("date");
            o.description("Date (YYYY-MM-DD or DD-MM-YYYY). Defaults to the next occurrence")
        })
    });
    app.create_option(|o| {
        o.kind(CommandOptionType::SubCommand);
        o.name(SUB_END);
        o.description("End a shift");
        o.create_sub_option(|o| {
            o.kind(CommandOptionType::String);
            o.name("title");
            o.description("Shift title");
            o.required(true)
        })
    });
    app.create_option(|o| {
        o.kind(CommandOptionType::SubCommand);
        o.name(SUB_CANCEL);
        o.description("Cancel a shift");
        o.create_sub_option(|o| {
            o.kind(CommandOptionType::String);
            o.name("title");
            o.description("Shift title");
            o.required(true)
        })
    });
    app.create_option(|o| {
        o.kind(CommandOptionType::SubCommand);
        o.name(SUB_CLEAR);
        o.description("Delete ALL shifts")
    });
    app
}

async fn store_lock(ctx: &Context) -> Arc<RwLock<ShiftStore>> {
    let data_read = ctx.data.read().await;
    data_read.get::<ShiftStoreData>().unwrap().clone()
}

pub async fn handle(ctx: &Context, aci: &ApplicationCommandInteraction) {
    log_discord(ctx, aci, |trace| async move {
        trace.step("Permission check");
        let conf = {
            let data_read = ctx.data.read().await;
            data_read.get::<ConfigValuesData>().unwrap().clone()
        };
        let allowed = aci
            .member
            .as_ref()
            .map(|m| m.roles.contains(&conf.staff_role_id))
            .unwrap_or(false);
        if !allowed {
            return Err(ShiftError::NoPermission)
                .map_err_reply(|what| helpers::quick_error(ctx, aci, what))
                .await;
        }

        let sub = aci
            .data
            .options
            .get(0)
            .ok_or_else(|| anyhow!("Missing subcommand"))?;
        match sub.name.as_str() {
            SUB_SETUP => setup(ctx, aci, trace).await,
            SUB_CREATE => create_shift(ctx, aci, sub, &conf, trace).await,
            SUB_END => finish_shift(ctx, aci, sub, ShiftStatus::Completed, trace).await,
            SUB_CANCEL => finish_shift(ctx, aci, sub, ShiftStatus::Canceled, trace).await,
            SUB_CLEAR => clear(ctx, aci, trace).await,
            s => Err(anyhow!("Unknown subcommand: {}", s)),
        }
    })
    .await;
}

// Board failures never fail the command that triggered the
// re-render. The board reference recovery happens inside update
async fn refresh_board(ctx: &Context, trace: &LogTrace) {
    trace.step("Updating board");
    if let Err(e) = ShiftBoard::update(ctx).await {
        warn!("Board update failed: {:?}", e);
    }
    status::update_status(ctx).await;
}

async fn setup(
    ctx: &Context,
    aci: &ApplicationCommandInteraction,
    trace: LogTrace,
) -> Result<()> {
    trace.step("Posting fresh board");
    ShiftBoard::publish(ctx)
        .await
        .context("Failed to create the shift board =(")
        .map_err_reply(|what| helpers::quick_error(ctx, aci, what))
        .await?;

    status::update_status(ctx).await;
    helpers::quick_success(
        ctx,
        aci,
        format!("{} Shift board created.", CLIPBOARD_EMOJI),
    )
    .await?;
    Ok(())
}

async fn create_shift(
    ctx: &Context,
    aci: &ApplicationCommandInteraction,
    option: &CommandDataOption,
    conf: &ConfigValues,
    trace: LogTrace,
) -> Result<()> {
    trace.step("Parsing command");
    let cmds = helpers::command_map(option);

    let title = cmds
        .get("title")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Unexpected! Missing title field"))
        .map_err_reply(|what| helpers::quick_error(ctx, aci, what))
        .await?;
    let time = cmds
        .get("time")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Unexpected! Missing time field"))
        .map_err_reply(|what| helpers::quick_error(ctx, aci, what))
        .await?;
    let date = cmds.get("date").and_then(|v| v.as_str());

    trace.step("Parsing shift time");
    let scheduled_at = parse_shift_time(date, time, Utc::now(), conf.timezone)
        .map_err_reply(|what| helpers::quick_info(ctx, aci, what))
        .await?;

    trace.step("Saving shift");
    {
        let lock = store_lock(ctx).await;
        let mut store = lock.write().await;
        store
            .create(title.to_owned(), scheduled_at, Some(aci.user.id.0))
            .context("Unexpected error saving the shift =(")
            .map_err_reply(|what| helpers::quick_error(ctx, aci, what))
            .await?;
    }

    refresh_board(ctx, &trace).await;

    trace.step("Posting role ping");
    let ping = aci
        .channel_id
        .send_message(ctx, |m| {
            m.allowed_mentions(|am| am.roles(vec![conf.ping_role_id]));
            m.content(Mention::from(conf.ping_role_id))
        })
        .await
        .context("Failed to post the shift ping")
        .map_err_reply(|what| helpers::quick_error(ctx, aci, what))
        .await?;
    tasks::schedule_ping_cleanup(ctx.clone(), ping.channel_id, ping.id);

    helpers::quick_success(
        ctx,
        aci,
        format!("{} Shift **{}** created.", CHECK_EMOJI, title),
    )
    .await?;
    Ok(())
}

async fn finish_shift(
    ctx: &Context,
    aci: &ApplicationCommandInteraction,
    option: &CommandDataOption,
    status: ShiftStatus,
    trace: LogTrace,
) -> Result<()> {
    trace.step("Parsing command");
    let cmds = helpers::command_map(option);
    let title = cmds
        .get("title")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Unexpected! Missing title field"))
        .map_err_reply(|what| helpers::quick_error(ctx, aci, what))
        .await?;

    trace.step("Updating shift");
    let res = {
        let lock = store_lock(ctx).await;
        let mut store = lock.write().await;
        let now = Utc::now().timestamp();
        match status {
            ShiftStatus::Completed => store.end(title, now),
            _ => store.cancel(title, now),
        }
        .map(|s| s.clone())
    };
    match res {
        Ok(_) => (),
        Err(e) if e.downcast_ref::<ShiftError>().is_some() => {
            return Err(e)
                .map_err_reply(|what| helpers::quick_info(ctx, aci, what))
                .await;
        }
        Err(e) => {
            return Err(e)
                .context("Unexpected error updating the shift =(")
                .map_err_reply(|what| helpers::quick_error(ctx, aci, what))
                .await;
        }
    }

    refresh_board(ctx, &trace).await;

    let reply = match status {
        ShiftStatus::Completed => format!("{} Shift **{}** ended.", STOP_EMOJI, title),
        _ => format!("{} Shift **{}** has been canceled.", WARNING_EMOJI, title),
    };
    helpers::quick_success(ctx, aci, reply).await?;
    Ok(())
}

async fn clear(
    ctx: &Context,
    aci: &ApplicationCommandInteraction,
    trace: LogTrace,
) -> Result<()> {
    trace.step("Clearing shifts");
    {
        let lock = store_lock(ctx).await;
        let mut store = lock.write().await;
        store
            .clear()
            .context("Unexpected error clearing the shifts =(")
            .map_err_reply(|what| helpers::quick_error(ctx, aci, what))
            .await?;
    }

    refresh_board(ctx, &trace).await;

    helpers::quick_success(
        ctx,
        aci,
        format!("{} All shifts have been deleted.", BROOM_EMOJI),
    )
    .await?;
    Ok(())
}
