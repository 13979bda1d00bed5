use serenity::model::gateway::Activity;
use serenity::prelude::*;

use crate::{
    data::ShiftStoreData,
    logging,
    utils::{GREEN_CIRCLE_EMOJI, RED_CIRCLE_EMOJI},
};

pub async fn update_status(ctx: &Context) {
    logging::log_discord_err_only(
        ctx,
        logging::LogInfo::automatic("Updating status"),
        |trace| async move {
            trace.step("Counting planned shift(s)");
            let planned = {
                let lock = {
                    let data_read = ctx.data.read().await;
                    data_read.get::<ShiftStoreData>().unwrap().clone()
                };
                let store = lock.read().await;
                store.planned_count()
            };
            let activity = match planned {
                0 => Activity::watching(format!("{} no shifts planned", RED_CIRCLE_EMOJI)),
                1 => Activity::watching(format!("{} 1 shift planned", GREEN_CIRCLE_EMOJI)),
                n => Activity::watching(format!("{} {} shifts planned", GREEN_CIRCLE_EMOJI, n)),
            };

            trace.step("Setting activity");
            ctx.set_activity(activity).await;
            Ok(())
        },
    )
    .await;
}
