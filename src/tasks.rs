// automatic background tasks
use chrono::Utc;
use serenity::{client::Context, model::prelude::*};
use tracing::{error, info};

use crate::{
    board::ShiftBoard,
    data::{ShiftStoreData, PING_DELETE_DELAY, SWEEP_INTERVAL},
    status,
};

/// Runs one sweep over the store and drops every shift whose
/// removal deadline has passed. Updates board and status when
/// something was removed
pub async fn sweep_once(ctx: &Context) -> anyhow::Result<usize> {
    let lock = {
        let data_read = ctx.data.read().await;
        data_read.get::<ShiftStoreData>().unwrap().clone()
    };
    let removed = {
        let mut store = lock.write().await;
        store.sweep_due(Utc::now().timestamp())?
    };
    if !removed.is_empty() {
        for shift in &removed {
            info!("Removed finished shift: {}", shift.title);
        }
        ShiftBoard::update(ctx).await?;
        status::update_status(ctx).await;
    }
    Ok(removed.len())
}

pub async fn shift_sweep_task(ctx: Context) {
    loop {
        if let Err(e) = sweep_once(&ctx).await {
            error!("Shift sweep error: {}", e);
        }
        tokio::time::sleep(SWEEP_INTERVAL).await;
    }
}

/// Deletes the transient role ping after a fixed delay.
/// Best effort, a failed delete is dropped
pub fn schedule_ping_cleanup(ctx: Context, channel_id: ChannelId, message_id: MessageId) {
    tokio::spawn(async move {
        tokio::time::sleep(PING_DELETE_DELAY).await;
        channel_id.delete_message(&ctx, message_id).await.ok();
    });
}
