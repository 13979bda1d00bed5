use std::sync::Arc;

use anyhow::{Context as ErrContext, Result};
use serenity::{model::prelude::*, prelude::*};
use tracing::warn;

use crate::{
    data::{ConfigValuesData, ShiftStoreData},
    embeds,
    store::{Shift, ShiftStore},
};

/// The single board message in the shifts channel.
/// We are not holding on to any information, everything lives
/// in the store and the context data
pub struct ShiftBoard {}

async fn store_lock(ctx: &Context) -> Arc<RwLock<ShiftStore>> {
    let data_read = ctx.data.read().await;
    data_read.get::<ShiftStoreData>().unwrap().clone()
}

async fn shifts_channel(ctx: &Context) -> ChannelId {
    let data_read = ctx.data.read().await;
    data_read
        .get::<ConfigValuesData>()
        .unwrap()
        .shifts_channel_id
}

async fn send_fresh_board(
    ctx: &Context,
    channel: ChannelId,
    shifts: &[Shift],
) -> Result<MessageId> {
    let msg = channel
        .send_message(ctx, |m| m.set_embed(embeds::board_embed(shifts)))
        .await
        .context("Failed to post the shift board message")?;
    Ok(msg.id)
}

impl ShiftBoard {
    /// Posts a fresh board message and stores its id. A previously
    /// stored message is left dangling on purpose, setup overwrites
    pub async fn publish(ctx: &Context) -> Result<MessageId> {
        let channel = shifts_channel(ctx).await;
        let lock = store_lock(ctx).await;

        let shifts = { lock.read().await.shifts().to_vec() };
        let msg_id = send_fresh_board(ctx, channel, &shifts).await?;
        lock.write()
            .await
            .set_board_message_id(Some(msg_id.0))?;
        Ok(msg_id)
    }

    /// Re-renders the board message from the current shift list.
    ///
    /// Edits the stored message when it still exists. When the fetch
    /// or edit fails the stored reference is treated as invalidated:
    /// it is cleared and a fresh message is posted
    pub async fn update(ctx: &Context) -> Result<()> {
        let channel = shifts_channel(ctx).await;
        let lock = store_lock(ctx).await;

        let (msg_id, shifts) = {
            let store = lock.read().await;
            (store.board_message_id(), store.shifts().to_vec())
        };

        if let Some(id) = msg_id {
            match channel
                .edit_message(ctx, MessageId(id), |m| {
                    m.set_embed(embeds::board_embed(&shifts))
                })
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) => {
                    warn!("Board message {} missing, creating new one: {}", id, e);
                    lock.write().await.set_board_message_id(None)?;
                }
            }
        }

        let msg_id = send_fresh_board(ctx, channel, &shifts).await?;
        lock.write()
            .await
            .set_board_message_id(Some(msg_id.0))?;
        Ok(())
    }
}
