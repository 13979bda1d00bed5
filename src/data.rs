use std::{sync::Arc, time::Duration};

use chrono_tz::Tz;
use serenity::{model::prelude::*, prelude::*};

use crate::store::ShiftStore;

/// How long the transient role ping stays up
pub const PING_DELETE_DELAY: Duration = Duration::from_secs(60);
/// Interval of the background sweep for due shift removals
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// --- Global Config ---
pub struct ConfigValues {
    pub main_guild_id: GuildId,
    pub shifts_channel_id: ChannelId,
    pub staff_role_id: RoleId,
    pub ping_role_id: RoleId,
    pub timezone: Tz,
}

pub struct LogConfig {
    pub log: Option<ChannelId>,
}

// --- Global Data ---
pub struct ConfigValuesData;
impl TypeMapKey for ConfigValuesData {
    type Value = Arc<ConfigValues>;
}

pub struct LogConfigData;
impl TypeMapKey for LogConfigData {
    type Value = Arc<RwLock<LogConfig>>;
}

pub struct ShiftStoreData;
impl TypeMapKey for ShiftStoreData {
    type Value = Arc<RwLock<ShiftStore>>;
}
