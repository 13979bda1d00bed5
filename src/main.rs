use std::{
    env,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use chrono_tz::Tz;
use dotenv::dotenv;
use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    model::{application::interaction::Interaction, prelude::*},
    prelude::*,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use shiftboardbot::{
    board::ShiftBoard, data::*, slash_commands, status, store::ShiftStore, tasks,
};

struct Handler {
    sweep_running: AtomicBool,
}

impl Handler {
    fn new() -> Self {
        Self {
            sweep_running: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Connected as {}", ready.user.name);

        let conf = {
            let data_read = ctx.data.read().await;
            data_read.get::<ConfigValuesData>().unwrap().clone()
        };

        info!("Registering slash commands");
        let registered = conf
            .main_guild_id
            .set_application_commands(&ctx.http, |commands| {
                for cmd in slash_commands::AppCommands::create_default() {
                    commands.add_application_command(cmd);
                }
                commands
            })
            .await;
        match registered {
            Ok(cmds) => info!("Registered {} slash command(s)", cmds.len()),
            Err(e) => error!("Failed to register slash commands: {}", e),
        }

        // Catch up on removals that came due while the bot was down
        info!("Running startup sweep");
        match tasks::sweep_once(&ctx).await {
            Ok(n) => info!("Startup sweep removed {} shift(s)", n),
            Err(e) => error!("Startup sweep failed: {}", e),
        }

        info!("Refreshing shift board");
        if let Err(e) = ShiftBoard::update(&ctx).await {
            error!("Failed to refresh the shift board: {}", e);
        }

        status::update_status(&ctx).await;

        // ready fires again on reconnect, only spawn the sweep once
        if !self.sweep_running.swap(true, Ordering::SeqCst) {
            tokio::spawn(tasks::shift_sweep_task(ctx));
        }
    }

    async fn resume(&self, _: Context, _: ResumedEvent) {
        info!("Resumed");
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(aci) = interaction {
            slash_commands::slash_command_interaction(&ctx, &aci).await;
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // Load .env into ENV
    dotenv().ok();

    // Set up logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to start the logger");

    let token = env::var("DISCORD_TOKEN").expect("discord token not set");
    let app_id = env::var("APPLICATION_ID")
        .expect("application id not set")
        .parse::<u64>()
        .expect("Failed to parse application id");

    let main_guild_id = GuildId::from(
        env::var("MAIN_GUILD_ID")
            .expect("MAIN_GUILD_ID not set")
            .parse::<u64>()
            .expect("Failed to parse main guild id"),
    );

    let shifts_channel_id = ChannelId::from(
        env::var("SHIFTS_CHANNEL_ID")
            .expect("SHIFTS_CHANNEL_ID not set")
            .parse::<u64>()
            .expect("Failed to parse shifts channel id"),
    );

    let staff_role_id = RoleId::from(
        env::var("STAFF_ROLE_ID")
            .expect("STAFF_ROLE_ID not set")
            .parse::<u64>()
            .expect("Failed to parse staff role id"),
    );

    let ping_role_id = RoleId::from(
        env::var("PING_ROLE_ID")
            .expect("PING_ROLE_ID not set")
            .parse::<u64>()
            .expect("Failed to parse ping role id"),
    );

    let timezone = match env::var("TIMEZONE") {
        Ok(name) => Tz::from_str(&name).expect("Failed to parse timezone name"),
        Err(_) => chrono_tz::UTC,
    };

    let log_channel = env::var("LOG_CHANNEL_ID")
        .ok()
        .map(|id| ChannelId::from(id.parse::<u64>().expect("Failed to parse log channel id")));

    let data_file = env::var("SHIFT_DATA_FILE").unwrap_or_else(|_| String::from("data.json"));
    let store = ShiftStore::load(&data_file).expect("Failed to load shift data");
    info!(
        "Loaded {} shift(s) from {}",
        store.shifts().len(),
        data_file
    );

    let mut client = Client::builder(&token, GatewayIntents::GUILDS)
        .application_id(app_id)
        .event_handler(Handler::new())
        .await
        .expect("Error creating client");

    {
        let mut data = client.data.write().await;
        data.insert::<ConfigValuesData>(Arc::new(ConfigValues {
            main_guild_id,
            shifts_channel_id,
            staff_role_id,
            ping_role_id,
            timezone,
        }));
        data.insert::<LogConfigData>(Arc::new(RwLock::new(LogConfig { log: log_channel })));
        data.insert::<ShiftStoreData>(Arc::new(RwLock::new(store)));
    }

    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Could not register ctrl+c handler");
        shard_manager.lock().await.shutdown_all().await;
    });

    if let Err(why) = client.start().await {
        println!("An error occurred while running the client: {:?}", why);
    }
}
