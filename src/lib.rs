pub mod board;
pub mod data;
pub mod embeds;
pub mod logging;
pub mod slash_commands;
pub mod status;
pub mod store;
pub mod tasks;
pub mod utils;
