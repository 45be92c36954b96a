//! This module aggregates all the command modules for the bot.

/// Commands relaying messages to the chat model.
pub(crate) mod ai;
/// General purpose commands (e.g., ping).
pub(crate) mod general;

/// Commands related to music playback (requires the `music` feature).
#[cfg(feature = "music")]
pub mod music;
