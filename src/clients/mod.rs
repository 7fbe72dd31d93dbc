//! Client modules for outbound chat delivery

pub mod telegram;

pub use telegram::{Notifier, TelegramClient};
