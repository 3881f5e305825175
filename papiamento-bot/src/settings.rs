//! Settings file handling.
//!
//! One settings document hosts the profiles of every bot; a process picks its
//! own profile by bot name at startup and treats it as read-only from then on.

use grammar_utils::LanguageProfile;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file")]
    Json(#[from] serde_json::Error),
    #[error("no bot settings found for {0}")]
    UnknownBot(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppSettings {
    pub settings: Vec<BotSettings>,
    pub papiamento: LanguageProfile,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BotSettings {
    /// Key used to select this profile at startup.
    pub bot: String,
    /// The reddit account the bot posts as; comments by this author are
    /// skipped before any other check.
    pub bot_name: String,
    /// Reply template with `{0}` author, `{1}` wrong form, `{2}` right form.
    pub default_reply_message: String,
    /// Appended verbatim to every reply.
    pub message_footer: String,
    pub subreddits: Vec<String>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,
    #[serde(default = "default_listing_limit")]
    pub listing_limit: u32,
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_publish_timeout_secs() -> u64 {
    30
}

fn default_listing_limit() -> u32 {
    100
}

impl AppSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The profile of the named bot. Asking for a name the file does not
    /// contain is fatal at startup.
    pub fn bot(&self, bot: &str) -> Result<&BotSettings, SettingsError> {
        self.settings
            .iter()
            .find(|settings| settings.bot == bot)
            .ok_or_else(|| SettingsError::UnknownBot(bot.to_string()))
    }
}

impl BotSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }
}
