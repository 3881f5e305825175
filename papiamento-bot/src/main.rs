//! Reddit bot that watches configured subreddits for Papiamento comments
//! containing a known grammar mistake and replies with the correction.

mod monitor;
mod reddit;
mod settings;

use anyhow::Context;
use clap::Parser;
use monitor::run_monitor;
use reddit::{RedditClient, RedditCredentials};
use settings::AppSettings;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
struct Cli {
    /// Path to the settings file.
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,

    /// Which bot profile in the settings file to run.
    #[arg(long, default_value = "PapiamentoBot")]
    bot: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app = AppSettings::load(&cli.settings)
        .with_context(|| format!("failed to load settings from {}", cli.settings.display()))?;
    let bot = Arc::new(app.bot(&cli.bot)?.clone());
    let language = Arc::new(app.papiamento);

    let credentials = RedditCredentials::from_env()?;
    let client = RedditClient::new(credentials, bot.poll_interval(), bot.listing_limit)?;

    log::info!("started {}", bot.bot_name);

    let monitors = bot.subreddits.iter().cloned().map(|subreddit| {
        let client = client.clone();
        let bot = Arc::clone(&bot);
        let language = Arc::clone(&language);
        tokio::spawn(async move {
            run_monitor(&client, &client, &bot, &language, &subreddit).await;
        })
    });
    let monitors = futures::future::join_all(monitors);

    tokio::select! {
        _ = monitors => log::warn!("all subreddit monitors stopped"),
        _ = tokio::signal::ctrl_c() => log::info!("shutting down"),
    }

    Ok(())
}
