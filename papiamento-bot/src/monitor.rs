//! Per-subreddit monitoring.
//!
//! Each subreddit gets one task that drains a channel of new-comment batches
//! and pushes every comment through the detection pipeline. Sources and
//! publishers are traits so the loop runs against the reddit client in
//! production and against scripted fakes in tests.

use crate::settings::BotSettings;
use grammar_utils::{LanguageProfile, compose_reply, find_gravest_mistake, verify_language};
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

/// A comment as delivered by the platform. `name` is the fullname the
/// publisher needs to address a reply; the detector never looks at it.
#[derive(Clone, Debug)]
pub struct Comment {
    pub name: String,
    pub author: String,
    pub body: String,
    pub subreddit: String,
}

/// Where new comments come from.
pub trait CommentSource {
    /// Comments currently visible in the subreddit. Read once at startup to
    /// seed the monitoring cursor; backlog comments are never corrected.
    fn backlog(&self, subreddit: &str) -> impl Future<Output = anyhow::Result<Vec<Comment>>> + Send;

    /// Batches of comments that appeared after `seen`, oldest first within
    /// each batch. The stream ends when the receiver is dropped.
    fn subscribe(&self, subreddit: &str, seen: FxHashSet<String>) -> mpsc::Receiver<Vec<Comment>>;
}

/// Where composed replies go.
pub trait ReplyPublisher {
    fn publish(
        &self,
        comment: &Comment,
        text: &str,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

/// Why a reply could not be posted. Every variant is logged and dropped;
/// none of them stops the monitor.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("rate limited")]
    RateLimited,
    #[error("comment no longer exists")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("authentication failed: {0:#}")]
    Auth(anyhow::Error),
    #[error("rejected by the API: {0}")]
    Rejected(String),
}

/// Monitor one subreddit until the source closes the stream.
pub async fn run_monitor<S, P>(
    source: &S,
    publisher: &P,
    bot: &BotSettings,
    language: &LanguageProfile,
    subreddit: &str,
) where
    S: CommentSource,
    P: ReplyPublisher,
{
    let seen = match source.backlog(subreddit).await {
        Ok(backlog) => {
            log::debug!(
                "caught up with {} existing comments in r/{subreddit}",
                backlog.len()
            );
            backlog.into_iter().map(|comment| comment.name).collect()
        }
        Err(e) => {
            log::warn!("backlog read for r/{subreddit} failed, starting blind: {e:#}");
            FxHashSet::default()
        }
    };

    let mut batches = source.subscribe(subreddit, seen);
    log::info!("started monitoring r/{subreddit}");

    while let Some(batch) = batches.recv().await {
        for comment in batch {
            log::trace!(
                "new comment by u/{} in r/{}",
                comment.author,
                comment.subreddit
            );
            handle_comment(publisher, bot, language, &comment).await;
        }
    }

    log::info!("stopped monitoring r/{subreddit}");
}

/// Run one comment through the pipeline and publish the reply, if any.
///
/// A failed or hung publish is logged and dropped so it cannot halt the
/// subreddit's monitor; there is no retry.
async fn handle_comment<P: ReplyPublisher>(
    publisher: &P,
    bot: &BotSettings,
    language: &LanguageProfile,
    comment: &Comment,
) {
    let Some(reply) = build_reply(bot, language, comment) else {
        return;
    };

    log::info!(
        "replying to u/{} in r/{}: {reply}",
        comment.author,
        comment.subreddit
    );

    match tokio::time::timeout(bot.publish_timeout(), publisher.publish(comment, &reply)).await {
        Ok(Ok(())) => log::debug!("reply to {} issued", comment.name),
        Ok(Err(e)) => log::error!("dropping reply to {}: {e}", comment.name),
        Err(_) => log::error!("dropping reply to {}: publish timed out", comment.name),
    }
}

/// The detection pipeline: decide whether `comment` deserves a correction and
/// compose the reply text if so.
pub fn build_reply(
    bot: &BotSettings,
    language: &LanguageProfile,
    comment: &Comment,
) -> Option<String> {
    if comment.author.eq_ignore_ascii_case(&bot.bot_name) {
        // TODO reply to 'bon bot' compliments left under the bot's own comments
        return None;
    }

    let words: Vec<&str> = comment.body.split_whitespace().collect();
    if words.len() <= 2 {
        return None;
    }

    match verify_language(&words, language) {
        Ok(true) => log::trace!("verified papiamento: {:?}", comment.body),
        Ok(false) => return None,
        Err(e) => {
            // Unreachable behind the length guard above.
            log::error!("language verification failed for {}: {e}", comment.name);
            return None;
        }
    }

    let Some(mistake) = find_gravest_mistake(&words, &language.corrections) else {
        log::trace!("no grammar mistake found");
        return None;
    };
    log::trace!("grammar mistake found: {}", mistake.wrong);

    Some(compose_reply(
        &bot.default_reply_message,
        &comment.author,
        mistake,
        &bot.message_footer,
    ))
}
