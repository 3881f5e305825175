//! Reddit API client: comment listings in, replies out.
//!
//! Authentication is the OAuth2 refresh-token flow; the bearer token is
//! cached and renewed shortly before it expires. One client is shared by all
//! subreddit monitors.

use crate::monitor::{Comment, CommentSource, PublishError, ReplyPublisher};
use anyhow::Context;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, mpsc};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Renew the token a minute early so in-flight requests never race expiry.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

/// How many comment ids a poll task remembers before pruning to the ids still
/// inside the listing window.
const SEEN_CAP: usize = 1000;

/// Reddit app credentials, read from the environment.
#[derive(Clone, Debug)]
pub struct RedditCredentials {
    pub app_id: String,
    pub app_secret: String,
    pub refresh_token: String,
    pub user_agent: String,
}

impl RedditCredentials {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            app_id: std::env::var("REDDIT_APP_ID").context("REDDIT_APP_ID not set")?,
            app_secret: std::env::var("REDDIT_APP_SECRET").context("REDDIT_APP_SECRET not set")?,
            refresh_token: std::env::var("REDDIT_REFRESH_TOKEN")
                .context("REDDIT_REFRESH_TOKEN not set")?,
            user_agent: std::env::var("REDDIT_USER_AGENT").unwrap_or_else(|_| {
                concat!("papiamento-bot/", env!("CARGO_PKG_VERSION")).to_string()
            }),
        })
    }
}

#[derive(Clone)]
pub struct RedditClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    credentials: RedditCredentials,
    poll_interval: Duration,
    listing_limit: u32,
    token: Mutex<Option<BearerToken>>,
}

struct BearerToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Listing of newest comments, as served by `/r/{subreddit}/comments`.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: CommentData,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    name: String,
    author: String,
    body: String,
    subreddit: String,
}

/// Response of `/api/comment` with `api_type=json`. Errors arrive as
/// `[code, message, field]` triples.
#[derive(Debug, Deserialize)]
struct ReplyResponse {
    json: ReplyJson,
}

#[derive(Debug, Deserialize)]
struct ReplyJson {
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
}

impl RedditClient {
    pub fn new(
        credentials: RedditCredentials,
        poll_interval: Duration,
        listing_limit: u32,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(credentials.user_agent.clone())
            .build()
            .context("failed to build the reddit http client")?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                credentials,
                poll_interval,
                listing_limit,
                token: Mutex::new(None),
            }),
        })
    }

    async fn bearer_token(&self) -> anyhow::Result<String> {
        let mut token = self.inner.token.lock().await;
        if let Some(cached) = token.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.access_token.clone());
            }
        }

        let response = self
            .inner
            .http
            .post(TOKEN_URL)
            .basic_auth(
                &self.inner.credentials.app_id,
                Some(&self.inner.credentials.app_secret),
            )
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.inner.credentials.refresh_token.as_str()),
            ])
            .send()
            .await
            .context("token request failed")?
            .error_for_status()
            .context("token request rejected")?
            .json::<TokenResponse>()
            .await
            .context("failed to parse token response")?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(TOKEN_SLACK);
        let access_token = response.access_token.clone();
        *token = Some(BearerToken {
            access_token: response.access_token,
            expires_at: Instant::now() + lifetime,
        });
        Ok(access_token)
    }

    /// Newest comments in the subreddit, oldest first.
    async fn fetch_newest(&self, subreddit: &str) -> anyhow::Result<Vec<Comment>> {
        let token = self.bearer_token().await?;
        let listing = self
            .inner
            .http
            .get(format!("{API_BASE}/r/{subreddit}/comments"))
            .bearer_auth(token)
            .query(&[("limit", self.inner.listing_limit)])
            .send()
            .await?
            .error_for_status()?
            .json::<Listing>()
            .await
            .context("failed to parse comment listing")?;

        // Reddit serves newest first; the monitor wants oldest first.
        let mut comments: Vec<Comment> = listing
            .data
            .children
            .into_iter()
            .map(|child| Comment {
                name: child.data.name,
                author: child.data.author,
                body: child.data.body,
                subreddit: child.data.subreddit,
            })
            .collect();
        comments.reverse();
        Ok(comments)
    }
}

impl CommentSource for RedditClient {
    async fn backlog(&self, subreddit: &str) -> anyhow::Result<Vec<Comment>> {
        self.fetch_newest(subreddit).await
    }

    fn subscribe(&self, subreddit: &str, mut seen: FxHashSet<String>) -> mpsc::Receiver<Vec<Comment>> {
        let (tx, rx) = mpsc::channel(8);
        let client = self.clone();
        let subreddit = subreddit.to_string();

        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(client.inner.poll_interval);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; the backlog read already
            // covered this instant.
            ticks.tick().await;

            loop {
                ticks.tick().await;

                let comments = match client.fetch_newest(&subreddit).await {
                    Ok(comments) => comments,
                    Err(e) => {
                        log::warn!("poll of r/{subreddit} failed: {e:#}");
                        continue;
                    }
                };

                let current: FxHashSet<&str> =
                    comments.iter().map(|c| c.name.as_str()).collect();
                let batch: Vec<Comment> = comments
                    .iter()
                    .filter(|comment| !seen.contains(&comment.name))
                    .cloned()
                    .collect();
                seen.extend(batch.iter().map(|comment| comment.name.clone()));
                if seen.len() > SEEN_CAP {
                    // Ids that fell out of the listing window cannot reappear.
                    seen.retain(|name| current.contains(name.as_str()));
                }

                if batch.is_empty() {
                    continue;
                }
                if tx.send(batch).await.is_err() {
                    // The monitor went away; stop polling.
                    break;
                }
            }
        });

        rx
    }
}

impl ReplyPublisher for RedditClient {
    async fn publish(&self, comment: &Comment, text: &str) -> Result<(), PublishError> {
        let token = self.bearer_token().await.map_err(PublishError::Auth)?;

        let response = self
            .inner
            .http
            .post(format!("{API_BASE}/api/comment"))
            .bearer_auth(token)
            .form(&[
                ("api_type", "json"),
                ("thing_id", comment.name.as_str()),
                ("text", text),
            ])
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(PublishError::RateLimited),
            reqwest::StatusCode::FORBIDDEN => return Err(PublishError::Forbidden),
            reqwest::StatusCode::NOT_FOUND => return Err(PublishError::NotFound),
            _ => {}
        }

        let reply: ReplyResponse = response.error_for_status()?.json().await?;
        if let Some(error) = reply.json.errors.first() {
            if error.first().and_then(|code| code.as_str()) == Some("RATELIMIT") {
                return Err(PublishError::RateLimited);
            }
            let detail = error
                .iter()
                .filter_map(|part| part.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(PublishError::Rejected(detail));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comment_listing() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "children": [
                    {
                        "kind": "t1",
                        "data": {
                            "name": "t1_abc",
                            "author": "anna",
                            "body": "mi ta kana",
                            "subreddit": "curacao",
                            "score": 5
                        }
                    }
                ]
            }
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.data.children.len(), 1);
        assert_eq!(listing.data.children[0].data.name, "t1_abc");
        assert_eq!(listing.data.children[0].data.body, "mi ta kana");
    }

    #[test]
    fn test_parse_reply_errors() {
        let json = r#"{
            "json": {
                "errors": [["RATELIMIT", "you are doing that too much", "ratelimit"]]
            }
        }"#;
        let reply: ReplyResponse = serde_json::from_str(json).unwrap();
        let error = reply.json.errors.first().unwrap();
        assert_eq!(error[0].as_str(), Some("RATELIMIT"));
    }

    #[test]
    fn test_parse_reply_without_errors() {
        let json = r#"{ "json": { "data": { "things": [] } } }"#;
        let reply: ReplyResponse = serde_json::from_str(json).unwrap();
        assert!(reply.json.errors.is_empty());
    }
}
