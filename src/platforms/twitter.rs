//! Twitter/X support is a placeholder: there is no bundled client, callers
//! wire in their own [`TwitterSource`].

use crate::model::TwitterStats;
use crate::InsightError;
use async_trait::async_trait;
use log::info;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TwitterUser {
    pub username: String,
    pub name: String,
    pub followers_count: u64,
    pub following_count: u64,
    pub tweet_count: u64,
}

#[async_trait]
pub trait TwitterSource: Send + Sync {
    async fn user(&self, username: &str) -> Result<TwitterUser, InsightError>;
}

pub async fn fetch_stats(
    source: &dyn TwitterSource,
    username: &str,
) -> Result<TwitterStats, InsightError> {
    let username = username.trim().trim_start_matches('@');
    info!("Fetching Twitter profile '{}'", username);
    let user = source.user(username).await?;

    Ok(TwitterStats {
        username: user.username,
        display_name: user.name,
        followers: user.followers_count,
        following: user.following_count,
        tweet_count: user.tweet_count,
    })
}
