//! TikTok support is a placeholder: there is no bundled client, callers
//! wire in their own [`TikTokSource`].

use crate::model::TikTokStats;
use crate::InsightError;
use async_trait::async_trait;
use log::info;

/// Fields of TikTok's public user info payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TikTokUser {
    pub unique_id: String,
    pub nickname: String,
    pub follower_count: u64,
    pub following_count: u64,
    pub heart_count: u64,
    pub video_count: u64,
}

#[async_trait]
pub trait TikTokSource: Send + Sync {
    /// `Ok(None)` when the user does not exist
    async fn user_info(&self, username: &str) -> Result<Option<TikTokUser>, InsightError>;
}

pub async fn fetch_stats(
    source: &dyn TikTokSource,
    username: &str,
) -> Result<TikTokStats, InsightError> {
    let username = username.trim().trim_start_matches('@');
    info!("Fetching TikTok profile '{}'", username);
    let user = source.user_info(username).await?.ok_or_else(|| {
        InsightError::NotFound(format!("could not fetch TikTok profile for {}", username))
    })?;

    Ok(TikTokStats {
        username: user.unique_id,
        nickname: user.nickname,
        followers: user.follower_count,
        following: user.following_count,
        total_likes: user.heart_count,
        video_count: user.video_count,
    })
}
