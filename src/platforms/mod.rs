pub mod instagram;
pub mod tiktok;
pub mod twitter;
pub mod youtube;

pub use instagram::{InstagramSource, InstagramWebClient};
pub use tiktok::TikTokSource;
pub use twitter::TwitterSource;
pub use youtube::{YouTubeDataApi, YouTubeSource};

use crate::InsightError;
use reqwest::Client;
use std::time::Duration;

/// Upper bound on posts or videos visited per profile
pub const MAX_SAMPLED_POSTS: usize = 20;
/// Videos kept with full metadata in the YouTube record
pub const MAX_LISTED_VIDEOS: usize = 10;
pub const MAX_TOP_HASHTAGS: usize = 10;

pub(crate) fn build_client(timeout: Duration) -> Result<Client, InsightError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent("Mozilla/5.0 (compatible; CreatorInsights/0.3)")
        .build()?;
    Ok(client)
}
