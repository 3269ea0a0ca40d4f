use serde::Serialize;
use std::fmt;

/// Social platforms recognised by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    YouTube,
    Twitter,
    TikTok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::YouTube => "youtube",
            Platform::Twitter => "twitter",
            Platform::TikTok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform plus the identifier its adapter expects (username or full URL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSelector {
    pub platform: Platform,
    pub identifier: String,
}

/// Image vs video split of sampled Instagram posts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PostTypes {
    pub image: u32,
    pub video: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstagramStats {
    pub username: String,
    pub full_name: String,
    pub bio: String,
    pub followers: u64,
    pub following: u64,
    pub total_posts: u64,
    pub is_private: bool,
    /// Number of posts actually visited (at most 20)
    pub analyzed_posts: u32,
    pub post_types: PostTypes,
    /// Up to 10 `(hashtag, count)` pairs, most frequent first
    pub top_hashtags: Vec<(String, u32)>,
    /// Percentage, rounded to 2 decimals
    pub avg_engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoSummary {
    pub title: String,
    pub description: String,
    pub published_at: String,
}

/// Shorts (under 60 seconds) vs regular uploads among recent videos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VideoTypes {
    pub shorts: u32,
    pub regular: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YouTubeStats {
    pub channel_name: String,
    pub description: String,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
    /// At most 10, newest first
    pub recent_videos: Vec<VideoSummary>,
    /// Only present when duration classification ran
    pub video_types: Option<VideoTypes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwitterStats {
    pub username: String,
    pub display_name: String,
    pub followers: u64,
    pub following: u64,
    pub tweet_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TikTokStats {
    pub username: String,
    pub nickname: String,
    pub followers: u64,
    pub following: u64,
    pub total_likes: u64,
    pub video_count: u64,
}

/// Normalized profile statistics, one variant per platform
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum ProfileStats {
    Instagram(InstagramStats),
    YouTube(YouTubeStats),
    Twitter(TwitterStats),
    TikTok(TikTokStats),
}

impl ProfileStats {
    pub fn platform(&self) -> Platform {
        match self {
            ProfileStats::Instagram(_) => Platform::Instagram,
            ProfileStats::YouTube(_) => Platform::YouTube,
            ProfileStats::Twitter(_) => Platform::Twitter,
            ProfileStats::TikTok(_) => Platform::TikTok,
        }
    }
}

/// One recommended product extracted from the model's reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDescriptor {
    pub category: String,
    pub product: String,
    pub reasoning: String,
    /// Keyword text exactly as the model wrote it, e.g. `"yoga mat, sunrise"`
    pub image_keywords: String,
}

impl ProductDescriptor {
    /// Comma-separated keywords, trimmed, in order
    pub fn keywords(&self) -> Vec<String> {
        self.image_keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IllustratedProduct {
    pub descriptor: ProductDescriptor,
    /// Empty means "no visualization available"
    pub image_urls: Vec<String>,
}

/// Output of the recommendation stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendations {
    pub raw_text: String,
    pub products: Vec<IllustratedProduct>,
}
