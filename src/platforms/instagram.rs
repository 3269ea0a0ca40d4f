use crate::model::{InstagramStats, PostTypes};
use crate::platforms::{build_client, MAX_SAMPLED_POSTS, MAX_TOP_HASHTAGS};
use crate::InsightError;
use async_trait::async_trait;
use log::{debug, info};
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://i.instagram.com";
// App id the public web client sends; the API rejects requests without it
const WEB_APP_ID: &str = "936619743392459";
const PAGE_SIZE: usize = 12;

/// Public profile record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstagramProfile {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub biography: String,
    pub followers: u64,
    pub followees: u64,
    pub media_count: u64,
    pub is_private: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstagramPost {
    pub likes: u64,
    pub comments: u64,
    pub is_video: bool,
    pub caption: Option<String>,
}

impl InstagramPost {
    /// Lower-cased `#tag` words in the caption, in order of appearance
    pub fn caption_hashtags(&self) -> Vec<String> {
        static HASHTAG: OnceLock<Regex> = OnceLock::new();
        let re = HASHTAG.get_or_init(|| Regex::new(r"#(\w{1,150})").expect("valid hashtag regex"));

        match &self.caption {
            Some(caption) => re
                .captures_iter(caption)
                .map(|c| c[1].to_lowercase())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// One page of a reverse-chronological post stream
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub posts: Vec<InstagramPost>,
    /// Cursor for the next page; `None` once the stream is exhausted
    pub next_cursor: Option<String>,
}

/// Source of Instagram profile data
#[async_trait]
pub trait InstagramSource: Send + Sync {
    async fn profile(&self, username: &str) -> Result<InstagramProfile, InsightError>;

    /// Fetch a page of posts, newest first. `cursor` is `None` for the first page.
    async fn posts(
        &self,
        profile: &InstagramProfile,
        cursor: Option<&str>,
    ) -> Result<PostPage, InsightError>;
}

/// Fetch a profile and compute statistics over its most recent posts
pub async fn fetch_stats(
    source: &dyn InstagramSource,
    handle: &str,
) -> Result<InstagramStats, InsightError> {
    let username = handle.trim().trim_matches('@');
    if username.is_empty() {
        return Err(InsightError::InvalidInput(
            "Instagram username is empty".to_string(),
        ));
    }

    info!("Fetching Instagram profile '{}'", username);
    let profile = source.profile(username).await?;

    let mut sample = PostSample::default();
    if profile.is_private {
        info!(
            "Instagram profile '{}' is private, skipping post analysis",
            profile.username
        );
    } else {
        let mut cursor: Option<String> = None;
        'pages: loop {
            let page = source.posts(&profile, cursor.as_deref()).await?;
            for post in &page.posts {
                sample.record(post);
                if sample.len() >= MAX_SAMPLED_POSTS {
                    break 'pages;
                }
            }
            if page.posts.is_empty() {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        debug!(
            "Sampled {} posts for '{}'",
            sample.len(),
            profile.username
        );
    }

    Ok(sample.into_stats(profile))
}

/// Running totals over visited posts
#[derive(Debug, Default)]
struct PostSample {
    count: u32,
    likes: u64,
    comments: u64,
    post_types: PostTypes,
    // first-seen order is the tie breaker, so keep insertion order
    hashtags: Vec<(String, u32)>,
    hashtag_index: HashMap<String, usize>,
}

impl PostSample {
    fn len(&self) -> usize {
        self.count as usize
    }

    fn record(&mut self, post: &InstagramPost) {
        self.count += 1;
        self.likes += post.likes;
        self.comments += post.comments;

        if post.is_video {
            self.post_types.video += 1;
        } else {
            self.post_types.image += 1;
        }

        for tag in post.caption_hashtags() {
            match self.hashtag_index.get(&tag) {
                Some(&i) => self.hashtags[i].1 += 1,
                None => {
                    self.hashtag_index.insert(tag.clone(), self.hashtags.len());
                    self.hashtags.push((tag, 1));
                }
            }
        }
    }

    fn into_stats(self, profile: InstagramProfile) -> InstagramStats {
        let avg_engagement_rate = engagement_rate(
            self.likes + self.comments,
            u64::from(self.count),
            profile.followers,
        );

        InstagramStats {
            username: profile.username,
            full_name: profile.full_name,
            bio: profile.biography,
            followers: profile.followers,
            following: profile.followees,
            total_posts: profile.media_count,
            is_private: profile.is_private,
            analyzed_posts: self.count,
            post_types: self.post_types,
            top_hashtags: top_hashtags(self.hashtags, MAX_TOP_HASHTAGS),
            avg_engagement_rate,
        }
    }
}

/// Average interactions per post as a percentage of followers, 2 decimals.
/// Zero when there are no samples or no followers.
pub fn engagement_rate(interactions: u64, samples: u64, followers: u64) -> f64 {
    if samples == 0 || followers == 0 {
        return 0.0;
    }
    let rate = interactions as f64 / (samples as f64 * followers as f64) * 100.0;
    (rate * 100.0).round() / 100.0
}

/// Highest counts first; the sort is stable so ties keep their input order
pub fn top_hashtags(mut counts: Vec<(String, u32)>, limit: usize) -> Vec<(String, u32)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

/// Client for Instagram's public web API
pub struct InstagramWebClient {
    client: Client,
    base_url: String,
    session_id: Option<String>,
}

impl InstagramWebClient {
    pub fn new(
        base_url: Option<String>,
        session_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InsightError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            session_id,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, InsightError> {
        let mut request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("x-ig-app-id", WEB_APP_ID)
            .query(query);
        if let Some(session_id) = &self.session_id {
            request = request.header("cookie", format!("sessionid={}", session_id));
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(InsightError::NotFound(format!("Instagram {}", what)))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(InsightError::AccessRestricted(format!(
                    "Instagram refused access to {}",
                    what
                )))
            }
            status if !status.is_success() => {
                return Err(InsightError::upstream(
                    "instagram",
                    format!("{} returned status {}", what, status),
                ))
            }
            _ => {}
        }

        response
            .json::<T>()
            .await
            .map_err(|e| InsightError::upstream("instagram", e))
    }
}

#[derive(Deserialize)]
struct ProfileResponse {
    data: Option<ProfileData>,
}

#[derive(Deserialize)]
struct ProfileData {
    user: Option<WebUser>,
}

#[derive(Deserialize)]
struct WebUser {
    id: String,
    username: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    biography: Option<String>,
    #[serde(default)]
    is_private: bool,
    edge_followed_by: EdgeCount,
    edge_follow: EdgeCount,
    edge_owner_to_timeline_media: EdgeCount,
}

#[derive(Deserialize, Default)]
struct EdgeCount {
    #[serde(default)]
    count: u64,
}

#[derive(Deserialize)]
struct FeedResponse {
    #[serde(default)]
    items: Vec<FeedItem>,
    #[serde(default)]
    more_available: bool,
    next_max_id: Option<String>,
}

#[derive(Deserialize)]
struct FeedItem {
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    comment_count: u64,
    /// 1 = image, 2 = video, 8 = carousel
    #[serde(default)]
    media_type: u8,
    caption: Option<FeedCaption>,
}

#[derive(Deserialize)]
struct FeedCaption {
    text: String,
}

#[async_trait]
impl InstagramSource for InstagramWebClient {
    async fn profile(&self, username: &str) -> Result<InstagramProfile, InsightError> {
        let response: ProfileResponse = self
            .get_json(
                "/api/v1/users/web_profile_info/",
                &[("username", username.to_string())],
                &format!("profile '{}'", username),
            )
            .await?;

        let user = response
            .data
            .and_then(|d| d.user)
            .ok_or_else(|| InsightError::NotFound(format!("Instagram profile '{}'", username)))?;

        Ok(InstagramProfile {
            id: user.id,
            username: user.username,
            full_name: user.full_name.unwrap_or_default(),
            biography: user.biography.unwrap_or_default(),
            followers: user.edge_followed_by.count,
            followees: user.edge_follow.count,
            media_count: user.edge_owner_to_timeline_media.count,
            is_private: user.is_private,
        })
    }

    async fn posts(
        &self,
        profile: &InstagramProfile,
        cursor: Option<&str>,
    ) -> Result<PostPage, InsightError> {
        if profile.is_private {
            return Err(InsightError::AccessRestricted(format!(
                "Instagram profile '{}' is private",
                profile.username
            )));
        }

        let mut query = vec![("count", PAGE_SIZE.to_string())];
        if let Some(cursor) = cursor {
            query.push(("max_id", cursor.to_string()));
        }

        let feed: FeedResponse = self
            .get_json(
                &format!("/api/v1/feed/user/{}/", profile.id),
                &query,
                &format!("posts of '{}'", profile.username),
            )
            .await?;

        let posts = feed
            .items
            .into_iter()
            .map(|item| InstagramPost {
                likes: item.like_count,
                comments: item.comment_count,
                is_video: item.media_type == 2,
                caption: item.caption.map(|c| c.text),
            })
            .collect();

        Ok(PostPage {
            posts,
            next_cursor: if feed.more_available {
                feed.next_max_id
            } else {
                None
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn profile(followers: u64, is_private: bool) -> InstagramProfile {
        InstagramProfile {
            id: "42".to_string(),
            username: "creator".to_string(),
            full_name: "The Creator".to_string(),
            biography: "I make things".to_string(),
            followers,
            followees: 10,
            media_count: 500,
            is_private,
        }
    }

    fn post(likes: u64, comments: u64, is_video: bool, caption: &str) -> InstagramPost {
        InstagramPost {
            likes,
            comments,
            is_video,
            caption: Some(caption.to_string()),
        }
    }

    /// Serves `total` posts in pages of `page_size` and counts visited pages
    struct FakeSource {
        profile: InstagramProfile,
        posts: Vec<InstagramPost>,
        page_size: usize,
        pages_served: AtomicUsize,
    }

    impl FakeSource {
        fn new(profile: InstagramProfile, posts: Vec<InstagramPost>, page_size: usize) -> Self {
            Self {
                profile,
                posts,
                page_size,
                pages_served: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl InstagramSource for FakeSource {
        async fn profile(&self, username: &str) -> Result<InstagramProfile, InsightError> {
            if username == self.profile.username {
                Ok(self.profile.clone())
            } else {
                Err(InsightError::NotFound(username.to_string()))
            }
        }

        async fn posts(
            &self,
            _profile: &InstagramProfile,
            cursor: Option<&str>,
        ) -> Result<PostPage, InsightError> {
            self.pages_served.fetch_add(1, Ordering::SeqCst);
            let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
            let end = (start + self.page_size).min(self.posts.len());
            Ok(PostPage {
                posts: self.posts[start..end].to_vec(),
                next_cursor: (end < self.posts.len()).then(|| end.to_string()),
            })
        }
    }

    #[test]
    fn test_engagement_rate() {
        assert_eq!(engagement_rate(500, 10, 1000), 5.0);
        assert_eq!(engagement_rate(1, 3, 1000), 0.03);
        assert_eq!(engagement_rate(500, 0, 1000), 0.0);
        assert_eq!(engagement_rate(500, 10, 0), 0.0);
    }

    #[test]
    fn test_top_hashtags_sorted_and_capped() {
        // 15 distinct tags, tag{i} appears i+1 times except a tie at the top
        let mut counts: Vec<(String, u32)> = (0..15)
            .map(|i| (format!("tag{}", i), i as u32 + 1))
            .collect();
        counts.push(("late".to_string(), 15));

        let top = top_hashtags(counts, 10);
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
        // tag14 was seen before "late", both have 15
        assert_eq!(top[0], ("tag14".to_string(), 15));
        assert_eq!(top[1], ("late".to_string(), 15));
    }

    #[test]
    fn test_caption_hashtags() {
        let p = post(0, 0, false, "Morning #Yoga and #mindfulness! #yoga_life");
        assert_eq!(p.caption_hashtags(), vec!["yoga", "mindfulness", "yoga_life"]);
        assert!(InstagramPost::default().caption_hashtags().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_stats_aggregates() {
        let posts = vec![
            post(30, 5, false, "#travel #food"),
            post(40, 5, true, "#travel"),
            post(20, 0, false, "no tags"),
            post(10, 0, true, "#food #travel #beach"),
        ];
        let source = FakeSource::new(profile(100, false), posts, 3);

        let stats = fetch_stats(&source, "@creator").await.unwrap();
        assert_eq!(stats.username, "creator");
        assert_eq!(stats.analyzed_posts, 4);
        assert_eq!(stats.post_types, PostTypes { image: 2, video: 2 });
        assert_eq!(
            stats.top_hashtags,
            vec![
                ("travel".to_string(), 3),
                ("food".to_string(), 2),
                ("beach".to_string(), 1)
            ]
        );
        // 110 interactions / (4 * 100) * 100
        assert_eq!(stats.avg_engagement_rate, 27.5);
        assert_eq!(source.pages_served.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_stats_stops_after_twenty_posts() {
        let posts: Vec<_> = (0..50).map(|_| post(1, 1, false, "#x")).collect();
        let source = FakeSource::new(profile(1000, false), posts, 12);

        let stats = fetch_stats(&source, "creator").await.unwrap();
        assert_eq!(stats.analyzed_posts, 20);
        assert_eq!(stats.top_hashtags, vec![("x".to_string(), 20)]);
        // 12 + 8 posts: the third page is never requested
        assert_eq!(source.pages_served.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_stats_with_fifteen_hashtags() {
        let posts: Vec<_> = (0..15)
            .map(|i| {
                let caption: String = (i..15).map(|t| format!("#h{} ", t)).collect();
                post(0, 0, false, &caption)
            })
            .collect();
        let source = FakeSource::new(profile(10, false), posts, 20);

        let stats = fetch_stats(&source, "creator").await.unwrap();
        assert_eq!(stats.top_hashtags.len(), 10);
        assert_eq!(stats.top_hashtags[0], ("h14".to_string(), 15));
        assert!(stats.top_hashtags.windows(2).all(|w| w[0].1 > w[1].1));
    }

    #[tokio::test]
    async fn test_fetch_stats_empty_and_zero_followers() {
        let source = FakeSource::new(profile(0, false), vec![post(100, 100, false, "")], 5);
        let stats = fetch_stats(&source, "creator").await.unwrap();
        assert_eq!(stats.avg_engagement_rate, 0.0);

        let source = FakeSource::new(profile(100, false), Vec::new(), 5);
        let stats = fetch_stats(&source, "creator").await.unwrap();
        assert_eq!(stats.analyzed_posts, 0);
        assert_eq!(stats.avg_engagement_rate, 0.0);
    }

    #[tokio::test]
    async fn test_private_profile_skips_posts() {
        let source = FakeSource::new(profile(100, true), vec![post(1, 1, false, "")], 5);
        let stats = fetch_stats(&source, "creator").await.unwrap();
        assert!(stats.is_private);
        assert_eq!(stats.analyzed_posts, 0);
        assert_eq!(source.pages_served.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_profile() {
        let source = FakeSource::new(profile(100, false), Vec::new(), 5);
        let result = fetch_stats(&source, "someone_else").await;
        assert!(matches!(result, Err(InsightError::NotFound(_))));

        let result = fetch_stats(&source, " @ ").await;
        assert!(matches!(result, Err(InsightError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_web_client_profile_and_feed() {
        let mut server = Server::new_async().await;
        let profile_mock = server
            .mock("GET", "/api/v1/users/web_profile_info/")
            .match_query(Matcher::UrlEncoded("username".into(), "creator".into()))
            .match_header("x-ig-app-id", WEB_APP_ID)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": {"user": {
                    "id": "42",
                    "username": "creator",
                    "full_name": "The Creator",
                    "biography": "bio",
                    "is_private": false,
                    "edge_followed_by": {"count": 1000},
                    "edge_follow": {"count": 12},
                    "edge_owner_to_timeline_media": {"count": 77}
                }}}"#,
            )
            .create_async()
            .await;
        let feed_mock = server
            .mock("GET", "/api/v1/feed/user/42/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r##"{"items": [
                    {"like_count": 10, "comment_count": 2, "media_type": 2, "caption": {"text": "#reel"}},
                    {"like_count": 5, "comment_count": 1, "media_type": 1, "caption": null}
                ], "more_available": false}"##,
            )
            .create_async()
            .await;

        let client =
            InstagramWebClient::new(Some(server.url()), None, Duration::from_secs(5)).unwrap();
        let stats = fetch_stats(&client, "creator").await.unwrap();

        assert_eq!(stats.followers, 1000);
        assert_eq!(stats.following, 12);
        assert_eq!(stats.total_posts, 77);
        assert_eq!(stats.analyzed_posts, 2);
        assert_eq!(stats.post_types, PostTypes { image: 1, video: 1 });
        assert_eq!(stats.top_hashtags, vec![("reel".to_string(), 1)]);
        profile_mock.assert_async().await;
        feed_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_web_client_not_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v1/users/web_profile_info/")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client =
            InstagramWebClient::new(Some(server.url()), None, Duration::from_secs(5)).unwrap();
        let result = client.profile("ghost").await;
        assert!(matches!(result, Err(InsightError::NotFound(_))));
    }
}
