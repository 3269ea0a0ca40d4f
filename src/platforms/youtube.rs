use crate::model::{VideoSummary, VideoTypes, YouTubeStats};
use crate::platforms::{build_client, MAX_LISTED_VIDEOS, MAX_SAMPLED_POSTS};
use crate::InsightError;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const SHORTS_MAX_SECONDS: u64 = 60;

/// Channel snippet and statistics
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelDetails {
    pub title: String,
    pub description: String,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
}

/// A search hit for a channel upload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoItem {
    pub video_id: Option<String>,
    pub title: String,
    pub description: String,
    pub published_at: String,
}

/// Source of YouTube channel data, shaped after the Data API v3 calls
#[async_trait]
pub trait YouTubeSource: Send + Sync {
    async fn channel_id_for_handle(&self, handle: &str) -> Result<Option<String>, InsightError>;

    /// First channel returned by a free-text channel search
    async fn search_channel(&self, query: &str) -> Result<Option<String>, InsightError>;

    async fn channel_id_for_username(&self, username: &str)
        -> Result<Option<String>, InsightError>;

    async fn channel(&self, channel_id: &str) -> Result<ChannelDetails, InsightError>;

    /// Most recent uploads, newest first
    async fn recent_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<VideoItem>, InsightError>;

    /// ISO 8601 durations (e.g. `PT4M13S`) for the given videos
    async fn video_durations(&self, video_ids: &[String]) -> Result<Vec<String>, InsightError>;
}

/// Which step of the lookup chain produced the channel id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Direct,
    Handle,
    Search,
    LegacyUsername,
}

/// Resolve a channel URL to a channel id.
///
/// Tries, in order: a `channel/<id>` segment, an `@handle` lookup followed by
/// a channel search on the handle text, and a legacy `user/<name>` lookup.
pub async fn resolve_channel_id(
    source: &dyn YouTubeSource,
    channel_url: &str,
) -> Result<(String, Resolution), InsightError> {
    if let Some(id) = segment_after(channel_url, "channel/") {
        return Ok((id.to_string(), Resolution::Direct));
    }

    if let Some(handle) = segment_after(channel_url, "@") {
        if let Some(id) = source
            .channel_id_for_handle(&format!("@{}", handle))
            .await?
        {
            return Ok((id, Resolution::Handle));
        }
        debug!("Handle lookup for '@{}' found nothing, searching", handle);
        if let Some(id) = source.search_channel(handle).await? {
            return Ok((id, Resolution::Search));
        }
        return Err(InsightError::NotFound(format!(
            "could not find YouTube channel for handle '@{}'",
            handle
        )));
    }

    if let Some(username) = segment_after(channel_url, "user/") {
        return match source.channel_id_for_username(username).await? {
            Some(id) => Ok((id, Resolution::LegacyUsername)),
            None => Err(InsightError::NotFound(format!(
                "could not find YouTube channel for username '{}'",
                username
            ))),
        };
    }

    Err(InsightError::InvalidInput(format!(
        "invalid channel URL format: '{}'",
        channel_url
    )))
}

/// Resolve a channel and collect its statistics and latest uploads
pub async fn fetch_stats(
    source: &dyn YouTubeSource,
    channel_url: &str,
    classify_durations: bool,
) -> Result<YouTubeStats, InsightError> {
    let (channel_id, resolution) = resolve_channel_id(source, channel_url).await?;
    info!(
        "Resolved YouTube channel {} via {:?} lookup",
        channel_id, resolution
    );

    let details = source.channel(&channel_id).await?;
    let mut videos = source
        .recent_videos(&channel_id, MAX_SAMPLED_POSTS as u32)
        .await?;
    videos.truncate(MAX_SAMPLED_POSTS);

    let video_types = if classify_durations {
        let ids: Vec<String> = videos.iter().filter_map(|v| v.video_id.clone()).collect();
        Some(count_video_types(source, &ids).await?)
    } else {
        None
    };

    let recent_videos = videos
        .into_iter()
        .take(MAX_LISTED_VIDEOS)
        .map(|v| VideoSummary {
            title: v.title,
            description: v.description,
            published_at: v.published_at,
        })
        .collect();

    Ok(YouTubeStats {
        channel_name: details.title,
        description: details.description,
        subscriber_count: details.subscriber_count,
        video_count: details.video_count,
        view_count: details.view_count,
        recent_videos,
        video_types,
    })
}

async fn count_video_types(
    source: &dyn YouTubeSource,
    video_ids: &[String],
) -> Result<VideoTypes, InsightError> {
    let mut types = VideoTypes::default();
    if video_ids.is_empty() {
        return Ok(types);
    }

    for duration in source.video_durations(video_ids).await? {
        match parse_duration(&duration) {
            Some(seconds) if seconds < SHORTS_MAX_SECONDS => types.shorts += 1,
            Some(_) => types.regular += 1,
            None => warn!("Skipping unparseable video duration '{}'", duration),
        }
    }
    Ok(types)
}

/// Convert an ISO 8601 duration like `PT1H2M3S` or `P1DT30M` to whole seconds
pub fn parse_duration(duration: &str) -> Option<u64> {
    let rest = duration.strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };

    let mut seconds = 0.0_f64;
    for (part, units) in [
        (date_part, &[('W', 604_800.0), ('D', 86_400.0)][..]),
        (time_part, &[('H', 3_600.0), ('M', 60.0), ('S', 1.0)][..]),
    ] {
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                continue;
            }
            let (_, factor) = units.iter().find(|(unit, _)| *unit == c)?;
            let value: f64 = number.parse().ok()?;
            seconds += value * factor;
            number.clear();
        }
        if !number.is_empty() {
            return None;
        }
    }

    Some(seconds.round() as u64)
}

/// The path segment that follows `marker`, with any query string removed
fn segment_after<'a>(url: &'a str, marker: &str) -> Option<&'a str> {
    let start = url.find(marker)? + marker.len();
    let segment = url[start..].split(['/', '?', '#']).next().unwrap_or("");
    (!segment.is_empty()).then_some(segment)
}

/// YouTube Data API v3 client
pub struct YouTubeDataApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeDataApi {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InsightError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<T, InsightError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, resource))
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(InsightError::NotFound(format!(
                "YouTube {} resource",
                resource
            ))),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(InsightError::upstream(
                    "youtube",
                    format!("{} returned status {}: {}", resource, status, body),
                ))
            }
            _ => response
                .json::<T>()
                .await
                .map_err(|e| InsightError::upstream("youtube", e)),
        }
    }

    async fn first_channel_id(&self, params: &[(&str, &str)]) -> Result<Option<String>, InsightError> {
        let response: ListResponse<ChannelIdItem> = self.get("channels", params).await?;
        Ok(response.items.into_iter().next().map(|item| item.id))
    }
}

#[derive(Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct ChannelIdItem {
    id: String,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    channel_id: Option<String>,
    video_id: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    published_at: String,
}

#[derive(Deserialize)]
struct ChannelItem {
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

// Counts arrive as decimal strings; subscriberCount is absent when hidden
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    subscriber_count: Option<String>,
    video_count: Option<String>,
    view_count: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetailsItem {
    content_details: ContentDetails,
}

#[derive(Deserialize)]
struct ContentDetails {
    duration: String,
}

fn parse_count(value: Option<String>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

#[async_trait]
impl YouTubeSource for YouTubeDataApi {
    async fn channel_id_for_handle(&self, handle: &str) -> Result<Option<String>, InsightError> {
        self.first_channel_id(&[("part", "id"), ("forHandle", handle)])
            .await
    }

    async fn search_channel(&self, query: &str) -> Result<Option<String>, InsightError> {
        let response: ListResponse<SearchItem> = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", query),
                    ("type", "channel"),
                    ("maxResults", "1"),
                ],
            )
            .await?;
        Ok(response
            .items
            .into_iter()
            .find_map(|item| item.id.channel_id))
    }

    async fn channel_id_for_username(
        &self,
        username: &str,
    ) -> Result<Option<String>, InsightError> {
        self.first_channel_id(&[("part", "id"), ("forUsername", username)])
            .await
    }

    async fn channel(&self, channel_id: &str) -> Result<ChannelDetails, InsightError> {
        let response: ListResponse<ChannelItem> = self
            .get("channels", &[("part", "statistics,snippet"), ("id", channel_id)])
            .await?;
        let item = response.items.into_iter().next().ok_or_else(|| {
            InsightError::NotFound(format!("YouTube channel '{}'", channel_id))
        })?;

        Ok(ChannelDetails {
            title: item.snippet.title,
            description: item.snippet.description,
            subscriber_count: parse_count(item.statistics.subscriber_count),
            video_count: parse_count(item.statistics.video_count),
            view_count: parse_count(item.statistics.view_count),
        })
    }

    async fn recent_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<VideoItem>, InsightError> {
        let max_results = max_results.to_string();
        let response: ListResponse<SearchItem> = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("channelId", channel_id),
                    ("order", "date"),
                    ("type", "video"),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| VideoItem {
                video_id: item.id.video_id,
                title: item.snippet.title,
                description: item.snippet.description,
                published_at: item.snippet.published_at,
            })
            .collect())
    }

    async fn video_durations(&self, video_ids: &[String]) -> Result<Vec<String>, InsightError> {
        let ids = video_ids.join(",");
        let response: ListResponse<VideoDetailsItem> = self
            .get("videos", &[("part", "contentDetails"), ("id", ids.as_str())])
            .await?;
        Ok(response
            .items
            .into_iter()
            .map(|item| item.content_details.duration)
            .collect())
    }
}
