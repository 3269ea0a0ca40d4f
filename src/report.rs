use std::fmt::{self, Display, Formatter};

use serde_json::{json, Value};

use crate::analyzer::AnalysisReport;
use crate::model::{
    IllustratedProduct, InstagramStats, ProfileStats, Recommendations, TikTokStats, TwitterStats,
    YouTubeStats,
};

const TOP_HASHTAGS_SHOWN: usize = 10;

/// `1234567` → `"1,234,567"`
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn write_instagram(f: &mut Formatter<'_>, s: &InstagramStats) -> fmt::Result {
    writeln!(f, "== Profile Information ==")?;
    writeln!(f, "Username: {}", s.username)?;
    writeln!(f, "Full Name: {}", s.full_name)?;
    writeln!(f, "Bio: {}", s.bio)?;
    writeln!(f, "Followers: {}", group_digits(s.followers))?;
    writeln!(f, "Following: {}", group_digits(s.following))?;
    writeln!(f, "Total Posts: {}", group_digits(s.total_posts))?;
    writeln!(f, "Private Account: {}", yes_no(s.is_private))?;

    if s.is_private {
        return Ok(());
    }

    writeln!(f)?;
    writeln!(f, "== Content Analysis ==")?;
    writeln!(f, "Analyzed Posts: Last {} posts", s.analyzed_posts)?;
    writeln!(f, "Average Engagement Rate: {:.2}%", s.avg_engagement_rate)?;
    writeln!(f, "Content Mix:")?;
    writeln!(f, "- Images: {}", s.post_types.image)?;
    writeln!(f, "- Videos: {}", s.post_types.video)?;

    writeln!(f)?;
    writeln!(f, "== Top Hashtags ==")?;
    if s.top_hashtags.is_empty() {
        writeln!(f, "(none)")?;
    }
    for (tag, count) in s.top_hashtags.iter().take(TOP_HASHTAGS_SHOWN) {
        writeln!(f, "#{}: {} posts", tag, count)?;
    }
    Ok(())
}

fn write_youtube(f: &mut Formatter<'_>, s: &YouTubeStats) -> fmt::Result {
    writeln!(f, "== Channel Information ==")?;
    writeln!(f, "Channel: {}", s.channel_name)?;
    writeln!(f, "Description: {}", s.description)?;
    writeln!(f, "Subscribers: {}", group_digits(s.subscriber_count))?;
    writeln!(f, "Videos: {}", group_digits(s.video_count))?;
    writeln!(f, "Total Views: {}", group_digits(s.view_count))?;

    if let Some(types) = s.video_types {
        writeln!(f, "Content Mix:")?;
        writeln!(f, "- Shorts: {}", types.shorts)?;
        writeln!(f, "- Regular: {}", types.regular)?;
    }

    writeln!(f)?;
    writeln!(f, "== Recent Videos ==")?;
    if s.recent_videos.is_empty() {
        writeln!(f, "(none)")?;
    }
    for video in &s.recent_videos {
        writeln!(f, "- {} ({})", video.title, video.published_at)?;
    }
    Ok(())
}

fn write_twitter(f: &mut Formatter<'_>, s: &TwitterStats) -> fmt::Result {
    writeln!(f, "== Profile Information ==")?;
    writeln!(f, "Username: {}", s.username)?;
    writeln!(f, "Display Name: {}", s.display_name)?;
    writeln!(f, "Followers: {}", group_digits(s.followers))?;
    writeln!(f, "Following: {}", group_digits(s.following))?;
    writeln!(f, "Tweets: {}", group_digits(s.tweet_count))
}

fn write_tiktok(f: &mut Formatter<'_>, s: &TikTokStats) -> fmt::Result {
    writeln!(f, "== Profile Information ==")?;
    writeln!(f, "Username: {}", s.username)?;
    writeln!(f, "Nickname: {}", s.nickname)?;
    writeln!(f, "Followers: {}", group_digits(s.followers))?;
    writeln!(f, "Following: {}", group_digits(s.following))?;
    writeln!(f, "Total Likes: {}", group_digits(s.total_likes))?;
    writeln!(f, "Videos: {}", group_digits(s.video_count))
}

fn write_product(f: &mut Formatter<'_>, index: usize, item: &IllustratedProduct) -> fmt::Result {
    let d = &item.descriptor;
    writeln!(f, "Product {}: {}", index, d.category)?;
    if !d.product.is_empty() {
        writeln!(f, "  {}", d.product)?;
    }
    if !d.reasoning.is_empty() {
        writeln!(f, "  Why: {}", d.reasoning)?;
    }
    if item.image_urls.is_empty() {
        writeln!(f, "  No visualization available")?;
    }
    for url in &item.image_urls {
        writeln!(f, "  Image: {}", url)?;
    }
    Ok(())
}

impl Display for Recommendations {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Nothing structured came back, show what the model said
        if self.products.is_empty() {
            return writeln!(f, "{}", self.raw_text.trim());
        }
        for (i, item) in self.products.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write_product(f, i + 1, item)?;
        }
        Ok(())
    }
}

impl Display for ProfileStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProfileStats::Instagram(s) => write_instagram(f, s),
            ProfileStats::YouTube(s) => write_youtube(f, s),
            ProfileStats::Twitter(s) => write_twitter(f, s),
            ProfileStats::TikTok(s) => write_tiktok(f, s),
        }
    }
}

impl Display for AnalysisReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stats)?;

        match &self.recommendations {
            None => Ok(()),
            Some(Ok(recommendations)) => {
                writeln!(f)?;
                writeln!(f, "== Digital Product Recommendations ==")?;
                write!(f, "{}", recommendations)
            }
            Some(Err(e)) => {
                writeln!(f)?;
                writeln!(f, "== Digital Product Recommendations ==")?;
                writeln!(f, "Unavailable: {}", e)
            }
        }
    }
}

impl AnalysisReport {
    /// Pretty-printed JSON form. A failed recommendation stage becomes
    /// `{"error": {"kind", "message"}}`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let recommendations = match &self.recommendations {
            None => Value::Null,
            Some(Ok(recommendations)) => serde_json::to_value(recommendations)?,
            Some(Err(e)) => json!({
                "error": {"kind": e.kind(), "message": e.to_string()}
            }),
        };
        let report = json!({
            "identifier": self.selector.identifier,
            "stats": serde_json::to_value(&self.stats)?,
            "recommendations": recommendations,
        });
        serde_json::to_string_pretty(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Platform, PlatformSelector, PostTypes, ProductDescriptor, VideoSummary, VideoTypes,
    };
    use crate::InsightError;

    fn instagram(is_private: bool) -> ProfileStats {
        ProfileStats::Instagram(InstagramStats {
            username: "bakerbee".to_string(),
            full_name: "Bee Baker".to_string(),
            bio: "Bread every day".to_string(),
            followers: 12000,
            following: 310,
            total_posts: 1543,
            is_private,
            analyzed_posts: if is_private { 0 } else { 20 },
            post_types: PostTypes { image: 15, video: 5 },
            top_hashtags: vec![("sourdough".to_string(), 9), ("baking".to_string(), 4)],
            avg_engagement_rate: 4.5,
        })
    }

    fn report(
        stats: ProfileStats,
        recommendations: Option<Result<Recommendations, InsightError>>,
    ) -> AnalysisReport {
        AnalysisReport {
            selector: PlatformSelector {
                platform: stats.platform(),
                identifier: "bakerbee".to_string(),
            },
            stats,
            recommendations,
        }
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1000), "1,000");
        assert_eq!(group_digits(12000), "12,000");
        assert_eq!(group_digits(1234567), "1,234,567");
    }

    #[test]
    fn test_instagram_profile() {
        let text = report(instagram(false), None).to_string();
        assert!(text.contains("Followers: 12,000"));
        assert!(text.contains("Total Posts: 1,543"));
        assert!(text.contains("Private Account: No"));
        assert!(text.contains("Average Engagement Rate: 4.50%"));
        assert!(text.contains("#sourdough: 9 posts"));
        assert!(!text.contains("Recommendations"));
    }

    #[test]
    fn test_private_profile_hides_content_analysis() {
        let text = report(
            instagram(true),
            Some(Err(InsightError::AccessRestricted(
                "profile is private".to_string(),
            ))),
        )
        .to_string();
        assert!(text.contains("Private Account: Yes"));
        assert!(!text.contains("Content Analysis"));
        assert!(text.contains("Unavailable: Access restricted: profile is private"));
    }

    #[test]
    fn test_products_with_and_without_images() {
        let descriptor = |category: &str| ProductDescriptor {
            category: category.to_string(),
            product: "Starter kit".to_string(),
            reasoning: String::new(),
            image_keywords: "bread".to_string(),
        };
        let recommendations = Recommendations {
            raw_text: "ignored".to_string(),
            products: vec![
                IllustratedProduct {
                    descriptor: descriptor("Course"),
                    image_urls: vec!["https://img/1".to_string()],
                },
                IllustratedProduct {
                    descriptor: descriptor("E-book"),
                    image_urls: Vec::new(),
                },
            ],
        };

        let text = report(instagram(false), Some(Ok(recommendations))).to_string();
        assert!(text.contains("Product 1: Course"));
        assert!(text.contains("Image: https://img/1"));
        assert!(text.contains("Product 2: E-book"));
        assert_eq!(text.matches("No visualization available").count(), 1);
        assert!(!text.contains("ignored"));
    }

    #[test]
    fn test_unparsed_reply_shows_raw_text() {
        let recommendations = Recommendations {
            raw_text: "  Try selling a course.  ".to_string(),
            products: Vec::new(),
        };
        assert_eq!(recommendations.to_string(), "Try selling a course.\n");
    }

    #[test]
    fn test_json_report() {
        let recommendations = Recommendations {
            raw_text: "Product 1: ...".to_string(),
            products: vec![IllustratedProduct {
                descriptor: ProductDescriptor {
                    category: "Course".to_string(),
                    product: "Sourdough basics".to_string(),
                    reasoning: String::new(),
                    image_keywords: "bread, oven".to_string(),
                },
                image_urls: vec!["https://img/1".to_string()],
            }],
        };
        let json = report(instagram(false), Some(Ok(recommendations)))
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["identifier"], "bakerbee");
        assert_eq!(value["stats"]["platform"], "instagram");
        assert_eq!(value["stats"]["followers"], 12000);
        assert_eq!(value["stats"]["top_hashtags"][0][0], "sourdough");
        let product = &value["recommendations"]["products"][0];
        assert_eq!(product["descriptor"]["category"], "Course");
        assert_eq!(product["image_urls"][0], "https://img/1");
    }

    #[test]
    fn test_json_report_with_failed_recommendations() {
        let json = report(
            instagram(true),
            Some(Err(InsightError::AccessRestricted("private".to_string()))),
        )
        .to_json()
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["stats"]["is_private"], true);
        assert_eq!(value["recommendations"]["error"]["kind"], "access_restricted");
        assert_eq!(
            value["recommendations"]["error"]["message"],
            "Access restricted: private"
        );

        let json = report(instagram(false), None).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["recommendations"].is_null());
    }

    #[test]
    fn test_youtube_channel() {
        let stats = ProfileStats::YouTube(YouTubeStats {
            channel_name: "Bread Lab".to_string(),
            description: "Experiments".to_string(),
            subscriber_count: 250000,
            video_count: 88,
            view_count: 10_500_000,
            recent_videos: vec![VideoSummary {
                title: "Rye in 60 seconds".to_string(),
                description: String::new(),
                published_at: "2024-05-01T10:00:00Z".to_string(),
            }],
            video_types: Some(VideoTypes {
                shorts: 1,
                regular: 0,
            }),
        });
        assert_eq!(stats.platform(), Platform::YouTube);

        let text = stats.to_string();
        assert!(text.contains("Subscribers: 250,000"));
        assert!(text.contains("Total Views: 10,500,000"));
        assert!(text.contains("- Shorts: 1"));
        assert!(text.contains("- Rye in 60 seconds (2024-05-01T10:00:00Z)"));
    }
}
