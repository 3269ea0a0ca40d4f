use crate::model::ProfileStats;
use crate::providers::LlmProvider;
use crate::recommendations::build_prompt;
use crate::InsightError;
use log::{debug, info};

/// Sampling temperature for every recommendation request
pub const RECOMMENDATION_TEMPERATURE: f32 = 0.7;

/// Bullet-point description of a profile for the prompt
pub fn summarize(stats: &ProfileStats) -> String {
    match stats {
        ProfileStats::Instagram(s) => {
            let hashtags: Vec<&str> = s
                .top_hashtags
                .iter()
                .take(5)
                .map(|(tag, _)| tag.as_str())
                .collect();
            format!(
                "- Audience size: {} followers\n\
                 - Content focus: Top hashtags include {}\n\
                 - Engagement rate: {:.2}%\n\
                 - Content mix: {} images, {} videos\n\
                 - Bio: {}",
                s.followers,
                hashtags.join(", "),
                s.avg_engagement_rate,
                s.post_types.image,
                s.post_types.video,
                s.bio
            )
        }
        ProfileStats::YouTube(s) => {
            let mut summary = format!(
                "- Channel name: {}\n\
                 - Audience size: {} subscribers\n\
                 - Total views: {}\n\
                 - Description: {}",
                s.channel_name, s.subscriber_count, s.view_count, s.description
            );
            if let Some(types) = s.video_types {
                summary.push_str(&format!(
                    "\n- Content mix: {} shorts, {} regular videos",
                    types.shorts, types.regular
                ));
            }
            summary
        }
        ProfileStats::Twitter(s) => format!(
            "- Account: @{} ({})\n\
             - Audience size: {} followers\n\
             - Activity: {} tweets",
            s.username, s.display_name, s.followers, s.tweet_count
        ),
        ProfileStats::TikTok(s) => format!(
            "- Account: @{} ({})\n\
             - Audience size: {} followers\n\
             - Total likes: {}\n\
             - Videos: {}",
            s.username, s.nickname, s.followers, s.total_likes, s.video_count
        ),
    }
}

/// Ask the model for 5 product recommendations and return its raw reply
pub async fn generate(
    provider: &dyn LlmProvider,
    stats: &ProfileStats,
) -> Result<String, InsightError> {
    if let ProfileStats::Instagram(s) = stats {
        if s.is_private {
            return Err(InsightError::AccessRestricted(format!(
                "'{}' is a private account, recommendations need public posts",
                s.username
            )));
        }
    }

    let prompt = build_prompt(stats.platform(), &summarize(stats));
    debug!("Recommendation prompt:\n{}", prompt);

    info!(
        "Requesting recommendations from {}",
        provider.provider_name()
    );
    provider
        .complete(&prompt, RECOMMENDATION_TEMPERATURE)
        .await
        .map_err(|e| InsightError::upstream(provider.provider_name(), e))
}
