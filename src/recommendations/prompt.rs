use crate::model::Platform;

/// Prompt used for Instagram profiles and for any platform without its own template.
///
/// `{profile_info}` is replaced with the bullet summary of the profile.
pub const INSTAGRAM_PROMPT: &str = include_str!("instagram_prompt.txt");

/// Prompt used for YouTube channels
pub const YOUTUBE_PROMPT: &str = include_str!("youtube_prompt.txt");

const PLACEHOLDER: &str = "{profile_info}";

/// Pick the template for a platform tag such as `"youtube"`.
/// Unrecognised tags get the Instagram template.
pub fn template_for(platform_tag: &str) -> &'static str {
    match platform_tag.trim().to_ascii_lowercase().as_str() {
        "youtube" => YOUTUBE_PROMPT,
        _ => INSTAGRAM_PROMPT,
    }
}

/// Fill the platform's template with a profile summary
pub fn build_prompt(platform: Platform, summary: &str) -> String {
    template_for(platform.as_str()).replace(PLACEHOLDER, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_embedded() {
        for prompt in [INSTAGRAM_PROMPT, YOUTUBE_PROMPT] {
            assert!(prompt.contains(PLACEHOLDER));
            assert!(prompt.contains("exactly 5"));
            assert!(prompt.contains("Product 1:"));
            assert!(prompt.contains("Category: ["));
            assert!(prompt.contains("Reasoning: ["));
            assert!(prompt.contains("Image Keywords: ["));
        }
    }

    #[test]
    fn test_template_selection() {
        assert_eq!(template_for("youtube"), YOUTUBE_PROMPT);
        assert_eq!(template_for("YouTube"), YOUTUBE_PROMPT);
        assert_eq!(template_for("instagram"), INSTAGRAM_PROMPT);
        assert_eq!(template_for("myspace"), INSTAGRAM_PROMPT);
        assert_eq!(template_for("tiktok"), INSTAGRAM_PROMPT);
    }

    #[test]
    fn test_build_prompt_fills_placeholder() {
        let prompt = build_prompt(Platform::YouTube, "- Channel: Rust Talks");
        assert!(prompt.contains("- Channel: Rust Talks"));
        assert!(!prompt.contains(PLACEHOLDER));
        assert!(prompt.starts_with("Based on the following YouTube"));
    }
}
