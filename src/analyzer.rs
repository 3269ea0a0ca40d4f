use std::time::Duration;

use log::{info, warn};

use crate::classifier::classify;
use crate::config::AppConfig;
use crate::illustrator::{illustrate_all, PhotoSearch, UnsplashClient};
use crate::model::{Platform, PlatformSelector, ProfileStats, Recommendations};
use crate::platforms::{
    instagram, tiktok, twitter, youtube, InstagramSource, InstagramWebClient, TikTokSource,
    TwitterSource, YouTubeDataApi, YouTubeSource,
};
use crate::providers::{LlmProvider, ProviderFactory};
use crate::recommendations::{generate, LabeledBlockParser, RecommendationParser};
use crate::InsightError;

/// Everything produced for one profile URL
#[derive(Debug)]
pub struct AnalysisReport {
    pub selector: PlatformSelector,
    pub stats: ProfileStats,
    /// `None` when recommendations were not requested
    pub recommendations: Option<Result<Recommendations, InsightError>>,
}

/// Runs the classify → fetch → recommend → illustrate pipeline.
///
/// Collaborators are injected through [`ProfileAnalyzerBuilder`] or created
/// from configuration with [`ProfileAnalyzer::from_config`].
pub struct ProfileAnalyzer {
    instagram: Option<Box<dyn InstagramSource>>,
    youtube: Option<Box<dyn YouTubeSource>>,
    twitter: Option<Box<dyn TwitterSource>>,
    tiktok: Option<Box<dyn TikTokSource>>,
    llm: Option<Box<dyn LlmProvider>>,
    /// Why `llm` is absent, repeated in every report
    llm_unavailable: Option<InsightError>,
    photo_search: Option<Box<dyn PhotoSearch>>,
    parser: Box<dyn RecommendationParser>,
    images_per_product: u32,
    classify_durations: bool,
    recommendations_enabled: bool,
}

impl ProfileAnalyzer {
    /// Creates a new builder with no collaborators
    pub fn builder() -> ProfileAnalyzerBuilder {
        ProfileAnalyzerBuilder::default()
    }

    /// Wire up the HTTP clients and LLM provider described by `config`.
    ///
    /// See [`ProfileAnalyzerBuilder::from_config`].
    pub fn from_config(
        config: &AppConfig,
        provider_name: Option<&str>,
    ) -> Result<Self, InsightError> {
        Ok(ProfileAnalyzerBuilder::from_config(config, provider_name)?.build())
    }

    /// Classify `url`, fetch the profile and, unless disabled, generate
    /// illustrated product recommendations.
    ///
    /// Fails only when the profile itself cannot be classified or fetched;
    /// recommendation failures are reported inside the returned report.
    pub async fn analyze(&self, url: &str) -> Result<AnalysisReport, InsightError> {
        let selector = classify(url)?;
        info!(
            "Analyzing {} profile '{}'",
            selector.platform, selector.identifier
        );

        let stats = self.fetch_stats(&selector).await?;

        let recommendations = if self.recommendations_enabled {
            let result = self.recommend(&stats).await;
            if let Err(e) = &result {
                warn!("Recommendations failed ({}): {}", e.kind(), e);
            }
            Some(result)
        } else {
            None
        };

        Ok(AnalysisReport {
            selector,
            stats,
            recommendations,
        })
    }

    /// Run the adapter for the selected platform
    pub async fn fetch_stats(
        &self,
        selector: &PlatformSelector,
    ) -> Result<ProfileStats, InsightError> {
        let id = selector.identifier.as_str();
        match selector.platform {
            Platform::Instagram => {
                let source = self.instagram.as_deref().ok_or_else(|| {
                    InsightError::Unsupported("no Instagram data source configured".to_string())
                })?;
                Ok(ProfileStats::Instagram(
                    instagram::fetch_stats(source, id).await?,
                ))
            }
            Platform::YouTube => {
                let source = self.youtube.as_deref().ok_or_else(|| {
                    InsightError::MissingCredential(
                        "YOUTUBE_API_KEY is not set, YouTube analysis is unavailable".to_string(),
                    )
                })?;
                Ok(ProfileStats::YouTube(
                    youtube::fetch_stats(source, id, self.classify_durations).await?,
                ))
            }
            Platform::Twitter => {
                let source = self.twitter.as_deref().ok_or_else(|| {
                    InsightError::Unsupported("Twitter profiles are not supported yet".to_string())
                })?;
                Ok(ProfileStats::Twitter(twitter::fetch_stats(source, id).await?))
            }
            Platform::TikTok => {
                let source = self.tiktok.as_deref().ok_or_else(|| {
                    InsightError::Unsupported("TikTok profiles are not supported yet".to_string())
                })?;
                Ok(ProfileStats::TikTok(tiktok::fetch_stats(source, id).await?))
            }
        }
    }

    /// Generate, parse and illustrate recommendations for a profile
    pub async fn recommend(&self, stats: &ProfileStats) -> Result<Recommendations, InsightError> {
        let provider = self.llm.as_deref().ok_or_else(|| match &self.llm_unavailable {
            Some(reason) => reason.replicate(),
            None => InsightError::MissingCredential(
                "no language model configured, provide an API key to get product recommendations"
                    .to_string(),
            ),
        })?;

        let raw_text = generate(provider, stats).await?;
        let descriptors = self.parser.parse(&raw_text);
        if descriptors.is_empty() {
            warn!("No structured products found in the model's reply");
        }

        let products = illustrate_all(
            self.photo_search.as_deref(),
            descriptors,
            self.images_per_product,
        )
        .await;

        Ok(Recommendations { raw_text, products })
    }
}

/// Builder for configuring a [`ProfileAnalyzer`]
pub struct ProfileAnalyzerBuilder {
    instagram: Option<Box<dyn InstagramSource>>,
    youtube: Option<Box<dyn YouTubeSource>>,
    twitter: Option<Box<dyn TwitterSource>>,
    tiktok: Option<Box<dyn TikTokSource>>,
    llm: Option<Box<dyn LlmProvider>>,
    llm_unavailable: Option<InsightError>,
    photo_search: Option<Box<dyn PhotoSearch>>,
    parser: Option<Box<dyn RecommendationParser>>,
    images_per_product: u32,
    classify_durations: bool,
    recommendations_enabled: bool,
}

impl Default for ProfileAnalyzerBuilder {
    fn default() -> Self {
        Self {
            instagram: None,
            youtube: None,
            twitter: None,
            tiktok: None,
            llm: None,
            llm_unavailable: None,
            photo_search: None,
            parser: None,
            images_per_product: 1,
            classify_durations: true,
            recommendations_enabled: true,
        }
    }
}

impl ProfileAnalyzerBuilder {
    /// Builder preloaded with the HTTP clients and LLM provider described by
    /// `config`.
    ///
    /// Missing YouTube or Unsplash keys disable those features; a provider
    /// that cannot be created disables recommendations. Neither is an error.
    pub fn from_config(
        config: &AppConfig,
        provider_name: Option<&str>,
    ) -> Result<Self, InsightError> {
        let timeout = Duration::from_secs(config.timeout);
        let mut builder = Self::default()
            .instagram(InstagramWebClient::new(
                config.instagram.base_url.clone(),
                config.instagram.session_id.clone(),
                timeout,
            )?)
            .classify_durations(config.youtube.classify_durations)
            .images_per_product(config.unsplash.images_per_product);

        match config.youtube_api_key() {
            Some(key) => {
                builder = builder.youtube(YouTubeDataApi::new(
                    key,
                    config.youtube.base_url.clone(),
                    timeout,
                )?)
            }
            None => warn!("YOUTUBE_API_KEY not set, YouTube analysis is disabled"),
        }

        match config.unsplash_access_key() {
            Some(key) => {
                builder = builder.photo_search(UnsplashClient::new(
                    key,
                    config.unsplash.base_url.clone(),
                    timeout,
                )?)
            }
            None => warn!("UNSPLASH_ACCESS_KEY not set, product images are disabled"),
        }

        match ProviderFactory::from_config(&config.llm, provider_name) {
            Ok(provider) => builder = builder.llm_boxed(provider),
            Err(e) => {
                warn!("Recommendations are disabled: {}", e);
                builder.llm_unavailable = Some(e);
            }
        }

        Ok(builder)
    }

    pub fn instagram(mut self, source: impl InstagramSource + 'static) -> Self {
        self.instagram = Some(Box::new(source));
        self
    }

    pub fn youtube(mut self, source: impl YouTubeSource + 'static) -> Self {
        self.youtube = Some(Box::new(source));
        self
    }

    pub fn twitter(mut self, source: impl TwitterSource + 'static) -> Self {
        self.twitter = Some(Box::new(source));
        self
    }

    pub fn tiktok(mut self, source: impl TikTokSource + 'static) -> Self {
        self.tiktok = Some(Box::new(source));
        self
    }

    /// Set the language model used for recommendations
    pub fn llm(self, provider: impl LlmProvider + 'static) -> Self {
        self.llm_boxed(Box::new(provider))
    }

    pub fn llm_boxed(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.llm = Some(provider);
        self.llm_unavailable = None;
        self
    }

    pub fn photo_search(mut self, search: impl PhotoSearch + 'static) -> Self {
        self.photo_search = Some(Box::new(search));
        self
    }

    /// Replace the default `Product N:` block parser
    pub fn parser(mut self, parser: impl RecommendationParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn images_per_product(mut self, count: u32) -> Self {
        self.images_per_product = count;
        self
    }

    /// Whether to fetch YouTube video durations to count shorts
    pub fn classify_durations(mut self, enabled: bool) -> Self {
        self.classify_durations = enabled;
        self
    }

    /// Only fetch profile statistics
    pub fn stats_only(mut self) -> Self {
        self.recommendations_enabled = false;
        self
    }

    pub fn build(self) -> ProfileAnalyzer {
        ProfileAnalyzer {
            instagram: self.instagram,
            youtube: self.youtube,
            twitter: self.twitter,
            tiktok: self.tiktok,
            llm: self.llm,
            llm_unavailable: self.llm_unavailable,
            photo_search: self.photo_search,
            parser: self
                .parser
                .unwrap_or_else(|| Box::new(LabeledBlockParser::new())),
            images_per_product: self.images_per_product,
            classify_durations: self.classify_durations,
            recommendations_enabled: self.recommendations_enabled,
        }
    }
}
