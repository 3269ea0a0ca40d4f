//! Analyze a creator's Instagram or YouTube profile and suggest digital
//! products they could sell.
//!
//! ```no_run
//! # async fn run() -> Result<(), creator_insights::InsightError> {
//! let report = creator_insights::analyze_profile("https://www.instagram.com/natgeo/").await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod error;
pub mod illustrator;
pub mod model;
pub mod platforms;
pub mod providers;
pub mod recommendations;
pub mod report;

pub use analyzer::{AnalysisReport, ProfileAnalyzer, ProfileAnalyzerBuilder};
pub use classifier::classify;
pub use config::AppConfig;
pub use error::InsightError;
pub use model::{
    IllustratedProduct, InstagramStats, Platform, PlatformSelector, ProductDescriptor,
    ProfileStats, Recommendations, YouTubeStats,
};

/// Analyze a profile URL using configuration from `config.toml` and the
/// environment, with the default language model.
pub async fn analyze_profile(url: &str) -> Result<AnalysisReport, InsightError> {
    let config = AppConfig::load()?;
    ProfileAnalyzer::from_config(&config, None)?.analyze(url).await
}
