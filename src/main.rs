use clap::builder::PossibleValuesParser;
use clap::Parser;
use creator_insights::providers::ProviderFactory;
use creator_insights::{AppConfig, ProfileAnalyzerBuilder};
use log::info;

#[derive(Parser, Debug)]
#[command(
    name = "creator-insights",
    version,
    about = "Profile statistics and digital product ideas for Instagram and YouTube creators"
)]
struct Cli {
    /// Profile or channel URL
    url: String,

    /// Images to fetch per recommended product
    #[arg(short, long)]
    images: Option<u32>,

    /// Language model provider
    #[arg(
        short,
        long,
        env = "INSIGHTS_PROVIDER",
        value_parser = PossibleValuesParser::new(ProviderFactory::available_providers())
    )]
    provider: Option<String>,

    /// Only print profile statistics
    #[arg(long)]
    stats_only: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(images) = cli.images {
        config.unsplash.images_per_product = images;
    }
    info!("Using a {}s request timeout", config.timeout);

    let mut builder = ProfileAnalyzerBuilder::from_config(&config, cli.provider.as_deref())?;
    if cli.stats_only {
        builder = builder.stats_only();
    }
    let analyzer = builder.build();

    match analyzer.analyze(&cli.url).await {
        Ok(report) if cli.json => {
            println!("{}", report.to_json()?);
            Ok(())
        }
        Ok(report) => {
            print!("{}", report);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error ({}): {}", e.kind(), e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_must_be_known() {
        let cli = Cli::try_parse_from(["creator-insights", "https://x.com/a", "-p", "anthropic"])
            .unwrap();
        assert_eq!(cli.provider.as_deref(), Some("anthropic"));

        let result = Cli::try_parse_from(["creator-insights", "https://x.com/a", "-p", "gemini"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_flags() {
        let cli =
            Cli::try_parse_from(["creator-insights", "https://x.com/a", "--json", "--stats-only"])
                .unwrap();
        assert!(cli.json);
        assert!(cli.stats_only);
        assert!(cli.images.is_none());
    }
}
