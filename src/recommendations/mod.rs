//! Product recommendations: prompt building, the completion call and
//! parsing of the model's reply.

mod generator;
mod parser;
mod prompt;

pub use generator::{generate, summarize, RECOMMENDATION_TEMPERATURE};
pub use parser::{LabeledBlockParser, RecommendationParser};
pub use prompt::{build_prompt, template_for, INSTAGRAM_PROMPT, YOUTUBE_PROMPT};
