use crate::model::ProductDescriptor;
use log::debug;
use regex::Regex;

/// Turns the model's free-text reply into product descriptors.
///
/// Implementations must not fail: anything they cannot read is left out.
pub trait RecommendationParser: Send + Sync {
    fn parse(&self, text: &str) -> Vec<ProductDescriptor>;
}

/// Reads `Product N:` blocks with `Label: [value]` lines.
///
/// Blocks missing a bracketed `Category:` or `Image Keywords:` value are
/// skipped.
pub struct LabeledBlockParser {
    header: Regex,
    category: Regex,
    keywords: Regex,
    product: Regex,
    reasoning: Regex,
}

impl LabeledBlockParser {
    pub fn new() -> Self {
        Self {
            header: compile(r"(?i)product\s+\d+\s*:"),
            category: compile(r"(?i)category:[*\s]*\[([^\]]*)\]"),
            keywords: compile(r"(?i)image\s+keywords:[*\s]*\[([^\]]*)\]"),
            product: compile(r"(?im)^[^\w\n]*product:[* \t]*(.*)$"),
            reasoning: compile(r"(?im)^[^\w\n]*reasoning:[* \t]*(.*)$"),
        }
    }

    fn parse_block(&self, block: &str) -> Option<ProductDescriptor> {
        let category = self.category.captures(block)?[1].to_string();
        let image_keywords = self.keywords.captures(block)?[1].to_string();

        Some(ProductDescriptor {
            category,
            product: line_value(&self.product, block),
            reasoning: line_value(&self.reasoning, block),
            image_keywords,
        })
    }
}

impl Default for LabeledBlockParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationParser for LabeledBlockParser {
    fn parse(&self, text: &str) -> Vec<ProductDescriptor> {
        // The first piece is whatever preceded the first header
        let products: Vec<ProductDescriptor> = self
            .header
            .split(text)
            .skip(1)
            .filter_map(|block| {
                let parsed = self.parse_block(block);
                if parsed.is_none() {
                    debug!("Skipping malformed product block: {:?}", block.trim());
                }
                parsed
            })
            .collect();

        debug!("Parsed {} product recommendations", products.len());
        products
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("hard-coded pattern is valid")
}

/// Value of a one-line label, without surrounding brackets
fn line_value(re: &Regex, block: &str) -> String {
    re.captures(block)
        .map(|c| {
            let value = c[1].trim();
            value
                .strip_prefix('[')
                .and_then(|v| v.strip_suffix(']'))
                .unwrap_or(value)
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}
