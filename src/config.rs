use crate::layout::LayoutConfig;
use crate::source::DEFAULT_BASE_URL;

/// Filler words stripped from every reason text.
pub const REASON_COLLECTION_WORDS: [&str; 6] =
    ["emission", "increase", "decrease", "reduction", "year", "due"];

/// Filler words stripped when splitting reasons into increase/decrease.
pub const CATEGORY_COLLECTION_WORDS: [&str; 7] = [
    "emission",
    "increase",
    "decrease",
    "reduction",
    "year",
    "due",
    "city",
];

/// Knobs shared by both view builders.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub base_url: String,
    /// Appended as `$limit` to HTTP requests when set.
    pub row_limit: Option<u32>,
    pub reason_collection_words: Vec<String>,
    pub category_collection_words: Vec<String>,
    /// Edge weight = bigram count × this factor.
    pub edge_weight_scale: f64,
    pub layout: LayoutConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            row_limit: None,
            reason_collection_words: REASON_COLLECTION_WORDS.map(String::from).to_vec(),
            category_collection_words: CATEGORY_COLLECTION_WORDS.map(String::from).to_vec(),
            edge_weight_scale: 10.0,
            layout: LayoutConfig::default(),
        }
    }
}
