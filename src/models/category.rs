//! Verse categories

use serde::{Deserialize, Serialize};

/// Category behind the home ("His Will") feed
pub const HIS_WILL: &str = "his_will";

/// Topical categories offered by the backend search
pub const CATEGORIES: &[&str] = &[
    "acceptance", "adoption", "anxiety", "assurance", "belief", "blessings", "boldness",
    "change", "comfort", "confidence", "contentment", "courage", "delight", "deliverance",
    "depression", "encouragement", "eternity", "faith", "faithfulness", "fear", "forgiveness",
    "freedom", "friendship", "generosity", "goodness", "grace", "gratitude", "grief",
    "guidance", "guilt", "health", "honesty", "hope", "humility", "identity", "inspiration",
    "joy", "kindness", "loneliness", "love", "patience", "peace", "perseverance", "praise",
    "prayer", "protection", "provision", "purpose", "relationships", "reliability", "respect",
    "restoration", "reward", "safety", "salvation", "satisfaction", "serving", "strength",
    "stress", "support", "sustenance", "trust", "truth", "understanding", "victory",
    "weakness", "wisdom", "worry",
];

/// A search category (e.g. `anxiety`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Create a category from its slug
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into().trim().to_lowercase())
    }

    /// The home feed category
    pub fn his_will() -> Self {
        Self::new(HIS_WILL)
    }

    /// All selectable categories
    pub fn all() -> Vec<Self> {
        CATEGORIES.iter().map(|c| Self::new(*c)).collect()
    }

    /// Whether the backend knows this category
    pub fn is_known(&self) -> bool {
        self.0 == HIS_WILL || CATEGORIES.contains(&self.0.as_str())
    }

    /// Slug as sent to the API
    pub fn slug(&self) -> &str {
        &self.0
    }

    /// Title-cased name, e.g. "His Will"
    pub fn display_name(&self) -> String {
        self.0
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().collect::<String>() + chars.as_str()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Search URL for this category under `base_url`
    pub fn search_url(&self, base_url: &str) -> String {
        format!(
            "{}/verses/search?category={}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(&self.0)
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let url = Category::new("Anxiety").search_url("http://127.0.0.1:3000/api/v1/");
        assert_eq!(url, "http://127.0.0.1:3000/api/v1/verses/search?category=anxiety");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Category::his_will().display_name(), "His Will");
        assert_eq!(Category::new("grace").to_string(), "Grace");
    }

    #[test]
    fn test_known_categories() {
        assert_eq!(CATEGORIES.len(), 68);
        assert!(Category::new("worry").is_known());
        assert!(Category::his_will().is_known());
        assert!(!Category::new("astrology").is_known());
    }
}
