//! Verse and pagination models

use serde::{Deserialize, Serialize};

/// A single verse as returned by the search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Backend identifier (required for liking)
    #[serde(default)]
    pub id: Option<u64>,
    /// Book name (e.g. "Psalms")
    pub book: String,
    /// Chapter number
    pub chapter: u32,
    /// Verse number
    pub verse: u32,
    /// Verse text
    pub text: String,
    /// Whether the signed-in user has liked this verse
    #[serde(default)]
    pub liked: bool,
}

impl Verse {
    /// Full reference, e.g. "Psalms 23:1"
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book, self.chapter, self.verse)
    }

    /// Abbreviated reference used in lists, e.g. "P. 23:1"
    pub fn short_reference(&self) -> String {
        let initial = self
            .book
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_default();
        format!("{initial}. {}:{}", self.chapter, self.verse)
    }

    /// Text preview: anything longer than 30 chars is cut to 20 plus an ellipsis
    pub fn preview(&self) -> String {
        if self.text.chars().count() > 30 {
            let head: String = self.text.chars().take(20).collect();
            format!("{head}...")
        } else {
            self.text.clone()
        }
    }

    /// Text used when sharing a verse in a conversation
    pub fn share_text(&self) -> String {
        format!("{} - {}", self.reference(), self.text)
    }
}

/// Pagination window returned alongside each page of verses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    /// Page that was returned (1-based)
    pub page: u32,
    /// Total number of pages
    pub pages: u32,
    /// Next page, if any
    #[serde(default)]
    pub next: Option<u32>,
    /// Previous page, if any
    #[serde(default)]
    pub prev: Option<u32>,
    /// Total number of matching verses
    #[serde(default)]
    pub count: u64,
    /// Items per page
    #[serde(default)]
    pub items: u32,
    /// Last page number
    #[serde(default)]
    pub last: u32,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersePage {
    /// Verses on this page
    pub verses: Vec<Verse>,
    /// Pagination metadata for this page
    pub pagination: PaginationMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(book: &str, text: &str) -> Verse {
        Verse {
            id: Some(1),
            book: book.to_string(),
            chapter: 23,
            verse: 1,
            text: text.to_string(),
            liked: false,
        }
    }

    #[test]
    fn test_short_reference_uses_book_initial() {
        assert_eq!(verse("psalms", "x").short_reference(), "P. 23:1");
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = verse("Psalms", "The LORD is my shepherd; I shall not want.");
        assert_eq!(long.preview(), "The LORD is my sheph...");

        let short = verse("Psalms", "Jesus wept.");
        assert_eq!(short.preview(), "Jesus wept.");
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let json = r#"{"book":"John","chapter":3,"verse":16,"text":"For God so loved"}"#;
        let v: Verse = serde_json::from_str(json).unwrap();
        assert_eq!(v.id, None);
        assert!(!v.liked);
        assert_eq!(v.share_text(), "John 3:16 - For God so loved");
    }
}
