//! Verse endpoints

use super::{ApiClient, ApiError, ApiResult, list_from};
use crate::feed::VerseSource;
use crate::models::{Verse, VersePage};

impl ApiClient {
    /// Fetch one page of a search URL (the URL already carries `page=`).
    ///
    /// Bodies without both `verses` and `pagination` are rejected as
    /// malformed.
    pub async fn verse_page(&self, page_url: &str) -> ApiResult<VersePage> {
        let value: serde_json::Value = self.get_json(page_url).await?;

        let has = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
        if !has("verses") || !has("pagination") {
            return Err(ApiError::Malformed(
                "response is missing verses or pagination".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    /// Flip the like state of a verse
    pub async fn toggle_verse_like(&self, verse_id: u64) -> ApiResult<()> {
        let url = self.api_url(&format!("/verses/{verse_id}/toggle_like"));
        self.send(self.client.post(&url).json(&serde_json::json!({})))
            .await?;
        Ok(())
    }

    /// Verses the user has liked
    pub async fn liked(&self) -> ApiResult<Vec<Verse>> {
        let value = self.get_value(&self.api_url("/liked"), &[]).await?;
        list_from(value, "verses")
    }

    /// Free-text verse search
    pub async fn search_verses(&self, query: &str) -> ApiResult<Vec<Verse>> {
        let value = self
            .get_value(&self.api_url("/verses/search"), &[("q", query.to_string())])
            .await?;
        list_from(value, "verses")
    }

    /// Look up verses by book, chapter and verse number
    pub async fn search_by_address(&self, book: &str, chapter: u32, verse: u32) -> ApiResult<Vec<Verse>> {
        let query = [
            ("book", book.to_string()),
            ("chapter", chapter.to_string()),
            ("verse", verse.to_string()),
        ];
        let value = self
            .get_value(&self.api_url("/verses/search_by_address"), &query)
            .await?;
        list_from(value, "verses")
    }

    /// Look up a verse by id
    pub async fn search_by_id(&self, verse_id: u64) -> ApiResult<Vec<Verse>> {
        let value = self
            .get_value(&self.api_url("/verses/search_by_id"), &[("id", verse_id.to_string())])
            .await?;

        // A single verse object is also accepted
        if value.get("book").is_some() {
            return serde_json::from_value(value)
                .map(|verse| vec![verse])
                .map_err(|e| ApiError::Malformed(e.to_string()));
        }
        list_from(value, "verses")
    }
}

impl VerseSource for ApiClient {
    type Error = ApiError;

    async fn fetch_page(&self, page_url: &str) -> ApiResult<VersePage> {
        self.verse_page(page_url).await
    }

    async fn toggle_like(&self, verse_id: u64) -> ApiResult<()> {
        self.toggle_verse_like(verse_id).await
    }
}
