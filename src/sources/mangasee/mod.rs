//! Mangasee source.
//!
//! Title, chapter and listing data is read from JSON the site embeds in its
//! pages; see [`parser`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::{
    error::Result,
    net::{self, HttpClient, Request, RequestManager},
    source::{SectionCallback, Source, UpdateCallback},
    types::{
        Chapter, ChapterDetails, ContentRating, LanguageCode, Manga, MangaUpdates, Metadata,
        PagedResults, SearchRequest, SourceInfo, SourceTag, TagSection, TagType,
    },
};

pub mod parser;

pub const MS_DOMAIN: &str = "https://mangasee123.com";

static INFO: Lazy<SourceInfo> = Lazy::new(|| SourceInfo {
    name: "Mangasee",
    version: "2.1.10",
    icon: "Logo.png",
    author: "Daniel Kovalevich",
    author_website: "https://github.com/DanielKovalevich",
    description: "Extension that pulls manga from MangaSee, includes Advanced Search and Updated manga fetching",
    language: LanguageCode::English,
    content_rating: ContentRating::Everyone,
    website_base_url: MS_DOMAIN,
    source_tags: vec![
        SourceTag {
            text: "Notifications",
            kind: TagType::Green,
        },
        SourceTag {
            text: "Cloudflare",
            kind: TagType::Red,
        },
    ],
});

/// Mangasee adapter.
pub struct Mangasee {
    client: HttpClient,
    base_url: String,
}

impl Mangasee {
    pub fn new() -> Self {
        Self::with_base_url(MS_DOMAIN)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: HttpClient::new("mangasee")
                .with_manager(RequestManager::default())
                .with_header("referer", &base_url),
            base_url,
        }
    }

    async fn page(&self, path: &str) -> Result<String> {
        let request = Request::get(format!("{}{}", self.base_url, path))
            .header("content-type", "application/x-www-form-urlencoded");
        self.client.send_text(request).await
    }
}

impl Default for Mangasee {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for Mangasee {
    fn id(&self) -> &str {
        "mangasee"
    }

    fn info(&self) -> &SourceInfo {
        &INFO
    }

    async fn get_manga_details(&self, manga_id: &str) -> Result<Manga> {
        let body = self.page(&format!("/manga/{}", manga_id)).await?;
        Ok(parser::parse_manga_details(&net::html::parse(&body), manga_id))
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let body = self.page(&format!("/manga/{}", manga_id)).await?;
        parser::parse_chapters(&body, manga_id)
    }

    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails> {
        let body = self
            .page(&format!("/read-online/{}-page-1.html", chapter_id))
            .await?;
        parser::parse_chapter_details(&body, manga_id, chapter_id)
    }

    /// The whole directory is filtered at once, so there is only one page.
    async fn search_request(
        &self,
        query: &SearchRequest,
        _metadata: Option<Metadata>,
    ) -> Result<PagedResults> {
        let body = self.page("/search/").await?;
        Ok(PagedResults::last(parser::parse_search(&body, query)?))
    }

    async fn get_home_page_sections(&self, on_section: SectionCallback<'_>) -> Result<()> {
        for section in parser::home_section_skeletons() {
            on_section(section);
        }

        let body = self.page("").await?;
        for section in parser::parse_home_sections(&body)? {
            on_section(section);
        }
        Ok(())
    }

    async fn get_view_more_items(
        &self,
        section_id: &str,
        _metadata: Option<Metadata>,
    ) -> Result<Option<PagedResults>> {
        let body = self.page("").await?;
        Ok(parser::parse_view_more(&body, section_id)?.map(PagedResults::last))
    }

    async fn filter_updated_manga(
        &self,
        on_updates: UpdateCallback<'_>,
        since: DateTime<Utc>,
        ids: &[String],
    ) -> Result<()> {
        let body = self.page("/").await?;
        let found = parser::parse_updated_manga(&body, since, ids)?;
        if !found.is_empty() {
            on_updates(MangaUpdates { ids: found });
        }
        Ok(())
    }

    fn get_manga_share_url(&self, manga_id: &str) -> Option<String> {
        Some(format!("{}/manga/{}", self.base_url, manga_id))
    }

    async fn get_tags(&self) -> Result<Option<Vec<TagSection>>> {
        let body = self.page("/search/").await?;
        parser::parse_tags(&body).map(Some)
    }

    fn cloudflare_bypass_request(&self) -> Option<Request> {
        Some(Request::get(self.base_url.clone()))
    }

    fn global_request_headers(&self) -> Vec<(String, String)> {
        vec![("referer".to_string(), self.base_url.clone())]
    }
}
