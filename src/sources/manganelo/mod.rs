//! Manganelo source.
//!
//! Scrapes manganelo.com. Page parsing lives in [`parser`]; this module only
//! builds requests and hands the documents over.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::time::Duration;

use crate::{
    error::Result,
    net::{self, Cookie, HttpClient, Request, RequestManager},
    source::{SectionCallback, Source, UpdateCallback},
    types::{
        Chapter, ChapterDetails, ContentRating, LanguageCode, Manga, MangaUpdates, Metadata,
        PagedResults, SearchRequest, SourceInfo, SourceTag, TagSection, TagType,
    },
};

pub mod parser;

const MN_DOMAIN: &str = "https://manganelo.com";

static INFO: Lazy<SourceInfo> = Lazy::new(|| SourceInfo {
    name: "Manganelo",
    version: "3.0.0",
    icon: "icon.png",
    author: "Daniel Kovalevich",
    author_website: "https://github.com/DanielKovalevich",
    description: "Extension that pulls manga from Manganelo, includes Advanced Search and Updated manga fetching",
    language: LanguageCode::English,
    content_rating: ContentRating::Mature,
    website_base_url: MN_DOMAIN,
    source_tags: vec![SourceTag {
        text: "Notifications",
        kind: TagType::Green,
    }],
});

/// Manganelo adapter.
pub struct Manganelo {
    client: HttpClient,
    base_url: String,
}

impl Manganelo {
    pub fn new() -> Self {
        Self::with_base_url(MN_DOMAIN)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: HttpClient::new("manganelo")
                .with_manager(RequestManager::new(2.0, Duration::from_millis(5000)))
                .with_header("referer", &base_url),
            base_url,
        }
    }

    fn form_request(&self, url: String) -> Request {
        Request::get(url).header("content-type", "application/x-www-form-urlencoded")
    }

    async fn document(&self, request: Request) -> Result<scraper::Html> {
        let body = self.client.send_text(request).await?;
        Ok(net::html::parse(&body))
    }
}

impl Default for Manganelo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for Manganelo {
    fn id(&self) -> &str {
        "manganelo"
    }

    fn info(&self) -> &SourceInfo {
        &INFO
    }

    async fn get_manga_details(&self, manga_id: &str) -> Result<Manga> {
        let url = format!("{}/manga/{}", self.base_url, manga_id);
        let document = self.document(Request::get(url)).await?;
        Ok(parser::parse_manga_details(&document, manga_id))
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let url = format!("{}/manga/{}", self.base_url, manga_id);
        let document = self.document(Request::get(url)).await?;
        Ok(parser::parse_chapters(&document, manga_id))
    }

    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails> {
        let request = self
            .form_request(format!("{}/chapter/{}/{}", self.base_url, manga_id, chapter_id))
            .cookie(Cookie::new("content_lazyload", "off", self.base_url.clone()));
        let document = self.document(request).await?;
        Ok(parser::parse_chapter_details(&document, manga_id, chapter_id))
    }

    async fn search_request(
        &self,
        query: &SearchRequest,
        metadata: Option<Metadata>,
    ) -> Result<PagedResults> {
        let page = metadata.and_then(|m| m.page).unwrap_or(1);
        let url = format!(
            "{}/advanced_search?{}&page={}",
            self.base_url,
            parser::generate_search(query),
            page
        );
        let document = self.document(self.form_request(url)).await?;

        let next = (!parser::is_last_page(&document)).then(|| Metadata::page(page + 1));
        Ok(PagedResults::new(parser::parse_search(&document), next))
    }

    async fn get_home_page_sections(&self, on_section: SectionCallback<'_>) -> Result<()> {
        for section in parser::home_section_skeletons() {
            on_section(section);
        }

        let document = self.document(Request::get(self.base_url.clone())).await?;
        for section in parser::parse_home_sections(&document) {
            on_section(section);
        }
        Ok(())
    }

    async fn get_view_more_items(
        &self,
        section_id: &str,
        metadata: Option<Metadata>,
    ) -> Result<Option<PagedResults>> {
        let page = metadata.and_then(|m| m.page).unwrap_or(1);
        let path = match section_id {
            "latest_updates" => format!("/genre-all/{}", page),
            "new_manga" => format!("/genre-all/{}?type=newest", page),
            _ => {
                return Err(crate::Error::source(
                    self.id(),
                    format!("Requested view more items for unknown section {}", section_id),
                ));
            }
        };

        let document = self
            .document(Request::get(format!("{}{}", self.base_url, path)))
            .await?;
        let next = (!parser::is_last_page(&document)).then(|| Metadata::page(page + 1));
        Ok(Some(PagedResults::new(
            parser::parse_view_more(&document, Utc::now()),
            next,
        )))
    }

    async fn filter_updated_manga(
        &self,
        on_updates: UpdateCallback<'_>,
        since: DateTime<Utc>,
        ids: &[String],
    ) -> Result<()> {
        let mut page = 1;

        loop {
            let url = format!("{}/genre-all/{}", self.base_url, page);
            let document = self.document(self.form_request(url)).await?;
            let updated = parser::parse_updated_manga(&document, since, ids, Utc::now());
            page += 1;

            if !updated.ids.is_empty() {
                on_updates(MangaUpdates { ids: updated.ids });
            }
            // A page without a pager is the only page
            if !updated.load_more || parser::is_last_page(&document) {
                return Ok(());
            }
        }
    }

    fn get_manga_share_url(&self, manga_id: &str) -> Option<String> {
        Some(format!("{}/manga/{}", self.base_url, manga_id))
    }

    async fn get_tags(&self) -> Result<Option<Vec<TagSection>>> {
        let url = format!("{}/advanced_search?", self.base_url);
        let document = self.document(self.form_request(url)).await?;
        Ok(Some(parser::parse_tags(&document)))
    }

    fn global_request_headers(&self) -> Vec<(String, String)> {
        vec![("referer".to_string(), self.base_url.clone())]
    }
}
