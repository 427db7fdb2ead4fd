//! MangaOwl source.
//!
//! The site sits behind Cloudflare; [`Source::cloudflare_bypass_request`]
//! returns a page a caller can open to obtain clearance cookies.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::Result,
    net::{self, HttpClient, Request, RequestManager},
    source::{SectionCallback, Source, UpdateCallback},
    types::{
        Chapter, ChapterDetails, ContentRating, HomeSection, LanguageCode, Manga, MangaTile,
        MangaUpdates, Metadata, PagedResults, SearchRequest, SourceInfo, SourceTag, TagSection,
        TagType,
    },
};

pub mod parser;

const BASE: &str = "https://www.mangaowl.net";

static INFO: Lazy<SourceInfo> = Lazy::new(|| SourceInfo {
    name: "MangaOwl",
    version: "1.2.4",
    icon: "icon.png",
    author: "PythonCoderAS",
    author_website: "https://github.com/PythonCoderAS",
    description: "Extension that pulls manga from MangaOwl",
    language: LanguageCode::English,
    content_rating: ContentRating::Everyone,
    website_base_url: BASE,
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

/// Tiles from the `raw_updated_manga` API listing.
pub fn parse_raw_manga(entries: &[Value]) -> Vec<MangaTile> {
    entries
        .iter()
        .filter_map(|entry| {
            let id = match entry.get("id")? {
                Value::String(id) if !id.is_empty() => id.clone(),
                Value::Number(id) => id.to_string(),
                _ => return None,
            };
            let str_field = |key: &str| net::json::str_at(entry, key).unwrap_or_default().to_string();
            Some(MangaTile::new(id, str_field("title"), str_field("thumbnailUrl")))
        })
        .collect()
}

/// MangaOwl adapter.
pub struct MangaOwl {
    client: HttpClient,
    base_url: String,
}

impl MangaOwl {
    pub fn new() -> Self {
        Self::with_base_url(BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new("mangaowl")
                .with_manager(RequestManager::new(3.0, Duration::from_millis(30000))),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn page(&self, url: &str) -> Result<String> {
        self.client.get_text(url).await
    }

    async fn get_japanese_manga(&self, api_url: &str) -> Result<Vec<MangaTile>> {
        let entries: Vec<Value> = self
            .client
            .get_json(&format!("{}/raw_updated_manga", api_url))
            .await?;
        Ok(parse_raw_manga(&entries))
    }
}

impl Default for MangaOwl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for MangaOwl {
    fn id(&self) -> &str {
        "mangaowl"
    }

    fn info(&self) -> &SourceInfo {
        &INFO
    }

    async fn get_manga_details(&self, manga_id: &str) -> Result<Manga> {
        let body = self
            .page(&format!("{}/single/{}", self.base_url, manga_id))
            .await?;
        Ok(parser::parse_manga(&net::html::parse(&body), manga_id))
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let body = self
            .page(&format!("{}/single/{}", self.base_url, manga_id))
            .await?;
        Ok(parser::parse_chapter_list(&net::html::parse(&body), manga_id))
    }

    /// Chapter ids are the reader URLs themselves.
    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails> {
        let url = if chapter_id.starts_with("http") {
            chapter_id.to_string()
        } else {
            format!("{}/{}", self.base_url, chapter_id.trim_start_matches('/'))
        };
        let body = self.page(&url).await?;

        Ok(ChapterDetails {
            id: chapter_id.to_string(),
            manga_id: manga_id.to_string(),
            pages: parser::parse_pages(&net::html::parse(&body)),
            long_strip: true,
        })
    }

    async fn search_request(
        &self,
        query: &SearchRequest,
        _metadata: Option<Metadata>,
    ) -> Result<PagedResults> {
        let mut url = format!(
            "{}/search/1?&search_field=123&sort=4&completed=2&genres=",
            self.base_url
        );
        if let Some(title) = query.title.as_deref().filter(|t| !t.is_empty()) {
            url.push_str(&format!("&search={}", urlencoding::encode(title)));
        }

        let body = self.page(&url).await?;
        Ok(PagedResults::last(parser::parse_tile_section(
            &net::html::parse(&body),
            "browse-inner",
            0,
            false,
        )))
    }

    async fn get_home_page_sections(&self, on_section: SectionCallback<'_>) -> Result<()> {
        let body = self.page(&self.base_url).await?;

        let sections = {
            let document = net::html::parse(&body);
            let section = |id: &str, title: &str, class: &str, index: usize, view_more: bool| {
                HomeSection {
                    items: parser::parse_tile_section(&document, class, index, false),
                    ..HomeSection::new(id, title, view_more)
                }
            };
            [
                section("mustReadToday", "Must Read Today", "popular", 0, false),
                section("new_release", "New Releases", "general", 0, true),
                section("lastest", "Latest", "lastest", 0, true),
                section("popular", "Most Popular Manga", "popular", 1, true),
            ]
        };
        for section in sections {
            on_section(section);
        }

        if let Some(api_url) = parser::parse_api_url(&body) {
            debug!(api_url = %api_url, "loading raw manga section");
            let mut section = HomeSection::new("updated_raw_manga", "Japanese Manga", true);
            section.items = self.get_japanese_manga(&api_url).await?;
            on_section(section);
        }
        Ok(())
    }

    async fn get_view_more_items(
        &self,
        section_id: &str,
        _metadata: Option<Metadata>,
    ) -> Result<Option<PagedResults>> {
        let body = self
            .page(&format!("{}/{}", self.base_url, section_id))
            .await?;
        Ok(Some(PagedResults::last(parser::parse_tile_section(
            &net::html::parse(&body),
            "flexslider",
            0,
            false,
        ))))
    }

    async fn filter_updated_manga(
        &self,
        on_updates: UpdateCallback<'_>,
        since: DateTime<Utc>,
        ids: &[String],
    ) -> Result<()> {
        let mut remaining: Vec<String> = ids.to_vec();
        let mut page = 1;

        while !remaining.is_empty() {
            let body = self
                .page(&format!("{}/lastest/{}", self.base_url, page))
                .await?;
            let Some(found) = parser::parse_times_from_tiles(&net::html::parse(&body), since)
            else {
                break;
            };
            if found.is_empty() {
                break;
            }

            let matched: Vec<String> = found
                .into_iter()
                .filter(|id| remaining.contains(id))
                .collect();
            remaining.retain(|id| !matched.contains(id));
            if !matched.is_empty() {
                on_updates(MangaUpdates { ids: matched });
            }
            page += 1;
        }
        Ok(())
    }

    fn get_manga_share_url(&self, manga_id: &str) -> Option<String> {
        Some(format!("{}/single/{}", self.base_url, manga_id))
    }

    async fn get_tags(&self) -> Result<Option<Vec<TagSection>>> {
        let body = self.page(&self.base_url).await?;
        let tags = parser::parse_tags(&net::html::parse(&body));
        Ok(Some(vec![TagSection::new("1", "1", tags)]))
    }

    fn cloudflare_bypass_request(&self) -> Option<Request> {
        Some(Request::get(format!("{}/single/46862", self.base_url)))
    }
}
