//! Base adapter for sites built on the WordPress "Madara" manga theme.
//!
//! Madara sites share markup, so one [`MadaraSource`] serves all of them. A
//! site is described by a [`MadaraConfig`]: its base URL, the path segment in
//! front of title pages, the directory page used for the home section, and the
//! few selectors that differ between installations.
//!
//! # Examples
//!
//! ```rust
//! use shiori::sources::madara::{MadaraConfig, MadaraSource};
//! use shiori::Source;
//!
//! let source = MadaraSource::new(MadaraConfig::webtoon_xyz());
//! assert_eq!(source.id(), "webtoon_xyz");
//! assert_eq!(
//!     source.get_manga_share_url("limit-breaker").as_deref(),
//!     Some("https://www.webtoon.xyz/read/limit-breaker")
//! );
//! ```
//!
//! Pointing the base adapter at another Madara site:
//!
//! ```rust
//! use shiori::sources::madara::{MadaraConfig, MadaraSource};
//! use shiori::types::{ContentRating, LanguageCode, SourceInfo};
//!
//! let info = SourceInfo {
//!     name: "Some Madara Site",
//!     version: "1.0.0",
//!     icon: "icon.png",
//!     author: "someone",
//!     author_website: "https://example.com",
//!     description: "Extension that pulls titles from a Madara site",
//!     language: LanguageCode::English,
//!     content_rating: ContentRating::Mature,
//!     website_base_url: "https://madara.example.com",
//!     source_tags: vec![],
//! };
//!
//! let config = MadaraConfig::new("some_madara", info, "https://madara.example.com")
//!     .with_traversal_path("series")
//!     .with_home_page("series");
//! let source = MadaraSource::new(config);
//! ```

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use tracing::debug;

use crate::{
    error::Result,
    net::{self, Cookie, HttpClient, Request, RequestManager},
    source::{SectionCallback, Source},
    types::{
        Chapter, ChapterDetails, ContentRating, HomeSection, IconText, LanguageCode, Manga,
        MangaStatus, MangaTile, Metadata, PagedResults, SearchRequest, SourceInfo, SourceTag, Tag,
        TagSection, TagType,
    },
    util,
};

static CHAPTER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid regex"));

static PAGE_OF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\D+(\d+)").expect("valid regex"));

fn is_post_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Site-specific settings for a Madara installation.
#[derive(Debug, Clone)]
pub struct MadaraConfig {
    pub id: &'static str,
    pub info: SourceInfo,
    pub base_url: String,
    /// Path in front of a title page, e.g. `read` for `https://www.webtoon.xyz/read/limit-breaker/`.
    pub source_traversal_path_name: &'static str,
    /// Directory page sorted by latest, e.g. `webtoons` for `https://www.webtoon.xyz/webtoons/?m_orderby=latest`.
    pub home_page: &'static str,
    /// Listing item container used when a directory page has no `div.manga` items.
    pub popular_manga_selector: &'static str,
    pub popular_manga_url_selector: &'static str,
    /// Loop selector on search result pages.
    pub search_manga_selector: &'static str,
    pub language: LanguageCode,
    pub request_manager: RequestManager,
}

impl MadaraConfig {
    /// Configuration with the theme's default paths and selectors.
    pub fn new(id: &'static str, info: SourceInfo, base_url: impl Into<String>) -> Self {
        Self {
            id,
            language: info.language,
            info,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            source_traversal_path_name: "manga",
            home_page: "manga",
            popular_manga_selector: "div.page-item-detail",
            popular_manga_url_selector: "div.post-title a",
            search_manga_selector: "div.c-tabs-item__content",
            request_manager: RequestManager::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_traversal_path(mut self, path: &'static str) -> Self {
        self.source_traversal_path_name = path;
        self
    }

    pub fn with_home_page(mut self, home_page: &'static str) -> Self {
        self.home_page = home_page;
        self
    }

    pub fn with_search_selector(mut self, selector: &'static str) -> Self {
        self.search_manga_selector = selector;
        self
    }

    pub fn with_popular_selectors(mut self, item: &'static str, url: &'static str) -> Self {
        self.popular_manga_selector = item;
        self.popular_manga_url_selector = url;
        self
    }

    pub fn with_request_manager(mut self, manager: RequestManager) -> Self {
        self.request_manager = manager;
        self
    }

    /// Webtoon.xyz
    pub fn webtoon_xyz() -> Self {
        let info = SourceInfo {
            name: "Webtoon.xyz",
            version: "1.1.0",
            icon: "icon.png",
            author: "Netsky",
            author_website: "https://github.com/TheNetsky",
            description: "Extension that pulls manga from Webtoon.xyz",
            language: LanguageCode::English,
            content_rating: ContentRating::Mature,
            website_base_url: "https://www.webtoon.xyz",
            source_tags: vec![SourceTag {
                text: "Notifications",
                kind: TagType::Green,
            }],
        };

        Self::new("webtoon_xyz", info, "https://www.webtoon.xyz")
            .with_traversal_path("read")
            .with_home_page("webtoons")
    }
}

/// A Madara site adapter.
pub struct MadaraSource {
    config: MadaraConfig,
    client: HttpClient,
}

impl MadaraSource {
    pub fn new(config: MadaraConfig) -> Self {
        let client = HttpClient::new(config.id)
            .with_manager(config.request_manager)
            .with_header("referer", &config.base_url);

        Self { config, client }
    }

    pub fn config(&self) -> &MadaraConfig {
        &self.config
    }

    /// `{base}/{path}/`, the prefix every title URL starts with.
    fn title_prefix(&self) -> String {
        format!(
            "{}/{}/",
            self.config.base_url, self.config.source_traversal_path_name
        )
    }

    fn adult_cookie(&self) -> Cookie {
        Cookie::new("wpmanga-adault", "1", self.config.base_url.clone())
    }

    /// Strips the title prefix and any slashes from a title URL.
    fn id_from_url(&self, href: &str) -> Option<String> {
        let id = href
            .strip_prefix(&self.title_prefix())
            .unwrap_or(href)
            .trim_matches('/');
        (!id.is_empty()).then(|| id.to_string())
    }

    fn post_id(&self, html: &scraper::Html, manga_id: &str) -> Result<String> {
        net::html::select_attr(html, "a.wp-manga-action-button", "data-post")
            .filter(|id| is_post_id(id))
            .ok_or_else(|| {
                crate::Error::source(
                    self.id(),
                    format!("Could not parse out the data-id for {}", manga_id),
                )
            })
    }

    /// Reads the numeric WordPress post id off a title page.
    pub fn parse_post_id(&self, manga_id: &str, page: &str) -> Result<String> {
        self.post_id(&net::html::parse(page), manga_id)
    }

    /// Post id for `manga_id`, loading the title page when given a slug.
    async fn resolve_post_id(&self, manga_id: &str) -> Result<String> {
        if is_post_id(manga_id) {
            return Ok(manga_id.to_string());
        }
        let page = self
            .client
            .get_text(&format!("{}{}/", self.title_prefix(), manga_id))
            .await?;
        self.parse_post_id(manga_id, &page)
    }

    /// Parses a title page.
    ///
    /// The returned id is the numeric WordPress post id (`data-post`), which
    /// the chapter list endpoint expects.
    pub fn parse_manga_details(&self, manga_id: &str, page: &str) -> Result<Manga> {
        let html = net::html::parse(page);

        let numeric_id = self.post_id(&html, manga_id)?;

        let title = net::html::select_text(&html, "div.post-title h1")
            .unwrap_or_default()
            .replacen("NEW", "", 1)
            .trim()
            .to_string();
        let author = net::html::select_text(&html, "div.author-content").filter(|s| !s.is_empty());
        let artist = net::html::select_text(&html, "div.artist-content").filter(|s| !s.is_empty());
        let summary = net::html::select_all_text(&html, "div.description-summary p").join("\n");
        let image = net::html::select_attr(&html, "div.summary_image img", "data-src")
            .or_else(|| net::html::select_attr(&html, "div.summary_image img", "src"))
            .unwrap_or_default();
        let rating = net::html::select_text(&html, "span.total_votes")
            .map(|r| r.replace("Your Rating", ""))
            .and_then(|r| r.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        let ongoing = net::html::select_all_text(&html, "div.summary-content")
            .iter()
            .any(|text| text.to_lowercase() == "ongoing");

        let genres = net::html::select_all_text(&html, "div.genres-content a")
            .into_iter()
            .map(|genre| Tag::new(genre.clone(), genre))
            .collect();

        Ok(Manga {
            id: numeric_id,
            titles: vec![title],
            image,
            author,
            artist,
            description: (!summary.is_empty()).then_some(summary),
            status: if ongoing {
                MangaStatus::Ongoing
            } else {
                MangaStatus::Completed
            },
            tags: vec![TagSection::new("genres", "Genres", genres)],
            rating,
            ..Default::default()
        })
    }

    /// Parses the chapter list returned by `admin-ajax.php`.
    ///
    /// Chapters carry the human-readable title slug as their manga id, taken
    /// from the first chapter link.
    pub fn parse_chapters(&self, manga_id: &str, page: &str) -> Result<Vec<Chapter>> {
        let html = net::html::parse(page);
        let links = net::html::select_all_attr(&html, "li.wp-manga-chapter a", "href");

        let real_title = links
            .first()
            .and_then(|href| href.strip_prefix(&self.title_prefix()))
            .and_then(|rest| rest.split('/').next())
            .filter(|slug| !slug.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                crate::Error::source(
                    self.id(),
                    format!("Failed to parse the human-readable title for {}", manga_id),
                )
            })?;

        let chapter_prefix = format!("{}{}/", self.title_prefix(), real_title);
        let now = Utc::now();

        let selector = scraper::Selector::parse("li.wp-manga-chapter")
            .map_err(|e| crate::Error::parse(e.to_string()))?;

        html.select(&selector)
            .map(|item| -> Result<Chapter> {
                let href = net::html::element_attr(&item, "a", "href").unwrap_or_default();
                let id = href
                    .strip_prefix(&chapter_prefix)
                    .map(|rest| rest.trim_matches('/').to_string())
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| {
                        crate::Error::source(
                            self.id(),
                            format!("Could not parse out ID when getting chapters for {}", manga_id),
                        )
                    })?;

                let link_text = net::html::element_text(&item, "a").unwrap_or_default();
                let chap_num = CHAPTER_NUMBER
                    .find(&link_text)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .unwrap_or(0.0);
                let release = net::html::element_text(&item, "i").unwrap_or_default();

                Ok(Chapter {
                    id,
                    manga_id: real_title.clone(),
                    chap_num,
                    lang_code: self.config.language,
                    time: Some(util::parse_madara_date(&release, now)),
                    ..Default::default()
                })
            })
            .collect()
    }

    pub fn parse_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
        page: &str,
    ) -> Result<ChapterDetails> {
        let html = net::html::parse(page);
        let selector = scraper::Selector::parse("div.page-break")
            .map_err(|e| crate::Error::parse(e.to_string()))?;

        let pages = html
            .select(&selector)
            .map(|item| {
                net::html::element_attr(&item, "img", "data-src")
                    .map(|src| src.replace(['\t', '\n'], "").trim().to_string())
                    .ok_or_else(|| {
                        crate::Error::source(
                            self.id(),
                            format!("Could not parse page for {}/{}", manga_id, chapter_id),
                        )
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ChapterDetails {
            id: chapter_id.to_string(),
            manga_id: manga_id.to_string(),
            pages,
            long_strip: false,
        })
    }

    /// Parses a search result page. `page` is the page that was requested.
    pub fn parse_search(&self, body: &str, page: u32) -> Result<PagedResults> {
        let html = net::html::parse(body);
        let selector = scraper::Selector::parse(self.config.search_manga_selector)
            .map_err(|e| crate::Error::parse(e.to_string()))?;

        let results = html
            .select(&selector)
            .map(|item| {
                let id = net::html::element_attr(&item, "a", "href")
                    .and_then(|href| self.id_from_url(&href));
                let title = net::html::element_attr(&item, "a", "title").filter(|t| !t.is_empty());
                let image = net::html::element_attr(&item, "img", "data-src")
                    .or_else(|| net::html::element_attr(&item, "img", "src"));

                match (id, title, image) {
                    (Some(id), Some(title), Some(image)) => Ok(MangaTile::new(id, title, image)),
                    _ => Err(crate::Error::source(
                        self.id(),
                        format!(
                            "Failed to parse search result for {} using {} as a loop selector",
                            self.config.base_url, self.config.search_manga_selector
                        ),
                    )),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        // "Page 1 of 3"
        let next = net::html::select_text(&html, "span.pages").and_then(|context| {
            let caps = PAGE_OF.captures(&context)?;
            let current = caps[1].parse::<u32>().ok()?;
            let last = caps[2].parse::<u32>().ok()?;
            (current < last).then(|| Metadata::page(page + 1))
        });

        Ok(PagedResults::new(results, next))
    }

    /// Parses a directory page sorted by latest.
    pub fn parse_listing(&self, body: &str) -> Result<Vec<MangaTile>> {
        let html = net::html::parse(body);

        let tiles = self.listing_items(&html, "div.manga", "h3.h5 a")?;
        if !tiles.is_empty() {
            return Ok(tiles);
        }

        self.listing_items(
            &html,
            self.config.popular_manga_selector,
            self.config.popular_manga_url_selector,
        )
    }

    fn listing_items(
        &self,
        html: &scraper::Html,
        item_selector: &str,
        link_selector: &str,
    ) -> Result<Vec<MangaTile>> {
        let parsed = net::html::parse_items(html, item_selector, |item: ElementRef| {
            let link = net::html::element_attr(&item, link_selector, "href");
            let title = net::html::element_text(&item, link_selector).filter(|t| !t.is_empty());
            let image = net::html::element_attr(&item, "img", "data-src")
                .or_else(|| net::html::element_attr(&item, "img", "src"));

            Some(match (link.and_then(|href| self.id_from_url(&href)), title, image) {
                (Some(id), Some(title), Some(image)) => Some(MangaTile {
                    id,
                    title: IconText::new(title),
                    image,
                    ..Default::default()
                }),
                _ => None,
            })
        });

        parsed
            .into_iter()
            .map(|tile| {
                tile.ok_or_else(|| {
                    crate::Error::source(
                        self.id(),
                        format!("Failed to parse homepage sections for {}", self.title_prefix()),
                    )
                })
            })
            .collect()
    }

    /// Has the directory page a link to its last page?
    pub fn has_last_link(&self, body: &str) -> bool {
        net::html::select_attr(&net::html::parse(body), "a.last", "href").is_some()
    }
}

#[async_trait]
impl Source for MadaraSource {
    fn id(&self) -> &str {
        self.config.id
    }

    fn info(&self) -> &SourceInfo {
        &self.config.info
    }

    async fn get_manga_details(&self, manga_id: &str) -> Result<Manga> {
        let url = format!("{}{}", self.title_prefix(), manga_id);
        let page = self.client.get_text(&url).await?;
        self.parse_manga_details(manga_id, &page)
    }

    /// Accepts the title slug from listings or the post id from details.
    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let post_id = self.resolve_post_id(manga_id).await?;
        let url = format!("{}/wp-admin/admin-ajax.php", self.config.base_url);
        let page = self
            .client
            .post_form(&url, format!("action=manga_get_chapters&manga={}", post_id))
            .await?;
        self.parse_chapters(manga_id, &page)
    }

    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails> {
        let request = Request::get(format!("{}{}/{}", self.title_prefix(), manga_id, chapter_id))
            .cookie(self.adult_cookie());
        let page = self.client.send_text(request).await?;
        self.parse_chapter_details(manga_id, chapter_id, &page)
    }

    async fn search_request(
        &self,
        query: &SearchRequest,
        metadata: Option<Metadata>,
    ) -> Result<PagedResults> {
        let page = metadata.and_then(|m| m.page).unwrap_or(0);
        let request = Request::get(format!(
            "{}/page/{}?s={}&post_type=wp-manga",
            self.config.base_url,
            page,
            urlencoding::encode(query.title_or_empty())
        ))
        .cookie(self.adult_cookie());

        let body = self.client.send_text(request).await?;
        self.parse_search(&body, page)
    }

    async fn get_home_page_sections(&self, on_section: SectionCallback<'_>) -> Result<()> {
        let mut section = HomeSection::new("latest", "Latest Titles", true);
        on_section(section.clone());

        let request = Request::get(format!(
            "{}/{}/?m_orderby=latest",
            self.config.base_url, self.config.home_page
        ))
        .cookie(self.adult_cookie());
        let body = self.client.send_text(request).await?;

        section.items = self.parse_listing(&body)?;
        debug!(source = %self.id(), items = section.items.len(), "loaded latest section");
        on_section(section);
        Ok(())
    }

    async fn get_view_more_items(
        &self,
        _section_id: &str,
        metadata: Option<Metadata>,
    ) -> Result<Option<PagedResults>> {
        let page = metadata.and_then(|m| m.page).unwrap_or(0);
        let request = Request::get(format!(
            "{}/{}/page/{}/?m_orderby=latest",
            self.config.base_url, self.config.home_page, page
        ))
        .cookie(self.adult_cookie());
        let body = self.client.send_text(request).await?;

        let items = self.parse_listing(&body)?;
        let next = self.has_last_link(&body).then(|| Metadata::page(page + 1));
        Ok(Some(PagedResults::new(items, next)))
    }

    fn get_manga_share_url(&self, manga_id: &str) -> Option<String> {
        Some(format!("{}{}", self.title_prefix(), manga_id))
    }

    fn global_request_headers(&self) -> Vec<(String, String)> {
        vec![("referer".to_string(), self.config.base_url.clone())]
    }
}
