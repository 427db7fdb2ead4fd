//! Source trait and collection for managing site adapters.
//!
//! This module defines the [`Source`] trait every adapter implements and the
//! [`Sources`] collection for working with several adapters at once.
//!
//! # Examples
//!
//! ```rust
//! use shiori::prelude::*;
//! use shiori::error::Result;
//!
//! # async fn example() -> Result<()> {
//! let mut sources = Sources::new();
//! sources.add(MangaDex::new());
//! sources.add(Hachirumi::new());
//!
//! // Search across all sources
//! let tiles = sources.search("kaguya").flatten().await?;
//!
//! // Fetch chapters from a specific source
//! if let Some(source) = sources.get("mangadex") {
//!     let chapters = source.get_chapters(&tiles[0].id).await?;
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future;
use std::collections::HashMap;
use tracing::debug;

use crate::{
    error::Result,
    net::Request,
    search::SearchBuilder,
    types::{
        Chapter, ChapterDetails, HomeSection, Manga, MangaUpdates, Metadata, PagedResults,
        SearchRequest, SourceInfo, TagSection,
    },
};

/// Callback through which an adapter hands home sections to the caller.
///
/// Adapters call it once per section with an empty skeleton, then again with
/// the same section filled.
pub type SectionCallback<'a> = &'a (dyn Fn(HomeSection) + Send + Sync);

/// Callback receiving batches of updated manga ids.
pub type UpdateCallback<'a> = &'a (dyn Fn(MangaUpdates) + Send + Sync);

/// Trait that all site adapters implement.
///
/// # Required Methods
///
/// * [`id()`](Source::id) - Unique identifier for the source
/// * [`info()`](Source::info) - Static description (name, version, language, ...)
/// * [`get_manga_details()`](Source::get_manga_details) - Full metadata for one title
/// * [`get_chapters()`](Source::get_chapters) - Chapter list for a title
/// * [`get_chapter_details()`](Source::get_chapter_details) - Page URLs for a chapter
/// * [`search_request()`](Source::search_request) - One page of search results
///
/// Everything else has a default a site may override.
///
/// # Implementation Guidelines
///
/// - Use [`net::HttpClient`](crate::net::HttpClient) for HTTP requests so rate
///   limits and retries apply
/// - Return [`Error::Source`](crate::Error::Source) naming the adapter when the
///   site is missing data the adapter depends on
/// - Return `metadata: None` in [`PagedResults`] when there are no further pages
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use once_cell::sync::Lazy;
/// use shiori::prelude::*;
/// use shiori::types::{ChapterDetails, LanguageCode, ContentRating, SourceInfo};
/// use shiori::Result;
///
/// static INFO: Lazy<SourceInfo> = Lazy::new(|| SourceInfo {
///     name: "Example",
///     version: "1.0.0",
///     icon: "icon.png",
///     author: "someone",
///     author_website: "https://example.com",
///     description: "Example source",
///     language: LanguageCode::English,
///     content_rating: ContentRating::Everyone,
///     website_base_url: "https://example.com",
///     source_tags: vec![],
/// });
///
/// struct ExampleSource;
///
/// #[async_trait]
/// impl Source for ExampleSource {
///     fn id(&self) -> &str { "example" }
///     fn info(&self) -> &SourceInfo { &INFO }
///
///     async fn get_manga_details(&self, manga_id: &str) -> Result<Manga> {
///         Ok(Manga { id: manga_id.to_string(), ..Default::default() })
///     }
///
///     async fn get_chapters(&self, _manga_id: &str) -> Result<Vec<Chapter>> {
///         Ok(vec![])
///     }
///
///     async fn get_chapter_details(&self, manga_id: &str, chapter_id: &str) -> Result<ChapterDetails> {
///         Ok(ChapterDetails { id: chapter_id.into(), manga_id: manga_id.into(), ..Default::default() })
///     }
///
///     async fn search_request(&self, _query: &SearchRequest, _metadata: Option<Metadata>) -> Result<PagedResults> {
///         Ok(PagedResults::last(vec![]))
///     }
/// }
/// ```
#[async_trait]
pub trait Source: Send + Sync {
    /// Unique identifier, e.g. `"mangadex"`.
    fn id(&self) -> &str;

    fn info(&self) -> &SourceInfo;

    /// Human-readable name.
    fn name(&self) -> &str {
        self.info().name
    }

    /// Full metadata for the title `manga_id`.
    async fn get_manga_details(&self, manga_id: &str) -> Result<Manga>;

    /// Chapter list of `manga_id`, in the order the site presents it.
    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>>;

    /// Ordered page image URLs of one chapter.
    async fn get_chapter_details(&self, manga_id: &str, chapter_id: &str)
    -> Result<ChapterDetails>;

    /// One page of search results.
    ///
    /// `metadata` is `None` for the first page and the cursor returned by the
    /// previous call afterwards.
    async fn search_request(
        &self,
        query: &SearchRequest,
        metadata: Option<Metadata>,
    ) -> Result<PagedResults>;

    /// Emits the sections of the site's front page through `on_section`.
    async fn get_home_page_sections(&self, on_section: SectionCallback<'_>) -> Result<()> {
        let _ = on_section;
        Err(crate::Error::unsupported(self.id(), "home page sections"))
    }

    /// The next page of a home section; `Ok(None)` when the section has no
    /// "view more".
    async fn get_view_more_items(
        &self,
        section_id: &str,
        metadata: Option<Metadata>,
    ) -> Result<Option<PagedResults>> {
        let _ = (section_id, metadata);
        Ok(None)
    }

    /// Reports which of `ids` changed after `since`.
    async fn filter_updated_manga(
        &self,
        on_updates: UpdateCallback<'_>,
        since: DateTime<Utc>,
        ids: &[String],
    ) -> Result<()> {
        let _ = (on_updates, since, ids);
        debug!(source = %self.id(), "update filtering not supported");
        Ok(())
    }

    /// Public web page of a title.
    fn get_manga_share_url(&self, manga_id: &str) -> Option<String> {
        let _ = manga_id;
        None
    }

    /// Tag sections available for searching.
    async fn get_tags(&self) -> Result<Option<Vec<TagSection>>> {
        Ok(None)
    }

    /// A request a caller can open in a browser to pass a Cloudflare challenge.
    fn cloudflare_bypass_request(&self) -> Option<Request> {
        None
    }

    /// Headers the caller should send when loading images from this source.
    fn global_request_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Collection of adapters with lookup by id and aggregated search.
///
/// ```rust
/// use shiori::prelude::*;
///
/// let mut sources = Sources::new();
/// sources.add(Hachirumi::new());
///
/// assert_eq!(sources.len(), 1);
/// assert!(sources.get("hachirumi").is_some());
/// assert!(sources.get("missing").is_none());
/// ```
pub struct Sources {
    sources: Vec<Box<dyn Source>>,
    by_id: HashMap<String, usize>,
}

impl Sources {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Creates a collection with every adapter enabled by cargo features.
    pub fn with_defaults() -> Self {
        let mut sources = Self::new();
        crate::sources::register_defaults(&mut sources);
        sources
    }

    /// Starts a fluent search. See [`SearchBuilder`].
    pub fn search(&self, query: impl Into<String>) -> SearchBuilder<'_> {
        SearchBuilder::new(self, query)
    }

    /// Adds a source. A source with the same id takes the earlier one's place.
    pub fn add(&mut self, source: impl Source + 'static) -> &mut Self {
        let id = source.id().to_string();
        match self.by_id.get(&id) {
            Some(&index) => self.sources[index] = Box::new(source),
            None => {
                self.by_id.insert(id, self.sources.len());
                self.sources.push(Box::new(source));
            }
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<&dyn Source> {
        self.by_id
            .get(id)
            .and_then(|&index| self.sources.get(index))
            .map(|s| s.as_ref())
    }

    pub fn list_ids(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    /// Runs the first page of `query` on every source concurrently and returns
    /// each source's outcome.
    pub async fn search_all_grouped(
        &self,
        query: &SearchRequest,
    ) -> Vec<(String, Result<PagedResults>)> {
        let futures = self.sources.iter().map(|source| async move {
            let result = source.search_request(query, None).await;
            (source.id().to_string(), result)
        });

        future::join_all(futures).await
    }

    /// Like [`search_all_grouped`](Sources::search_all_grouped) but concatenates
    /// the tiles. Fails only when every source failed.
    pub async fn search_all_flat(&self, query: &SearchRequest) -> Result<Vec<crate::MangaTile>> {
        let grouped = self.search_all_grouped(query).await;

        let mut all_results = Vec::new();
        let mut errors = Vec::new();

        for (source_id, result) in grouped {
            match result {
                Ok(mut page) => all_results.append(&mut page.results),
                Err(e) => errors.push(format!("{}: {}", source_id, e)),
            }
        }

        if all_results.is_empty() && !errors.is_empty() {
            return Err(crate::Error::Other(format!(
                "All sources failed: {}",
                errors.join(", ")
            )));
        }

        Ok(all_results)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self::new()
    }
}
