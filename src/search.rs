//! Fluent search interface over a [`Sources`] collection.
//!
//! [`SearchBuilder`] collects [`SearchRequest`] fields and then runs the search
//! on one source, on all sources grouped by source, or on all sources flattened.
//! [`SearchResultExt`] post-processes flattened tiles.
//!
//! # Examples
//!
//! ```rust
//! use shiori::prelude::*;
//!
//! # async fn example() -> shiori::Result<()> {
//! let sources = Sources::with_defaults();
//!
//! // First page from one source
//! let page = sources
//!     .search("solo leveling")
//!     .include_genres(vec!["Action".to_string()])
//!     .from_source("manganelo")
//!     .await?;
//!
//! // All sources, cleaned up
//! let tiles = sources
//!     .search("solo leveling")
//!     .flatten()
//!     .await?
//!     .dedupe_by_title()
//!     .sort_by_query_relevance("solo leveling");
//! # Ok(())
//! # }
//! ```

use crate::{
    error::Result,
    source::Sources,
    types::{MangaStatus, MangaTile, Metadata, PagedResults, SearchRequest},
};

/// Builder for search requests across [`Sources`].
pub struct SearchBuilder<'a> {
    sources: &'a Sources,
    query: SearchRequest,
    metadata: Option<Metadata>,
}

impl<'a> SearchBuilder<'a> {
    pub(crate) fn new(sources: &'a Sources, title: impl Into<String>) -> Self {
        Self {
            sources,
            query: SearchRequest::from(title.into()),
            metadata: None,
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.query.author = Some(author.into());
        self
    }

    /// Genres every result must have.
    pub fn include_genres(mut self, genres: Vec<String>) -> Self {
        self.query.include_genre = genres;
        self
    }

    /// Genres no result may have.
    pub fn exclude_genres(mut self, genres: Vec<String>) -> Self {
        self.query.exclude_genre = genres;
        self
    }

    pub fn status(mut self, status: MangaStatus) -> Self {
        self.query.status = Some(status);
        self
    }

    /// Continues from a cursor returned by an earlier page. Only meaningful
    /// with [`from_source`](SearchBuilder::from_source).
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// First page from every source, concatenated.
    pub async fn flatten(self) -> Result<Vec<MangaTile>> {
        self.sources.search_all_flat(&self.query).await
    }

    /// First page from every source, keyed by source id.
    pub async fn group(self) -> Vec<(String, Result<PagedResults>)> {
        self.sources.search_all_grouped(&self.query).await
    }

    /// One page from a single source.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) when no source has `source_id`.
    pub async fn from_source(self, source_id: &str) -> Result<PagedResults> {
        match self.sources.get(source_id) {
            Some(source) => source.search_request(&self.query, self.metadata).await,
            None => Err(crate::Error::not_found(format!("Source: {}", source_id))),
        }
    }

    /// The collected request, for calling [`Source::search_request`](crate::Source::search_request) directly.
    pub fn build(self) -> SearchRequest {
        self.query
    }
}

/// Post-processing for flattened search results.
pub trait SearchResultExt {
    /// Keeps the first tile for each id.
    fn dedupe_by_id(self) -> Self;

    /// Keeps the first tile for each case-insensitive title.
    fn dedupe_by_title(self) -> Self;

    /// Orders tiles by how well their title matches `query`, best first.
    ///
    /// ```rust
    /// use shiori::search::SearchResultExt;
    /// use shiori::types::MangaTile;
    ///
    /// let tiles = vec![
    ///     MangaTile::new("2", "Kaguya-sama: Love is War Doujin", ""),
    ///     MangaTile::new("1", "Kaguya-sama: Love is War", ""),
    ///     MangaTile::new("3", "Komi Can't Communicate", ""),
    /// ]
    /// .sort_by_query_relevance("kaguya-sama: love is war");
    /// assert_eq!(tiles[0].id, "1");
    /// assert_eq!(tiles[2].id, "3");
    /// ```
    fn sort_by_query_relevance(self, query: &str) -> Self;
}

impl SearchResultExt for Vec<MangaTile> {
    fn dedupe_by_id(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        self.retain(|tile| seen.insert(tile.id.clone()));
        self
    }

    fn dedupe_by_title(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        self.retain(|tile| seen.insert(tile.title.text.to_lowercase()));
        self
    }

    fn sort_by_query_relevance(mut self, query: &str) -> Self {
        let query_lower = query.to_lowercase();
        self.sort_by(|a, b| {
            let score_a = query_relevance_score(a, &query_lower);
            let score_b = query_relevance_score(b, &query_lower);

            // Highest score first, shorter title on ties
            score_b
                .cmp(&score_a)
                .then_with(|| a.title.text.len().cmp(&b.title.text.len()))
        });
        self
    }
}

fn query_relevance_score(tile: &MangaTile, query: &str) -> u32 {
    let mut score = 0u32;
    let title_lower = tile.title.text.to_lowercase();

    if title_lower == query {
        score += 100;
    } else if title_lower.contains(query) {
        score += 50;
    } else {
        let query_words: Vec<&str> = query.split_whitespace().collect();
        let title_words: Vec<&str> = title_lower.split_whitespace().collect();

        let word_matches = query_words
            .iter()
            .filter(|query_word| {
                title_words
                    .iter()
                    .any(|title_word| title_word.contains(*query_word) || query_word.contains(title_word))
            })
            .count() as u32;

        if !query_words.is_empty() {
            score += (word_matches * 25) / query_words.len() as u32;
        }
    }

    // Subtitles often carry the author or an alternate title
    if let Some(subtitle) = &tile.subtitle_text {
        if subtitle.text.to_lowercase().contains(query) {
            score += 15;
        }
    }

    if tile.title.text.is_ascii() {
        score += 3;
    }

    score
}
