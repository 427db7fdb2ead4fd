//! Hachirumi source.
//!
//! A single `/series/{slug}` payload carries the title, every chapter and
//! every scanlation group's page files, so details, chapters and pages all
//! come from the same request. Chapter ids have the form
//! `chapterKey|groupKey|folder`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

use crate::{
    error::{Error, Result},
    net::{HttpClient, Request, RequestManager},
    source::Source,
    types::{
        Chapter, ChapterDetails, ContentRating, LanguageCode, Manga, MangaStatus, MangaTile,
        Metadata, PagedResults, SearchRequest, SourceInfo,
    },
};

const HACHIRUMI_DOMAIN: &str = "https://hachirumi.com";

static INFO: Lazy<SourceInfo> = Lazy::new(|| SourceInfo {
    name: "Hachirumi",
    version: "1.0.0",
    icon: "icon.png",
    author: "Curstantine",
    author_website: "https://github.com/Curstantine",
    description: "Extension that pulls manga from Hachirumi.",
    language: LanguageCode::English,
    content_rating: ContentRating::Everyone,
    website_base_url: HACHIRUMI_DOMAIN,
    source_tags: Vec::new(),
});

#[derive(Debug, Clone, Deserialize)]
pub struct Series {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub groups: HashMap<String, String>,
    #[serde(default)]
    pub chapters: HashMap<String, SeriesChapter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesChapter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    pub folder: String,
    /// Group key to page file names.
    #[serde(default)]
    pub groups: HashMap<String, Vec<String>>,
    /// Group key to unix release time in seconds.
    #[serde(default)]
    pub release_date: HashMap<String, i64>,
}

/// Entry of `/get_all_series`, keyed by title.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesSummary {
    pub slug: String,
    #[serde(default)]
    pub cover: String,
}

/// A parsed `chapterKey|groupKey|folder` id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterId<'a> {
    pub chapter: &'a str,
    pub group: &'a str,
    pub folder: &'a str,
}

impl<'a> ChapterId<'a> {
    /// ```rust
    /// use shiori::sources::hachirumi::ChapterId;
    ///
    /// let id = ChapterId::parse("12.5|2|a1b2").unwrap();
    /// assert_eq!(id.chapter, "12.5");
    /// assert_eq!(id.group, "2");
    /// assert_eq!(id.folder, "a1b2");
    /// assert!(ChapterId::parse("12.5|2").is_err());
    /// ```
    pub fn parse(id: &'a str) -> Result<Self> {
        let mut parts = id.split('|');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(chapter), Some(group), Some(folder))
                if !chapter.is_empty() && !group.is_empty() && !folder.is_empty() =>
            {
                Ok(Self {
                    chapter,
                    group,
                    folder,
                })
            }
            _ => Err(Error::source(
                "hachirumi",
                format!("Malformed chapter id {}", id),
            )),
        }
    }
}

pub fn parse_manga(series: &Series, domain: &str) -> Manga {
    Manga {
        id: series.slug.clone(),
        titles: vec![series.title.clone()],
        image: format!("{}{}", domain, series.cover),
        author: series.author.clone(),
        artist: series.artist.clone(),
        description: series.description.clone(),
        status: MangaStatus::Ongoing,
        rating: 0.0,
        ..Default::default()
    }
}

/// One chapter per (chapter, group) pair, highest chapter number first.
pub fn parse_chapters(series: &Series) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = series
        .chapters
        .iter()
        .flat_map(|(key, chapter)| {
            chapter.groups.keys().map(move |group_key| Chapter {
                id: format!("{}|{}|{}", key, group_key, chapter.folder),
                manga_id: series.slug.clone(),
                chap_num: key.parse().unwrap_or(0.0),
                volume: chapter.volume.as_deref().and_then(|v| v.parse().ok()),
                lang_code: LanguageCode::English,
                name: chapter.title.clone().filter(|t| !t.is_empty()),
                time: chapter
                    .release_date
                    .get(group_key)
                    .and_then(|secs| DateTime::<Utc>::from_timestamp(*secs, 0)),
                group: series.groups.get(group_key).cloned(),
            })
        })
        .collect();

    chapters.sort_by(|a, b| {
        b.chap_num
            .total_cmp(&a.chap_num)
            .then_with(|| a.group.cmp(&b.group))
    });
    chapters
}

/// Image URLs for one group's release of a chapter.
pub fn parse_pages(series: &Series, chapter_id: &str, domain: &str) -> Result<Vec<String>> {
    let id = ChapterId::parse(chapter_id)?;
    let files = series
        .chapters
        .get(id.chapter)
        .and_then(|chapter| chapter.groups.get(id.group))
        .ok_or_else(|| {
            Error::source("hachirumi", format!("No pages for chapter {}", chapter_id))
        })?;

    Ok(files
        .iter()
        .map(|file| {
            format!(
                "{}/media/manga/{}/chapters/{}/{}/{}",
                domain, series.slug, id.folder, id.group, file
            )
        })
        .collect())
}

/// Titles from the full series listing that contain `query`.
///
/// The first `-` of each title counts as a space when matching.
pub fn filter_series(
    all: HashMap<String, SeriesSummary>,
    query: &str,
    domain: &str,
) -> Vec<MangaTile> {
    let query = query.to_lowercase();
    let mut tiles: Vec<MangaTile> = all
        .into_iter()
        .filter(|(title, _)| title.replacen('-', " ", 1).to_lowercase().contains(&query))
        .map(|(title, summary)| {
            MangaTile::new(summary.slug, title, format!("{}{}", domain, summary.cover))
        })
        .collect();
    tiles.sort_by(|a, b| a.title.text.cmp(&b.title.text));
    tiles
}

/// Hachirumi adapter.
pub struct Hachirumi {
    client: HttpClient,
    base_url: String,
}

impl Hachirumi {
    pub fn new() -> Self {
        Self::with_base_url(HACHIRUMI_DOMAIN)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new("hachirumi").with_manager(RequestManager::default()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn api<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = Request::get(format!("{}/api{}", self.base_url, path))
            .header("accept-encoding", "application/json");
        self.client.send_json(request).await
    }

    async fn series(&self, slug: &str) -> Result<Series> {
        self.api(&format!("/series/{}", slug)).await
    }
}

impl Default for Hachirumi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for Hachirumi {
    fn id(&self) -> &str {
        "hachirumi"
    }

    fn info(&self) -> &SourceInfo {
        &INFO
    }

    async fn get_manga_details(&self, manga_id: &str) -> Result<Manga> {
        let series = self.series(manga_id).await?;
        Ok(parse_manga(&series, &self.base_url))
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let series = self.series(manga_id).await?;
        Ok(parse_chapters(&series))
    }

    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails> {
        ChapterId::parse(chapter_id)?;
        let series = self.series(manga_id).await?;

        Ok(ChapterDetails {
            id: chapter_id.to_string(),
            manga_id: manga_id.to_string(),
            pages: parse_pages(&series, chapter_id, &self.base_url)?,
            long_strip: false,
        })
    }

    /// The whole catalogue comes back at once; the returned cursor only marks
    /// that, so a follow-up call yields nothing instead of duplicates.
    async fn search_request(
        &self,
        query: &SearchRequest,
        metadata: Option<Metadata>,
    ) -> Result<PagedResults> {
        let done = Metadata {
            limit_reached: true,
            ..Default::default()
        };
        if metadata.is_some_and(|m| m.limit_reached) {
            return Ok(PagedResults::new(Vec::new(), Some(done)));
        }

        let all: HashMap<String, SeriesSummary> = self.api("/get_all_series").await?;
        Ok(PagedResults::new(
            filter_series(all, query.title_or_empty(), &self.base_url),
            Some(done),
        ))
    }

    fn get_manga_share_url(&self, manga_id: &str) -> Option<String> {
        Some(format!("{}/read/manga/{}", self.base_url, manga_id))
    }
}
