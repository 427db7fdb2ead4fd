//! MangaMint source, an Indonesian JSON API.
//!
//! The API occasionally answers with an empty record instead of an error, so
//! title and chapter lookups are retried a few times until the payload has
//! content.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    net::{HttpClient, RequestManager},
    source::{SectionCallback, Source},
    types::{
        Chapter, ChapterDetails, ContentRating, HomeSection, LanguageCode, Manga, MangaStatus,
        MangaTile, Metadata, PagedResults, SearchRequest, SourceInfo, SourceTag, Tag, TagSection,
        TagType,
    },
};

const MANGAMINT_API_BASE: &str = "https://mangamint.kaedenoki.net/api";
const SYNOPSIS_SEPARATOR: &str = "\n\t\t\t\t\t\t";
const EMPTY_RETRIES: u32 = 3;
const LAST_POPULAR_PAGE: u32 = 30;

static INFO: Lazy<SourceInfo> = Lazy::new(|| SourceInfo {
    name: "MangaMint",
    version: "1.0.3",
    icon: "icon.png",
    author: "nar1n",
    author_website: "https://github.com/nar1n",
    description: "Extension that pulls manga from mangamint.kaedenoki.net",
    language: LanguageCode::Indonesian,
    content_rating: ContentRating::Everyone,
    website_base_url: MANGAMINT_API_BASE,
    source_tags: vec![SourceTag {
        text: "Slow",
        kind: TagType::Blue,
    }],
});

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MangaDetail {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub manga_endpoint: String,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub genre_list: Vec<Genre>,
    #[serde(default)]
    pub chapter: Vec<ChapterEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub genre_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterEntry {
    pub chapter_title: String,
    pub chapter_endpoint: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChapterPayload {
    #[serde(default)]
    pub chapter_pages: u32,
    #[serde(default)]
    pub chapter_image: Vec<ChapterImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterImage {
    pub chapter_image_link: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MangaList {
    #[serde(default)]
    pub manga_list: Vec<ListEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListEntry {
    pub title: String,
    pub thumb: String,
    pub endpoint: String,
}

/// The synopsis text after its leading layout whitespace.
///
/// ```rust
/// use shiori::sources::mangamint::synopsis;
///
/// assert_eq!(synopsis("Komik\n\t\t\t\t\t\tA quiet story.\n\t\t\t\t\t\t"), "A quiet story.");
/// assert_eq!(synopsis("  plain  "), "plain");
/// ```
pub fn synopsis(raw: &str) -> String {
    raw.split(SYNOPSIS_SEPARATOR)
        .nth(1)
        .unwrap_or(raw)
        .trim()
        .to_string()
}

/// Chapter number from the last word of a title such as `"Chapter 12.5"`.
pub fn chapter_number(title: &str) -> f64 {
    title
        .split_whitespace()
        .last()
        .and_then(|token| token.parse().ok())
        .unwrap_or(0.0)
}

pub fn parse_manga(detail: MangaDetail) -> Manga {
    let tags = detail
        .genre_list
        .into_iter()
        .map(|genre| Tag::new(genre.genre_name.clone(), genre.genre_name))
        .collect();

    Manga {
        id: detail.manga_endpoint,
        titles: vec![detail.title],
        image: detail.thumb,
        author: detail.author.filter(|a| !a.is_empty()),
        description: Some(synopsis(&detail.synopsis)).filter(|d| !d.is_empty()),
        status: if detail.status == "Ongoing" {
            MangaStatus::Ongoing
        } else {
            MangaStatus::Completed
        },
        tags: vec![TagSection::new("genre", "Genre", tags)],
        rating: 5.0,
        ..Default::default()
    }
}

/// The API carries no release dates, so every chapter is stamped with `now`.
pub fn parse_chapters(detail: &MangaDetail, manga_id: &str, now: DateTime<Utc>) -> Vec<Chapter> {
    detail
        .chapter
        .iter()
        .map(|chapter| Chapter {
            id: chapter.chapter_endpoint.clone(),
            manga_id: manga_id.to_string(),
            chap_num: chapter_number(&chapter.chapter_title),
            lang_code: LanguageCode::Indonesian,
            name: Some(chapter.chapter_title.clone()),
            time: Some(now),
            ..Default::default()
        })
        .collect()
}

/// Tiles for entries whose endpoint is not in `collected_ids` yet.
/// New ids are appended as they are taken.
pub fn parse_tiles(list: MangaList, collected_ids: &mut Vec<String>) -> Vec<MangaTile> {
    let mut tiles = Vec::new();
    for entry in list.manga_list {
        if collected_ids.contains(&entry.endpoint) {
            continue;
        }
        collected_ids.push(entry.endpoint.clone());
        tiles.push(MangaTile::new(entry.endpoint, entry.title, entry.thumb));
    }
    tiles
}

/// MangaMint adapter.
pub struct MangaMint {
    client: HttpClient,
    base_url: String,
}

impl MangaMint {
    pub fn new() -> Self {
        Self::with_base_url(MANGAMINT_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new("mangamint")
                .with_manager(RequestManager::new(2.0, Duration::from_millis(25000))),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetches `path`, refetching up to [`EMPTY_RETRIES`] times while
    /// `is_empty` holds for the payload.
    async fn fetch_filled<T, F>(&self, path: &str, is_empty: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut payload: T = self.client.get_json(&url).await?;

        for attempt in 1..=EMPTY_RETRIES {
            if !is_empty(&payload) {
                break;
            }
            debug!(url = %url, attempt, "empty payload, refetching");
            payload = self.client.get_json(&url).await?;
        }

        if is_empty(&payload) {
            warn!(url = %url, "payload still empty after retries");
        }
        Ok(payload)
    }

    async fn manga_detail(&self, manga_id: &str) -> Result<MangaDetail> {
        let path = format!("/manga/detail/{}", urlencoding::encode(manga_id));
        self.fetch_filled(&path, |detail: &MangaDetail| detail.title.is_empty())
            .await
    }

    async fn list(&self, path: &str) -> Result<MangaList> {
        self.client
            .get_json(&format!("{}{}", self.base_url, path))
            .await
    }
}

impl Default for MangaMint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for MangaMint {
    fn id(&self) -> &str {
        "mangamint"
    }

    fn info(&self) -> &SourceInfo {
        &INFO
    }

    async fn get_manga_details(&self, manga_id: &str) -> Result<Manga> {
        let detail = self.manga_detail(manga_id).await?;
        if detail.title.is_empty() {
            return Err(Error::source(self.id(), format!("Empty details for {}", manga_id)));
        }
        Ok(parse_manga(detail))
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let detail = self.manga_detail(manga_id).await?;
        Ok(parse_chapters(&detail, manga_id, Utc::now()))
    }

    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails> {
        let path = format!("/chapter/{}", urlencoding::encode(chapter_id));
        let payload = self
            .fetch_filled(&path, |chapter: &ChapterPayload| chapter.chapter_pages == 0)
            .await?;

        Ok(ChapterDetails {
            id: chapter_id.to_string(),
            manga_id: manga_id.to_string(),
            pages: payload
                .chapter_image
                .into_iter()
                .map(|image| image.chapter_image_link)
                .collect(),
            long_strip: false,
        })
    }

    async fn search_request(
        &self,
        query: &SearchRequest,
        _metadata: Option<Metadata>,
    ) -> Result<PagedResults> {
        let title = urlencoding::encode(query.title_or_empty()).into_owned();
        let list = self.list(&format!("/search/{}", title)).await?;
        Ok(PagedResults::last(parse_tiles(list, &mut Vec::new())))
    }

    async fn get_home_page_sections(&self, on_section: SectionCallback<'_>) -> Result<()> {
        let sections = [
            ("/recommended", HomeSection::new("recommended", "RECOMMENDED MANGA", false)),
            ("/manga/popular/1", HomeSection::new("popular", "POPULAR MANGA", true)),
        ];

        for (path, mut section) in sections {
            on_section(section.clone());
            let list = self.list(path).await?;
            section.items = parse_tiles(list, &mut Vec::new());
            on_section(section);
        }
        Ok(())
    }

    /// Only the popular listing pages; the site serves thirty of them.
    async fn get_view_more_items(
        &self,
        _section_id: &str,
        metadata: Option<Metadata>,
    ) -> Result<Option<PagedResults>> {
        let metadata = metadata.unwrap_or_default();
        let page = metadata.page.unwrap_or(1);
        let mut collected_ids = metadata.collected_ids;

        let list = self.list(&format!("/manga/popular/{}", page)).await?;
        let tiles = parse_tiles(list, &mut collected_ids);

        let next = (page < LAST_POPULAR_PAGE).then(|| Metadata {
            page: Some(page + 1),
            collected_ids,
            ..Default::default()
        });
        Ok(Some(PagedResults::new(tiles, next)))
    }
}
