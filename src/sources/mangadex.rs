//! MangaDex source backed by the public JSON API.
//!
//! Titles and chapters are addressed by UUID. Ids without a `-` are legacy
//! numeric ids from the old site; they are translated through the API's
//! legacy mapping endpoint before use.
//!
//! # Examples
//!
//! ```rust
//! use shiori::prelude::*;
//!
//! # async fn example() -> shiori::Result<()> {
//! let source = MangaDex::new();
//! let page = source.search_request(&"kaguya".into(), None).await?;
//!
//! if let Some(tile) = page.results.first() {
//!     let manga = source.get_manga_details(&tile.id).await?;
//!     let chapters = source.get_chapters(&tile.id).await?;
//!     println!("{} has {} chapters", manga.title(), chapters.len());
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    error::Result,
    net::{HttpClient, Request, RequestManager},
    source::{SectionCallback, Source, UpdateCallback},
    types::{
        Chapter, ChapterDetails, ContentRating, HomeSection, LanguageCode, Manga, MangaStatus,
        MangaTile, MangaUpdates, Metadata, PagedResults, SearchRequest, SourceInfo, SourceTag,
        Tag, TagSection, TagType, UpdatedManga,
    },
    util,
};

const MANGADEX_DOMAIN: &str = "https://mangadex.org";
const MANGADEX_API: &str = "https://api.mangadex.org";
const COVER_BASE_URL: &str = "https://uploads.mangadex.org/covers";
const PLACEHOLDER_COVER: &str = "https://i.imgur.com/6TrIues.jpg";
const ACTION_TAG: &str = "391b0423-d847-456f-aff0-8b0cfc03066b";

const LEGACY_BATCH: usize = 500;
const GROUP_BATCH: usize = 100;
const FEED_LIMIT: u32 = 500;
const PAGE_LIMIT: u32 = 100;

static INFO: Lazy<SourceInfo> = Lazy::new(|| SourceInfo {
    name: "MangaDex",
    version: "1.0.4",
    icon: "icon.png",
    author: "nar1n",
    author_website: "https://github.com/nar1n",
    description: "Extension that pulls manga from MangaDex",
    language: LanguageCode::English,
    content_rating: ContentRating::Everyone,
    website_base_url: MANGADEX_DOMAIN,
    source_tags: vec![
        SourceTag {
            text: "Recommended",
            kind: TagType::Blue,
        },
        SourceTag {
            text: "Notifications",
            kind: TagType::Green,
        },
    ],
});

#[derive(Debug, Deserialize)]
struct ListResponse<A> {
    results: Option<Vec<Entity<A>>>,
    total: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Entity<A> {
    data: EntityData<A>,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

#[derive(Debug, Deserialize)]
struct EntityData<A> {
    id: String,
    attributes: A,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct MangaAttributes {
    #[serde(default)]
    title: HashMap<String, String>,
    #[serde(rename = "altTitles", default)]
    alt_titles: Vec<HashMap<String, String>>,
    #[serde(default)]
    description: HashMap<String, String>,
    status: Option<String>,
    #[serde(default)]
    tags: Vec<TagEntity>,
    #[serde(rename = "updatedAt")]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagEntity {
    id: String,
    attributes: TagAttributes,
}

#[derive(Debug, Deserialize)]
struct TagAttributes {
    #[serde(default)]
    name: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ChapterAttributes {
    title: Option<String>,
    chapter: Option<String>,
    volume: Option<String>,
    #[serde(rename = "translatedLanguage", default)]
    translated_language: String,
    #[serde(rename = "publishAt")]
    publish_at: Option<String>,
    #[serde(default)]
    hash: String,
    #[serde(default)]
    data: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NamedAttributes {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CoverAttributes {
    #[serde(rename = "fileName")]
    file_name: String,
}

#[derive(Debug, Deserialize)]
struct LegacyAttributes {
    #[serde(rename = "legacyId")]
    legacy_id: u64,
    #[serde(rename = "newId")]
    new_id: String,
}

#[derive(Debug, Deserialize)]
struct AtHomeResponse {
    #[serde(rename = "baseUrl")]
    base_url: String,
}

/// Picks the display title: English first, then romanised Japanese, then
/// whatever the map holds.
fn best_title(titles: &HashMap<String, String>) -> String {
    ["en", "ja-ro", "ja"]
        .iter()
        .find_map(|lang| titles.get(*lang).filter(|t| !t.trim().is_empty()))
        .or_else(|| titles.values().find(|t| !t.trim().is_empty()))
        .map(|t| util::decode_html_entities(t.trim()))
        .unwrap_or_default()
}

fn related<'a>(relationships: &'a [Relationship], kind: &'a str) -> impl Iterator<Item = &'a str> {
    relationships
        .iter()
        .filter(move |r| r.kind == kind)
        .map(|r| r.id.as_str())
}

/// Legacy ids are the numeric ids of the old site.
pub fn is_legacy_id(id: &str) -> bool {
    !id.contains('-')
}

/// The truncated ISO timestamp `updatedAtSince` accepts, e.g. `2021-05-20T12:00:00`.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use shiori::sources::mangadex::updated_at_since;
///
/// let time = Utc.with_ymd_and_hms(2021, 5, 20, 12, 0, 0).unwrap();
/// assert_eq!(updated_at_since(time), "2021-05-20T12:00:00");
/// ```
pub fn updated_at_since(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Scans one `/manga?updatedAtSince=` response. A 204 means nothing else was
/// updated.
///
/// # Errors
///
/// Fails when a non-204 body is not a listing.
pub fn scan_updates(
    status: u16,
    body: &str,
    since: DateTime<Utc>,
    ids: &[String],
    conversion: &HashMap<String, String>,
) -> Result<UpdatedManga> {
    if status == 204 {
        return Ok(UpdatedManga::default());
    }
    Ok(MangaPage::parse(body)?.updated_ids(since, ids, conversion))
}

/// One page of the `/manga` listing endpoint.
#[derive(Debug)]
pub struct MangaPage {
    entries: Vec<Entity<MangaAttributes>>,
    pub total: Option<u32>,
}

impl MangaPage {
    /// Parses a `/manga` listing body.
    ///
    /// # Errors
    ///
    /// [`Error::Source`](crate::Error::Source) when the body has no `results`.
    pub fn parse(body: &str) -> Result<Self> {
        let response: ListResponse<MangaAttributes> = serde_json::from_str(body)?;
        let entries = response
            .results
            .ok_or_else(|| crate::Error::source("mangadex", "Failed to parse json results"))?;
        Ok(Self {
            entries,
            total: response.total,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cover art ids referenced by the entries.
    pub fn cover_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| related(&entry.relationships, "cover_art").next())
            .map(String::from)
            .collect()
    }

    /// Converts the entries to tiles, skipping ids already in `collected_ids`
    /// and recording the new ones there.
    ///
    /// `covers` maps cover ids to file names; entries without a known cover
    /// get a placeholder image.
    pub fn tiles(
        &self,
        covers: &HashMap<String, String>,
        cover_base: &str,
        collected_ids: &mut Vec<String>,
    ) -> Vec<MangaTile> {
        let mut seen: HashSet<String> = collected_ids.iter().cloned().collect();
        let mut tiles = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let manga_id = &entry.data.id;
            if !seen.insert(manga_id.clone()) {
                continue;
            }
            collected_ids.push(manga_id.clone());

            let image = related(&entry.relationships, "cover_art")
                .next()
                .and_then(|cover_id| covers.get(cover_id))
                .map(|file| format!("{}/{}/{}.256.jpg", cover_base, manga_id, file))
                .unwrap_or_else(|| PLACEHOLDER_COVER.to_string());

            tiles.push(MangaTile::new(
                manga_id.clone(),
                best_title(&entry.data.attributes.title),
                image,
            ));
        }

        tiles
    }

    /// Ids from `ids` updated after `since`. Entries known only by their
    /// legacy id come back through `conversion` (uuid to legacy id).
    ///
    /// The whole page is scanned; an entry at or before `since` only stops
    /// further pages from loading. So does an empty page.
    pub fn updated_ids(
        &self,
        since: DateTime<Utc>,
        ids: &[String],
        conversion: &HashMap<String, String>,
    ) -> UpdatedManga {
        let mut found = Vec::new();
        let mut load_more = !self.is_empty();

        for (manga_id, time) in self.update_times() {
            if time.is_none_or(|time| time <= since) {
                load_more = false;
            } else if ids.contains(&manga_id) {
                found.push(manga_id);
            } else if let Some(legacy) = conversion.get(&manga_id).filter(|l| ids.contains(l)) {
                found.push(legacy.clone());
            }
        }

        UpdatedManga {
            ids: found,
            load_more,
        }
    }

    /// Cursor for the search page after the one at `offset`; `None` once the
    /// page is empty or `total` is reached.
    pub fn next_offset(&self, offset: u32) -> Option<Metadata> {
        let next = offset + PAGE_LIMIT;
        let more = !self.is_empty() && self.total.is_none_or(|total| next < total);
        more.then(|| Metadata::offset(next))
    }

    /// `(id, updatedAt)` of every entry, in listing order.
    pub fn update_times(&self) -> Vec<(String, Option<DateTime<Utc>>)> {
        self.entries
            .iter()
            .map(|entry| {
                let time = entry
                    .data
                    .attributes
                    .updated_at
                    .as_deref()
                    .and_then(parse_api_time);
                (entry.data.id.clone(), time)
            })
            .collect()
    }
}

/// One page of a chapter feed.
#[derive(Debug)]
pub struct ChapterFeed {
    entries: Vec<Entity<ChapterAttributes>>,
    pub total: u32,
}

impl ChapterFeed {
    pub fn parse(body: &str) -> Result<Self> {
        let response: ListResponse<ChapterAttributes> = serde_json::from_str(body)?;
        let entries = response
            .results
            .ok_or_else(|| crate::Error::source("mangadex", "Failed to parse json results"))?;
        Ok(Self {
            total: response.total.unwrap_or(0),
            entries,
        })
    }

    /// Chapters of this page paired with their scanlation group ids.
    pub fn chapters(&self, manga_id: &str) -> Vec<(Chapter, Vec<String>)> {
        self.entries
            .iter()
            .map(|entry| {
                let attributes = &entry.data.attributes;
                let chapter = Chapter {
                    id: entry.data.id.clone(),
                    manga_id: manga_id.to_string(),
                    chap_num: attributes
                        .chapter
                        .as_deref()
                        .and_then(|c| c.parse().ok())
                        .unwrap_or(0.0),
                    volume: attributes.volume.as_deref().and_then(|v| v.parse().ok()),
                    lang_code: LanguageCode::from_mangadex(&attributes.translated_language),
                    name: attributes
                        .title
                        .as_deref()
                        .filter(|t| !t.is_empty())
                        .map(util::decode_html_entities),
                    time: attributes.publish_at.as_deref().and_then(parse_api_time),
                    group: None,
                };
                let groups = related(&entry.relationships, "scanlation_group")
                    .map(String::from)
                    .collect();
                (chapter, groups)
            })
            .collect()
    }
}

fn parse_api_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn ids_query(ids: &[String]) -> String {
    ids.iter()
        .enumerate()
        .map(|(index, id)| format!("&ids[{}]={}", index, id))
        .collect()
}

/// MangaDex adapter.
pub struct MangaDex {
    client: HttpClient,
    api_base: String,
    cover_base: String,
}

impl MangaDex {
    pub fn new() -> Self {
        Self {
            client: HttpClient::new("mangadex")
                .with_manager(RequestManager::new(4.0, Duration::from_millis(15000)))
                .with_max_retries(3),
            api_base: MANGADEX_API.to_string(),
            cover_base: COVER_BASE_URL.to_string(),
        }
    }

    /// Points the adapter at another API host.
    pub fn with_base_url(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Maps legacy numeric ids to UUIDs, 500 per request.
    pub async fn get_manga_uuids(&self, numeric_ids: &[String]) -> Result<HashMap<String, String>> {
        let mut uuids = HashMap::new();

        for batch in numeric_ids.chunks(LEGACY_BATCH) {
            let ids: Vec<u64> = batch.iter().filter_map(|id| id.parse().ok()).collect();
            let request = Request::post(format!("{}/legacy/mapping", self.api_base))
                .header("content-type", "application/json")
                .json(json!({ "type": "manga", "ids": ids }));

            let mappings: Vec<Entity<LegacyAttributes>> = self.client.send_json(request).await?;
            for mapping in mappings {
                let attributes = mapping.data.attributes;
                uuids.insert(attributes.legacy_id.to_string(), attributes.new_id);
            }
        }

        Ok(uuids)
    }

    async fn resolve_manga_id(&self, manga_id: &str) -> Result<String> {
        if !is_legacy_id(manga_id) {
            return Ok(manga_id.to_string());
        }

        debug!(manga_id, "translating legacy id");
        self.get_manga_uuids(&[manga_id.to_string()])
            .await?
            .remove(manga_id)
            .ok_or_else(|| crate::Error::not_found(format!("No MangaDex mapping for {}", manga_id)))
    }

    async fn get_named(&self, endpoint: &str, ids: &[String]) -> Result<HashMap<String, String>> {
        let url = format!("{}/{}?limit=100{}", self.api_base, endpoint, ids_query(ids));
        let response: ListResponse<NamedAttributes> = self.client.get_json(&url).await?;

        Ok(response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|entry| (entry.data.id, util::decode_html_entities(&entry.data.attributes.name)))
            .collect())
    }

    /// Author and artist names by id.
    pub async fn get_authors(&self, author_ids: &[String]) -> Result<HashMap<String, String>> {
        self.get_named("author", author_ids).await
    }

    /// Scanlation group names by id, 100 per request.
    pub async fn get_groups(&self, group_ids: &[String]) -> Result<HashMap<String, String>> {
        let mut groups = HashMap::new();
        for batch in group_ids.chunks(GROUP_BATCH) {
            groups.extend(self.get_named("group", batch).await?);
        }
        Ok(groups)
    }

    /// Cover file names by cover id.
    pub async fn get_covers(&self, cover_ids: &[String]) -> Result<HashMap<String, String>> {
        if cover_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/cover?limit=100{}", self.api_base, ids_query(cover_ids));
        let response: ListResponse<CoverAttributes> = self.client.get_json(&url).await?;

        Ok(response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|entry| (entry.data.id, entry.data.attributes.file_name))
            .collect())
    }

    /// Base URL of the MangaDex@Home node serving a chapter.
    pub async fn get_mdh_node_url(&self, chapter_id: &str) -> Result<String> {
        let url = format!("{}/at-home/server/{}", self.api_base, chapter_id);
        let response: AtHomeResponse = self.client.get_json(&url).await?;
        Ok(response.base_url)
    }

    /// Fetches one listing page and turns it into tiles.
    async fn manga_list(
        &self,
        url: &str,
        collected_ids: &mut Vec<String>,
    ) -> Result<(Vec<MangaTile>, Option<u32>)> {
        let body = self.client.get_text(url).await?;
        let page = MangaPage::parse(&body)?;
        let covers = self.get_covers(&page.cover_ids()).await?;
        Ok((page.tiles(&covers, &self.cover_base, collected_ids), page.total))
    }

    fn section_url(&self, section_id: &str, limit: u32, offset: u32) -> Option<String> {
        let filter = match section_id {
            "recently_updated" => String::new(),
            "shounen" => "&publicationDemographic[0]=shounen".to_string(),
            "action" => format!("&includedTags[0]={}", ACTION_TAG),
            _ => return None,
        };
        Some(format!(
            "{}/manga?limit={}{}&offset={}",
            self.api_base, limit, filter, offset
        ))
    }
}

impl Default for MangaDex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for MangaDex {
    fn id(&self) -> &str {
        "mangadex"
    }

    fn info(&self) -> &SourceInfo {
        &INFO
    }

    async fn get_manga_details(&self, manga_id: &str) -> Result<Manga> {
        let uuid = self.resolve_manga_id(manga_id).await?;
        let response: Entity<MangaAttributes> = self
            .client
            .get_json(&format!("{}/manga/{}", self.api_base, uuid))
            .await?;
        let attributes = &response.data.attributes;

        let mut titles = vec![best_title(&attributes.title)];
        titles.extend(
            attributes
                .alt_titles
                .iter()
                .filter_map(|alt| alt.values().next())
                .map(|t| util::decode_html_entities(t)),
        );

        let description = attributes
            .description
            .get("en")
            .map(|d| util::strip_bbcode(&util::decode_html_entities(d)));

        let tags = attributes
            .tags
            .iter()
            .map(|tag| {
                let label = tag
                    .attributes
                    .name
                    .get("en")
                    .or_else(|| tag.attributes.name.values().next())
                    .cloned()
                    .unwrap_or_default();
                Tag::new(tag.id.clone(), label)
            })
            .collect();

        let author_ids: Vec<String> = related(&response.relationships, "author")
            .map(String::from)
            .collect();
        let artist_ids: Vec<String> = related(&response.relationships, "artist")
            .map(String::from)
            .collect();

        let (author, artist) = if author_ids.is_empty() && artist_ids.is_empty() {
            (None, None)
        } else {
            let all: Vec<String> = author_ids.iter().chain(&artist_ids).cloned().collect();
            let names = self.get_authors(&all).await?;
            let join = |ids: &[String]| {
                let joined = ids
                    .iter()
                    .filter_map(|id| names.get(id).cloned())
                    .collect::<Vec<_>>()
                    .join(", ");
                (!joined.is_empty()).then_some(joined)
            };
            (join(&author_ids), join(&artist_ids))
        };

        let image = match related(&response.relationships, "cover_art").next() {
            Some(cover_id) => {
                let covers = self.get_covers(&[cover_id.to_string()]).await?;
                covers
                    .get(cover_id)
                    .map(|file| format!("{}/{}/{}", self.cover_base, uuid, file))
                    .unwrap_or_else(|| PLACEHOLDER_COVER.to_string())
            }
            None => PLACEHOLDER_COVER.to_string(),
        };

        Ok(Manga {
            id: manga_id.to_string(),
            titles,
            image,
            author,
            artist,
            description,
            status: if attributes.status.as_deref() == Some("ongoing") {
                MangaStatus::Ongoing
            } else {
                MangaStatus::Completed
            },
            tags: vec![TagSection::new("tags", "Tags", tags)],
            rating: 5.0,
            ..Default::default()
        })
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let uuid = self.resolve_manga_id(manga_id).await?;

        let mut unresolved = Vec::new();
        let mut group_ids: Vec<String> = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{}/manga/{}/feed?limit={}&offset={}",
                self.api_base, uuid, FEED_LIMIT, offset
            );
            let body = self.client.get_text(&url).await?;
            let feed = ChapterFeed::parse(&body).map_err(|_| {
                crate::Error::source(self.id(), format!("Failed to parse json results for {}", uuid))
            })?;
            offset += FEED_LIMIT;

            for (chapter, groups) in feed.chapters(manga_id) {
                for group in &groups {
                    if !group_ids.contains(group) {
                        group_ids.push(group.clone());
                    }
                }
                unresolved.push((chapter, groups));
            }

            if feed.total <= offset {
                break;
            }
        }

        let names = self.get_groups(&group_ids).await?;
        Ok(unresolved
            .into_iter()
            .map(|(mut chapter, groups)| {
                let joined = groups
                    .iter()
                    .filter_map(|id| names.get(id).cloned())
                    .collect::<Vec<_>>()
                    .join(", ");
                chapter.group = (!joined.is_empty()).then_some(joined);
                chapter
            })
            .collect())
    }

    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails> {
        if is_legacy_id(chapter_id) {
            return Err(crate::Error::source(
                self.id(),
                "OLD ID: PLEASE REFRESH AND CLEAR ORPHANED CHAPTERS",
            ));
        }

        let server_url = self.get_mdh_node_url(chapter_id).await?;
        let response: Entity<ChapterAttributes> = self
            .client
            .get_json(&format!("{}/chapter/{}", self.api_base, chapter_id))
            .await?;
        let attributes = response.data.attributes;

        Ok(ChapterDetails {
            id: chapter_id.to_string(),
            manga_id: manga_id.to_string(),
            pages: attributes
                .data
                .iter()
                .map(|file| format!("{}/data/{}/{}", server_url, attributes.hash, file))
                .collect(),
            long_strip: false,
        })
    }

    async fn search_request(
        &self,
        query: &SearchRequest,
        metadata: Option<Metadata>,
    ) -> Result<PagedResults> {
        let offset = metadata.and_then(|m| m.offset).unwrap_or(0);
        let url = format!(
            "{}/manga?title={}&limit={}&offset={}",
            self.api_base,
            urlencoding::encode(query.title_or_empty()),
            PAGE_LIMIT,
            offset
        );

        let response = self.client.schedule(Request::get(url)).await?;
        if response.status != 200 {
            debug!(status = response.status, "search returned no content");
            return Ok(PagedResults::last(Vec::new()));
        }

        let page = MangaPage::parse(&response.text()?).map_err(|_| {
            crate::Error::source(self.id(), "Failed to parse json for the given search")
        })?;
        let covers = self.get_covers(&page.cover_ids()).await?;
        let results = page.tiles(&covers, &self.cover_base, &mut Vec::new());

        Ok(PagedResults::new(results, page.next_offset(offset)))
    }

    async fn get_home_page_sections(&self, on_section: SectionCallback<'_>) -> Result<()> {
        let sections = [
            HomeSection::new("recently_updated", "RECENTLY UPDATED TITLES", true),
            HomeSection::new("shounen", "UPDATED SHOUNEN TITLES", true),
            HomeSection::new("action", "UPDATED ACTION TITLES", true),
        ];

        for section in &sections {
            on_section(section.clone());
        }

        let loads = sections.into_iter().map(|mut section| async move {
            let url = self
                .section_url(&section.id, 20, 0)
                .ok_or_else(|| crate::Error::not_found(format!("Home section: {}", section.id)))?;
            let (items, _) = self.manga_list(&url, &mut Vec::new()).await.map_err(|e| {
                crate::Error::source(
                    "mangadex",
                    format!("Failed to parse json results for section {}: {}", section.title, e),
                )
            })?;
            section.items = items;
            on_section(section);
            Ok::<_, crate::Error>(())
        });

        future::try_join_all(loads).await?;
        Ok(())
    }

    async fn get_view_more_items(
        &self,
        section_id: &str,
        metadata: Option<Metadata>,
    ) -> Result<Option<PagedResults>> {
        let metadata = metadata.unwrap_or_default();
        let offset = metadata.offset.unwrap_or(0);
        let mut collected_ids = metadata.collected_ids;

        let url = self
            .section_url(section_id, PAGE_LIMIT, offset)
            .ok_or_else(|| crate::Error::not_found(format!("Home section: {}", section_id)))?;
        let (results, _) = self.manga_list(&url, &mut collected_ids).await?;

        Ok(Some(PagedResults::new(
            results,
            Some(Metadata {
                offset: Some(offset + PAGE_LIMIT),
                collected_ids,
                ..Default::default()
            }),
        )))
    }

    async fn filter_updated_manga(
        &self,
        on_updates: UpdateCallback<'_>,
        since: DateTime<Utc>,
        ids: &[String],
    ) -> Result<()> {
        let legacy_ids: Vec<String> = ids.iter().filter(|id| is_legacy_id(id)).cloned().collect();

        // uuid -> legacy id, for ids the caller still stores in legacy form
        let mut conversion: HashMap<String, String> = HashMap::new();
        if !legacy_ids.is_empty() {
            for (legacy, uuid) in self.get_manga_uuids(&legacy_ids).await? {
                conversion.insert(uuid, legacy);
            }
        }

        let updated_at = updated_at_since(since);
        let mut updated = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{}/manga?limit={}&offset={}&updatedAtSince={}",
                self.api_base, PAGE_LIMIT, offset, updated_at
            );
            let response = self.client.schedule(Request::get(url)).await?;

            let scan = match response
                .text()
                .and_then(|body| scan_updates(response.status, &body, since, ids, &conversion))
            {
                Ok(scan) => scan,
                Err(e) => {
                    warn!(
                        updated_at = %updated_at,
                        offset,
                        error = %e,
                        "failed to parse updated manga"
                    );
                    return Ok(());
                }
            };

            updated.extend(scan.ids);
            if !scan.load_more {
                break;
            }
            offset += PAGE_LIMIT;
        }

        if !updated.is_empty() {
            on_updates(MangaUpdates { ids: updated });
        }
        Ok(())
    }

    fn get_manga_share_url(&self, manga_id: &str) -> Option<String> {
        Some(format!("{}/manga/{}", MANGADEX_DOMAIN, manga_id))
    }
}
