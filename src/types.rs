//! Record types shared by every source adapter.
//!
//! This module defines the value objects adapters produce:
//!
//! - [`Manga`] - Full metadata for one title
//! - [`Chapter`] - One entry in a title's chapter list
//! - [`ChapterDetails`] - Ordered page image URLs for one chapter
//! - [`MangaTile`] - Lightweight listing entry used by search and home sections
//! - [`HomeSection`] - A named row of tiles on a source's front page
//! - [`PagedResults`] - One page of tiles plus the [`Metadata`] cursor for the next
//! - [`SearchRequest`] - Parameters for searching a source
//! - [`SourceInfo`] - Static description of a source
//!
//! # Examples
//!
//! ```rust
//! use shiori::types::*;
//!
//! let tile = MangaTile::new("one-piece", "One Piece", "https://example.com/cover.jpg");
//! let page = PagedResults::new(vec![tile], Some(Metadata::page(2)));
//! assert!(page.has_more());
//! ```

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Publication status of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MangaStatus {
    #[default]
    Ongoing,
    Completed,
}

/// A single tag such as a genre or theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub label: String,
}

impl Tag {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A labelled group of tags, e.g. "Genres" or "Tags".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSection {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl TagSection {
    pub fn new(id: impl Into<String>, label: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            tags,
        }
    }
}

/// Represents a title with all its metadata.
///
/// # Fields
///
/// * `id` - Identifier within the source (used for fetching chapters)
/// * `titles` - Main title first, followed by alternative titles
/// * `image` - Cover image URL
/// * `status` - Whether the title is still running
/// * `tags` - Tag sections (genres, themes)
/// * `rating` - Source rating, `0.0` when the source has none
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manga {
    /// Identifier within the source
    pub id: String,

    /// Main title followed by alternative titles
    #[serde(default)]
    pub titles: Vec<String>,

    /// Cover image URL
    pub image: String,

    pub author: Option<String>,

    pub artist: Option<String>,

    /// Description/summary
    pub description: Option<String>,

    pub status: MangaStatus,

    #[serde(default)]
    pub tags: Vec<TagSection>,

    pub rating: f64,

    pub views: Option<u64>,

    pub follows: Option<u64>,

    /// Human-readable date of the latest update, as far as the source reports one
    pub last_update: Option<String>,

    pub hentai: bool,
}

impl Manga {
    /// The main title, or an empty string when the source returned none.
    pub fn title(&self) -> &str {
        self.titles.first().map(String::as_str).unwrap_or_default()
    }

    /// All tags across all sections.
    pub fn all_tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().flat_map(|section| section.tags.iter())
    }
}

/// Represents a single chapter in a title's chapter list.
///
/// The chapter number can be decimal to support special chapters like "Chapter 5.5".
///
/// # Examples
///
/// ```rust
/// use shiori::types::{Chapter, LanguageCode};
///
/// let chapter = Chapter {
///     id: "chapter-1".to_string(),
///     manga_id: "one-piece".to_string(),
///     chap_num: 1.0,
///     lang_code: LanguageCode::English,
///     name: Some("Romance Dawn".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(chapter.chap_num, 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Chapter {
    /// Identifier within the source
    pub id: String,

    /// Associated manga ID
    pub manga_id: String,

    /// Chapter number (can be decimal for .5 chapters)
    pub chap_num: f64,

    pub volume: Option<f64>,

    pub lang_code: LanguageCode,

    pub name: Option<String>,

    /// Release time
    pub time: Option<DateTime<Utc>>,

    /// Scanlation group(s), comma separated
    pub group: Option<String>,
}

/// The ordered page images of a chapter.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChapterDetails {
    pub id: String,
    pub manga_id: String,
    /// Page image URLs in reading order
    pub pages: Vec<String>,
    /// Whether the chapter is meant to be read as one continuous strip
    pub long_strip: bool,
}

/// Text with an optional icon name, used for tile captions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IconText {
    pub text: String,
    pub icon: Option<String>,
}

impl IconText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: None,
        }
    }

    pub fn with_icon(text: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: Some(icon.into()),
        }
    }
}

/// Lightweight summary record used in listings and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MangaTile {
    pub id: String,
    pub title: IconText,
    pub image: String,
    pub subtitle_text: Option<IconText>,
    pub primary_text: Option<IconText>,
    pub secondary_text: Option<IconText>,
}

impl MangaTile {
    /// Creates a tile with only id, title and image set.
    pub fn new(id: impl Into<String>, title: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: IconText::new(title),
            image: image.into(),
            ..Default::default()
        }
    }
}

/// A named row of tiles on a source's front page.
///
/// Adapters first hand out empty skeletons so a caller can lay out the page,
/// then hand out the same sections again with `items` filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HomeSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<MangaTile>,
    /// Whether [`Source::get_view_more_items`](crate::Source::get_view_more_items) serves this section
    pub view_more: bool,
}

impl HomeSection {
    pub fn new(id: impl Into<String>, title: impl Into<String>, view_more: bool) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            items: Vec::new(),
            view_more,
        }
    }
}

/// Pagination cursor handed back alongside a page of results.
///
/// Callers treat this as opaque and pass it back verbatim to fetch the next
/// page. Each source uses the subset of fields it needs: a page number, an
/// offset, the ids already returned, or a "nothing more to fetch" marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collected_ids: Vec<String>,
    #[serde(default)]
    pub limit_reached: bool,
}

impl Metadata {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    pub fn offset(offset: u32) -> Self {
        Self {
            offset: Some(offset),
            ..Default::default()
        }
    }
}

/// One page of tiles and the cursor for the next page.
///
/// `metadata == None` means there are no further pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PagedResults {
    pub results: Vec<MangaTile>,
    pub metadata: Option<Metadata>,
}

impl PagedResults {
    pub fn new(results: Vec<MangaTile>, metadata: Option<Metadata>) -> Self {
        Self { results, metadata }
    }

    /// A final page with no cursor.
    pub fn last(results: Vec<MangaTile>) -> Self {
        Self {
            results,
            metadata: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.metadata.is_some()
    }
}

/// Manga ids that changed since a reference time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MangaUpdates {
    pub ids: Vec<String>,
}

/// Result of scanning one page of a site's update listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdatedManga {
    pub ids: Vec<String>,
    /// False once an entry at or before the reference time was seen.
    pub load_more: bool,
}

/// Search parameters for querying a source.
///
/// Built with the generated `SearchRequestBuilder`:
///
/// ```rust
/// use shiori::types::{SearchRequestBuilder, MangaStatus};
///
/// let query = SearchRequestBuilder::default()
///     .title(Some("komi san".to_string()))
///     .status(Some(MangaStatus::Ongoing))
///     .build()
///     .unwrap();
/// assert_eq!(query.title.as_deref(), Some("komi san"));
/// ```
#[derive(Debug, Clone, Default, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct SearchRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub include_genre: Vec<String>,
    pub exclude_genre: Vec<String>,
    pub include_demographic: Vec<String>,
    pub exclude_demographic: Vec<String>,
    pub status: Option<MangaStatus>,
}

impl SearchRequest {
    /// The title query, or an empty string.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

impl From<String> for SearchRequest {
    /// Creates a title-only search.
    fn from(title: String) -> Self {
        SearchRequest {
            title: Some(title),
            ..Default::default()
        }
    }
}

impl From<&str> for SearchRequest {
    /// Creates a title-only search.
    ///
    /// ```rust
    /// use shiori::types::SearchRequest;
    ///
    /// let query: SearchRequest = "naruto".into();
    /// assert_eq!(query.title.as_deref(), Some("naruto"));
    /// assert!(query.author.is_none());
    /// ```
    fn from(title: &str) -> Self {
        SearchRequest {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }
}

/// Color of a badge shown next to a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagType {
    Blue,
    Green,
    Grey,
    Yellow,
    Red,
}

/// A badge such as "Notifications" or "Cloudflare".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTag {
    pub text: &'static str,
    pub kind: TagType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContentRating {
    #[default]
    Everyone,
    Mature,
    Adult,
}

/// Static metadata describing a source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub icon: &'static str,
    pub author: &'static str,
    pub author_website: &'static str,
    pub description: &'static str,
    pub language: LanguageCode,
    pub content_rating: ContentRating,
    pub website_base_url: &'static str,
    pub source_tags: Vec<SourceTag>,
}

/// Chapter language, expressed with the flag codes readers display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LanguageCode {
    #[default]
    #[serde(rename = "_unknown")]
    Unknown,
    #[serde(rename = "bg")]
    Bulgarian,
    #[serde(rename = "cn")]
    Chinese,
    #[serde(rename = "cz")]
    Czech,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "dk")]
    Danish,
    #[serde(rename = "gb")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fi")]
    Finnish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "hk")]
    Cantonese,
    #[serde(rename = "hu")]
    Hungarian,
    #[serde(rename = "id")]
    Indonesian,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "jp")]
    Japanese,
    #[serde(rename = "kr")]
    Korean,
    #[serde(rename = "lt")]
    Lithuanian,
    #[serde(rename = "mn")]
    Mongolian,
    #[serde(rename = "my")]
    Malay,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "no")]
    Norwegian,
    #[serde(rename = "pl")]
    Polish,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ro")]
    Romanian,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "th")]
    Thai,
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "ua")]
    Ukrainian,
    #[serde(rename = "vn")]
    Vietnamese,
}

impl LanguageCode {
    /// The flag code for this language.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::Unknown => "_unknown",
            LanguageCode::Bulgarian => "bg",
            LanguageCode::Chinese => "cn",
            LanguageCode::Czech => "cz",
            LanguageCode::German => "de",
            LanguageCode::Danish => "dk",
            LanguageCode::English => "gb",
            LanguageCode::Spanish => "es",
            LanguageCode::Finnish => "fi",
            LanguageCode::French => "fr",
            LanguageCode::Cantonese => "hk",
            LanguageCode::Hungarian => "hu",
            LanguageCode::Indonesian => "id",
            LanguageCode::Italian => "it",
            LanguageCode::Japanese => "jp",
            LanguageCode::Korean => "kr",
            LanguageCode::Lithuanian => "lt",
            LanguageCode::Mongolian => "mn",
            LanguageCode::Malay => "my",
            LanguageCode::Dutch => "nl",
            LanguageCode::Norwegian => "no",
            LanguageCode::Polish => "pl",
            LanguageCode::Portuguese => "pt",
            LanguageCode::Romanian => "ro",
            LanguageCode::Russian => "ru",
            LanguageCode::Thai => "th",
            LanguageCode::Turkish => "tr",
            LanguageCode::Ukrainian => "ua",
            LanguageCode::Vietnamese => "vn",
        }
    }

    /// Maps a MangaDex `translatedLanguage` value to a flag code.
    ///
    /// Languages without a flag code (Arabic, Catalan, Hebrew, Hindi, ...) map
    /// to [`LanguageCode::Unknown`].
    ///
    /// ```rust
    /// use shiori::types::LanguageCode;
    ///
    /// assert_eq!(LanguageCode::from_mangadex("en"), LanguageCode::English);
    /// assert_eq!(LanguageCode::from_mangadex("es-la"), LanguageCode::Spanish);
    /// assert_eq!(LanguageCode::from_mangadex("ar"), LanguageCode::Unknown);
    /// ```
    pub fn from_mangadex(code: &str) -> Self {
        match code {
            "en" => LanguageCode::English,
            "pt-br" | "pt" => LanguageCode::Portuguese,
            "ru" => LanguageCode::Russian,
            "fr" => LanguageCode::French,
            "es-la" | "es" => LanguageCode::Spanish,
            "pl" => LanguageCode::Polish,
            "tr" => LanguageCode::Turkish,
            "it" => LanguageCode::Italian,
            "id" => LanguageCode::Indonesian,
            "vi" => LanguageCode::Vietnamese,
            "hu" => LanguageCode::Hungarian,
            "zh" => LanguageCode::Chinese,
            "de" => LanguageCode::German,
            "zh-hk" => LanguageCode::Cantonese,
            "th" => LanguageCode::Thai,
            "bg" => LanguageCode::Bulgarian,
            "uk" => LanguageCode::Ukrainian,
            "mn" => LanguageCode::Mongolian,
            "ro" => LanguageCode::Romanian,
            "ms" => LanguageCode::Malay,
            "ja" => LanguageCode::Japanese,
            "ko" => LanguageCode::Korean,
            "cs" => LanguageCode::Czech,
            "nl" => LanguageCode::Dutch,
            "no" => LanguageCode::Norwegian,
            "lt" => LanguageCode::Lithuanian,
            "da" => LanguageCode::Danish,
            "fi" => LanguageCode::Finnish,
            _ => LanguageCode::Unknown,
        }
    }
}
