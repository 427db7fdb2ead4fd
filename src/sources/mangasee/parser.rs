//! Parsers for Mangasee pages.
//!
//! Mangasee renders most of its data client-side from JSON assigned to
//! `vm.*` script variables, so the parsers here pull those assignments out of
//! the page and deserialize them. Only the title page's info box is HTML.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use scraper::{Html, Selector};

use crate::{
    error::{Error, Result},
    net::html,
    types::{
        Chapter, ChapterDetails, HomeSection, IconText, LanguageCode, Manga, MangaStatus,
        MangaTile, SearchRequest, Tag, TagSection,
    },
};

pub const COVER_URL: &str = "https://cover.nep.li/cover";

/// Cover image of a series.
pub fn cover_url(index_name: &str) -> String {
    format!("{}/{}.jpg", COVER_URL, index_name)
}

/// Raw JSON text assigned to `vm.{name}` in the page's scripts.
///
/// ```rust
/// use shiori::sources::mangasee::parser::script_variable;
///
/// let page = "<script>\n  vm.IndexName = \"Onepunch-Man\";\n  vm.CurPathName = \"s1.example.com\";\n</script>";
/// assert_eq!(script_variable(page, "IndexName"), Some("\"Onepunch-Man\""));
/// assert_eq!(script_variable(page, "Chapters"), None);
/// ```
pub fn script_variable<'a>(page: &'a str, name: &str) -> Option<&'a str> {
    page.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("vm.")?.strip_prefix(name)?;
        let value = rest.trim_start().strip_prefix('=')?;
        Some(value.trim().trim_end_matches(';').trim_end())
    })
}

/// Deserializes the `vm.{name}` assignment.
pub fn script_json<T: DeserializeOwned>(page: &str, name: &str) -> Result<T> {
    let raw = script_variable(page, name)
        .ok_or_else(|| Error::source("mangasee", format!("Missing vm.{} on page", name)))?;
    serde_json::from_str(raw).map_err(Into::into)
}

/// A decoded six-digit chapter code such as `100015`.
///
/// The first digit is the index (season or edition), the next four the
/// chapter number and the last the decimal part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChapterCode {
    pub index: u32,
    pub number: f64,
}

impl ChapterCode {
    /// ```rust
    /// use shiori::sources::mangasee::parser::ChapterCode;
    ///
    /// let code = ChapterCode::parse("100015").unwrap();
    /// assert_eq!(code.index, 1);
    /// assert_eq!(code.number, 1.5);
    /// assert_eq!(code.display(), "1.5");
    /// assert_eq!(ChapterCode::parse("200020").unwrap().index, 2);
    /// assert!(ChapterCode::parse("12").is_none());
    /// ```
    pub fn parse(code: &str) -> Option<Self> {
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index = code[..1].parse().ok()?;
        let whole: u32 = code[1..5].parse().ok()?;
        let decimal: u32 = code[5..].parse().ok()?;
        Some(Self {
            index,
            number: whole as f64 + decimal as f64 / 10.0,
        })
    }

    /// Chapter number as the site writes it in URLs, e.g. `1` or `1.5`.
    pub fn display(&self) -> String {
        if self.number.fract() == 0.0 {
            format!("{}", self.number as u32)
        } else {
            format!("{:.1}", self.number)
        }
    }

    /// Zero-padded chapter part of an image file name, e.g. `0001` or `0001.5`.
    pub fn padded(&self) -> String {
        let whole = self.number.trunc() as u32;
        let decimal = ((self.number.fract() * 10.0).round()) as u32;
        if decimal == 0 {
            format!("{:04}", whole)
        } else {
            format!("{:04}.{}", whole, decimal)
        }
    }

    /// Chapter id for `index_name`, e.g. `Onepunch-Man-chapter-1.5` or
    /// `Onepunch-Man-chapter-3-index-2` for non-default indexes.
    pub fn chapter_id(&self, index_name: &str) -> String {
        let suffix = if self.index > 1 {
            format!("-index-{}", self.index)
        } else {
            String::new()
        };
        format!("{}-chapter-{}{}", index_name, self.display(), suffix)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterEntry {
    #[serde(rename = "Chapter")]
    pub chapter: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "ChapterName", default)]
    pub chapter_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentChapter {
    #[serde(rename = "Chapter")]
    pub chapter: String,
    #[serde(rename = "Page")]
    pub page: String,
    #[serde(rename = "Directory", default)]
    pub directory: String,
}

/// Entry of the search page's `vm.Directory`.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    #[serde(rename = "i")]
    pub id: String,
    #[serde(rename = "s")]
    pub title: String,
    #[serde(rename = "a", default)]
    pub authors: Vec<String>,
    #[serde(rename = "al", default)]
    pub alternate_names: Vec<String>,
    #[serde(rename = "g", default)]
    pub genres: Vec<String>,
    #[serde(rename = "ss", default)]
    pub scan_status: String,
}

/// Entry of the home page's latest/hot/new/top lists.
#[derive(Debug, Clone, Deserialize)]
pub struct HomeEntry {
    #[serde(rename = "IndexName")]
    pub index_name: String,
    #[serde(rename = "SeriesName")]
    pub series_name: String,
    #[serde(rename = "Chapter", default)]
    pub chapter: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AvailableFilters {
    #[serde(rename = "Genre", default)]
    genre: Vec<String>,
}

/// Parses the dates Mangasee embeds, either RFC 3339 or `YYYY-MM-DD HH:MM:SS`.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|t| Utc.from_utc_datetime(&t))
        })
}

pub fn parse_manga_details(document: &Html, manga_id: &str) -> Manga {
    let mut titles = vec![html::select_text(document, "h1").unwrap_or_default()];
    let mut author = None;
    let mut genres = Vec::new();
    let mut status = MangaStatus::Ongoing;
    let mut description = None;

    let rows = Selector::parse("ul.list-group li.list-group-item")
        .map(|sel| document.select(&sel).collect::<Vec<_>>())
        .unwrap_or_default();

    for row in rows {
        let label = html::element_text(&row, "span.mlabel").unwrap_or_default();
        let links: Vec<String> = Selector::parse("a")
            .map(|sel| row.select(&sel).map(|a| html::own_text(&a)).collect())
            .unwrap_or_default();
        let text = html::own_text(&row);
        let value = text.strip_prefix(label.as_str()).unwrap_or(&text).trim().to_string();

        match label.trim_end_matches(':') {
            "Author(s)" => author = Some(links.join(", ")).filter(|a| !a.is_empty()),
            "Genre(s)" => {
                genres = links.into_iter().map(|g| Tag::new(g.clone(), g)).collect();
            }
            "Status" => {
                if let Some(first) = links.first() {
                    status = if first.to_lowercase().contains("ongoing") {
                        MangaStatus::Ongoing
                    } else {
                        MangaStatus::Completed
                    };
                }
            }
            "Description" => {
                description = html::element_text(&row, "div.top-5").or(Some(value)).filter(|d| !d.is_empty());
            }
            "Alternate Name(s)" => {
                titles.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(String::from),
                );
            }
            _ => {}
        }
    }

    let hentai = genres.iter().any(|g| g.label == "Hentai");

    Manga {
        id: manga_id.to_string(),
        titles,
        image: cover_url(manga_id),
        author,
        description,
        status,
        tags: vec![TagSection::new("genres", "Genres", genres)],
        hentai,
        ..Default::default()
    }
}

/// Parses `vm.Chapters` from a title page.
pub fn parse_chapters(page: &str, manga_id: &str) -> Result<Vec<Chapter>> {
    let entries: Vec<ChapterEntry> = script_json(page, "Chapters")?;

    entries
        .into_iter()
        .map(|entry| {
            let code = ChapterCode::parse(&entry.chapter).ok_or_else(|| {
                Error::source("mangasee", format!("Invalid chapter code {}", entry.chapter))
            })?;
            let name = entry
                .chapter_name
                .filter(|n| !n.is_empty())
                .or_else(|| (!entry.kind.is_empty()).then(|| format!("{} {}", entry.kind, code.display())));

            Ok(Chapter {
                id: code.chapter_id(manga_id),
                manga_id: manga_id.to_string(),
                chap_num: code.number,
                volume: (code.index > 1).then_some(code.index as f64),
                lang_code: LanguageCode::English,
                name,
                time: entry.date.as_deref().and_then(parse_date),
                group: None,
            })
        })
        .collect()
}

/// Builds image URLs from a reader page's `vm.CurChapter`, `vm.CurPathName`
/// and `vm.IndexName`.
pub fn parse_chapter_details(page: &str, manga_id: &str, chapter_id: &str) -> Result<ChapterDetails> {
    let current: CurrentChapter = script_json(page, "CurChapter")?;
    let path_name: String = script_json(page, "CurPathName")?;
    let index_name: String = script_json(page, "IndexName")?;

    let code = ChapterCode::parse(&current.chapter).ok_or_else(|| {
        Error::source("mangasee", format!("Invalid chapter code {}", current.chapter))
    })?;
    let page_count: u32 = current
        .page
        .parse()
        .map_err(|_| Error::source("mangasee", format!("Invalid page count {}", current.page)))?;
    let directory = if current.directory.is_empty() {
        String::new()
    } else {
        format!("{}/", current.directory)
    };

    let pages = (1..=page_count)
        .map(|page| {
            format!(
                "https://{}/manga/{}/{}{}-{:03}.png",
                path_name,
                index_name,
                directory,
                code.padded(),
                page
            )
        })
        .collect();

    Ok(ChapterDetails {
        id: chapter_id.to_string(),
        manga_id: manga_id.to_string(),
        pages,
        long_strip: false,
    })
}

fn matches_query(entry: &DirectoryEntry, query: &SearchRequest) -> bool {
    let contains = |haystack: &str, needle: &str| haystack.to_lowercase().contains(&needle.to_lowercase());

    let title_ok = match query.title.as_deref().filter(|t| !t.is_empty()) {
        Some(title) => {
            contains(&entry.title, title)
                || entry.alternate_names.iter().any(|alt| contains(alt, title))
        }
        None => true,
    };
    let author_ok = match query.author.as_deref().filter(|a| !a.is_empty()) {
        Some(author) => entry.authors.iter().any(|a| contains(a, author)),
        None => true,
    };
    let has_genre = |genre: &String| entry.genres.iter().any(|g| g.eq_ignore_ascii_case(genre));
    let genres_ok = query.include_genre.iter().all(has_genre)
        && !query.exclude_genre.iter().any(has_genre);
    let status_ok = match query.status {
        Some(MangaStatus::Ongoing) => entry.scan_status == "Ongoing",
        Some(MangaStatus::Completed) => entry.scan_status == "Complete",
        None => true,
    };

    title_ok && author_ok && genres_ok && status_ok
}

/// Filters the search page's `vm.Directory` by `query`.
pub fn parse_search(page: &str, query: &SearchRequest) -> Result<Vec<MangaTile>> {
    let directory: Vec<DirectoryEntry> = script_json(page, "Directory")?;

    Ok(directory
        .into_iter()
        .filter(|entry| matches_query(entry, query))
        .map(|entry| MangaTile {
            image: cover_url(&entry.id),
            subtitle_text: (!entry.authors.is_empty()).then(|| IconText::new(entry.authors.join(", "))),
            title: IconText::new(entry.title),
            id: entry.id,
            ..Default::default()
        })
        .collect())
}

pub fn parse_tags(page: &str) -> Result<Vec<TagSection>> {
    let filters: AvailableFilters = script_json(page, "AvailableFilters")?;
    let tags = filters
        .genre
        .into_iter()
        .map(|genre| Tag::new(genre.clone(), genre))
        .collect();
    Ok(vec![TagSection::new("genres", "Genres", tags)])
}

/// Home page sections: `(id, title, script variable)`.
const HOME_SECTIONS: [(&str, &str, &str); 3] = [
    ("hot_update", "Hot Updates", "HotUpdateJSON"),
    ("latest", "Latest Updates", "LatestJSON"),
    ("new_titles", "New Titles", "NewSeriesJSON"),
];

fn home_tile(entry: HomeEntry) -> MangaTile {
    let subtitle = entry
        .chapter
        .as_deref()
        .and_then(ChapterCode::parse)
        .map(|code| IconText::new(format!("Chapter {}", code.display())));

    MangaTile {
        image: cover_url(&entry.index_name),
        title: IconText::new(entry.series_name),
        id: entry.index_name,
        subtitle_text: subtitle,
        ..Default::default()
    }
}

pub fn home_section_skeletons() -> Vec<HomeSection> {
    HOME_SECTIONS
        .iter()
        .map(|(id, title, _)| HomeSection::new(*id, *title, true))
        .collect()
}

pub fn parse_home_sections(page: &str) -> Result<Vec<HomeSection>> {
    HOME_SECTIONS
        .iter()
        .map(|(id, title, variable)| {
            let entries: Vec<HomeEntry> = script_json(page, variable)?;
            Ok(HomeSection {
                items: entries.into_iter().map(home_tile).collect(),
                ..HomeSection::new(*id, *title, true)
            })
        })
        .collect()
}

/// Items of one home section, or `None` for an unknown section id.
pub fn parse_view_more(page: &str, section_id: &str) -> Result<Option<Vec<MangaTile>>> {
    let Some((_, _, variable)) = HOME_SECTIONS.iter().find(|(id, _, _)| *id == section_id) else {
        return Ok(None);
    };
    let entries: Vec<HomeEntry> = script_json(page, variable)?;
    Ok(Some(entries.into_iter().map(home_tile).collect()))
}

/// Ids from `ids` whose latest entry on the home page is newer than `since`.
pub fn parse_updated_manga(page: &str, since: DateTime<Utc>, ids: &[String]) -> Result<Vec<String>> {
    let latest: Vec<HomeEntry> = script_json(page, "LatestJSON")?;
    let mut found = Vec::new();

    for entry in latest {
        let newer = entry
            .date
            .as_deref()
            .and_then(parse_date)
            .is_some_and(|date| date > since);
        if newer && ids.contains(&entry.index_name) && !found.contains(&entry.index_name) {
            found.push(entry.index_name);
        }
    }

    Ok(found)
}
