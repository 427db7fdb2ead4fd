//! Page parsers for Manganelo.
//!
//! Every function here is pure: it takes an already parsed document and
//! returns records, so the adapter only handles requests.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{
    net::html,
    types::{
        Chapter, ChapterDetails, HomeSection, IconText, LanguageCode, Manga, MangaStatus,
        MangaTile, SearchRequest, Tag, TagSection, UpdatedManga,
    },
    util,
};

static CHAPTER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Chapter ([0-9]\d*(\.\d+)?)").expect("valid regex"));

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").expect("valid regex"));

static MERIDIEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"-*(AM|PM)").expect("valid regex"));

fn select<'a>(root: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    Selector::parse(selector)
        .map(|sel| root.select(&sel).collect())
        .unwrap_or_default()
}

fn select_in<'a>(element: &ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    Selector::parse(selector)
        .map(|sel| element.select(&sel).collect())
        .unwrap_or_default()
}

fn id_from_href(href: Option<String>) -> String {
    href.as_deref()
        .and_then(util::last_path_segment)
        .unwrap_or_default()
        .to_string()
}

/// Parses the timestamps Manganelo prints, e.g. `Jun 20,2021 10:36`,
/// `Jun 20,21` or `Jun-20-2021 10:36:12 AM`.
pub fn parse_site_time(text: &str) -> Option<DateTime<Utc>> {
    let cleaned = MERIDIEM.replace_all(text.trim(), "").trim().to_string();

    for format in [
        "%b %d,%Y %H:%M",
        "%b %d,%Y - %H:%M",
        "%b-%d-%Y %H:%M:%S",
        "%b %d,%Y %H:%M:%S",
    ] {
        if let Ok(time) = NaiveDateTime::parse_from_str(&cleaned, format) {
            return Some(Utc.from_utc_datetime(&time));
        }
    }

    for format in ["%b %d,%y", "%b %d,%Y", "%b-%d-%Y"] {
        if let Ok(day) = NaiveDate::parse_from_str(&cleaned, format) {
            return Some(Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)));
        }
    }

    None
}

/// Future timestamps mean "within the last hour" on this site.
fn clamp_to_past(time: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if time > now {
        now - Duration::seconds(60)
    } else {
        time
    }
}

pub fn parse_manga_details(document: &Html, manga_id: &str) -> Manga {
    let title = html::select_attr(document, ".panel-story-info .img-loading", "title")
        .unwrap_or_default();
    let image = html::select_attr(document, ".panel-story-info .img-loading", "src")
        .unwrap_or_default();

    let mut titles = vec![title];
    let mut author = None;
    let mut artist = None;
    let mut status = MangaStatus::Ongoing;
    let mut genres = Vec::new();

    for row in select(document, ".panel-story-info .variations-tableInfo tr") {
        if html::element_text(&row, ".info-alternative").is_some() {
            let alternatives = html::element_text(&row, "h2").unwrap_or_default();
            titles.extend(
                alternatives
                    .split([',', ';'])
                    .map(str::trim)
                    .filter(|alt| !alt.is_empty())
                    .map(String::from),
            );
        } else if html::element_text(&row, ".info-author").is_some() {
            let names: Vec<String> = select_in(&row, ".table-value a")
                .iter()
                .map(html::own_text)
                .collect();
            author = names.first().cloned();
            artist = names.get(1).cloned();
        } else if html::element_text(&row, ".info-status").is_some() {
            status = match html::element_text(&row, ".table-value").as_deref() {
                Some("Ongoing") => MangaStatus::Ongoing,
                _ => MangaStatus::Completed,
            };
        } else if html::element_text(&row, ".info-genres").is_some() {
            for link in select_in(&row, ".table-value a") {
                let id = link
                    .value()
                    .attr("href")
                    .and_then(util::last_path_segment)
                    .and_then(|segment| segment.rsplit('-').next())
                    .unwrap_or_default();
                genres.push(Tag::new(id, html::own_text(&link)));
            }
        }
    }

    let mut last_update = None;
    let mut views = None;
    for row in select(document, ".panel-story-info .story-info-right-extent p") {
        let value = html::element_text(&row, ".stre-value").unwrap_or_default();
        if html::element_text(&row, ".info-time").is_some() {
            last_update = parse_site_time(&value).map(|t| t.format("%a %b %d %Y").to_string());
        } else if html::element_text(&row, ".info-view").is_some() {
            views = value.replace(',', "").parse::<u64>().ok();
        }
    }

    let rating = html::select_text(document, r#".story-info-right-extent [property="v:average"]"#)
        .and_then(|r| r.parse::<f64>().ok())
        .unwrap_or(0.0);
    let follows = html::select_text(document, r#".story-info-right-extent [property="v:votes"]"#)
        .and_then(|f| f.parse::<u64>().ok());
    let description = html::select_text(document, ".panel-story-info-description");

    Manga {
        id: manga_id.to_string(),
        titles,
        image,
        author,
        artist,
        description,
        status,
        tags: vec![TagSection::new("0", "genres", genres)],
        rating,
        views,
        follows,
        last_update,
        hentai: false,
    }
}

pub fn parse_chapters(document: &Html, manga_id: &str) -> Vec<Chapter> {
    select(document, ".body-site .row-content-chapter li")
        .into_iter()
        .map(|item| {
            let name = html::element_text(&item, "a").unwrap_or_default();
            let chap_num = CHAPTER_NUMBER
                .captures(&name)
                .and_then(|caps| caps[1].parse::<f64>().ok())
                .unwrap_or(0.0);

            Chapter {
                id: id_from_href(html::element_attr(&item, "a", "href")),
                manga_id: manga_id.to_string(),
                chap_num,
                lang_code: LanguageCode::English,
                time: html::element_attr(&item, ".chapter-time", "title")
                    .and_then(|t| parse_site_time(&t)),
                name: Some(name),
                ..Default::default()
            }
        })
        .collect()
}

pub fn parse_chapter_details(document: &Html, manga_id: &str, chapter_id: &str) -> ChapterDetails {
    ChapterDetails {
        id: chapter_id.to_string(),
        manga_id: manga_id.to_string(),
        pages: html::select_all_attr(document, ".container-chapter-reader img", "src"),
        long_strip: false,
    }
}

/// Collects the ids in `ids` updated after `since`, stopping at the first
/// entry that is not newer.
pub fn parse_updated_manga(
    document: &Html,
    since: DateTime<Utc>,
    ids: &[String],
    now: DateTime<Utc>,
) -> UpdatedManga {
    let mut found = Vec::new();

    for item in select(document, ".panel-content-genres .content-genres-item") {
        let id = id_from_href(html::element_attr(&item, "a", "href"));
        let time = html::element_text(&item, ".genres-item-time")
            .and_then(|t| parse_site_time(&t))
            .map(|t| clamp_to_past(t, now))
            .unwrap_or(now);

        if time <= since {
            return UpdatedManga {
                ids: found,
                load_more: false,
            };
        }
        if ids.contains(&id) {
            found.push(id);
        }
    }

    UpdatedManga {
        ids: found,
        load_more: true,
    }
}

/// The three front page sections, empty.
pub fn home_section_skeletons() -> Vec<HomeSection> {
    vec![
        HomeSection::new("top_week", "TOP OF THE WEEK", false),
        HomeSection::new("latest_updates", "LATEST UPDATES", true),
        HomeSection::new("new_manga", "NEW MANGA", true),
    ]
}

/// Fills [`home_section_skeletons`] from the front page.
pub fn parse_home_sections(document: &Html) -> Vec<HomeSection> {
    let mut sections = home_section_skeletons();

    sections[0].items = select(document, ".owl-carousel .item")
        .into_iter()
        .map(|item| MangaTile {
            id: id_from_href(html::element_attr(&item, "a", "href")),
            image: html::element_attr(&item, "img", "src").unwrap_or_default(),
            title: IconText::new(html::element_text(&item, "a").unwrap_or_default()),
            subtitle_text: Some(IconText::new(
                html::element_text(&item, "[rel=nofollow]").unwrap_or_default(),
            )),
            ..Default::default()
        })
        .collect();

    sections[1].items = select(document, ".panel-content-homepage .content-homepage-item")
        .into_iter()
        .map(|item| {
            let right = select_in(&item, ".content-homepage-item-right");
            let right_text = |selector: &str| {
                right
                    .first()
                    .and_then(|r| html::element_text(r, selector))
                    .unwrap_or_default()
            };

            MangaTile {
                id: id_from_href(html::element_attr(&item, "a", "href")),
                image: html::element_attr(&item, "img", "src").unwrap_or_default(),
                title: IconText::new(right_text("a")),
                subtitle_text: Some(IconText::new(right_text(".item-author"))),
                primary_text: Some(IconText::with_icon(
                    html::element_text(&item, ".genres-item-rate").unwrap_or_default(),
                    "star.fill",
                )),
                secondary_text: Some(IconText::with_icon(
                    right_text(".item-chapter i"),
                    "clock.fill",
                )),
            }
        })
        .collect();

    sections[2].items = select(document, ".panel-newest-content a")
        .into_iter()
        .map(|item| MangaTile {
            id: id_from_href(item.value().attr("href").map(String::from)),
            image: html::element_attr(&item, "img", "src").unwrap_or_default(),
            title: IconText::new(html::element_attr(&item, "img", "alt").unwrap_or_default()),
            ..Default::default()
        })
        .collect();

    sections
}

/// Builds the advanced search query string.
///
/// ```rust
/// use shiori::sources::manganelo::parser::generate_search;
/// use shiori::types::{MangaStatus, SearchRequest};
///
/// let query = SearchRequest {
///     title: Some("solo leveling".into()),
///     include_genre: vec!["2".into(), "4".into()],
///     status: Some(MangaStatus::Completed),
///     ..Default::default()
/// };
/// assert_eq!(generate_search(&query), "s=all&keyw=solo_leveling&g_i=2_4&g_e=&sts=completed");
/// ```
pub fn generate_search(query: &SearchRequest) -> String {
    let genres = query
        .include_genre
        .iter()
        .chain(&query.include_demographic)
        .cloned()
        .collect::<Vec<_>>()
        .join("_");
    let excluded = query
        .exclude_genre
        .iter()
        .chain(&query.exclude_demographic)
        .cloned()
        .collect::<Vec<_>>()
        .join("_");

    let mut keyword = query.title_or_empty().replace(' ', "_");
    if let Some(author) = &query.author {
        keyword.push_str(&author.replace(' ', "_"));
    }

    let mut search = format!(
        "s=all&keyw={}&g_i={}&g_e={}",
        urlencoding::encode(&keyword),
        genres,
        excluded
    );
    match query.status {
        Some(MangaStatus::Completed) => search.push_str("&sts=completed"),
        Some(MangaStatus::Ongoing) => search.push_str("&sts=ongoing"),
        None => {}
    }
    search
}

pub fn parse_search(document: &Html) -> Vec<MangaTile> {
    select(document, ".panel-content-genres .content-genres-item")
        .into_iter()
        .map(|item| MangaTile {
            id: id_from_href(html::element_attr(&item, ".genres-item-name", "href")),
            image: html::element_attr(&item, ".img-loading", "src").unwrap_or_default(),
            title: IconText::new(html::element_text(&item, ".genres-item-name").unwrap_or_default()),
            subtitle_text: Some(IconText::new(
                html::element_text(&item, ".genres-item-chap").unwrap_or_default(),
            )),
            primary_text: Some(IconText::with_icon(
                html::element_text(&item, ".genres-item-rate").unwrap_or_default(),
                "star.fill",
            )),
            secondary_text: Some(IconText::with_icon(
                html::element_text(&item, ".genres-item-time").unwrap_or_default(),
                "clock.fill",
            )),
        })
        .collect()
}

pub fn parse_tags(document: &Html) -> Vec<TagSection> {
    let tags = select(document, ".advanced-search-tool-genres-list span")
        .into_iter()
        .map(|item| {
            Tag::new(
                item.value().attr("data-i").unwrap_or_default(),
                html::own_text(&item),
            )
        })
        .collect();

    vec![TagSection::new("genre", "Genre", tags)]
}

pub fn parse_view_more(document: &Html, now: DateTime<Utc>) -> Vec<MangaTile> {
    select(document, ".panel-content-genres .content-genres-item")
        .into_iter()
        .map(|item| {
            let time = html::element_text(&item, ".genres-item-time")
                .and_then(|t| parse_site_time(&t))
                .map(|t| clamp_to_past(t, now))
                .unwrap_or(now);

            MangaTile {
                id: id_from_href(html::element_attr(&item, "a", "href")),
                image: html::element_attr(&item, "img", "src").unwrap_or_default(),
                title: IconText::new(
                    html::element_text(&item, ".genres-item-name").unwrap_or_default(),
                ),
                subtitle_text: Some(IconText::new(
                    html::element_text(&item, ".genres-item-chap").unwrap_or_default(),
                )),
                primary_text: Some(IconText::with_icon(
                    html::element_text(&item, ".genres-item-rate").unwrap_or_default(),
                    "star.fill",
                )),
                secondary_text: Some(IconText::with_icon(
                    time.format("%a %b %d %Y").to_string(),
                    "clock.fill",
                )),
            }
        })
        .collect()
}

/// True when the pager shows the last page as current, or there is no pager.
pub fn is_last_page(document: &Html) -> bool {
    let current = html::select_text(document, ".page-select").unwrap_or_default();
    if current.is_empty() {
        return true;
    }

    let total = html::select_text(document, ".page-last").unwrap_or_default();
    let total = FIRST_NUMBER
        .captures(&total)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    match (total.parse::<u32>(), current.parse::<u32>()) {
        (Ok(total), Ok(current)) => total == current,
        _ => false,
    }
}
