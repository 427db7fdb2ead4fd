//! Page parsers for MangaOwl.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::{
    net::html,
    types::{Chapter, IconText, LanguageCode, Manga, MangaStatus, MangaTile, Tag, TagSection},
};

static CHAPTER_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Chapter ([\d.]+)").expect("valid regex"));

static API_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)window\[["']api_url["']]\s*=\s*["']([^\s'"]+)["']"#).expect("valid regex")
});

static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

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

/// Text of the element's direct text children.
fn direct_text(element: &ElementRef) -> String {
    element
        .children()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect()
}

/// Text of the element, skipping everything inside descendant `<tag>` elements.
fn text_without(element: &ElementRef, tag: &str) -> String {
    let mut out = String::new();
    for node in element.children() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() != tag => {
                if let Some(child) = ElementRef::wrap(node) {
                    out.push_str(&text_without(&child, tag));
                }
            }
            _ => {}
        }
    }
    out
}

fn squash(text: &str) -> String {
    SPACES.replace_all(text, " ").trim().to_string()
}

/// A `div.comicView` tile. Elements without `data-id` yield `None`.
pub fn parse_manga_tile(element: &ElementRef, time_as_primary: bool) -> Option<MangaTile> {
    let id = element.value().attr("data-id")?;
    let title = element.value().attr("data-title").unwrap_or_default();
    let image = html::element_attr(element, "div[data-background-image]", "data-background-image")
        .unwrap_or_default();

    Some(MangaTile {
        id: id.to_string(),
        title: IconText::new(title),
        image,
        primary_text: time_as_primary.then(|| {
            IconText::new(element.value().attr("data-chapter-time").unwrap_or_default())
        }),
        ..Default::default()
    })
}

/// Tiles inside the `index`-th `div.{class_name}` block.
pub fn parse_tile_section(
    document: &Html,
    class_name: &str,
    index: usize,
    time_as_primary: bool,
) -> Vec<MangaTile> {
    select(document, &format!("div.{}", class_name))
        .get(index)
        .map(|block| {
            select_in(block, "div.comicView")
                .iter()
                .filter_map(|tile| parse_manga_tile(tile, time_as_primary))
                .collect()
        })
        .unwrap_or_default()
}

/// The JSON API root the home page script assigns to `window['api_url']`.
///
/// ```rust
/// use shiori::sources::mangaowl::parser::parse_api_url;
///
/// let page = r#"<script>window['api_url'] = 'https://api.mangaowl.net/v1';</script>"#;
/// assert_eq!(parse_api_url(page).as_deref(), Some("https://api.mangaowl.net/v1"));
/// assert_eq!(parse_api_url("<html></html>"), None);
/// ```
pub fn parse_api_url(page: &str) -> Option<String> {
    API_URL.captures(page).map(|caps| caps[1].to_string())
}

pub fn parse_pages(document: &Html) -> Vec<String> {
    select(document, "img[data-src]")
        .iter()
        .filter(|img| !img.value().classes().any(|class| class == "comic_thumbnail"))
        .filter_map(|img| img.value().attr("data-src"))
        .filter(|src| !src.is_empty())
        .map(String::from)
        .collect()
}

/// Parses the chapter list, oldest first.
///
/// Titles without a "Chapter N" get a synthetic number: 0 for the first,
/// otherwise 0.001 above the previous chapter.
pub fn parse_chapter_list(document: &Html, manga_id: &str) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    let mut last_number: Option<f64> = None;

    for item in select(document, "ul#simpleList li").iter().rev() {
        let Some(link) = html::element_attr(item, "a", "href") else {
            continue;
        };
        let title = html::element_text(item, "label.chapter-title").unwrap_or_default();

        let chap_num = CHAPTER_TITLE
            .captures(&title)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .unwrap_or_else(|| match last_number {
                None => 0.0,
                Some(last) => ((last + 0.001) * 1000.0).round() / 1000.0,
            });
        last_number = Some(chap_num);

        let time = html::element_text(item, "small").and_then(|date| {
            NaiveDate::parse_from_str(date.trim(), "%m/%d/%Y")
                .ok()
                .map(|day| Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN)))
        });

        chapters.push(Chapter {
            id: link,
            manga_id: manga_id.to_string(),
            chap_num,
            lang_code: LanguageCode::English,
            time,
            ..Default::default()
        });
    }

    chapters
}

pub fn parse_manga(document: &Html, manga_id: &str) -> Manga {
    let description = select(document, "div.description div")
        .first()
        .map(|div| squash(&direct_text(div)))
        .filter(|summary| !summary.is_empty());

    let tags: Vec<Tag> = select(document, "div.row.owl-tags a.label-owl-tag")
        .iter()
        .map(|link| {
            let href = link.value().attr("href").unwrap_or_default();
            Tag::new(href.replace("/view_tag/", ""), html::own_text(link))
        })
        .collect();
    let genres: Vec<Tag> = select(document, "div.row.owl-tags p > a.label")
        .iter()
        .map(|link| {
            let href = link.value().attr("href").unwrap_or_default();
            Tag::new(href.replace("/genres/", ""), html::own_text(link))
        })
        .collect();

    let mut tag_sections = vec![TagSection::new("view_tag", "Tags", tags)];
    if !genres.is_empty() {
        tag_sections.insert(0, TagSection::new("genres", "Genres", genres));
    }

    let rating = html::select_text(document, "font.rating_scored")
        .and_then(|r| r.parse::<f64>().ok())
        .unwrap_or(0.0);

    let mut synonyms = None;
    let mut author = None;
    let mut artist = None;
    let mut views = None;
    let mut status = "ongoing".to_string();

    for paragraph in select(document, "p.fexi_header_para") {
        let label = select_in(&paragraph, "span")
            .first()
            .map(|span| squash(&direct_text(span)).to_lowercase())
            .unwrap_or_default();
        let value = squash(&text_without(&paragraph, "span"));

        match label.as_str() {
            "synonyms" => synonyms = Some(value),
            "author" | "authors" | "author(s)" => author = Some(value).filter(|v| !v.is_empty()),
            "artist" | "artists" | "artist(s)" => artist = Some(value).filter(|v| !v.is_empty()),
            "views" => views = value.replace(',', "").parse::<u64>().ok(),
            "status" => status = value.to_lowercase(),
            _ => {}
        }
    }

    let mut titles = vec![html::select_text(document, "h2").unwrap_or_default()];
    if let Some(synonyms) = synonyms.filter(|s| !s.is_empty() && s.to_lowercase() != "none") {
        titles.extend(synonyms.split("; ").map(String::from));
    }

    let last_update = parse_chapter_list(document, manga_id)
        .last()
        .and_then(|chapter| chapter.time)
        .map(|time| time.format("%a %b %d %Y").to_string());

    Manga {
        id: manga_id.to_string(),
        titles,
        image: html::select_attr(document, "div.single_detail img[data-src]", "data-src")
            .unwrap_or_default(),
        author,
        artist,
        description,
        status: if status == "ongoing" {
            MangaStatus::Ongoing
        } else {
            MangaStatus::Completed
        },
        tags: tag_sections,
        rating,
        views,
        last_update,
        ..Default::default()
    }
}

pub fn parse_tags(document: &Html) -> Vec<Tag> {
    select(document, "ul.dropdown-menu.multi-column a")
        .iter()
        .map(|link| {
            let href = link.value().attr("href").unwrap_or_default();
            Tag::new(href.replace("/genres/", ""), html::own_text(link))
        })
        .collect()
}

/// Ids on a "latest" page updated after `since`, in page order.
///
/// Returns `None` when the very first dated tile is already old, meaning
/// later pages cannot contain anything new either.
pub fn parse_times_from_tiles(document: &Html, since: DateTime<Utc>) -> Option<Vec<String>> {
    let mut ids = Vec::new();

    for tile in parse_tile_section(document, "flexslider", 0, true) {
        let Some(time) = tile
            .primary_text
            .as_ref()
            .and_then(|text| NaiveDateTime::parse_from_str(text.text.trim(), "%Y-%m-%d %H:%M").ok())
            .map(|time| Utc.from_utc_datetime(&time))
        else {
            continue;
        };

        if time > since {
            ids.push(tile.id);
        } else if ids.is_empty() {
            return None;
        } else {
            return Some(ids);
        }
    }

    Some(ids)
}
