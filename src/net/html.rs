//! HTML query helpers shared by the scraping adapters.
//!
//! Thin wrappers over `scraper` CSS selectors. Invalid selectors and missing
//! elements both come back as `None`/empty so callers decide what is fatal.
//!
//! # Examples
//!
//! ```rust
//! use shiori::net::html;
//!
//! let document = html::parse(r#"
//!     <div class="post-title"><h1>Solo Leveling</h1></div>
//!     <div class="summary_image"><img data-src="cover.jpg"></div>
//! "#);
//!
//! assert_eq!(html::select_text(&document, "div.post-title h1").as_deref(), Some("Solo Leveling"));
//! assert_eq!(html::select_attr(&document, "div.summary_image img", "data-src").as_deref(), Some("cover.jpg"));
//! ```

use rayon::prelude::*;
use scraper::{ElementRef, Html, Selector};

/// Parses an HTML document from a string.
pub fn parse(html: &str) -> Html {
    Html::parse_document(html)
}

/// Text content of the first element matching `selector`, trimmed.
///
/// ```rust
/// use shiori::net::html;
///
/// let document = html::parse(r#"<h1 class="title">One Piece</h1>"#);
/// assert_eq!(html::select_text(&document, ".title"), Some("One Piece".to_string()));
/// ```
pub fn select_text(html: &Html, selector: &str) -> Option<String> {
    Selector::parse(selector).ok().and_then(|sel| {
        html.select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    })
}

/// Attribute of the first element matching `selector`.
pub fn select_attr(html: &Html, selector: &str, attr: &str) -> Option<String> {
    Selector::parse(selector).ok().and_then(|sel| {
        html.select(&sel)
            .next()
            .and_then(|el| el.value().attr(attr).map(String::from))
    })
}

/// Trimmed text of every element matching `selector`.
///
/// ```rust
/// use shiori::net::html;
///
/// let document = html::parse(r#"
///     <div class="genres-content">
///         <a href="/genre/action">Action</a>
///         <a href="/genre/fantasy">Fantasy</a>
///     </div>
/// "#);
/// assert_eq!(html::select_all_text(&document, "div.genres-content a"), vec!["Action", "Fantasy"]);
/// ```
pub fn select_all_text(html: &Html, selector: &str) -> Vec<String> {
    Selector::parse(selector)
        .ok()
        .map(|sel| {
            html.select(&sel)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Attribute values of every element matching `selector`; elements without
/// the attribute are skipped.
pub fn select_all_attr(html: &Html, selector: &str, attr: &str) -> Vec<String> {
    Selector::parse(selector)
        .ok()
        .map(|sel| {
            html.select(&sel)
                .filter_map(|el| el.value().attr(attr).map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Like [`select_text`], scoped to the descendants of `element`.
pub fn element_text(element: &ElementRef, selector: &str) -> Option<String> {
    Selector::parse(selector).ok().and_then(|sel| {
        element
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    })
}

/// Like [`select_attr`], scoped to the descendants of `element`.
pub fn element_attr(element: &ElementRef, selector: &str, attr: &str) -> Option<String> {
    Selector::parse(selector).ok().and_then(|sel| {
        element
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr(attr).map(String::from))
    })
}

/// Own text of `element`, trimmed.
pub fn own_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parses list items in parallel with rayon.
///
/// Every element matching `selector` is serialised to an HTML fragment so the
/// fragments can be handed to rayon's thread pool, then `parser` runs on the
/// root of each fragment. Items for which `parser` returns `None` are dropped.
/// Document order is preserved.
///
/// ```rust
/// use shiori::net::html;
/// use shiori::types::MangaTile;
///
/// let document = html::parse(r#"
///     <div class="page-item-detail"><div class="post-title"><a href="https://site/manga/a/">A</a></div></div>
///     <div class="page-item-detail"><div class="post-title"><a href="https://site/manga/b/">B</a></div></div>
/// "#);
///
/// let tiles = html::parse_items(&document, "div.page-item-detail", |element| {
///     let title = html::element_text(&element, "div.post-title a")?;
///     Some(MangaTile::new(title.to_lowercase(), title, ""))
/// });
/// assert_eq!(tiles.len(), 2);
/// assert_eq!(tiles[1].id, "b");
/// ```
pub fn parse_items<T, F>(html: &Html, selector: &str, parser: F) -> Vec<T>
where
    T: Send,
    F: Fn(ElementRef) -> Option<T> + Sync,
{
    Selector::parse(selector)
        .ok()
        .map(|sel| {
            let elements: Vec<String> = html.select(&sel).map(|el| el.html()).collect();

            elements
                .into_par_iter()
                .filter_map(|html_str| {
                    let doc = Html::parse_fragment(&html_str);
                    parser(doc.root_element())
                })
                .collect()
        })
        .unwrap_or_default()
}
