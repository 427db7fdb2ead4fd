//! Integration tests for Shiori
//!
//! End-to-end tests across the source collection, plus the paging contract of
//! the sources that track collected ids.

use std::collections::HashSet;
use tokio::time::timeout;
use shiori::prelude::*;

mod common;
use common::{TEST_QUERY, TEST_TIMEOUT, init_tracing};

/// Walks up to `pages` view-more pages and asserts no id comes back twice.
async fn assert_no_repeats(source: &dyn Source, section_id: &str, pages: usize) {
    let mut seen = HashSet::new();
    let mut cursor = None;

    for _ in 0..pages {
        let page = match timeout(TEST_TIMEOUT, source.get_view_more_items(section_id, cursor)).await {
            Ok(Ok(Some(page))) => page,
            Ok(Ok(None)) => break,
            Ok(Err(e)) => {
                println!("{} view more failed: {}", source.name(), e);
                return;
            }
            Err(_) => {
                println!("{} view more timeout", source.name());
                return;
            }
        };

        for tile in &page.results {
            assert!(
                seen.insert(tile.id.clone()),
                "{} repeated {} across view-more pages",
                source.name(),
                tile.id
            );
        }
        println!("{} view more: {} new tiles", source.name(), page.results.len());

        match page.metadata {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_sources_collection_basic() {
        let sources = Sources::with_defaults();
        assert!(!sources.is_empty());

        for id in sources.list_ids() {
            let source = sources.get(id).expect("listed source resolves");
            assert!(!source.name().is_empty());
            assert!(!source.info().version.is_empty());
        }
    }

    #[tokio::test]
    async fn test_sources_fluent_api() {
        init_tracing();
        let mut sources = Sources::new();
        sources.add(MangaDex::new());
        sources.add(Hachirumi::new());

        let search_future = sources.search(TEST_QUERY).flatten();

        match timeout(TEST_TIMEOUT, search_future).await {
            Ok(Ok(tiles)) => {
                println!("Fluent API search: {} results", tiles.len());

                let unique = tiles.clone().dedupe_by_id();
                assert!(unique.len() <= tiles.len());

                let sorted = tiles.clone().sort_by_query_relevance(TEST_QUERY);
                assert_eq!(sorted.len(), tiles.len());
            }
            Ok(Err(e)) => println!("Fluent API search failed: {}", e),
            Err(_) => println!("Fluent API search timeout"),
        }
    }

    #[tokio::test]
    async fn test_grouped_search_reports_every_source() {
        let mut sources = Sources::new();
        sources.add(MangaDex::new());
        sources.add(Mangasee::new());

        match timeout(TEST_TIMEOUT * 2, sources.search(TEST_QUERY).group()).await {
            Ok(grouped) => {
                assert_eq!(grouped.len(), 2);
                for (source_id, result) in grouped {
                    match result {
                        Ok(page) => println!("{}: {} results", source_id, page.results.len()),
                        Err(e) => println!("{}: {}", source_id, e),
                    }
                }
            }
            Err(_) => println!("Grouped search timeout"),
        }
    }

    #[tokio::test]
    async fn test_full_workflow() {
        init_tracing();
        let sources = Sources::with_defaults();
        println!("Testing complete workflow: search -> details -> chapters -> pages");

        let page = match timeout(TEST_TIMEOUT, sources.search(TEST_QUERY).from_source("mangadex")).await {
            Ok(Ok(page)) if !page.results.is_empty() => page,
            Ok(Ok(_)) => return println!("No manga found"),
            Ok(Err(e)) => return println!("Search failed: {}", e),
            Err(_) => return println!("Search timeout"),
        };

        let Some(source) = sources.get("mangadex") else {
            panic!("mangadex is a default source");
        };
        let tile = &page.results[0];
        println!("✓ Found manga: {}", tile.title.text);

        match timeout(TEST_TIMEOUT, source.get_chapters(&tile.id)).await {
            Ok(Ok(chapters)) if !chapters.is_empty() => {
                let chapter = &chapters[0];
                println!("✓ Found chapter: {}", chapter.chap_num);

                match timeout(TEST_TIMEOUT, source.get_chapter_details(&tile.id, &chapter.id)).await {
                    Ok(Ok(details)) => println!("✓ {} pages", details.pages.len()),
                    Ok(Err(e)) => println!("⚠ Chapter details failed: {}", e),
                    Err(_) => println!("⚠ Chapter details timeout"),
                }
            }
            Ok(Ok(_)) => println!("No chapters found"),
            Ok(Err(e)) => println!("Chapters error: {}", e),
            Err(_) => println!("Chapters timeout"),
        }
    }

    #[tokio::test]
    async fn test_mangadex_view_more_has_no_repeats() {
        assert_no_repeats(&MangaDex::new(), "recently_updated", 3).await;
    }

    #[tokio::test]
    async fn test_mangamint_view_more_has_no_repeats() {
        assert_no_repeats(&MangaMint::new(), "popular", 3).await;
    }

    #[tokio::test]
    async fn test_filter_updated_manga() {
        let source = Manganelo::new();
        let since = chrono::Utc::now() - chrono::Duration::days(1);
        let ids = vec![common::MANGANELO_ID.to_string()];
        let updates = std::sync::Mutex::new(Vec::new());

        let on_updates = |batch: shiori::types::MangaUpdates| {
            if let Ok(mut updates) = updates.lock() {
                updates.extend(batch.ids);
            }
        };

        match timeout(TEST_TIMEOUT * 4, source.filter_updated_manga(&on_updates, since, &ids)).await {
            Ok(Ok(())) => {
                let updates = updates.lock().map(|u| u.clone()).unwrap_or_default();
                println!("Manganelo updates: {:?}", updates);
                assert!(updates.iter().all(|id| ids.contains(id)));
            }
            Ok(Err(e)) => println!("Update filter failed: {}", e),
            Err(_) => println!("Update filter timeout"),
        }
    }
}
