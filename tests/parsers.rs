//! Offline parser tests
//!
//! Feeds fixture pages and payloads to each adapter's parsing functions.

use chrono::{TimeZone, Utc};
use shiori::prelude::*;
use shiori::types::{LanguageCode, SearchRequest};

mod madara_tests {
    use super::*;

    fn webtoon() -> MadaraSource {
        MadaraSource::new(MadaraConfig::webtoon_xyz())
    }

    #[test]
    fn test_manga_details() {
        let page = r#"
            <div class="post-title"><h1>NEW Limit Breaker</h1></div>
            <div class="summary_image"><img data-src="https://cdn.example.com/cover.jpg"></div>
            <span class="total_votes">4.5</span>
            <div class="author-content"><a>Kim</a></div>
            <div class="artist-content"><a>Lee</a></div>
            <div class="genres-content"><a>Action</a><a>Fantasy</a></div>
            <div class="summary-content">OnGoing</div>
            <div class="description-summary"><p>Line one</p><p>Line two</p></div>
            <a class="wp-manga-action-button" data-post="1234">Bookmark</a>
        "#;

        let manga = webtoon().parse_manga_details("limit-breaker", page).unwrap();
        assert_eq!(manga.id, "1234");
        assert_eq!(manga.title(), "Limit Breaker");
        assert_eq!(manga.image, "https://cdn.example.com/cover.jpg");
        assert_eq!(manga.author.as_deref(), Some("Kim"));
        assert_eq!(manga.artist.as_deref(), Some("Lee"));
        assert_eq!(manga.description.as_deref(), Some("Line one\nLine two"));
        assert_eq!(manga.status, MangaStatus::Ongoing);
        assert_eq!(manga.rating, 4.5);
        assert_eq!(manga.all_tags().count(), 2);
    }

    #[test]
    fn test_manga_details_without_post_id_fails() {
        let result = webtoon().parse_manga_details("limit-breaker", "<div></div>");
        assert!(result.is_err());
    }

    #[test]
    fn test_post_id_from_title_page() {
        let page = r#"
            <div class="post-title"><h1>Limit Breaker</h1></div>
            <a class="wp-manga-action-button" data-action="bookmark" data-post="56789">Bookmark</a>
        "#;
        assert_eq!(webtoon().parse_post_id("limit-breaker", page).unwrap(), "56789");

        let not_numeric = r#"<a class="wp-manga-action-button" data-post="limit-breaker">x</a>"#;
        assert!(webtoon().parse_post_id("limit-breaker", not_numeric).is_err());
        assert!(webtoon().parse_post_id("limit-breaker", "<div></div>").is_err());
    }

    #[test]
    fn test_chapters() {
        let page = r#"
            <ul>
              <li class="wp-manga-chapter">
                <a href="https://www.webtoon.xyz/read/limit-breaker/chapter-12-5/">Chapter 12.5</a>
                <span class="chapter-release-date"><i>April 16, 2020</i></span>
              </li>
              <li class="wp-manga-chapter">
                <a href="https://www.webtoon.xyz/read/limit-breaker/chapter-12/">Chapter 12</a>
                <span class="chapter-release-date"><i>2 days ago</i></span>
              </li>
            </ul>
        "#;

        let chapters = webtoon().parse_chapters("1234", page).unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].id, "chapter-12-5");
        assert_eq!(chapters[0].manga_id, "limit-breaker");
        assert_eq!(chapters[0].chap_num, 12.5);
        assert_eq!(
            chapters[0].time,
            Some(Utc.with_ymd_and_hms(2020, 4, 16, 0, 0, 0).unwrap())
        );
        assert_eq!(chapters[1].chap_num, 12.0);
        assert!(chapters[1].time.is_some());
    }

    #[test]
    fn test_chapter_pages_are_cleaned() {
        let page = "<div class=\"page-break\"><img data-src=\"\n\thttps://cdn.example.com/1.jpg \"></div>\
                    <div class=\"page-break\"><img data-src=\"https://cdn.example.com/2.jpg\"></div>";

        let details = webtoon()
            .parse_chapter_details("limit-breaker", "chapter-1", page)
            .unwrap();
        assert_eq!(
            details.pages,
            vec![
                "https://cdn.example.com/1.jpg".to_string(),
                "https://cdn.example.com/2.jpg".to_string()
            ]
        );
    }

    #[test]
    fn test_search_pagination() {
        let page = |pager: &str| {
            format!(
                r#"<div class="c-tabs-item__content">
                     <a href="https://www.webtoon.xyz/read/limit-breaker/" title="Limit Breaker">
                       <img data-src="https://cdn.example.com/c.jpg">
                     </a>
                   </div>
                   <span class="pages">{}</span>"#,
                pager
            )
        };

        let first = webtoon().parse_search(&page("Page 1 of 3"), 1).unwrap();
        assert_eq!(first.results.len(), 1);
        assert_eq!(first.results[0].id, "limit-breaker");
        assert_eq!(first.results[0].title.text, "Limit Breaker");
        assert_eq!(first.metadata, Some(Metadata::page(2)));

        let last = webtoon().parse_search(&page("Page 3 of 3"), 3).unwrap();
        assert!(last.metadata.is_none());
    }

    #[test]
    fn test_listing() {
        let page = r#"
            <div class="manga">
              <img src="https://cdn.example.com/a.jpg">
              <h3 class="h5"><a href="https://www.webtoon.xyz/read/a-title/">A Title</a></h3>
            </div>
            <div class="manga">
              <img data-src="https://cdn.example.com/b.jpg">
              <h3 class="h5"><a href="https://www.webtoon.xyz/read/b-title/">B Title</a></h3>
            </div>
            <a class="last" href="https://www.webtoon.xyz/webtoons/page/9/">Last</a>
        "#;

        let source = webtoon();
        let tiles = source.parse_listing(page).unwrap();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].id, "a-title");
        assert_eq!(tiles[1].image, "https://cdn.example.com/b.jpg");
        assert!(source.has_last_link(page));
        assert!(!source.has_last_link("<div></div>"));
    }
}

mod manganelo_tests {
    use super::*;
    use shiori::net::html;
    use shiori::sources::manganelo::parser;

    #[test]
    fn test_search_keyword_is_encoded() {
        let query = SearchRequest {
            title: Some("Love & Lies #1".into()),
            ..Default::default()
        };
        let search = parser::generate_search(&query);
        assert_eq!(search, "s=all&keyw=Love_%26_Lies_%231&g_i=&g_e=");
        assert_eq!(search.matches('&').count(), 3);
    }

    #[test]
    fn test_last_page_detection() {
        assert!(parser::is_last_page(&html::parse("<div></div>")));

        let middle = html::parse(
            r#"<div class="group-page"><a class="page-select">2</a><a class="page-last">LAST(10)</a></div>"#,
        );
        assert!(!parser::is_last_page(&middle));

        let last = html::parse(
            r#"<div class="group-page"><a class="page-select">3</a><a class="page-last">LAST(3)</a></div>"#,
        );
        assert!(parser::is_last_page(&last));
    }

    #[test]
    fn test_chapters() {
        let document = html::parse(
            r#"<div class="body-site"><ul class="row-content-chapter">
                 <li><a href="https://manganelo.com/chapter/abc/chapter_5.5">Chapter 5.5: Extra</a>
                     <span class="chapter-time" title="Jun 20,2021 10:36">Jun 20,21</span></li>
                 <li><a href="https://manganelo.com/chapter/abc/chapter_5">Vol.1 Chapter 5</a>
                     <span class="chapter-time" title="Jun 13,2021 09:00">Jun 13,21</span></li>
               </ul></div>"#,
        );

        let chapters = parser::parse_chapters(&document, "abc");
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].id, "chapter_5.5");
        assert_eq!(chapters[0].chap_num, 5.5);
        assert_eq!(
            chapters[0].time,
            Some(Utc.with_ymd_and_hms(2021, 6, 20, 10, 36, 0).unwrap())
        );
        assert_eq!(chapters[1].chap_num, 5.0);
        assert_eq!(chapters[1].lang_code, LanguageCode::English);
    }

    #[test]
    fn test_site_time_formats() {
        let expected = Utc.with_ymd_and_hms(2021, 6, 20, 10, 36, 12).unwrap();
        assert_eq!(parser::parse_site_time("Jun-20-2021 10:36:12 AM"), Some(expected));
        assert_eq!(
            parser::parse_site_time("Jun 20,21"),
            Some(Utc.with_ymd_and_hms(2021, 6, 20, 0, 0, 0).unwrap())
        );
        assert_eq!(parser::parse_site_time("yesterday"), None);
    }

    #[test]
    fn test_updated_manga_stops_at_old_entry() {
        let document = html::parse(
            r#"<div class="panel-content-genres">
                 <div class="content-genres-item"><a href="https://manganelo.com/manga/abc">A</a>
                   <span class="genres-item-time">Jun 20,2021 10:36</span></div>
                 <div class="content-genres-item"><a href="https://manganelo.com/manga/xyz">X</a>
                   <span class="genres-item-time">Jun 20,2021 09:00</span></div>
                 <div class="content-genres-item"><a href="https://manganelo.com/manga/def">D</a>
                   <span class="genres-item-time">Jun 18,2021 10:00</span></div>
               </div>"#,
        );
        let since = Utc.with_ymd_and_hms(2021, 6, 19, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let ids = vec!["abc".to_string(), "def".to_string()];

        let updated = parser::parse_updated_manga(&document, since, &ids, now);
        assert_eq!(updated.ids, vec!["abc".to_string()]);
        assert!(!updated.load_more);
    }

    #[test]
    fn test_tags() {
        let document = html::parse(
            r#"<div class="advanced-search-tool-genres-list">
                 <span data-i="2">Action</span><span data-i="4">Adventure</span>
               </div>"#,
        );
        let sections = parser::parse_tags(&document);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].tags[0].id, "2");
        assert_eq!(sections[0].tags[1].label, "Adventure");
    }

    #[test]
    fn test_home_skeletons() {
        let skeletons = parser::home_section_skeletons();
        let ids: Vec<&str> = skeletons.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["top_week", "latest_updates", "new_manga"]);
        assert!(skeletons.iter().all(|s| s.items.is_empty()));
    }
}

mod mangaowl_tests {
    use super::*;
    use shiori::net::html;
    use shiori::sources::mangaowl::parser;

    #[test]
    fn test_synthetic_chapter_numbers() {
        // Newest first, as the site lists them
        let document = html::parse(
            r#"<ul id="simpleList">
                 <li><a href="/reader/3"><label class="chapter-title">Afterword</label></a></li>
                 <li><a href="/reader/2"><label class="chapter-title">Special</label></a></li>
                 <li><a href="/reader/1"><label class="chapter-title">Prologue</label></a></li>
               </ul>"#,
        );

        let chapters = parser::parse_chapter_list(&document, "46862");
        let numbers: Vec<f64> = chapters.iter().map(|c| c.chap_num).collect();
        assert_eq!(numbers, vec![0.0, 0.001, 0.002]);
        assert_eq!(chapters[0].id, "/reader/1");
    }

    #[test]
    fn test_numbered_chapters() {
        let document = html::parse(
            r#"<ul id="simpleList">
                 <li><a href="/reader/2"><label class="chapter-title">Chapter 2</label><small>05/21/2021</small></a></li>
                 <li><a href="/reader/1"><label class="chapter-title">Chapter 1</label><small>05/20/2021</small></a></li>
               </ul>"#,
        );

        let chapters = parser::parse_chapter_list(&document, "46862");
        assert_eq!(chapters[1].chap_num, 2.0);
        assert_eq!(
            chapters[1].time,
            Some(Utc.with_ymd_and_hms(2021, 5, 21, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_update_times_stop_on_old_tile() {
        let tiles = |first: &str, second: &str| {
            format!(
                r#"<div class="flexslider">
                     <div class="comicView" data-id="1" data-title="One" data-chapter-time="{}"></div>
                     <div class="comicView" data-id="2" data-title="Two" data-chapter-time="{}"></div>
                   </div>"#,
                first, second
            )
        };
        let since = Utc.with_ymd_and_hms(2021, 5, 20, 0, 0, 0).unwrap();

        let fresh = html::parse(&tiles("2021-05-21 10:00", "2021-05-19 10:00"));
        assert_eq!(
            parser::parse_times_from_tiles(&fresh, since),
            Some(vec!["1".to_string()])
        );

        let stale = html::parse(&tiles("2021-05-19 10:00", "2021-05-18 10:00"));
        assert_eq!(parser::parse_times_from_tiles(&stale, since), None);
    }

    #[test]
    fn test_pages_skip_thumbnails() {
        let document = html::parse(
            r#"<img class="comic_thumbnail" data-src="thumb.jpg">
               <img data-src="https://cdn.example.com/1.jpg">
               <img data-src="https://cdn.example.com/2.jpg">"#,
        );
        assert_eq!(parser::parse_pages(&document).len(), 2);
    }

    #[test]
    fn test_raw_manga_payload() {
        let entries: Vec<serde_json::Value> = serde_json::from_str(
            r#"[{"id": 12, "title": "Raw", "thumbnailUrl": "r.jpg"}, {"title": "No id"}]"#,
        )
        .unwrap();
        let tiles = shiori::sources::mangaowl::parse_raw_manga(&entries);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].id, "12");
        assert_eq!(tiles[0].image, "r.jpg");
    }
}

mod mangasee_tests {
    use super::*;
    use shiori::sources::mangasee::parser::{self, ChapterCode};

    const TITLE_PAGE: &str = r#"<script>
        vm.IndexName = "Onepunch-Man";
        vm.Chapters = [{"Chapter":"100015","Type":"Chapter","Date":"2021-05-20 11:20:28","ChapterName":null},{"Chapter":"200020","Type":"Chapter","Date":"2021-05-21 08:00:00","ChapterName":"Reboot"}];
    </script>"#;

    const READER_PAGE: &str = r#"<script>
        vm.CurPathName = "s1.example.com";
        vm.IndexName = "Onepunch-Man";
        vm.CurChapter = {"Chapter":"100015","Type":"Chapter","Page":"3","Directory":""};
    </script>"#;

    #[test]
    fn test_chapter_codes() {
        let one = ChapterCode::parse("100010").unwrap();
        assert_eq!(one.number, 1.0);
        assert_eq!(one.index, 1);
        assert_eq!(one.padded(), "0001");

        let half = ChapterCode::parse("100015").unwrap();
        assert_eq!(half.number, 1.5);
        assert_eq!(half.padded(), "0001.5");

        let second_index = ChapterCode::parse("200020").unwrap();
        assert_eq!(second_index.index, 2);
        assert_eq!(second_index.number, 2.0);
        assert_eq!(second_index.chapter_id("Onepunch-Man"), "Onepunch-Man-chapter-2-index-2");

        assert!(ChapterCode::parse("10001a").is_none());
    }

    #[test]
    fn test_chapters() {
        let chapters = parser::parse_chapters(TITLE_PAGE, "Onepunch-Man").unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].id, "Onepunch-Man-chapter-1.5");
        assert_eq!(chapters[0].chap_num, 1.5);
        assert_eq!(chapters[0].name.as_deref(), Some("Chapter 1.5"));
        assert_eq!(
            chapters[0].time,
            Some(Utc.with_ymd_and_hms(2021, 5, 20, 11, 20, 28).unwrap())
        );
        assert_eq!(chapters[1].name.as_deref(), Some("Reboot"));
        assert_eq!(chapters[1].volume, Some(2.0));
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        assert!(parser::parse_chapters("<html></html>", "x").is_err());
    }

    #[test]
    fn test_chapter_pages() {
        let details =
            parser::parse_chapter_details(READER_PAGE, "Onepunch-Man", "Onepunch-Man-chapter-1.5")
                .unwrap();
        assert_eq!(details.pages.len(), 3);
        assert_eq!(
            details.pages[0],
            "https://s1.example.com/manga/Onepunch-Man/0001.5-001.png"
        );
        assert_eq!(
            details.pages[2],
            "https://s1.example.com/manga/Onepunch-Man/0001.5-003.png"
        );
    }

    #[test]
    fn test_search_filters_directory() {
        let page = r#"<script>
            vm.Directory = [{"i":"Komi-San-Wa-Komyushou-Desu","s":"Komi-san wa Komyushou Desu","a":["ODA Tomohito"],"al":["Komi Can't Communicate"],"g":["Comedy","Romance"],"ss":"Ongoing"},{"i":"Berserk","s":"Berserk","a":["MIURA Kentarou"],"al":[],"g":["Action","Horror"],"ss":"Ongoing"}];
        </script>"#;

        let by_alt = parser::parse_search(page, &"communicate".into()).unwrap();
        assert_eq!(by_alt.len(), 1);
        assert_eq!(by_alt[0].id, "Komi-San-Wa-Komyushou-Desu");
        assert!(by_alt[0].image.ends_with("/Komi-San-Wa-Komyushou-Desu.jpg"));

        let excluded = SearchRequest {
            exclude_genre: vec!["Horror".to_string()],
            ..Default::default()
        };
        let results = parser::parse_search(page, &excluded).unwrap();
        assert_eq!(results.len(), 1);

        let completed = SearchRequest {
            status: Some(MangaStatus::Completed),
            ..Default::default()
        };
        assert!(parser::parse_search(page, &completed).unwrap().is_empty());
    }

    #[test]
    fn test_updated_manga() {
        let page = r#"<script>
            vm.LatestJSON = [{"IndexName":"Berserk","SeriesName":"Berserk","Chapter":"103640","Date":"2021-05-20T11:20:28+00:00"},{"IndexName":"Onepunch-Man","SeriesName":"Onepunch-Man","Chapter":"101400","Date":"2021-05-10T11:20:28+00:00"}];
        </script>"#;
        let since = Utc.with_ymd_and_hms(2021, 5, 15, 0, 0, 0).unwrap();
        let ids = vec!["Berserk".to_string(), "Onepunch-Man".to_string()];

        let found = parser::parse_updated_manga(page, since, &ids).unwrap();
        assert_eq!(found, vec!["Berserk".to_string()]);
    }

    #[test]
    fn test_view_more_unknown_section() {
        let page = r#"<script>
            vm.LatestJSON = [];
        </script>"#;
        assert!(parser::parse_view_more(page, "nope").unwrap().is_none());
        assert_eq!(parser::parse_view_more(page, "latest").unwrap(), Some(Vec::new()));
    }
}

mod mangadex_tests {
    use super::*;
    use shiori::sources::mangadex::{ChapterFeed, MangaPage, is_legacy_id, scan_updates};
    use std::collections::HashMap;

    const LISTING: &str = r#"{
        "results": [
            {"data": {"id": "aaa-1", "attributes": {"title": {"en": "Kaguya &amp; Co"}, "updatedAt": "2021-05-20T10:00:00+00:00"}},
             "relationships": [{"id": "cover-1", "type": "cover_art"}]},
            {"data": {"id": "bbb-2", "attributes": {"title": {"ja-ro": "Komi-san"}}},
             "relationships": []}
        ],
        "total": 2
    }"#;

    #[test]
    fn test_listing_skips_collected_ids() {
        let page = MangaPage::parse(LISTING).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, Some(2));
        assert_eq!(page.cover_ids(), vec!["cover-1".to_string()]);

        let covers = HashMap::from([("cover-1".to_string(), "file.png".to_string())]);
        let mut collected = vec!["bbb-2".to_string()];
        let tiles = page.tiles(&covers, "https://uploads.example.com/covers", &mut collected);

        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].id, "aaa-1");
        assert_eq!(tiles[0].title.text, "Kaguya & Co");
        assert_eq!(
            tiles[0].image,
            "https://uploads.example.com/covers/aaa-1/file.png.256.jpg"
        );
        assert_eq!(collected, vec!["bbb-2".to_string(), "aaa-1".to_string()]);

        // Same page again yields nothing new
        assert!(page.tiles(&covers, "", &mut collected).is_empty());
    }

    fn updates_listing(times: &[(&str, &str)]) -> String {
        let results: Vec<String> = times
            .iter()
            .map(|(id, updated)| {
                format!(
                    r#"{{"data": {{"id": "{}", "attributes": {{"title": {{"en": "x"}}, "updatedAt": "{}"}}}}, "relationships": []}}"#,
                    id, updated
                )
            })
            .collect();
        format!(r#"{{"results": [{}], "total": 300}}"#, results.join(","))
    }

    #[test]
    fn test_updates_all_fresh_loads_more() {
        let since = Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap();
        let body = updates_listing(&[
            ("aaa-1", "2021-05-20T10:00:00+00:00"),
            ("bbb-2", "2021-05-19T10:00:00+00:00"),
        ]);
        let ids = vec!["bbb-2".to_string(), "old-legacy".to_string()];

        let scan = scan_updates(200, &body, since, &ids, &HashMap::new()).unwrap();
        assert_eq!(scan.ids, vec!["bbb-2".to_string()]);
        assert!(scan.load_more);
    }

    #[test]
    fn test_updates_stale_entry_finishes_page() {
        let since = Utc.with_ymd_and_hms(2021, 5, 10, 0, 0, 0).unwrap();
        let body = updates_listing(&[
            ("aaa-1", "2021-05-20T10:00:00+00:00"),
            ("bbb-2", "2021-05-01T10:00:00+00:00"),
            ("ccc-3", "2021-05-15T10:00:00+00:00"),
        ]);
        let ids = vec!["aaa-1".to_string(), "bbb-2".to_string(), "42".to_string()];
        let conversion = HashMap::from([("ccc-3".to_string(), "42".to_string())]);

        let scan = scan_updates(200, &body, since, &ids, &conversion).unwrap();
        // Entries after the stale one are still read, legacy ids mapped back
        assert_eq!(scan.ids, vec!["aaa-1".to_string(), "42".to_string()]);
        assert!(!scan.load_more);
    }

    #[test]
    fn test_updates_no_content_and_empty_page_stop() {
        let since = Utc.with_ymd_and_hms(2021, 5, 10, 0, 0, 0).unwrap();
        let ids = vec!["aaa-1".to_string()];

        let no_content = scan_updates(204, "", since, &ids, &HashMap::new()).unwrap();
        assert!(no_content.ids.is_empty());
        assert!(!no_content.load_more);

        let empty = scan_updates(200, r#"{"results": [], "total": 0}"#, since, &ids, &HashMap::new())
            .unwrap();
        assert!(empty.ids.is_empty());
        assert!(!empty.load_more);

        assert!(scan_updates(200, r#"{"total": 0}"#, since, &ids, &HashMap::new()).is_err());
    }

    #[test]
    fn test_search_offset_cursor_stops_at_total() {
        let page = MangaPage::parse(&updates_listing(&[("aaa-1", "2021-05-20T10:00:00+00:00")]))
            .unwrap();
        assert_eq!(page.next_offset(0), Some(Metadata::offset(100)));
        assert_eq!(page.next_offset(100), Some(Metadata::offset(200)));
        assert!(page.next_offset(200).is_none());

        let empty = MangaPage::parse(r#"{"results": [], "total": 300}"#).unwrap();
        assert!(empty.next_offset(0).is_none());
    }

    #[test]
    fn test_listing_without_results_fails() {
        assert!(MangaPage::parse(r#"{"total": 0}"#).is_err());
    }

    #[test]
    fn test_chapter_feed() {
        let body = r#"{
            "results": [
                {"data": {"id": "ch-1", "attributes": {"title": "", "chapter": "10.5", "volume": "2",
                          "translatedLanguage": "id", "publishAt": "2021-05-20T10:00:00+00:00"}},
                 "relationships": [{"id": "group-1", "type": "scanlation_group"}]}
            ],
            "total": 1
        }"#;

        let feed = ChapterFeed::parse(body).unwrap();
        assert_eq!(feed.total, 1);
        let chapters = feed.chapters("manga-1");
        let (chapter, groups) = &chapters[0];
        assert_eq!(chapter.chap_num, 10.5);
        assert_eq!(chapter.volume, Some(2.0));
        assert_eq!(chapter.lang_code, LanguageCode::Indonesian);
        assert!(chapter.name.is_none());
        assert_eq!(groups, &vec!["group-1".to_string()]);
    }

    #[test]
    fn test_legacy_ids() {
        assert!(is_legacy_id("12345"));
        assert!(!is_legacy_id("a96676e5-8ae2-425e-b549-7f15dd34a6d8"));
    }
}

mod mangamint_tests {
    use super::*;
    use shiori::sources::mangamint::{self, MangaDetail, MangaList};

    #[test]
    fn test_manga_detail() {
        let detail: MangaDetail = serde_json::from_str(
            r#"{
                "title": "Komi-san",
                "manga_endpoint": "komi-san/",
                "thumb": "https://cdn.example.com/komi.jpg",
                "author": "Oda",
                "status": "Ongoing",
                "synopsis": "Komik Komi-san\n\t\t\t\t\t\tShy girl story.\n\t\t\t\t\t\t",
                "genre_list": [{"genre_name": "Comedy"}],
                "chapter": [{"chapter_title": "Komi-san Chapter 12.5", "chapter_endpoint": "komi-chapter-12-5/"}]
            }"#,
        )
        .unwrap();

        let now = Utc::now();
        let chapters = mangamint::parse_chapters(&detail, "komi-san/", now);
        assert_eq!(chapters[0].chap_num, 12.5);
        assert_eq!(chapters[0].time, Some(now));
        assert_eq!(chapters[0].lang_code, LanguageCode::Indonesian);

        let manga = mangamint::parse_manga(detail);
        assert_eq!(manga.id, "komi-san/");
        assert_eq!(manga.description.as_deref(), Some("Shy girl story."));
        assert_eq!(manga.status, MangaStatus::Ongoing);
        assert_eq!(manga.tags[0].tags[0].label, "Comedy");
    }

    #[test]
    fn test_tiles_skip_collected_ids() {
        let list = || -> MangaList {
            serde_json::from_str(
                r#"{"manga_list": [
                    {"title": "A", "thumb": "a.jpg", "endpoint": "a/"},
                    {"title": "B", "thumb": "b.jpg", "endpoint": "b/"},
                    {"title": "A again", "thumb": "a.jpg", "endpoint": "a/"}
                ]}"#,
            )
            .unwrap()
        };

        let mut collected = Vec::new();
        let first = mangamint::parse_tiles(list(), &mut collected);
        assert_eq!(first.len(), 2);
        assert_eq!(collected, vec!["a/".to_string(), "b/".to_string()]);

        let second = mangamint::parse_tiles(list(), &mut collected);
        assert!(second.is_empty());
    }

    #[test]
    fn test_chapter_number_fallback() {
        assert_eq!(mangamint::chapter_number("Chapter 7"), 7.0);
        assert_eq!(mangamint::chapter_number("Oneshot"), 0.0);
    }
}

mod hachirumi_tests {
    use super::*;
    use shiori::sources::hachirumi::{self, ChapterId, Series, SeriesSummary};
    use std::collections::HashMap;

    const SERIES: &str = r#"{
        "slug": "the-story-about-living",
        "title": "The Story About Living",
        "author": "Someone",
        "artist": "Someone Else",
        "description": "A story.",
        "cover": "/media/cover.png",
        "groups": {"1": "Hachirumi", "2": "Guests"},
        "chapters": {
            "1": {"title": "Start", "volume": "1", "folder": "f001",
                  "groups": {"1": ["01.png", "02.png"]},
                  "release_date": {"1": 1610000000}},
            "2.5": {"title": "", "volume": "1", "folder": "f002",
                    "groups": {"1": ["01.png"], "2": ["01.png", "02.png", "03.png"]},
                    "release_date": {"1": 1611000000, "2": 1611100000}}
        }
    }"#;

    fn series() -> Series {
        serde_json::from_str(SERIES).unwrap()
    }

    #[test]
    fn test_chapters_per_group() {
        let chapters = hachirumi::parse_chapters(&series());
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].chap_num, 2.5);
        assert_eq!(chapters[0].group.as_deref(), Some("Guests"));
        assert_eq!(chapters[0].id, "2.5|2|f002");
        assert_eq!(chapters[2].name.as_deref(), Some("Start"));
        assert_eq!(chapters[2].volume, Some(1.0));
        assert_eq!(
            chapters[2].time,
            Some(Utc.timestamp_opt(1610000000, 0).unwrap())
        );
    }

    #[test]
    fn test_pages() {
        let pages = hachirumi::parse_pages(&series(), "2.5|2|f002", "https://hachirumi.com").unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages[0],
            "https://hachirumi.com/media/manga/the-story-about-living/chapters/f002/2/01.png"
        );

        assert!(hachirumi::parse_pages(&series(), "9|1|f009", "https://hachirumi.com").is_err());
        assert!(ChapterId::parse("2.5|2").is_err());
    }

    #[test]
    fn test_details() {
        let manga = hachirumi::parse_manga(&series(), "https://hachirumi.com");
        assert_eq!(manga.image, "https://hachirumi.com/media/cover.png");
        assert_eq!(manga.status, MangaStatus::Ongoing);
        assert_eq!(manga.rating, 0.0);
    }

    #[test]
    fn test_search_filter() {
        let all: HashMap<String, SeriesSummary> = serde_json::from_str(
            r#"{
                "The Story About Living": {"slug": "the-story-about-living", "cover": "/a.png"},
                "Mid-Autumn Tale": {"slug": "mid-autumn", "cover": "/b.png"}
            }"#,
        )
        .unwrap();

        let tiles = hachirumi::filter_series(all.clone(), "mid autumn", "https://hachirumi.com");
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].id, "mid-autumn");

        assert_eq!(hachirumi::filter_series(all, "", "").len(), 2);
    }

    #[tokio::test]
    async fn test_search_after_limit_is_empty() {
        let source = Hachirumi::new();
        let cursor = Metadata {
            limit_reached: true,
            ..Default::default()
        };

        let page = source
            .search_request(&"living".into(), Some(cursor))
            .await
            .unwrap();
        assert!(page.results.is_empty());
        assert!(page.metadata.is_some_and(|m| m.limit_reached));
    }
}
