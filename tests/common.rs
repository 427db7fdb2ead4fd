//! Common test utilities and constants
//!
//! Shared functionality used across the live test modules.

use std::time::Duration;

use shiori::types::{Chapter, Manga, MangaTile};

#[allow(dead_code)]
pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);
#[allow(dead_code)]
pub const TEST_QUERY: &str = "Komi San";

/// Known titles per source, used by the live smoke tests.
#[allow(dead_code)]
pub const MANGADEX_ID: &str = "a96676e5-8ae2-425e-b549-7f15dd34a6d8";
#[allow(dead_code)]
pub const MANGANELO_ID: &str = "read_one_piece_manga_online_free4";
#[allow(dead_code)]
pub const MANGASEE_ID: &str = "Komi-San-Wa-Komyushou-Desu";
#[allow(dead_code)]
pub const MANGAMINT_ID: &str = "komi-san-wa-komyushou-desu";
#[allow(dead_code)]
pub const HACHIRUMI_ID: &str = "the-story-about-living";

/// Installs a fmt subscriber once so `RUST_LOG=shiori=debug` shows request logs.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn check_manga(manga: &Manga) {
    assert!(!manga.id.is_empty(), "manga id is empty");
    assert!(!manga.image.is_empty(), "manga image is empty");
    assert!(!manga.titles.is_empty(), "manga has no titles");
}

#[allow(dead_code)]
pub fn check_chapters(chapters: &[Chapter]) {
    for chapter in chapters {
        assert!(!chapter.id.is_empty(), "chapter id is empty");
        assert!(chapter.chap_num.is_finite());
        assert!(chapter.time.is_some(), "chapter {} has no release time", chapter.id);
    }
}

#[allow(dead_code)]
pub fn check_tiles(tiles: &[MangaTile]) {
    for tile in tiles {
        assert!(!tile.id.is_empty(), "tile id is empty");
        assert!(!tile.title.text.is_empty(), "tile title is empty");
    }
}
