//! # Shiori - Site adapters for manga sources
//!
//! Shiori turns manga websites and APIs into one async interface. Every site
//! is an adapter implementing [`Source`]: it fetches pages or JSON through a
//! rate-limited [`net::HttpClient`] and maps them onto the shared records in
//! [`types`] ([`Manga`], [`Chapter`], [`MangaTile`], [`HomeSection`], ...).
//!
//! ## Features
//!
//! - **One trait for every site**: details, chapters, page images, search,
//!   home sections, "view more" listings, update checks and tags
//! - **Opaque cursors**: paged calls return [`types::Metadata`] that the caller
//!   hands back verbatim; `None` means there are no more pages
//! - **Per-source rate limiting** with retry on HTTP 429
//! - **Fluent search** over a [`Sources`] collection, grouped or flattened
//! - **Pure parsers**: every adapter's page parsing is exposed as plain
//!   functions that work on fixture HTML or JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shiori::prelude::*;
//! use shiori::error::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut sources = Sources::new();
//!     sources.add(MangaDex::new());
//!
//!     let results = sources
//!         .search("one piece")
//!         .flatten()
//!         .await?
//!         .dedupe_by_id();
//!
//!     println!("Found {} results", results.len());
//!     Ok(())
//! }
//! ```
//!
//! ### Reading a chapter
//!
//! ```rust,no_run
//! use shiori::prelude::*;
//! use shiori::error::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = Manganelo::new();
//!
//!     let page = source.search_request(&"oneshot".into(), None).await?;
//!     let manga = &page.results[0];
//!
//!     let chapters = source.get_chapters(&manga.id).await?;
//!     let details = source.get_chapter_details(&manga.id, &chapters[0].id).await?;
//!
//!     for url in details.pages {
//!         println!("{}", url);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`source`]: the [`Source`] trait and the [`Sources`] collection
//! - [`sources`]: one module per site plus the configurable Madara base
//! - [`search`]: fluent search builder and result processing
//! - [`types`]: records every adapter produces
//! - [`net`]: HTTP client, request scheduling and HTML/JSON helpers
//! - [`util`]: date and text helpers shared by the parsers
//! - [`error`]: error type and result alias
//!
//! ## Paging
//!
//! ```rust
//! # use shiori::prelude::*;
//! # async fn example(source: &dyn Source) -> shiori::Result<()> {
//! let mut cursor = None;
//! loop {
//!     let Some(page) = source.get_view_more_items("latest_updates", cursor).await? else {
//!         break;
//!     };
//!     println!("{} tiles", page.results.len());
//!     match page.metadata {
//!         Some(next) => cursor = Some(next),
//!         None => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod net;
pub mod search;
pub mod source;
pub mod sources;
pub mod types;
pub mod util;

/// Prelude module for convenient imports.
///
/// Re-exports the collection, the trait, the search helpers, the common
/// records and every enabled adapter.
///
/// ```rust
/// use shiori::prelude::*;
///
/// let sources = Sources::with_defaults();
/// assert!(sources.get("mangadex").is_some());
/// ```
pub mod prelude {
    pub use crate::{
        search::{SearchBuilder, SearchResultExt},
        source::{Source, Sources},
        sources::{MadaraConfig, MadaraSource},
        types::{
            Chapter, ChapterDetails, HomeSection, Manga, MangaStatus, MangaTile, Metadata,
            PagedResults, SearchRequest, SearchRequestBuilder,
        },
    };

    #[cfg(feature = "source-hachirumi")]
    pub use crate::sources::Hachirumi;
    #[cfg(feature = "source-mangadex")]
    pub use crate::sources::MangaDex;
    #[cfg(feature = "source-mangamint")]
    pub use crate::sources::MangaMint;
    #[cfg(feature = "source-mangaowl")]
    pub use crate::sources::MangaOwl;
    #[cfg(feature = "source-manganelo")]
    pub use crate::sources::Manganelo;
    #[cfg(feature = "source-mangasee")]
    pub use crate::sources::Mangasee;
}

// Re-export main types at crate root for direct access
pub use error::{Error, Result};
pub use search::{SearchBuilder, SearchResultExt};
pub use source::{Source, Sources};
pub use types::{Chapter, ChapterDetails, HomeSection, Manga, MangaTile, PagedResults, SearchRequest};
