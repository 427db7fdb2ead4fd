//! Site adapters with conditional compilation support.
//!
//! Each adapter sits behind its own feature flag so builds can include only
//! the sites they need. The [`madara`] base is always compiled.
//!
//! # Feature Flags
//!
//! - `source-mangadex` - MangaDex JSON API
//! - `source-manganelo` - Manganelo
//! - `source-mangaowl` - MangaOwl
//! - `source-mangasee` - Mangasee
//! - `source-mangamint` - MangaMint
//! - `source-hachirumi` - Hachirumi
//! - `all-sources` - All of the above (default)
//!
//! Build with only MangaDex support:
//! ```bash
//! cargo build --no-default-features --features source-mangadex
//! ```

use crate::source::Sources;

pub mod madara;

#[cfg(feature = "source-mangadex")]
pub mod mangadex;

#[cfg(feature = "source-manganelo")]
pub mod manganelo;

#[cfg(feature = "source-mangaowl")]
pub mod mangaowl;

#[cfg(feature = "source-mangasee")]
pub mod mangasee;

#[cfg(feature = "source-mangamint")]
pub mod mangamint;

#[cfg(feature = "source-hachirumi")]
pub mod hachirumi;

pub use madara::{MadaraConfig, MadaraSource};

#[cfg(feature = "source-mangadex")]
pub use mangadex::MangaDex;

#[cfg(feature = "source-manganelo")]
pub use manganelo::Manganelo;

#[cfg(feature = "source-mangaowl")]
pub use mangaowl::MangaOwl;

#[cfg(feature = "source-mangasee")]
pub use mangasee::Mangasee;

#[cfg(feature = "source-mangamint")]
pub use mangamint::MangaMint;

#[cfg(feature = "source-hachirumi")]
pub use hachirumi::Hachirumi;

/// Adds every feature-enabled adapter, plus the bundled Madara site.
pub(crate) fn register_defaults(sources: &mut Sources) {
    #[cfg(feature = "source-mangadex")]
    sources.add(MangaDex::new());

    #[cfg(feature = "source-manganelo")]
    sources.add(Manganelo::new());

    #[cfg(feature = "source-mangaowl")]
    sources.add(MangaOwl::new());

    #[cfg(feature = "source-mangasee")]
    sources.add(Mangasee::new());

    #[cfg(feature = "source-mangamint")]
    sources.add(MangaMint::new());

    #[cfg(feature = "source-hachirumi")]
    sources.add(Hachirumi::new());

    sources.add(MadaraSource::new(MadaraConfig::webtoon_xyz()));
}
