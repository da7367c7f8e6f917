pub mod config;
pub mod error;
pub mod injector;
pub mod overlay;
pub mod relay;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use reelkey_api::{SearchResult, TitleDetails};
pub use reelkey_parse::{KeyEvent, MediaKind, PageMetadata, ShortcutSpec};
