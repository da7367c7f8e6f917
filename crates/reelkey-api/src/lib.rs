pub mod embed;
pub mod omdb;
pub mod traits;

pub use embed::embed_url;
pub use omdb::{OmdbClient, OmdbError};
pub use traits::{MetadataService, SearchResult, TitleDetails};
