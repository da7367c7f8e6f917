//! Movie/series classification from the loosely-typed strings that remote
//! APIs and page metadata use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Media classification used to pick the embed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    Series,
}

impl MediaKind {
    /// Wire name (`"movie"` / `"series"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }

    /// Path segment of the embed route (`"movie"` / `"tv"`).
    pub fn embed_segment(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "tv",
        }
    }

    /// Classify a metadata API `Type` field (`"series"`, `"movie"`, `"N/A"`, ...).
    pub fn from_remote_type(raw: &str) -> Option<Self> {
        let v = raw.to_lowercase();
        if v.contains("series") || v.contains("tv") {
            Some(Self::Series)
        } else if v.contains("movie") || v.contains("film") {
            Some(Self::Movie)
        } else {
            None
        }
    }

    /// Classify an Open Graph `og:type` value (`"video.tv_show"`, `"video.movie"`).
    pub fn from_og_type(raw: &str) -> Option<Self> {
        let v = raw.to_lowercase();
        if v.contains("tv") {
            Some(Self::Series)
        } else if v.contains("movie") {
            Some(Self::Movie)
        } else {
            None
        }
    }

    /// Classify a schema.org `@type` (`"TVSeries"`, `"TVEpisode"`, `"Movie"`).
    pub fn from_json_ld_type(raw: &str) -> Option<Self> {
        let v = raw.to_lowercase();
        if v.contains("tvseries") || v.contains("tvepisode") {
            Some(Self::Series)
        } else if v.contains("movie") || v.contains("film") {
            Some(Self::Movie)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    /// Strict parse of user input; accepts `tv` as an alias for series.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "series" | "tv" => Ok(Self::Series),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}
