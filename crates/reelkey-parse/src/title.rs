use regex::Regex;

/// Default title-page pattern: `/title/tt0133093/...`.
pub const DEFAULT_TITLE_PATTERN: &str = r"^/title/(tt\d+)";

/// Recognizes title pages by URL path and extracts their identifier.
///
/// Capture group 1 of the pattern is the identifier.
#[derive(Debug, Clone)]
pub struct TitlePattern {
    re: Regex,
}

impl TitlePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            re: Regex::new(pattern)?,
        })
    }

    /// Whether `path` is a title page.
    pub fn matches(&self, path: &str) -> bool {
        self.re.is_match(path)
    }

    /// Identifier of the title `path` points at, if any.
    pub fn extract_id(&self, path: &str) -> Option<String> {
        let caps = self.re.captures(path)?;
        let id = caps.get(1)?.as_str().trim();
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        self.re.as_str()
    }
}

impl Default for TitlePattern {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_PATTERN).expect("built-in title pattern is a valid regex")
    }
}
