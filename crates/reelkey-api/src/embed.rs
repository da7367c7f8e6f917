use reelkey_parse::MediaKind;
use url::Url;

/// Host serving the third-party embed player.
pub const DEFAULT_EMBED_HOST: &str = "vidsrc-embed.ru";

/// Build `https://<host>/embed/{movie|tv}/{id}`.
///
/// `host` may be a bare host name or a full base URL. The identifier is
/// percent-encoded as a single path segment.
pub fn embed_url(host: &str, id: &str, kind: MediaKind) -> Result<Url, url::ParseError> {
    let host = host.trim().trim_end_matches('/');
    let base = if host.contains("://") {
        format!("{host}/")
    } else {
        format!("https://{host}/")
    };

    let mut url = Url::parse(&base)?;
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["embed", kind.embed_segment(), id]);
    Ok(url)
}
