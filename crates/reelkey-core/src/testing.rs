//! In-memory relay used by the core tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reelkey_api::{SearchResult, TitleDetails};
use reelkey_parse::MediaKind;

use crate::config::Configuration;
use crate::relay::{Relay, RelayError};

type Reply<T> = (Duration, Result<T, RelayError>);

#[derive(Default)]
pub(crate) struct FakeRelay {
    pub searches: Mutex<Vec<String>>,
    pub lookups: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<(String, MediaKind)>>,
    search_replies: Mutex<HashMap<String, Reply<Vec<SearchResult>>>>,
    lookup_reply: Mutex<Option<Reply<TitleDetails>>>,
}

impl FakeRelay {
    pub fn with_search(self, query: &str, reply: Result<Vec<SearchResult>, RelayError>) -> Self {
        self.with_slow_search(query, Duration::ZERO, reply)
    }

    pub fn with_slow_search(
        self,
        query: &str,
        delay: Duration,
        reply: Result<Vec<SearchResult>, RelayError>,
    ) -> Self {
        self.search_replies
            .lock()
            .unwrap()
            .insert(query.to_string(), (delay, reply));
        self
    }

    pub fn with_lookup(self, delay: Duration, reply: Result<TitleDetails, RelayError>) -> Self {
        *self.lookup_reply.lock().unwrap() = Some((delay, reply));
        self
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn opened_calls(&self) -> Vec<(String, MediaKind)> {
        self.opened.lock().unwrap().clone()
    }
}

impl Relay for FakeRelay {
    async fn search(
        &self,
        query: &str,
        _filter: Option<MediaKind>,
    ) -> Result<Vec<SearchResult>, RelayError> {
        self.searches.lock().unwrap().push(query.to_string());
        let (delay, reply) = self
            .search_replies
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or((Duration::ZERO, Ok(Vec::new())));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    async fn lookup_by_id(&self, id: &str) -> Result<TitleDetails, RelayError> {
        self.lookups.lock().unwrap().push(id.to_string());
        let (delay, reply) = self
            .lookup_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or((Duration::ZERO, Err(RelayError::Api("Incorrect IMDb ID.".into()))));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    async fn open_embed(&self, id: &str, kind: MediaKind) -> Result<String, RelayError> {
        if id.trim().is_empty() {
            return Err(RelayError::MissingIdentifier);
        }
        self.opened.lock().unwrap().push((id.to_string(), kind));
        Ok(format!("https://vidsrc-embed.ru/embed/{}/{id}", kind.embed_segment()))
    }

    async fn configuration(&self) -> Configuration {
        Configuration {
            api_key: "test-key".into(),
            shortcut: "Ctrl+Space".into(),
        }
    }
}

pub(crate) fn result(id: &str, title: &str, kind: Option<MediaKind>) -> SearchResult {
    SearchResult {
        id: id.into(),
        title: title.into(),
        year: Some("1999".into()),
        kind,
        media_type: kind.map(|k| k.as_str().to_string()),
        poster_url: None,
    }
}

pub(crate) fn details(id: &str, media_type: &str) -> TitleDetails {
    TitleDetails {
        id: id.into(),
        title: "Title".into(),
        year: None,
        media_type: Some(media_type.into()),
        kind: MediaKind::from_remote_type(media_type),
        poster_url: None,
        plot: None,
        genre: None,
        runtime: None,
        rating: None,
    }
}
