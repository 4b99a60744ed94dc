//! services/api/src/adapters/text_provider.rs
//!
//! This module contains the adapter for the external scripture service
//! (bolls.life compatible). It implements the `TextProvider` port from the
//! `core` crate and is used only to enrich verses with commentary.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};
use scripture_core::canon;
use scripture_core::domain::EnrichedVerse;
use scripture_core::ports::{PortError, PortResult, TextProvider};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"));

/// Removes HTML tags from provider commentary.
pub fn strip_markup(html: &str) -> String {
    MARKUP.replace_all(html, "").trim().to_string()
}

//=========================================================================================
// Provider Payloads
//=========================================================================================

#[derive(Deserialize)]
struct ProviderVerse {
    text: Option<String>,
    comment: Option<String>,
    verse: Option<i32>,
    verse_number: Option<i32>,
    translation: Option<String>,
}

/// `get-chapter` answers with an array, but a lone object is accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChapterPayload {
    Many(Vec<ProviderVerse>),
    One(ProviderVerse),
}

impl ChapterPayload {
    fn into_verses(self) -> Vec<ProviderVerse> {
        match self {
            ChapterPayload::Many(verses) => verses,
            ChapterPayload::One(verse) => vec![verse],
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextProvider` over HTTP.
#[derive(Clone)]
pub struct HttpTextProvider {
    client: Client,
    base_url: String,
}

impl HttpTextProvider {
    /// Creates a new `HttpTextProvider` whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Builds `{base}/{segments...}/`, percent-encoding each segment.
    /// The provider addresses books by canonical id, never by name.
    fn endpoint(&self, segments: &[&str]) -> PortResult<Url> {
        let unavailable = || PortError::ProviderUnavailable(format!("invalid base url {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| unavailable())?;
        url.path_segments_mut()
            .map_err(|_| unavailable())?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> PortResult<T> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(%url, "Text provider request failed: {}", e);
            PortError::ProviderUnavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "Text provider returned an error status");
            return Err(PortError::ProviderUnavailable(format!(
                "provider responded with {}",
                status
            )));
        }

        response.json::<T>().await.map_err(|e| {
            warn!(%url, "Text provider payload was malformed: {}", e);
            PortError::ProviderUnavailable(format!("malformed payload: {}", e))
        })
    }
}

/// Turns a provider payload into a domain verse. Missing text is an error,
/// never an empty string.
fn to_enriched(
    payload: ProviderVerse,
    book_id: i32,
    chapter: i32,
    fallback_verse: Option<i32>,
    translation: &str,
) -> PortResult<EnrichedVerse> {
    let text = payload
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| PortError::ProviderUnavailable("payload has no verse text".to_string()))?;
    let verse_number = payload
        .verse
        .or(payload.verse_number)
        .or(fallback_verse)
        .ok_or_else(|| PortError::ProviderUnavailable("payload has no verse number".to_string()))?;

    Ok(EnrichedVerse {
        book_id,
        chapter,
        verse_number,
        text,
        translation: payload.translation.unwrap_or_else(|| translation.to_string()),
        commentary: payload
            .comment
            .map(|c| strip_markup(&c))
            .filter(|c| !c.is_empty()),
    })
}

fn canonical_id(book_name: &str) -> PortResult<i32> {
    canon::book_id(book_name)
        .ok_or_else(|| PortError::Validation(format!("'{}' is not a canonical book", book_name)))
}

//=========================================================================================
// `TextProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextProvider for HttpTextProvider {
    async fn fetch_verse(
        &self,
        book_name: &str,
        chapter: i32,
        verse_number: i32,
        translation: &str,
    ) -> PortResult<EnrichedVerse> {
        let book_id = canonical_id(book_name)?;
        let url = self.endpoint(&[
            "get-text",
            translation,
            &book_id.to_string(),
            &chapter.to_string(),
            &verse_number.to_string(),
        ])?;

        let payload: ProviderVerse = self.get_json(url).await?;
        to_enriched(payload, book_id, chapter, Some(verse_number), translation)
    }

    async fn fetch_chapter(
        &self,
        book_name: &str,
        chapter: i32,
        translation: &str,
    ) -> PortResult<Vec<EnrichedVerse>> {
        let book_id = canonical_id(book_name)?;
        let url = self.endpoint(&[
            "get-chapter",
            translation,
            &book_id.to_string(),
            &chapter.to_string(),
        ])?;

        let payload: ChapterPayload = self.get_json(url).await?;
        payload
            .into_verses()
            .into_iter()
            .map(|v| to_enriched(v, book_id, chapter, None, translation))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn payload(text: Option<&str>, comment: Option<&str>) -> ProviderVerse {
        ProviderVerse {
            text: text.map(str::to_string),
            comment: comment.map(str::to_string),
            verse: None,
            verse_number: None,
            translation: None,
        }
    }

    #[test]
    fn strips_tags_and_trims() {
        assert_eq!(
            strip_markup("  <p>God is <i>love</i>.</p><br/> "),
            "God is love."
        );
        assert_eq!(strip_markup("plain"), "plain");
    }

    #[test]
    fn endpoint_appends_segments_with_trailing_slash() {
        let provider =
            HttpTextProvider::new("https://bolls.life/", Duration::from_secs(1)).unwrap();
        let url = provider
            .endpoint(&["get-text", "NIV 2011", "22", "2", "4"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://bolls.life/get-text/NIV%202011/22/2/4/"
        );
    }

    #[test]
    fn chapter_payload_accepts_array_or_single_object() {
        let many: ChapterPayload =
            serde_json::from_str(r#"[{"verse":1,"text":"a"},{"verse":2,"text":"b"}]"#).unwrap();
        assert_eq!(many.into_verses().len(), 2);

        let one: ChapterPayload = serde_json::from_str(r#"{"verse":1,"text":"a"}"#).unwrap();
        assert_eq!(one.into_verses().len(), 1);
    }

    /// Serves one canned JSON response and hands back the request line it saw.
    async fn serve_once(body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let request = String::from_utf8_lossy(&request);
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(request_line);
        });
        (base, rx)
    }

    #[tokio::test]
    async fn fetch_verse_requests_the_numeric_book_id() {
        let (base, seen) =
            serve_once(r#"{"text":"For God so loved the world","comment":"<p>Love</p>"}"#).await;
        let provider = HttpTextProvider::new(base, Duration::from_secs(5)).unwrap();

        let verse = provider.fetch_verse("John", 3, 16, "ESV").await.unwrap();
        assert_eq!(verse.book_id, 43);
        assert_eq!(verse.commentary.as_deref(), Some("Love"));
        assert_eq!(seen.await.unwrap(), "GET /get-text/ESV/43/3/16/ HTTP/1.1");
    }

    #[tokio::test]
    async fn fetch_chapter_requests_the_numeric_book_id() {
        let (base, seen) = serve_once(r#"[{"verse":1,"text":"The LORD is my shepherd"}]"#).await;
        let provider = HttpTextProvider::new(base, Duration::from_secs(5)).unwrap();

        let verses = provider.fetch_chapter("Psalms", 23, "KJV").await.unwrap();
        assert_eq!(verses.len(), 1);
        assert_eq!(verses[0].book_id, 19);
        assert_eq!(verses[0].translation, "KJV");
        assert_eq!(seen.await.unwrap(), "GET /get-chapter/KJV/19/23/ HTTP/1.1");
    }

    #[test]
    fn payload_without_text_is_unavailable() {
        let err = to_enriched(payload(None, Some("<b>note</b>")), 43, 3, Some(16), "ESV")
            .unwrap_err();
        assert!(matches!(err, PortError::ProviderUnavailable(_)));
    }

    #[test]
    fn payload_commentary_is_cleaned() {
        let verse = to_enriched(
            payload(Some("For God so loved the world"), Some("<p>Gospel in brief</p>")),
            43,
            3,
            Some(16),
            "ESV",
        )
        .unwrap();
        assert_eq!(verse.verse_number, 16);
        assert_eq!(verse.translation, "ESV");
        assert_eq!(verse.commentary.as_deref(), Some("Gospel in brief"));
    }

    #[test]
    fn unknown_book_is_rejected_before_any_request() {
        assert!(matches!(
            canonical_id("Maccabees"),
            Err(PortError::Validation(_))
        ));
    }
}
