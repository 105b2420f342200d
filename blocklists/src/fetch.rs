//! Source fetching.
//!
//! `http`/`https` sources go through a blocking `reqwest` client, `file`
//! sources are read from disk. Both paths use the same bounded read so a
//! runaway source fails its entry instead of exhausting memory.

use std::io::Read;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::error::EntryErrorKind;

/// Why a source could not be fetched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Network, HTTP status, or I/O failure.
    #[error("{0}")]
    Failed(String),
    /// The source is larger than the configured bound.
    #[error("Source exceeds maximum size of {0} bytes")]
    TooLarge(u64),
    /// No fetcher for this URL scheme.
    #[error("Unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
}

impl FetchError {
    /// The report category for this failure.
    #[must_use]
    pub fn kind(&self) -> EntryErrorKind {
        match self {
            Self::Failed(_) => EntryErrorKind::FetchFailed,
            Self::TooLarge(_) => EntryErrorKind::SourceTooLarge,
            Self::UnsupportedScheme(_) => EntryErrorKind::UnsupportedScheme,
        }
    }
}

/// Retrieves the raw bytes of a block-list source.
pub trait Fetcher {
    /// Fetch `url`, reading at most `max_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the source cannot be retrieved or is larger
    /// than `max_size`.
    fn fetch(&self, url: &Url, max_size: u64) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP fetcher, also handling `file://` URLs.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the client defaults and a crate user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("den-blocklists/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &Url, max_size: u64) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| FetchError::Failed(format!("Failed to fetch {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Failed(format!("HTTP {status} from {url}")));
        }

        if response.content_length().is_some_and(|len| len > max_size) {
            return Err(FetchError::TooLarge(max_size));
        }

        read_bounded(response, max_size)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url, max_size: u64) -> Result<Vec<u8>, FetchError> {
        debug!("Fetching {url}");
        match url.scheme() {
            "http" | "https" => self.fetch_http(url, max_size),
            "file" => fetch_file(url, max_size),
            other => Err(FetchError::UnsupportedScheme(other.to_owned())),
        }
    }
}

fn fetch_file(url: &Url, max_size: u64) -> Result<Vec<u8>, FetchError> {
    let path = url
        .to_file_path()
        .map_err(|()| FetchError::Failed(format!("Not a local file path: {url}")))?;
    let file = std::fs::File::open(&path)
        .map_err(|e| FetchError::Failed(format!("Failed to open {}: {e}", path.display())))?;
    read_bounded(file, max_size)
}

/// Read at most `max_size + 1` bytes so an oversized source is detected
/// without buffering all of it.
fn read_bounded(reader: impl Read, max_size: u64) -> Result<Vec<u8>, FetchError> {
    let mut buffer = Vec::new();
    reader
        .take(max_size.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(|e| FetchError::Failed(format!("Failed to read source: {e}")))?;

    if buffer.len() as u64 > max_size {
        return Err(FetchError::TooLarge(max_size));
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Mount `response` at `/list.txt` on a fresh mock server.
    async fn serve(response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list.txt"))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    /// The fetcher is blocking, so it runs (and is dropped) off the runtime.
    async fn fetch_list(server: &MockServer, max_size: u64) -> Result<Vec<u8>, FetchError> {
        let url = Url::parse(&format!("{}/list.txt", server.uri())).unwrap();
        tokio::task::spawn_blocking(move || HttpFetcher::new().unwrap().fetch(&url, max_size))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_http_fetch_returns_body() {
        let server =
            serve(ResponseTemplate::new(200).set_body_string("||ads.example.com^\n")).await;

        let bytes = fetch_list(&server, 1024).await.unwrap();
        assert_eq!(bytes, b"||ads.example.com^\n");
    }

    #[tokio::test]
    async fn test_http_error_status_is_fetch_failure() {
        let server = serve(ResponseTemplate::new(404).set_body_string("missing")).await;

        let err = fetch_list(&server, 1024).await.unwrap_err();
        assert_eq!(err.kind(), EntryErrorKind::FetchFailed);
        assert!(err.to_string().contains("404"), "got: {err}");
    }

    #[tokio::test]
    async fn test_http_oversized_body_is_rejected() {
        let server = serve(ResponseTemplate::new(200).set_body_string("0123456789")).await;

        let err = fetch_list(&server, 4).await.unwrap_err();
        assert!(matches!(err, FetchError::TooLarge(4)));
    }

    #[test]
    fn test_file_fetch() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("list.txt");
        std::fs::write(&path, "##.banner\n").unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let bytes = HttpFetcher::new().unwrap().fetch(&url, 1024).unwrap();
        assert_eq!(bytes, b"##.banner\n");
    }

    #[test]
    fn test_missing_file_is_fetch_failure() {
        let tmp = TempDir::new().unwrap();
        let url = Url::from_file_path(tmp.path().join("missing.txt")).unwrap();

        let err = HttpFetcher::new().unwrap().fetch(&url, 1024).unwrap_err();
        assert_eq!(err.kind(), EntryErrorKind::FetchFailed);
    }

    #[test]
    fn test_unsupported_scheme() {
        let url = Url::parse("ftp://example.com/list.txt").unwrap();
        let err = HttpFetcher::new().unwrap().fetch(&url, 1024).unwrap_err();
        assert_eq!(err.kind(), EntryErrorKind::UnsupportedScheme);
        assert!(err.to_string().contains("'ftp'"));
    }

    #[test]
    fn test_read_bounded_exact_limit_is_allowed() {
        let bytes = read_bounded(&b"abcd"[..], 4).unwrap();
        assert_eq!(bytes, b"abcd");
        assert!(matches!(
            read_bounded(&b"abcde"[..], 4),
            Err(FetchError::TooLarge(4))
        ));
    }
}
