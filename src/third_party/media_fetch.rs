use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, HeaderMap, HeaderValue, USER_AGENT};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("empty url")]
    EmptyUrl,
    #[error("http client init failed: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
}

/// 阻塞式图片下载客户端；内部是 `Arc`，可直接 clone 给工作线程。
#[derive(Debug, Clone)]
pub(crate) struct MediaFetcher {
    client: Client,
}

impl MediaFetcher {
    pub(crate) fn new(timeout: Duration) -> Result<Self, FetchError> {
        // reqwest is built without gzip here; ask for identity so bytes decode directly.
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("image/*,*/*;q=0.8"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("thumbfetch/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    pub(crate) fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::EmptyUrl);
        }

        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            debug!(target: "fetch", %status, url, "image request rejected");
            return Err(FetchError::Status(status));
        }
        let bytes = resp.bytes()?;
        debug!(target: "fetch", url, len = bytes.len(), "image fetched");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_url_is_rejected_before_any_request() {
        let fetcher = MediaFetcher::new(Duration::from_secs(1)).unwrap();
        assert!(matches!(fetcher.fetch_bytes("  "), Err(FetchError::EmptyUrl)));
    }
}
