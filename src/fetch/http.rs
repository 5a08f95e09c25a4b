// src/fetch/http.rs
// =============================================================================
// Fetches documentation pages over HTTP with reqwest.
//
// - One shared Client for the whole crawl (connection pooling)
// - Browser-like headers; some documentation CDNs refuse bare clients
// - Per-request timeout and a redirect limit
// - Errors are sorted into FetchError variants so the final report can say
//   *why* a page failed (timeout, 404, DNS, ...)
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::{FetchedPage, Fetcher};
use crate::error::FetchError;

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; oci-docs-scraper/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = client_builder(timeout).build()?;
        Ok(Self { client })
    }
}

fn client_builder(timeout: Duration) -> reqwest::ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(categorize_error)?;

        Ok(FetchedPage { final_url, html })
    }
}

// Sorts reqwest errors into the failure kinds we report
fn categorize_error(error: reqwest::Error) -> FetchError {
    let message = error.to_string();
    let lower = message.to_lowercase();

    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if let Some(status) = error.status() {
        FetchError::Status(status.as_u16())
    } else if error.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") {
            FetchError::Dns
        } else {
            FetchError::Connect
        }
    } else if lower.contains("certificate") || lower.contains("ssl") || lower.contains("tls") {
        FetchError::Tls
    } else {
        FetchError::Other(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Local test servers must not go through an HTTP proxy from the environment
    fn fetcher() -> HttpFetcher {
        HttpFetcher {
            client: client_builder(Duration::from_secs(5)).no_proxy().build().unwrap(),
        }
    }

    // Serves exactly one canned HTTP response on a local port
    async fn serve_once(response: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        Url::parse(&format!("http://{addr}/a/index.htm")).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 27\r\nConnection: close\r\n\r\n<html><h1>Hello</h1></html>",
        )
        .await;

        let fetcher = fetcher();
        let page = fetcher.fetch(&url).await.unwrap();
        assert_eq!(page.final_url, url);
        assert!(page.html.contains("<h1>Hello</h1>"));
    }

    #[tokio::test]
    async fn test_fetch_maps_http_status() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let fetcher = fetcher();
        assert_eq!(fetcher.fetch(&url).await, Err(FetchError::Status(404)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_fetch_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = fetcher();
        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        assert!(fetcher.fetch(&url).await.is_err());
    }
}
