//! Tumblr HTTP client.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::{header, Client, Response, StatusCode};
use tokio::time::sleep;

use crate::config::{OptionsConfig, ProxyConfig};
use crate::error::{Error, Result};

/// User agent sent with every request.
const USER_AGENT: &str = concat!("tumblr-ripper/", env!("CARGO_PKG_VERSION"));

/// Range requested by the size probe.
const PROBE_RANGE: &str = "bytes=0-4";

static PROBE_CONTENT_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^bytes 0-4/(\d+)$").unwrap());

/// HTTP client shared by the scheduler and all workers.
#[derive(Debug, Clone)]
pub struct TumblrApi {
    client: Client,
    retries: u32,
    retry_delay: Duration,
}

impl TumblrApi {
    /// Create a new client. Without proxy settings requests go out directly.
    pub fn new(options: &OptionsConfig, proxies: Option<&ProxyConfig>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(options.timeout())
            .read_timeout(options.timeout());

        match proxies {
            Some(proxies) => {
                for proxy in proxies.to_proxies()? {
                    builder = builder.proxy(proxy);
                }
            }
            None => builder = builder.no_proxy(),
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            retries: options.retries,
            retry_delay: options.page_retry_delay(),
        })
    }

    /// Fetch the raw body of one feed page.
    ///
    /// Transport failures are retried with a fixed delay. A 404, any other
    /// error status, or running out of attempts yields
    /// [`Error::FeedUnavailable`].
    pub async fn get_page(&self, account: &str, url: &str) -> Result<Vec<u8>> {
        for attempt in 1..=self.retries {
            tracing::debug!("GET {} (attempt {}/{})", url, attempt, self.retries);

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        tracing::debug!("Feed response status: {}", status);
                        return Err(Error::FeedUnavailable(account.to_string()));
                    }
                    match response.bytes().await {
                        Ok(body) => return Ok(body.to_vec()),
                        Err(e) => tracing::debug!("Failed to read feed body from {}: {}", url, e),
                    }
                }
                Err(e) => tracing::debug!("Feed request to {} failed: {}", url, e),
            }

            if attempt < self.retries {
                sleep(self.retry_delay).await;
            }
        }

        Err(Error::FeedUnavailable(account.to_string()))
    }

    /// Ask the server for the total size of a medium with a tiny range request.
    pub async fn probe_total_size(&self, url: &str) -> Result<u64> {
        let response = self
            .client
            .head(url)
            .header(header::RANGE, PROBE_RANGE)
            .send()
            .await?;

        let content_range = response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                Error::Download(format!(
                    "No content-range in probe response (HTTP {})",
                    response.status()
                ))
            })?;

        parse_probe_content_range(content_range).ok_or_else(|| {
            Error::Download(format!("Unexpected content-range: {}", content_range))
        })
    }

    /// GET a medium from `offset` to the end.
    pub async fn get_range(&self, url: &str, offset: u64) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .header(header::RANGE, format!("bytes={}-", offset))
            .send()
            .await?;

        check_medium_status(url, response)
    }

    /// GET a whole medium.
    pub async fn get_medium(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        check_medium_status(url, response)
    }
}

fn check_medium_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();

    if status == StatusCode::FORBIDDEN {
        return Err(Error::AccessDenied(url.to_string()));
    }

    if !status.is_success() {
        return Err(Error::Download(format!("HTTP {} for {}", status, url)));
    }

    Ok(response)
}

/// Total size from a `bytes 0-4/<total>` content-range value.
pub fn parse_probe_content_range(value: &str) -> Option<u64> {
    PROBE_CONTENT_RANGE
        .captures(value.trim())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(retries: u32) -> TumblrApi {
        let options = OptionsConfig {
            retries,
            page_retry_delay_ms: 10,
            ..Default::default()
        };
        TumblrApi::new(&options, None).unwrap()
    }

    #[test]
    fn test_parse_probe_content_range() {
        assert_eq!(parse_probe_content_range("bytes 0-4/1000"), Some(1000));
        assert_eq!(parse_probe_content_range("bytes 0-4/*"), None);
        assert_eq!(parse_probe_content_range("bytes 5-9/1000"), None);
        assert_eq!(parse_probe_content_range("garbage"), None);
    }

    #[tokio::test]
    async fn test_get_page_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/demo/api/read"))
            .and(query_param("type", "photo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<tumblr/>"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/demo/api/read?type=photo&num=50&start=0", server.uri());
        let body = api(3).get_page("demo", &url).await.unwrap();
        assert_eq!(body, b"<tumblr/>");
    }

    #[tokio::test]
    async fn test_get_page_404_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/ghost/api/read", server.uri());
        let err = api(3).get_page("ghost", &url).await.unwrap_err();
        assert!(matches!(err, Error::FeedUnavailable(ref a) if a == "ghost"));
    }

    #[tokio::test]
    async fn test_get_page_connection_refused_exhausts_retries() {
        // Nothing listens on this port once the server is dropped.
        let server = MockServer::start().await;
        let url = format!("{}/demo/api/read", server.uri());
        drop(server);

        let err = api(2).get_page("demo", &url).await.unwrap_err();
        assert!(matches!(err, Error::FeedUnavailable(_)));
    }

    #[tokio::test]
    async fn test_probe_total_size() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(header_eq("range", "bytes=0-4"))
            .respond_with(ResponseTemplate::new(206).insert_header("content-range", "bytes 0-4/1000"))
            .mount(&server)
            .await;

        let url = format!("{}/tumblr_abc.mp4", server.uri());
        assert_eq!(api(1).probe_total_size(&url).await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_get_medium_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let url = format!("{}/x.jpg", server.uri());
        assert!(matches!(
            api(1).get_medium(&url).await,
            Err(Error::AccessDenied(_))
        ));
    }
}
