use crate::error::{Result, ScanError};
use crate::result::FetchedPage;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, redirect::Policy};
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// A single navigation capability shared by the whole run.
///
/// Implementations return `Ok(None)` when the navigation produced no response at all;
/// callers record that as status `0`.
pub trait PageFetcher {
    fn goto(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<FetchedPage>>> + Send;
}

/// Session-wide settings for the HTTP fetcher.
#[derive(Debug, Clone, Default)]
pub struct FetcherOptions {
    pub bearer_token: Option<String>,
    pub proxy: Option<String>,
    pub follow_redirects: bool,
    pub user_agent: Option<String>,
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher that ignores certificate errors, since targets are usually
    /// staging or lab hosts with self-signed certificates.
    pub fn new(options: &FetcherOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &options.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ScanError::InvalidHeader(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let redirect = if options.follow_redirects {
            Policy::limited(5)
        } else {
            Policy::none()
        };

        let user_agent = options
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("Delve/{}", env!("CARGO_PKG_VERSION")));

        let mut builder = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .redirect(redirect)
            .tcp_keepalive(Duration::from_secs(60));

        if let Some(proxy) = &options.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ScanError::InvalidProxy(format!("{}: {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl PageFetcher for HttpFetcher {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<Option<FetchedPage>> {
        let parsed =
            Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
        debug!("GET {}", parsed);

        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let content = response.text().await.map_err(|e| classify(e, timeout))?;

        Ok(Some(FetchedPage {
            url: url.to_string(),
            status,
            content_type,
            content,
        }))
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> ScanError {
    if error.is_timeout() {
        ScanError::Timeout(timeout)
    } else {
        ScanError::HttpError(error)
    }
}
