//! Remote source download over HTTP(S).
//!
//! Redirects are followed by an explicit loop rather than the client's
//! built-in policy, so the hop bound is checked in one place and any partial
//! destination file is discarded before each hop.

use std::path::Path;
use std::time::Duration;

use reqwest::header::LOCATION;
use reqwest::{redirect, Client, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{MediaError, MediaResult};

/// Maximum number of redirects followed for one fetch.
pub const MAX_REDIRECTS: u32 = 5;

/// Downloads a URL to a local path.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    http: Client,
}

impl RemoteFetcher {
    /// Create a fetcher with the given connect timeout.
    pub fn new(connect_timeout: Duration) -> MediaResult<Self> {
        let http = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(connect_timeout)
            .user_agent(concat!("mrelay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }

    /// Download `url` to `dest`, returning the number of bytes written.
    ///
    /// On any failure `dest` is removed, so it never survives partially
    /// written.
    pub async fn fetch(&self, url: &str, dest: impl AsRef<Path>) -> MediaResult<u64> {
        let dest = dest.as_ref();

        match self.fetch_inner(url, dest).await {
            Ok(bytes) => {
                info!(url = %url, dest = %dest.display(), bytes, "Downloaded source");
                Ok(bytes)
            }
            Err(e) => {
                remove_partial(dest).await;
                Err(e)
            }
        }
    }

    async fn fetch_inner(&self, url: &str, dest: &Path) -> MediaResult<u64> {
        let mut current = parse_source_url(url)?;
        let mut hops: u32 = 0;

        loop {
            let response = self.http.get(current.clone()).send().await?;
            let status = response.status();

            if is_redirect(status) {
                remove_partial(dest).await;

                hops += 1;
                if hops > MAX_REDIRECTS {
                    return Err(MediaError::TooManyRedirects {
                        hops: MAX_REDIRECTS,
                        url: url.to_string(),
                    });
                }

                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        MediaError::download_failed(format!(
                            "HTTP {} from {} without a Location header",
                            status.as_u16(),
                            current
                        ))
                    })?;

                let next = current
                    .join(location)
                    .map_err(|e| MediaError::InvalidUrl(format!("{}: {}", location, e)))?;
                ensure_http_scheme(&next)?;

                debug!(hop = hops, from = %current, to = %next, "Following redirect");
                current = next;
                continue;
            }

            if status != StatusCode::OK {
                return Err(MediaError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: current.to_string(),
                });
            }

            return stream_to_file(response, dest).await;
        }
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

fn parse_source_url(url: &str) -> MediaResult<Url> {
    let parsed = Url::parse(url).map_err(|e| MediaError::InvalidUrl(format!("{}: {}", url, e)))?;
    ensure_http_scheme(&parsed)?;
    Ok(parsed)
}

fn ensure_http_scheme(url: &Url) -> MediaResult<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MediaError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            other, url
        ))),
    }
}

async fn stream_to_file(mut response: reqwest::Response, dest: &Path) -> MediaResult<u64> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

/// Remove a partially written download. Missing files are fine.
async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial download"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to remove partial download: {}", e),
    }
}
