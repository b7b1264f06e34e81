use std::time::Duration;

use url::Url;

use super::normalize_url;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Result of fetching a page.
#[derive(Clone)]
pub struct PageFetch {
    pub html: String,
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
}

/// Error during fetch.
#[derive(Debug)]
pub struct FetchError {
    pub message: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

/// Fetch a URL and return its markup (blocking).
pub fn fetch_page(url_str: &str) -> Result<PageFetch, FetchError> {
    let url = normalize_url(url_str);

    let parsed = Url::parse(&url).map_err(|e| FetchError {
        message: format!("Invalid URL: {}", e),
    })?;

    let client = super::http_client(FETCH_TIMEOUT).map_err(|e| FetchError {
        message: format!("Client error: {}", e),
    })?;

    let response = client
        .get(parsed.as_str())
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .map_err(|e| FetchError {
            message: format!("Request failed: {}", e),
        })?;

    let status = response.status().as_u16();
    let final_url = response.url().to_string();

    let html = response.text().map_err(|e| FetchError {
        message: format!("Failed to read body: {}", e),
    })?;

    Ok(PageFetch {
        html,
        url: final_url,
        status,
    })
}
