//! HTTP plumbing shared by the headless page surface and the download task.

pub mod fetch;

use std::time::Duration;

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; Kestrel/0.1; ",
    "+https://github.com/kestrel-browser/kestrel-browser)"
);

/// Build the blocking HTTP client used across the crate.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}

/// Default bare host names to an https:// URL.
pub fn normalize_url(input: &str) -> String {
    if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_scheme() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
    }

    #[test]
    fn normalize_keeps_explicit_scheme() {
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
    }
}
