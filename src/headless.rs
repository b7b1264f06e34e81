//! Headless page surface backed by direct HTTP fetches.
//!
//! Keeps its own back/forward history and visited-URL record, and extracts the
//! page `<title>` from fetched markup. Stands in for the web-engine widget
//! when the shell runs without a GUI.

use std::collections::HashSet;
use std::sync::mpsc;

use scraper::{Html, Selector};

use crate::net::fetch::fetch_page;
use crate::page::{NavHistory, PageSurface};

#[derive(Default)]
pub struct HeadlessPage {
    history: NavHistory,
    visited: HashSet<String>,
    html: String,
    title: String,
    url: String,
    last_error: Option<String>,
}

impl HeadlessPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error message from the most recent load, if it failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn load(&mut self, url: &str) {
        match fetch_page(url) {
            Ok(page) => {
                log::debug!("loaded {} (HTTP {})", page.url, page.status);
                self.title = extract_title(&page.html);
                self.url = page.url.clone();
                self.visited.insert(page.url);
                self.html = page.html;
                self.last_error = None;
            }
            Err(error) => {
                log::warn!("page load failed for {}: {}", url, error);
                self.last_error = Some(error.to_string());
            }
        }
    }
}

impl PageSurface for HeadlessPage {
    fn current_url(&self) -> String {
        self.url.clone()
    }

    fn current_title(&self) -> String {
        self.title.clone()
    }

    fn navigate(&mut self, url: &str) {
        self.history.push(url);
        self.load(url);
    }

    fn reload(&mut self) {
        if let Some(current) = self.history.current().map(str::to_string) {
            self.load(&current);
        }
    }

    fn go_back(&mut self) {
        if let Some(url) = self.history.back().map(str::to_string) {
            self.load(&url);
        }
    }

    fn go_forward(&mut self) {
        if let Some(url) = self.history.forward().map(str::to_string) {
            self.load(&url);
        }
    }

    fn serialize_html(&self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(self.html.clone());
        rx
    }

    fn clear_cookies_and_history(&mut self) {
        self.history.clear();
        self.visited.clear();
    }
}

/// Extract the trimmed `<title>` text, empty when absent.
fn extract_title(html: &str) -> String {
    let document = Html::parse_document(html);
    Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}
