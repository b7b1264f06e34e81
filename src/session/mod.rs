//! Tabbed shell session.
//!
//! Wires the search directory, persisted settings, and bookmarks to whatever
//! page surfaces the embedder supplies. All methods run on the caller's
//! thread; the session never calls back into GUI code.
//!
//! - `mod.rs`    — state, construction, tab management, read accessors
//! - `actions`   — navigation, search, settings, bookmarks, page saving

mod actions;

use std::fmt;

use crate::bookmarks::{Bookmark, BookmarkStore};
use crate::download::DownloadError;
use crate::page::PageSurface;
use crate::search::{build_navigation_url, ConfigError, SearchDirectory};
use crate::settings::{AppSettings, PersistenceError, SettingsStore};

/// Fixed news destination from the toolbar.
pub const NEWS_URL: &str = "https://www.fnanews.com";

/// Produces a fresh page surface for each new tab.
pub type PageFactory = Box<dyn Fn() -> Box<dyn PageSurface>>;

/// Session-level failure: any of the three component error kinds.
#[derive(Debug)]
pub enum ShellError {
    Config(ConfigError),
    Persistence(PersistenceError),
    Download(DownloadError),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Config(error) => error.fmt(f),
            ShellError::Persistence(error) => error.fmt(f),
            ShellError::Download(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for ShellError {}

impl From<ConfigError> for ShellError {
    fn from(error: ConfigError) -> Self {
        ShellError::Config(error)
    }
}

impl From<PersistenceError> for ShellError {
    fn from(error: PersistenceError) -> Self {
        ShellError::Persistence(error)
    }
}

impl From<DownloadError> for ShellError {
    fn from(error: DownloadError) -> Self {
        ShellError::Download(error)
    }
}

/// The shell's state: engine directory, settings, bookmarks, and open tabs.
pub struct BrowserSession {
    directory: SearchDirectory,
    settings_store: SettingsStore,
    settings: AppSettings,
    bookmarks: BookmarkStore,
    page_factory: PageFactory,
    tabs: Vec<Box<dyn PageSurface>>,
    active: usize,
}

impl BrowserSession {
    /// Load persisted state and open the first tab on the home page.
    pub fn start(
        directory: SearchDirectory,
        settings_store: SettingsStore,
        page_factory: PageFactory,
    ) -> Result<Self, ShellError> {
        let settings = AppSettings::load(&settings_store)?;
        let bookmarks = BookmarkStore::load(settings_store.clone())?;
        let mut session = Self {
            directory,
            settings_store,
            settings,
            bookmarks,
            page_factory,
            tabs: Vec::new(),
            active: 0,
        };
        session.open_tab()?;
        Ok(session)
    }

    /// Open a new tab on the home page and select it.
    pub fn open_tab(&mut self) -> Result<(), ShellError> {
        let home = build_navigation_url(self.home_url()?);
        let mut page = (self.page_factory)();
        page.navigate(&home);
        self.tabs.push(page);
        self.active = self.tabs.len() - 1;
        Ok(())
    }

    /// Close a tab. The last tab never closes; returns whether one did.
    pub fn close_tab(&mut self, index: usize) -> bool {
        if self.tabs.len() <= 1 || index >= self.tabs.len() {
            return false;
        }
        self.tabs.remove(index);
        if self.active >= self.tabs.len() {
            self.active = self.tabs.len() - 1;
        }
        true
    }

    pub fn select_tab(&mut self, index: usize) -> bool {
        if index < self.tabs.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_page(&self) -> &dyn PageSurface {
        self.tabs[self.active].as_ref()
    }

    pub(crate) fn active_page_mut(&mut self) -> &mut dyn PageSurface {
        self.tabs[self.active].as_mut()
    }

    /// Home URL for the configured engine (Google fallback for unknown names).
    pub fn home_url(&self) -> Result<&str, ConfigError> {
        self.directory.resolve(&self.settings.search_engine)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn directory(&self) -> &SearchDirectory {
        &self.directory
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        self.bookmarks.list()
    }

    /// The toolbar search bar hides while the current URL is on the engine's
    /// own site.
    pub fn search_bar_visible(&self) -> Result<bool, ConfigError> {
        let home = self.home_url()?;
        Ok(!self.active_page().current_url().starts_with(home))
    }
}
