//! Session operations: navigation, search, settings, bookmarks, page saving.

use std::fs;
use std::path::Path;

use crate::bookmarks::Bookmark;
use crate::download::{DownloadError, DownloadTask};
use crate::search::{build_navigation_url, build_search_url};
use crate::settings::Theme;

use super::{BrowserSession, ShellError, NEWS_URL};

impl BrowserSession {
    pub fn load_home(&mut self) -> Result<(), ShellError> {
        let target = build_navigation_url(self.home_url()?);
        self.active_page_mut().navigate(&target);
        Ok(())
    }

    pub fn load_news(&mut self) {
        self.active_page_mut().navigate(NEWS_URL);
    }

    pub fn refresh(&mut self) {
        self.active_page_mut().reload();
    }

    pub fn back(&mut self) {
        self.active_page_mut().go_back();
    }

    pub fn forward(&mut self) {
        self.active_page_mut().go_forward();
    }

    /// Navigate the active tab to a results page for `query`. Empty and
    /// whitespace-only queries are ignored.
    pub fn search(&mut self, query: &str) -> Result<(), ShellError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        let target = build_search_url(self.home_url()?, query);
        self.active_page_mut().navigate(&target);
        Ok(())
    }

    /// Switch engines: persist the choice, then go home on the new engine.
    /// Unknown names are accepted and resolve through the default fallback.
    pub fn set_search_engine(&mut self, name: &str) -> Result<(), ShellError> {
        let mut next = self.settings.clone();
        next.search_engine = name.to_string();
        next.save(&self.settings_store)?;
        self.settings = next;
        self.load_home()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), ShellError> {
        let mut next = self.settings.clone();
        next.theme = theme;
        next.save(&self.settings_store)?;
        self.settings = next;
        Ok(())
    }

    /// Bookmark the active page. Returns whether the list changed.
    pub fn bookmark_current_page(&mut self) -> Result<bool, ShellError> {
        let title = self.active_page().current_title();
        let url = self.active_page().current_url();
        Ok(self.bookmarks.add(Bookmark::new(title, url))?)
    }

    pub fn remove_bookmark(&mut self, bookmark: &Bookmark) -> Result<bool, ShellError> {
        Ok(self.bookmarks.remove(bookmark)?)
    }

    pub fn remove_bookmark_at(&mut self, index: usize) -> Result<Option<Bookmark>, ShellError> {
        Ok(self.bookmarks.remove_at(index)?)
    }

    /// Serialize the active page's markup and write it to `dest`.
    pub fn save_current_page(&mut self, dest: &Path) -> Result<(), ShellError> {
        let receiver = self.active_page().serialize_html();
        let html = receiver.recv().map_err(|_| {
            ShellError::Download(DownloadError::Request(
                "page surface dropped the serialization channel".to_string(),
            ))
        })?;
        fs::write(dest, html).map_err(|error| {
            ShellError::Download(DownloadError::File {
                path: dest.to_path_buf(),
                message: error.to_string(),
            })
        })?;
        log::info!("page saved to {}", dest.display());
        Ok(())
    }

    /// Stream `url` to `dest` on a background thread.
    pub fn download_page(&self, url: &str, dest: &Path) -> DownloadTask {
        DownloadTask::spawn(url, dest)
    }

    /// Clear cookies and history on every open tab.
    pub fn clear_browsing_data(&mut self) {
        for tab in &mut self.tabs {
            tab.clear_cookies_and_history();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::mpsc;

    use crate::page::PageSurface;
    use crate::search::SearchDirectory;
    use crate::settings::{AppSettings, SettingsStore, Theme};

    use super::super::{BrowserSession, PageFactory};

    /// Records every navigation into a log shared with the test body.
    struct MockPage {
        url: String,
        title: String,
        html: String,
        log: Rc<RefCell<Vec<String>>>,
        cleared: Rc<Cell<bool>>,
        reloads: Rc<Cell<usize>>,
    }

    impl PageSurface for MockPage {
        fn current_url(&self) -> String {
            self.url.clone()
        }

        fn current_title(&self) -> String {
            self.title.clone()
        }

        fn navigate(&mut self, url: &str) {
            self.url = url.to_string();
            self.log.borrow_mut().push(url.to_string());
        }

        fn reload(&mut self) {
            self.reloads.set(self.reloads.get() + 1);
        }

        fn go_back(&mut self) {}

        fn go_forward(&mut self) {}

        fn serialize_html(&self) -> mpsc::Receiver<String> {
            let (tx, rx) = mpsc::channel();
            let _ = tx.send(self.html.clone());
            rx
        }

        fn clear_cookies_and_history(&mut self) {
            self.cleared.set(true);
        }
    }

    struct Fixture {
        session: BrowserSession,
        store: SettingsStore,
        log: Rc<RefCell<Vec<String>>>,
        cleared: Rc<Cell<bool>>,
        reloads: Rc<Cell<usize>>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at_path(dir.path().join("browser.json"));
        let log = Rc::new(RefCell::new(Vec::new()));
        let cleared = Rc::new(Cell::new(false));
        let reloads = Rc::new(Cell::new(0));

        let factory: PageFactory = {
            let log = Rc::clone(&log);
            let cleared = Rc::clone(&cleared);
            let reloads = Rc::clone(&reloads);
            Box::new(move || {
                Box::new(MockPage {
                    url: String::new(),
                    title: "Mock Page".to_string(),
                    html: "<html>mock</html>".to_string(),
                    log: Rc::clone(&log),
                    cleared: Rc::clone(&cleared),
                    reloads: Rc::clone(&reloads),
                })
            })
        };

        let session =
            BrowserSession::start(SearchDirectory::builtin(), store.clone(), factory).unwrap();
        Fixture {
            session,
            store,
            log,
            cleared,
            reloads,
            _dir: dir,
        }
    }

    #[test]
    fn start_opens_one_tab_on_home() {
        let fx = fixture();
        assert_eq!(fx.session.tab_count(), 1);
        assert_eq!(*fx.log.borrow(), vec!["https://www.google.com".to_string()]);
    }

    #[test]
    fn search_navigates_to_query_url() {
        let mut fx = fixture();
        fx.session.search("rust borrow checker").unwrap();
        assert_eq!(
            fx.log.borrow().last().map(String::as_str),
            Some("https://www.google.com/search?q=rust+borrow+checker")
        );
    }

    #[test]
    fn blank_search_is_ignored() {
        let mut fx = fixture();
        fx.session.search("   ").unwrap();
        assert_eq!(fx.log.borrow().len(), 1); // only the initial home load
    }

    #[test]
    fn search_bar_hides_on_engine_pages() {
        let mut fx = fixture();
        // On the home page (and its result pages) the bar is hidden
        assert!(!fx.session.search_bar_visible().unwrap());
        fx.session.search("cats").unwrap();
        assert!(!fx.session.search_bar_visible().unwrap());
        // Anywhere else it shows
        fx.session.load_news();
        assert!(fx.session.search_bar_visible().unwrap());
    }

    #[test]
    fn switching_engine_persists_and_goes_home() {
        let mut fx = fixture();
        fx.session.set_search_engine("Bing").unwrap();

        assert_eq!(
            fx.log.borrow().last().map(String::as_str),
            Some("https://www.bing.com")
        );
        let persisted = AppSettings::load(&fx.store).unwrap();
        assert_eq!(persisted.search_engine, "Bing");
    }

    #[test]
    fn unknown_engine_falls_back_to_default_home() {
        let mut fx = fixture();
        fx.session.set_search_engine("AltaVista").unwrap();
        assert_eq!(
            fx.log.borrow().last().map(String::as_str),
            Some("https://www.google.com")
        );
    }

    #[test]
    fn theme_change_persists() {
        let mut fx = fixture();
        fx.session.set_theme(Theme::Dark).unwrap();
        assert_eq!(AppSettings::load(&fx.store).unwrap().theme, Theme::Dark);
    }

    #[test]
    fn bookmarking_the_same_page_twice_keeps_one_entry() {
        let mut fx = fixture();
        assert!(fx.session.bookmark_current_page().unwrap());
        assert!(!fx.session.bookmark_current_page().unwrap());
        assert_eq!(fx.session.bookmarks().len(), 1);
        assert_eq!(fx.session.bookmarks()[0].title, "Mock Page");
    }

    #[test]
    fn tabs_open_select_and_close() {
        let mut fx = fixture();
        fx.session.open_tab().unwrap();
        assert_eq!(fx.session.tab_count(), 2);
        assert_eq!(fx.session.active_index(), 1);

        assert!(fx.session.select_tab(0));
        assert!(fx.session.close_tab(1));
        assert_eq!(fx.session.tab_count(), 1);

        // The last tab never closes
        assert!(!fx.session.close_tab(0));
    }

    #[test]
    fn refresh_reaches_the_active_page() {
        let mut fx = fixture();
        fx.session.refresh();
        assert_eq!(fx.reloads.get(), 1);
    }

    #[test]
    fn clear_browsing_data_touches_every_tab() {
        let mut fx = fixture();
        fx.session.clear_browsing_data();
        assert!(fx.cleared.get());
    }

    #[test]
    fn save_current_page_writes_serialized_markup() {
        let mut fx = fixture();
        let dest = fx._dir.path().join("saved.html");
        fx.session.save_current_page(&dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "<html>mock</html>");
    }
}
