use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use kestrel_browser::headless::HeadlessPage;
use kestrel_browser::page::PageSurface;
use kestrel_browser::search::SearchDirectory;
use kestrel_browser::session::{BrowserSession, PageFactory};
use kestrel_browser::settings::{SettingsStore, Theme};

const ORGANIZATION: &str = "kestrel";
const APPLICATION: &str = "browser";
const ENGINES_FILE: &str = "search_engines.json";

fn main() -> ExitCode {
    env_logger::init();

    // A broken engine config is fatal; a missing one falls back to the
    // compiled-in directory.
    let engines_path = Path::new(ENGINES_FILE);
    let directory = if engines_path.exists() {
        match SearchDirectory::load(engines_path) {
            Ok(directory) => directory,
            Err(error) => {
                eprintln!("{}", error);
                return ExitCode::FAILURE;
            }
        }
    } else {
        SearchDirectory::builtin()
    };

    let settings_store = match SettingsStore::open(ORGANIZATION, APPLICATION) {
        Ok(store) => store,
        Err(error) => {
            eprintln!("{}", error);
            return ExitCode::FAILURE;
        }
    };

    let factory: PageFactory = Box::new(|| Box::new(HeadlessPage::new()) as Box<dyn PageSurface>);
    let mut session = match BrowserSession::start(directory, settings_store, factory) {
        Ok(session) => session,
        Err(error) => {
            eprintln!("{}", error);
            return ExitCode::FAILURE;
        }
    };

    println!("kestrel-browser — type `help` for commands");
    print_location(&session);
    prompt();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() {
            prompt();
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "quit" | "exit" => break,
            "help" => print_help(),
            "home" => report(session.load_home()),
            "news" => {
                session.load_news();
                print_location(&session);
            }
            "refresh" => {
                session.refresh();
                print_location(&session);
            }
            "back" => {
                session.back();
                print_location(&session);
            }
            "forward" => {
                session.forward();
                print_location(&session);
            }
            "search" => {
                if rest.is_empty() {
                    println!("usage: search <query>");
                } else {
                    report(session.search(rest));
                    print_location(&session);
                }
            }
            "new-tab" => report(session.open_tab()),
            "tabs" => {
                for index in 0..session.tab_count() {
                    let marker = if index == session.active_index() { "*" } else { " " };
                    println!("{} [{}]", marker, index);
                }
            }
            "tab" => match rest.parse::<usize>() {
                Ok(index) => {
                    if session.select_tab(index) {
                        print_location(&session);
                    } else {
                        println!("no such tab");
                    }
                }
                Err(_) => println!("usage: tab <index>"),
            },
            "close" => match rest.parse::<usize>() {
                Ok(index) => {
                    if session.close_tab(index) {
                        println!("closed tab {}", index);
                    } else {
                        println!("cannot close that tab");
                    }
                }
                Err(_) => println!("usage: close <index>"),
            },
            "bookmark" => match session.bookmark_current_page() {
                Ok(true) => println!("bookmarked"),
                Ok(false) => println!("already bookmarked"),
                Err(error) => println!("error: {}", error),
            },
            "bookmarks" => {
                for (index, bookmark) in session.bookmarks().iter().enumerate() {
                    println!("[{}] {}", index, bookmark.display_label());
                }
            }
            "unbookmark" => match rest.parse::<usize>() {
                Ok(index) => match session.remove_bookmark_at(index) {
                    Ok(Some(bookmark)) => println!("removed {}", bookmark.display_label()),
                    Ok(None) => println!("no bookmark at {}", index),
                    Err(error) => println!("error: {}", error),
                },
                Err(_) => println!("usage: unbookmark <index>"),
            },
            "engines" => {
                let active = session.settings().search_engine.clone();
                for name in session.directory().engine_names() {
                    let marker = if name == active { "*" } else { " " };
                    println!("{} {}", marker, name);
                }
            }
            "engine" => {
                if rest.is_empty() {
                    println!("usage: engine <name>");
                } else {
                    report(session.set_search_engine(rest));
                    print_location(&session);
                }
            }
            "theme" => match rest {
                "light" => report(session.set_theme(Theme::Light)),
                "dark" => report(session.set_theme(Theme::Dark)),
                _ => println!("usage: theme <light|dark>"),
            },
            "save" => {
                if rest.is_empty() {
                    println!("usage: save <path>");
                } else {
                    report(session.save_current_page(Path::new(rest)));
                }
            }
            "download" => {
                let mut parts = rest.splitn(2, ' ');
                match (parts.next(), parts.next()) {
                    (Some(url), Some(dest)) if !url.is_empty() => {
                        run_download(&session, url, dest.trim());
                    }
                    _ => println!("usage: download <url> <path>"),
                }
            }
            "clear" => {
                session.clear_browsing_data();
                println!("cookies and history cleared");
            }
            other => println!("unknown command `{}` — try `help`", other),
        }
        prompt();
    }

    ExitCode::SUCCESS
}

fn run_download(session: &BrowserSession, url: &str, dest: &str) {
    let task = session.download_page(url, &PathBuf::from(dest));
    let outcome = task.wait(|pct| {
        print!("\r{:>3}%", pct);
        let _ = io::stdout().flush();
    });
    println!();
    match outcome {
        Ok(bytes) => println!("saved {} bytes to {}", bytes, dest),
        Err(error) => println!("download failed: {}", error),
    }
}

fn print_location(session: &BrowserSession) {
    let page = session.active_page();
    let title = page.current_title();
    if title.is_empty() {
        println!("> {}", page.current_url());
    } else {
        println!("> {} — {}", title, page.current_url());
    }
}

fn report<T>(outcome: Result<T, kestrel_browser::session::ShellError>) {
    if let Err(error) = outcome {
        println!("error: {}", error);
    }
}

fn prompt() {
    print!("kestrel> ");
    let _ = io::stdout().flush();
}

fn print_help() {
    println!(
        "\
navigation:  home | news | refresh | back | forward | search <query>
tabs:        new-tab | tabs | tab <i> | close <i>
bookmarks:   bookmark | bookmarks | unbookmark <i>
settings:    engines | engine <name> | theme <light|dark> | clear
pages:       save <path> | download <url> <path>
other:       help | quit"
    );
}
