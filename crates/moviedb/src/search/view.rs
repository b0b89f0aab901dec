use std::cell::{Cell, RefCell};

use colored::Colorize;
use moviedb_core::page::{release_year, ResultPage};
use moviedb_core::search::{MessageKey, PaginationControl, Visibility};
use moviedb_core::tmdb::poster_url;
use serde::Serialize;

use crate::presenter::SearchView;
use crate::prelude::{eprintln, print, println, *};

/// JSON document printed for every displayed page
#[derive(Debug, Serialize)]
pub struct PageOutput<'a> {
    pub page: &'a ResultPage,
    pub pagination: &'a PaginationControl,
}

/// [`SearchView`] that renders to the terminal
///
/// Results are printed as a table (or buffered until the pagination control
/// arrives in JSON mode), toasts go to stderr.
#[derive(Debug, Default)]
pub struct TerminalView {
    json: bool,
    pending: RefCell<Option<ResultPage>>,
    pages_shown: Cell<usize>,
    last_toast: Cell<Option<MessageKey>>,
}

impl TerminalView {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            ..Default::default()
        }
    }

    pub fn pages_shown(&self) -> usize {
        self.pages_shown.get()
    }

    pub fn last_toast(&self) -> Option<MessageKey> {
        self.last_toast.get()
    }
}

impl SearchView for TerminalView {
    fn show_toast(&self, message: MessageKey) {
        self.last_toast.set(Some(message));
        eprintln!("{}", message.default_text().yellow().bold());
    }

    fn update_results_display(&self, page: &ResultPage) {
        self.last_toast.set(None);
        self.pages_shown.set(self.pages_shown.get() + 1);

        if self.json {
            *self.pending.borrow_mut() = Some(page.clone());
        } else {
            print!("{}", format_page_text(page));
        }
    }

    fn set_pagination_control(&self, query: &str, visibility: Visibility, next_page: u32) {
        let control = PaginationControl {
            query: query.to_string(),
            visibility,
            next_page,
        };

        if !self.json {
            print!("{}", format_navigation(&control));
            return;
        }

        if let Some(page) = self.pending.borrow_mut().take() {
            match format_page_json(&page, &control) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("{}", f!("Failed to render JSON: {e}").red()),
            }
        }
    }
}

/// Render one page of results as a table with a header line
pub fn format_page_text(page: &ResultPage) -> String {
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}\n",
        format!(
            "MOVIES (Page {} of {}, {} results)",
            page.page_number,
            page.total_pages.max(1),
            page.total_results
        )
        .bright_cyan()
        .bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if page.is_empty() {
        result.push_str(&format!("\n{}\n", "No movies found.".yellow()));
        return result;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Title", "Year", "Rating", "ID", "Poster"]);

    for movie in &page.items {
        let title = movie.title.as_deref().unwrap_or("(No title)");
        let year = release_year(movie)
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        let rating = movie
            .vote_average
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "-".to_string());
        let poster = poster_url(movie).unwrap_or_else(|| "-".to_string());

        table.add_row(prettytable::row![title, year, rating, movie.id, poster]);
    }

    result.push('\n');
    result.push_str(&table.to_string());
    result
}

/// Render the next-page hint for a pagination control
pub fn format_navigation(control: &PaginationControl) -> String {
    match control.visibility {
        Visibility::Visible => format!(
            "\n{}: {}\n",
            "Next page".green(),
            format!(
                "moviedb search {:?} --page {}",
                control.query, control.next_page
            )
            .cyan()
        ),
        Visibility::Hidden => format!("\n{}\n", "No more pages.".bright_black()),
    }
}

pub fn format_page_json(page: &ResultPage, control: &PaginationControl) -> Result<String> {
    serde_json::to_string_pretty(&PageOutput {
        page,
        pagination: control,
    })
    .map_err(|e| eyre!("JSON serialization failed: {}", e))
}
