use std::sync::Arc;

use moviedb_core::search::MessageKey;

use crate::presenter::SearchPresenter;
use crate::prelude::{eprintln, *};
use crate::tmdb::{create_tmdb_client, TmdbConfig, TmdbSearchService};

pub mod view;

pub use view::TerminalView;

#[derive(Debug, clap::Args, Clone)]
pub struct SearchOptions {
    /// Movie title to search for
    #[arg(value_name = "QUERY", default_value = "")]
    pub query: String,

    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: u32,

    /// Number of pages to show, following the next-page link
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// TMDB API key (overrides TMDB_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// TMDB API base URL (overrides TMDB_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Result language, e.g. en-US (overrides TMDB_LANGUAGE)
    #[arg(long)]
    pub language: Option<String>,
}

pub async fn run(options: SearchOptions, global: crate::Global) -> Result<()> {
    let config = TmdbConfig::from_env()
        .context("Failed to load TMDB configuration")?
        .with_overrides(
            options.api_key.clone(),
            options.base_url.clone(),
            options.language.clone(),
        )
        .validate()?;

    if global.verbose {
        eprintln!("TMDB API Base: {}", config.base_url);
        eprintln!();
    }

    let client = create_tmdb_client(&config)?;
    let service = Arc::new(TmdbSearchService::new(client, &config));

    let view = Arc::new(TerminalView::new(options.json));
    let mut presenter = SearchPresenter::new(service, config.api_key.clone());
    presenter.attach(&view);

    presenter.search(&options.query, options.page);
    log::debug!("{} search request(s) in flight", presenter.in_flight());
    presenter.settle().await;

    let mut shown = 1;
    while shown < options.pages && view.last_toast().is_none() && presenter.search_next_page() {
        presenter.settle().await;
        shown += 1;
    }

    presenter.detach();

    if global.verbose {
        if let Some(query) = presenter.last_query() {
            eprintln!("Last request: {:?} page {}", query.text(), query.page());
        }
        if let Some(control) = presenter.pagination().filter(|c| c.is_visible()) {
            eprintln!("Next page available: {}", control.next_page);
        }
        eprintln!("Displayed {} page(s)", view.pages_shown());
    }

    match view.last_toast() {
        Some(MessageKey::SearchErrorNoText) => Err(eyre!("No search text given")),
        Some(MessageKey::SearchErrorText) => Err(eyre!("Search for {:?} failed", options.query)),
        None => Ok(()),
    }
}
