use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Error raised when a result page violates its pagination invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("Page numbers are 1-based, got {0}")]
    InvalidPageNumber(u32),

    #[error("Page {page_number} is past the last page ({total_pages})")]
    PastLastPage { page_number: u32, total_pages: u32 },
}

/// A single movie returned by a search
///
/// The presenter treats this as an opaque payload; only views and
/// formatters look at the individual fields.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct MovieResult {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub adult: bool,
}

/// One page of paginated search results
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResultPage {
    pub page_number: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub items: Vec<MovieResult>,
}

impl ResultPage {
    /// Build a page, checking `page_number >= 1` and, when the query has any
    /// pages at all, `page_number <= total_pages`.
    pub fn new(
        page_number: u32,
        total_pages: u32,
        total_results: u64,
        items: Vec<MovieResult>,
    ) -> Result<Self, PageError> {
        if page_number == 0 {
            return Err(PageError::InvalidPageNumber(page_number));
        }

        if total_pages > 0 && page_number > total_pages {
            return Err(PageError::PastLastPage {
                page_number,
                total_pages,
            });
        }

        Ok(Self {
            page_number,
            total_pages,
            total_results,
            items,
        })
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Extract the release year from a `YYYY-MM-DD` release date
///
/// TMDB sends an empty string for movies without a known date.
pub fn release_year(movie: &MovieResult) -> Option<i32> {
    let date = movie.release_date.as_deref()?.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}
