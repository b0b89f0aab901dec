//! Search query validation and pagination affordances
//!
//! Pure functions used by the search presenter to decide what a view
//! should show. Nothing here touches the network or the view itself.

use serde::Serialize;

use crate::page::ResultPage;

/// Error returned when a query cannot be dispatched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Search text is empty")]
    EmptyText,

    #[error("Page numbers are 1-based, got {0}")]
    InvalidPage(u32),
}

/// A validated search request
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    page: u32,
}

impl SearchQuery {
    /// Validate and build a query. Text that is blank once trimmed is
    /// rejected; otherwise it is kept exactly as given.
    pub fn new(text: &str, page: u32) -> Result<Self, QueryError> {
        if text.trim().is_empty() {
            return Err(QueryError::EmptyText);
        }
        if page == 0 {
            return Err(QueryError::InvalidPage(page));
        }

        Ok(Self {
            text: text.to_string(),
            page,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Identifiers of the user-facing notifications the presenter can raise
///
/// Views resolve them to localized text.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    SearchErrorNoText,
    SearchErrorText,
}

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::SearchErrorNoText => "search_error_no_text",
            MessageKey::SearchErrorText => "search_error_text",
        }
    }

    /// English fallback for views without their own translations
    pub fn default_text(&self) -> &'static str {
        match self {
            MessageKey::SearchErrorNoText => "Please enter a movie title to search for",
            MessageKey::SearchErrorText => "The search failed, please try again",
        }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// State of the "load next page" affordance after a page was displayed
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PaginationControl {
    pub query: String,
    pub visibility: Visibility,
    pub next_page: u32,
}

impl PaginationControl {
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }
}

/// Compute the next-page affordance for a displayed page
///
/// Visible and pointing at `page_number + 1` while more pages remain.
/// Otherwise hidden, with `next_page` left at the current page.
pub fn pagination_control(query: &SearchQuery, page: &ResultPage) -> PaginationControl {
    if page.has_next_page() {
        PaginationControl {
            query: query.text().to_string(),
            visibility: Visibility::Visible,
            next_page: page.page_number + 1,
        }
    } else {
        PaginationControl {
            query: query.text().to_string(),
            visibility: Visibility::Hidden,
            next_page: page.page_number,
        }
    }
}
