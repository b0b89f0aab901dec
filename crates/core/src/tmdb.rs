use serde::{Deserialize, Serialize};

use crate::page::{MovieResult, PageError, ResultPage};
use crate::search::SearchQuery;

/// Default base URL of the TMDB v3 API
pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";

/// Base URL for poster images at a list-friendly width
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w185";

/// Response of `GET /search/movie`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TmdbSearchResponse {
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub results: Vec<MovieResult>,
}

/// Convert a TMDB search response into a validated result page
pub fn transform_search_response(response: TmdbSearchResponse) -> Result<ResultPage, PageError> {
    ResultPage::new(
        response.page,
        response.total_pages,
        response.total_results,
        response.results,
    )
}

/// Build the query string pairs for `GET /search/movie`
pub fn search_query_params(
    api_key: &str,
    query: &SearchQuery,
    language: Option<&str>,
    include_adult: bool,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("api_key", api_key.to_string()),
        ("query", query.text().to_string()),
        ("page", query.page().to_string()),
        ("include_adult", include_adult.to_string()),
    ];

    if let Some(language) = language.filter(|l| !l.is_empty()) {
        params.push(("language", language.to_string()));
    }

    params
}

/// Full poster URL for a movie, if it has one
pub fn poster_url(movie: &MovieResult) -> Option<String> {
    movie
        .poster_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| format!("{TMDB_IMAGE_BASE}/{}", p.trim_start_matches('/')))
}
