use async_trait::async_trait;
use moviedb_core::page::ResultPage;

use crate::error::Error;

/// Remote movie search backend
///
/// Page numbering is 1-based and `total_pages` reflects the pages available
/// for the query at the time of the response.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Fetch one page of results for `query`
    async fn fetch(&self, api_key: &str, query: &str, page: u32) -> Result<ResultPage, Error>;
}
