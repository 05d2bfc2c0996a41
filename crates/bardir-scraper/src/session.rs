//! Listing-page requests against the directory search form.

use bardir_core::{DirectoryPage, SearchQuery};

use crate::error::ScraperError;
use crate::params::{build_request, RequestParameters};
use crate::transport::Transport;

/// Issues search-form requests for one directory.
///
/// The session holds no per-query state: every call builds its parameters
/// from the query and page ordinal it is given.
#[derive(Debug, Clone)]
pub struct SearchSession {
    transport: Transport,
    search_url: String,
    page_size: u32,
}

impl SearchSession {
    /// Creates a session that posts to `search_url` with `page_size` entries per page.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `search_url` does not parse.
    pub fn new(
        transport: Transport,
        search_url: &str,
        page_size: u32,
    ) -> Result<Self, ScraperError> {
        reqwest::Url::parse(search_url).map_err(|e| ScraperError::InvalidUrl {
            url: search_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            transport,
            search_url: search_url.to_owned(),
            page_size: page_size.max(1),
        })
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Builds the form fields for `page` of `query`.
    #[must_use]
    pub fn build_request(&self, query: &SearchQuery, page: u32) -> RequestParameters {
        build_request(query, page, self.page_size)
    }

    /// Posts `params` to the search form and returns the raw page body.
    ///
    /// # Errors
    ///
    /// Propagates [`Transport::post_form`] errors once retries are exhausted.
    pub async fn fetch(&self, params: &RequestParameters) -> Result<String, ScraperError> {
        self.transport
            .post_form(&self.search_url, params.pairs())
            .await
    }

    /// Fetches listing page `page` of `query`.
    ///
    /// # Errors
    ///
    /// See [`SearchSession::fetch`].
    pub async fn fetch_page(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<DirectoryPage, ScraperError> {
        let params = self.build_request(query, page);
        tracing::debug!(page, "fetching listing page");
        let content = self.fetch(&params).await?;
        Ok(DirectoryPage {
            ordinal: page,
            content,
        })
    }
}
