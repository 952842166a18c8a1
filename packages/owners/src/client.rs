//! HTTP client for the state corporations and charities filing API.
//!
//! Two endpoints are used: business information by id, and the advanced
//! business search filtered by principal name (paged, 100 hits per page).

use std::time::Duration;

use beps_owners_models::{BusinessDetails, BusinessRef, BusinessSearchResult, PrincipalRow};

use crate::OwnersError;
use crate::principals::rows_for_business;

/// Production registry API.
pub const DEFAULT_BASE_URL: &str = "https://cfda.sos.wa.gov";

const BUSINESS_INFO_PATH: &str = "/api/BusinessSearch/BusinessInformation";
const PRINCIPAL_SEARCH_PATH: &str = "/api/BusinessSearch/GetAdvanceBusinessSearchList";
const REGISTRY_SITE: &str = "https://ccfs.sos.wa.gov";
const SEARCH_PAGE_SIZE: usize = 100;

/// Client for business and principal lookups.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
    delay_ms: Option<u64>,
}

impl RegistryClient {
    /// Creates a client against [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`OwnersError::Http`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, OwnersError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("beps/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_owned(),
            delay_ms: None,
        })
    }

    /// Points the client at another host, e.g. a mirror or test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        base_url.trim_end_matches('/').clone_into(&mut self.base_url);
        self
    }

    /// Waits `ms` milliseconds between consecutive requests.
    #[must_use]
    pub const fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = Some(ms);
        self
    }

    async fn pause(&self) {
        if let Some(ms) = self.delay_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    async fn json<T: serde::de::DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, OwnersError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(OwnersError::Status {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetches the registry record of one business.
    ///
    /// # Errors
    ///
    /// * [`OwnersError::Http`] on a transport failure or unexpected body
    /// * [`OwnersError::Status`] on a non-success response
    pub async fn business_details(&self, business_id: &str) -> Result<BusinessDetails, OwnersError> {
        log::debug!("Fetching business details for {business_id}");
        let request = self
            .client
            .get(format!("{}{BUSINESS_INFO_PATH}", self.base_url))
            .query(&[("businessID", business_id)]);
        Self::json(request).await
    }

    /// Fetches one page (1-based) of businesses listing `principal_name`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::business_details`].
    pub async fn search_principal_page(
        &self,
        principal_name: &str,
        page: u32,
    ) -> Result<Vec<BusinessSearchResult>, OwnersError> {
        log::debug!("Searching principal {principal_name:?}, page {page}");
        let request = self
            .client
            .post(format!("{}{PRINCIPAL_SEARCH_PATH}", self.base_url))
            .header("Accept-Language", "en-US,en;q=0.8")
            .header("Referer", format!("{REGISTRY_SITE}/"))
            .header("Origin", REGISTRY_SITE)
            .form(&principal_search_form(principal_name, page));

        let results: Option<Vec<BusinessSearchResult>> = Self::json(request).await?;
        Ok(results.unwrap_or_default())
    }

    /// Fetches every page of businesses listing `principal_name`.
    ///
    /// Paging stops at the first page shorter than the page size.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Self::search_principal_page`].
    pub async fn search_principal(
        &self,
        principal_name: &str,
    ) -> Result<Vec<BusinessSearchResult>, OwnersError> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let results = self.search_principal_page(principal_name, page).await?;
            let full_page = results.len() == SEARCH_PAGE_SIZE;
            all.extend(results);

            if !full_page {
                break;
            }
            page += 1;
            self.pause().await;
        }

        log::info!(
            "Principal {principal_name:?}: {} businesses over {page} page(s)",
            all.len()
        );
        Ok(all)
    }

    /// Looks up the principals of every business in `businesses`.
    ///
    /// Businesses are fetched one at a time in input order. A business with
    /// no registered principals still contributes one row.
    ///
    /// # Errors
    ///
    /// Returns the first lookup error; no partial table is returned.
    pub async fn principals_for(
        &self,
        businesses: &[BusinessRef],
    ) -> Result<Vec<PrincipalRow>, OwnersError> {
        let mut rows = Vec::new();

        for (idx, business) in businesses.iter().enumerate() {
            if idx > 0 {
                self.pause().await;
            }
            let details = self.business_details(&business.business_id).await?;
            rows.extend(rows_for_business(&details, business));

            if (idx + 1) % 25 == 0 {
                log::info!("Fetched {} of {} businesses", idx + 1, businesses.len());
            }
        }

        log::info!(
            "Collected {} principal rows for {} businesses",
            rows.len(),
            businesses.len()
        );
        Ok(rows)
    }
}

/// Form body of the advanced search, filtered to principals only.
fn principal_search_form(principal_name: &str, page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("Type", "Principal".to_owned()),
        ("BusinessStatusID", "0".to_owned()),
        ("BusinessTypeID", "0".to_owned()),
        ("PrincipalName", principal_name.to_owned()),
        ("IsSearch", "true".to_owned()),
        ("IsShowAdvanceSearch", "true".to_owned()),
        ("PageID", page.to_string()),
        ("PageCount", SEARCH_PAGE_SIZE.to_string()),
    ]
}
