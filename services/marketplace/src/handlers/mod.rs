pub mod admin;
pub mod cart;
pub mod health;
pub mod orders;
pub mod phones;
pub mod users;
pub mod ws;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use phonemart_domain::listing::ListingSortBy;
use phonemart_domain::pagination::PageRequest;

use crate::error::MarketplaceError;

/// Parse a kebab-case query string; an absent query yields the defaults.
pub(crate) fn parse_query<T>(raw_query: Option<String>) -> Result<T, MarketplaceError>
where
    T: DeserializeOwned + Default,
{
    raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| MarketplaceError::MissingData)
        .map(Option::unwrap_or_default)
}

/// Parse an optional enum-valued query parameter; unknown values are a 400.
pub(crate) fn parse_opt<T: std::str::FromStr>(
    value: Option<&str>,
) -> Result<Option<T>, MarketplaceError> {
    value
        .map(str::parse)
        .transpose()
        .map_err(|_| MarketplaceError::MissingData)
}

/// Paging and ordering shared by every listing endpoint.
#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ListingListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub sort_by: Option<String>,
    pub status: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl ListingListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }

    pub fn sort_by(&self) -> ListingSortBy {
        self.sort_by
            .as_deref()
            .and_then(ListingSortBy::from_kebab_case)
            .unwrap_or_default()
    }
}
