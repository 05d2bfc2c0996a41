//! Form parameters for the directory search endpoint.
//!
//! The endpoint is sensitive to which fields are present: every request must
//! carry the full recognised field set, and cursor requests (page ≥ 1) carry
//! an extra block of blank sort/filter fields plus the pagination cursor.
//! [`build_request`] rebuilds the whole set from scratch on every call.

use bardir_core::SearchQuery;

/// An immutable, ordered set of form fields for one search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    pairs: Vec<(&'static str, String)>,
}

impl RequestParameters {
    /// Returns the value sent for `field`, if the field is part of the request.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == field)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Field/value pairs in send order.
    #[must_use]
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}

/// Blank fields the site expects on every cursor request.
const PAGINATION_BLANKS: [&str; 11] = [
    "SortName",
    "FirstName",
    "LastName",
    "InformalName",
    "Region",
    "Country",
    "FilterName",
    "ShowOnlyTypes",
    "BarDistrict",
    "TYLADistrict",
    "Start",
];

/// Builds the form fields for `page` (0-based) of `query`.
///
/// Page 0 sends the filters and fixed control fields only. Later pages send
/// the pagination block as well: `MaxNumber` is the page-size cap, and
/// `Page`/`Next` hold the 1-based offset of the first entry on the requested
/// page while `Prev` holds the offset of the page before it. The name filter
/// is sent blank on cursor requests.
#[must_use]
pub fn build_request(query: &SearchQuery, page: u32, page_size: u32) -> RequestParameters {
    let paginated = page > 0;
    let name = if paginated {
        String::new()
    } else {
        query.name.clone()
    };

    let mut pairs: Vec<(&'static str, String)> = vec![
        ("PracticeArea", query.practice_areas.clone()),
        ("PPlCityName", query.city.clone()),
        ("County", query.county.clone()),
        ("State", query.state.clone()),
        ("Zip", query.zip.clone()),
        ("Name", name),
        ("CompanyName", query.firm.clone()),
        ("BarCardNumber", query.bar_number.clone()),
        ("ShowPrinter", "1".to_owned()),
        ("Submitted", "1".to_owned()),
        ("Find", "0".to_owned()),
    ];

    if paginated {
        let offset = u64::from(page) * u64::from(page_size) + 1;
        let prev = u64::from(page - 1) * u64::from(page_size) + 1;
        pairs.extend(PAGINATION_BLANKS.iter().map(|f| (*f, String::new())));
        pairs.push(("MaxNumber", page_size.to_string()));
        pairs.push(("Page", offset.to_string()));
        pairs.push(("Prev", prev.to_string()));
        pairs.push(("Next", offset.to_string()));
        pairs.push(("ButtonName", "Page".to_owned()));
    }

    RequestParameters { pairs }
}
