/// One fetched listing page. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPage {
    /// 0-based page ordinal.
    pub ordinal: u32,
    pub content: String,
}

/// A postal address split out of a listing entry.
///
/// `state` and `zip` are empty when the entry only renders street and city.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.street.is_empty() && self.city.is_empty() && self.state.is_empty() && self.zip.is_empty()
    }
}

/// Fields available directly on a listing page.
///
/// `last_name` and `detail_url` are always non-empty; the parser drops
/// entries that lack either.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRecord {
    pub prefix: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub suffix: String,
    /// Nickname shown alongside the legal name, without its quotes.
    pub familiar_name: String,
    pub firm: String,
    pub telephone: String,
    pub address: Address,
    /// Detail page link, relative to the directory's base origin.
    pub detail_url: String,
}

/// Fields that require fetching the member's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRecord {
    /// Bar card number; the directory's unique key for a member.
    pub bar_number: String,
    pub license_date: String,
    pub practice_areas: Option<String>,
}

/// A summary and its detail, tagged with the listing page it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecord {
    pub summary: SummaryRecord,
    pub detail: DetailRecord,
    pub page: u32,
}

impl MergedRecord {
    #[must_use]
    pub fn new(summary: SummaryRecord, detail: DetailRecord, page: u32) -> Self {
        Self {
            summary,
            detail,
            page,
        }
    }

    #[must_use]
    pub fn bar_number(&self) -> &str {
        &self.detail.bar_number
    }
}
