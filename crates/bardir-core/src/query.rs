/// Filters for one directory search.
///
/// A query is never mutated while paging; the page offset is supplied
/// separately each time request parameters are built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub city: String,
    /// Numeric county code used by the directory form (e.g. `"57"` for Dallas).
    pub county: String,
    /// Two-letter state abbreviation.
    pub state: String,
    pub zip: String,
    pub name: String,
    pub firm: String,
    pub bar_number: String,
    /// Comma-separated practice-area codes, e.g. `"42,25,47"`.
    pub practice_areas: String,
}

impl SearchQuery {
    /// Returns `true` when no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_empty())
    }

    /// Stable identifier for this filter set, used to scope resume bookkeeping.
    ///
    /// Only non-empty filters contribute, in a fixed order, so two queries
    /// with the same filters always map to the same key.
    #[must_use]
    pub fn progress_key(&self) -> String {
        let parts: Vec<String> = self
            .fields()
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| format!("{k}={}", v.trim()))
            .collect();
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join(";")
        }
    }

    fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("city", &self.city),
            ("county", &self.county),
            ("state", &self.state),
            ("zip", &self.zip),
            ("name", &self.name),
            ("firm", &self.firm),
            ("bar_number", &self.bar_number),
            ("practice_areas", &self.practice_areas),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_is_empty() {
        let query = SearchQuery::default();
        assert!(query.is_empty());
        assert_eq!(query.progress_key(), "all");
    }

    #[test]
    fn progress_key_lists_only_set_filters_in_fixed_order() {
        let query = SearchQuery {
            zip: "75093".to_owned(),
            county: "57".to_owned(),
            ..SearchQuery::default()
        };
        assert!(!query.is_empty());
        assert_eq!(query.progress_key(), "county=57;zip=75093");
    }

    #[test]
    fn progress_key_ignores_surrounding_whitespace() {
        let a = SearchQuery {
            firm: " KoonsFuller ".to_owned(),
            ..SearchQuery::default()
        };
        let b = SearchQuery {
            firm: "KoonsFuller".to_owned(),
            ..SearchQuery::default()
        };
        assert_eq!(a.progress_key(), b.progress_key());
    }
}
