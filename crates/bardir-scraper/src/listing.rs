//! Listing-page parser: one [`SummaryRecord`] per `article.lawyer` entry.

use std::sync::LazyLock;

use bardir_core::SummaryRecord;
use scraper::{ElementRef, Html, Selector};

use crate::address::parse_address;
use crate::html::{element_text, first_text, selector};

static ENTRY: LazyLock<Selector> = LazyLock::new(|| selector("article.lawyer"));
static PREFIX: LazyLock<Selector> = LazyLock::new(|| selector("span.honorific-prefix"));
static GIVEN_NAME: LazyLock<Selector> = LazyLock::new(|| selector("span.given-name"));
static ADDITIONAL_NAME: LazyLock<Selector> = LazyLock::new(|| selector("span.additional-name"));
static FAMILY_NAME: LazyLock<Selector> = LazyLock::new(|| selector("span.family-name"));
static SUFFIX: LazyLock<Selector> = LazyLock::new(|| selector("span.honorific-suffix"));
static FIRM: LazyLock<Selector> = LazyLock::new(|| selector("h5"));
static ADDRESS: LazyLock<Selector> = LazyLock::new(|| selector("p.address"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Parses a listing page into summary records, in page order.
///
/// An empty result means the directory has no more pages. Entries without a
/// family name or a detail link are dropped and logged; they never fail the
/// page.
#[must_use]
pub fn parse_listing(html: &str) -> Vec<SummaryRecord> {
    let document = Html::parse_document(html);
    document
        .select(&ENTRY)
        .enumerate()
        .filter_map(|(idx, entry)| {
            let record = parse_entry(entry);
            if record.is_none() {
                tracing::warn!(entry = idx, "skipping listing entry without family name or detail link");
            }
            record
        })
        .collect()
}

fn parse_entry(entry: ElementRef<'_>) -> Option<SummaryRecord> {
    let last_name = first_text(entry, &FAMILY_NAME);
    if last_name.is_empty() {
        return None;
    }
    let detail_url = detail_link(entry)?;

    let given: Vec<String> = entry.select(&GIVEN_NAME).map(element_text).collect();
    let (first_name, middle_name) = split_given_names(&given);

    let address = entry
        .select(&ADDRESS)
        .next()
        .map(parse_address)
        .unwrap_or_default();

    Some(SummaryRecord {
        prefix: first_text(entry, &PREFIX),
        first_name,
        middle_name,
        last_name,
        suffix: first_text(entry, &SUFFIX),
        familiar_name: strip_familiar_delimiters(&first_text(entry, &ADDITIONAL_NAME)),
        firm: first_text(entry, &FIRM),
        telephone: telephone(entry),
        address,
        detail_url,
    })
}

/// Resolves given and middle name from the `given-name` spans.
///
/// The directory renders compound given names two ways: as two separate
/// spans, or as one span holding both words. Both must be handled.
pub(crate) fn split_given_names(given: &[String]) -> (String, String) {
    match given {
        [] => (String::new(), String::new()),
        [only] => match only.split_once(' ') {
            Some((first, middle)) => (first.to_owned(), middle.trim().to_owned()),
            None => (only.clone(), String::new()),
        },
        [first, middle, ..] => (first.clone(), middle.clone()),
    }
}

/// `"Bubba"` or `(Bubba)` → `Bubba`.
fn strip_familiar_delimiters(raw: &str) -> String {
    raw.trim_matches(|c: char| matches!(c, '"' | '\'' | '(' | ')' | '\u{201c}' | '\u{201d}'))
        .trim()
        .to_owned()
}

fn telephone(entry: ElementRef<'_>) -> String {
    entry
        .select(&LINK)
        .find(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| href.to_ascii_lowercase().contains("tel:"))
        })
        .map(|a| {
            let text = element_text(a);
            text.strip_prefix("Tel:").unwrap_or(&text).trim().to_owned()
        })
        .unwrap_or_default()
}

fn detail_link(entry: ElementRef<'_>) -> Option<String> {
    entry
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| {
            let lower = href.to_ascii_lowercase();
            !href.is_empty()
                && !href.starts_with('#')
                && !lower.starts_with("tel:")
                && !lower.starts_with("mailto:")
                && !lower.starts_with("javascript:")
        })
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
