//! Address block decomposition.
//!
//! Listing entries render the address in one of two shapes:
//!
//! ```text
//! <p class="address"><span>123 Main St</span><span>Dallas, TX&nbsp;75201</span></p>
//! <p class="address">123 Main St<br>Dallas, TX&nbsp;75201</p>
//! ```
//!
//! In the first, each child is a rendered line. In the second the second
//! child is the `<br>` and renders empty, so the lines are taken from the raw
//! text nodes instead.

use std::sync::LazyLock;

use bardir_core::Address;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::html::{child_text, selector};

static ADDRESS: LazyLock<Selector> = LazyLock::new(|| selector(".address"));

/// Splits an address element into street, city, state and postal code.
///
/// Street and city are recovered from either layout; state and postal code
/// are empty when the entry stops at the city.
#[must_use]
pub fn parse_address(el: ElementRef<'_>) -> Address {
    let mut lines: Vec<String> = el
        .children()
        .filter_map(|child| {
            let text = child_text(child.value(), ElementRef::wrap(child));
            let text = text.trim();
            // Whitespace between tags is formatting, not a line.
            if text.is_empty() && matches!(child.value(), Node::Text(_)) {
                None
            } else {
                Some(text.to_owned())
            }
        })
        .collect();

    if lines.get(1).is_none_or(String::is_empty) {
        lines = el
            .text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
    }

    split_lines(&lines)
}

/// Parses an HTML fragment and decomposes its first `.address` element,
/// or the fragment itself when no such element is present.
#[must_use]
pub fn parse_address_fragment(html: &str) -> Address {
    let fragment = Html::parse_fragment(html);
    let el = fragment
        .select(&ADDRESS)
        .next()
        .unwrap_or_else(|| fragment.root_element());
    parse_address(el)
}

fn split_lines(lines: &[String]) -> Address {
    let street = lines.first().map(|s| s.trim().to_owned()).unwrap_or_default();
    let rest = lines.get(1).map_or("", String::as_str);

    let (city, state_zip) = match rest.split_once(',') {
        Some((city, remainder)) => (city, Some(remainder)),
        None => (rest, None),
    };
    let (state, zip) = state_zip.map(split_state_zip).unwrap_or_default();

    Address {
        street,
        city: city.trim().to_owned(),
        state,
        zip,
    }
}

/// Splits `"TX\u{a0}75201"` at the non-breaking space, falling back to the
/// last ordinary space for pages that render a plain one.
fn split_state_zip(s: &str) -> (String, String) {
    if let Some((state, zip)) = s.split_once('\u{a0}') {
        return (state.trim().to_owned(), zip.trim().to_owned());
    }
    let s = s.trim();
    match s.rsplit_once(' ') {
        Some((state, zip)) => (state.trim().to_owned(), zip.trim().to_owned()),
        None => (s.to_owned(), String::new()),
    }
}
