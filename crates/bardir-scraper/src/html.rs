//! Small helpers shared by the listing, address and detail parsers.

use scraper::node::Node;
use scraper::{ElementRef, Selector};

/// Parses a selector literal. Only called with constants from this crate.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// All descendant text of `el`, trimmed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_owned()
}

/// Trimmed text of the first element under `scope` matching `sel`, or empty.
pub(crate) fn first_text(scope: ElementRef<'_>, sel: &Selector) -> String {
    scope.select(sel).next().map(element_text).unwrap_or_default()
}

/// Text of a single child node as a browser would render it on its own line:
/// text nodes as-is, elements by their descendant text, everything else empty.
pub(crate) fn child_text(node: &Node, as_element: Option<ElementRef<'_>>) -> String {
    match node {
        Node::Text(text) => {
            let text: &str = text;
            text.to_owned()
        }
        Node::Element(_) => as_element.map(|e| e.text().collect()).unwrap_or_default(),
        _ => String::new(),
    }
}
