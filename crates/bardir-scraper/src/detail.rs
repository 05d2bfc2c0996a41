//! Detail-page enrichment.
//!
//! The listing page does not carry the bar card number, license date or
//! practice areas; those are read from each member's detail page. How the
//! fields are located is behind [`DetailExtractor`] so the positional
//! heuristic can be replaced without touching callers.

use std::sync::LazyLock;

use bardir_core::DetailRecord;
use reqwest::Url;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::html::{child_text, element_text, selector};
use crate::transport::Transport;

static ENTRY: LazyLock<Selector> = LazyLock::new(|| selector("article.lawyer"));
static LABEL: LazyLock<Selector> = LazyLock::new(|| selector("strong"));
static AREAS: LazyLock<Selector> = LazyLock::new(|| selector("p.areas"));

/// Heading and markup residue stripped from the practice-areas block.
const PRACTICE_AREA_NOISE: [&str; 5] = ["Practice Areas:", "\n", "\r", "<strong>", "</strong>"];

/// Turns a fetched detail page into a [`DetailRecord`].
pub trait DetailExtractor {
    /// Extracts detail fields from `html`, fetched from `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingField`] when the bar card number cannot
    /// be located. The error concerns this record only.
    fn extract(&self, url: &str, html: &str) -> Result<DetailRecord, ScraperError>;
}

/// Locates each field by its label text and reads the node right after it.
///
/// Detail pages render fields as `<strong>Bar Card Number:</strong> 24059643`.
/// Labels match case-insensitively as substrings of the `<strong>` text.
/// This is positional and breaks if the page layout changes.
#[derive(Debug, Clone)]
pub struct LabelSiblingExtractor {
    pub bar_number_label: String,
    pub license_date_label: String,
}

impl Default for LabelSiblingExtractor {
    fn default() -> Self {
        Self {
            bar_number_label: "bar card number".to_owned(),
            license_date_label: "license date".to_owned(),
        }
    }
}

impl DetailExtractor for LabelSiblingExtractor {
    fn extract(&self, url: &str, html: &str) -> Result<DetailRecord, ScraperError> {
        let document = Html::parse_document(html);
        let scope = document
            .select(&ENTRY)
            .next()
            .unwrap_or_else(|| document.root_element());

        let bar_number = labelled_value(scope, &self.bar_number_label)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ScraperError::MissingField {
                url: url.to_owned(),
                label: self.bar_number_label.clone(),
            })?;

        let license_date = labelled_value(scope, &self.license_date_label).unwrap_or_else(|| {
            tracing::debug!(url, label = %self.license_date_label, "detail page has no license date");
            String::new()
        });

        let practice_areas = document
            .select(&AREAS)
            .next()
            .map(clean_practice_areas)
            .filter(|s| !s.is_empty());

        Ok(DetailRecord {
            bar_number,
            license_date,
            practice_areas,
        })
    }
}

/// Finds the `<strong>` whose text contains `label` and returns the text of
/// the first non-blank node after it. Stops at the next label.
fn labelled_value(scope: ElementRef<'_>, label: &str) -> Option<String> {
    let label = label.to_lowercase();
    let strong = scope
        .select(&LABEL)
        .find(|el| element_text(*el).to_lowercase().contains(&label))?;

    let mut sibling = strong.next_sibling();
    while let Some(node) = sibling {
        if let Node::Element(el) = node.value() {
            if el.name() == "strong" {
                return None;
            }
        }
        let text = child_text(node.value(), ElementRef::wrap(node));
        let text = text.trim();
        if !text.is_empty() {
            return Some(text.to_owned());
        }
        sibling = node.next_sibling();
    }
    None
}

fn clean_practice_areas(el: ElementRef<'_>) -> String {
    let mut text: String = el.text().collect();
    for noise in PRACTICE_AREA_NOISE {
        text = text.replace(noise, "");
    }
    text.trim().to_owned()
}

/// Fetches member detail pages and extracts their fields.
#[derive(Debug, Clone)]
pub struct DetailEnricher<E = LabelSiblingExtractor> {
    transport: Transport,
    base_url: Url,
    extractor: E,
}

impl DetailEnricher<LabelSiblingExtractor> {
    /// Creates an enricher resolving detail links against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(transport: Transport, base_url: &str) -> Result<Self, ScraperError> {
        Self::with_extractor(transport, base_url, LabelSiblingExtractor::default())
    }
}

impl<E: DetailExtractor> DetailEnricher<E> {
    /// Creates an enricher that uses a custom extraction strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_extractor(
        transport: Transport,
        base_url: &str,
        extractor: E,
    ) -> Result<Self, ScraperError> {
        let base_url = Url::parse(base_url).map_err(|e| ScraperError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            transport,
            base_url,
            extractor,
        })
    }

    /// Resolves `detail_link` against the base origin.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if the link cannot be joined.
    pub fn detail_url(&self, detail_link: &str) -> Result<Url, ScraperError> {
        self.base_url
            .join(detail_link)
            .map_err(|e| ScraperError::InvalidUrl {
                url: detail_link.to_owned(),
                reason: e.to_string(),
            })
    }

    /// Fetches the detail page behind `detail_link` and extracts its fields.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] / [`ScraperError::MissingField`] /
    ///   [`ScraperError::DetailUnavailable`] (4xx): this record cannot be
    ///   enriched.
    /// - Transport errors from [`Transport::get_text`] once retries are exhausted.
    pub async fn enrich(&self, detail_link: &str) -> Result<DetailRecord, ScraperError> {
        let url = self.detail_url(detail_link)?;
        let html = self
            .transport
            .get_text(url.as_str())
            .await
            .map_err(|e| match e {
                ScraperError::UnexpectedStatus { status, url } if (400..500).contains(&status) => {
                    ScraperError::DetailUnavailable { url, status }
                }
                other => other,
            })?;
        self.extractor.extract(url.as_str(), &html)
    }
}
