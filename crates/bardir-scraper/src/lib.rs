pub mod address;
pub mod detail;
pub mod error;
mod html;
pub mod listing;
pub mod params;
pub(crate) mod rate_limit;
pub mod session;
pub mod throttle;
pub mod transport;

pub use address::{parse_address, parse_address_fragment};
pub use detail::{DetailEnricher, DetailExtractor, LabelSiblingExtractor};
pub use error::ScraperError;
pub use listing::parse_listing;
pub use params::{build_request, RequestParameters};
pub use session::SearchSession;
pub use throttle::Throttle;
pub use transport::{RetryPolicy, Transport};
