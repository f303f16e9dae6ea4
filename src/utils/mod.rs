//! Utility modules supporting the client.
//!
//! - [`HttpClient`]: shared reqwest client with user agent and timeouts
//! - [`debounce`]: collapse bursts of calls (search-as-you-type) into one
//! - [`extract_doi`]: pull the first DOI out of free text
//! - [`format_date`], [`format_confidence`], [`format_number`],
//!   [`format_currency`], [`percentage`], [`truncate`], [`mask_key`]:
//!   display formatting
//!
//! # Formatting
//!
//! ```rust
//! use article_eater_client::utils::{format_confidence, format_number, percentage};
//!
//! assert_eq!(format_confidence(Some(0.8)), "80% (High)");
//! assert_eq!(format_number(1_500_000.0), "1.5M");
//! assert_eq!(percentage(5.0, 0.0), 0);
//! ```

mod debounce;
mod doi;
mod format;
mod http;

pub use debounce::{debounce, Debounced};
pub use doi::{doi_url, extract_doi};
pub use format::{
    confidence_tone, format_confidence, format_currency, format_date, format_date_in,
    format_number, mask_key, percentage, truncate, ELLIPSIS, INVALID_DATE, PLACEHOLDER,
};
pub use http::{HttpClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
