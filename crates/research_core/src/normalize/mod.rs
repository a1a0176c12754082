//! Field normalizers for human-entered spreadsheet values.
//!
//! # Responsibility
//! - Turn free-text cells into typed dates, currency codes, amounts and
//!   statuses.
//!
//! # Invariants
//! - Normalizers never fail hard: unparsable input yields `None` or a
//!   documented default.
//! - Normalizers are pure and do not touch storage.

pub mod amount;
pub mod currency;
pub mod date;
pub mod status;

pub use amount::clean_amount;
pub use currency::{detect_currency, VALID_CURRENCY_CODES};
pub use date::{parse_date, parse_date_text};
pub use status::{normalize_status, StatusNormalization};
