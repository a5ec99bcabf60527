//! Portuguese text helpers shared by the analyzer and the HTTP tools.

pub mod dates;
pub mod numbers;

pub use dates::{
    date_as_written, is_valid_future_date, parse_to_iso_date, validate_event_date,
    validate_event_date_at, DateValidation, DateWarning,
};
pub use numbers::{headcount_from_words, parse_number_words};
