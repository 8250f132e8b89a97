//! Expose wikiscrape's internal API for use in integration tests. It is not a
//! stable interface; use `wikiscrape-html` for the conversion stages.
pub mod cli;
pub mod error;
pub mod utils;
