//! De-duplication of concurrent outbound API calls.
//!
//! See [`single_flight::SingleFlightCache`] for the locking discipline.

pub mod promise;
pub mod single_flight;

pub use single_flight::SingleFlightCache;
