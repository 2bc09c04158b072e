//! Transaction payloads and provider responses
//!
//! Callers hand over requests in whatever shape they have; everything past
//! [`PayloadNormalizer`] works on a [`CanonicalTransaction`]. Provider
//! responses come back through [`ResponseExtractor`].

pub mod extractor;
pub mod normalizer;
pub mod types;

pub use extractor::{AccountSource, NoAccountSource, ResponseExtractor, MIN_ADDRESS_LEN};
pub use normalizer::PayloadNormalizer;
pub use types::*;
