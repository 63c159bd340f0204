//! Free-text US address parsing and street name normalization

mod normalize;
mod parser;

pub use normalize::{directional_abbreviation, normalize_street, state_code, suffix_abbreviation};
pub(crate) use normalize::clean_tokens;
pub use parser::{ParsedAddress, parse_address};
