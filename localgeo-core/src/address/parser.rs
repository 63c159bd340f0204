//! Heuristic parser for US postal addresses
//!
//! Handles both comma separated input (`123 Main St, Little Rock, AR 72201`)
//! and single line input (`123 main street little rock ar`). Parsing never
//! fails: components that cannot be recognized are left empty.

use super::normalize::{
    clean_tokens, directional_abbreviation, normalize_street_tokens, state_code,
    suffix_abbreviation,
};

/// Secondary unit markers, dropped together with the value that follows them
const UNIT_DESIGNATORS: &[&str] = &["#", "APT", "APARTMENT", "SUITE", "STE", "UNIT"];

/// Unit markers that are also ordinary name words ("Old Lot Rd"). Inside the
/// street part they only count right after the street type.
const NAME_LIKE_UNIT_DESIGNATORS: &[&str] = &[
    "BLDG", "BUILDING", "FL", "FLOOR", "RM", "ROOM", "LOT", "SPC", "SPACE", "DEPT",
];

/// Longest full state name in words (`DISTRICT OF COLUMBIA`)
const MAX_STATE_WORDS: usize = 3;

/// Structured form of a free-text address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub house_number: Option<String>,
    /// Normalized street name (see [`super::normalize_street`])
    pub street: Option<String>,
    pub city: Option<String>,
    /// Two-letter state code
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl ParsedAddress {
    pub fn is_empty(&self) -> bool {
        self.house_number.is_none()
            && self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
    }
}

/// Split a free-text address into its components
pub fn parse_address(raw: &str) -> ParsedAddress {
    let mut segments: Vec<Vec<String>> = raw
        .split(',')
        .map(clean_tokens)
        .filter(|segment| !segment.is_empty())
        .collect();

    let mut parsed = ParsedAddress::default();
    if segments.is_empty() {
        return parsed;
    }

    let street_tokens = segments.remove(0);
    if segments.is_empty() {
        parse_single_line(street_tokens, &mut parsed);
    } else {
        parse_locality(segments, &mut parsed);
        parse_street(&street_tokens, &mut parsed);
    }
    parsed
}

/// Everything on one line: find the end of the street by its street type,
/// the remainder is unit, city, state and ZIP.
fn parse_single_line(mut tokens: Vec<String>, parsed: &mut ParsedAddress) {
    parsed.zip = take_zip(&mut tokens);

    let name_start = usize::from(tokens.first().is_some_and(|t| is_house_number(t)));
    match street_end(&tokens, name_start) {
        Some(end) => {
            let mut rest = tokens.split_off(end);
            skip_leading_units(&mut rest);
            parsed.state = take_state(&mut rest, 0);
            if !rest.is_empty() {
                parsed.city = Some(rest.join(" "));
            }
        }
        None => {
            // Without a street type the city cannot be told apart from the
            // street, but a trailing state is still recognizable.
            parsed.state = take_state(&mut tokens, name_start + 1);
        }
    }

    parse_street(&tokens, parsed);
}

/// Comma separated tail: ZIP and state come last, the city is the last
/// remaining segment that is not a unit designator.
fn parse_locality(mut segments: Vec<Vec<String>>, parsed: &mut ParsedAddress) {
    if let Some(last) = segments.last_mut() {
        parsed.zip = take_zip(last);
    }
    // "Little Rock, AR, 72201": the ZIP had a segment of its own
    if segments.last().is_some_and(Vec::is_empty) {
        segments.pop();
    }
    if let Some(last) = segments.last_mut() {
        parsed.state = take_state(last, 0);
    }

    parsed.city = segments
        .iter()
        .rev()
        .find(|segment| segment.first().is_some_and(|first| !is_unit_designator(first)))
        .map(|segment| segment.join(" "));
}

fn parse_street(tokens: &[String], parsed: &mut ParsedAddress) {
    let (house_number, name) = match tokens.split_first() {
        Some((first, rest)) if is_house_number(first) => (Some(first.clone()), rest),
        _ => (None, tokens),
    };

    // A unit designator ends the street; it cannot be the first name word.
    let name_end = (1..name.len())
        .find(|&idx| starts_unit(name, idx))
        .unwrap_or(name.len());

    let street = normalize_street_tokens(&name[..name_end]);
    parsed.house_number = house_number;
    parsed.street = (!street.is_empty()).then_some(street);
}

/// Index one past the street type (and a trailing directional), looking
/// only at positions preceded by at least one name word.
fn street_end(tokens: &[String], name_start: usize) -> Option<usize> {
    let type_idx = (name_start + 1..tokens.len())
        .find(|&idx| suffix_abbreviation(&tokens[idx]).is_some())?;

    let after = type_idx + 1;
    let has_post_directional = tokens
        .get(after)
        .is_some_and(|token| directional_abbreviation(token).is_some());
    Some(if has_post_directional { after + 1 } else { after })
}

fn starts_unit(name: &[String], idx: usize) -> bool {
    let token = name[idx].as_str();
    UNIT_DESIGNATORS.contains(&token)
        || (NAME_LIKE_UNIT_DESIGNATORS.contains(&token) && follows_street_type(&name[..idx]))
}

/// `prefix` ends with a street type (optionally followed by a directional)
/// that comes after at least one name word
fn follows_street_type(prefix: &[String]) -> bool {
    let mut end = prefix.len();
    if end > 2 && directional_abbreviation(&prefix[end - 1]).is_some() {
        end -= 1;
    }
    end >= 2 && suffix_abbreviation(&prefix[end - 1]).is_some()
}

fn skip_leading_units(tokens: &mut Vec<String>) {
    let mut skip = 0;
    while tokens.get(skip).is_some_and(|token| is_unit_designator(token)) {
        // designator plus its value
        skip = (skip + 2).min(tokens.len());
    }
    tokens.drain(..skip);
}

fn take_zip(tokens: &mut Vec<String>) -> Option<String> {
    if tokens.last().is_some_and(|token| is_zip(token)) {
        tokens.pop()
    } else {
        None
    }
}

/// Remove a trailing state code or name, leaving at least `keep` tokens
fn take_state(tokens: &mut Vec<String>, keep: usize) -> Option<String> {
    for words in (1..=MAX_STATE_WORDS).rev() {
        if tokens.len() < words + keep {
            continue;
        }
        let start = tokens.len() - words;
        if let Some(code) = state_code(&tokens[start..].join(" ")) {
            tokens.truncate(start);
            return Some(code.to_string());
        }
    }
    None
}

fn is_house_number(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit())
}

fn is_unit_designator(token: &str) -> bool {
    UNIT_DESIGNATORS.contains(&token) || NAME_LIKE_UNIT_DESIGNATORS.contains(&token)
}

fn is_zip(token: &str) -> bool {
    let bytes = token.as_bytes();
    match bytes.len() {
        5 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[5] == b'-'
                && bytes[..5].iter().all(u8::is_ascii_digit)
                && bytes[6..].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}
