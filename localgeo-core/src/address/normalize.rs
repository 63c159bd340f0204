//! Street name and state normalization tables

/// Street types and the spellings that normalize to them
const STREET_SUFFIXES: &[(&str, &[&str])] = &[
    ("ST", &["STREET", "ST", "STR"]),
    ("AVE", &["AVENUE", "AVE", "AV"]),
    ("RD", &["ROAD", "RD"]),
    ("DR", &["DRIVE", "DR"]),
    ("LN", &["LANE", "LN"]),
    ("CT", &["COURT", "CT"]),
    ("PL", &["PLACE", "PL"]),
    ("BLVD", &["BOULEVARD", "BLVD"]),
    ("WAY", &["WAY"]),
    ("PKWY", &["PARKWAY", "PKWY"]),
    ("CIR", &["CIRCLE", "CIR"]),
    ("HWY", &["HIGHWAY", "HWY"]),
    ("TER", &["TERRACE", "TER"]),
    ("TRL", &["TRAIL", "TRL"]),
];

const DIRECTIONALS: &[(&str, &[&str])] = &[
    ("N", &["NORTH", "N"]),
    ("S", &["SOUTH", "S"]),
    ("E", &["EAST", "E"]),
    ("W", &["WEST", "W"]),
    ("NE", &["NORTHEAST", "NE"]),
    ("NW", &["NORTHWEST", "NW"]),
    ("SE", &["SOUTHEAST", "SE"]),
    ("SW", &["SOUTHWEST", "SW"]),
];

const STATES: &[(&str, &str)] = &[
    ("ALABAMA", "AL"),
    ("ALASKA", "AK"),
    ("ARIZONA", "AZ"),
    ("ARKANSAS", "AR"),
    ("CALIFORNIA", "CA"),
    ("COLORADO", "CO"),
    ("CONNECTICUT", "CT"),
    ("DELAWARE", "DE"),
    ("DISTRICT OF COLUMBIA", "DC"),
    ("FLORIDA", "FL"),
    ("GEORGIA", "GA"),
    ("HAWAII", "HI"),
    ("IDAHO", "ID"),
    ("ILLINOIS", "IL"),
    ("INDIANA", "IN"),
    ("IOWA", "IA"),
    ("KANSAS", "KS"),
    ("KENTUCKY", "KY"),
    ("LOUISIANA", "LA"),
    ("MAINE", "ME"),
    ("MARYLAND", "MD"),
    ("MASSACHUSETTS", "MA"),
    ("MICHIGAN", "MI"),
    ("MINNESOTA", "MN"),
    ("MISSISSIPPI", "MS"),
    ("MISSOURI", "MO"),
    ("MONTANA", "MT"),
    ("NEBRASKA", "NE"),
    ("NEVADA", "NV"),
    ("NEW HAMPSHIRE", "NH"),
    ("NEW JERSEY", "NJ"),
    ("NEW MEXICO", "NM"),
    ("NEW YORK", "NY"),
    ("NORTH CAROLINA", "NC"),
    ("NORTH DAKOTA", "ND"),
    ("OHIO", "OH"),
    ("OKLAHOMA", "OK"),
    ("OREGON", "OR"),
    ("PENNSYLVANIA", "PA"),
    ("PUERTO RICO", "PR"),
    ("RHODE ISLAND", "RI"),
    ("SOUTH CAROLINA", "SC"),
    ("SOUTH DAKOTA", "SD"),
    ("TENNESSEE", "TN"),
    ("TEXAS", "TX"),
    ("UTAH", "UT"),
    ("VERMONT", "VT"),
    ("VIRGINIA", "VA"),
    ("WASHINGTON", "WA"),
    ("WEST VIRGINIA", "WV"),
    ("WISCONSIN", "WI"),
    ("WYOMING", "WY"),
];

fn lookup(table: &'static [(&'static str, &'static [&'static str])], word: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, variants)| variants.iter().any(|variant| *variant == word))
        .map(|(abbreviation, _)| *abbreviation)
}

/// Standard abbreviation of an upper-case street type (`AVENUE` -> `AVE`)
pub fn suffix_abbreviation(word: &str) -> Option<&'static str> {
    lookup(STREET_SUFFIXES, word)
}

/// Standard abbreviation of an upper-case directional (`NORTH` -> `N`)
pub fn directional_abbreviation(word: &str) -> Option<&'static str> {
    lookup(DIRECTIONALS, word)
}

/// Two-letter code for an upper-case state code or full state name
pub fn state_code(name: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(full, code)| *full == name || *code == name)
        .map(|(_, code)| *code)
}

/// Upper-case `text` and split it into words, dropping punctuation.
/// `#` is kept as a separate word so unit markers like `#4` can be recognized.
pub(crate) fn clean_tokens(text: &str) -> Vec<String> {
    let mut cleaned = String::with_capacity(text.len() + 4);
    for ch in text.chars() {
        match ch {
            '.' | '\'' => {}
            '#' => cleaned.push_str(" # "),
            ',' | ';' | ':' | '(' | ')' | '"' => cleaned.push(' '),
            _ => cleaned.extend(ch.to_uppercase()),
        }
    }
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Normalize a street name so that OSM names and parsed query streets
/// compare equal: upper case, no punctuation, abbreviated directionals and
/// an abbreviated street type.
pub fn normalize_street(name: &str) -> String {
    let tokens = clean_tokens(name);
    normalize_street_tokens(&tokens)
}

pub(crate) fn normalize_street_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut words: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
    if words.is_empty() {
        return String::new();
    }

    let is_core =
        |word: &&str| directional_abbreviation(word).is_none() && suffix_abbreviation(word).is_none();

    // A directional is only a prefix/suffix when a real name word remains,
    // "NORTH STREET" keeps its name.
    if words.len() > 1 && words[1..].iter().any(is_core) {
        if let Some(abbreviation) = directional_abbreviation(words[0]) {
            words[0] = abbreviation;
        }
    }

    let mut type_idx = words.len() - 1;
    if words.len() > 1 && words[..type_idx].iter().any(is_core) {
        if let Some(abbreviation) = directional_abbreviation(words[type_idx]) {
            words[type_idx] = abbreviation;
            type_idx -= 1;
        }
    }

    if type_idx > 0 {
        if let Some(abbreviation) = suffix_abbreviation(words[type_idx]) {
            words[type_idx] = abbreviation;
        }
    }

    words.join(" ")
}
