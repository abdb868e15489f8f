// free-text labels -> closed code sets
//
// Everything that reaches `core` has been through here: bands, technologies
// and vendors are canonical, identifier fields are parsed to integers.
use std::collections::BTreeSet;

use crate::core::types::{Band, TechGroup, Vendor};

/// Whole-label aliases, checked before digit extraction.
///
/// `B1`/`N1` land on `Band::B2100` while a bare `1` falls through to
/// `Band::B1`: two pools for the same carrier. Existing master records rely
/// on that split, keep it.
const BAND_ALIASES: &[(&str, Band)] = &[
    ("N78", Band::N78),
    ("NR78", Band::N78),
    ("NR700", Band::B700),
    ("B28", Band::B700),
    ("N28", Band::B700),
    ("N1", Band::B2100),
    ("B1", Band::B2100),
    ("NR2100", Band::B2100),
    ("B3", Band::B1800),
    ("N3", Band::B1800),
    ("NR1800", Band::B1800),
    ("B20", Band::B800),
    ("N20", Band::B800),
    ("NR800", Band::B800),
    ("B7", Band::B2600),
    ("N7", Band::B2600),
    ("NR2600", Band::B2600),
];

/// Canonical band for a free-text label such as `" NR700 "`, `"B28"`, `"L900"`.
///
/// `3500` and `78` are the same carrier and both land on `Band::N78`;
/// `Band::B3500` is only reachable through `Band::from_code`.
pub fn normalize_band(raw: &str) -> Band {
    let label = raw.trim().to_uppercase();
    if let Some((_, band)) = BAND_ALIASES.iter().find(|(alias, _)| *alias == label) {
        return *band;
    }

    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();

    match digits.as_str() {
        "78" | "3500" => Band::N78,
        "700" | "28" => Band::B700,
        "2100" => Band::B2100,
        "1800" | "3" => Band::B1800,
        "800" | "20" => Band::B800,
        "2600" | "7" => Band::B2600,
        "900" => Band::B900,
        "1" => Band::B1,
        _ => Band::Unknown,
    }
}

/// `5G…`/`NR…` -> 5G, `4G…`/`LTE` -> 4G, `NBIOT` -> NB-IoT, else `Other`
/// carrying the uppercased label.
pub fn group_tech(raw: &str) -> TechGroup {
    let label = raw.trim().to_uppercase();
    if label.starts_with("5G") || label.starts_with("NR") {
        TechGroup::Nr
    } else if label.starts_with("4G") || label == "LTE" {
        TechGroup::Lte
    } else if label == "NBIOT" {
        TechGroup::NbIot
    } else {
        TechGroup::Other(label)
    }
}

pub fn normalize_vendor(raw: &str) -> Vendor {
    let label = raw.trim().to_uppercase();
    match label.as_str() {
        "ERICSSON" => Vendor::Ericsson,
        "HUAWEI" => Vendor::Huawei,
        _ => Vendor::Other(label),
    }
}

/// Every purely numeric token of a field like `"12;13, 14"`. Tokens that do
/// not fit a `u16` are dropped along with non-numeric ones.
pub fn parse_identifiers(raw: &str) -> BTreeSet<u16> {
    raw.split(|c: char| c == ';' || c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Trimmed, uppercased site or node code.
pub fn clean_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}
