// deterministic cell names
use crate::core::types::{Band, Suffix, TechGroup};

/// Letter used when a (tech, band) pair has no entry in the table.
pub const DEFAULT_LETTER: char = 'X';

/// Band/technology letter of a cell name.
pub fn band_letter(tech: &TechGroup, band: Band) -> char {
    match (tech, band) {
        (TechGroup::Lte, Band::B700) => 'Y',
        (TechGroup::Lte, Band::B800) => 'M',
        (TechGroup::Lte, Band::B1800) => 'N',
        (TechGroup::Lte, Band::B2100) => 'T',
        (TechGroup::Lte, Band::B2600) => 'L',
        (TechGroup::Nr, Band::B700) => 'Q',
        (TechGroup::Nr, Band::B2100) => 'W',
        (TechGroup::Nr, Band::B3500) => 'P',
        (TechGroup::Nr, Band::N78) => 'P',
        _ => DEFAULT_LETTER,
    }
}

/// `<NODE><letter><sector><suffix>`, e.g. `M5161Y1A` for the first 4G/700 sector.
/// `sector` is 1-based.
pub fn cell_name(node: &str, tech: &TechGroup, band: Band, sector: usize, suffix: Suffix) -> String {
    format!(
        "{}{}{}{}",
        node.trim().to_uppercase(),
        band_letter(tech, band),
        sector,
        suffix.letter()
    )
}

/// Sector index of a name ending in `<digits><A|B>`, e.g. `M5161Y12B` -> 12.
pub fn sector_of(cell_name: &str) -> Option<u32> {
    let name = cell_name.trim().to_uppercase();
    let body = name.strip_suffix(['A', 'B'])?;
    let digits_at = body
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    body[digits_at..].parse().ok()
}
