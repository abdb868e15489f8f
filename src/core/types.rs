use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One output position of a suggestion. `None` is the empty sentinel:
/// "no identifier could be allocated for this cell".
pub type Slot = Option<u16>;

/// The two identifier classes handed out by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdClass {
    Pci,
    Rsi,
}

impl IdClass {
    /// Highest admissible identifier of the class (inclusive).
    pub const fn max(self) -> u16 {
        match self {
            IdClass::Pci => 503,
            IdClass::Rsi => 837,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Vendor {
    Ericsson,
    Huawei,
    /// unmanaged vendor, kept uppercased for reports
    Other(String),
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vendor::Ericsson => f.write_str("ERICSSON"),
            Vendor::Huawei => f.write_str("HUAWEI"),
            Vendor::Other(name) => f.write_str(name),
        }
    }
}

/// Canonical band codes. `Unknown` is where every unrecognized label lands;
/// it owns no pool and names cells with the default letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    B700,
    B800,
    B900,
    B1800,
    B2100,
    B2600,
    N78,
    B3500,
    B1,
    Unknown,
}

impl Band {
    pub const MANAGED: [Band; 9] = [
        Band::B700,
        Band::B800,
        Band::B900,
        Band::B1800,
        Band::B2100,
        Band::B2600,
        Band::B1,
        Band::B3500,
        Band::N78,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Band::B700 => "700",
            Band::B800 => "800",
            Band::B900 => "900",
            Band::B1800 => "1800",
            Band::B2100 => "2100",
            Band::B2600 => "2600",
            Band::N78 => "78",
            Band::B3500 => "3500",
            Band::B1 => "1",
            Band::Unknown => "UNKNOWN",
        }
    }

    /// Strict parse of a canonical code. Free text goes through
    /// `mapping::normalize::normalize_band` instead.
    pub fn from_code(code: &str) -> Option<Band> {
        Band::MANAGED.into_iter().find(|b| b.code() == code)
    }

    /// Bands where a 5G layer must stay PCI-congruent with the 4G layer.
    pub const fn requires_coordination(self) -> bool {
        matches!(self, Band::B700)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Technology family of a cell. Labels outside the known families keep
/// their uppercased text, so `3G` and `2600R` never share rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TechGroup {
    Lte,
    Nr,
    NbIot,
    Other(String),
}

impl TechGroup {
    pub fn label(&self) -> &str {
        match self {
            TechGroup::Lte => "4G",
            TechGroup::Nr => "5G",
            TechGroup::NbIot => "NBIOT",
            TechGroup::Other(label) => label,
        }
    }
}

impl fmt::Display for TechGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suffix {
    #[default]
    A,
    B,
}

impl Suffix {
    /// `A`/`B` in any case; anything else falls back to `A`.
    pub fn parse(raw: &str) -> Suffix {
        match raw.trim().to_ascii_uppercase().as_str() {
            "B" => Suffix::B,
            _ => Suffix::A,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Suffix::A => 'A',
            Suffix::B => 'B',
        }
    }
}

/// A location code plus its declared neighbors: the conflict-avoidance unit.
///
/// Identity (`Eq`, `Hash`) is the exact membership set. Two groups
/// built from different anchors but with the same members are the same
/// reservation bucket; two "logically equal" areas whose neighbor data
/// differs are not.
#[derive(Clone, Debug)]
pub struct Group {
    anchor: String,
    neighbors: Vec<String>,
    members: BTreeSet<String>,
}

impl Group {
    pub fn new(anchor: impl Into<String>, neighbors: Vec<String>) -> Self {
        let anchor = anchor.into();
        let mut members: BTreeSet<String> = neighbors.iter().cloned().collect();
        members.insert(anchor.clone());
        Group {
            anchor,
            neighbors,
            members,
        }
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn neighbors(&self) -> &[String] {
        &self.neighbors
    }

    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    pub fn contains(&self, code: &str) -> bool {
        self.members.contains(code)
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for Group {}

impl Hash for Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.members.hash(state);
    }
}
