// master record of cells already in service
use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::naming::sector_of;
use crate::core::types::{Band, Group, TechGroup, Vendor};
use crate::mapping::loader::{opt_text, text};
use crate::mapping::normalize::{
    clean_code, group_tech, normalize_band, normalize_vendor, parse_identifiers,
};

/// Sector count assumed when a site's cell names carry no sector index.
pub const DEFAULT_SECTOR_COUNT: usize = 3;

/// One cell as written in the master file, before normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCellRow {
    #[serde(deserialize_with = "text")]
    pub site: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub node: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub cell_name: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub band: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub tech: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub vendor: Option<String>,
    /// one or more ids separated by `;`, `,` or spaces
    #[serde(default, deserialize_with = "opt_text")]
    pub pci: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub rsi: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub tac: Option<String>,
}

/// A normalized master-record row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellRecord {
    pub site: String,
    pub node: Option<String>,
    pub cell_name: String,
    pub band: Band,
    pub tech: TechGroup,
    pub vendor: Vendor,
    pub pci: BTreeSet<u16>,
    pub rsi: BTreeSet<u16>,
    pub tac: Option<String>,
}

impl From<RawCellRow> for CellRecord {
    fn from(raw: RawCellRow) -> Self {
        CellRecord {
            site: clean_code(&raw.site),
            node: raw.node.as_deref().map(clean_code).filter(|n| !n.is_empty()),
            cell_name: raw.cell_name.unwrap_or_default().trim().to_string(),
            band: normalize_band(raw.band.as_deref().unwrap_or_default()),
            tech: group_tech(raw.tech.as_deref().unwrap_or_default()),
            vendor: normalize_vendor(raw.vendor.as_deref().unwrap_or_default()),
            pci: parse_identifiers(raw.pci.as_deref().unwrap_or_default()),
            rsi: parse_identifiers(raw.rsi.as_deref().unwrap_or_default()),
            tac: raw
                .tac
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        }
    }
}

/// What the master record knows about one site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteProfile {
    pub site: String,
    /// first node code recorded for the site, if any
    pub node: Option<String>,
    /// vendor of the site's first row
    pub vendor: Vendor,
    /// (tech, location code) pairs in order of first appearance
    pub location_codes: Vec<(TechGroup, String)>,
    pub sector_count: usize,
}

impl SiteProfile {
    /// Distinct location codes carrying `tech`, minus any code where this
    /// site also carries NB-IoT cells.
    pub fn location_codes_for(&self, tech: &TechGroup) -> Vec<String> {
        let nbiot: HashSet<&str> = self
            .location_codes
            .iter()
            .filter(|(t, _)| *t == TechGroup::NbIot)
            .map(|(_, code)| code.as_str())
            .collect();
        self.location_codes
            .iter()
            .filter(|(t, code)| t == tech && !nbiot.contains(code.as_str()))
            .map(|(_, code)| code.clone())
            .collect()
    }
}

/// Identifiers already in service inside a group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsedIdentifiers {
    pub pci: BTreeSet<u16>,
    pub rsi: BTreeSet<u16>,
}

/// Read-only lookups the planner makes against the master record.
pub trait MasterRecord {
    /// `None` when the site has no rows.
    fn site_profile(&self, site: &str) -> Option<SiteProfile>;

    /// Ids recorded for (tech, band) in any member of `group`. RSI use is not
    /// tracked for 5G. Empty sets, never an error, when nothing matches.
    fn used_identifiers(&self, group: &Group, tech: &TechGroup, band: Band) -> UsedIdentifiers;
}

/// In-memory master record.
#[derive(Clone, Debug, Default)]
pub struct CellInventory {
    cells: Vec<CellRecord>,
}

impl CellInventory {
    pub fn new(cells: Vec<CellRecord>) -> Self {
        CellInventory { cells }
    }

    pub fn from_rows(rows: impl IntoIterator<Item = RawCellRow>) -> Self {
        CellInventory::new(rows.into_iter().map(CellRecord::from).collect())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellRecord] {
        &self.cells
    }

    fn site_cells<'a>(&'a self, site: &str) -> impl Iterator<Item = &'a CellRecord> + 'a {
        let site = clean_code(site);
        self.cells.iter().filter(move |c| c.site == site)
    }

    /// Distinct sector indices among the site's cell names; 3 when none parse
    /// or the site is absent.
    pub fn sector_count(&self, site: &str) -> usize {
        let sectors: HashSet<u32> = self
            .site_cells(site)
            .filter_map(|c| sector_of(&c.cell_name))
            .collect();
        if sectors.is_empty() {
            DEFAULT_SECTOR_COUNT
        } else {
            sectors.len()
        }
    }
}

impl MasterRecord for CellInventory {
    fn site_profile(&self, site: &str) -> Option<SiteProfile> {
        let mut cells = self.site_cells(site).peekable();
        let first = cells.peek()?;
        let site_code = first.site.clone();
        let vendor = first.vendor.clone();

        let mut node = None;
        let mut location_codes: Vec<(TechGroup, String)> = Vec::new();
        for cell in cells {
            if node.is_none() {
                node = cell.node.clone();
            }
            let Some(tac) = &cell.tac else { continue };
            let pair = (cell.tech.clone(), tac.clone());
            if !location_codes.contains(&pair) {
                location_codes.push(pair);
            }
        }

        Some(SiteProfile {
            sector_count: self.sector_count(&site_code),
            site: site_code,
            node,
            vendor,
            location_codes,
        })
    }

    fn used_identifiers(&self, group: &Group, tech: &TechGroup, band: Band) -> UsedIdentifiers {
        let mut used = UsedIdentifiers::default();
        let rows = self.cells.iter().filter(|c| {
            &c.tech == tech
                && c.band == band
                && c.tac.as_deref().is_some_and(|tac| group.contains(tac))
        });
        for row in rows {
            used.pci.extend(&row.pci);
            if *tech != TechGroup::Nr {
                used.rsi.extend(&row.rsi);
            }
        }
        used
    }
}
