// one planning request, raw and normalized
use serde::{Deserialize, Serialize};

use crate::core::types::{Band, Suffix, TechGroup, Vendor};
use crate::mapping::loader::{opt_text, text};
use crate::mapping::normalize::{clean_code, group_tech, normalize_band, normalize_vendor};

/// A request line as read from a batch file or the command line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequest {
    #[serde(deserialize_with = "text")]
    pub site: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub node: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub tech: Option<String>,
    #[serde(deserialize_with = "text")]
    pub band: String,
    #[serde(default)]
    pub cells: Option<usize>,
    #[serde(default)]
    pub min_pci: Option<u16>,
    #[serde(default)]
    pub min_rsi: Option<u16>,
    #[serde(default, deserialize_with = "opt_text")]
    pub suffix: Option<String>,
}

/// Normalized request for one site and band.
///
/// `tech_label` keeps the technology text as the operator wrote it; it only
/// feeds the `<tech>_<band>` label of the output. Everything else uses the
/// grouped `tech`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub site: String,
    /// owning node code; the master record's node, then the site code, when unset
    pub node: Option<String>,
    pub tech: TechGroup,
    pub tech_label: String,
    pub band: Band,
    /// cells to plan; the site's detected sector count when unset
    pub cells: Option<usize>,
    pub min_pci: u16,
    pub min_rsi: u16,
    /// overrides the vendor recorded for the site
    pub vendor: Option<Vendor>,
    pub suffix: Suffix,
}

impl Request {
    /// `tech` and `band` are free text and go through normalization.
    pub fn new(site: &str, tech: &str, band: &str) -> Self {
        let tech_label = tech.trim().to_string();
        Request {
            site: clean_code(site),
            node: None,
            tech: group_tech(&tech_label),
            tech_label,
            band: normalize_band(band),
            cells: None,
            min_pci: 0,
            min_rsi: 0,
            vendor: None,
            suffix: Suffix::A,
        }
    }

    pub fn with_node(mut self, node: &str) -> Self {
        let node = clean_code(node);
        self.node = (!node.is_empty()).then_some(node);
        self
    }

    pub fn with_cells(mut self, cells: usize) -> Self {
        self.cells = Some(cells);
        self
    }

    pub fn with_floors(mut self, min_pci: u16, min_rsi: u16) -> Self {
        self.min_pci = min_pci;
        self.min_rsi = min_rsi;
        self
    }

    pub fn with_vendor(mut self, vendor: &str) -> Self {
        self.vendor = Some(normalize_vendor(vendor));
        self
    }

    pub fn with_suffix(mut self, suffix: Suffix) -> Self {
        self.suffix = suffix;
        self
    }

    /// Same request for another technology layer of the same band.
    pub fn for_layer(&self, tech: TechGroup) -> Self {
        Request {
            tech_label: tech.label().to_string(),
            tech,
            ..self.clone()
        }
    }

    /// `<tech>_<band code>`, e.g. `4G_700`.
    pub fn technology(&self) -> String {
        format!("{}_{}", self.tech_label, self.band.code())
    }
}

impl From<RawRequest> for Request {
    fn from(raw: RawRequest) -> Self {
        let mut req = Request::new(&raw.site, raw.tech.as_deref().unwrap_or_default(), &raw.band);
        if let Some(node) = raw.node.as_deref() {
            req = req.with_node(node);
        }
        req.cells = raw.cells;
        req.min_pci = raw.min_pci.unwrap_or(0);
        req.min_rsi = raw.min_rsi.unwrap_or(0);
        req.suffix = raw.suffix.as_deref().map(Suffix::parse).unwrap_or_default();
        req
    }
}
