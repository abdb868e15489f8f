// group summary + per-cell detail records
use serde::{Serialize, Serializer};

use crate::core::types::{Group, Slot};

/// One line per (request layer, location group).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub location: String,
    pub node: String,
    /// `<tech>_<band>`
    pub technology: String,
    /// allocated PCIs, `;` joined; holes are left out
    pub pcis: String,
    pub rsis: String,
    pub location_code: String,
    /// `,` joined
    pub neighbor_codes: String,
    #[serde(skip)]
    requested: usize,
    #[serde(skip)]
    allocated: usize,
}

impl GroupSummary {
    pub fn new(
        location: &str,
        node: &str,
        technology: String,
        group: &Group,
        pcis: &[Slot],
        rsis: &[Slot],
    ) -> Self {
        GroupSummary {
            location: location.to_string(),
            node: node.to_string(),
            technology,
            pcis: join_slots(pcis),
            rsis: join_slots(rsis),
            location_code: group.anchor().to_string(),
            neighbor_codes: group.neighbors().join(","),
            requested: pcis.len(),
            allocated: pcis.iter().flatten().count(),
        }
    }

    /// PCI positions that came out empty.
    pub fn shortfall(&self) -> usize {
        self.requested - self.allocated
    }
}

/// One line per generated cell. An empty `pci`/`rsi` means nothing could be
/// allocated for that cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CellDetail {
    pub node: String,
    pub cell_name: String,
    #[serde(serialize_with = "slot_text")]
    pub pci: Slot,
    #[serde(serialize_with = "slot_text")]
    pub rsi: Slot,
    pub location_code: String,
    pub neighbor_codes: String,
}

/// Everything one planning call produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub groups: Vec<GroupSummary>,
    pub cells: Vec<CellDetail>,
}

impl Suggestion {
    pub fn extend(&mut self, other: Suggestion) {
        self.groups.extend(other.groups);
        self.cells.extend(other.cells);
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum of `GroupSummary::shortfall` over every group.
    pub fn shortfall(&self) -> usize {
        self.groups.iter().map(GroupSummary::shortfall).sum()
    }
}

/// `{ groups: [...] }`, the summary file layout.
#[derive(Serialize)]
pub struct SummaryFile<'a> {
    pub groups: &'a [GroupSummary],
}

/// `{ cells: [...] }`, the detail file layout.
#[derive(Serialize)]
pub struct DetailFile<'a> {
    pub cells: &'a [CellDetail],
}

pub fn join_slots(slots: &[Slot]) -> String {
    slots
        .iter()
        .flatten()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn slot_text<S: Serializer>(slot: &Slot, ser: S) -> Result<S::Ok, S::Error> {
    match slot {
        Some(id) => ser.serialize_str(&id.to_string()),
        None => ser.serialize_str(""),
    }
}
