// planning orchestrator
use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::core::allocator::ClusterAllocator;
use crate::core::error::{PlanError, Result};
use crate::core::naming::cell_name;
use crate::core::output::{CellDetail, GroupSummary, Suggestion};
use crate::core::request::Request;
use crate::core::suggest::{residues, PciPolicy, RsiPolicy};
use crate::core::types::{Group, IdClass, Slot, TechGroup};
use crate::mapping::inventory::MasterRecord;
use crate::mapping::neighbors::NeighborGraph;

/// PCIs one layer got in one group, kept so a dependent layer can follow them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedGroup {
    pub anchor: String,
    pub pcis: Vec<Slot>,
}

/// Where a coordinated (700) request stands.
#[derive(Debug)]
enum Stage {
    PrimaryPending,
    DependentPending(Vec<PlannedGroup>),
    Done,
}

/// Turns requests into suggestions against one master record and one
/// neighbor table. Holds no run state itself: reservations live in the
/// `ClusterAllocator` passed to every call.
pub struct Planner<'a, M: MasterRecord + ?Sized> {
    pub(crate) master: &'a M,
    pub(crate) neighbors: &'a NeighborGraph,
}

impl<'a, M: MasterRecord + ?Sized> Planner<'a, M> {
    pub fn new(master: &'a M, neighbors: &'a NeighborGraph) -> Self {
        Planner { master, neighbors }
    }

    /// Full plan for one request.
    ///
    /// Bands that need cross-technology coordination (700) are planned twice:
    /// 4G first in block mode, then 5G congruent (mod 3) with what 4G got in
    /// the group with the same location code (the first 4G group when none
    /// matches). For multi-group sites this differs from feeding every 5G
    /// group the concatenated 4G residues. Every other band runs the
    /// pipeline once for the request's own technology.
    pub fn plan(&self, alloc: &mut ClusterAllocator, req: &Request) -> Result<Suggestion> {
        if !req.band.requires_coordination() {
            return self.suggest(alloc, req);
        }

        let mut out = Suggestion::default();
        let mut stage = Stage::PrimaryPending;
        loop {
            stage = match stage {
                Stage::PrimaryPending => {
                    let (s, planned) = self.run_layer(alloc, &req.for_layer(TechGroup::Lte), None)?;
                    out.extend(s);
                    Stage::DependentPending(planned)
                }
                Stage::DependentPending(primary) => {
                    let (s, _) =
                        self.run_layer(alloc, &req.for_layer(TechGroup::Nr), Some(&primary))?;
                    out.extend(s);
                    Stage::Done
                }
                Stage::Done => return Ok(out),
            };
        }
    }

    /// One pass of the pipeline for the request's technology, block mode.
    pub fn suggest(&self, alloc: &mut ClusterAllocator, req: &Request) -> Result<Suggestion> {
        self.run_layer(alloc, req, None).map(|(s, _)| s)
    }

    /// Like `suggest`, but each group's PCIs follow the residues of the
    /// matching group in `primary`.
    pub fn suggest_congruent(
        &self,
        alloc: &mut ClusterAllocator,
        req: &Request,
        primary: &[PlannedGroup],
    ) -> Result<Suggestion> {
        self.run_layer(alloc, req, Some(primary)).map(|(s, _)| s)
    }

    fn run_layer(
        &self,
        alloc: &mut ClusterAllocator,
        req: &Request,
        primary: Option<&[PlannedGroup]>,
    ) -> Result<(Suggestion, Vec<PlannedGroup>)> {
        let profile = self
            .master
            .site_profile(&req.site)
            .ok_or_else(|| PlanError::SiteNotFound {
                site: req.site.clone(),
            })?;

        let vendor = req.vendor.clone().unwrap_or_else(|| profile.vendor.clone());
        let node = req
            .node
            .clone()
            .or_else(|| profile.node.clone())
            .unwrap_or_else(|| profile.site.clone());
        let n = req.cells.unwrap_or(profile.sector_count);
        let technology = req.technology();

        if !alloc.pools().is_managed(&vendor, req.band) {
            warn!(
                "pools for {}/{} are not managed here, {} cells of {} left empty",
                vendor, req.band, n, req.site
            );
        }

        let groups = self.groups_for(&profile, &req.tech);
        if groups.is_empty() {
            warn!("{} carries no usable location code for {}", req.site, req.tech);
        }

        let names: Vec<String> = (1..=n)
            .map(|sector| cell_name(&node, &req.tech, req.band, sector, req.suffix))
            .collect();

        let mut out = Suggestion::default();
        let mut planned = Vec::with_capacity(groups.len());

        for group in &groups {
            /*
                1. used = master record + what this exact group already got this run
                2. free = pool - used - (PCI only) every reservation of the run
                3. pick, then commit the PCIs
            */
            let used = self.master.used_identifiers(group, &req.tech, req.band);
            let mut used_pci = used.pci;
            used_pci.extend(alloc.reserved_for(group));

            let free_pci: BTreeSet<u16> = alloc
                .free_identifiers(&vendor, req.band, IdClass::Pci, &used_pci, req.min_pci)
                .collect();
            let free_rsi: BTreeSet<u16> = alloc
                .free_identifiers(&vendor, req.band, IdClass::Rsi, &used.rsi, req.min_rsi)
                .collect();
            debug!(
                "{} {} group {:?}: {} PCIs / {} RSIs free",
                req.site,
                technology,
                group.members(),
                free_pci.len(),
                free_rsi.len()
            );

            let policy = PciPolicy::from_residues(primary.map(|p| pattern_for(p, group)));
            let pcis = policy.pick(&free_pci, n, req.min_pci);
            let rsis = RsiPolicy::for_vendor(&vendor, req.band).pick(&free_rsi, n);

            alloc.reserve(group, pcis.iter().copied());

            let summary = GroupSummary::new(&req.site, &node, technology.clone(), group, &pcis, &rsis);
            let rsi_holes = rsis.iter().filter(|r| r.is_none()).count();
            if summary.shortfall() > 0 || rsi_holes > 0 {
                warn!(
                    "partial allocation for {} {} in location {}: {} PCI / {} RSI slots empty",
                    req.site,
                    technology,
                    group.anchor(),
                    summary.shortfall(),
                    rsi_holes
                );
            }

            for (i, name) in names.iter().enumerate() {
                out.cells.push(CellDetail {
                    node: node.clone(),
                    cell_name: name.clone(),
                    pci: pcis.get(i).copied().flatten(),
                    rsi: rsis.get(i).copied().flatten(),
                    location_code: summary.location_code.clone(),
                    neighbor_codes: summary.neighbor_codes.clone(),
                });
            }
            out.groups.push(summary);
            planned.push(PlannedGroup {
                anchor: group.anchor().to_string(),
                pcis,
            });
        }

        info!(
            "planned {} {}: {} group(s), {} cell(s) each",
            req.site,
            technology,
            groups.len(),
            n
        );
        Ok((out, planned))
    }
}

/// Residues of the primary group with the same location code, else of the
/// first primary group.
fn pattern_for(primary: &[PlannedGroup], group: &Group) -> Vec<Option<u8>> {
    primary
        .iter()
        .find(|p| p.anchor == group.anchor())
        .or_else(|| primary.first())
        .map(|p| residues(&p.pcis))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pool::{Pool, PoolRegistry};
    use crate::core::types::{Band, Vendor};
    use crate::mapping::inventory::{CellInventory, RawCellRow};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn mk_row(site: &str, cell: &str, tech: &str, band: &str, tac: &str, pci: &str, rsi: &str) -> RawCellRow {
        RawCellRow {
            site: site.to_string(),
            cell_name: Some(cell.to_string()),
            band: Some(band.to_string()),
            tech: Some(tech.to_string()),
            vendor: Some("ERICSSON".to_string()),
            pci: Some(pci.to_string()),
            rsi: Some(rsi.to_string()),
            tac: Some(tac.to_string()),
            ..RawCellRow::default()
        }
    }

    fn pcis_of(s: &Suggestion) -> Vec<Slot> {
        s.cells.iter().map(|c| c.pci).collect()
    }

    ///site S1, 4G/700 on location 100, PCIs 5,6,7 already in service
    fn mk_master() -> CellInventory {
        CellInventory::from_rows([
            mk_row("S1", "S1Y1A", "4G", "700", "100", "5", "0"),
            mk_row("S1", "S1Y2A", "4G", "700", "100", "6", ""),
            mk_row("S1", "S1Y3A", "4G", "700", "100", "7", ""),
        ])
    }

    #[test]
    fn first_request_takes_the_aligned_block() {
        let master = mk_master();
        let graph = NeighborGraph::new();
        let planner = Planner::new(&master, &graph);
        let mut alloc = ClusterAllocator::new();

        let req = Request::new("S1", "4G", "700").with_cells(3);
        let s = planner.suggest(&mut alloc, &req).unwrap();

        assert_eq!(pcis_of(&s), vec![Some(0), Some(1), Some(2)]);
        assert_eq!(s.groups.len(), 1);
        assert_eq!(s.groups[0].technology, "4G_700");
        assert_eq!(s.groups[0].pcis, "0;1;2");
        //ERICSSON/700: RSI spaced by 10 from the first free one
        assert_eq!(s.groups[0].rsis, "1;11;21");
        let names: Vec<_> = s.cells.iter().map(|c| c.cell_name.as_str()).collect();
        assert_eq!(names, ["S1Y1A", "S1Y2A", "S1Y3A"]);
    }

    #[test]
    fn second_request_in_the_same_run_avoids_the_first() {
        let master = mk_master();
        let graph = NeighborGraph::new();
        let planner = Planner::new(&master, &graph);
        let mut alloc = ClusterAllocator::new();

        let req = Request::new("S1", "4G", "700").with_cells(3);
        planner.suggest(&mut alloc, &req).unwrap();
        let again = planner.suggest(&mut alloc, &req.clone().with_cells(2)).unwrap();

        let got = pcis_of(&again);
        assert_eq!(got, vec![Some(3), Some(4)]);
        assert!(got.iter().flatten().all(|id| *id > 2));

        //fresh session forgets the first request
        alloc.reset();
        let fresh = planner.suggest(&mut alloc, &req.with_cells(2)).unwrap();
        assert_eq!(pcis_of(&fresh), vec![Some(0), Some(1)]);
    }

    #[test]
    fn overlapping_groups_never_share_a_pci_in_one_run() {
        let master = CellInventory::from_rows([
            mk_row("S1", "S1N1A", "4G", "1800", "100", "", ""),
            mk_row("S2", "S2N1A", "4G", "1800", "200", "", ""),
        ]);
        let mut graph = NeighborGraph::new();
        graph.insert("100", "200");
        let planner = Planner::new(&master, &graph);
        let mut alloc = ClusterAllocator::new();

        let a = planner
            .suggest(&mut alloc, &Request::new("S1", "4G", "1800").with_cells(3))
            .unwrap();
        let b = planner
            .suggest(&mut alloc, &Request::new("S2", "4G", "1800").with_cells(3))
            .unwrap();

        assert_eq!(pcis_of(&a), vec![Some(0), Some(1), Some(2)]);
        assert_eq!(pcis_of(&b), vec![Some(3), Some(4), Some(5)]);
        assert_eq!(alloc.group_count(), 2);
    }

    #[test]
    fn coordinated_band_follows_primary_residues() {
        let mut rows: Vec<RawCellRow> = (1..=3)
            .map(|i| mk_row("S1", &format!("S1Y{i}A"), "4G", "700", "100", "", ""))
            .collect();
        rows.push(mk_row("S1", "S1Q1A", "5G", "700", "100", "3;4;5;6;7;8;9;12;15", "400"));
        let master = CellInventory::from_rows(rows);
        let graph = NeighborGraph::new();
        let planner = Planner::new(&master, &graph);
        let mut alloc = ClusterAllocator::new();

        let s = planner.plan(&mut alloc, &Request::new("S1", "", "700")).unwrap();

        let techs: Vec<_> = s.groups.iter().map(|g| g.technology.as_str()).collect();
        assert_eq!(techs, ["4G_700", "5G_700"]);

        let (lte, nr) = s.cells.split_at(3);
        assert_eq!(lte.iter().map(|c| c.pci).collect::<Vec<_>>(), vec![Some(0), Some(1), Some(2)]);
        //residue 0 -> 18, residue 1 -> 10, residue 2 -> 11
        assert_eq!(nr.iter().map(|c| c.pci).collect::<Vec<_>>(), vec![Some(18), Some(10), Some(11)]);
        assert_eq!(nr[0].cell_name, "S1Q1A");
        //5G rows never count as RSI usage
        assert_eq!(nr[0].rsi, Some(0));
    }

    #[test]
    fn congruent_layer_falls_back_to_first_primary_group() {
        let master = CellInventory::from_rows([mk_row("S1", "S1Q1A", "5G", "2100", "300", "", "")]);
        let graph = NeighborGraph::new();
        let planner = Planner::new(&master, &graph);
        let mut alloc = ClusterAllocator::new();

        let primary = [PlannedGroup {
            anchor: "100".to_string(),
            pcis: vec![Some(5), None],
        }];
        let req = Request::new("S1", "5G", "2100").with_cells(2);
        let s = planner.suggest_congruent(&mut alloc, &req, &primary).unwrap();

        assert_eq!(pcis_of(&s), vec![Some(2), None]);
        assert_eq!(s.cells[0].cell_name, "S1W1A");
    }

    #[traced_test]
    #[test]
    fn short_pool_is_reported_not_failed() {
        let master = CellInventory::from_rows([mk_row("S1", "S1M1A", "4G", "800", "100", "", "")]);
        let graph = NeighborGraph::new();
        let planner = Planner::new(&master, &graph);
        let pools = PoolRegistry::new()
            .with_pool(Vendor::Ericsson, Band::B800, IdClass::Pci, Pool::span(0, 1))
            .with_pool(Vendor::Ericsson, Band::B800, IdClass::Rsi, Pool::span(0, 837));
        let mut alloc = ClusterAllocator::with_pools(pools);

        let s = planner
            .suggest(&mut alloc, &Request::new("S1", "4G", "800").with_cells(3))
            .unwrap();

        assert_eq!(pcis_of(&s), vec![Some(0), Some(1), None]);
        assert_eq!(s.shortfall(), 1);
        assert_eq!(s.cells[2].cell_name, "S1M3A");
        assert!(logs_contain("partial allocation"));
        assert_eq!(alloc.reserved_for(&Group::new("100", vec![])), BTreeSet::from([0, 1]));
    }

    #[traced_test]
    #[test]
    fn unmanaged_vendor_gets_empty_slots() {
        let master = mk_master();
        let graph = NeighborGraph::new();
        let planner = Planner::new(&master, &graph);
        let mut alloc = ClusterAllocator::new();

        let req = Request::new("S1", "4G", "700").with_cells(2).with_vendor("nokia");
        let s = planner.suggest(&mut alloc, &req).unwrap();

        assert_eq!(pcis_of(&s), vec![None, None]);
        assert!(s.cells.iter().all(|c| c.rsi.is_none()));
        assert_eq!(s.groups[0].pcis, "");
        assert_eq!(alloc.group_count(), 0);
        assert!(logs_contain("not managed"));
    }

    #[test]
    fn cell_count_defaults_to_detected_sectors() {
        let master = mk_master();
        let graph = NeighborGraph::new();
        let planner = Planner::new(&master, &graph);
        let mut alloc = ClusterAllocator::new();

        let s = planner
            .suggest(&mut alloc, &Request::new("S1", "4G", "700").with_node("m5161"))
            .unwrap();
        let names: Vec<_> = s.cells.iter().map(|c| c.cell_name.as_str()).collect();
        assert_eq!(names, ["M5161Y1A", "M5161Y2A", "M5161Y3A"]);
        assert_eq!(s.groups[0].node, "M5161");
        assert_eq!(s.groups[0].location, "S1");
    }

    #[test]
    fn floors_are_honored() {
        let master = mk_master();
        let graph = NeighborGraph::new();
        let planner = Planner::new(&master, &graph);
        let mut alloc = ClusterAllocator::new();

        let req = Request::new("S1", "4G", "700").with_cells(2).with_floors(10, 100);
        let s = planner.suggest(&mut alloc, &req).unwrap();

        assert_eq!(pcis_of(&s), vec![Some(12), Some(13)]);
        assert_eq!(s.groups[0].rsis, "100;110");
    }

    #[test]
    fn unlisted_technologies_do_not_share_rows() {
        let master = CellInventory::from_rows([
            mk_row("S1", "S1X1A", "3G", "2600", "1", "0;1;2", "0;10;20"),
            mk_row("S1", "S1X2A", "2600R", "2600", "1", "", ""),
        ]);
        let graph = NeighborGraph::new();
        let planner = Planner::new(&master, &graph);
        let mut alloc = ClusterAllocator::new();

        let req = Request::new("S1", "2600R", "2600").with_cells(3);
        let s = planner.suggest(&mut alloc, &req).unwrap();

        assert_eq!(pcis_of(&s), vec![Some(0), Some(1), Some(2)]);
        assert_eq!(s.groups[0].rsis, "0;10;20");
        assert_eq!(s.groups[0].technology, "2600R_2600");
    }

    #[test]
    fn unknown_site_is_not_found() {
        let master = mk_master();
        let graph = NeighborGraph::new();
        let planner = Planner::new(&master, &graph);
        let mut alloc = ClusterAllocator::new();

        let err = planner
            .plan(&mut alloc, &Request::new("NOPE", "4G", "800"))
            .unwrap_err();
        match err {
            PlanError::SiteNotFound { site } => assert_eq!(site, "NOPE"),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(alloc.group_count(), 0);
    }
}
