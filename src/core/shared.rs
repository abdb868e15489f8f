// allocator shared across threads
use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::allocator::ClusterAllocator;
use crate::core::error::Result;
use crate::core::output::Suggestion;
use crate::core::plan::Planner;
use crate::core::request::Request;
use crate::core::types::Group;
use crate::mapping::inventory::MasterRecord;

/// One planning session used from several threads.
///
/// Every call holds the lock for the whole read-pick-reserve cycle, so a
/// free-set read can never miss a reservation committed by another thread.
#[derive(Clone, Debug, Default)]
pub struct SharedAllocator {
    inner: Arc<Mutex<ClusterAllocator>>,
}

impl SharedAllocator {
    pub fn new(alloc: ClusterAllocator) -> Self {
        SharedAllocator {
            inner: Arc::new(Mutex::new(alloc)),
        }
    }

    pub fn plan<M: MasterRecord + ?Sized>(&self, planner: &Planner<'_, M>, req: &Request) -> Result<Suggestion> {
        let mut alloc = self.inner.lock();
        planner.plan(&mut alloc, req)
    }

    /// Runs `f` with exclusive access, for multi-step work that must not
    /// interleave with other threads.
    pub fn with_session<T>(&self, f: impl FnOnce(&mut ClusterAllocator) -> T) -> T {
        let mut alloc = self.inner.lock();
        f(&mut alloc)
    }

    pub fn reserved_for(&self, group: &Group) -> BTreeSet<u16> {
        self.inner.lock().reserved_for(group)
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use crate::mapping::inventory::{CellInventory, RawCellRow};
    use crate::mapping::neighbors::NeighborGraph;

    fn mk_row(site: &str) -> RawCellRow {
        RawCellRow {
            site: site.to_string(),
            tech: Some("4G".to_string()),
            band: Some("2600".to_string()),
            vendor: Some("ERICSSON".to_string()),
            tac: Some("100".to_string()),
            ..RawCellRow::default()
        }
    }

    #[test]
    fn concurrent_requests_never_collide() {
        let sites: Vec<String> = (0..8).map(|i| format!("S{i}")).collect();
        let master = CellInventory::from_rows(sites.iter().map(|s| mk_row(s)));
        let graph = NeighborGraph::new();
        let shared = SharedAllocator::default();

        let all: Vec<u16> = thread::scope(|scope| {
            let handles: Vec<_> = sites
                .iter()
                .map(|site| {
                    let shared = shared.clone();
                    let planner = Planner::new(&master, &graph);
                    scope.spawn(move || {
                        let req = Request::new(site, "4G", "2600").with_cells(3);
                        let s = shared.plan(&planner, &req).unwrap();
                        s.cells.iter().filter_map(|c| c.pci).collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        let distinct: BTreeSet<u16> = all.iter().copied().collect();
        assert_eq!(all.len(), 24);
        assert_eq!(distinct.len(), 24);
        assert_eq!(shared.reserved_for(&Group::new("100", vec![])), distinct);
    }

    #[test]
    fn reset_clears_every_bucket() {
        let shared = SharedAllocator::new(ClusterAllocator::new());
        let group = Group::new("7", vec![]);
        shared.with_session(|alloc| alloc.reserve(&group, [1u16, 2]));
        assert_eq!(shared.reserved_for(&group), BTreeSet::from([1, 2]));

        shared.reset();
        assert!(shared.reserved_for(&group).is_empty());
        assert_eq!(shared.with_session(|alloc| alloc.group_count()), 0);
    }
}
