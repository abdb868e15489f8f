// in-run reservation bookkeeping
use std::collections::{BTreeSet, HashMap};

use crate::core::pool::PoolRegistry;
use crate::core::types::{Band, Group, IdClass, Slot, Vendor};

/// Session object for one planning run.
///
/// Tracks which PCIs were handed out to which group since the last `reset`,
/// so that two suggestions made in the same run never collide even before
/// either reaches the master record. Not a singleton: construct one per run
/// and pass it by `&mut` to every planning call of that run.
#[derive(Clone, Debug)]
pub struct ClusterAllocator {
    pools: PoolRegistry,
    reserved: HashMap<Group, BTreeSet<u16>>,
}

impl Default for ClusterAllocator {
    fn default() -> Self {
        ClusterAllocator::new()
    }
}

impl ClusterAllocator {
    /// Allocator over the standard ERICSSON/HUAWEI pools.
    pub fn new() -> Self {
        ClusterAllocator::with_pools(PoolRegistry::standard())
    }

    pub fn with_pools(pools: PoolRegistry) -> Self {
        ClusterAllocator {
            pools,
            reserved: HashMap::new(),
        }
    }

    pub fn pools(&self) -> &PoolRegistry {
        &self.pools
    }

    /// `pool - excluded - reservations`, keeping only ids `>= floor`, in pool order.
    ///
    /// For the PCI class the union of *every* group's reservations is
    /// subtracted, not just the caller's group: that is what keeps two
    /// overlapping groups from being handed the same PCI in one run.
    /// Reservations only ever hold PCIs, so RSI queries subtract `excluded`
    /// alone. The caller must already have folded the master record's used
    /// set into `excluded`.
    ///
    /// Lazy and single-pass; call again for a fresh view.
    pub fn free_identifiers<'a>(
        &'a self,
        vendor: &Vendor,
        band: Band,
        class: IdClass,
        excluded: &'a BTreeSet<u16>,
        floor: u16,
    ) -> impl Iterator<Item = u16> + 'a {
        let pool = self.pools.pool_for(vendor, band, class);
        let subtract_reserved = class == IdClass::Pci;
        pool.iter().filter(move |&id| {
            id >= floor
                && !excluded.contains(&id)
                && !(subtract_reserved && self.is_reserved_anywhere(id))
        })
    }

    /// Commits identifiers to `group`. Empty-sentinel slots are skipped.
    pub fn reserve<I, T>(&mut self, group: &Group, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Slot>,
    {
        let mut ids = ids
            .into_iter()
            .filter_map(|id| -> Slot { id.into() })
            .peekable();
        if ids.peek().is_none() {
            return;
        }
        self.reserved.entry(group.clone()).or_default().extend(ids);
    }

    /// Ids committed to this exact membership set; empty if never reserved.
    pub fn reserved_for(&self, group: &Group) -> BTreeSet<u16> {
        self.reserved.get(group).cloned().unwrap_or_default()
    }

    pub fn is_reserved_anywhere(&self, id: u16) -> bool {
        self.reserved.values().any(|ids| ids.contains(&id))
    }

    /// Number of distinct reservation buckets.
    pub fn group_count(&self) -> usize {
        self.reserved.len()
    }

    /// Starts an independent planning session; the pools are kept.
    pub fn reset(&mut self) {
        self.reserved.clear();
    }
}
