// per-vendor, per-band identifier pools
use std::collections::HashMap;

use crate::core::types::{Band, IdClass, Vendor};

/// Closed, ordered range of admissible identifiers. Pools for different
/// (vendor, band) pairs are separate id spaces even when their numbers overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pool {
    range: Option<(u16, u16)>,
}

impl Pool {
    pub const fn full(class: IdClass) -> Self {
        Pool {
            range: Some((0, class.max())),
        }
    }

    /// Custom inclusive range, for registries that narrow a vendor's space.
    pub const fn span(lo: u16, hi: u16) -> Self {
        if lo > hi {
            Pool::empty()
        } else {
            Pool { range: Some((lo, hi)) }
        }
    }

    /// "not managed here": callers treat it as zero free identifiers
    pub const fn empty() -> Self {
        Pool { range: None }
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    pub fn len(&self) -> usize {
        match self.range {
            Some((lo, hi)) => usize::from(hi - lo) + 1,
            None => 0,
        }
    }

    pub fn contains(&self, id: u16) -> bool {
        matches!(self.range, Some((lo, hi)) if id >= lo && id <= hi)
    }

    /// Increasing order.
    pub fn iter(self) -> impl Iterator<Item = u16> {
        self.range.into_iter().flat_map(|(lo, hi)| lo..=hi)
    }
}

/// Immutable after construction.
#[derive(Clone, Debug, Default)]
pub struct PoolRegistry {
    pools: HashMap<(Vendor, Band, IdClass), Pool>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        PoolRegistry::default()
    }

    /// ERICSSON and HUAWEI, every managed band, full PCI and RSI ranges.
    pub fn standard() -> Self {
        let mut registry = PoolRegistry::new();
        for vendor in [Vendor::Ericsson, Vendor::Huawei] {
            for band in Band::MANAGED {
                for class in [IdClass::Pci, IdClass::Rsi] {
                    registry = registry.with_pool(vendor.clone(), band, class, Pool::full(class));
                }
            }
        }
        registry
    }

    /// Registers `pool` under (vendor, band, class), replacing any earlier one.
    pub fn with_pool(mut self, vendor: Vendor, band: Band, class: IdClass, pool: Pool) -> Self {
        self.pools.insert((vendor, band, class), pool);
        self
    }

    /// Empty pool for unsupported combinations, never an error.
    pub fn pool_for(&self, vendor: &Vendor, band: Band, class: IdClass) -> Pool {
        self.pools
            .get(&(vendor.clone(), band, class))
            .copied()
            .unwrap_or_else(Pool::empty)
    }

    pub fn is_managed(&self, vendor: &Vendor, band: Band) -> bool {
        !self.pool_for(vendor, band, IdClass::Pci).is_empty()
            || !self.pool_for(vendor, band, IdClass::Rsi).is_empty()
    }
}
