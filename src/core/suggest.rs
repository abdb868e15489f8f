// identifier selection policies
/*

PCI, block mode:      first free base with base % 3 == 0, then base..base+n.
                      Members missing from the free set are holes (None),
                      not failures. No aligned base at all -> first n free.

PCI, congruent mode:  one pick per position of an already-planned layer:
                      the first free id with the same residue mod 3.
                      Positions are independent, no contiguity.

RSI, spaced:          first_free + i * step. Terms are NOT checked against the
                      free set or the pool; only the first is known to be free.

RSI, take-first:      first n free ids, padded with None.

*/
use std::collections::BTreeSet;

use crate::core::types::{Band, Slot, Vendor};

/// PCIs are planned in sector triplets.
pub const PCI_ALIGNMENT: u16 = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PciPolicy {
    Block,
    /// residue (mod 3) per cell of the layer being matched; `None` for cells
    /// that layer could not allocate
    Congruent(Vec<Option<u8>>),
}

impl PciPolicy {
    /// Congruent mode only when there is a pattern to follow.
    pub fn from_residues(residues: Option<Vec<Option<u8>>>) -> Self {
        match residues {
            Some(pattern) if !pattern.is_empty() => PciPolicy::Congruent(pattern),
            _ => PciPolicy::Block,
        }
    }

    /// Congruent mode yields one slot per residue, ignoring `n`.
    pub fn pick(&self, free: &BTreeSet<u16>, n: usize, floor: u16) -> Vec<Slot> {
        match self {
            PciPolicy::Block => pci_block(free, n, floor),
            PciPolicy::Congruent(residues) => pci_congruent(free, residues),
        }
    }
}

pub fn pci_block(free: &BTreeSet<u16>, n: usize, floor: u16) -> Vec<Slot> {
    let candidates = free.range(floor..).copied();

    if let Some(base) = candidates.clone().find(|id| id % PCI_ALIGNMENT == 0) {
        return (0..n)
            .map(|i| {
                u16::try_from(usize::from(base) + i)
                    .ok()
                    .filter(|id| free.contains(id))
            })
            .collect();
    }

    //no aligned base: ungrouped, possibly partial
    let mut out: Vec<Slot> = candidates.take(n).map(Some).collect();
    out.resize(n, None);
    out
}

pub fn pci_congruent(free: &BTreeSet<u16>, residues: &[Option<u8>]) -> Vec<Slot> {
    residues
        .iter()
        .map(|residue| {
            let r = u16::from((*residue)?);
            free.iter().copied().find(|id| id % PCI_ALIGNMENT == r)
        })
        .collect()
}

/// Residue pattern of a planned PCI layer, position by position.
pub fn residues(slots: &[Slot]) -> Vec<Option<u8>> {
    slots
        .iter()
        .map(|slot| slot.map(|id| (id % PCI_ALIGNMENT) as u8))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RsiPolicy {
    Spaced { step: u16 },
    TakeFirst,
}

impl RsiPolicy {
    pub fn for_vendor(vendor: &Vendor, band: Band) -> Self {
        match vendor {
            Vendor::Ericsson if band == Band::B3500 => RsiPolicy::Spaced { step: 8 },
            Vendor::Ericsson => RsiPolicy::Spaced { step: 10 },
            _ => RsiPolicy::TakeFirst,
        }
    }

    pub fn pick(&self, free: &BTreeSet<u16>, n: usize) -> Vec<Slot> {
        match *self {
            RsiPolicy::Spaced { step } => {
                let Some(&first) = free.first() else {
                    return vec![None; n];
                };
                //emitted as computed, even past the pool's end
                (0..n)
                    .map(|i| u16::try_from(usize::from(first) + i * usize::from(step)).ok())
                    .collect()
            }
            RsiPolicy::TakeFirst => {
                let mut out: Vec<Slot> = free.iter().copied().take(n).map(Some).collect();
                out.resize(n, None);
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mk_free(ids: impl IntoIterator<Item = u16>) -> BTreeSet<u16> {
        ids.into_iter().collect()
    }

    fn full_pci_minus(used: &[u16]) -> BTreeSet<u16> {
        mk_free((0..=503).filter(|id| !used.contains(id)))
    }

    #[test]
    fn block_starts_at_first_aligned_free_id() {
        let free = full_pci_minus(&[5, 6, 7]);
        assert_eq!(pci_block(&free, 3, 0), vec![Some(0), Some(1), Some(2)]);

        let free = full_pci_minus(&[0, 1, 2]);
        assert_eq!(pci_block(&free, 3, 0), vec![Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn block_reports_holes_instead_of_skipping() {
        //3 free and aligned, 4 taken
        let free = mk_free([3, 5, 6, 7, 8]);
        assert_eq!(pci_block(&free, 3, 0), vec![Some(3), None, Some(5)]);
    }

    #[test]
    fn block_respects_floor() {
        let free = full_pci_minus(&[]);
        assert_eq!(pci_block(&free, 2, 10), vec![Some(12), Some(13)]);
    }

    #[test]
    fn block_falls_back_to_first_free_when_nothing_is_aligned() {
        let free = mk_free([1, 4, 5]);
        assert_eq!(
            pci_block(&free, 4, 0),
            vec![Some(1), Some(4), Some(5), None]
        );
        assert_eq!(pci_block(&BTreeSet::new(), 2, 0), vec![None, None]);
    }

    #[test]
    fn block_runs_off_the_end_of_the_pool_as_holes() {
        let free = mk_free([501, 502, 503]);
        assert_eq!(pci_block(&free, 4, 0), vec![Some(501), Some(502), Some(503), None]);
    }

    #[test]
    fn congruent_picks_first_free_per_residue() {
        let free = mk_free([10, 11, 13, 14, 16]);
        let primary = vec![Some(0), Some(1), Some(2)];

        let got = pci_congruent(&free, &residues(&primary));

        //nothing in the free set is ≡ 0 (mod 3)
        assert_eq!(got, vec![None, Some(10), Some(11)]);
    }

    #[test]
    fn congruent_passes_through_primary_holes_and_repeats_picks() {
        let free = mk_free([3, 4, 5]);
        let got = pci_congruent(&free, &[Some(1), None, Some(1)]);
        assert_eq!(got, vec![Some(4), None, Some(4)]);
    }

    #[test]
    fn policy_selection_from_residue_pattern() {
        assert_eq!(PciPolicy::from_residues(None), PciPolicy::Block);
        assert_eq!(PciPolicy::from_residues(Some(vec![])), PciPolicy::Block);
        assert_eq!(
            PciPolicy::from_residues(Some(vec![None])),
            PciPolicy::Congruent(vec![None])
        );
    }

    #[test]
    fn rsi_policy_by_vendor_and_band() {
        assert_eq!(
            RsiPolicy::for_vendor(&Vendor::Ericsson, Band::B3500),
            RsiPolicy::Spaced { step: 8 }
        );
        assert_eq!(
            RsiPolicy::for_vendor(&Vendor::Ericsson, Band::N78),
            RsiPolicy::Spaced { step: 10 }
        );
        assert_eq!(
            RsiPolicy::for_vendor(&Vendor::Huawei, Band::B3500),
            RsiPolicy::TakeFirst
        );
    }

    #[test]
    fn spaced_rsi_does_not_validate_terms() {
        //12 is taken but still emitted; 850 is past the RSI pool
        let free = mk_free([2, 3, 4]);
        let got = RsiPolicy::Spaced { step: 10 }.pick(&free, 3);
        assert_eq!(got, vec![Some(2), Some(12), Some(22)]);

        let free = mk_free([830]);
        let got = RsiPolicy::Spaced { step: 10 }.pick(&free, 3);
        assert_eq!(got, vec![Some(830), Some(840), Some(850)]);

        assert_eq!(
            RsiPolicy::Spaced { step: 8 }.pick(&BTreeSet::new(), 2),
            vec![None, None]
        );
    }

    #[test]
    fn take_first_rsi_pads_with_sentinels() {
        let free = mk_free([7, 9]);
        assert_eq!(
            RsiPolicy::TakeFirst.pick(&free, 3),
            vec![Some(7), Some(9), None]
        );
    }

    proptest! {
        #[test]
        fn block_is_deterministic_and_contiguous_when_complete(
            free in proptest::collection::btree_set(0u16..504, 0..504),
            n in 1usize..8,
            floor in 0u16..504,
        ) {
            let first = pci_block(&free, n, floor);
            let second = pci_block(&free, n, floor);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), n);

            if first.iter().all(Option::is_some) {
                let ids: Vec<u16> = first.iter().flatten().copied().collect();
                let aligned = free.range(floor..).any(|id| id % 3 == 0);
                if aligned {
                    prop_assert_eq!(ids[0] % 3, 0);
                    for (i, id) in ids.iter().enumerate() {
                        prop_assert_eq!(*id, ids[0] + i as u16);
                    }
                }
                for id in &ids {
                    prop_assert!(free.contains(id));
                    prop_assert!(*id >= floor);
                }
            }
        }

        #[test]
        fn spaced_rsi_follows_its_step(
            free in proptest::collection::btree_set(0u16..838, 1..100),
            n in 1usize..6,
        ) {
            let got = RsiPolicy::for_vendor(&Vendor::Ericsson, Band::B3500).pick(&free, n);
            let base = got[0].unwrap();
            prop_assert_eq!(Some(&base), free.first());
            for (i, slot) in got.iter().enumerate() {
                prop_assert_eq!(*slot, Some(base + 8 * i as u16));
            }
        }
    }
}
