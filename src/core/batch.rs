// many requests, one session
use std::collections::HashSet;

use tracing::{info, warn};

use crate::core::allocator::ClusterAllocator;
use crate::core::error::Result;
use crate::core::output::Suggestion;
use crate::core::plan::Planner;
use crate::core::request::Request;
use crate::core::types::Band;
use crate::mapping::inventory::MasterRecord;

/// A request the batch could not plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skipped {
    pub site: String,
    pub band: Band,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub suggestion: Suggestion,
    pub skipped: Vec<Skipped>,
}

impl<M: MasterRecord + ?Sized> Planner<'_, M> {
    /// Plans every request against the same allocator, so later requests see
    /// what earlier ones reserved.
    ///
    /// Only the first request per (site, band) is planned. A site missing
    /// from the master record skips that request and the batch goes on; any
    /// other error aborts it.
    pub fn plan_batch(
        &self,
        alloc: &mut ClusterAllocator,
        requests: impl IntoIterator<Item = Request>,
    ) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        let mut seen: HashSet<(String, Band)> = HashSet::new();

        for req in requests {
            if !seen.insert((req.site.clone(), req.band)) {
                continue;
            }
            match self.plan(alloc, &req) {
                Ok(s) => outcome.suggestion.extend(s),
                Err(e) if e.is_per_request() => {
                    warn!("skipping {} {}: {}", req.site, req.band, e);
                    outcome.skipped.push(Skipped {
                        site: req.site.clone(),
                        band: req.band,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "batch done: {} group(s), {} cell(s), {} skipped",
            outcome.suggestion.groups.len(),
            outcome.suggestion.cells.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }
}
