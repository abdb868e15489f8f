use thiserror::Error;

use crate::mapping::loader::LoadError;

/// The result type for planning operations.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Failures of a single planning request.
///
/// Running out of identifiers is not in here: an unmanaged pool or a short
/// free set degrades to empty-sentinel slots and a warning.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The requested site has no rows in the master record.
    #[error("site {site} not found in master record")]
    SiteNotFound { site: String },

    /// An input file could not be read.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl PlanError {
    /// Whether a batch driver may skip the item and carry on.
    pub fn is_per_request(&self) -> bool {
        matches!(self, PlanError::SiteNotFound { .. })
    }
}
