//! PCI / RSI identifier planning for new radio cells.
//!
//! `core` holds the allocation engine (pools, the per-run cluster allocator,
//! selection policies and the planning orchestrator). `mapping` holds the
//! collaborators it consumes: label normalization, the master record of cells
//! already in service, the neighbor table and the TOON loaders for all three.

pub mod core;
pub mod mapping;

pub use crate::core::allocator::ClusterAllocator;
pub use crate::core::error::{PlanError, Result};
pub use crate::core::plan::Planner;
pub use crate::core::pool::PoolRegistry;
pub use crate::core::request::Request;
pub use crate::core::types::{Band, Group, IdClass, Slot, Suffix, TechGroup, Vendor};
