// collaborators the planner reads from: label normalization, master record,
// neighbor table, and the TOON loaders that build them
pub mod inventory;
pub mod loader;
pub mod neighbors;
pub mod normalize;
