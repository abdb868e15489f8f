pub mod allocator;
pub mod batch;
pub mod error;
pub mod mapping;
pub mod naming;
pub mod output;
pub mod plan;
pub mod pool;
pub mod request;
pub mod shared;
pub mod suggest;
pub mod types;
