pub mod cache;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod memory_access;
pub mod replay;

pub use cache::Cache;
pub use config::{Associativity, CacheConfig, Geometry};
pub use hierarchy::{AccessResult, AccessState, CacheSystem};
pub use memory_access::MemoryAccess;
pub use replay::{Stats, replay};
