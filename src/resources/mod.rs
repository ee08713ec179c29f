//! API resource implementations

/// Card generation endpoints (streaming, synchronous, batch)
pub mod generate;

pub use generate::Generate;
