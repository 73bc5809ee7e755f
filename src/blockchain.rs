// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// the block model, chain verification and the ledger that appends and looks up.

pub mod core;
pub use self::core::*;
