// Block model and hashing, link verification, and the ledger built on both.
pub mod chain;
pub mod ledger;
pub mod validation;

pub use chain::*;
pub use ledger::*;
pub use validation::*;
