//! Application layer: the account directory, the platform-first ownership
//! probe, the settlement-to-payout correlation heuristic and the batch driver
//! that runs them over an id list.

pub mod correlator;
pub mod directory;
pub mod orchestrator;
pub mod resolver;
