//! Domain model: read-only projections of the payments platform's objects and
//! the outcomes produced by the resolution and correlation algorithms.

pub mod account;
pub mod payment;
pub mod ports;
pub mod report;
pub mod resolution;
