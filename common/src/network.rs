//! Scope data model: addresses, ranges, scope entries and resolved pairs.

pub mod address;
pub mod host;
pub mod range;
pub mod scope;
