//! The scopr engine.
//!
//! Five stages run in dependency order, each feeding the next:
//!
//! 1. [`scope`] parses the scope file and expands CIDR ranges.
//! 2. [`apex`] reduces hostnames to registrable apex domains.
//! 3. [`discovery`] fans out to every discovery source and unions the results.
//! 4. [`resolver`] resolves the candidate frontier to hostname/address pairs.
//! 5. [`classify`] sorts resolved pairs into in-scope and out-of-scope.
//!
//! [`pipeline`] wires them together and persists every stage's output.

pub mod apex;
pub mod classify;
pub mod discovery;
pub mod pipeline;
pub mod resolver;
pub mod scope;
pub mod tools;
