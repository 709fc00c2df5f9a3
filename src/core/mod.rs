//! Core business logic - framework-agnostic ledger operations.
//!
//! The inventory ledger ([`inventory`]) and the financial aggregator ([`finance`]) carry
//! the cross-entity invariants; the remaining modules are plain reads and writes that
//! the presentation layer calls into.

/// Field categories
pub mod category;
/// Fields and ownership groups
pub mod field;
/// Expense and revenue rollups
pub mod finance;
/// Chemical stock ledger
pub mod inventory;
/// Field operations and their stock side effects
pub mod operation;
/// Report rows for the document renderer
pub mod report;
/// Revenue records
pub mod revenue;
/// Idempotent first-launch seeding
pub mod seed;
