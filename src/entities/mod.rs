//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the five ledger tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod chemical;
pub mod field;
pub mod operation;
pub mod revenue;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use chemical::{Column as ChemicalColumn, Entity as Chemical, Model as ChemicalModel};
pub use field::{Column as FieldColumn, Entity as Field, Model as FieldModel};
pub use operation::{Column as OperationColumn, Entity as Operation, Model as OperationModel};
pub use revenue::{Column as RevenueColumn, Entity as Revenue, Model as RevenueModel};
