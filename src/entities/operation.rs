//! Operation entity - One piece of field work (plowing, sowing, spraying, ...).
//!
//! Operations are written once and never updated in place. Costs are not stored:
//! fuel and material costs are recomputed from these columns on every read.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operations")]
pub struct Model {
    /// Unique identifier for the operation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Date label as entered (e.g., `"14.03.2025"`)
    pub date: Option<String>,
    /// Kind of work, stored as the `OperationKind` name
    pub kind: String,
    /// Tractor used
    pub tractor: Option<String>,
    /// Attached implement used
    pub implement: Option<String>,
    /// Diesel burned, in liters
    pub fuel_consumed: Option<f64>,
    /// Name of the worker
    pub worker: Option<String>,
    /// Material applied per hectare (kg/ha, or L/ha for spraying)
    pub quantity_per_ha: Option<f64>,
    /// Price per unit of material, snapshotted when the operation is recorded
    pub unit_price: Option<f64>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Chemical consumed by a spraying operation
    pub chemical_id: Option<i64>,
    /// Field the work was done on
    pub field_id: i64,
}

/// Defines relationships between Operation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each operation belongs to one field
    #[sea_orm(
        belongs_to = "super::field::Entity",
        from = "Column::FieldId",
        to = "super::field::Column::Id"
    )]
    Field,
    /// A spraying operation references the chemical it consumed
    #[sea_orm(
        belongs_to = "super::chemical::Entity",
        from = "Column::ChemicalId",
        to = "super::chemical::Column::Id",
        on_delete = "SetNull"
    )]
    Chemical,
}

impl Related<super::field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Field.def()
    }
}

impl Related<super::chemical::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chemical.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
