//! Chemical entity - A stock item in the spraying warehouse.
//!
//! `quantity_liters` never goes below zero; it grows through explicit restocking and
//! shrinks when a spraying operation consumes it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Chemical stock database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chemicals")]
pub struct Model {
    /// Unique identifier for the chemical
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product name (e.g., "Glyphosate")
    pub name: String,
    /// Liters currently in stock
    pub quantity_liters: f64,
    /// Current purchase price per liter
    pub price_per_liter: f64,
}

/// Defines relationships between Chemical and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One chemical is consumed by many spraying operations
    #[sea_orm(has_many = "super::operation::Entity")]
    Operations,
}

impl Related<super::operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
