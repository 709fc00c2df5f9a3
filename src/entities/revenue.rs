//! Revenue entity - Income booked against a field (crop sale, subsidy, ...).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Revenue database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revenues")]
pub struct Model {
    /// Unique identifier for the revenue record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Date label as entered
    pub date: String,
    /// Where the money came from
    pub source: Option<String>,
    /// Amount received; unset counts as zero in every sum
    pub amount: Option<f64>,
    /// Field the income is booked against
    pub field_id: i64,
}

/// Defines relationships between Revenue and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each revenue belongs to one field
    #[sea_orm(
        belongs_to = "super::field::Entity",
        from = "Column::FieldId",
        to = "super::field::Column::Id"
    )]
    Field,
}

impl Related<super::field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Field.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
