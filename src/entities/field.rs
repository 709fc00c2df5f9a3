//! Field entity - A parcel of farmland.
//!
//! `size_hectares` multiplies per-hectare material rates and `owner_group` is the
//! grouping key for ownership rollups. Both may be unset.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Field database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fields")]
pub struct Model {
    /// Unique identifier for the field
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the field, unique within the seed catalogue
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Key of the picture shown for this field
    pub image_key: Option<String>,
    /// Area in hectares, if surveyed
    pub size_hectares: Option<f64>,
    /// Ownership group label (matched case- and whitespace-insensitively)
    pub owner_group: Option<String>,
    /// Category this field belongs to
    pub category_id: i64,
}

/// Defines relationships between Field and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each field belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// One field has many operations
    #[sea_orm(has_many = "super::operation::Entity")]
    Operations,
    /// One field has many revenues
    #[sea_orm(has_many = "super::revenue::Entity")]
    Revenues,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl Related<super::revenue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Revenues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
