//! Shared test utilities for the field ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        field::{self, NewField},
        inventory,
        operation::{self, NewOperation, OperationKind},
        revenue,
    },
    entities,
    errors::Result,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a category directly.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    entities::category::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a field in the given category.
pub async fn create_test_field(
    db: &DatabaseConnection,
    category_id: i64,
    name: &str,
    size_hectares: Option<f64>,
    owner_group: Option<&str>,
) -> Result<entities::field::Model> {
    field::create_field(
        db,
        NewField {
            name: name.to_string(),
            description: Some("Test field".to_string()),
            image_key: None,
            size_hectares,
            owner_group: owner_group.map(ToString::to_string),
            category_id,
        },
    )
    .await
}

/// Creates a chemical with the given stock and price.
pub async fn create_test_chemical(
    db: &DatabaseConnection,
    name: &str,
    quantity_liters: f64,
    price_per_liter: f64,
) -> Result<entities::chemical::Model> {
    inventory::create_chemical(db, name.to_string(), quantity_liters, price_per_liter).await
}

/// Records a plowing operation that only burned fuel.
pub async fn create_fuel_operation(
    db: &DatabaseConnection,
    field_id: i64,
    fuel_liters: f64,
) -> Result<entities::operation::Model> {
    let mut input = NewOperation::new(OperationKind::Plowing);
    input.date = Some("01.04.2025".to_string());
    input.tractor = Some("John Deere 155".to_string());
    input.fuel_consumed = Some(fuel_liters);
    operation::create_operation(db, field_id, input).await
}

/// Records a fertilizing operation with no fuel.
pub async fn create_material_operation(
    db: &DatabaseConnection,
    field_id: i64,
    quantity_per_ha: f64,
    unit_price: f64,
) -> Result<entities::operation::Model> {
    let mut input = NewOperation::new(OperationKind::Fertilizing);
    input.quantity_per_ha = Some(quantity_per_ha);
    input.unit_price = Some(unit_price);
    operation::create_operation(db, field_id, input).await
}

/// Records a spraying operation with no fuel.
pub async fn create_spraying_operation(
    db: &DatabaseConnection,
    field_id: i64,
    chemical_id: i64,
    rate_per_ha: f64,
) -> Result<entities::operation::Model> {
    let mut input = NewOperation::new(OperationKind::Spraying);
    input.quantity_per_ha = Some(rate_per_ha);
    input.chemical_id = Some(chemical_id);
    operation::create_operation(db, field_id, input).await
}

/// Books a revenue with a fixed date.
pub async fn create_test_revenue(
    db: &DatabaseConnection,
    field_id: i64,
    amount: Option<f64>,
) -> Result<entities::revenue::Model> {
    revenue::create_revenue(db, field_id, "15.07.2025".to_string(), None, amount).await
}

/// Sets up a database with one category and one field.
/// Returns (db, field) for common test scenarios.
pub async fn setup_with_field(
    size_hectares: Option<f64>,
    owner_group: Option<&str>,
) -> Result<(DatabaseConnection, entities::field::Model)> {
    let db = setup_test_db().await?;
    let category = create_test_category(&db, "Farma").await?;
    let field = create_test_field(&db, category.id, "Test Field", size_hectares, owner_group)
        .await?;
    Ok((db, field))
}
