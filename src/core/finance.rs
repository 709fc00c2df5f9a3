//! Financial rollups - expenses, revenues and balances per field and per ownership group.
//!
//! Nothing here is cached or stored. Every call reads the matching operation and revenue
//! rows and recomputes the totals, so a write is visible on the next read.
//!
//! Formulas:
//! - fuel cost = `fuel_consumed ?? 0` × [`FUEL_PRICE_PER_LITER`]
//! - material cost = `quantity_per_ha ?? 0` × `unit_price ?? 0` × `field size ?? 1`
//! - operation expense = fuel cost + material cost
//! - balance = revenue − expense

use crate::{
    core::{
        field::{get_fields_for_group, require_field},
        operation::get_operations_for_field,
        revenue::get_revenues_for_field,
    },
    entities::{Operation, Revenue, field, operation, revenue},
    errors::Result,
};
use sea_orm::{TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Fixed diesel price used for every operation.
pub const FUEL_PRICE_PER_LITER: f64 = 120.0;

/// Area assumed for a field whose size was never entered.
pub const UNSIZED_FIELD_HECTARES: f64 = 1.0;

/// Cost of the diesel an operation burned.
#[must_use]
pub fn fuel_cost(op: &operation::Model) -> f64 {
    op.fuel_consumed.unwrap_or(0.0) * FUEL_PRICE_PER_LITER
}

/// Cost of the material an operation applied to the whole field.
///
/// An unsized field counts as one hectare, so the per-hectare rate is taken as absolute.
#[must_use]
pub fn material_cost(op: &operation::Model, field: &field::Model) -> f64 {
    op.quantity_per_ha.unwrap_or(0.0)
        * op.unit_price.unwrap_or(0.0)
        * field.size_hectares.unwrap_or(UNSIZED_FIELD_HECTARES)
}

/// Total cost of one operation.
#[must_use]
pub fn operation_expense(op: &operation::Model, field: &field::Model) -> f64 {
    fuel_cost(op) + material_cost(op, field)
}

fn revenue_amount(revenue: &revenue::Model) -> f64 {
    revenue.amount.unwrap_or(0.0)
}

/// Rollup for a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    /// Field the figures belong to
    pub field_id: i64,
    /// Sum of revenue amounts
    pub total_revenue: f64,
    /// Sum of operation expenses
    pub total_expense: f64,
    /// Revenue minus expense
    pub balance: f64,
    /// Diesel burned across all operations, liters
    pub total_fuel_liters: f64,
}

/// Rollup for an ownership group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Group label as requested
    pub group: String,
    /// Number of fields in the group
    pub field_count: usize,
    /// Sum of revenue amounts over the group's fields
    pub total_revenue: f64,
    /// Sum of operation expenses over the group's fields
    pub total_expense: f64,
    /// Revenue minus expense
    pub balance: f64,
}

/// Sum of operation expenses for a field.
///
/// # Errors
/// Returns [`crate::errors::Error::NotFound`] if the field does not exist.
pub async fn field_total_expense<C>(db: &C, field_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let field = require_field(db, field_id).await?;
    let operations = get_operations_for_field(db, field_id).await?;
    Ok(operations
        .iter()
        .map(|op| operation_expense(op, &field))
        .sum())
}

/// Sum of revenue amounts for a field; unset amounts count as zero.
///
/// # Errors
/// Returns [`crate::errors::Error::NotFound`] if the field does not exist.
pub async fn field_total_revenue<C>(db: &C, field_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    require_field(db, field_id).await?;
    let revenues = get_revenues_for_field(db, field_id).await?;
    Ok(revenues.iter().map(revenue_amount).sum())
}

/// Diesel burned on a field across all its operations, in liters.
///
/// # Errors
/// Returns [`crate::errors::Error::NotFound`] if the field does not exist.
pub async fn field_total_fuel_liters<C>(db: &C, field_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    require_field(db, field_id).await?;
    let operations = get_operations_for_field(db, field_id).await?;
    Ok(operations
        .iter()
        .map(|op| op.fuel_consumed.unwrap_or(0.0))
        .sum())
}

/// All per-field figures, read from one transaction.
pub async fn field_summary(db: &DatabaseConnection, field_id: i64) -> Result<FieldSummary> {
    let txn = db.begin().await?;
    let total_revenue = field_total_revenue(&txn, field_id).await?;
    let total_expense = field_total_expense(&txn, field_id).await?;
    let total_fuel_liters = field_total_fuel_liters(&txn, field_id).await?;
    txn.commit().await?;

    Ok(FieldSummary {
        field_id,
        total_revenue,
        total_expense,
        balance: total_revenue - total_expense,
        total_fuel_liters,
    })
}

/// Number of fields whose owner group matches `group`.
pub async fn group_field_count<C>(db: &C, group: &str) -> Result<usize>
where
    C: ConnectionTrait,
{
    Ok(get_fields_for_group(db, group).await?.len())
}

/// Sum of revenue amounts over every field of the group.
///
/// Matching is case- and whitespace-insensitive; an unknown group sums to zero.
pub async fn group_total_revenue<C>(db: &C, group: &str) -> Result<f64>
where
    C: ConnectionTrait,
{
    let field_ids: Vec<i64> = get_fields_for_group(db, group)
        .await?
        .into_iter()
        .map(|f| f.id)
        .collect();
    if field_ids.is_empty() {
        return Ok(0.0);
    }

    let revenues = Revenue::find()
        .filter(revenue::Column::FieldId.is_in(field_ids))
        .all(db)
        .await?;
    Ok(revenues.iter().map(revenue_amount).sum())
}

/// Sum of operation expenses over every field of the group.
///
/// Matching is case- and whitespace-insensitive; an unknown group sums to zero.
pub async fn group_total_expense<C>(db: &C, group: &str) -> Result<f64>
where
    C: ConnectionTrait,
{
    let fields: HashMap<i64, field::Model> = get_fields_for_group(db, group)
        .await?
        .into_iter()
        .map(|f| (f.id, f))
        .collect();
    if fields.is_empty() {
        return Ok(0.0);
    }

    let operations = Operation::find()
        .filter(operation::Column::FieldId.is_in(fields.keys().copied()))
        .all(db)
        .await?;
    Ok(operations
        .iter()
        .filter_map(|op| fields.get(&op.field_id).map(|f| operation_expense(op, f)))
        .sum())
}

/// Revenue minus expense for the group.
pub async fn group_balance<C>(db: &C, group: &str) -> Result<f64>
where
    C: ConnectionTrait,
{
    let revenue = group_total_revenue(db, group).await?;
    let expense = group_total_expense(db, group).await?;
    Ok(revenue - expense)
}

/// All group figures, read from one transaction.
pub async fn group_summary(db: &DatabaseConnection, group: &str) -> Result<GroupSummary> {
    let txn = db.begin().await?;
    let field_count = group_field_count(&txn, group).await?;
    let total_revenue = group_total_revenue(&txn, group).await?;
    let total_expense = group_total_expense(&txn, group).await?;
    txn.commit().await?;

    debug!(group, field_count, total_revenue, total_expense, "Computed group summary");
    Ok(GroupSummary {
        group: group.to_string(),
        field_count,
        total_revenue,
        total_expense,
        balance: total_revenue - total_expense,
    })
}
