//! Report generation business logic.
//!
//! This module assembles the rows behind the printable documents: the expense sheet and
//! revenue sheet of a field, the warehouse inventory, and the ownership overview. Reports
//! carry numbers and labels only; layout, currency formatting and PDF rendering belong to
//! the document renderer that consumes these structs.

use crate::{
    core::{
        field::require_field,
        finance::{self, GroupSummary},
        inventory::get_all_chemicals,
        operation::get_operations_for_field,
        revenue::get_revenues_for_field,
    },
    entities::{field, revenue},
    errors::Result,
};
use chrono::{Local, NaiveDate};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;

/// Cost breakdown of one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseLine {
    /// Operation the line describes
    pub operation_id: i64,
    /// Date label of the operation
    pub date: Option<String>,
    /// Kind of work
    pub kind: String,
    /// Diesel cost
    pub fuel_cost: f64,
    /// Material cost for the whole field
    pub material_cost: f64,
    /// Fuel plus material
    pub total: f64,
}

/// Expense sheet for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseReport {
    /// Day the report was produced
    pub generated_on: NaiveDate,
    /// Field reported on
    pub field: field::Model,
    /// One line per operation, newest first
    pub lines: Vec<ExpenseLine>,
    /// Sum of all line totals
    pub total: f64,
}

/// Revenue sheet for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueReport {
    /// Day the report was produced
    pub generated_on: NaiveDate,
    /// Field reported on
    pub field: field::Model,
    /// Revenue records, newest first
    pub revenues: Vec<revenue::Model>,
    /// Sum of amounts; unset amounts count as zero
    pub total: f64,
}

/// Stock position of one chemical.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryLine {
    /// Chemical the line describes
    pub chemical_id: i64,
    /// Chemical name
    pub name: String,
    /// Liters in stock
    pub quantity_liters: f64,
    /// Current price per liter
    pub price_per_liter: f64,
    /// Quantity times price
    pub value: f64,
}

/// Warehouse inventory sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryReport {
    /// Day the report was produced
    pub generated_on: NaiveDate,
    /// One line per chemical, by name
    pub lines: Vec<InventoryLine>,
    /// Value of the whole warehouse
    pub total_value: f64,
}

/// Ownership overview across groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipReport {
    /// Day the report was produced
    pub generated_on: NaiveDate,
    /// One summary per requested group, in request order
    pub groups: Vec<GroupSummary>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Builds the expense sheet of a field.
///
/// # Errors
/// Returns [`crate::errors::Error::NotFound`] if the field does not exist.
pub async fn generate_expense_report(
    db: &DatabaseConnection,
    field_id: i64,
) -> Result<ExpenseReport> {
    let txn = db.begin().await?;
    let field = require_field(&txn, field_id).await?;
    let operations = get_operations_for_field(&txn, field_id).await?;
    txn.commit().await?;

    let lines: Vec<ExpenseLine> = operations
        .iter()
        .map(|op| {
            let fuel_cost = finance::fuel_cost(op);
            let material_cost = finance::material_cost(op, &field);
            ExpenseLine {
                operation_id: op.id,
                date: op.date.clone(),
                kind: op.kind.clone(),
                fuel_cost,
                material_cost,
                total: fuel_cost + material_cost,
            }
        })
        .collect();
    let total = lines.iter().map(|line| line.total).sum();

    Ok(ExpenseReport {
        generated_on: today(),
        field,
        lines,
        total,
    })
}

/// Builds the revenue sheet of a field.
///
/// # Errors
/// Returns [`crate::errors::Error::NotFound`] if the field does not exist.
pub async fn generate_revenue_report(
    db: &DatabaseConnection,
    field_id: i64,
) -> Result<RevenueReport> {
    let txn = db.begin().await?;
    let field = require_field(&txn, field_id).await?;
    let revenues = get_revenues_for_field(&txn, field_id).await?;
    txn.commit().await?;

    let total = revenues.iter().map(|r| r.amount.unwrap_or(0.0)).sum();
    Ok(RevenueReport {
        generated_on: today(),
        field,
        revenues,
        total,
    })
}

/// Builds the warehouse inventory sheet.
pub async fn generate_inventory_report(db: &DatabaseConnection) -> Result<InventoryReport> {
    let lines: Vec<InventoryLine> = get_all_chemicals(db)
        .await?
        .into_iter()
        .map(|c| {
            let value = c.quantity_liters * c.price_per_liter;
            InventoryLine {
                chemical_id: c.id,
                name: c.name,
                quantity_liters: c.quantity_liters,
                price_per_liter: c.price_per_liter,
                value,
            }
        })
        .collect();
    let total_value = lines.iter().map(|line| line.value).sum();

    Ok(InventoryReport {
        generated_on: today(),
        lines,
        total_value,
    })
}

/// Builds the ownership overview for the given groups.
pub async fn generate_ownership_report<S>(
    db: &DatabaseConnection,
    groups: &[S],
) -> Result<OwnershipReport>
where
    S: AsRef<str>,
{
    let mut summaries = Vec::with_capacity(groups.len());
    for group in groups {
        summaries.push(finance::group_summary(db, group.as_ref()).await?);
    }
    Ok(OwnershipReport {
        generated_on: today(),
        groups: summaries,
    })
}
