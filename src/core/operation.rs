//! Operation business logic - recording field work and its warehouse side effects.
//!
//! Operations are append-only. Recording a spraying operation also takes the sprayed
//! chemical out of stock; the stock check, the decrement and the operation insert share
//! one transaction, so either all three happen or none do.

use crate::{
    core::{field::require_field, inventory},
    entities::{Operation, operation},
    errors::{Error, Result, ensure_non_negative},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{info, instrument};

/// Kind of field work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Primary tillage
    Plowing,
    /// Deep loosening
    Subsoiling,
    /// Disc harrowing
    Disking,
    /// Seedbed preparation
    SeedbedPrep,
    /// Fertilizer spreading (material-bearing)
    Fertilizing,
    /// Sowing (material-bearing)
    Sowing,
    /// Chemical spraying (material-bearing, consumes warehouse stock)
    Spraying,
    /// Harvest
    Harvest,
}

impl OperationKind {
    /// Every kind, in the order the entry form offers them.
    pub const ALL: [Self; 8] = [
        Self::Plowing,
        Self::Subsoiling,
        Self::Disking,
        Self::SeedbedPrep,
        Self::Fertilizing,
        Self::Sowing,
        Self::Spraying,
        Self::Harvest,
    ];

    /// Stored name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plowing => "Plowing",
            Self::Subsoiling => "Subsoiling",
            Self::Disking => "Disking",
            Self::SeedbedPrep => "SeedbedPrep",
            Self::Fertilizing => "Fertilizing",
            Self::Sowing => "Sowing",
            Self::Spraying => "Spraying",
            Self::Harvest => "Harvest",
        }
    }

    /// Whether the kind applies a material and therefore needs a per-hectare quantity.
    #[must_use]
    pub const fn uses_material(self) -> bool {
        matches!(self, Self::Fertilizing | Self::Sowing | Self::Spraying)
    }

    /// Whether recording this kind consumes warehouse stock.
    #[must_use]
    pub const fn consumes_stock(self) -> bool {
        matches!(self, Self::Spraying)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    /// Parses a kind name case-insensitively; a trailing `*` (the form's marker for
    /// material-bearing kinds) is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().trim_end_matches('*').trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::validation(format!("Unknown operation kind: {s:?}")))
    }
}

/// Input for [`create_operation`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewOperation {
    /// Date label as entered
    pub date: Option<String>,
    /// Kind of work
    pub kind: OperationKind,
    /// Tractor used
    pub tractor: Option<String>,
    /// Attached implement
    pub implement: Option<String>,
    /// Diesel burned, liters
    pub fuel_consumed: Option<f64>,
    /// Worker name
    pub worker: Option<String>,
    /// Material per hectare
    pub quantity_per_ha: Option<f64>,
    /// Material unit price; ignored for spraying, where the chemical's price is used
    pub unit_price: Option<f64>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Chemical to spray (spraying only)
    pub chemical_id: Option<i64>,
}

impl NewOperation {
    /// An operation of `kind` with every optional input unset.
    #[must_use]
    pub const fn new(kind: OperationKind) -> Self {
        Self {
            date: None,
            kind,
            tractor: None,
            implement: None,
            fuel_consumed: None,
            worker: None,
            quantity_per_ha: None,
            unit_price: None,
            notes: None,
            chemical_id: None,
        }
    }
}

/// Checks the kind-specific required inputs and the numeric ranges.
fn validate_new_operation(input: &NewOperation) -> Result<()> {
    ensure_non_negative("Fuel consumption", input.fuel_consumed)?;
    ensure_non_negative("Quantity per hectare", input.quantity_per_ha)?;
    ensure_non_negative("Unit price", input.unit_price)?;

    let kind = input.kind;
    if kind.uses_material() && input.quantity_per_ha.is_none() {
        return Err(Error::validation(format!(
            "{kind} requires a quantity per hectare"
        )));
    }
    if kind.consumes_stock() {
        if input.chemical_id.is_none() {
            return Err(Error::validation(format!(
                "{kind} requires a chemical from the warehouse"
            )));
        }
    } else {
        if input.chemical_id.is_some() {
            return Err(Error::validation(format!(
                "Only spraying can consume a chemical, not {kind}"
            )));
        }
        if kind.uses_material() && input.unit_price.is_none() {
            return Err(Error::validation(format!("{kind} requires a unit price")));
        }
    }
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Records an operation on a field.
///
/// For spraying, the chemical's current price is snapshotted as the unit price and
/// `quantity_per_ha * (field size, or 1 ha when unset)` liters are taken from stock in
/// the same transaction as the insert.
///
/// # Errors
/// Returns an error if:
/// - Kind-specific inputs are missing or numbers are out of range ([`Error::Validation`])
/// - The field or chemical does not exist ([`Error::NotFound`])
/// - The chemical stock is too low ([`Error::InsufficientStock`])
/// - The database write fails
#[instrument(skip(db))]
pub async fn create_operation(
    db: &DatabaseConnection,
    field_id: i64,
    input: NewOperation,
) -> Result<operation::Model> {
    validate_new_operation(&input)?;

    let txn = db.begin().await?;

    let field = require_field(&txn, field_id).await?;

    let mut unit_price = input.unit_price;
    if let Some(chemical_id) = input.chemical_id.filter(|_| input.kind.consumes_stock()) {
        let chemical = inventory::require_chemical(&txn, chemical_id).await?;
        unit_price = Some(chemical.price_per_liter);
        inventory::consume_stock(
            &txn,
            chemical_id,
            input.quantity_per_ha.unwrap_or(0.0),
            field.size_hectares.unwrap_or(1.0),
        )
        .await?;
    }

    let model = operation::ActiveModel {
        date: Set(blank_to_none(input.date)),
        kind: Set(input.kind.as_str().to_string()),
        tractor: Set(blank_to_none(input.tractor)),
        implement: Set(blank_to_none(input.implement)),
        fuel_consumed: Set(input.fuel_consumed),
        worker: Set(blank_to_none(input.worker)),
        quantity_per_ha: Set(input.quantity_per_ha),
        unit_price: Set(unit_price),
        notes: Set(blank_to_none(input.notes)),
        chemical_id: Set(input.chemical_id),
        field_id: Set(field_id),
        ..Default::default()
    };
    let operation = model.insert(&txn).await?;

    txn.commit().await?;

    info!(
        operation_id = operation.id,
        field_id,
        kind = %input.kind,
        "Recorded operation"
    );
    Ok(operation)
}

/// Retrieves the operations of a field, newest first.
pub async fn get_operations_for_field<C>(db: &C, field_id: i64) -> Result<Vec<operation::Model>>
where
    C: ConnectionTrait,
{
    Operation::find()
        .filter(operation::Column::FieldId.eq(field_id))
        .order_by_desc(operation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every operation in insertion order.
pub async fn get_all_operations<C>(db: &C) -> Result<Vec<operation::Model>>
where
    C: ConnectionTrait,
{
    Operation::find()
        .order_by_asc(operation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an operation by its unique ID.
pub async fn get_operation_by_id(
    db: &DatabaseConnection,
    operation_id: i64,
) -> Result<Option<operation::Model>> {
    Operation::find_by_id(operation_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes one operation. Stock consumed by it is not returned to the warehouse.
///
/// # Errors
/// Returns [`Error::NotFound`] if the operation does not exist.
#[instrument(skip(db))]
pub async fn delete_operation(db: &DatabaseConnection, operation_id: i64) -> Result<()> {
    let result = Operation::delete_by_id(operation_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "operation",
            id: operation_id,
        });
    }
    info!(operation_id, "Deleted operation");
    Ok(())
}

/// Deletes a set of operations in one transaction and returns how many rows went away.
///
/// Ids that do not exist are skipped.
#[instrument(skip(db))]
pub async fn delete_operations(db: &DatabaseConnection, operation_ids: &[i64]) -> Result<u64> {
    if operation_ids.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;
    let result = Operation::delete_many()
        .filter(operation::Column::Id.is_in(operation_ids.iter().copied()))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    info!(deleted = result.rows_affected, "Deleted operations");
    Ok(result.rows_affected)
}
