//! Revenue business logic - income booked against fields.

use crate::{
    core::field::require_field,
    entities::{Revenue, revenue},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Books a revenue record against a field.
///
/// # Errors
/// Returns an error if:
/// - The date is empty or whitespace-only
/// - The amount is NaN or infinite
/// - The field does not exist
/// - The database insert fails
#[instrument(skip(db))]
pub async fn create_revenue(
    db: &DatabaseConnection,
    field_id: i64,
    date: String,
    source: Option<String>,
    amount: Option<f64>,
) -> Result<revenue::Model> {
    if date.trim().is_empty() {
        return Err(Error::validation("Revenue date cannot be empty"));
    }
    if let Some(value) = amount.filter(|v| !v.is_finite()) {
        return Err(Error::validation(format!(
            "Revenue amount must be a finite number, got {value}"
        )));
    }

    require_field(db, field_id).await?;

    let model = revenue::ActiveModel {
        date: Set(date.trim().to_string()),
        source: Set(source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())),
        amount: Set(amount),
        field_id: Set(field_id),
        ..Default::default()
    };
    let revenue = model.insert(db).await?;
    info!(revenue_id = revenue.id, field_id, "Booked revenue");
    Ok(revenue)
}

/// Retrieves the revenues of a field, newest first.
pub async fn get_revenues_for_field<C>(db: &C, field_id: i64) -> Result<Vec<revenue::Model>>
where
    C: ConnectionTrait,
{
    Revenue::find()
        .filter(revenue::Column::FieldId.eq(field_id))
        .order_by_desc(revenue::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every revenue in insertion order.
pub async fn get_all_revenues(db: &DatabaseConnection) -> Result<Vec<revenue::Model>> {
    Revenue::find()
        .order_by_asc(revenue::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes one revenue record.
///
/// # Errors
/// Returns [`Error::NotFound`] if the record does not exist.
#[instrument(skip(db))]
pub async fn delete_revenue(db: &DatabaseConnection, revenue_id: i64) -> Result<()> {
    let result = Revenue::delete_by_id(revenue_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "revenue",
            id: revenue_id,
        });
    }
    info!(revenue_id, "Deleted revenue");
    Ok(())
}
