//! Chemical stock ledger - keeps warehouse quantities non-negative.
//!
//! Stock enters through [`create_chemical`] and [`add_stock`] and leaves through spraying
//! consumption. Consumption is a check-then-decrement that must never overdraw an item,
//! even when two sprayings of the same chemical are recorded at the same time. Two
//! mechanisms enforce that:
//!
//! 1. the read, the check and the write run inside one database transaction, and
//! 2. the write itself is a guarded update
//!    (`SET quantity = quantity - n WHERE id = ? AND quantity >= n`), so a writer that
//!    lost the race affects zero rows and is rejected instead of driving stock negative.
//!
//! A rejected consumption leaves the stored quantity untouched.

use crate::{
    entities::{Chemical, chemical},
    errors::{Error, Result, ensure_non_negative},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument, warn};

/// Retrieves all chemicals ordered alphabetically by name.
pub async fn get_all_chemicals<C>(db: &C) -> Result<Vec<chemical::Model>>
where
    C: ConnectionTrait,
{
    Chemical::find()
        .order_by_asc(chemical::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a chemical by its unique ID.
pub async fn get_chemical_by_id<C>(db: &C, chemical_id: i64) -> Result<Option<chemical::Model>>
where
    C: ConnectionTrait,
{
    Chemical::find_by_id(chemical_id)
        .one(db)
        .await
        .map_err(Into::into)
}

pub(crate) async fn require_chemical<C>(db: &C, chemical_id: i64) -> Result<chemical::Model>
where
    C: ConnectionTrait,
{
    get_chemical_by_id(db, chemical_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "chemical",
            id: chemical_id,
        })
}

/// Creates a new stock item.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The quantity or price is negative or not finite
/// - The database insert fails
#[instrument(skip(db))]
pub async fn create_chemical(
    db: &DatabaseConnection,
    name: String,
    quantity_liters: f64,
    price_per_liter: f64,
) -> Result<chemical::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Chemical name cannot be empty"));
    }
    ensure_non_negative("Quantity", Some(quantity_liters))?;
    ensure_non_negative("Price per liter", Some(price_per_liter))?;

    let model = chemical::ActiveModel {
        name: Set(name.trim().to_string()),
        quantity_liters: Set(quantity_liters),
        price_per_liter: Set(price_per_liter),
        ..Default::default()
    };
    let chemical = model.insert(db).await?;
    info!(chemical_id = chemical.id, "Added {} to the warehouse", chemical.name);
    Ok(chemical)
}

/// Increments an item's stock by `amount_liters`.
///
/// The increment is a single `quantity = quantity + amount` update.
///
/// # Errors
/// Returns [`Error::Validation`] if the amount is not a positive finite number, the
/// item does not exist or the new quantity would not be finite, and
/// [`Error::Storage`] if the update fails.
#[instrument(skip(db))]
pub async fn add_stock(
    db: &DatabaseConnection,
    chemical_id: i64,
    amount_liters: f64,
) -> Result<chemical::Model> {
    if !amount_liters.is_finite() || amount_liters <= 0.0 {
        return Err(Error::validation(format!(
            "Stock to add must be a positive number, got {amount_liters}"
        )));
    }

    let txn = db.begin().await?;

    let Some(current) = get_chemical_by_id(&txn, chemical_id).await? else {
        return Err(Error::validation(format!(
            "Chemical {chemical_id} does not exist"
        )));
    };
    if !(current.quantity_liters + amount_liters).is_finite() {
        return Err(Error::validation(format!(
            "Adding {amount_liters} L to {} would exceed the storable quantity",
            current.name
        )));
    }

    let updated = Chemical::update_many()
        .col_expr(
            chemical::Column::QuantityLiters,
            Expr::col(chemical::Column::QuantityLiters).add(amount_liters),
        )
        .filter(chemical::Column::Id.eq(chemical_id))
        .exec(&txn)
        .await?;
    if updated.rows_affected == 0 {
        return Err(Error::validation(format!(
            "Chemical {chemical_id} does not exist"
        )));
    }

    let chemical = require_chemical(&txn, chemical_id).await?;
    txn.commit().await?;

    info!(
        chemical_id,
        amount_liters,
        quantity_liters = chemical.quantity_liters,
        "Restocked {}",
        chemical.name
    );
    Ok(chemical)
}

/// Takes `per_hectare_rate * field_size_hectares` liters out of stock on the given
/// connection, which is expected to be an open transaction.
///
/// Returns the quantity left in stock.
pub(crate) async fn consume_stock<C>(
    conn: &C,
    chemical_id: i64,
    per_hectare_rate: f64,
    field_size_hectares: f64,
) -> Result<f64>
where
    C: ConnectionTrait,
{
    ensure_non_negative("Rate per hectare", Some(per_hectare_rate))?;
    ensure_non_negative("Field size", Some(field_size_hectares))?;
    let total_consumed = per_hectare_rate * field_size_hectares;
    if !total_consumed.is_finite() {
        return Err(Error::validation("Consumed quantity is out of range"));
    }

    let chemical = require_chemical(conn, chemical_id).await?;
    if total_consumed > chemical.quantity_liters {
        warn!(
            chemical_id,
            required = total_consumed,
            available = chemical.quantity_liters,
            "Rejected spraying: not enough {} in stock",
            chemical.name
        );
        return Err(Error::InsufficientStock {
            name: chemical.name,
            required: total_consumed,
            available: chemical.quantity_liters,
        });
    }

    let updated = Chemical::update_many()
        .col_expr(
            chemical::Column::QuantityLiters,
            Expr::col(chemical::Column::QuantityLiters).sub(total_consumed),
        )
        .filter(chemical::Column::Id.eq(chemical_id))
        .filter(chemical::Column::QuantityLiters.gte(total_consumed))
        .exec(conn)
        .await?;

    let after = require_chemical(conn, chemical_id).await?;
    if updated.rows_affected == 0 {
        // Another writer drained the item between our read and our update.
        warn!(chemical_id, "Rejected spraying: stock changed concurrently");
        return Err(Error::InsufficientStock {
            name: after.name,
            required: total_consumed,
            available: after.quantity_liters,
        });
    }

    debug!(
        chemical_id,
        total_consumed,
        remaining = after.quantity_liters,
        "Consumed stock"
    );
    Ok(after.quantity_liters)
}

/// Records the consumption of a spraying run and returns the remaining stock.
///
/// Consumption is `per_hectare_rate * field_size_hectares` liters. The whole
/// check-then-decrement runs in one transaction; on any error the stock is unchanged.
///
/// # Errors
/// Returns an error if:
/// - The rate or size is negative or not finite
/// - The chemical does not exist ([`Error::NotFound`])
/// - The consumption exceeds the stock ([`Error::InsufficientStock`])
/// - The database update fails
#[instrument(skip(db))]
pub async fn record_spraying_consumption(
    db: &DatabaseConnection,
    chemical_id: i64,
    per_hectare_rate: f64,
    field_size_hectares: f64,
) -> Result<f64> {
    let txn = db.begin().await?;
    let remaining =
        consume_stock(&txn, chemical_id, per_hectare_rate, field_size_hectares).await?;
    txn.commit().await?;
    Ok(remaining)
}

/// Deletes a stock item.
///
/// Operations that consumed it keep their rows and their snapshotted unit price; only
/// their chemical reference is cleared.
///
/// # Errors
/// Returns [`Error::NotFound`] if the item does not exist.
#[instrument(skip(db))]
pub async fn remove_chemical(db: &DatabaseConnection, chemical_id: i64) -> Result<()> {
    let result = Chemical::delete_by_id(chemical_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "chemical",
            id: chemical_id,
        });
    }
    info!(chemical_id, "Removed chemical from the warehouse");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_create_chemical_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_chemical(&db, "  ".to_string(), 10.0, 1.0).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_chemical(&db, "Glyphosate".to_string(), -1.0, 1.0).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_chemical(&db, "Glyphosate".to_string(), 1.0, f64::NAN).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_stock_rejects_non_positive_amounts() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = add_stock(&db, 1, amount).await;
            assert!(matches!(result, Err(Error::Validation { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_add_stock_unknown_item() -> Result<()> {
        let db = setup_test_db().await?;
        let result = add_stock(&db, 999, 10.0).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_stock_increments() -> Result<()> {
        let db = setup_test_db().await?;
        let chemical = create_test_chemical(&db, "Glyphosate", 100.0, 200.0).await?;

        let updated = add_stock(&db, chemical.id, 25.5).await?;
        assert_eq!(updated.quantity_liters, 125.5);
        assert_eq!(updated.price_per_liter, 200.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_stock_rejects_overflowing_total() -> Result<()> {
        let db = setup_test_db().await?;
        let chemical = create_test_chemical(&db, "Glyphosate", f64::MAX, 1.0).await?;

        let result = add_stock(&db, chemical.id, f64::MAX).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let stored = get_chemical_by_id(&db, chemical.id).await?.unwrap();
        assert_eq!(stored.quantity_liters, f64::MAX);
        Ok(())
    }

    #[tokio::test]
    async fn test_guarded_update_rejects_stock_drained_after_read() -> Result<()> {
        let before = chemical::Model {
            id: 1,
            name: "Glyphosate".to_string(),
            quantity_liters: 100.0,
            price_per_liter: 200.0,
        };
        let drained = chemical::Model {
            quantity_liters: 10.0,
            ..before.clone()
        };
        // The read sees 100 L, the guarded update matches no row, the re-read sees 10 L.
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![before], vec![drained]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = consume_stock(&db, 1, 6.0, 10.0).await;
        match result {
            Err(Error::InsufficientStock {
                name,
                required,
                available,
            }) => {
                assert_eq!(name, "Glyphosate");
                assert_eq!(required, 60.0);
                assert_eq!(available, 10.0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_consumption_decrements_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let chemical = create_test_chemical(&db, "Glyphosate", 100.0, 200.0).await?;

        let remaining = record_spraying_consumption(&db, chemical.id, 5.0, 10.0).await?;
        assert_eq!(remaining, 50.0);

        let stored = get_chemical_by_id(&db, chemical.id).await?.unwrap();
        assert_eq!(stored.quantity_liters, 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_consumption_of_entire_stock_is_allowed() -> Result<()> {
        let db = setup_test_db().await?;
        let chemical = create_test_chemical(&db, "Glyphosate", 50.0, 200.0).await?;

        let remaining = record_spraying_consumption(&db, chemical.id, 5.0, 10.0).await?;
        assert_eq!(remaining, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_quantity_unchanged() -> Result<()> {
        let db = setup_test_db().await?;
        let chemical = create_test_chemical(&db, "Glyphosate", 50.0, 200.0).await?;

        let result = record_spraying_consumption(&db, chemical.id, 15.0, 10.0).await;
        match result {
            Err(Error::InsufficientStock {
                name,
                required,
                available,
            }) => {
                assert_eq!(name, "Glyphosate");
                assert_eq!(required, 150.0);
                assert_eq!(available, 50.0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let stored = get_chemical_by_id(&db, chemical.id).await?.unwrap();
        assert_eq!(stored.quantity_liters, 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_consumption_unknown_item() -> Result<()> {
        let db = setup_test_db().await?;
        let result = record_spraying_consumption(&db, 7, 1.0, 1.0).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "chemical",
                id: 7
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_consumption_rejects_negative_rate() -> Result<()> {
        let db = setup_test_db().await?;
        let chemical = create_test_chemical(&db, "Glyphosate", 50.0, 200.0).await?;

        let result = record_spraying_consumption(&db, chemical.id, -5.0, 10.0).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let stored = get_chemical_by_id(&db, chemical.id).await?.unwrap();
        assert_eq!(stored.quantity_liters, 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_consume_then_restock_round_trip() -> Result<()> {
        let db = setup_test_db().await?;
        let chemical = create_test_chemical(&db, "Glyphosate", 100.0, 200.0).await?;

        record_spraying_consumption(&db, chemical.id, 2.5, 8.0).await?;
        let restored = add_stock(&db, chemical.id, 2.5 * 8.0).await?;
        assert_eq!(restored.quantity_liters, 100.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_stock_never_negative_over_a_sequence() -> Result<()> {
        let db = setup_test_db().await?;
        let chemical = create_test_chemical(&db, "Fungicide", 10.0, 50.0).await?;

        let steps: [(bool, f64); 8] = [
            (false, 4.0),
            (false, 4.0),
            (false, 4.0),
            (true, 5.0),
            (false, 6.0),
            (false, 1.5),
            (true, 0.5),
            (false, 3.0),
        ];
        for (restock, amount) in steps {
            // Failures are expected for some consumptions; only the invariant matters.
            let _ = if restock {
                add_stock(&db, chemical.id, amount).await.map(|c| c.quantity_liters)
            } else {
                record_spraying_consumption(&db, chemical.id, amount, 1.0).await
            };
            let stored = get_chemical_by_id(&db, chemical.id).await?.unwrap();
            assert!(stored.quantity_liters >= 0.0);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_consumption_cannot_overdraw() -> Result<()> {
        let db = setup_test_db().await?;
        let chemical = create_test_chemical(&db, "Glyphosate", 100.0, 200.0).await?;

        let (first, second) = tokio::join!(
            record_spraying_consumption(&db, chemical.id, 6.0, 10.0),
            record_spraying_consumption(&db, chemical.id, 6.0, 10.0),
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(
            matches!(first, Err(Error::InsufficientStock { .. }))
                || matches!(second, Err(Error::InsufficientStock { .. }))
        );

        let stored = get_chemical_by_id(&db, chemical.id).await?.unwrap();
        assert_eq!(stored.quantity_liters, 40.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_chemical() -> Result<()> {
        let db = setup_test_db().await?;
        let chemical = create_test_chemical(&db, "Glyphosate", 100.0, 200.0).await?;

        remove_chemical(&db, chemical.id).await?;
        assert!(get_chemical_by_id(&db, chemical.id).await?.is_none());

        let result = remove_chemical(&db, chemical.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_chemicals_listed_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        let b = create_test_chemical(&db, "Herbicide", 1.0, 1.0).await?;
        let a = create_test_chemical(&db, "Fungicide", 1.0, 1.0).await?;

        assert_eq!(get_all_chemicals(&db).await?, vec![a, b]);
        Ok(())
    }
}
