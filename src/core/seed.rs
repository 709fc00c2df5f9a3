//! First-launch seeding of categories and fields.
//!
//! Seeding is an upsert by natural key (the name): each entity gets its own transaction
//! holding an existence check and a conditional insert, so running it on every startup
//! inserts only what is missing.

use crate::{
    config::seed::{FieldConfig, SeedConfig},
    core::{
        category::get_category_by_name,
        field::{NewField, create_field, get_field_by_name},
    },
    entities::category,
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Inserts every category whose name is not present yet and returns how many were added.
#[instrument(skip(db, names))]
pub async fn seed_categories<S>(db: &DatabaseConnection, names: &[S]) -> Result<usize>
where
    S: AsRef<str>,
{
    let mut inserted = 0;
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }

        let txn = db.begin().await?;
        if get_category_by_name(&txn, name).await?.is_none() {
            category::ActiveModel {
                name: Set(name.to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            inserted += 1;
        } else {
            debug!("Category {} already present", name);
        }
        txn.commit().await?;
    }

    info!(inserted, "Categories seeded");
    Ok(inserted)
}

/// Inserts every configured field whose name is not present yet and returns how many
/// were added.
///
/// # Errors
/// Returns [`Error::Config`] if a field names a category that does not exist.
#[instrument(skip(db, fields))]
pub async fn seed_fields(db: &DatabaseConnection, fields: &[FieldConfig]) -> Result<usize> {
    let mut inserted = 0;
    for config in fields {
        let txn = db.begin().await?;
        if get_field_by_name(&txn, config.name.trim()).await?.is_none() {
            let category = get_category_by_name(&txn, config.category.trim())
                .await?
                .ok_or_else(|| Error::Config {
                    message: format!(
                        "Field {} refers to unknown category {}",
                        config.name, config.category
                    ),
                })?;
            create_field(
                &txn,
                NewField {
                    name: config.name.clone(),
                    description: config.description.clone(),
                    image_key: config.image_key.clone(),
                    size_hectares: config.size_hectares,
                    owner_group: config.owner_group.clone(),
                    category_id: category.id,
                },
            )
            .await?;
            inserted += 1;
        } else {
            debug!("Field {} already present", config.name);
        }
        txn.commit().await?;
    }

    info!(inserted, "Fields seeded");
    Ok(inserted)
}

/// Seeds categories, then fields, from the catalogue.
pub async fn seed_catalogue(db: &DatabaseConnection, config: &SeedConfig) -> Result<()> {
    seed_categories(db, &config.categories).await?;
    seed_fields(db, &config.fields).await?;
    Ok(())
}
