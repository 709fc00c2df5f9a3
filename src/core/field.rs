//! Field business logic - field creation, lookups and ownership-group matching.
//!
//! Ownership groups are free-text labels on fields. Two labels name the same group when
//! they are equal after trimming surrounding whitespace and ignoring case, so `" klas "`
//! and `"KLAS"` are one group. [`normalize_group`] is the single definition of that rule.

use crate::{
    entities::{Category, Field, field},
    errors::{Error, Result, ensure_non_negative},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Input for [`create_field`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewField {
    /// Field name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Picture key
    pub image_key: Option<String>,
    /// Area in hectares
    pub size_hectares: Option<f64>,
    /// Ownership group label
    pub owner_group: Option<String>,
    /// Category the field belongs to
    pub category_id: i64,
}

/// Canonical form of an ownership-group label used for matching.
#[must_use]
pub fn normalize_group(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Whether a field belongs to the (already normalized) group.
fn in_group(field: &field::Model, normalized: &str) -> bool {
    field
        .owner_group
        .as_deref()
        .is_some_and(|g| normalize_group(g) == normalized)
}

/// Creates a field after validating its name, size and category.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The size is negative or not finite
/// - The category does not exist
/// - The database insert fails
#[instrument(skip(db))]
pub async fn create_field<C>(db: &C, new_field: NewField) -> Result<field::Model>
where
    C: ConnectionTrait,
{
    if new_field.name.trim().is_empty() {
        return Err(Error::validation("Field name cannot be empty"));
    }
    ensure_non_negative("Field size", new_field.size_hectares)?;

    Category::find_by_id(new_field.category_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "category",
            id: new_field.category_id,
        })?;

    let model = field::ActiveModel {
        name: Set(new_field.name.trim().to_string()),
        description: Set(new_field.description),
        image_key: Set(new_field.image_key),
        size_hectares: Set(new_field.size_hectares),
        owner_group: Set(new_field.owner_group),
        category_id: Set(new_field.category_id),
        ..Default::default()
    };
    let field = model.insert(db).await?;
    info!(field_id = field.id, "Created field {}", field.name);
    Ok(field)
}

/// Finds a field by its unique ID.
pub async fn get_field_by_id<C>(db: &C, field_id: i64) -> Result<Option<field::Model>>
where
    C: ConnectionTrait,
{
    Field::find_by_id(field_id).one(db).await.map_err(Into::into)
}

/// Finds a field by ID, turning absence into [`Error::NotFound`].
pub(crate) async fn require_field<C>(db: &C, field_id: i64) -> Result<field::Model>
where
    C: ConnectionTrait,
{
    get_field_by_id(db, field_id).await?.ok_or(Error::NotFound {
        entity: "field",
        id: field_id,
    })
}

/// Finds a field by its exact name.
pub async fn get_field_by_name<C>(db: &C, name: &str) -> Result<Option<field::Model>>
where
    C: ConnectionTrait,
{
    Field::find()
        .filter(field::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every field in insertion order.
pub async fn get_all_fields<C>(db: &C) -> Result<Vec<field::Model>>
where
    C: ConnectionTrait,
{
    Field::find()
        .order_by_asc(field::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the fields of one category in insertion order.
pub async fn get_fields_for_category(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Vec<field::Model>> {
    Field::find()
        .filter(field::Column::CategoryId.eq(category_id))
        .order_by_asc(field::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the fields whose owner group matches `group` (case- and
/// whitespace-insensitive). Fields without a group never match.
pub async fn get_fields_for_group<C>(db: &C, group: &str) -> Result<Vec<field::Model>>
where
    C: ConnectionTrait,
{
    let normalized = normalize_group(group);
    Ok(get_all_fields(db)
        .await?
        .into_iter()
        .filter(|f| in_group(f, &normalized))
        .collect())
}

/// Lists the distinct ownership groups present on fields.
///
/// Labels that differ only in case or surrounding whitespace are reported once, using
/// the trimmed spelling of the first field that carries them. Blank labels are skipped.
pub async fn get_owner_groups(db: &DatabaseConnection) -> Result<Vec<String>> {
    let mut groups: BTreeMap<String, String> = BTreeMap::new();
    for field in get_all_fields(db).await? {
        if let Some(label) = field.owner_group.as_deref() {
            let normalized = normalize_group(label);
            if !normalized.is_empty() {
                groups
                    .entry(normalized)
                    .or_insert_with(|| label.trim().to_string());
            }
        }
    }
    Ok(groups.into_values().collect())
}
