//! Seed catalogue loading from config.toml
//!
//! The catalogue lists the field categories, the ownership groups shown in the
//! ownership report, and the fields created on first launch. When no file is present
//! the built-in catalogue is used.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Categories created on first launch when the config does not list any.
pub const DEFAULT_CATEGORIES: [&str; 6] = ["Farma", "Kanal", "Padina", "Pustara", "Vojska", "Stadion"];

/// Ownership groups reported on when the config does not list any.
pub const DEFAULT_OWNER_GROUPS: [&str; 5] = ["KLAS", "Finagro", "Nikola", "Dusan", "Savo"];

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SeedConfig {
    /// Category names to seed
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Ownership groups the ownership report covers
    #[serde(default = "default_owner_groups")]
    pub owner_groups: Vec<String>,
    /// Fields to seed
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// Configuration for a single seeded field
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FieldConfig {
    /// Name of the field (natural key)
    pub name: String,
    /// Name of the category the field belongs to
    pub category: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Picture key
    #[serde(default)]
    pub image_key: Option<String>,
    /// Area in hectares
    #[serde(default)]
    pub size_hectares: Option<f64>,
    /// Ownership group label
    #[serde(default)]
    pub owner_group: Option<String>,
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(ToString::to_string).collect()
}

fn default_owner_groups() -> Vec<String> {
    DEFAULT_OWNER_GROUPS.iter().map(ToString::to_string).collect()
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            owner_groups: default_owner_groups(),
            fields: Vec::new(),
        }
    }
}

/// Loads the seed catalogue from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read ([`Error::Io`])
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let path_ref = path.as_ref();
    debug!("Loading seed catalogue from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref)?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the catalogue named by `FINAGRO_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error; the built-in catalogue is returned instead.
/// A file that exists but does not parse is still reported.
pub fn load_default_config() -> Result<SeedConfig> {
    let path = std::env::var("FINAGRO_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        warn!("No seed catalogue at {}, using built-in defaults", path);
        Ok(SeedConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_seed_config() {
        let toml_str = r#"
            categories = ["Farma", "Kanal"]
            owner_groups = ["KLAS"]

            [[fields]]
            name = "Njiva 1"
            category = "Farma"
            description = "Behind the barn"
            size_hectares = 12.5
            owner_group = "KLAS"

            [[fields]]
            name = "Kanal 3"
            category = "Kanal"
        "#;

        let config: SeedConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.categories, vec!["Farma", "Kanal"]);
        assert_eq!(config.owner_groups, vec!["KLAS"]);
        assert_eq!(config.fields.len(), 2);
        assert_eq!(config.fields[0].size_hectares, Some(12.5));
        assert_eq!(config.fields[0].owner_group.as_deref(), Some("KLAS"));
        assert!(config.fields[1].size_hectares.is_none());
        assert!(config.fields[1].image_key.is_none());
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: SeedConfig = toml::from_str("").unwrap();
        assert_eq!(config, SeedConfig::default());
        assert_eq!(config.categories.len(), 6);
        assert_eq!(config.owner_groups[1], "Finagro");
    }

    #[test]
    fn test_load_config_missing_file_is_io_error() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml_is_config_error() {
        let path =
            std::env::temp_dir().join(format!("finagro-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "categories = [\"Farma\"").unwrap();
        let result = load_config(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
