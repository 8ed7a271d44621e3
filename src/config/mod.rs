//! Configuration loading and management
//!
//! The configuration declares, per entity, which attributes list endpoints
//! may search and order by, plus the pagination defaults. Attribute names
//! coming from requests are only ever trusted after being checked against
//! these lists.
//!
//! ```yaml
//! pagination:
//!   length: 10
//!   max_length: 100
//! entities:
//!   - singular: product
//!     plural: products
//!     searchable: [name]
//!     sortable: [name, price, created_at]
//! ```

use crate::core::entity::Entity;
use crate::core::error::ConfigError;
use crate::core::query::PaginationDefaults;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// Query configuration for an entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityQueryConfig {
    /// Singular form (e.g., "product", "system_requirement")
    pub singular: String,

    /// Plural form, also the URL segment (e.g., "products")
    pub plural: String,

    /// Attributes accepted under `search[...]`
    #[serde(default)]
    pub searchable: Vec<String>,

    /// Attributes accepted under `order[...]`
    #[serde(default)]
    pub sortable: Vec<String>,
}

impl EntityQueryConfig {
    pub fn new(singular: &str, plural: &str, searchable: &[&str], sortable: &[&str]) -> Self {
        Self {
            singular: singular.to_string(),
            plural: plural.to_string(),
            searchable: searchable.iter().map(|s| s.to_string()).collect(),
            sortable: sortable.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_searchable(&self, attribute: &str) -> bool {
        self.searchable.iter().any(|a| a == attribute)
    }

    pub fn is_sortable(&self, attribute: &str) -> bool {
        self.sortable.iter().any(|a| a == attribute)
    }

    /// Check that every allow-listed name is an attribute of `T`
    ///
    /// A misspelled name would otherwise be permitted at the boundary and
    /// then match no record at all.
    pub fn ensure_attributes<T: Entity>(&self) -> Result<(), ConfigError> {
        let unknown = self
            .searchable
            .iter()
            .chain(&self.sortable)
            .find(|attribute| !T::has_attribute(attribute));

        match unknown {
            Some(attribute) => Err(ConfigError::InvalidAttribute {
                entity: self.singular.clone(),
                attribute: attribute.clone(),
                message: format!("not an attribute of {}", T::resource_name_singular()),
            }),
            None => Ok(()),
        }
    }
}

/// Complete configuration of the admin API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Defaults for `page` and `length`
    #[serde(default)]
    pub pagination: PaginationDefaults,

    /// Per-entity allow-lists
    pub entities: Vec<EntityQueryConfig>,
}

impl AdminConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that entity names are unique and attribute names are identifiers
    ///
    /// Attribute names end up in SQL `WHERE`/`ORDER BY` clauses, so anything
    /// other than `[a-z_][a-z0-9_]*` is refused here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for entity in &self.entities {
            for name in [&entity.singular, &entity.plural] {
                if !seen.insert(name.as_str()) {
                    return Err(ConfigError::DuplicateEntity { name: name.clone() });
                }
            }

            for attribute in entity.searchable.iter().chain(&entity.sortable) {
                if !is_identifier(attribute) {
                    return Err(ConfigError::InvalidAttribute {
                        entity: entity.singular.clone(),
                        attribute: attribute.clone(),
                        message: "attribute names must match [a-z_][a-z0-9_]*".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Find an entity by singular or plural name
    pub fn entity(&self, name: &str) -> Option<&EntityQueryConfig> {
        self.entities
            .iter()
            .find(|e| e.singular == name || e.plural == name)
    }

    /// Configuration for the storefront catalogue
    pub fn default_config() -> Self {
        Self {
            pagination: PaginationDefaults {
                max_length: Some(100),
                ..PaginationDefaults::default()
            },
            entities: vec![
                EntityQueryConfig::new(
                    "game",
                    "games",
                    &["developer", "mode"],
                    &["developer", "mode", "release_date", "created_at"],
                ),
                EntityQueryConfig::new(
                    "license",
                    "licenses",
                    &["key", "platform", "status"],
                    &["key", "platform", "status", "created_at"],
                ),
                EntityQueryConfig::new(
                    "product",
                    "products",
                    &["name"],
                    &["name", "price", "status", "featured", "created_at"],
                ),
                EntityQueryConfig::new(
                    "coupon",
                    "coupons",
                    &["name", "code"],
                    &["name", "code", "status", "discount_value", "due_date"],
                ),
                EntityQueryConfig::new(
                    "user",
                    "users",
                    &["name", "email"],
                    &["name", "email", "profile", "created_at"],
                ),
                EntityQueryConfig::new(
                    "system_requirement",
                    "system_requirements",
                    &["name"],
                    &["name", "created_at"],
                ),
            ],
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn is_identifier(name: &str) -> bool {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    let regex = IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[a-z_][a-z0-9_]*$").expect("identifier regex is valid")
    });
    regex.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AdminConfig::default_config();

        assert_eq!(config.entities.len(), 6);
        assert!(config.validate().is_ok());
        assert_eq!(config.pagination.length, 10);
        assert!(config.entity("products").unwrap().is_searchable("name"));
        assert!(config.entity("product").unwrap().is_sortable("price"));
        assert!(!config.entity("product").unwrap().is_searchable("price"));
    }

    #[test]
    fn test_yaml_serialization() {
        let config = AdminConfig::default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = AdminConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_yaml_pagination_defaults_are_optional() {
        let yaml = r#"
entities:
  - singular: coupon
    plural: coupons
    searchable: [name]
"#;
        let config = AdminConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.pagination, PaginationDefaults::default());
        assert!(config.entity("coupons").unwrap().sortable.is_empty());
    }

    #[test]
    fn test_rejects_non_identifier_attributes() {
        let yaml = r#"
entities:
  - singular: product
    plural: products
    searchable: ["name; DROP TABLE products"]
"#;
        let err = AdminConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_default_allow_lists_name_real_attributes() {
        use crate::entities::*;

        let config = AdminConfig::default_config();
        let entity = |name: &str| config.entity(name).unwrap().clone();

        assert!(entity("game").ensure_attributes::<Game>().is_ok());
        assert!(entity("license").ensure_attributes::<License>().is_ok());
        assert!(entity("product").ensure_attributes::<Product>().is_ok());
        assert!(entity("coupon").ensure_attributes::<Coupon>().is_ok());
        assert!(entity("user").ensure_attributes::<User>().is_ok());
        assert!(
            entity("system_requirement")
                .ensure_attributes::<SystemRequirement>()
                .is_ok()
        );
    }

    #[test]
    fn test_misspelled_attribute_is_rejected() {
        use crate::entities::Product;

        let entity = EntityQueryConfig::new("product", "products", &["nmae"], &["price"]);

        match entity.ensure_attributes::<Product>() {
            Err(ConfigError::InvalidAttribute {
                entity, attribute, ..
            }) => {
                assert_eq!(entity, "product");
                assert_eq!(attribute, "nmae");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_duplicate_entities() {
        let mut config = AdminConfig::default_config();
        config
            .entities
            .push(EntityQueryConfig::new("product", "items", &[], &[]));

        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateEntity { .. })
        ));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "pagination:\n  length: 25\nentities:\n  - singular: user\n    plural: users\n    searchable: [email]"
        )
        .unwrap();

        let config = AdminConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.pagination.length, 25);
        assert!(config.entity("user").unwrap().is_searchable("email"));
    }

    #[test]
    fn test_from_yaml_file_reports_path_on_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "entities: [[[").unwrap();

        let err = AdminConfig::from_yaml_file(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { file: Some(path), .. } => {
                assert!(path.ends_with(&*file.path().file_name().unwrap().to_string_lossy()))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AdminConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
