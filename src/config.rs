// Engine configuration loaded from YAML

use crate::export::{DEFAULT_DELIMITER, DEFAULT_EXPORT_FILE};
use crate::query::{DEFAULT_SEARCH_FIELDS, QueryEngine};
use crate::record::Field;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration for queries and exports
///
/// Every key is optional in the file; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fields matched by the free-text search
    pub search_fields: Vec<Field>,
    /// Separator between exported cells
    pub delimiter: char,
    /// File name used when an export has no explicit output path
    pub export_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_fields: DEFAULT_SEARCH_FIELDS.to_vec(),
            delimiter: DEFAULT_DELIMITER,
            export_file: PathBuf::from(DEFAULT_EXPORT_FILE),
        }
    }
}

impl Config {
    /// Default location: `<config dir>/invoicetable/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("invoicetable").join("config.yaml"))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used if present, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre!("Config file not found: {}", path.display()));
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config {}", path.display()))?;
        info!(file = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse YAML config")?;
        Ok(config)
    }

    /// Query engine honouring the configured search fields
    pub fn engine(&self) -> QueryEngine {
        QueryEngine::with_search_fields(self.search_fields.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search_fields, vec![Field::Description, Field::Material]);
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.export_file, PathBuf::from("invoice_items.csv"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("delimiter: \";\"\n").unwrap();
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.search_fields, DEFAULT_SEARCH_FIELDS.to_vec());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = "search_fields: [Description, Material, ItemNo, SU]\ndelimiter: \"\\t\"\nexport_file: out.tsv\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(
            config.search_fields,
            vec![Field::Description, Field::Material, Field::ItemNo, Field::Su]
        );
        assert_eq!(config.delimiter, '\t');
        assert_eq!(config.export_file, PathBuf::from("out.tsv"));
        assert_eq!(config.engine().search_fields(), config.search_fields.as_slice());
    }

    #[test]
    fn test_unknown_search_field_is_an_error() {
        assert!(Config::from_yaml("search_fields: [Price]\n").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "export_file: items.csv\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.export_file, PathBuf::from("items.csv"));

        assert!(Config::load(Some(&temp.path().join("missing.yaml"))).is_err());
    }
}
