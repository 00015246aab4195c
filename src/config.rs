use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{EtlError, Result};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "etl.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub inspect: InspectConfig,
    pub schema: SchemaConfig,
    pub cleaning: CleaningConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub data_dir: PathBuf,
    pub customers: String,
    pub products: String,
    pub stores: String,
    pub orders: String,
    pub order_items: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            customers: constants::CUSTOMERS_FILE.to_string(),
            products: constants::PRODUCTS_FILE.to_string(),
            stores: constants::STORES_FILE.to_string(),
            orders: constants::ORDERS_FILE.to_string(),
            order_items: constants::ORDER_ITEMS_FILE.to_string(),
        }
    }
}

impl InputConfig {
    pub fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub cleaned_orders: String,
    pub master: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            cleaned_orders: constants::CLEANED_ORDERS_FILE.to_string(),
            master: constants::MASTER_FILE.to_string(),
        }
    }
}

impl OutputConfig {
    pub fn cleaned_orders_path(&self) -> PathBuf {
        self.dir.join(&self.cleaned_orders)
    }

    pub fn master_path(&self) -> PathBuf {
        self.dir.join(&self.master)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectConfig {
    pub preview_rows: usize,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            preview_rows: constants::DEFAULT_PREVIEW_ROWS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// Ignore columns the record shapes do not know instead of failing the load
    pub allow_extra_columns: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleaningConfig {
    pub completed_status: String,
    pub missing_markers: Vec<String>,
    pub default_payment_method: String,
    pub default_shipping_delay_days: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            completed_status: constants::COMPLETED_STATUS.to_string(),
            missing_markers: constants::DEFAULT_MISSING_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_payment_method: constants::DEFAULT_PAYMENT_METHOD.to_string(),
            default_shipping_delay_days: constants::DEFAULT_SHIPPING_DELAY_DAYS,
        }
    }
}

impl Config {
    /// Load from an explicit path. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Load `etl.toml` from the working directory when present, defaults otherwise.
    pub fn load_or_default() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cleaning.completed_status.is_empty() {
            return Err(EtlError::Config(
                "cleaning.completed_status must not be empty".to_string(),
            ));
        }
        if !self.cleaning.default_shipping_delay_days.is_finite() {
            return Err(EtlError::Config(
                "cleaning.default_shipping_delay_days must be a finite number".to_string(),
            ));
        }
        if self.output.cleaned_orders == self.output.master {
            return Err(EtlError::Config(format!(
                "output files must differ, both are '{}'",
                self.output.master
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.cleaning.completed_status, "Completed");
        assert_eq!(config.cleaning.default_payment_method, "Unknown");
        assert_eq!(config.inspect.preview_rows, 5);
        assert!(!config.schema.allow_extra_columns);
        assert_eq!(
            config.output.master_path(),
            PathBuf::from("./coffee_sales_master.csv")
        );
        assert!(config.cleaning.missing_markers.iter().any(|m| m == "NaN"));
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [input]
            data_dir = "raw"

            [cleaning]
            default_payment_method = "Cash"
            "#,
        )
        .unwrap();
        assert_eq!(config.input.path("orders.csv"), PathBuf::from("raw/orders.csv"));
        assert_eq!(config.cleaning.default_payment_method, "Cash");
        assert_eq!(config.cleaning.completed_status, "Completed");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = Config::from_toml("[inspect]\nrows = 3\n").unwrap_err();
        assert!(matches!(err, EtlError::Toml(_)));
    }

    #[test]
    fn test_same_output_names_are_rejected() {
        let err = Config::from_toml(
            "[output]\ncleaned_orders = \"out.csv\"\nmaster = \"out.csv\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }
}
