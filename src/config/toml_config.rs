use crate::config::table::{ForeignTableOptions, WRAPPER_CLASS};
use crate::domain::model::{AdapterOptions, ImportRequest};
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_unique_names, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FdwConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    /// Schema used for imports and for tables without their own.
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    pub schema: Option<String>,
    pub prefix: Option<String>,
    #[serde(default)]
    pub options: AdapterOptions,
}

impl TableConfig {
    pub fn foreign_table_options(&self) -> Result<ForeignTableOptions> {
        ForeignTableOptions::from_options(self.options.clone())
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // The pattern is a literal; it always compiles.
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl FdwConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| AdapterError::InvalidOption {
            key: "config".to_string(),
            value: "<toml>".to_string(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${NAME}` with the environment value; unknown names are left
    /// as-is.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn table(&self, name: &str) -> Result<&TableConfig> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| AdapterError::InvalidOption {
                key: "table".to_string(),
                value: name.to_string(),
                reason: format!(
                    "No such table. Configured: {}",
                    self.tables
                        .iter()
                        .map(|t| t.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }

    pub fn default_schema(&self) -> &str {
        self.server.schema.as_deref().unwrap_or("public")
    }

    /// Import inputs for a configured table; `wrapper_class` is not echoed
    /// as a plain option.
    pub fn import_request(&self, table: &TableConfig) -> Result<(String, ImportRequest)> {
        let split = table.foreign_table_options()?;
        Ok((
            split.wrapper_class,
            ImportRequest {
                local_schema: table
                    .schema
                    .clone()
                    .unwrap_or_else(|| self.default_schema().to_string()),
                prefix: table.prefix.clone(),
                server_name: self.server.name.clone(),
                options: split.options,
            },
        ))
    }
}

impl Validate for FdwConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.name", &self.server.name)?;
        validate_unique_names("tables.name", self.tables.iter().map(|t| t.name.as_str()))?;

        for table in &self.tables {
            validate_non_empty_string("tables.name", &table.name)?;
            if !table.options.contains(WRAPPER_CLASS) {
                return Err(AdapterError::missing(&format!(
                    "tables.{}.options.{}",
                    table.name, WRAPPER_CLASS
                )));
            }
        }
        Ok(())
    }
}
