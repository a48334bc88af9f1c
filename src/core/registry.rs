use crate::app::adapters::{
    command, http_json, key_value, sequence, CommandAdapter, HttpJsonAdapter, KeyValueAdapter,
    SequenceAdapter,
};
use crate::backends::{ReqwestFetcher, ShellRunner};
use crate::core::schema::{declare_table, TableTemplate};
use crate::domain::model::{AdapterOptions, ImportRequest};
use crate::domain::ports::{Adapter, KeyValueConnector};
use crate::utils::error::{AdapterError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

#[cfg(feature = "redis")]
const REDIS_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

pub type BuildFn = Box<dyn Fn(&AdapterOptions) -> Result<Box<dyn Adapter>> + Send + Sync>;
pub type TemplateFn = fn(&AdapterOptions) -> Result<TableTemplate>;

struct AdapterEntry {
    build: BuildFn,
    template: Option<TemplateFn>,
}

/// Adapter classes by `wrapper_class` identifier.
#[derive(Default)]
pub struct AdapterRegistry {
    entries: BTreeMap<String, AdapterEntry>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in adapter wired to its production backend.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "redis")]
        registry.register_key_value(Arc::new(
            crate::backends::RedisConnector::with_connect_timeout(REDIS_CONNECT_TIMEOUT),
        ));

        registry
            .register(
                http_json::CLASS_NAME,
                |options| {
                    let fetcher = ReqwestFetcher::new()?;
                    Ok(Box::new(HttpJsonAdapter::fetch(options, &fetcher)?))
                },
                Some(HttpJsonAdapter::table_template),
            )
            .register(
                command::CLASS_NAME,
                |options| {
                    Ok(Box::new(CommandAdapter::new(
                        options,
                        Box::new(ShellRunner::new()),
                    )?))
                },
                Some(CommandAdapter::table_template),
            )
            .register(
                sequence::CLASS_NAME,
                |options| Ok(Box::new(SequenceAdapter::new(options)?)),
                Some(SequenceAdapter::table_template),
            );

        registry
    }

    pub fn register<F>(&mut self, class: &str, build: F, template: Option<TemplateFn>) -> &mut Self
    where
        F: Fn(&AdapterOptions) -> Result<Box<dyn Adapter>> + Send + Sync + 'static,
    {
        if self.entries.contains_key(class) {
            tracing::warn!("Replacing adapter class '{}'", class);
        }
        self.entries.insert(
            class.to_string(),
            AdapterEntry {
                build: Box::new(build),
                template,
            },
        );
        self
    }

    /// Registers the key-value adapter against any store connector.
    pub fn register_key_value(&mut self, connector: Arc<dyn KeyValueConnector>) -> &mut Self {
        self.register(
            key_value::CLASS_NAME,
            move |options| Ok(Box::new(KeyValueAdapter::connect(options, connector.as_ref())?)),
            Some(KeyValueAdapter::table_template),
        )
    }

    pub fn contains(&self, class: &str) -> bool {
        self.entries.contains_key(class)
    }

    pub fn classes(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    fn entry(&self, class: &str) -> Result<&AdapterEntry> {
        self.entries
            .get(class)
            .ok_or_else(|| AdapterError::UnknownAdapter {
                class: class.to_string(),
                available: self.classes().join(", "),
            })
    }

    pub fn construct(&self, class: &str, options: &AdapterOptions) -> Result<Box<dyn Adapter>> {
        let entry = self.entry(class)?;
        tracing::debug!("Constructing '{}' adapter with {} options", class, options.len());
        (entry.build)(options)
    }

    /// Renders the `CREATE FOREIGN TABLE` statement for `class`.
    pub fn import_schema(&self, class: &str, request: &ImportRequest) -> Result<String> {
        let entry = self.entry(class)?;
        let template_fn = entry.template.ok_or_else(|| AdapterError::InvalidOption {
            key: "wrapper_class".to_string(),
            value: class.to_string(),
            reason: "adapter does not declare a schema".to_string(),
        })?;
        let template = template_fn(&request.options)?;
        Ok(declare_table(class, &template, request))
    }
}
