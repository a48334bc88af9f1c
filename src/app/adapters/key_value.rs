use crate::core::cursor::SnapshotCursor;
use crate::core::schema::TableTemplate;
use crate::domain::model::{AdapterOptions, Column, Lifecycle, Pull, Row};
use crate::domain::ports::{Adapter, KeyValueConnector, KeyValueStore};
use crate::utils::error::{AdapterError, Result};

pub const CLASS_NAME: &str = "Redis";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueSettings {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub pattern: String,
    pub with_values: bool,
}

impl KeyValueSettings {
    pub fn from_options(options: &AdapterOptions) -> Result<Self> {
        // All three are required; report the first missing one in this order.
        let host = options.require("host")?;
        options.require("port")?;
        options.require("db")?;

        Ok(Self {
            host: host.to_string(),
            port: options.parse_required("port")?,
            db: options.parse_required("db")?,
            pattern: options.get_or("pattern", "*").to_string(),
            with_values: options.parse_or("values", true)?,
        })
    }

}

fn columns_for(with_values: bool) -> Vec<Column> {
    if with_values {
        vec![Column::text("key"), Column::text("value")]
    } else {
        vec![Column::text("key")]
    }
}

/// Rows of `(key, value)` over every key of one logical database.
///
/// Keys are enumerated once with `KEYS` when the adapter is built; each pull
/// then issues a single `GET`. Enumerating the whole key space up front does
/// not scale to large databases; `SCAN` would, at the price of weaker
/// snapshot semantics.
pub struct KeyValueAdapter {
    store: Option<Box<dyn KeyValueStore>>,
    keys: SnapshotCursor<String>,
    columns: Vec<Column>,
    with_values: bool,
    state: Lifecycle,
}

impl KeyValueAdapter {
    pub fn connect(options: &AdapterOptions, connector: &dyn KeyValueConnector) -> Result<Self> {
        let settings = KeyValueSettings::from_options(options)?;

        tracing::debug!(
            "Connecting to key-value store at {}:{} (db {})",
            settings.host,
            settings.port,
            settings.db
        );
        let mut store = connector.connect(&settings.host, settings.port)?;

        let keys = match select_and_list(store.as_mut(), &settings) {
            Ok(keys) => keys,
            Err(e) => {
                if let Err(close_err) = store.close() {
                    tracing::warn!("Failed to close key-value connection: {}", close_err);
                }
                return Err(e);
            }
        };

        tracing::info!(
            "Captured {} keys matching '{}' from db {}",
            keys.len(),
            settings.pattern,
            settings.db
        );

        Ok(Self {
            store: Some(store),
            keys: SnapshotCursor::new(keys),
            columns: columns_for(settings.with_values),
            with_values: settings.with_values,
            state: Lifecycle::Constructed,
        })
    }

    pub fn table_template(options: &AdapterOptions) -> Result<TableTemplate> {
        let with_values = options.parse_or("values", true)?;
        Ok(TableTemplate::new("redis_table", columns_for(with_values)))
    }

    pub fn remaining(&self) -> usize {
        self.keys.remaining()
    }

    fn abandon(&mut self) {
        self.keys.exhaust();
        self.state = Lifecycle::Exhausted;
        self.store = None;
    }
}

fn select_and_list(store: &mut dyn KeyValueStore, settings: &KeyValueSettings) -> Result<Vec<String>> {
    store.select(settings.db)?;
    store.keys(&settings.pattern)
}

impl Adapter for KeyValueAdapter {
    fn class_name(&self) -> &str {
        CLASS_NAME
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn state(&self) -> Lifecycle {
        self.state
    }

    fn pull(&mut self) -> Result<Pull> {
        if self.state.is_finished() {
            return Ok(Pull::EndOfData);
        }

        // Advances before the GET: a key whose fetch fails is reported once
        // and the next pull moves on.
        let Some(key) = self.keys.next_item().cloned() else {
            tracing::debug!("Key set exhausted");
            self.state = Lifecycle::Exhausted;
            return Ok(Pull::EndOfData);
        };
        self.state = Lifecycle::Iterating;

        let row = if self.with_values {
            let store = self.store.as_mut().ok_or_else(|| AdapterError::Disconnected {
                message: "key-value connection already released".to_string(),
            })?;

            match store.get(&key) {
                Ok(Some(value)) => Row::new([key, value]),
                Ok(None) => {
                    tracing::warn!("Key '{}' disappeared before its value was read", key);
                    Row::new([key, String::new()])
                }
                Err(e) => {
                    if e.is_fatal() {
                        tracing::warn!("Key-value connection lost, ending scan: {}", e);
                        self.abandon();
                    } else {
                        tracing::warn!("GET '{}' failed, skipping key: {}", key, e);
                    }
                    return Err(e);
                }
            }
        } else {
            Row::new([key])
        };

        Ok(Pull::Row(row))
    }

    fn close(&mut self) -> Result<()> {
        self.state = Lifecycle::Closed;
        if let Some(mut store) = self.store.take() {
            tracing::debug!("Closing key-value connection");
            store.close()?;
        }
        Ok(())
    }
}
