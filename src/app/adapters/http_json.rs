use crate::core::cursor::SnapshotCursor;
use crate::core::schema::TableTemplate;
use crate::domain::model::{AdapterOptions, Column, Lifecycle, Pull, Row};
use crate::domain::ports::{Adapter, HttpFetcher, HttpRequest};
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{validate_positive_number, validate_url};
use serde_json::Value;
use std::time::Duration;

pub const CLASS_NAME: &str = "HttpJson";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpJsonSettings {
    pub url: String,
    pub fields: Vec<String>,
    pub list_field: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub next_field: Option<String>,
    pub max_pages: usize,
}

impl HttpJsonSettings {
    pub fn from_options(options: &AdapterOptions) -> Result<Self> {
        let url = options.require("url")?;
        validate_url("url", url)?;

        let fields = required_fields(options)?;

        let timeout = if options.contains("timeout_seconds") {
            Some(Duration::from_secs(options.parse_required("timeout_seconds")?))
        } else {
            None
        };

        let max_pages: usize = options.parse_or("max_pages", 1)?;
        validate_positive_number("max_pages", max_pages, 1)?;

        Ok(Self {
            url: url.to_string(),
            fields,
            list_field: options.get_or("list_field", "list").to_string(),
            headers: owned_pairs(options.with_prefix("header.")),
            query: owned_pairs(options.with_prefix("query.")),
            timeout,
            next_field: options
                .get("next_field")
                .filter(|f| !f.trim().is_empty())
                .map(str::to_string),
            max_pages,
        })
    }

    fn request(&self, url: String, first_page: bool) -> HttpRequest {
        HttpRequest {
            url,
            headers: self.headers.clone(),
            // Continuation URLs returned by the API already carry their query.
            query: if first_page {
                self.query.clone()
            } else {
                Vec::new()
            },
            timeout: self.timeout,
        }
    }
}

fn required_fields(options: &AdapterOptions) -> Result<Vec<String>> {
    let fields = options
        .list("fields")
        .ok_or_else(|| AdapterError::missing("fields"))?;
    if fields.is_empty() {
        return Err(AdapterError::InvalidOption {
            key: "fields".to_string(),
            value: options.get_or("fields", "").to_string(),
            reason: "At least one field is required".to_string(),
        });
    }
    Ok(fields)
}

fn owned_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<(String, String)> {
    pairs.map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn columns_for(fields: &[String]) -> Vec<Column> {
    fields
        .iter()
        .map(|field| Column::text(field.replace('.', "_")))
        .collect()
}

/// Walks a dotted path (`wind.deg`, `weather.0.main`). An empty path is the
/// value itself.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn project(record: &Value, fields: &[String], index: usize) -> Result<Row> {
    if !record.is_object() {
        return Err(AdapterError::parse(format!(
            "record {} is not a JSON object: {}",
            index, record
        )));
    }

    let mut cells = Vec::with_capacity(fields.len());
    for field in fields {
        let value = lookup(record, field).ok_or_else(|| {
            AdapterError::parse(format!("record {} has no field '{}'", index, field))
        })?;
        cells.push(cell_text(value));
    }
    Ok(Row(cells))
}

/// Rows projected from a JSON array fetched when the adapter is built.
///
/// All pages are requested up front and concatenated; pulling never touches
/// the network.
pub struct HttpJsonAdapter {
    records: SnapshotCursor<Value>,
    fields: Vec<String>,
    columns: Vec<Column>,
    state: Lifecycle,
}

impl HttpJsonAdapter {
    pub fn fetch(options: &AdapterOptions, fetcher: &dyn HttpFetcher) -> Result<Self> {
        let settings = HttpJsonSettings::from_options(options)?;
        let mut records = Vec::new();
        let mut next_url = Some(settings.url.clone());

        for page in 0..settings.max_pages {
            let Some(url) = next_url.take() else {
                break;
            };

            tracing::debug!("Requesting page {} from {}", page + 1, url);
            let response = fetcher.fetch(&settings.request(url.clone(), page == 0))?;
            tracing::debug!("Response status: {}", response.status);

            if !response.is_success() {
                return Err(AdapterError::source(format!(
                    "request to {} failed with status {}",
                    url, response.status
                )));
            }

            let body: Value = serde_json::from_str(&response.body)?;
            let items = lookup(&body, &settings.list_field)
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    AdapterError::parse(format!(
                        "response from {} has no array at '{}'",
                        url, settings.list_field
                    ))
                })?;
            records.extend(items.iter().cloned());

            next_url = settings
                .next_field
                .as_deref()
                .and_then(|field| lookup(&body, field))
                .and_then(Value::as_str)
                .filter(|next| !next.is_empty())
                .map(str::to_string);
        }

        if let Some(url) = next_url {
            tracing::debug!(
                "Stopped after {} page(s); next page {} not requested",
                settings.max_pages,
                url
            );
        }

        tracing::info!("Captured {} records from {}", records.len(), settings.url);

        Ok(Self {
            records: SnapshotCursor::new(records),
            columns: columns_for(&settings.fields),
            fields: settings.fields,
            state: Lifecycle::Constructed,
        })
    }

    pub fn table_template(options: &AdapterOptions) -> Result<TableTemplate> {
        let fields = required_fields(options)?;
        Ok(TableTemplate::new("http_table", columns_for(&fields)))
    }
}

impl Adapter for HttpJsonAdapter {
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

        let index = self.records.position();
        match self.records.next_item() {
            None => {
                self.state = Lifecycle::Exhausted;
                Ok(Pull::EndOfData)
            }
            Some(record) => {
                let row = project(record, &self.fields, index);
                self.state = Lifecycle::Iterating;
                row.map(Pull::Row)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.records.exhaust();
        self.state = Lifecycle::Closed;
        Ok(())
    }
}
