//! Foreign table declarations for `IMPORT FOREIGN SCHEMA`.
//!
//! Option names that are not plain identifiers are double-quoted. Option
//! values are interpolated verbatim, never escaped, so a value containing `'`
//! produces an invalid (or hostile) statement. Callers that accept untrusted
//! options must sanitize first.

use crate::domain::model::{Column, ImportRequest};
use std::borrow::Cow;
use std::fmt::Write;

/// Fixed part of an adapter's table: name suffix and column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTemplate {
    pub suffix: String,
    pub columns: Vec<Column>,
}

impl TableTemplate {
    pub fn new(suffix: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            suffix: suffix.into(),
            columns,
        }
    }
}

pub fn qualified_table_name(template: &TableTemplate, request: &ImportRequest) -> String {
    format!(
        "{}.{}{}",
        request.local_schema,
        request.prefix.as_deref().unwrap_or(""),
        template.suffix
    )
}

/// Option names that are not plain lowercase identifiers (`header.X-Api-Key`)
/// are double-quoted so the host can parse them back.
fn option_name(key: &str) -> Cow<'_, str> {
    let mut chars = key.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if plain {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(format!("\"{}\"", key.replace('"', "\"\"")))
    }
}

pub fn declare_table(class_name: &str, template: &TableTemplate, request: &ImportRequest) -> String {
    let mut sql = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(
        sql,
        "CREATE FOREIGN TABLE {}",
        qualified_table_name(template, request)
    );
    for (index, column) in template.columns.iter().enumerate() {
        let lead = if index == 0 { "(" } else { "," };
        let _ = writeln!(sql, "        {} {} {}", lead, column.name, column.sql_type);
    }
    if template.columns.is_empty() {
        sql.push_str("        (\n");
    }
    sql.push_str("        )\n");
    let _ = writeln!(sql, "\tSERVER {}", request.server_name);
    let _ = writeln!(sql, "\tOPTIONS ( wrapper_class '{}'", class_name);
    for (key, value) in request.options.iter() {
        if key == "wrapper_class" {
            continue;
        }
        let _ = writeln!(sql, "\t        , {} '{}'", option_name(key), value);
    }
    sql.push_str("\t);\n");

    sql
}
