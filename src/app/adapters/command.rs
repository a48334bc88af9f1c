use crate::core::schema::TableTemplate;
use crate::domain::model::{AdapterOptions, Column, Lifecycle, Pull, Row};
use crate::domain::ports::{Adapter, CommandRunner};
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::validate_non_empty_string;

pub const CLASS_NAME: &str = "Command";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSettings {
    pub command: String,
    pub columns: Vec<String>,
    pub after: Option<String>,
    pub numeric: bool,
}

impl CommandSettings {
    pub fn from_options(options: &AdapterOptions) -> Result<Self> {
        let command = options.require("command")?;
        validate_non_empty_string("command", command)?;

        Ok(Self {
            command: command.to_string(),
            columns: options.list("columns").unwrap_or_default(),
            after: options
                .get("after")
                .filter(|marker| !marker.is_empty())
                .map(str::to_string),
            numeric: options.parse_or("numeric", true)?,
        })
    }

    fn declared_columns(&self) -> Vec<Column> {
        columns_for(&self.columns, self.numeric)
    }

    /// First non-blank line, optionally cut after the last `after` marker,
    /// split on whitespace and commas. Tokens are kept verbatim.
    pub fn parse_output(&self, stdout: &str) -> Result<Vec<String>> {
        let line = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| AdapterError::parse(format!("'{}' produced no output", self.command)))?;

        let segment = match &self.after {
            Some(marker) => line
                .rsplit_once(marker.as_str())
                .map(|(_, rest)| rest)
                .ok_or_else(|| {
                    AdapterError::parse(format!("marker '{}' not found in: {}", marker, line))
                })?,
            None => line,
        };

        let tokens: Vec<String> = segment
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        if tokens.is_empty() {
            return Err(AdapterError::parse(format!("no values in: {}", line)));
        }

        if self.numeric {
            if let Some(bad) = tokens.iter().find(|t| t.parse::<f64>().is_err()) {
                return Err(AdapterError::parse(format!("'{}' is not numeric", bad)));
            }
        }

        if !self.columns.is_empty() && tokens.len() != self.columns.len() {
            return Err(AdapterError::ArityMismatch {
                expected: self.columns.len(),
                actual: tokens.len(),
            });
        }

        Ok(tokens)
    }
}

fn columns_for(names: &[String], numeric: bool) -> Vec<Column> {
    names
        .iter()
        .map(|name| {
            if numeric {
                Column::float8(name.as_str())
            } else {
                Column::text(name.as_str())
            }
        })
        .collect()
}

/// Exactly one row per scan: the parsed output of a single command run.
///
/// Nothing runs at construction. The first pull executes the command; every
/// later pull is `EndOfData`.
pub struct CommandAdapter {
    settings: CommandSettings,
    runner: Box<dyn CommandRunner>,
    columns: Vec<Column>,
    state: Lifecycle,
}

impl CommandAdapter {
    pub fn new(options: &AdapterOptions, runner: Box<dyn CommandRunner>) -> Result<Self> {
        let settings = CommandSettings::from_options(options)?;
        Ok(Self {
            columns: settings.declared_columns(),
            settings,
            runner,
            state: Lifecycle::Constructed,
        })
    }

    pub fn table_template(options: &AdapterOptions) -> Result<TableTemplate> {
        let names = options
            .list("columns")
            .filter(|names| !names.is_empty())
            .ok_or_else(|| AdapterError::missing("columns"))?;
        let numeric = options.parse_or("numeric", true)?;
        Ok(TableTemplate::new("command_table", columns_for(&names, numeric)))
    }

    fn run_once(&mut self) -> Result<Row> {
        tracing::debug!("Running '{}'", self.settings.command);
        // A failure to spawn leaves the shot unspent.
        let output = self.runner.run(&self.settings.command)?;

        self.state = Lifecycle::Iterating;
        if !output.success {
            return Err(AdapterError::CommandFailed {
                command: self.settings.command.clone(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let tokens = self.settings.parse_output(&output.stdout)?;
        tracing::debug!("'{}' yielded {} values", self.settings.command, tokens.len());
        Ok(Row(tokens))
    }
}

impl Adapter for CommandAdapter {
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
        match self.state {
            Lifecycle::Constructed => {
                let result = self.run_once();
                if self.state == Lifecycle::Iterating && result.is_err() {
                    self.state = Lifecycle::Exhausted;
                }
                result.map(Pull::Row)
            }
            Lifecycle::Iterating => {
                self.state = Lifecycle::Exhausted;
                Ok(Pull::EndOfData)
            }
            Lifecycle::Exhausted | Lifecycle::Closed => Ok(Pull::EndOfData),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.state = Lifecycle::Closed;
        Ok(())
    }
}
