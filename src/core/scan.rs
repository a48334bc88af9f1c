use crate::config::table::ForeignTableOptions;
use crate::core::registry::AdapterRegistry;
use crate::domain::model::{Column, Pull, Row};
use crate::domain::ports::Adapter;
use crate::utils::error::AdapterError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Construct,
    /// One-based pull number.
    Pull(usize),
    Close,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPhase::Construct => write!(f, "construct"),
            ScanPhase::Pull(n) => write!(f, "pull #{}", n),
            ScanPhase::Close => write!(f, "close"),
        }
    }
}

/// An adapter error attributed to the call that raised it.
#[derive(Error, Debug)]
#[error("{class}: {phase} failed: {error}")]
pub struct ScanError {
    pub class: String,
    pub phase: ScanPhase,
    #[source]
    pub error: AdapterError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub class: String,
    pub rows: usize,
    pub pulls: usize,
}

/// One scan of one foreign table: construct once, pull until `EndOfData`,
/// close. The adapter is closed on drop if `finish` was never reached, so the
/// backend is released on every exit path.
pub struct ForeignScan {
    adapter: Box<dyn Adapter>,
    class: String,
    arity: Option<usize>,
    pulls: usize,
    rows: usize,
    finished: bool,
    closed: bool,
}

impl ForeignScan {
    pub fn begin(registry: &AdapterRegistry, table: &ForeignTableOptions) -> Result<Self, ScanError> {
        let adapter = registry
            .construct(&table.wrapper_class, &table.options)
            .map_err(|error| ScanError {
                class: table.wrapper_class.clone(),
                phase: ScanPhase::Construct,
                error,
            })?;
        Ok(Self::from_adapter(adapter))
    }

    pub fn from_adapter(adapter: Box<dyn Adapter>) -> Self {
        let declared = adapter.columns().len();
        Self {
            class: adapter.class_name().to_string(),
            arity: (declared > 0).then_some(declared),
            adapter,
            pulls: 0,
            rows: 0,
            finished: false,
            closed: false,
        }
    }

    pub fn columns(&self) -> &[Column] {
        self.adapter.columns()
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn rows_emitted(&self) -> usize {
        self.rows
    }

    fn error(&self, phase: ScanPhase, error: AdapterError) -> ScanError {
        ScanError {
            class: self.class.clone(),
            phase,
            error,
        }
    }

    /// `Ok(None)` is end of data and stays so. Errors leave the scan open;
    /// the caller decides whether to keep pulling.
    pub fn next_row(&mut self) -> Result<Option<Row>, ScanError> {
        if self.finished {
            return Ok(None);
        }

        self.pulls += 1;
        let phase = ScanPhase::Pull(self.pulls);
        match self.adapter.pull() {
            Ok(Pull::Row(row)) => {
                let expected = *self.arity.get_or_insert(row.len());
                if row.len() != expected {
                    return Err(self.error(
                        phase,
                        AdapterError::ArityMismatch {
                            expected,
                            actual: row.len(),
                        },
                    ));
                }
                self.rows += 1;
                Ok(Some(row))
            }
            Ok(Pull::EndOfData) => {
                tracing::debug!("{}: end of data after {} rows", self.class, self.rows);
                self.finished = true;
                Ok(None)
            }
            Err(error) => {
                tracing::debug!("{}: {} failed: {}", self.class, phase, error);
                Err(self.error(phase, error))
            }
        }
    }

    pub fn close(&mut self) -> Result<(), ScanError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.adapter
            .close()
            .map_err(|error| self.error(ScanPhase::Close, error))
    }

    pub fn finish(mut self) -> Result<ScanSummary, ScanError> {
        self.close()?;
        tracing::info!(
            "{}: scan finished, {} rows in {} pulls",
            self.class,
            self.rows,
            self.pulls
        );
        Ok(ScanSummary {
            class: self.class.clone(),
            rows: self.rows,
            pulls: self.pulls,
        })
    }

    /// Pulls everything, aborting on the first error. The adapter is closed
    /// either way.
    pub fn collect_rows(mut self) -> Result<Vec<Row>, ScanError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        self.finish()?;
        Ok(rows)
    }
}

impl Iterator for ForeignScan {
    type Item = Result<Row, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

impl Drop for ForeignScan {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("{}", e);
        }
    }
}
