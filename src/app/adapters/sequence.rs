use crate::core::schema::TableTemplate;
use crate::domain::model::{AdapterOptions, Column, Lifecycle, Pull, Row};
use crate::domain::ports::Adapter;
use crate::utils::error::Result;

pub const CLASS_NAME: &str = "Sequence";

const DEFAULT_TEMPLATE: &str = "Hello {n}";

/// Generates `count` single-cell rows from a template; `{n}` is the
/// zero-based row number. Needs no backend.
pub struct SequenceAdapter {
    count: u64,
    next: u64,
    template: String,
    columns: Vec<Column>,
    state: Lifecycle,
}

impl SequenceAdapter {
    pub fn new(options: &AdapterOptions) -> Result<Self> {
        Ok(Self {
            count: options.parse_or("count", 10)?,
            next: 0,
            template: options.get_or("template", DEFAULT_TEMPLATE).to_string(),
            columns: vec![Column::text("value")],
            state: Lifecycle::Constructed,
        })
    }

    pub fn table_template(_options: &AdapterOptions) -> Result<TableTemplate> {
        Ok(TableTemplate::new("sequence_table", vec![Column::text("value")]))
    }
}

impl Adapter for SequenceAdapter {
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
        if self.next >= self.count {
            self.state = Lifecycle::Exhausted;
            return Ok(Pull::EndOfData);
        }

        let cell = self.template.replace("{n}", &self.next.to_string());
        self.next += 1;
        self.state = Lifecycle::Iterating;
        Ok(Pull::Row(Row::new([cell])))
    }

    fn close(&mut self) -> Result<()> {
        self.state = Lifecycle::Closed;
        Ok(())
    }
}
