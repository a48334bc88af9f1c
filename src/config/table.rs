use crate::domain::model::AdapterOptions;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_required_option};

pub const WRAPPER_CLASS: &str = "wrapper_class";

/// Foreign table OPTIONS split into the adapter selector and the options
/// handed to the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignTableOptions {
    pub wrapper_class: String,
    pub options: AdapterOptions,
}

impl ForeignTableOptions {
    pub fn from_options(mut options: AdapterOptions) -> Result<Self> {
        let wrapper_class = options.remove(WRAPPER_CLASS);
        let wrapper_class = validate_required_option(WRAPPER_CLASS, &wrapper_class)?;
        validate_non_empty_string(WRAPPER_CLASS, wrapper_class)?;

        Ok(Self {
            wrapper_class: wrapper_class.trim().to_string(),
            options,
        })
    }
}
