pub mod cursor;
pub mod registry;
pub mod scan;
pub mod schema;

pub use crate::domain::model::{AdapterOptions, Column, ImportRequest, Lifecycle, Pull, Row};
pub use crate::domain::ports::{
    Adapter, CommandRunner, HttpFetcher, KeyValueConnector, KeyValueStore,
};
pub use crate::utils::error::Result;
