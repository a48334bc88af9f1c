use crate::domain::model::{Column, Lifecycle, Pull};
use crate::utils::error::Result;
use std::time::Duration;

/// The iteration protocol every foreign table adapter implements.
///
/// Construction is left to each concrete type: it validates the options
/// before acquiring its backend, so a missing required option never opens a
/// connection.
pub trait Adapter: Send {
    /// Identifier the adapter is registered under (`wrapper_class`).
    fn class_name(&self) -> &str;

    /// Declared columns. Empty means the shape is implicit.
    fn columns(&self) -> &[Column];

    fn state(&self) -> Lifecycle;

    /// Advances by exactly one row. After `EndOfData` every later call
    /// returns `EndOfData` again.
    fn pull(&mut self) -> Result<Pull>;

    /// Releases the backend handle. Idempotent.
    fn close(&mut self) -> Result<()>;
}

pub trait KeyValueStore: Send {
    fn select(&mut self, db: i64) -> Result<()>;
    fn keys(&mut self, pattern: &str) -> Result<Vec<String>>;
    fn get(&mut self, key: &str) -> Result<Option<String>>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Opens one fresh store connection per adapter instance.
pub trait KeyValueConnector: Send + Sync {
    fn connect(&self, host: &str, port: u16) -> Result<Box<dyn KeyValueStore>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait HttpFetcher: Send {
    fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandRunner: Send {
    fn run(&self, command: &str) -> Result<CommandOutput>;
}
