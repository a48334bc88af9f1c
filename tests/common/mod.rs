#![allow(dead_code)]

use small_fdw::core::{CommandRunner, KeyValueConnector, KeyValueStore};
use small_fdw::domain::ports::CommandOutput;
use small_fdw::{AdapterError, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Frozen key-value snapshot; keys enumerate in insertion order.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    pub pairs: Vec<(String, String)>,
    pub connects: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub selected_db: Arc<Mutex<Option<i64>>>,
    /// Keys whose next GET fails once with a transient error.
    pub flaky_keys: Arc<Mutex<HashSet<String>>>,
    /// Keys whose GET always fails, like a hash answering `WRONGTYPE`.
    pub failing_keys: Arc<Mutex<HashSet<String>>>,
    /// Keys whose GET reports a dropped connection.
    pub broken_keys: Arc<Mutex<HashSet<String>>>,
    /// Keys removed after enumeration.
    pub vanished_keys: Arc<Mutex<HashSet<String>>>,
}

impl MemoryConnector {
    pub fn with_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            pairs: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

struct MemoryStore {
    source: MemoryConnector,
}

impl KeyValueStore for MemoryStore {
    fn select(&mut self, db: i64) -> Result<()> {
        *self.source.selected_db.lock().unwrap() = Some(db);
        Ok(())
    }

    fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        let prefix = pattern.trim_end_matches('*');
        Ok(self
            .source
            .pairs
            .iter()
            .map(|(k, _)| k.clone())
            .filter(|k| k.starts_with(prefix))
            .collect())
    }

    fn get(&mut self, key: &str) -> Result<Option<String>> {
        if self.source.broken_keys.lock().unwrap().contains(key) {
            return Err(AdapterError::Disconnected {
                message: "connection reset by peer".to_string(),
            });
        }
        if self.source.failing_keys.lock().unwrap().contains(key) {
            return Err(AdapterError::source(format!(
                "WRONGTYPE Operation against a key holding the wrong kind of value: {}",
                key
            )));
        }
        if self.source.flaky_keys.lock().unwrap().remove(key) {
            return Err(AdapterError::source(format!("timeout reading {}", key)));
        }
        if self.source.vanished_keys.lock().unwrap().contains(key) {
            return Ok(None);
        }
        Ok(self
            .source
            .pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    fn close(&mut self) -> Result<()> {
        self.source.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl KeyValueConnector for MemoryConnector {
    fn connect(&self, _host: &str, _port: u16) -> Result<Box<dyn KeyValueStore>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryStore {
            source: self.clone(),
        }))
    }
}

/// Prints a fixed stdout and counts invocations.
#[derive(Clone)]
pub struct CannedRunner {
    pub stdout: String,
    pub runs: Arc<AtomicUsize>,
}

impl CannedRunner {
    pub fn new(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl CommandRunner for CannedRunner {
    fn run(&self, _command: &str) -> Result<CommandOutput> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(CommandOutput {
            success: true,
            status: "exit status: 0".to_string(),
            stdout: self.stdout.clone(),
            stderr: String::new(),
        })
    }
}
