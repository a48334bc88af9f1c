use crate::domain::ports::{KeyValueConnector, KeyValueStore};
use crate::utils::error::{AdapterError, Result};
use redis::Commands;
use std::time::Duration;

/// Opens a dedicated Redis connection for every adapter instance.
#[derive(Debug, Clone, Default)]
pub struct RedisConnector {
    connect_timeout: Option<Duration>,
}

impl RedisConnector {
    pub fn with_connect_timeout(timeout: Duration) -> Self {
        Self {
            connect_timeout: Some(timeout),
        }
    }
}

impl KeyValueConnector for RedisConnector {
    fn connect(&self, host: &str, port: u16) -> Result<Box<dyn KeyValueStore>> {
        let client = redis::Client::open((host, port))?;
        let connection = match self.connect_timeout {
            Some(timeout) => client.get_connection_with_timeout(timeout)?,
            None => client.get_connection()?,
        };
        tracing::debug!("Connected to redis at {}:{}", host, port);

        Ok(Box::new(RedisStore {
            connection: Some(connection),
        }))
    }
}

pub struct RedisStore {
    connection: Option<redis::Connection>,
}

impl RedisStore {
    fn connection(&mut self) -> Result<&mut redis::Connection> {
        self.connection
            .as_mut()
            .ok_or_else(|| AdapterError::Disconnected {
                message: "redis connection already closed".to_string(),
            })
    }
}

impl KeyValueStore for RedisStore {
    fn select(&mut self, db: i64) -> Result<()> {
        redis::cmd("SELECT").arg(db).query::<()>(self.connection()?)?;
        Ok(())
    }

    fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        let keys: Vec<String> = self.connection()?.keys(pattern)?;
        Ok(keys)
    }

    fn get(&mut self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self.connection()?.get(key)?;
        Ok(value)
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the connection closes the socket.
        self.connection = None;
        Ok(())
    }
}
