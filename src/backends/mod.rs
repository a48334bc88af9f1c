// Backends: concrete capabilities behind the domain ports (http, process, key-value store).

pub mod http;
pub mod process;

#[cfg(feature = "redis")]
pub mod redis_kv;

pub use http::ReqwestFetcher;
pub use process::ShellRunner;

#[cfg(feature = "redis")]
pub use redis_kv::RedisConnector;
