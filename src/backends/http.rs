use crate::domain::ports::{HttpFetcher, HttpRequest, HttpResponse};
use crate::utils::error::Result;
use reqwest::blocking::Client;

/// Blocking HTTP client. Must be built and dropped outside an async runtime;
/// async callers go through `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("small-fdw/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.get(&request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        tracing::debug!("GET {} -> {} ({} bytes)", request.url, status, body.len());

        Ok(HttpResponse { status, body })
    }
}
