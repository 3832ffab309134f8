//! Outbound HTTP execution for bidder callouts, with a hard response-size
//! cap.

use crate::core::adapter::{HttpMethod, RequestData, ResponseData};
use futures_util::StreamExt;
use reqwest::Client;
use std::time::Duration;

pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct DemandClient {
    client: Client,
}

impl DemandClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent("nexus-auction-engine")
            .pool_max_idle_per_host(128)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .tcp_nodelay(true)
            .tcp_keepalive(Some(Duration::from_secs(20)))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    pub async fn send(&self, request: &RequestData, timeout: Duration) -> anyhow::Result<ResponseData> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.uri),
            HttpMethod::Post => self.client.post(&request.uri).body(request.body.clone()),
        };
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        let response = tokio::time::timeout(timeout, builder.send()).await??;
        let status_code = response.status().as_u16();

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = tokio::time::timeout(timeout, stream.next())
            .await?
            .transpose()?
        {
            body.extend_from_slice(&chunk);
            if body.len() > MAX_RESPONSE_BYTES {
                anyhow::bail!("response exceeded {MAX_RESPONSE_BYTES} byte cap");
            }
        }

        Ok(ResponseData { status_code, body })
    }
}
