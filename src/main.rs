//! pdnscontrol demo server.
//!
//! Proxies a PowerDNS API (`PDNS_API_URL`, credentials may be embedded in
//! the URL) through the JSON and JSONP helpers.

use pdnscontrol::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Lists the servers known to the remote API as a JSON array.
struct ServersHandler {
    client: RemoteClient,
    api_url: String,
}

#[async_trait]
impl Handler for ServersHandler {
    async fn call(&self, _request: Request, ctx: &RequestContext) -> Result<Response, AppError> {
        if let Some(principal) = ctx.auth.principal() {
            tracing::info!("{} listed servers [{}]", principal.username, ctx.request_id);
        }

        let servers: Vec<serde_json::Value> = self
            .client
            .fetch_json_as(RemoteRequest::get(format!("{}/servers", self.api_url)))
            .await?;

        Ok(json_array(&servers)?)
    }

    fn name(&self) -> &str {
        "servers"
    }
}

/// Statistics of one server, served as JSONP.
struct StatisticsHandler {
    client: RemoteClient,
    api_url: String,
}

#[async_trait]
impl Handler for StatisticsHandler {
    async fn call(&self, request: Request, _ctx: &RequestContext) -> Result<Response, AppError> {
        let server = request
            .get_query("server")
            .cloned()
            .unwrap_or_else(|| "localhost".to_string());

        let remote = RemoteRequest::get(format!(
            "{}/servers/{}/statistics",
            self.api_url, server
        ));
        let statistics = self.client.fetch_json(remote).await?;

        Ok(jsonp(&request, &serde_json::json!({ "statistics": statistics }))?)
    }

    fn name(&self) -> &str {
        "statistics"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting pdnscontrol...");

    let config = AppConfig::from_env();
    let api_url = std::env::var("PDNS_API_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8081/api/v1".to_string())
        .trim_end_matches('/')
        .to_string();

    let client = RemoteClient::new(&config)?;
    let server = Server::new(config);

    server
        .register(
            "/api/servers",
            Arc::new(ServersHandler {
                client: client.clone(),
                api_url: api_url.clone(),
            }),
        )
        .await?;
    server
        .register(
            "/api/statistics",
            Arc::new(StatisticsHandler { client, api_url }),
        )
        .await?;

    tracing::info!("Try: curl http://localhost:8080/api/servers");
    tracing::info!("Try: curl 'http://localhost:8080/api/statistics?callback=show'");
    tracing::info!("Health check: curl http://localhost:8080/_health");

    server.run().await
}
