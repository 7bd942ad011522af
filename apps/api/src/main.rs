mod config;
mod credentials;
mod errors;
mod generation;
mod http_client;
mod llm_client;
mod prediction;
mod routes;
mod skills;
mod state;

use anyhow::{Context, Result};
use reqwest::Client;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::{Config, SkillsAuth};
use crate::credentials::{ClientCredentials, CredentialProvider, StaticToken, TokenCache};
use crate::http_client::{ApiClient, RequestHeaders};
use crate::llm_client::LlmClient;
use crate::prediction::PredictionClient;
use crate::routes::build_router;
use crate::skills::SkillsClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing skills credentials)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job API v{}", env!("CARGO_PKG_VERSION"));

    // One pooled transport shared by every outbound client
    let http = build_http_client(&config)?;
    let api = ApiClient::new(http.clone())
        .with_default_headers(RequestHeaders::new().with("accept", "application/json")?);
    match config.http_timeout {
        Some(timeout) => info!("Outbound HTTP timeout: {}s", timeout.as_secs()),
        None => info!("Outbound HTTP timeout disabled"),
    }

    let credentials = build_credentials(&config, http);

    let llm = LlmClient::new(api.clone(), &config.llm_base_url, &config.llm_model);
    info!(
        "LLM client initialized (model: {}, base: {})",
        llm.model(),
        config.llm_base_url
    );

    let state = AppState {
        skills: SkillsClient::new(api.clone(), credentials, &config.skills_extract_url),
        llm,
        prediction: PredictionClient::new(api, &config.prediction_base_url),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_http_client(config: &Config) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.http_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to build HTTP client")
}

/// Picks the token source for the skills service.
fn build_credentials(config: &Config, http: Client) -> Arc<dyn CredentialProvider> {
    match &config.skills_auth {
        SkillsAuth::Static(token) => {
            info!("Skills service using static access token");
            Arc::new(StaticToken(token.clone()))
        }
        SkillsAuth::ClientCredentials {
            client_id,
            client_secret,
            scope,
        } => {
            info!(
                "Skills service using client credentials (token TTL {}s)",
                config.token_ttl.as_secs()
            );
            Arc::new(TokenCache::new(
                http,
                ClientCredentials {
                    token_url: config.skills_auth_url.clone(),
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    scope: scope.clone(),
                },
                config.token_ttl,
            ))
        }
    }
}
