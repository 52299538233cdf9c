// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP server emulating the OpenAI, Anthropic and Gemini streaming APIs

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::ChunkbackConfig;
use crate::error::Result;
use crate::streaming::{Pacer, TokioPacer};
use crate::tool_cache::{InMemoryToolCache, ToolResponseCache};

pub mod auth;
pub mod handlers;
pub mod models;
pub mod prompt;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ChunkbackConfig>,
    pub tool_cache: Arc<dyn ToolResponseCache>,
    pub pacer: Arc<dyn Pacer>,
}

impl AppState {
    pub fn new(config: ChunkbackConfig) -> Self {
        Self {
            config: Arc::new(config),
            tool_cache: Arc::new(InMemoryToolCache::new()),
            pacer: Arc::new(TokioPacer),
        }
    }

    pub fn with_tool_cache(mut self, tool_cache: Arc<dyn ToolResponseCache>) -> Self {
        self.tool_cache = tool_cache;
        self
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }
}

/// Build the router with every route and the middleware stack.
pub fn build_router(state: AppState) -> Router {
    let mut api = Router::new()
        // OpenAI and Azure OpenAI
        .route("/v1/chat/completions", post(handlers::chat_completions))
        .route(
            "/openai/deployments/{deployment}/chat/completions",
            post(handlers::azure_chat_completions),
        )
        .route(
            "/openai/models/{model}/chat/completions",
            post(handlers::azure_chat_completions),
        )
        // Anthropic
        .route("/v1/messages", post(handlers::messages))
        // Gemini
        .route("/v1/models/{model_action}", post(handlers::generate_content))
        .route("/v1beta/models/{model_action}", post(handlers::generate_content))
        // Model listings
        .route("/v1/models", get(handlers::list_models))
        .route("/v1beta/models", get(handlers::list_models))
        .route("/openai/models", get(handlers::list_models))
        .route("/openai/deployments", get(handlers::list_models))
        // Mocked tool responses
        .route("/v1/tool-responses/{call_id}", get(handlers::tool_response));

    if state.config.security.auth_enabled() {
        api = api.route_layer(from_fn_with_state(state.clone(), auth::require_api_key));
    }

    let cors = if state.config.server.cors_enabled {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    let middleware_stack = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .with_state(state)
        .layer(middleware_stack)
}

/// Chunkback HTTP server
pub struct Server {
    addr: SocketAddr,
    app: Router,
}

impl Server {
    pub fn new(config: ChunkbackConfig) -> Result<Self> {
        Self::with_state(AppState::new(config))
    }

    pub fn with_state(state: AppState) -> Result<Self> {
        state.config.validate()?;
        let addr = state.config.bind_addr()?;
        Ok(Self {
            addr,
            app: build_router(state),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("Chunkback listening on {}", listener.local_addr()?);
        info!("OpenAI endpoint: POST /v1/chat/completions");
        info!("Anthropic endpoint: POST /v1/messages");
        info!("Gemini endpoint: POST /v1/models/{{model}}:generateContent");

        axum::serve(listener, self.app).await?;
        Ok(())
    }
}
