//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        load_baseline_prompts, CodeBlockExtractor, CommandCatalogRetriever, LlmCommandCorrector,
        OpenAiChatAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        rest::{generate_commands_handler, search_commands_handler},
        state::AppState,
        ws_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use geogebra_assistant_core::{
    ports::{ChatCompletionService, CommandExtractor, CommandRetriever},
    RegenerationService,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load Prompts & the Command Catalog ---
    let prompts = load_baseline_prompts(&config.prompts_path)?;
    let catalog = match &config.command_catalog_path {
        Some(path) => {
            info!("Loading command catalog from {}", path.display());
            CommandCatalogRetriever::from_file(path)?
        }
        None => CommandCatalogRetriever::bundled()?,
    };
    info!("Command catalog ready with {} commands.", catalog.len());
    let retriever: Arc<dyn CommandRetriever> = Arc::new(catalog);

    // --- 3. Initialize Service Adapters ---
    let mut openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.as_str());
    if let Some(base_url) = &config.openai_base_url {
        info!("Using OpenAI-compatible endpoint at {}", base_url);
        openai_config = openai_config.with_api_base(base_url.as_str());
    }
    let openai_client = Client::with_config(openai_config);

    let chat_adapter: Arc<dyn ChatCompletionService> =
        Arc::new(OpenAiChatAdapter::new(openai_client));
    let extractor: Arc<dyn CommandExtractor> = Arc::new(CodeBlockExtractor::new()?);

    let corrector = Arc::new(LlmCommandCorrector::new(
        chat_adapter.clone(),
        config.correction_model.clone(),
    ));
    let regeneration = Arc::new(RegenerationService::new(
        retriever.clone(),
        extractor.clone(),
        chat_adapter.clone(),
        prompts,
        config.regeneration_model.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        regeneration,
        corrector,
        llm: chat_adapter,
        extractor,
        retriever,
        generation_model: config.generation_model.clone(),
    });

    let allowed_origin = config
        .cors_allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    // --- 5. Create the Web Router ---
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/generate-commands", post(generate_commands_handler))
        .route("/search-commands", post(search_commands_handler))
        .layer(cors)
        .with_state(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
