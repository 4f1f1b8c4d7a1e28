//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, HttpExtractionAdapter, HttpFlashcardAdapter, OpenAiSummaryAdapter},
    config::Config,
    error::ApiError,
    web::{
        documents::{
            delete_document_handler, get_document_handler, list_documents_handler,
            upload_document_handler,
        },
        flashcards::{
            delete_flashcard_handler, generate_flashcards_handler, list_flashcards_handler,
            update_flashcard_handler,
        },
        require_auth,
        rest::health_handler,
        state::AppState,
        summaries::{generate_summary_handler, get_summary_handler},
        ApiDoc,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use study_buddy_core::{DocumentService, FlashcardService, GenerationLocks, SummaryService};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let flashcard_adapter = Arc::new(HttpFlashcardAdapter::new(
        config.flashcard_service_url.clone(),
        config.pipeline.chunk_timeout,
    )?);
    let extraction_adapter = Arc::new(HttpExtractionAdapter::new(
        config.extraction_service_url.clone(),
    )?);

    let summary_config = OpenAIConfig::new()
        .with_api_key(
            config
                .summary_api_key
                .as_ref()
                .ok_or_else(|| ApiError::Internal("SUMMARY_API_KEY is required".to_string()))?,
        )
        .with_api_base(&config.summary_api_base);
    let summary_adapter = Arc::new(OpenAiSummaryAdapter::new(
        Client::with_config(summary_config),
        config.summary_model.clone(),
    ));

    // --- 4. Build the Core Services & Shared AppState ---
    let locks = Arc::new(GenerationLocks::new());
    let app_state = Arc::new(AppState {
        db: db_adapter.clone(),
        config: config.clone(),
        documents: DocumentService::new(db_adapter.clone(), extraction_adapter),
        flashcards: FlashcardService::new(
            db_adapter.clone(),
            flashcard_adapter,
            locks,
            config.pipeline.clone(),
        ),
        summaries: SummaryService::new(db_adapter, summary_adapter),
    });

    // --- 5. Create the Web Router ---
    let allowed_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let public_routes = Router::new().route("/health", get(health_handler));

    let protected_routes = Router::new()
        .route(
            "/api/pdfs",
            post(upload_document_handler).get(list_documents_handler),
        )
        .route(
            "/api/pdfs/{id}",
            get(get_document_handler).delete(delete_document_handler),
        )
        .route(
            "/api/pdfs/{id}/flashcards",
            post(generate_flashcards_handler).get(list_flashcards_handler),
        )
        .route(
            "/api/pdfs/{id}/summary",
            post(generate_summary_handler).get(get_summary_handler),
        )
        .route(
            "/api/flashcards/{id}",
            patch(update_flashcard_handler).delete(delete_flashcard_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes + MULTIPART_OVERHEAD))
        .layer(cors)
        .with_state(app_state);

    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections...");
}
