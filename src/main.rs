use anyhow::Context;
use campus_assistant::api::{self, app_state::AppState};
use campus_assistant::config::loader::{ConfigLoader, config_exists, default_config_path};
use campus_assistant::models::topic::KnowledgeBase;
use campus_assistant::observability::{
    AppMetrics, HealthCheckResult, ObservabilityState, create_observability_router, init_tracing,
};
use campus_assistant::services::chat::{ChatSettings, create_chat_service};
use campus_assistant::services::matcher::{PickerKind, TopicMatcher, create_response_picker};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    init_tracing(&config.app_name, &config.logging)?;

    info!("Starting {} ({})...", config.app_name, config.environment);
    if !config_exists() {
        warn!(
            "{} not found, using defaults and environment overrides",
            default_config_path().display()
        );
    }

    ConfigLoader::validate(&config)?;
    info!("Configuration loaded successfully");

    let knowledge_base = Arc::new(KnowledgeBase::load(
        config.chatbot.knowledge_base_path.as_deref(),
    )?);
    info!(
        "Knowledge base loaded: {} topics, {} quick questions",
        knowledge_base.topics().len(),
        knowledge_base.quick_questions().len()
    );

    let picker_kind: PickerKind = config
        .chatbot
        .picker
        .parse()
        .map_err(anyhow::Error::msg)?;
    let picker = create_response_picker(picker_kind, config.chatbot.seed);
    let matcher = Arc::new(
        TopicMatcher::new(knowledge_base.clone(), picker)
            .with_threshold(config.chatbot.match_threshold),
    );
    info!("Topic matcher initialized with {:?} picker", picker_kind);

    let chat_service = create_chat_service(matcher, ChatSettings::from(&config.chatbot));
    info!("Chat service initialized");

    let metrics = Arc::new(AppMetrics::default());
    let app_state = AppState::new(chat_service, metrics.clone());

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        metrics,
    ));
    observability_state
        .add_health_check(HealthCheckResult::healthy(
            "knowledge_base",
            format!("{} topics", knowledge_base.topics().len()),
        ))
        .await;

    let api_router = api::initialize_api(app_state, &config.server.cors_origins).await?;
    let router = create_observability_router(observability_state).merge(api_router);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
