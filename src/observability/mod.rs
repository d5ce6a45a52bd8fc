//! 可观测性模块
//!
//! 提供 Prometheus 文本格式指标、结构化日志和健康检查。

use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::config::LoggingConfig;
use crate::error::{AppError, Result};
use crate::models::chat::ReplyKind;

// ===== Metrics =====

/// 应用指标
#[derive(Debug, Clone, Default)]
pub struct AppMetrics {
    pub http_requests_total: Arc<AtomicU64>,
    pub http_request_duration_sum: Arc<AtomicU64>,
    pub active_connections: Arc<AtomicI64>,
    pub chat_sessions_opened: Arc<AtomicU64>,
    pub chat_messages_total: Arc<AtomicU64>,
    pub topic_replies_total: Arc<AtomicU64>,
    pub rephrase_replies_total: Arc<AtomicU64>,
    pub off_topic_replies_total: Arc<AtomicU64>,
    pub errors_total: Arc<AtomicU64>,
}

impl AppMetrics {
    /// 记录 HTTP 请求
    pub fn record_http_request(&self, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::SeqCst);
        self.http_request_duration_sum
            .fetch_add(duration_ms, Ordering::SeqCst);
    }

    /// 记录活跃连接
    pub fn record_connection(&self, delta: i64) {
        self.active_connections.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn record_session_opened(&self) {
        self.chat_sessions_opened.fetch_add(1, Ordering::SeqCst);
    }

    /// 按回复来源计数
    pub fn record_reply(&self, kind: ReplyKind) {
        self.chat_messages_total.fetch_add(1, Ordering::SeqCst);
        let counter = match kind {
            ReplyKind::Keyword | ReplyKind::Threshold => &self.topic_replies_total,
            ReplyKind::Rephrase => &self.rephrase_replies_total,
            ReplyKind::OffTopic => &self.off_topic_replies_total,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录错误
    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 生成 Prometheus 格式指标
    pub fn gather(&self) -> String {
        format!(
            r#"# HELP http_requests_total Total HTTP requests
# TYPE http_requests_total counter
http_requests_total {}
# HELP http_request_duration_seconds HTTP request duration in seconds
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_sum {}
http_request_duration_seconds_count {}
# HELP active_connections Active HTTP connections
# TYPE active_connections gauge
active_connections {}
# HELP chat_sessions_opened_total Chat widgets opened
# TYPE chat_sessions_opened_total counter
chat_sessions_opened_total {}
# HELP chat_messages_total Chat messages answered
# TYPE chat_messages_total counter
chat_messages_total {}
# HELP chat_replies_total Chat replies by source
# TYPE chat_replies_total counter
chat_replies_total{{kind="topic"}} {}
chat_replies_total{{kind="rephrase"}} {}
chat_replies_total{{kind="off_topic"}} {}
# HELP errors_total Total errors
# TYPE errors_total counter
errors_total {}
"#,
            self.http_requests_total.load(Ordering::SeqCst),
            self.http_request_duration_sum.load(Ordering::SeqCst) as f64 / 1000.0,
            self.http_requests_total.load(Ordering::SeqCst),
            self.active_connections.load(Ordering::SeqCst),
            self.chat_sessions_opened.load(Ordering::SeqCst),
            self.chat_messages_total.load(Ordering::SeqCst),
            self.topic_replies_total.load(Ordering::SeqCst),
            self.rephrase_replies_total.load(Ordering::SeqCst),
            self.off_topic_replies_total.load(Ordering::SeqCst),
            self.errors_total.load(Ordering::SeqCst),
        )
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub checks: Vec<HealthCheck>,
}

/// 单个健康检查项
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    pub message: Option<String>,
    pub latency_ms: Option<u64>,
}

/// 健康检查结果
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub name: String,
    pub healthy: bool,
    pub message: String,
    pub latency_ms: u64,
}

impl HealthCheckResult {
    pub fn healthy(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            healthy: true,
            message: message.into(),
            latency_ms: 0,
        }
    }
}

/// 可观测性路由共享状态
#[derive(Debug, Clone)]
pub struct ObservabilityState {
    pub metrics: Arc<AppMetrics>,
    pub health_checks: Arc<Mutex<Vec<HealthCheckResult>>>,
    pub start_time: DateTime<Utc>,
    pub version: String,
}

impl ObservabilityState {
    pub fn new(version: String, metrics: Arc<AppMetrics>) -> Self {
        Self {
            metrics,
            health_checks: Arc::new(Mutex::new(Vec::new())),
            start_time: Utc::now(),
            version,
        }
    }

    /// 添加健康检查结果，只保留最近 10 条
    pub async fn add_health_check(&self, result: HealthCheckResult) {
        let mut checks = self.health_checks.lock().await;
        checks.push(result);
        if checks.len() > 10 {
            checks.remove(0);
        }
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }
}

fn status_label(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

// ===== Health Check Handlers =====

/// 获取完整健康状态
pub async fn health_check(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let checks = state.health_checks.lock().await;
    let all_healthy = checks.iter().all(|c| c.healthy);

    let health_status = HealthStatus {
        status: status_label(all_healthy),
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        checks: checks
            .iter()
            .map(|c| HealthCheck {
                name: c.name.clone(),
                status: status_label(c.healthy),
                message: Some(c.message.clone()),
                latency_ms: Some(c.latency_ms),
            })
            .collect(),
    };

    let status_code = if all_healthy {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_status))
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// 就绪检查
pub async fn readiness(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let checks = state.health_checks.lock().await;

    if checks.iter().all(|c| c.healthy) {
        (axum::http::StatusCode::OK, "Ready")
    } else {
        (axum::http::StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
    }
}

/// Prometheus 指标端点
pub async fn metrics(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    (axum::http::StatusCode::OK, state.metrics.gather())
}

/// 版本信息端点
pub async fn version(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// 初始化日志。`RUST_LOG` 优先于配置中的级别。
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},{}={}",
            config.level,
            service_name.replace('-', "_"),
            config.level
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true);

    let result = if config.structured {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| AppError::Internal(format!("Failed to set tracing subscriber: {}", e)))
}

// ===== Request Metrics Middleware =====

/// 记录请求指标的中间件
pub async fn metrics_middleware(
    State(metrics): State<Arc<AppMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let start = std::time::Instant::now();

    metrics.record_connection(1);

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    metrics.record_http_request(duration_ms);
    metrics.record_connection(-1);
    if response.status().is_server_error() {
        metrics.record_error();
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_metrics_gather() {
        let metrics = AppMetrics::default();
        metrics.record_http_request(100);
        metrics.record_connection(1);
        metrics.record_session_opened();
        metrics.record_reply(ReplyKind::Keyword);
        metrics.record_reply(ReplyKind::OffTopic);
        metrics.record_error();

        let output = metrics.gather();
        assert!(output.contains("http_requests_total 1"));
        assert!(output.contains("active_connections 1"));
        assert!(output.contains("chat_sessions_opened_total 1"));
        assert!(output.contains("chat_messages_total 2"));
        assert!(output.contains("chat_replies_total{kind=\"topic\"} 1"));
        assert!(output.contains("chat_replies_total{kind=\"rephrase\"} 0"));
        assert!(output.contains("chat_replies_total{kind=\"off_topic\"} 1"));
        assert!(output.contains("errors_total 1"));
    }

    #[test]
    fn test_connection_gauge_returns_to_zero() {
        let metrics = AppMetrics::default();
        metrics.record_connection(1);
        metrics.record_connection(-1);
        assert_eq!(metrics.active_connections.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_health_reports_failed_check() {
        let state = Arc::new(ObservabilityState::new(
            "0.1.0".to_string(),
            Arc::new(AppMetrics::default()),
        ));
        state
            .add_health_check(HealthCheckResult::healthy("knowledge_base", "12 topics"))
            .await;

        let app = create_observability_router(state.clone());
        let response = app
            .clone()
            .oneshot(HttpRequest::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        state
            .add_health_check(HealthCheckResult {
                name: "knowledge_base".to_string(),
                healthy: false,
                message: "missing".to_string(),
                latency_ms: 0,
            })
            .await;
        let response = app
            .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_liveness() {
        let state = Arc::new(ObservabilityState::new(
            "0.1.0".to_string(),
            Arc::new(AppMetrics::default()),
        ));
        let response = create_observability_router(state)
            .oneshot(HttpRequest::get("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
