//! Tracking API: link registration, stats and link detail

use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

use crate::config::get_config;
use crate::errors::TrackerError;
use crate::services::{LinkService, RegisterLinkRequest, StatsPeriod, StatsService};
use crate::utils::is_valid_tracking_code;
use crate::utils::payload::scalar_to_string;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLinkResponse {
    pub success: bool,
    pub tracking_id: String,
    pub tracked_url: String,
    pub original_url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub period: Option<String>,
    pub agent_type: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        success: false,
        error: message.into(),
    })
}

/// 存储层错误只返回概要信息，细节写日志
fn service_error_response(err: &TrackerError, context: &str) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("{}: {}", context, err);
        error_response(status, context)
    } else {
        error_response(status, err.message())
    }
}

/// 从任意 JSON 文档读取注册字段，contactId 可以是字符串或数字
pub fn parse_register_body(doc: &Value) -> RegisterLinkRequest {
    let field = |name: &str| doc.get(name).and_then(scalar_to_string);
    RegisterLinkRequest {
        contact_id: field("contactId"),
        contact_email: field("contactEmail"),
        agent_type: field("agentType"),
        original_url: field("originalUrl"),
    }
}

/// `<scheme>://<host>` of the current request
///
/// X-Forwarded-Host / X-Forwarded-Proto / Forwarded 只在 `trust_forwarded` 时生效，
/// 否则使用 Host 头和本连接的协议。
pub fn request_base(req: &HttpRequest, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let info = req.connection_info();
        return format!("{}://{}", info.scheme(), info.host());
    }

    let scheme = req
        .uri()
        .scheme_str()
        .unwrap_or(if req.app_config().secure() { "https" } else { "http" });
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or_else(|| req.app_config().host());

    format!("{}://{}", scheme, host)
}

pub struct TrackingService {}

impl TrackingService {
    /// POST /api/register-link
    pub async fn register_link(
        req: HttpRequest,
        body: web::Bytes,
        link_service: web::Data<Arc<LinkService>>,
    ) -> impl Responder {
        let doc: Value = match serde_json::from_slice(&body) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Malformed register-link body: {}", e);
                return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body");
            }
        };

        let request = parse_register_body(&doc);
        let base = request_base(&req, get_config().server.trust_forwarded_headers);
        match link_service.register(request, &base).await {
            Ok(result) => HttpResponse::Ok().json(RegisterLinkResponse {
                success: true,
                tracking_id: result.link.tracking_id,
                tracked_url: result.tracked_url,
                original_url: result.link.original_url,
            }),
            Err(e) => service_error_response(&e, "Failed to register link"),
        }
    }

    /// GET /api/stats?period=&agentType=
    pub async fn get_stats(
        query: web::Query<StatsQuery>,
        stats_service: web::Data<Arc<StatsService>>,
    ) -> impl Responder {
        let query = query.into_inner();
        let period = StatsPeriod::from_query(query.period.as_deref());

        match stats_service.get_stats(period, query.agent_type).await {
            Ok(report) => HttpResponse::Ok().json(report),
            Err(e) => service_error_response(&e, "Failed to load stats"),
        }
    }

    /// GET /api/link/{tracking_id}
    pub async fn get_link(
        path: web::Path<String>,
        link_service: web::Data<Arc<LinkService>>,
    ) -> impl Responder {
        let tracking_id = path.into_inner();
        if !is_valid_tracking_code(&tracking_id) {
            return error_response(StatusCode::NOT_FOUND, "Link not found");
        }

        match link_service.get_link_detail(&tracking_id).await {
            Ok(detail) => HttpResponse::Ok().json(detail),
            Err(TrackerError::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, "Link not found")
            }
            Err(e) => service_error_response(&e, "Failed to load link"),
        }
    }
}

/// Tracking API 路由
pub fn tracking_routes() -> actix_web::Scope {
    web::scope("/api")
        .route(
            "/register-link",
            web::post().to(TrackingService::register_link),
        )
        .route("/stats", web::get().to(TrackingService::get_stats))
        .route("/link/{tracking_id}", web::get().to(TrackingService::get_link))
}
