use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, trace};

use crate::storage::SeaOrmStorage;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct HealthService {}

impl HealthService {
    // 进程存活即返回 healthy，不访问数据库
    pub async fn health_check() -> impl Responder {
        trace!("Received health check request");

        HttpResponse::Ok().json(HealthResponse {
            status: "healthy",
            timestamp: Utc::now(),
            error: None,
        })
    }

    // 就绪检查：数据库可 ping 通才算就绪
    pub async fn readiness_check(storage: web::Data<Arc<SeaOrmStorage>>) -> impl Responder {
        trace!("Received readiness check request");

        match storage.ping().await {
            Ok(()) => HttpResponse::Ok().json(HealthResponse {
                status: "ready",
                timestamp: Utc::now(),
                error: None,
            }),
            Err(e) => {
                error!("Readiness check failed: {}", e);
                HttpResponse::ServiceUnavailable().json(HealthResponse {
                    status: "unavailable",
                    timestamp: Utc::now(),
                    error: Some(e.message().to_string()),
                })
            }
        }
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
}
