//! Conversion webhook
//!
//! Always answers 200; failures are reported in the response body.

use actix_web::{HttpResponse, Responder, web};
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, trace, warn};

use crate::services::{ConversionOutcome, ConversionService};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    pub tracking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 把请求体解析为 JSON 对象；非对象或解析失败都按空文档处理
pub fn parse_webhook_body(body: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) if value.is_object() => value,
        Ok(_) => {
            trace!("Webhook body is not a JSON object, treating as empty");
            Value::Object(Map::new())
        }
        Err(e) => {
            trace!("Webhook body is not valid JSON ({}), treating as empty", e);
            Value::Object(Map::new())
        }
    }
}

/// 存储失败时返回给调用方的固定信息，细节只写日志
pub const CONVERSION_FAILED_MESSAGE: &str = "Failed to record conversion";

/// 请求体上限，超出后按空文档处理
pub const MAX_WEBHOOK_BODY_BYTES: usize = 1024 * 1024;

/// 读取请求体，超过 `limit` 或读取出错时返回 None
async fn read_body_limited(mut payload: web::Payload, limit: usize) -> Option<web::Bytes> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("Failed to read webhook body: {}", e);
                return None;
            }
        };
        if body.len() + chunk.len() > limit {
            warn!("Webhook body exceeds {} bytes, treating as empty", limit);
            return None;
        }
        body.extend_from_slice(&chunk);
    }
    Some(body.freeze())
}

pub struct WebhookService {}

impl WebhookService {
    pub async fn appointment(
        body: web::Payload,
        conversion_service: web::Data<Arc<ConversionService>>,
    ) -> impl Responder {
        let payload = match read_body_limited(body, MAX_WEBHOOK_BODY_BYTES).await {
            Some(bytes) => parse_webhook_body(&bytes),
            None => Value::Object(Map::new()),
        };

        let response = match conversion_service.record_from_payload(&payload).await {
            Ok(ConversionOutcome::Skipped) => WebhookResponse {
                success: true,
                tracking_id: None,
                message: Some("No contact ID found in payload".to_string()),
                error: None,
            },
            Ok(outcome) => WebhookResponse {
                success: true,
                tracking_id: outcome.tracking_id().map(str::to_string),
                message: None,
                error: None,
            },
            Err(e) => {
                error!("Failed to record conversion: {}", e);
                WebhookResponse {
                    success: false,
                    tracking_id: None,
                    message: None,
                    error: Some(CONVERSION_FAILED_MESSAGE.to_string()),
                }
            }
        };

        HttpResponse::Ok().json(response)
    }
}

/// Webhook 路由：POST /webhook/appointment
pub fn webhook_routes() -> actix_web::Scope {
    web::scope("/webhook").route("/appointment", web::post().to(WebhookService::appointment))
}
