use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::{debug, error, trace};

use crate::config::get_config;
use crate::services::{LinkService, VisitInfo};
use crate::utils::ip::{extract_client_ip, extract_user_agent};
use crate::utils::is_valid_tracking_code;

pub struct RedirectService {}

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        link_service: web::Data<Arc<LinkService>>,
    ) -> impl Responder {
        let tracking_id = path.into_inner();

        if !is_valid_tracking_code(&tracking_id) {
            // 非法追踪码，直接 404（不查库）
            trace!("Invalid tracking code rejected: {}", &tracking_id);
            return Self::not_found_response();
        }

        let visit = VisitInfo {
            ip_address: extract_client_ip(&req, get_config().server.trust_forwarded_headers),
            user_agent: extract_user_agent(&req),
        };

        match link_service.visit(&tracking_id, visit).await {
            Ok(Some(link)) => Self::finish_redirect(&link.original_url),
            Ok(None) => {
                debug!("Tracking code not found: {}", &tracking_id);
                Self::not_found_response()
            }
            Err(e) => {
                error!("Database error during redirect lookup: {}", e);
                Self::error_response()
            }
        }
    }

    #[inline]
    fn finish_redirect(target: &str) -> HttpResponse {
        HttpResponse::build(StatusCode::FOUND)
            .insert_header(("Location", target))
            .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
            .finish()
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .body("Link not found")
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .body("Internal Server Error")
    }
}

/// 追踪链接跳转路由：GET /t/{tracking_id}
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("/t").route(
        "/{tracking_id}",
        web::get().to(RedirectService::handle_redirect),
    )
}
