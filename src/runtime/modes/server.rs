//! Server mode
//!
//! Configures and starts the HTTP server with all tracking routes.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{health_routes, redirect_routes, tracking_routes, webhook_routes};
use crate::runtime::lifetime::{self, startup::StartupContext};

/// `web::Bytes` 请求体上限；webhook 自行读取请求体，不受此限制
const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// 注册共享状态和所有路由
///
/// 测试里用 `App::new().configure(|cfg| configure_app(cfg, &ctx))` 挂载完整应用。
pub fn configure_app(cfg: &mut web::ServiceConfig, ctx: &StartupContext) {
    cfg.app_data(web::Data::new(ctx.storage.clone()))
        .app_data(web::Data::new(ctx.link_service.clone()))
        .app_data(web::Data::new(ctx.conversion_service.clone()))
        .app_data(web::Data::new(ctx.stats_service.clone()))
        .app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
        .service(health_routes())
        .service(tracking_routes())
        .service(webhook_routes())
        .service(redirect_routes());
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let config = crate::config::get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let storage_for_shutdown = startup.storage.clone();
    let ctx = startup.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Connection", "keep-alive")))
            .configure(|cfg| configure_app(cfg, &ctx))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    .disable_signals();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();
    let handle = server.handle();
    tokio::pin!(server);

    tokio::select! {
        res = &mut server => {
            res.context("HTTP server exited with error")?;
        }
        _ = lifetime::shutdown::wait_for_signal() => {
            handle.stop(true).await;
            if let Err(e) = server.await {
                warn!("HTTP server stopped with error: {}", e);
            }
        }
    }

    lifetime::shutdown::close_storage(&storage_for_shutdown).await;
    warn!("Graceful shutdown completed");

    Ok(())
}
