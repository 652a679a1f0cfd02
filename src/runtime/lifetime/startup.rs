use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::services::{ConversionService, LinkService, StatsService};
use crate::storage::{SeaOrmStorage, StorageFactory};

/// 服务器启动所需的共享对象，所有 worker 共用同一个存储实例
#[derive(Clone)]
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub link_service: Arc<LinkService>,
    pub conversion_service: Arc<ConversionService>,
    pub stats_service: Arc<StatsService>,
}

impl StartupContext {
    /// 基于已打开的存储构建各个服务
    pub fn from_storage(storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(storage.clone())),
            conversion_service: Arc::new(ConversionService::new(storage.clone())),
            stats_service: Arc::new(StatsService::new(storage.clone())),
            storage,
        }
    }
}

/// 准备服务器启动的上下文：连接数据库、执行迁移、构建服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let context = StartupContext::from_storage(storage);

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(context)
}
