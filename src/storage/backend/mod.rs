//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod clicks;
mod connection;
mod conversions;
mod converters;
mod links;

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection};
use tracing::warn;

use crate::errors::{Result, TrackerError};
use crate::storage::models::StorageConfig;
use migration::entities::tracked_link;

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_click, model_to_conversion, model_to_link};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(TrackerError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 链接过滤条件（统计查询使用）
///
/// 所有条件都以参数绑定的方式进入 SQL。
#[derive(Default, Clone, Debug)]
pub struct LinkFilter {
    /// 创建时间 >= created_after
    pub created_after: Option<DateTime<Utc>>,
    /// agent 类型精确匹配
    pub agent_type: Option<String>,
}

impl LinkFilter {
    /// 去掉 agent 过滤，只保留时间窗口
    pub fn without_agent(&self) -> Self {
        Self {
            created_after: self.created_after,
            agent_type: None,
        }
    }

    pub(crate) fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(after) = self.created_after {
            condition = condition.add(tracked_link::Column::CreatedAt.gte(after));
        }

        if let Some(ref agent_type) = self.agent_type {
            condition = condition.add(tracked_link::Column::AgentType.eq(agent_type.as_str()));
        }

        condition
    }
}

/// SeaORM-based storage backend
///
/// Constructed once at startup and shared by every handler through `web::Data`.
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(TrackerError::database_config("DATABASE_URL 未设置"));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
        };

        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn get_backend_config(&self) -> StorageConfig {
        StorageConfig {
            storage_type: self.backend_name.clone(),
        }
    }

    /// 检查数据库是否可用
    pub async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| TrackerError::database_connection(format!("数据库不可用: {}", e)))
    }

    /// 关闭连接池（进程退出前调用）
    pub async fn close(&self) -> Result<()> {
        self.db
            .clone()
            .close()
            .await
            .map_err(|e| TrackerError::database_connection(format!("关闭数据库失败: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://x.db?mode=rwc").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("data/links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url(":memory:").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mariadb://u@h/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("postgresql://u@h/db").unwrap(), "postgres");
        assert!(matches!(
            infer_backend_from_url("redis://localhost"),
            Err(TrackerError::DatabaseConfig(_))
        ));
    }

    #[test]
    fn test_filter_without_agent_keeps_window() {
        let after = Utc::now();
        let filter = LinkFilter {
            created_after: Some(after),
            agent_type: Some("post_call".to_string()),
        };
        let stripped = filter.without_agent();
        assert_eq!(stripped.created_after, Some(after));
        assert!(stripped.agent_type.is_none());
    }
}
