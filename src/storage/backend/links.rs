//! Tracked link operations for SeaOrmStorage

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};
use tracing::{debug, info};

use super::converters::{model_to_link, new_link_to_active_model};
use super::{LinkFilter, SeaOrmStorage};
use crate::errors::{Result, TrackerError};
use crate::storage::{LinkOutcome, NewLink, TrackedLink};

use migration::entities::tracked_link;

impl SeaOrmStorage {
    /// 插入新链接
    ///
    /// 追踪码冲突由唯一索引拒绝，作为 DatabaseOperation 错误返回。
    pub async fn insert_link(&self, link: &NewLink) -> Result<TrackedLink> {
        let model = new_link_to_active_model(link)
            .insert(&self.db)
            .await
            .map_err(|e| {
                TrackerError::database_operation(format!(
                    "插入追踪链接 '{}' 失败: {}",
                    link.tracking_id, e
                ))
            })?;

        info!(
            "Tracked link created: {} (agent: {}, contact: {})",
            model.tracking_id, model.agent_type, model.contact_id
        );
        Ok(model_to_link(model))
    }

    pub async fn get_link(&self, tracking_id: &str) -> Result<Option<TrackedLink>> {
        let model = tracked_link::Entity::find()
            .filter(tracked_link::Column::TrackingId.eq(tracking_id))
            .one(&self.db)
            .await
            .map_err(|e| {
                TrackerError::database_operation(format!("查询追踪链接失败: {}", e))
            })?;

        Ok(model.map(model_to_link))
    }

    /// 首次点击：clicked=false 时置为 true 并写入 clicked_at
    ///
    /// 返回 true 表示本次调用完成了首次点击标记。
    pub async fn mark_first_click(&self, tracking_id: &str, at: DateTime<Utc>) -> Result<bool> {
        let result = tracked_link::Entity::update_many()
            .col_expr(tracked_link::Column::Clicked, Expr::value(true))
            .col_expr(tracked_link::Column::ClickedAt, Expr::value(at))
            .filter(tracked_link::Column::TrackingId.eq(tracking_id))
            .filter(tracked_link::Column::Clicked.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| {
                TrackerError::database_operation(format!("更新首次点击失败: {}", e))
            })?;

        Ok(result.rows_affected > 0)
    }

    /// 归因查询：该联系人最近一次被点击的链接
    pub async fn find_latest_clicked_for_contact(
        &self,
        contact_id: &str,
    ) -> Result<Option<TrackedLink>> {
        let model = tracked_link::Entity::find()
            .filter(tracked_link::Column::ContactId.eq(contact_id))
            .filter(tracked_link::Column::Clicked.eq(true))
            .order_by_desc(tracked_link::Column::ClickedAt)
            .order_by_desc(tracked_link::Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("归因查询失败: {}", e)))?;

        Ok(model.map(model_to_link))
    }

    /// 标记转化（不检查是否已转化，重复调用会刷新 converted_at）
    pub async fn mark_converted(&self, tracking_id: &str, at: DateTime<Utc>) -> Result<()> {
        let result = tracked_link::Entity::update_many()
            .col_expr(tracked_link::Column::Converted, Expr::value(true))
            .col_expr(tracked_link::Column::ConvertedAt, Expr::value(at))
            .filter(tracked_link::Column::TrackingId.eq(tracking_id))
            .exec(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("更新转化状态失败: {}", e)))?;

        debug!(
            "mark_converted({}): {} row(s) updated",
            tracking_id, result.rows_affected
        );
        Ok(())
    }

    pub async fn count_links(&self) -> Result<u64> {
        tracked_link::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计链接数量失败: {}", e)))
    }

    /// 加载过滤范围内每条链接的 agent 类型与点击/转化状态
    pub async fn load_link_outcomes(&self, filter: &LinkFilter) -> Result<Vec<LinkOutcome>> {
        let rows: Vec<(String, bool, bool)> = tracked_link::Entity::find()
            .select_only()
            .column(tracked_link::Column::AgentType)
            .column(tracked_link::Column::Clicked)
            .column(tracked_link::Column::Converted)
            .filter(filter.condition())
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计查询失败: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(agent_type, clicked, converted)| LinkOutcome {
                agent_type,
                clicked,
                converted,
            })
            .collect())
    }

    /// 最近创建的链接，按创建时间倒序
    pub async fn load_recent_links(
        &self,
        filter: &LinkFilter,
        limit: u64,
    ) -> Result<Vec<TrackedLink>> {
        let models = tracked_link::Entity::find()
            .filter(filter.condition())
            .order_by_desc(tracked_link::Column::CreatedAt)
            .order_by_desc(tracked_link::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| {
                TrackerError::database_operation(format!("查询最近链接失败: {}", e))
            })?;

        Ok(models.into_iter().map(model_to_link).collect())
    }
}
