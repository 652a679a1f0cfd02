//! Click event operations for SeaOrmStorage

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::trace;

use super::SeaOrmStorage;
use super::converters::{model_to_click, new_click_to_active_model};
use crate::errors::{Result, TrackerError};
use crate::storage::{ClickEvent, NewClick};

use migration::entities::click_event;

impl SeaOrmStorage {
    /// 追加一条点击记录
    pub async fn insert_click(&self, click: &NewClick) -> Result<ClickEvent> {
        let model = new_click_to_active_model(click)
            .insert(&self.db)
            .await
            .map_err(|e| {
                TrackerError::database_operation(format!(
                    "写入点击记录 '{}' 失败: {}",
                    click.tracking_id, e
                ))
            })?;

        trace!("Click event recorded: {}", model.tracking_id);
        Ok(model_to_click(model))
    }

    /// 某追踪码的全部点击，最新在前
    pub async fn load_clicks(&self, tracking_id: &str) -> Result<Vec<ClickEvent>> {
        let models = click_event::Entity::find()
            .filter(click_event::Column::TrackingId.eq(tracking_id))
            .order_by_desc(click_event::Column::ClickedAt)
            .order_by_desc(click_event::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询点击记录失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_click).collect())
    }

    pub async fn count_clicks(&self, tracking_id: &str) -> Result<u64> {
        click_event::Entity::find()
            .filter(click_event::Column::TrackingId.eq(tracking_id))
            .count(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计点击数量失败: {}", e)))
    }
}
