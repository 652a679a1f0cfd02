//! Conversion operations for SeaOrmStorage

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::{model_to_conversion, new_conversion_to_active_model};
use crate::errors::{Result, TrackerError};
use crate::storage::{Conversion, NewConversion};

use migration::entities::conversion;

impl SeaOrmStorage {
    pub async fn insert_conversion(&self, conv: &NewConversion) -> Result<Conversion> {
        let model = new_conversion_to_active_model(conv)
            .insert(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("写入转化记录失败: {}", e)))?;

        info!(
            "Conversion recorded for contact {} (tracking: {})",
            model.contact_id,
            model.tracking_id.as_deref().unwrap_or("unattributed")
        );
        Ok(model_to_conversion(model))
    }

    /// 某联系人的全部转化，最新在前
    pub async fn load_conversions_for_contact(&self, contact_id: &str) -> Result<Vec<Conversion>> {
        let models = conversion::Entity::find()
            .filter(conversion::Column::ContactId.eq(contact_id))
            .order_by_desc(conversion::Column::CreatedAt)
            .order_by_desc(conversion::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询转化记录失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_conversion).collect())
    }
}
