use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 追踪链接
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedLink {
    pub id: i64,
    pub tracking_id: String,
    pub contact_id: String,
    pub contact_email: Option<String>,
    pub agent_type: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub clicked: bool,
    pub clicked_at: Option<DateTime<Utc>>,
    pub converted: bool,
    pub converted_at: Option<DateTime<Utc>>,
}

/// 单次点击记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub id: i64,
    pub tracking_id: String,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// 转化记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub id: i64,
    pub contact_id: String,
    pub tracking_id: Option<String>,
    pub conversion_type: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<String>,
}

/// 待插入的链接
#[derive(Debug, Clone)]
pub struct NewLink {
    pub tracking_id: String,
    pub contact_id: String,
    pub contact_email: Option<String>,
    pub agent_type: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

/// 待插入的点击
#[derive(Debug, Clone)]
pub struct NewClick {
    pub tracking_id: String,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// 待插入的转化
#[derive(Debug, Clone)]
pub struct NewConversion {
    pub contact_id: String,
    pub tracking_id: Option<String>,
    pub conversion_type: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<String>,
}

/// 统计用的链接投影（只取聚合需要的列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub agent_type: String,
    pub clicked: bool,
    pub converted: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
}
