use serde::Deserialize;

use super::entities::{NotificationType, ReferenceType};

/// 创建通知（内部使用）
#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: Option<String>,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<i64>,
    pub metadata: Option<serde_json::Value>,
}

/// 通知列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub unread_only: Option<bool>,
}
