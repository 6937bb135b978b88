//! 通知投递
//!
//! 评分与复查流程只依赖 [`NotificationSink`]，不关心通知如何落库与推送。

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::notifications::{
    entities::{NotificationType, ReferenceType},
    requests::CreateNotificationRequest,
};
use crate::services::websocket::ConnectionManager;
use crate::storage::Storage;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 向用户发送一条通知
    async fn notify(
        &self,
        user_id: i64,
        kind: NotificationType,
        message: String,
        metadata: Value,
    ) -> Result<()>;
}

/// 生产环境投递：写入通知表，然后推送到用户的 WebSocket 通道
pub struct StorageNotificationSink {
    storage: Arc<dyn Storage>,
}

impl StorageNotificationSink {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl NotificationSink for StorageNotificationSink {
    async fn notify(
        &self,
        user_id: i64,
        kind: NotificationType,
        message: String,
        metadata: Value,
    ) -> Result<()> {
        let reference_id = metadata.get("submission_id").and_then(Value::as_i64);

        let notification = self
            .storage
            .create_notification(CreateNotificationRequest {
                user_id,
                notification_type: kind,
                title: kind.default_title().to_string(),
                content: Some(message),
                reference_type: reference_id.map(|_| ReferenceType::ExamSubmission),
                reference_id,
                metadata: Some(metadata),
            })
            .await?;

        // 用户不在线时推送直接丢弃
        ConnectionManager::get().push_notification(user_id, notification);
        Ok(())
    }
}

/// 丢弃所有通知
pub struct NoopNotificationSink;

#[async_trait]
impl NotificationSink for NoopNotificationSink {
    async fn notify(
        &self,
        _user_id: i64,
        _kind: NotificationType,
        _message: String,
        _metadata: Value,
    ) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_sink() {
        assert!(
            NoopNotificationSink
                .notify(1, NotificationType::RecheckCompleted, "x".into(), Value::Null)
                .await
                .is_ok()
        );
    }
}
