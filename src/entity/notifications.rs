//! 通知实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub notification_type: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub metadata: Option<String>,
    pub is_read: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_notification(self) -> crate::models::notifications::entities::Notification {
        use crate::models::notifications::entities::{
            Notification, NotificationType, ReferenceType,
        };

        Notification {
            id: self.id,
            user_id: self.user_id,
            notification_type: self
                .notification_type
                .parse::<NotificationType>()
                .unwrap_or(NotificationType::GradeUpdated),
            title: self.title,
            content: self.content,
            reference_type: self
                .reference_type
                .and_then(|r| r.parse::<ReferenceType>().ok()),
            reference_id: self.reference_id,
            metadata: self
                .metadata
                .and_then(|m| serde_json::from_str::<serde_json::Value>(&m).ok()),
            is_read: self.is_read,
            created_at: super::from_timestamp(self.created_at),
        }
    }
}
