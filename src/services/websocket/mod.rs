/*!
 * WebSocket 实时通知服务
 *
 * 此服务用于建立 WebSocket 连接，实时推送通知给用户。
 *
 * ## 使用方法
 *
 * 客户端通过以下 URL 连接：
 * ```text
 * ws://host/api/v1/ws?token=<access_token>
 * ```
 *
 * ## 消息格式
 *
 * ### 服务端推送
 * ```json
 * {
 *     "type": "notification",
 *     "payload": {
 *         "id": 42,
 *         "notification_type": "grade_updated",
 *         "title": "成绩已更新",
 *         "content": "《数据结构期中考试》的成绩已更新为 18",
 *         "reference_type": "exam_submission",
 *         "reference_id": 7,
 *         "metadata": {"exam_id": 3, "submission_id": 7, "previous_score": 15.0, "new_score": 18.0},
 *         "created_at": "2026-01-24T12:00:00Z"
 *     }
 * }
 * ```
 *
 * ### 心跳
 * ```json
 * {"type": "ping"}
 * {"type": "pong"}
 * ```
 */

use actix_ws::Message;
use dashmap::DashMap;
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::models::notifications::entities::Notification;

/// 全局连接管理器
static CONNECTION_MANAGER: Lazy<ConnectionManager> = Lazy::new(ConnectionManager::new);

/// WebSocket 消息类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// 通知消息
    Notification { payload: NotificationPayload },
    /// 心跳请求
    Ping,
    /// 心跳响应
    Pong,
    /// 连接成功
    Connected { user_id: i64 },
    /// 错误消息
    Error { message: String },
}

/// 通知载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub id: i64,
    pub notification_type: String,
    pub title: String,
    pub content: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Notification> for NotificationPayload {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            notification_type: n.notification_type.to_string(),
            title: n.title,
            content: n.content,
            reference_type: n.reference_type.map(|r| r.to_string()),
            reference_id: n.reference_id,
            metadata: n.metadata,
            created_at: n.created_at,
        }
    }
}

/// 连接管理器
pub struct ConnectionManager {
    /// 用户 ID -> 广播发送器
    connections: DashMap<i64, broadcast::Sender<WsMessage>>,
}

impl ConnectionManager {
    fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// 获取全局实例
    pub fn get() -> &'static Self {
        &CONNECTION_MANAGER
    }

    /// 注册用户连接
    pub fn register(&self, user_id: i64) -> broadcast::Receiver<WsMessage> {
        let entry = self.connections.entry(user_id).or_insert_with(|| {
            let (tx, _) = broadcast::channel(100);
            tx
        });
        entry.subscribe()
    }

    /// 移除用户连接
    pub fn unregister(&self, user_id: i64) {
        // 只有当没有订阅者时才移除；同一用户的其他连接仍在时保留
        self.connections
            .remove_if(&user_id, |_, tx| tx.receiver_count() == 0);
    }

    /// 向指定用户发送通知
    pub fn send_to_user(&self, user_id: i64, message: WsMessage) -> bool {
        if let Some(sender) = self.connections.get(&user_id) {
            sender.send(message).is_ok()
        } else {
            false
        }
    }

    /// 推送通知给用户，用户不在线时返回 false
    pub fn push_notification(&self, user_id: i64, notification: Notification) -> bool {
        let message = WsMessage::Notification {
            payload: NotificationPayload::from(notification),
        };
        self.send_to_user(user_id, message)
    }

    /// 检查用户是否在线
    pub fn is_online(&self, user_id: i64) -> bool {
        self.connections
            .get(&user_id)
            .is_some_and(|s| s.receiver_count() > 0)
    }
}

/// WebSocket 服务
pub struct WebSocketService;

impl WebSocketService {
    /// 处理 WebSocket 连接
    pub async fn handle_connection(
        user_id: i64,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) {
        info!("WebSocket connected for user: {}", user_id);

        // 注册连接
        let mut rx = ConnectionManager::get().register(user_id);

        // 发送连接成功消息
        let connected_msg = WsMessage::Connected { user_id };
        if let Ok(json) = serde_json::to_string(&connected_msg) {
            let _ = session.text(json).await;
        }

        // 心跳间隔
        let heartbeat_interval = std::time::Duration::from_secs(30);
        let mut heartbeat = tokio::time::interval(heartbeat_interval);

        loop {
            tokio::select! {
                // 处理来自客户端的消息
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let reply = match serde_json::from_str::<WsMessage>(&text) {
                                Ok(WsMessage::Ping) => Some(WsMessage::Pong),
                                Ok(ws_msg) => {
                                    debug!("Received message from user {}: {:?}", user_id, ws_msg);
                                    None
                                }
                                Err(_) => Some(WsMessage::Error {
                                    message: "无法解析的消息".to_string(),
                                }),
                            };
                            if let Some(reply) = reply
                                && let Ok(json) = serde_json::to_string(&reply)
                                && session.text(json).await.is_err()
                            {
                                break;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if session.pong(&data).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("WebSocket closed for user: {}", user_id);
                            break;
                        }
                        Some(Err(e)) => {
                            warn!("WebSocket error for user {}: {:?}", user_id, e);
                            break;
                        }
                        _ => {}
                    }
                }

                // 处理来自服务器的推送消息
                msg = rx.recv() => {
                    match msg {
                        Ok(ws_msg) => {
                            if let Ok(json) = serde_json::to_string(&ws_msg)
                                && session.text(json).await.is_err() {
                                    break;
                                }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("WebSocket for user {} lagged by {} messages", user_id, n);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            break;
                        }
                    }
                }

                // 心跳
                _ = heartbeat.tick() => {
                    if session.ping(b"").await.is_err() {
                        break;
                    }
                }
            }
        }

        // 先释放本连接的订阅，再清理
        drop(rx);
        ConnectionManager::get().unregister(user_id);
        info!("WebSocket disconnected for user: {}", user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::entities::{NotificationType, ReferenceType};

    fn notification(user_id: i64) -> Notification {
        Notification {
            id: 1,
            user_id,
            notification_type: NotificationType::RecheckCompleted,
            title: "复查已完成".into(),
            content: Some("done".into()),
            reference_type: Some(ReferenceType::ExamSubmission),
            reference_id: Some(7),
            metadata: None,
            is_read: false,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_push_to_registered_user() {
        let manager = ConnectionManager::new();
        let mut rx = manager.register(10);
        assert!(manager.is_online(10));
        assert!(manager.push_notification(10, notification(10)));

        match rx.recv().await.unwrap() {
            WsMessage::Notification { payload } => {
                assert_eq!(payload.notification_type, "recheck_completed");
                assert_eq!(payload.reference_type.as_deref(), Some("exam_submission"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_offline_user_is_dropped() {
        let manager = ConnectionManager::new();
        assert!(!manager.push_notification(99, notification(99)));

        let rx = manager.register(5);
        drop(rx);
        manager.unregister(5);
        assert!(!manager.is_online(5));
        assert!(!manager.connections.contains_key(&5));
    }

    #[test]
    fn test_unregister_keeps_other_connections() {
        let manager = ConnectionManager::new();
        let first = manager.register(7);
        let second = manager.register(7);

        drop(first);
        manager.unregister(7);
        assert!(manager.is_online(7));
        assert!(manager.connections.contains_key(&7));

        drop(second);
        manager.unregister(7);
        assert!(manager.connections.is_empty());
    }

    #[test]
    fn test_ping_message_format() {
        let ping: WsMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(ping, WsMessage::Ping));
        assert_eq!(serde_json::to_string(&WsMessage::Pong).unwrap(), r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_error_message_format() {
        let json = serde_json::to_string(&WsMessage::Error {
            message: "bad".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"error","message":"bad"}"#);
    }
}
